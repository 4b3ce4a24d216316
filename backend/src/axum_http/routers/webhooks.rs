use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use visa_core::{
    domain::repositories::{
        audit_trail::AuditTrail, job_queue::JobPublisher, payments::PaymentRepository,
        purchases::PurchaseRepository, users::UserRepository,
    },
    infra::{
        db::{
            postgres::postgres_connection::PgPoolSquad,
            repositories::{
                payments::PaymentPostgres, purchases::PurchasePostgres, users::UserPostgres,
            },
        },
        queue::rabbitmq_publisher::RabbitMqPublisher,
    },
};

use crate::{
    axum_http::{api_response::ApiResponse, error_responses::AppError},
    usecases::payment_reconciliation::PaymentReconciler,
};

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    job_publisher: Arc<RabbitMqPublisher>,
    audit_trail: Arc<dyn AuditTrail>,
) -> Router {
    let reconciler = PaymentReconciler::new(
        Arc::new(PaymentPostgres::new(Arc::clone(&db_pool))),
        Arc::new(PurchasePostgres::new(Arc::clone(&db_pool))),
        Arc::new(UserPostgres::new(Arc::clone(&db_pool))),
        job_publisher,
        audit_trail,
    );

    router(Arc::new(reconciler))
}

pub fn router<Pay, Pur, U, Q>(reconciler: Arc<PaymentReconciler<Pay, Pur, U, Q>>) -> Router
where
    Pay: PaymentRepository + Send + Sync + 'static,
    Pur: PurchaseRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    Q: JobPublisher + Send + Sync + 'static,
{
    Router::new()
        .route("/xendit", post(xendit_webhook))
        .with_state(reconciler)
}

/// Always answers 200 so the gateway does not redeliver; failures travel in the envelope.
pub async fn xendit_webhook<Pay, Pur, U, Q>(
    State(reconciler): State<Arc<PaymentReconciler<Pay, Pur, U, Q>>>,
    body: Bytes,
) -> Response
where
    Pay: PaymentRepository + Send + Sync + 'static,
    Pur: PurchaseRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    Q: JobPublisher + Send + Sync + 'static,
{
    match reconciler.handle_xendit_webhook(&body).await {
        Ok(result) => (
            StatusCode::OK,
            Json(ApiResponse::success("Webhook processed successfully", result)),
        )
            .into_response(),
        Err(err) => {
            let err = AppError::from(err);
            (StatusCode::OK, Json(err.envelope())).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::payment_reconciliation::tests::{
        InMemoryPayments, InMemoryPurchases, RecordingAudit, RecordingPublisher, customer,
        payment, purchase,
    };
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;
    use visa_core::domain::repositories::users::MockUserRepository;

    fn webhook_app() -> (Router, Arc<InMemoryPayments>) {
        let payments = Arc::new(InMemoryPayments::with(payment(7, 42, "inv_abc", "pending")));
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_id()
            .returning(|_| Ok(Some(customer())));

        let reconciler = PaymentReconciler::new(
            Arc::clone(&payments),
            Arc::new(InMemoryPurchases::with(purchase(42, "pending"))),
            Arc::new(user_repo),
            Arc::new(RecordingPublisher::default()),
            Arc::new(RecordingAudit::default()) as Arc<dyn AuditTrail>,
        );
        (router(Arc::new(reconciler)), payments)
    }

    async fn post_webhook(app: Router, body: &'static str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/xendit")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn paid_webhook_answers_with_payment_status() {
        let (app, payments) = webhook_app();

        let (status, body) = post_webhook(app, r#"{"id":"inv_abc","status":"PAID"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["payment_id"], 7);
        assert_eq!(body["data"]["status"], "paid");
        assert_eq!(payments.status(7), "paid");
    }

    #[tokio::test]
    async fn failures_still_answer_200() {
        let (app, _) = webhook_app();
        let (status, body) = post_webhook(app, "{broken").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (app, _) = webhook_app();
        let (status, body) = post_webhook(app, r#"{"id":"inv_nope","status":"PAID"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}
