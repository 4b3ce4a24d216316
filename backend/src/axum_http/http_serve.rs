use crate::{
    axum_http::{default_routers, routers},
    config::{config_loader, config_model::DotEnvyConfig},
};
use anyhow::Result;
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use visa_core::{
    domain::repositories::audit_trail::AuditTrail,
    infra::{
        db::postgres::postgres_connection::PgPoolSquad,
        queue::rabbitmq_publisher::RabbitMqPublisher,
    },
    payments::xendit_client::XenditClient,
};

pub async fn start(
    config: Arc<DotEnvyConfig>,
    db_pool: Arc<PgPoolSquad>,
    job_publisher: Arc<RabbitMqPublisher>,
    audit_trail: Arc<dyn AuditTrail>,
    xendit_client: Arc<XenditClient>,
) -> Result<()> {
    let jwt_secret = config_loader::get_jwt_secret()?.secret;

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/api/v1/login",
            routers::auth::routes(Arc::clone(&db_pool), jwt_secret),
        )
        .nest("/api/v1/visas", routers::visas::routes(Arc::clone(&db_pool)))
        .nest(
            "/api/v1/webhooks",
            routers::webhooks::routes(
                Arc::clone(&db_pool),
                Arc::clone(&job_publisher),
                Arc::clone(&audit_trail),
            ),
        )
        .nest(
            "/api/v1/payments",
            routers::payments::routes(
                Arc::clone(&db_pool),
                Arc::clone(&job_publisher),
                Arc::clone(&audit_trail),
                xendit_client,
            ),
        )
        .nest(
            "/api/v1/purchases",
            routers::purchases::routes(Arc::clone(&db_pool), Arc::clone(&audit_trail)),
        )
        .nest(
            "/api/v1/activities",
            routers::activities::routes(Arc::clone(&db_pool)),
        )
        .nest(
            "/api/v1/monitoring",
            routers::monitoring::routes(Arc::clone(&db_pool), Arc::clone(&job_publisher)),
        )
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.backend_server.timeout,
        )))
        .layer(RequestBodyLimitLayer::new(
            (config.backend_server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::PUT,
                    Method::DELETE,
                ])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.backend_server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
