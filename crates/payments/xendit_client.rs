use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

pub const DEFAULT_XENDIT_BASE_URL: &str = "https://api.xendit.co";

#[derive(Debug, Clone)]
pub struct XenditConfig {
    pub base_url: String,
    pub secret_key: String,
    pub timeout_seconds: u64,
    pub success_redirect_url: Option<String>,
    pub failure_redirect_url: Option<String>,
}

/// Minimal invoice API client built on reqwest.
pub struct XenditClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
    success_redirect_url: Option<String>,
    failure_redirect_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateInvoiceRequest {
    pub external_id: String,
    pub amount: i64,
    pub description: String,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer_email: Option<String>,
    pub payment_methods: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<XenditCustomer>,
    pub items: Vec<XenditInvoiceItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct XenditCustomer {
    pub given_names: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct XenditInvoiceItem {
    pub name: String,
    pub quantity: i64,
    pub price: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XenditInvoice {
    pub id: String,
    #[serde(default)]
    pub external_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub invoice_url: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XenditErrorEnvelope {
    error_code: Option<String>,
    message: Option<String>,
}

impl XenditClient {
    pub fn new(config: XenditConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("failed to build xendit http client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key,
            success_redirect_url: config.success_redirect_url,
            failure_redirect_url: config.failure_redirect_url,
        })
    }

    pub fn success_redirect_url(&self) -> Option<String> {
        self.success_redirect_url.clone()
    }

    pub fn failure_redirect_url(&self) -> Option<String> {
        self.failure_redirect_url.clone()
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let (error_code, error_message) = match serde_json::from_str::<XenditErrorEnvelope>(&body)
        {
            Ok(envelope) => (envelope.error_code, envelope.message),
            Err(_) => (None, None),
        };

        error!(
            status = %status,
            xendit_error_code = ?error_code,
            xendit_error_message = ?error_message,
            response_body = %body,
            context = %context,
            "xendit api request failed"
        );

        anyhow::bail!(
            "Xendit API request failed: {} (status {}, error_code={:?})",
            context,
            status,
            error_code
        );
    }

    /// Creates a hosted invoice. https://developers.xendit.co/api-reference/#create-invoice
    pub async fn create_invoice(&self, request: &CreateInvoiceRequest) -> Result<XenditInvoice> {
        let resp = self
            .http
            .post(format!("{}/v2/invoices", self.base_url))
            .basic_auth(&self.secret_key, Some(""))
            .json(request)
            .send()
            .await
            .context("xendit create invoice request failed")?;

        let resp = Self::ensure_success(resp, "create invoice").await?;
        let invoice: XenditInvoice = resp.json().await?;

        info!(
            invoice_id = %invoice.id,
            external_id = %request.external_id,
            status = %invoice.status,
            "xendit invoice created"
        );
        Ok(invoice)
    }

    pub async fn get_invoice(&self, invoice_id: &str) -> Result<XenditInvoice> {
        let resp = self
            .http
            .get(format!("{}/v2/invoices/{}", self.base_url, invoice_id))
            .basic_auth(&self.secret_key, Some(""))
            .send()
            .await
            .context("xendit get invoice request failed")?;

        let resp = Self::ensure_success(resp, "get invoice").await?;
        let invoice: XenditInvoice = resp.json().await?;
        Ok(invoice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_skips_absent_optionals() {
        let request = CreateInvoiceRequest {
            external_id: "payment_42_1710408600".to_string(),
            amount: 650_000,
            description: "Japan Visa - Tourist".to_string(),
            currency: "IDR".to_string(),
            payer_email: None,
            payment_methods: vec!["QRIS".to_string()],
            success_redirect_url: None,
            failure_redirect_url: None,
            customer: None,
            items: vec![XenditInvoiceItem {
                name: "Japan Visa - Tourist".to_string(),
                quantity: 1,
                price: 650_000,
            }],
        };

        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("payer_email").is_none());
        assert!(value.get("customer").is_none());
        assert_eq!(value["payment_methods"], json!(["QRIS"]));
        assert_eq!(value["items"][0]["price"], 650_000);
    }

    #[test]
    fn invoice_tolerates_missing_fields() {
        let invoice: XenditInvoice =
            serde_json::from_value(json!({"id": "inv_abc", "status": "PENDING"})).unwrap();
        assert_eq!(invoice.id, "inv_abc");
        assert!(invoice.invoice_url.is_none());
    }
}
