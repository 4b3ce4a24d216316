use anyhow::Result as AnyResult;
use async_trait::async_trait;
use visa_core::payments::xendit_client::{CreateInvoiceRequest, XenditClient, XenditInvoice};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_invoice(&self, request: &CreateInvoiceRequest) -> AnyResult<XenditInvoice>;

    async fn get_invoice(&self, invoice_id: &str) -> AnyResult<XenditInvoice>;

    /// Where the hosted page sends the payer after success and failure.
    fn redirect_urls(&self) -> (Option<String>, Option<String>);
}

#[async_trait]
impl PaymentGateway for XenditClient {
    async fn create_invoice(&self, request: &CreateInvoiceRequest) -> AnyResult<XenditInvoice> {
        self.create_invoice(request).await
    }

    async fn get_invoice(&self, invoice_id: &str) -> AnyResult<XenditInvoice> {
        self.get_invoice(invoice_id).await
    }

    fn redirect_urls(&self) -> (Option<String>, Option<String>) {
        (self.success_redirect_url(), self.failure_redirect_url())
    }
}
