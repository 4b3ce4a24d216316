use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::invoices::InvoiceDocument;

#[automock]
pub trait InvoiceRenderer {
    fn render(&self, document: &InvoiceDocument) -> Result<Vec<u8>>;
}

#[automock]
#[async_trait]
pub trait InvoiceArchive {
    /// Persists a rendered invoice and returns where it was stored.
    async fn store(&self, file_name: &str, content: &[u8]) -> Result<String>;
}
