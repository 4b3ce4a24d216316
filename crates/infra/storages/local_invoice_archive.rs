use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use crate::domain::repositories::invoices::InvoiceArchive;

/// Stores rendered invoices under `<upload_dir>/invoices`.
pub struct LocalInvoiceArchive {
    invoices_dir: PathBuf,
}

impl LocalInvoiceArchive {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            invoices_dir: upload_dir.into().join("invoices"),
        }
    }
}

#[async_trait]
impl InvoiceArchive for LocalInvoiceArchive {
    async fn store(&self, file_name: &str, content: &[u8]) -> Result<String> {
        tokio::fs::create_dir_all(&self.invoices_dir)
            .await
            .with_context(|| {
                format!(
                    "failed to create invoices directory {}",
                    self.invoices_dir.display()
                )
            })?;

        let path = self.invoices_dir.join(file_name);
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("failed to write invoice {}", path.display()))?;

        let stored = path.to_string_lossy().into_owned();
        info!(path = %stored, bytes = content.len(), "invoice_archive: invoice stored");
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_invoice_under_invoices_dir() {
        let dir = tempfile::tempdir().unwrap();
        let archive = LocalInvoiceArchive::new(dir.path());

        let stored = archive
            .store("invoice_INV-42-1.pdf", b"%PDF-1.3")
            .await
            .unwrap();

        let expected = dir.path().join("invoices").join("invoice_INV-42-1.pdf");
        assert_eq!(stored, expected.to_string_lossy());
        assert_eq!(tokio::fs::read(expected).await.unwrap(), b"%PDF-1.3");
    }
}
