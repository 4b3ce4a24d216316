pub mod invoice_pdf;
