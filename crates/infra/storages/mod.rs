pub mod local_invoice_archive;
