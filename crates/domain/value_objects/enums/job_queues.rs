use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Broker message TTL shared by every job queue (one hour).
pub const JOB_MESSAGE_TTL_MS: i32 = 3_600_000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JobQueue {
    EmailInvoice,
    EmailPaymentSuccess,
    /// Declared with the others but not consumed yet.
    GeneratePdf,
}

impl JobQueue {
    pub const ALL: [JobQueue; 3] = [
        JobQueue::EmailInvoice,
        JobQueue::EmailPaymentSuccess,
        JobQueue::GeneratePdf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobQueue::EmailInvoice => "email_invoice",
            JobQueue::EmailPaymentSuccess => "email_payment_success",
            JobQueue::GeneratePdf => "generate_pdf",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "email_invoice" => Some(JobQueue::EmailInvoice),
            "email_payment_success" => Some(JobQueue::EmailPaymentSuccess),
            "generate_pdf" => Some(JobQueue::GeneratePdf),
            _ => None,
        }
    }

    /// Value of the `type` field carried by jobs published to this queue.
    pub fn job_type(&self) -> &'static str {
        match self {
            JobQueue::EmailInvoice => "invoice",
            JobQueue::EmailPaymentSuccess => "payment_success",
            JobQueue::GeneratePdf => "generate_pdf",
        }
    }
}

impl Display for JobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
