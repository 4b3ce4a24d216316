use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment, Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tracing::info;

use crate::domain::{repositories::mail::MailSender, value_objects::mail::OutgoingEmail};

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Plain SMTP without TLS, as used by local relays such as MailHog.
    /// Credentials are only sent when both user and password are configured.
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.host.as_str())
                .port(config.port);

        if let (Some(user), Some(password)) = (config.user.as_ref(), config.password.as_ref()) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        let from = config
            .from
            .parse::<Mailbox>()
            .with_context(|| format!("SMTP_FROM is not a valid mailbox: {}", config.from))?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(&self, email: OutgoingEmail) -> Result<Message> {
        let to = email
            .to
            .parse::<Mailbox>()
            .with_context(|| format!("invalid recipient address: {}", email.to))?;

        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject);

        let html = SinglePart::html(email.html_body);

        let message = match email.attachment {
            Some(attachment) => {
                let content_type = ContentType::parse(&attachment.content_type)
                    .map_err(|err| anyhow!("invalid attachment content type: {err:?}"))?;

                builder.multipart(
                    MultiPart::mixed().singlepart(html).singlepart(
                        Attachment::new(attachment.file_name)
                            .body(attachment.content, content_type),
                    ),
                )
            }
            None => builder.singlepart(html),
        }
        .context("failed to build email message")?;

        Ok(message)
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        let recipient = email.to.clone();
        let message = self.build_message(email)?;

        self.transport
            .send(message)
            .await
            .with_context(|| format!("smtp delivery to {recipient} failed"))?;

        info!(%recipient, "smtp_mailer: email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::mail::EmailAttachment;

    fn mailer() -> SmtpMailer {
        SmtpMailer::new(&SmtpConfig {
            host: "localhost".to_string(),
            port: 1025,
            user: None,
            password: None,
            from: "noreply@viskatera.com".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn builds_message_with_pdf_attachment() {
        let message = mailer()
            .build_message(OutgoingEmail {
                to: "rina@example.com".to_string(),
                subject: "Payment Successful - Invoice #42".to_string(),
                html_body: "<p>paid</p>".to_string(),
                attachment: Some(EmailAttachment {
                    file_name: "invoice_INV-42.pdf".to_string(),
                    content_type: "application/pdf".to_string(),
                    content: b"%PDF-1.3".to_vec(),
                }),
            })
            .unwrap();

        let raw = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(raw.contains("Subject: Payment Successful - Invoice #42"));
        assert!(raw.contains("application/pdf"));
        assert!(raw.contains("invoice_INV-42.pdf"));
    }

    #[test]
    fn rejects_invalid_recipient() {
        let result = mailer().build_message(OutgoingEmail {
            to: "not an address".to_string(),
            subject: "Invoice".to_string(),
            html_body: String::new(),
            attachment: None,
        });

        assert!(result.is_err());
    }
}
