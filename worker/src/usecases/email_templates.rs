use visa_core::domain::{
    entities::{purchases::PurchaseEntity, users::UserEntity, visas::VisaEntity},
    value_objects::invoices::{InvoiceDocument, format_rupiah},
};

pub fn invoice_subject(visa: &VisaEntity) -> String {
    format!("Invoice for Visa Purchase - {}", visa.country)
}

pub fn payment_success_subject(purchase_id: i64) -> String {
    format!("Payment Successful - Invoice #{}", purchase_id)
}

/// Body of the invoice mail sent right after a payment is created.
pub fn invoice_body(
    user: &UserEntity,
    purchase: &PurchaseEntity,
    visa: &VisaEntity,
    payment_url: Option<&str>,
) -> String {
    let payment_link = match payment_url {
        Some(url) => format!(
            r#"<p>Complete your payment here: <a href="{url}">{url}</a></p>"#,
            url = escape_html(url)
        ),
        None => String::new(),
    };

    format!(
        r#"<html>
<body style="font-family: Arial, sans-serif;">
<h2>Invoice for Your Visa Purchase</h2>
<p>Dear {name},</p>
<p>Thank you for purchasing a visa with us. Here are the details of your order:</p>
<table cellpadding="6">
<tr><td><strong>Purchase ID</strong></td><td>#{purchase_id}</td></tr>
<tr><td><strong>Visa</strong></td><td>{visa}</td></tr>
<tr><td><strong>Duration</strong></td><td>{duration} days</td></tr>
<tr><td><strong>Total</strong></td><td>{total}</td></tr>
<tr><td><strong>Status</strong></td><td>{status}</td></tr>
</table>
{payment_link}
<p>Best regards,<br>Viskatera Team</p>
</body>
</html>"#,
        name = escape_html(&user.name),
        purchase_id = purchase.id,
        visa = escape_html(&visa.label()),
        duration = visa.duration_days,
        total = format_rupiah(purchase.total_price),
        status = escape_html(&purchase.status),
    )
}

/// Body of the confirmation mail carrying the PDF invoice.
pub fn payment_success_body(document: &InvoiceDocument) -> String {
    let items: String = document
        .items
        .iter()
        .map(|item| {
            format!(
                "<tr><td>{}</td><td>{}</td></tr>\n",
                escape_html(&item.description),
                format_rupiah(item.total)
            )
        })
        .collect();

    format!(
        r#"<html>
<body style="font-family: Arial, sans-serif;">
<h2>Payment Successful</h2>
<p>Dear {name},</p>
<p>We have received your payment. Your invoice {number} is attached to this email.</p>
<table cellpadding="6">
{items}<tr><td><strong>Total</strong></td><td><strong>{total}</strong></td></tr>
<tr><td><strong>Payment Method</strong></td><td>{method}</td></tr>
</table>
<p>Best regards,<br>Viskatera Team</p>
</body>
</html>"#,
        name = escape_html(&document.customer_name),
        number = escape_html(&document.invoice_number),
        total = format_rupiah(document.total),
        method = escape_html(&document.payment_method),
    )
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use visa_core::domain::value_objects::invoices::InvoiceLineItem;

    fn visa() -> VisaEntity {
        let now = Utc::now();
        VisaEntity {
            id: 1,
            country: "Japan".to_string(),
            visa_type: "Tourist".to_string(),
            price: 500_000,
            duration_days: 90,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn purchase() -> PurchaseEntity {
        let now = Utc::now();
        PurchaseEntity {
            id: 42,
            user_id: 3,
            visa_id: 1,
            visa_option_id: None,
            total_price: 650_000,
            status: "pending".to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn user(name: &str) -> UserEntity {
        let now = Utc::now();
        UserEntity {
            id: 3,
            email: "rina@viskatera.test".to_string(),
            name: name.to_string(),
            role: "customer".to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn subjects_name_country_and_purchase() {
        assert_eq!(invoice_subject(&visa()), "Invoice for Visa Purchase - Japan");
        assert_eq!(
            payment_success_subject(42),
            "Payment Successful - Invoice #42"
        );
    }

    #[test]
    fn invoice_body_lists_total_status_and_link() {
        let body = invoice_body(
            &user("Rina"),
            &purchase(),
            &visa(),
            Some("https://checkout.xendit.co/web/inv_abc"),
        );

        assert!(body.contains("Japan Visa - Tourist"));
        assert!(body.contains("Rp 650.000"));
        assert!(body.contains("pending"));
        assert!(body.contains(r#"href="https://checkout.xendit.co/web/inv_abc""#));
    }

    #[test]
    fn invoice_body_without_payment_has_no_link() {
        let body = invoice_body(&user("Rina"), &purchase(), &visa(), None);
        assert!(!body.contains("<a href"));
    }

    #[test]
    fn customer_name_is_escaped() {
        let body = invoice_body(&user("<script>x</script>"), &purchase(), &visa(), None);
        assert!(body.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(!body.contains("<script>"));
    }

    #[test]
    fn payment_success_body_lists_every_line() {
        let document = InvoiceDocument {
            invoice_number: "INV-42-20240314093000000".to_string(),
            issued_at: Utc::now(),
            purchase_id: 42,
            customer_name: "Rina".to_string(),
            customer_email: "rina@viskatera.test".to_string(),
            items: vec![
                InvoiceLineItem {
                    description: "Japan Visa - Tourist".to_string(),
                    quantity: 1,
                    unit_price: 500_000,
                    total: 500_000,
                },
                InvoiceLineItem {
                    description: "Express".to_string(),
                    quantity: 1,
                    unit_price: 150_000,
                    total: 150_000,
                },
            ],
            subtotal: 650_000,
            total: 650_000,
            payment_method: "qris".to_string(),
            payment_status: "paid".to_string(),
        };

        let body = payment_success_body(&document);
        assert!(body.contains("INV-42-20240314093000000"));
        assert!(body.contains("Express"));
        assert!(body.contains("Rp 150.000"));
        assert!(body.contains("Rp 650.000"));
    }
}
