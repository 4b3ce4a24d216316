use anyhow::{Result, bail};
use chrono::{DateTime, Utc};

use crate::domain::entities::{
    payments::PaymentEntity,
    purchases::PurchaseEntity,
    users::UserEntity,
    visas::{VisaEntity, VisaOptionEntity},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceLineItem {
    pub description: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub total: i64,
}

impl InvoiceLineItem {
    fn single(description: String, price: i64) -> Self {
        Self {
            description,
            quantity: 1,
            unit_price: price,
            total: price,
        }
    }
}

/// Everything printed on a purchase invoice, already formatted-ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDocument {
    pub invoice_number: String,
    pub issued_at: DateTime<Utc>,
    pub purchase_id: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub items: Vec<InvoiceLineItem>,
    pub subtotal: i64,
    pub total: i64,
    pub payment_method: String,
    pub payment_status: String,
}

impl InvoiceDocument {
    /// Builds the invoice for a purchase.
    ///
    /// The option line is present exactly when the purchase references an option. Subtotal and
    /// total always come from the purchase's stored total, never from summing the lines.
    ///
    /// Fails when the purchase references an option and `option` is missing or another option.
    pub fn for_purchase(
        purchase: &PurchaseEntity,
        visa: &VisaEntity,
        option: Option<&VisaOptionEntity>,
        user: &UserEntity,
        payment: &PaymentEntity,
        generated_at: DateTime<Utc>,
    ) -> Result<Self> {
        let mut items = vec![InvoiceLineItem::single(visa.label(), visa.price)];

        if let Some(option_id) = purchase.visa_option_id {
            match option {
                Some(option) if option.id == option_id => {
                    items.push(InvoiceLineItem::single(option.name.clone(), option.price));
                }
                Some(option) => bail!(
                    "purchase {} references visa option {} but option {} was supplied",
                    purchase.id,
                    option_id,
                    option.id
                ),
                None => bail!(
                    "purchase {} references visa option {} but it was not supplied",
                    purchase.id,
                    option_id
                ),
            }
        }

        Ok(Self {
            invoice_number: invoice_number(purchase.id, generated_at),
            issued_at: generated_at,
            purchase_id: purchase.id,
            customer_name: user.name.clone(),
            customer_email: user.email.clone(),
            items,
            subtotal: purchase.total_price,
            total: purchase.total_price,
            payment_method: payment.payment_method.clone(),
            payment_status: payment.status.clone(),
        })
    }

    pub fn file_name(&self) -> String {
        format!("invoice_{}.pdf", self.invoice_number)
    }
}

/// Not globally sequential: the purchase id plus the generation instant in milliseconds.
pub fn invoice_number(purchase_id: i64, generated_at: DateTime<Utc>) -> String {
    format!(
        "INV-{}-{}",
        purchase_id,
        generated_at.format("%Y%m%d%H%M%S%3f")
    )
}

/// Whole rupiah with `.` thousands separators, e.g. `Rp 650.000`.
pub fn format_rupiah(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    if amount < 0 {
        format!("-Rp {grouped}")
    } else {
        format!("Rp {grouped}")
    }
}
