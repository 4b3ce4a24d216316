use anyhow::{Result, anyhow};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use crate::domain::{
    repositories::invoices::InvoiceRenderer,
    value_objects::invoices::{InvoiceDocument, format_rupiah},
};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const LEFT_MARGIN_MM: f32 = 20.0;
const TOP_MM: f32 = 277.0;

const COL_QUANTITY_MM: f32 = 120.0;
const COL_PRICE_MM: f32 = 140.0;
const COL_TOTAL_MM: f32 = 170.0;

/// Renders invoices as single-page A4 PDFs with the builtin Helvetica family.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfInvoiceRenderer;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

struct Cursor<'a> {
    layer: &'a PdfLayerReference,
    y: f32,
}

impl Cursor<'_> {
    fn text(&self, text: &str, size: f32, x: f32, font: &IndirectFontRef) {
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    fn advance(&mut self, mm: f32) {
        self.y -= mm;
    }
}

impl InvoiceRenderer for PdfInvoiceRenderer {
    fn render(&self, document: &InvoiceDocument) -> Result<Vec<u8>> {
        let (doc, page, layer) = PdfDocument::new(
            format!("Invoice {}", document.invoice_number),
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "invoice",
        );

        let font = |builtin: BuiltinFont| {
            doc.add_builtin_font(builtin)
                .map_err(|err| anyhow!("invoice_pdf: failed to load builtin font: {err:?}"))
        };
        let fonts = Fonts {
            regular: font(BuiltinFont::Helvetica)?,
            bold: font(BuiltinFont::HelveticaBold)?,
            italic: font(BuiltinFont::HelveticaOblique)?,
        };

        let layer = doc.get_page(page).get_layer(layer);
        let mut cursor = Cursor {
            layer: &layer,
            y: TOP_MM,
        };

        draw_header(&mut cursor, &fonts, document);
        draw_items(&mut cursor, &fonts, document);
        draw_footer(&mut cursor, &fonts, document);

        doc.save_to_bytes()
            .map_err(|err| anyhow!("invoice_pdf: failed to serialize document: {err:?}"))
    }
}

fn draw_header(cursor: &mut Cursor<'_>, fonts: &Fonts, document: &InvoiceDocument) {
    cursor.text("VISKATERA", 16.0, LEFT_MARGIN_MM, &fonts.bold);
    cursor.advance(8.0);
    cursor.text("Invoice", 12.0, LEFT_MARGIN_MM, &fonts.regular);
    cursor.advance(8.0);
    cursor.text(
        &format!("Invoice Number: {}", document.invoice_number),
        10.0,
        LEFT_MARGIN_MM,
        &fonts.regular,
    );
    cursor.advance(5.0);
    cursor.text(
        &format!("Date: {}", document.issued_at.format("%B %-d, %Y")),
        10.0,
        LEFT_MARGIN_MM,
        &fonts.regular,
    );
    cursor.advance(12.0);

    cursor.text("Bill To:", 12.0, LEFT_MARGIN_MM, &fonts.bold);
    cursor.advance(6.0);
    cursor.text(&document.customer_name, 10.0, LEFT_MARGIN_MM, &fonts.regular);
    cursor.advance(5.0);
    cursor.text(&document.customer_email, 10.0, LEFT_MARGIN_MM, &fonts.regular);
    cursor.advance(15.0);
}

fn draw_items(cursor: &mut Cursor<'_>, fonts: &Fonts, document: &InvoiceDocument) {
    cursor.text("Description", 10.0, LEFT_MARGIN_MM, &fonts.bold);
    cursor.text("Qty", 10.0, COL_QUANTITY_MM, &fonts.bold);
    cursor.text("Price", 10.0, COL_PRICE_MM, &fonts.bold);
    cursor.text("Total", 10.0, COL_TOTAL_MM, &fonts.bold);
    cursor.advance(8.0);

    for item in &document.items {
        cursor.text(&item.description, 10.0, LEFT_MARGIN_MM, &fonts.regular);
        cursor.text(
            &item.quantity.to_string(),
            10.0,
            COL_QUANTITY_MM,
            &fonts.regular,
        );
        cursor.text(
            &format_rupiah(item.unit_price),
            10.0,
            COL_PRICE_MM,
            &fonts.regular,
        );
        cursor.text(&format_rupiah(item.total), 10.0, COL_TOTAL_MM, &fonts.regular);
        cursor.advance(8.0);
    }

    cursor.advance(5.0);
    cursor.text("Subtotal:", 10.0, COL_PRICE_MM, &fonts.regular);
    cursor.text(
        &format_rupiah(document.subtotal),
        10.0,
        COL_TOTAL_MM,
        &fonts.regular,
    );
    cursor.advance(8.0);
    cursor.text("Total:", 10.0, COL_PRICE_MM, &fonts.regular);
    cursor.text(&format_rupiah(document.total), 10.0, COL_TOTAL_MM, &fonts.bold);
    cursor.advance(15.0);
}

fn draw_footer(cursor: &mut Cursor<'_>, fonts: &Fonts, document: &InvoiceDocument) {
    cursor.text(
        &format!("Payment Method: {}", document.payment_method),
        10.0,
        LEFT_MARGIN_MM,
        &fonts.regular,
    );
    cursor.advance(5.0);
    cursor.text(
        &format!("Status: {}", document.payment_status),
        10.0,
        LEFT_MARGIN_MM,
        &fonts.regular,
    );
    cursor.advance(12.0);
    cursor.text(
        "Thank you for your business!",
        8.0,
        PAGE_WIDTH_MM / 2.0 - 20.0,
        &fonts.italic,
    );
}
