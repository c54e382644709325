//! PDF page layout: a cursor-driven seven-column table with mid-section
//! page breaks.

use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point,
};
use provitool_commission::CommissionLine;
use provitool_core::locale;

use crate::error::StatementError;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_LEFT: f32 = 15.0;
const MARGIN_RIGHT: f32 = 195.0;
const MARGIN_BOTTOM: f32 = 20.0;
const TOP: f32 = 282.0;
const ROW_STEP: f32 = 5.5;

// Column x positions (mm) of the seven-column table.
const X_NUMBER: f32 = 15.0;
const X_CUSTOMER: f32 = 45.0;
const X_PROJECT: f32 = 83.0;
const X_DATE: f32 = 118.0;
const X_KIND: f32 = 140.0;
const X_NET: f32 = 155.0;
const X_COMMISSION: f32 = 178.0;

/// One employee's statement under construction.
///
/// Tracks a vertical cursor; when a row would cross the bottom margin a new
/// page is started and the header block re-emitted, without touching the
/// caller's running subtotals.
pub struct StatementDocument {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    employee: String,
    y: f32,
    pages: usize,
}

impl StatementDocument {
    pub fn new(employee: &str) -> Result<Self, StatementError> {
        let (doc, page, layer) = PdfDocument::new(
            format!("Provisionsabrechnung – {employee}"),
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            "Seite 1",
        );
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_err)?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_err)?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            font,
            font_bold,
            employee: employee.to_string(),
            y: TOP,
            pages: 1,
        })
    }

    /// Render one labeled section: header block, rows, trailing subtotal.
    pub fn section(&mut self, label: &str, lines: &[CommissionLine]) -> Result<(), StatementError> {
        // A fresh section needs room for its header and at least one row.
        if self.y < MARGIN_BOTTOM + 8.0 * ROW_STEP {
            self.new_page(label);
        } else {
            self.emit_header(label);
        }

        let mut net_total = 0.0_f64;
        let mut commission_total = 0.0_f64;
        for line in lines {
            if self.y < MARGIN_BOTTOM + ROW_STEP {
                self.new_page(label);
            }
            self.row(line);
            net_total += line.net;
            commission_total += line.commission;
        }

        if self.y < MARGIN_BOTTOM + 2.0 * ROW_STEP {
            self.new_page(label);
        }
        self.subtotal(net_total, commission_total);
        Ok(())
    }

    /// Serialize the finished document to PDF bytes.
    pub fn finish(self) -> Result<Vec<u8>, StatementError> {
        let mut writer = std::io::BufWriter::new(Vec::new());
        self.doc.save(&mut writer).map_err(pdf_err)?;
        writer
            .into_inner()
            .map_err(|e| StatementError::Pdf(e.to_string()))
    }

    fn emit_header(&mut self, label: &str) {
        let title = format!("Provisionsabrechnung – {}", self.employee);
        self.text_bold(&title, 16.0, MARGIN_LEFT, self.y);
        self.y -= 9.0;
        self.text_bold(label, 11.0, MARGIN_LEFT, self.y);
        self.y -= 7.0;

        self.text_bold("Rechnungsnr.", 9.0, X_NUMBER, self.y);
        self.text_bold("Kunde", 9.0, X_CUSTOMER, self.y);
        self.text_bold("Projekt", 9.0, X_PROJECT, self.y);
        self.text_bold("Datum", 9.0, X_DATE, self.y);
        self.text_bold("Art", 9.0, X_KIND, self.y);
        self.text_bold("Netto", 9.0, X_NET, self.y);
        self.text_bold("Provision", 9.0, X_COMMISSION, self.y);
        self.y -= 2.5;
        self.divider();
        self.y -= ROW_STEP;
    }

    fn row(&mut self, line: &CommissionLine) {
        let kind = if line.is_external { "Fremd" } else { "Eigen" };
        self.text(&clip(&line.invoice_number, 18), 9.0, X_NUMBER, self.y);
        self.text(&clip(&line.customer, 22), 9.0, X_CUSTOMER, self.y);
        self.text(&clip(&line.project, 20), 9.0, X_PROJECT, self.y);
        self.text(&locale::format_date(line.payment_date), 9.0, X_DATE, self.y);
        self.text(kind, 9.0, X_KIND, self.y);
        self.text(&money(line.net), 9.0, X_NET, self.y);
        self.text(&money(line.commission), 9.0, X_COMMISSION, self.y);
        self.y -= ROW_STEP;
    }

    fn subtotal(&mut self, net: f64, commission: f64) {
        self.y -= 1.5;
        self.divider();
        self.y -= ROW_STEP;
        self.text_bold("Zwischensumme", 9.0, X_NUMBER, self.y);
        self.text_bold(&money(net), 9.0, X_NET, self.y);
        self.text_bold(&money(commission), 9.0, X_COMMISSION, self.y);
        self.y -= 2.0 * ROW_STEP;
    }

    fn new_page(&mut self, label: &str) {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Seite {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = TOP;
        self.emit_header(label);
    }

    fn text(&self, text: &str, size: f32, x: f32, y: f32) {
        self.layer.use_text(text, size, Mm(x), Mm(y), &self.font);
    }

    fn text_bold(&self, text: &str, size: f32, x: f32, y: f32) {
        self.layer.use_text(text, size, Mm(x), Mm(y), &self.font_bold);
    }

    fn divider(&self) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN_LEFT), Mm(self.y)), false),
                (Point::new(Mm(MARGIN_RIGHT), Mm(self.y)), false),
            ],
            is_closed: false,
        });
    }
}

fn money(value: f64) -> String {
    format!("{} €", locale::format_amount(value))
}

/// Clip a cell to the column width, char-safe.
fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn pdf_err(e: impl std::fmt::Display) -> StatementError {
    StatementError::Pdf(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_keeps_short_text_and_shortens_long_text() {
        assert_eq!(clip("ACME", 10), "ACME");
        let clipped = clip("Ein sehr langer Kundenname GmbH & Co. KG", 10);
        assert_eq!(clipped.chars().count(), 10);
        assert!(clipped.ends_with('…'));
    }
}
