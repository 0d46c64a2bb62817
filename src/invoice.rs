//! PDF invoice rendering.
//!
//! Pure function from an order plus its line items to a finished PDF byte
//! buffer. Layout is drawn directly: positioned text runs and horizontal
//! rules, no template engine. Per-row totals are recomputed from the line
//! items while the footer prints the order's *stored* total, so the two can
//! visibly diverge when the stored total was never reconciled.

use anyhow::{Result, anyhow};
use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point,
};

use crate::models::{Order, OrderItem};

const PAGE_WIDTH: f64 = 210.0;
const PAGE_HEIGHT: f64 = 297.0;
const MARGIN_LEFT: f64 = 20.0;
const MARGIN_RIGHT: f64 = 190.0;
const TOP_BASELINE: f64 = 272.0;
const BOTTOM_MARGIN: f64 = 25.0;
const ROW_HEIGHT: f64 = 6.0;

// Right edges of the numeric columns.
const COL_QTY: f64 = 132.0;
const COL_UNIT: f64 = 162.0;
const COL_TOTAL: f64 = MARGIN_RIGHT;

const PT_TO_MM: f64 = 0.352_778;

const SHOP_NAME: &str = "Better View Nam Nao";
const SHOP_ADDRESS: &str = "Khok Mon, Nam Nao District, Phetchabun";

/// Format satang as a two-decimal baht amount.
pub fn fmt_money(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Displayed row total: unit price times quantity, independent of the
/// order's stored total.
pub fn line_total(price: i64, quantity: i32) -> i64 {
    price * i64::from(quantity)
}

pub fn render_invoice(order: &Order, items: &[OrderItem]) -> Result<Vec<u8>> {
    let mut w = InvoiceWriter::new(&format!("Invoice Order {}", order.id))?;

    w.center(SHOP_NAME, 16.0, true);
    w.advance(7.0);
    w.center(SHOP_ADDRESS, 10.0, false);
    w.advance(5.0);
    w.center(&format!("Receipt for order {}", order.id), 10.0, false);
    w.advance(4.0);
    w.rule();
    w.advance(6.0);

    // Bill and customer block, two columns.
    w.left(&format!("Invoice no: #{}", order.id), 10.0, false);
    w.right(
        &format!("Date: {}", order.created_at.format("%d/%m/%Y")),
        10.0,
        MARGIN_RIGHT,
        false,
    );
    w.advance(5.0);
    w.left(&format!("Customer: {}", order.customer_name), 10.0, false);
    w.right(
        &format!("Phone: {}", order.customer_phone.as_deref().unwrap_or("-")),
        10.0,
        MARGIN_RIGHT,
        false,
    );
    w.advance(4.0);
    w.rule();
    w.advance(6.0);

    w.table_header();

    for item in items {
        if w.needs_page_break(ROW_HEIGHT) {
            w.new_page();
            w.table_header();
        }
        w.left(&item.product_name, 10.0, false);
        w.right(&item.quantity.to_string(), 10.0, COL_QTY, false);
        w.right(&fmt_money(item.price), 10.0, COL_UNIT, false);
        w.right(&fmt_money(line_total(item.price, item.quantity)), 10.0, COL_TOTAL, false);
        w.advance(ROW_HEIGHT);
    }

    // Summary block on whichever page the table ended.
    if w.needs_page_break(40.0) {
        w.new_page();
    }
    w.advance(2.0);
    w.double_rule();
    w.advance(8.0);

    w.left("Grand total", 14.0, true);
    // The stored order total, deliberately not the sum of the rows above.
    w.right(&format!("{} THB", fmt_money(order.total_price)), 14.0, COL_TOTAL, true);
    w.advance(7.0);
    w.right(&format!("Paid by: {}", order.payment_method), 10.0, MARGIN_RIGHT, false);
    w.advance(5.0);
    w.double_rule();
    w.advance(8.0);
    w.center("Thank you for your visit", 10.0, false);

    w.finish()
}

struct InvoiceWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f64,
}

impl InvoiceWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH as f32), Mm(PAGE_HEIGHT as f32), "invoice");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow!("load font: {e}"))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow!("load font: {e}"))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: TOP_BASELINE,
        })
    }

    fn new_page(&mut self) {
        let (page, layer) =
            self.doc
                .add_page(Mm(PAGE_WIDTH as f32), Mm(PAGE_HEIGHT as f32), "invoice");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = TOP_BASELINE;
    }

    fn needs_page_break(&self, needed: f64) -> bool {
        self.y - needed < BOTTOM_MARGIN
    }

    fn advance(&mut self, mm: f64) {
        self.y -= mm;
    }

    fn font(&self, bold: bool) -> &IndirectFontRef {
        if bold { &self.bold } else { &self.regular }
    }

    fn left(&self, text: &str, size: f64, bold: bool) {
        self.layer
            .use_text(
                text,
                size as f32,
                Mm(MARGIN_LEFT as f32),
                Mm(self.y as f32),
                self.font(bold),
            );
    }

    fn right(&self, text: &str, size: f64, right_edge: f64, bold: bool) {
        let x = right_edge - approx_width_mm(text, size);
        self.layer
            .use_text(text, size as f32, Mm(x as f32), Mm(self.y as f32), self.font(bold));
    }

    fn center(&self, text: &str, size: f64, bold: bool) {
        let x = (PAGE_WIDTH - approx_width_mm(text, size)) / 2.0;
        self.layer
            .use_text(text, size as f32, Mm(x as f32), Mm(self.y as f32), self.font(bold));
    }

    fn rule(&self) {
        let line = Line {
            points: vec![
                (Point::new(Mm(MARGIN_LEFT as f32), Mm(self.y as f32)), false),
                (Point::new(Mm(MARGIN_RIGHT as f32), Mm(self.y as f32)), false),
            ],
            is_closed: false,
        };
        self.layer.set_outline_thickness(0.6);
        self.layer.add_line(line);
    }

    fn double_rule(&mut self) {
        self.rule();
        self.advance(1.0);
        self.rule();
    }

    fn table_header(&mut self) {
        self.left("Item", 11.0, true);
        self.right("Qty", 11.0, COL_QTY, true);
        self.right("Unit price", 11.0, COL_UNIT, true);
        self.right("Total", 11.0, COL_TOTAL, true);
        self.advance(4.0);
        self.rule();
        self.advance(6.0);
    }

    fn finish(self) -> Result<Vec<u8>> {
        self.doc
            .save_to_bytes()
            .map_err(|e| anyhow!("save pdf: {e}"))
    }
}

// Helvetica runs close to half an em per glyph on average, which is enough
// precision to right-align short numeric columns.
fn approx_width_mm(text: &str, size_pt: f64) -> f64 {
    text.chars().count() as f64 * size_pt * 0.5 * PT_TO_MM
}
