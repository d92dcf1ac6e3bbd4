//! A4 quotation PDF rendered with the built-in Helvetica fonts.
//!
//! Built-in PDF fonts only cover ASCII reliably, so every string goes through
//! [`pdf_text`], which folds Spanish accents onto their base letters.

use chrono::NaiveDateTime;
use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point,
};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::content::BusinessSettings;
use crate::domain::quote::{QuoteItem, QuoteWithItems};
use crate::domain::types::{fold_accent, format_money};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 18.0;
/// Lowest baseline for content; the page footer sits below it.
const CONTENT_BOTTOM: f32 = 24.0;
const LINE_HEIGHT: f32 = 5.0;
const DESCRIPTION_CHARS: usize = 52;

const COL_QUANTITY: f32 = 122.0;
const COL_UNIT_PRICE: f32 = 150.0;
const COL_DISCOUNT: f32 = 166.0;
const COL_TOTAL: f32 = PAGE_WIDTH - MARGIN;

/// Millimetres per point.
const PT_TO_MM: f32 = 0.352_778;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("font error: {0}")]
    Font(String),
    #[error("pdf rendering failed: {0}")]
    Render(String),
}

/// Makes a string printable with a built-in font.
pub fn pdf_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        let folded = fold_accent(c);
        let folded = if c.is_uppercase() {
            folded.to_ascii_uppercase()
        } else {
            folded
        };
        match folded {
            '\n' | '\r' | '\t' => out.push(' '),
            '¿' | '¡' => {}
            'º' | '°' => out.push('o'),
            'ª' => out.push('a'),
            c if c.is_ascii() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Splits text into lines of at most `width` characters on word boundaries.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(width).collect();
            word = word.chars().skip(width).collect();
            lines.push(head);
        }
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Approximate Helvetica advance width in millimetres, used to right-align.
fn text_width(text: &str, size: f32) -> f32 {
    let em: f32 = text
        .chars()
        .map(|c| match c {
            '0'..='9' | '$' => 0.556,
            '.' | ',' | ' ' | ':' | 'i' | 'l' | 'I' => 0.278,
            '-' | '(' | ')' | 'r' | 't' | 'f' => 0.333,
            'm' | 'w' | 'M' | 'W' | '%' => 0.85,
            c if c.is_ascii_uppercase() => 0.667,
            _ => 0.54,
        })
        .sum();
    em * size * PT_TO_MM
}

fn decimal_text(value: Decimal) -> String {
    value.normalize().to_string().replace('.', ",")
}

fn date_text(value: &NaiveDateTime) -> String {
    value.format("%d/%m/%Y").to_string()
}

struct Writer<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    footer: String,
    y: f32,
    pages: usize,
    /// Lowest baseline used by table rows and paragraphs.
    lowest: f32,
}

impl Writer<'_> {
    fn text(&self, value: &str, size: f32, x: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(pdf_text(value), size, Mm(x), Mm(self.y), font);
    }

    fn text_right(&self, value: &str, size: f32, right: f32, bold: bool) {
        let value = pdf_text(value);
        let x = right - text_width(&value, size);
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(value, size, Mm(x), Mm(self.y), font);
    }

    fn rule(&self, from: f32, to: f32) {
        let y = self.y;
        self.layer.set_outline_thickness(0.4);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(from), Mm(y)), false),
                (Point::new(Mm(to), Mm(y)), false),
            ],
            is_closed: false,
        });
    }

    fn advance(&mut self, height: f32) {
        self.y -= height;
    }

    fn page_footer(&mut self) {
        let saved = self.y;
        self.y = 12.0;
        self.text(&self.footer.clone(), 8.0, MARGIN, false);
        self.text_right(&format!("Pagina {}", self.pages), 8.0, COL_TOTAL, false);
        self.y = saved;
    }

    /// Starts a new page when fewer than `height` millimetres remain.
    /// Returns whether a page break happened.
    fn ensure_space(&mut self, height: f32) -> bool {
        if self.y - height >= CONTENT_BOTTOM {
            return false;
        }
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "contenido");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.pages += 1;
        self.y = PAGE_HEIGHT - MARGIN;
        self.page_footer();
        true
    }

    fn header(&mut self, quote: &QuoteWithItems, settings: &BusinessSettings) {
        let top = self.y;
        self.text(&settings.company_name, 16.0, MARGIN, true);
        self.advance(6.0);

        let mut details: Vec<String> = Vec::new();
        if let Some(tax_id) = &settings.tax_id {
            details.push(format!("RUT: {tax_id}"));
        }
        if let Some(address) = &settings.address {
            details.push(address.clone());
        }
        let contact: Vec<&str> = [
            settings.phone.as_deref(),
            settings.email.as_ref().map(|email| email.as_str()),
            settings.website.as_ref().map(|url| url.as_str()),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !contact.is_empty() {
            details.push(contact.join(" | "));
        }
        for line in details {
            self.text(&line, 9.0, MARGIN, false);
            self.advance(LINE_HEIGHT - 0.5);
        }
        let left_bottom = self.y;

        self.y = top;
        self.text_right("COTIZACION", 16.0, COL_TOTAL, true);
        self.advance(6.0);
        self.text_right(&quote.quote.number, 12.0, COL_TOTAL, true);
        self.advance(LINE_HEIGHT);
        self.text_right(
            &format!("Fecha: {}", date_text(&quote.quote.created_at)),
            9.0,
            COL_TOTAL,
            false,
        );
        self.advance(LINE_HEIGHT - 0.5);
        self.text_right(
            &format!("Valida hasta: {}", quote.quote.valid_until.format("%d/%m/%Y")),
            9.0,
            COL_TOTAL,
            false,
        );
        self.advance(LINE_HEIGHT - 0.5);
        self.text_right(
            &format!("Estado: {}", quote.quote.status.label()),
            9.0,
            COL_TOTAL,
            false,
        );
        self.advance(LINE_HEIGHT - 0.5);

        self.y = self.y.min(left_bottom) - 2.0;
        self.rule(MARGIN, COL_TOTAL);
        self.advance(7.0);
    }

    fn customer(&mut self, quote: &QuoteWithItems) {
        let customer = &quote.quote.customer;
        self.text("Cliente", 10.0, MARGIN, true);
        self.advance(LINE_HEIGHT);
        self.text(customer.name.as_str(), 10.0, MARGIN, false);
        self.advance(LINE_HEIGHT);
        if let Some(email) = &customer.email {
            self.text(email.as_str(), 9.0, MARGIN, false);
            self.advance(LINE_HEIGHT - 0.5);
        }
        if let Some(phone) = &customer.phone {
            self.text(phone, 9.0, MARGIN, false);
            self.advance(LINE_HEIGHT - 0.5);
        }
        self.advance(4.0);
    }

    fn table_header(&mut self) {
        self.text("Descripcion", 9.0, MARGIN, true);
        self.text_right("Cant.", 9.0, COL_QUANTITY, true);
        self.text_right("P. unitario", 9.0, COL_UNIT_PRICE, true);
        self.text_right("Dcto.", 9.0, COL_DISCOUNT, true);
        self.text_right("Total", 9.0, COL_TOTAL, true);
        self.advance(2.0);
        self.rule(MARGIN, COL_TOTAL);
        self.advance(LINE_HEIGHT);
    }

    /// Writes one table row. Amounts go on the first line; a description
    /// taller than the remaining space continues on the next page.
    fn item(&mut self, item: &QuoteItem, currency: &str) {
        let lines = wrap(&pdf_text(item.description.as_str()), DESCRIPTION_CHARS);
        let height = LINE_HEIGHT * lines.len().min(3) as f32 + 1.0;
        if self.ensure_space(height) {
            self.table_header();
        }

        self.text_right(&decimal_text(item.quantity.get()), 9.0, COL_QUANTITY, false);
        self.text_right(
            &format_money(item.unit_price.get(), currency),
            9.0,
            COL_UNIT_PRICE,
            false,
        );
        if !item.discount_percent.get().is_zero() {
            self.text_right(
                &format!("{}%", decimal_text(item.discount_percent.get())),
                9.0,
                COL_DISCOUNT,
                false,
            );
        }
        self.text_right(&format_money(item.line_total, currency), 9.0, COL_TOTAL, false);
        for (index, line) in lines.iter().enumerate() {
            if index > 0 && self.ensure_space(LINE_HEIGHT) {
                self.table_header();
            }
            self.lowest = self.lowest.min(self.y);
            self.text(line, 9.0, MARGIN, false);
            self.advance(LINE_HEIGHT);
        }
        self.advance(1.0);
    }

    fn totals(&mut self, quote: &QuoteWithItems, currency: &str) {
        let totals = &quote.quote.totals;
        let mut rows = vec![("Subtotal".to_string(), totals.subtotal)];
        if !quote.quote.discount_percent.get().is_zero() {
            rows.push((
                format!(
                    "Descuento ({}%)",
                    decimal_text(quote.quote.discount_percent.get())
                ),
                -totals.discount_amount,
            ));
        }
        rows.push(("Neto".to_string(), totals.net));
        rows.push((
            format!("IVA ({}%)", decimal_text(quote.quote.iva_rate.get())),
            totals.iva_amount,
        ));

        self.ensure_space(LINE_HEIGHT * (rows.len() + 2) as f32);
        self.rule(COL_DISCOUNT - 40.0, COL_TOTAL);
        self.advance(LINE_HEIGHT);
        for (label, amount) in rows {
            self.text_right(&label, 9.0, COL_UNIT_PRICE, false);
            self.text_right(&format_money(amount, currency), 9.0, COL_TOTAL, false);
            self.advance(LINE_HEIGHT);
        }
        self.text_right("Total", 11.0, COL_UNIT_PRICE, true);
        self.text_right(&format_money(totals.total, currency), 11.0, COL_TOTAL, true);
        self.advance(LINE_HEIGHT * 2.0);
    }

    fn paragraph(&mut self, title: &str, body: &str) {
        let lines: Vec<String> = body
            .lines()
            .flat_map(|line| wrap(&pdf_text(line), 95))
            .collect();
        self.ensure_space(LINE_HEIGHT * 2.0);
        self.text(title, 10.0, MARGIN, true);
        self.advance(LINE_HEIGHT);
        for line in lines {
            self.ensure_space(LINE_HEIGHT);
            self.lowest = self.lowest.min(self.y);
            self.text(&line, 9.0, MARGIN, false);
            self.advance(LINE_HEIGHT - 0.5);
        }
        self.advance(3.0);
    }
}

struct Rendered {
    bytes: Vec<u8>,
    pages: usize,
    lowest: f32,
}

fn render(quote: &QuoteWithItems, settings: &BusinessSettings) -> Result<Rendered, PdfError> {
    let title = format!("Cotizacion {}", quote.quote.number);
    let (doc, page, layer) =
        PdfDocument::new(pdf_text(&title), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "contenido");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|err| PdfError::Font(format!("{err:?}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|err| PdfError::Font(format!("{err:?}")))?;

    let (pages, lowest) = {
        let mut writer = Writer {
            doc: &doc,
            layer: doc.get_page(page).get_layer(layer),
            regular,
            bold,
            footer: format!("{} - {}", settings.company_name, quote.quote.number),
            y: PAGE_HEIGHT - MARGIN,
            pages: 1,
            lowest: PAGE_HEIGHT,
        };
        writer.page_footer();

        writer.header(quote, settings);
        writer.customer(quote);
        writer.table_header();
        for item in &quote.items {
            writer.item(item, &settings.currency);
        }
        writer.totals(quote, &settings.currency);

        if let Some(notes) = &quote.quote.notes {
            writer.paragraph("Observaciones", notes);
        }
        if let Some(footer) = &settings.quote_footer {
            writer.paragraph("Condiciones", footer);
        }
        (writer.pages, writer.lowest)
    };

    let bytes = doc
        .save_to_bytes()
        .map_err(|err| PdfError::Render(format!("{err:?}")))?;
    Ok(Rendered {
        bytes,
        pages,
        lowest,
    })
}

/// Renders a stored quote as an A4 PDF document.
pub fn render_quote(
    quote: &QuoteWithItems,
    settings: &BusinessSettings,
) -> Result<Vec<u8>, PdfError> {
    render(quote, settings).map(|rendered| rendered.bytes)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::domain::quote::{Quote, QuoteCustomer, QuoteStatus, QuoteTotals};
    use crate::domain::types::{
        CustomerName, ItemDescription, Money, Percentage, Quantity, QuoteId, UserId,
    };

    fn quote_with(items: usize) -> QuoteWithItems {
        let now = Utc::now().naive_utc();
        let quote_id = QuoteId::new(1).unwrap();
        QuoteWithItems {
            quote: Quote {
                id: quote_id,
                sequence: 7,
                number: "COT-00007".to_string(),
                customer: QuoteCustomer {
                    company_id: None,
                    contact_id: None,
                    name: CustomerName::new("Panadería Ñuñoa").unwrap(),
                    email: None,
                    phone: Some("+56 2 2222 2222".to_string()),
                },
                status: QuoteStatus::Sent,
                notes: Some("Entrega en 48 horas.\nPrecios netos.".to_string()),
                discount_percent: Percentage::parse("5").unwrap(),
                iva_rate: Percentage::parse("19").unwrap(),
                totals: QuoteTotals::default(),
                valid_until: NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
                created_by: UserId::new(1).unwrap(),
                created_at: now,
                updated_at: now,
            },
            items: (0..items)
                .map(|i| QuoteItem {
                    id: i as i32 + 1,
                    quote_id,
                    position: i as i32,
                    product_id: None,
                    description: ItemDescription::new(format!("Artículo de prueba número {i}"))
                        .unwrap(),
                    quantity: Quantity::parse("2").unwrap(),
                    unit_price: Money::parse("1990").unwrap(),
                    discount_percent: Percentage::ZERO,
                    line_total: Decimal::from(3980),
                })
                .collect(),
        }
    }

    #[test]
    fn accents_are_folded_for_builtin_fonts() {
        assert_eq!(pdf_text("Cotización Ñandú ¿sí?"), "Cotizacion Nandu si?");
        assert_eq!(pdf_text("N° 5\n"), "No 5 ");
    }

    #[test]
    fn long_words_and_lines_are_wrapped() {
        assert_eq!(wrap("uno dos tres", 7), vec!["uno dos", "tres"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("", 10), vec![String::new()]);
    }

    #[test]
    fn renders_a_pdf_document() {
        let bytes = render_quote(&quote_with(3), &BusinessSettings::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_tables_continue_on_new_pages() {
        let rendered = render(&quote_with(3), &BusinessSettings::default()).unwrap();
        assert_eq!(rendered.pages, 1);

        let rendered = render(&quote_with(80), &BusinessSettings::default()).unwrap();
        assert!(rendered.pages >= 2);
        assert!(rendered.lowest >= CONTENT_BOTTOM);
    }

    #[test]
    fn description_taller_than_a_page_is_split() {
        let mut quote = quote_with(1);
        let words = vec!["instalacion"; 1200].join(" ");
        quote.items[0].description = ItemDescription::new(words).unwrap();

        let rendered = render(&quote, &BusinessSettings::default()).unwrap();
        assert!(rendered.pages >= 3);
        assert!(rendered.lowest >= CONTENT_BOTTOM);
    }

    #[test]
    fn ampersands_are_printed_as_typed() {
        assert_eq!(pdf_text("Pérez & Hijos"), "Perez & Hijos");
    }
}
