//! Bulk import of products and contacts from CSV or Excel files.
//!
//! Files are first read into a [`RawTable`] of strings. Header cells are then
//! normalized and matched against alias tables so that spreadsheets exported
//! from other tools (Spanish or English headers, accents, odd spacing) map
//! onto the same fields. Bad rows are collected as [`RowError`]s and the rest
//! of the file still goes through.

use std::collections::HashMap;
use std::hash::Hash;
use std::io::Cursor;

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use calamine::Reader;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use thiserror::Error;

use crate::domain::catalog::ProductDraft;
use crate::domain::crm::CompanyUpsert;
use crate::domain::types::{
    CompanyName, ContactName, Email, Money, ProductName, Sku, WebUrl, normalize_key, parse_amount,
};

#[derive(MultipartForm)]
pub struct ImportUploadForm {
    #[multipart(limit = "10MB")]
    pub file: TempFile,
}

impl ImportUploadForm {
    /// Reads the uploaded file into a table, picking the parser by extension.
    pub fn read_table(&self) -> Result<RawTable, ImportError> {
        let file_name = self.file.file_name.clone().unwrap_or_default();
        let bytes = std::fs::read(self.file.file.path())?;
        read_table(&file_name, &bytes)
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Formato de archivo no soportado: '{0}'. Use .csv, .xlsx o .xls")]
    UnsupportedFormat(String),

    #[error("No se pudo leer el archivo: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV inválido: {0}")]
    Csv(#[from] csv::Error),

    #[error("Planilla inválida: {0}")]
    Spreadsheet(String),

    #[error("El archivo no contiene filas")]
    Empty,

    #[error("Falta la columna obligatoria '{0}'")]
    MissingColumn(&'static str),
}

/// Header row plus data rows, all as trimmed strings.
///
/// A row that could not be decoded stays in `rows` as an empty placeholder,
/// so positions keep matching the file, and is reported in `unreadable`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub unreadable: Vec<RowError>,
}

/// Problem found in one data row. Rows are numbered as in the file, with the
/// header on row 1.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

#[derive(Debug)]
pub struct ParsedImport<T> {
    pub rows: Vec<T>,
    pub errors: Vec<RowError>,
}

pub fn read_table(file_name: &str, bytes: &[u8]) -> Result<RawTable, ImportError> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let table = match extension.as_str() {
        "csv" | "txt" => read_csv(bytes)?,
        "xlsx" | "xlsm" | "xls" => read_spreadsheet(bytes)?,
        _ => return Err(ImportError::UnsupportedFormat(file_name.to_string())),
    };

    if table.headers.is_empty() {
        return Err(ImportError::Empty);
    }
    Ok(table)
}

/// Semicolon-separated files are common when Excel runs with a Spanish
/// locale; the header line decides.
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let header = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    let semicolons = header.iter().filter(|b| **b == b';').count();
    let commas = header.iter().filter(|b| **b == b',').count();
    if semicolons > commas { b';' } else { b',' }
}

fn read_csv(bytes: &[u8]) -> Result<RawTable, ImportError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(bytes))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader
        .headers()?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    let mut unreadable = Vec::new();
    for (index, record) in reader.byte_records().enumerate() {
        let decoded = record.map_err(|e| e.to_string()).and_then(|record| {
            record
                .iter()
                .map(|field| {
                    std::str::from_utf8(field)
                        .map(str::to_string)
                        .map_err(|_| "la fila no está codificada en UTF-8".to_string())
                })
                .collect::<Result<Vec<String>, String>>()
        });
        match decoded {
            Ok(row) => rows.push(row),
            Err(message) => {
                unreadable.push(RowError {
                    row: file_row(index),
                    message,
                });
                rows.push(Vec::new());
            }
        }
    }

    Ok(RawTable {
        headers,
        rows,
        unreadable,
    })
}

fn read_spreadsheet(bytes: &[u8]) -> Result<RawTable, ImportError> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ImportError::Spreadsheet(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ImportError::Empty)?
        .map_err(|e| ImportError::Spreadsheet(e.to_string()))?;

    let mut rows = range.rows().map(|row| {
        row.iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect::<Vec<String>>()
    });

    let headers = rows.next().ok_or(ImportError::Empty)?;
    Ok(RawTable {
        headers,
        rows: rows.collect(),
        unreadable: Vec::new(),
    })
}

/// Normalizes a header cell: accents stripped, lower-cased, runs of
/// non-alphanumeric characters collapsed to `_` (`"Razón  Social"` ->
/// `razon_social`).
pub fn normalize_header(header: &str) -> String {
    let key = normalize_key(header);
    let mut normalized = String::with_capacity(key.len());
    let mut pending = false;
    for c in key.chars() {
        if c.is_ascii_alphanumeric() {
            if pending && !normalized.is_empty() {
                normalized.push('_');
            }
            pending = false;
            normalized.push(c);
        } else {
            pending = true;
        }
    }
    normalized
}

fn map_headers<F: Copy + Eq + Hash>(
    headers: &[String],
    aliases: &[(&str, F)],
) -> HashMap<F, usize> {
    let mut columns = HashMap::new();
    for (index, header) in headers.iter().enumerate() {
        let normalized = normalize_header(header);
        if let Some((_, field)) = aliases.iter().find(|(alias, _)| *alias == normalized) {
            columns.entry(*field).or_insert(index);
        }
    }
    columns
}

fn cell<F: Eq + Hash>(row: &[String], columns: &HashMap<F, usize>, field: F) -> Option<String> {
    columns
        .get(&field)
        .and_then(|index| row.get(*index))
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|value| value.trim().is_empty())
}

/// Rows are numbered from 1 and the header occupies row 1.
fn file_row(index: usize) -> usize {
    index + 2
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ProductField {
    Name,
    Sku,
    Price,
    Description,
    Stock,
    Category,
    Image,
    Published,
}

const PRODUCT_ALIASES: &[(&str, ProductField)] = &[
    ("name", ProductField::Name),
    ("nombre", ProductField::Name),
    ("producto", ProductField::Name),
    ("sku", ProductField::Sku),
    ("codigo", ProductField::Sku),
    ("code", ProductField::Sku),
    ("price", ProductField::Price),
    ("precio", ProductField::Price),
    ("valor", ProductField::Price),
    ("description", ProductField::Description),
    ("descripcion", ProductField::Description),
    ("detalle", ProductField::Description),
    ("stock", ProductField::Stock),
    ("cantidad", ProductField::Stock),
    ("existencias", ProductField::Stock),
    ("category", ProductField::Category),
    ("categoria", ProductField::Category),
    ("image", ProductField::Image),
    ("imagen", ProductField::Image),
    ("image_url", ProductField::Image),
    ("published", ProductField::Published),
    ("publicado", ProductField::Published),
    ("activo", ProductField::Published),
];

/// Product parsed from one row, with its category name still unresolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRow {
    pub row: usize,
    pub draft: ProductDraft,
    pub category: Option<String>,
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        normalize_key(raw).as_str(),
        "1" | "x" | "s" | "si" | "y" | "yes" | "true" | "publicado" | "activo"
    )
}

fn parse_stock(raw: &str) -> Result<i32, String> {
    parse_amount(raw)
        .ok()
        .and_then(|value| value.trunc().to_i32())
        .ok_or_else(|| format!("stock inválido '{raw}'"))
}

fn product_row(
    row: &[String],
    columns: &HashMap<ProductField, usize>,
    number: usize,
) -> Result<ProductRow, String> {
    let name = cell(row, columns, ProductField::Name)
        .map(ProductName::new)
        .transpose()
        .map_err(|e| e.to_string())?
        .ok_or_else(|| "falta el nombre".to_string())?;
    let price_raw =
        cell(row, columns, ProductField::Price).ok_or_else(|| "falta el precio".to_string())?;
    let price =
        Money::parse(&price_raw).map_err(|_| format!("precio inválido '{price_raw}'"))?;
    let sku = cell(row, columns, ProductField::Sku)
        .map(Sku::new)
        .transpose()
        .map_err(|e| e.to_string())?;
    let stock = cell(row, columns, ProductField::Stock)
        .map(|raw| parse_stock(&raw))
        .transpose()?
        .unwrap_or(0);
    let image_url = cell(row, columns, ProductField::Image)
        .map(|raw| WebUrl::new(raw.clone()).map_err(|_| format!("URL de imagen inválida '{raw}'")))
        .transpose()?;
    let is_published = cell(row, columns, ProductField::Published)
        .map(|raw| parse_flag(&raw))
        .unwrap_or(false);

    Ok(ProductRow {
        row: number,
        draft: ProductDraft::new(
            sku,
            name,
            cell(row, columns, ProductField::Description),
            price,
            stock,
            None,
            image_url,
            is_published,
        ),
        category: cell(row, columns, ProductField::Category),
    })
}

/// Maps a table onto products. Fails only when a required column is missing.
pub fn parse_products(table: &RawTable) -> Result<ParsedImport<ProductRow>, ImportError> {
    let columns = map_headers(&table.headers, PRODUCT_ALIASES);
    if !columns.contains_key(&ProductField::Name) {
        return Err(ImportError::MissingColumn("nombre"));
    }
    if !columns.contains_key(&ProductField::Price) {
        return Err(ImportError::MissingColumn("precio"));
    }

    let mut parsed = ParsedImport {
        rows: Vec::new(),
        errors: table.unreadable.clone(),
    };
    for (index, row) in table.rows.iter().enumerate() {
        if is_blank(row) {
            continue;
        }
        let number = file_row(index);
        match product_row(row, &columns, number) {
            Ok(product) => parsed.rows.push(product),
            Err(message) => parsed.errors.push(RowError {
                row: number,
                message,
            }),
        }
    }
    parsed.errors.sort_by_key(|error| error.row);
    Ok(parsed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ContactField {
    Company,
    Name,
    Email,
    Phone,
    Position,
    TaxId,
    Address,
}

const CONTACT_ALIASES: &[(&str, ContactField)] = &[
    ("company", ContactField::Company),
    ("empresa", ContactField::Company),
    ("razon_social", ContactField::Company),
    ("name", ContactField::Name),
    ("nombre", ContactField::Name),
    ("contacto", ContactField::Name),
    ("email", ContactField::Email),
    ("correo", ContactField::Email),
    ("mail", ContactField::Email),
    ("phone", ContactField::Phone),
    ("telefono", ContactField::Phone),
    ("fono", ContactField::Phone),
    ("celular", ContactField::Phone),
    ("position", ContactField::Position),
    ("cargo", ContactField::Position),
    ("tax_id", ContactField::TaxId),
    ("rut", ContactField::TaxId),
    ("nit", ContactField::TaxId),
    ("address", ContactField::Address),
    ("direccion", ContactField::Address),
];

/// Contact parsed from one row. The company, when present, is upserted first
/// and the contact is then linked to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactRow {
    pub row: usize,
    pub company: Option<CompanyUpsert>,
    pub name: ContactName,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub position: Option<String>,
}

fn contact_row(
    row: &[String],
    columns: &HashMap<ContactField, usize>,
    number: usize,
) -> Result<ContactRow, String> {
    let name = cell(row, columns, ContactField::Name)
        .map(ContactName::new)
        .transpose()
        .map_err(|e| e.to_string())?
        .ok_or_else(|| "falta el nombre del contacto".to_string())?;
    let email = cell(row, columns, ContactField::Email)
        .map(|raw| Email::new(raw.clone()).map_err(|_| format!("correo inválido '{raw}'")))
        .transpose()?;
    let company = cell(row, columns, ContactField::Company)
        .map(CompanyName::new)
        .transpose()
        .map_err(|e| e.to_string())?
        .map(|company| {
            CompanyUpsert::new(
                company,
                cell(row, columns, ContactField::TaxId),
                None,
                None,
                cell(row, columns, ContactField::Address),
            )
        });

    Ok(ContactRow {
        row: number,
        company,
        name,
        email,
        phone: cell(row, columns, ContactField::Phone),
        position: cell(row, columns, ContactField::Position),
    })
}

/// Maps a table onto contacts. Fails only when the name column is missing.
pub fn parse_contacts(table: &RawTable) -> Result<ParsedImport<ContactRow>, ImportError> {
    let columns = map_headers(&table.headers, CONTACT_ALIASES);
    if !columns.contains_key(&ContactField::Name) {
        return Err(ImportError::MissingColumn("nombre"));
    }

    let mut parsed = ParsedImport {
        rows: Vec::new(),
        errors: table.unreadable.clone(),
    };
    for (index, row) in table.rows.iter().enumerate() {
        if is_blank(row) {
            continue;
        }
        let number = file_row(index);
        match contact_row(row, &columns, number) {
            Ok(contact) => parsed.rows.push(contact),
            Err(message) => parsed.errors.push(RowError {
                row: number,
                message,
            }),
        }
    }
    parsed.errors.sort_by_key(|error| error.row);
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn headers_are_normalized() {
        assert_eq!(normalize_header("  Razón  Social "), "razon_social");
        assert_eq!(normalize_header("Image-URL"), "image_url");
        assert_eq!(normalize_header("Teléfono"), "telefono");
        assert_eq!(normalize_header("CÓDIGO"), "codigo");
    }

    #[test]
    fn semicolon_csv_with_spanish_headers() {
        let csv = "\u{feff}Código;Nombre;Precio;Categoría;Publicado\n\
                   A-1;Martillo;$ 5.990,00;Herramientas;sí\n\
                   ;;;;\n\
                   A-2;Clavos;1.234,5;;no\n";
        let table = read_table("productos.csv", csv.as_bytes()).unwrap();
        assert_eq!(table.headers[0], "Código");

        let parsed = parse_products(&table).unwrap();
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.rows.len(), 2);

        let hammer = &parsed.rows[0];
        assert_eq!(hammer.row, 2);
        assert_eq!(hammer.draft.sku.as_ref().map(Sku::as_str), Some("A-1"));
        assert_eq!(hammer.draft.price.get(), Decimal::new(5990, 0));
        assert_eq!(hammer.category.as_deref(), Some("Herramientas"));
        assert!(hammer.draft.is_published);

        let nails = &parsed.rows[1];
        assert_eq!(nails.row, 4);
        assert_eq!(nails.draft.price.get(), Decimal::new(12345, 1));
        assert!(!nails.draft.is_published);
    }

    #[test]
    fn bad_rows_are_reported_with_file_row_numbers() {
        let csv = "name,price,stock\nTaladro,49990,3\n,100,1\nSierra,abc,1\nLija,500,muchos\n";
        let table = read_table("p.csv", csv.as_bytes()).unwrap();
        let parsed = parse_products(&table).unwrap();

        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].draft.stock, 3);
        let rows: Vec<usize> = parsed.errors.iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![3, 4, 5]);
    }

    #[test]
    fn undecodable_row_is_reported_and_the_rest_imported() {
        let mut csv = b"nombre;precio\nTaladro;49990\n".to_vec();
        csv.extend_from_slice(b"Caf\xe9 molido;5990\n");
        csv.extend_from_slice(b"Sierra;12990\n");
        let table = read_table("latin1.csv", &csv).unwrap();
        let parsed = parse_products(&table).unwrap();

        let names: Vec<&str> = parsed.rows.iter().map(|r| r.draft.name.as_str()).collect();
        assert_eq!(names, vec!["Taladro", "Sierra"]);
        assert_eq!(parsed.rows[1].row, 4);
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].row, 3);
    }

    #[test]
    fn plain_text_cells_keep_ampersands() {
        let csv = "Empresa,Contacto,Cargo\nPérez & Hijos,Ana,Compras & Logística\n";
        let table = read_table("c.csv", csv.as_bytes()).unwrap();
        let parsed = parse_contacts(&table).unwrap();
        let ana = &parsed.rows[0];
        assert_eq!(ana.company.as_ref().unwrap().name.as_str(), "Pérez & Hijos");
        assert_eq!(ana.position.as_deref(), Some("Compras & Logística"));
    }

    #[test]
    fn missing_required_header_rejects_file() {
        let csv = "nombre,descripcion\nTaladro,Percutor\n";
        let table = read_table("p.csv", csv.as_bytes()).unwrap();
        assert!(matches!(
            parse_products(&table),
            Err(ImportError::MissingColumn("precio"))
        ));
    }

    #[test]
    fn contacts_carry_their_company() {
        let csv = "Empresa,Contacto,Correo,Fono,RUT\n\
                   Comercial Andes,María Pérez,MARIA@andes.cl,+56 2 2345 6789,76.123.456-7\n\
                   ,Juan Soto,,,\n\
                   Otra,Pedro,no-es-correo,,\n";
        let table = read_table("contactos.CSV", csv.as_bytes()).unwrap();
        let parsed = parse_contacts(&table).unwrap();

        assert_eq!(parsed.rows.len(), 2);
        let maria = &parsed.rows[0];
        let company = maria.company.as_ref().unwrap();
        assert_eq!(company.name.as_str(), "Comercial Andes");
        assert_eq!(company.tax_id.as_deref(), Some("76.123.456-7"));
        assert_eq!(maria.email.as_ref().map(Email::as_str), Some("maria@andes.cl"));
        assert!(parsed.rows[1].company.is_none());

        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].row, 4);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        assert!(matches!(
            read_table("productos.pdf", b"x"),
            Err(ImportError::UnsupportedFormat(_))
        ));
    }
}
