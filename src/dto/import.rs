use serde::Serialize;

use crate::forms::import::RowError;

/// Outcome of a bulk import, shown after the upload.
#[derive(Debug, Default, Serialize, PartialEq)]
pub struct ImportReport {
    pub imported: usize,
    pub errors: Vec<RowError>,
}

impl ImportReport {
    pub fn summary(&self) -> String {
        if self.errors.is_empty() {
            format!("{} filas importadas.", self.imported)
        } else {
            format!(
                "{} filas importadas, {} con errores.",
                self.imported,
                self.errors.len()
            )
        }
    }
}
