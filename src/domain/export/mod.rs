//! Downloadable renderings of the restock list.

pub mod ascii;
pub mod csv_file;
pub mod pdf_file;

pub use csv_file::restock_csv;
pub use pdf_file::restock_pdf;

use chrono::NaiveDate;

/// Attachment name used for both formats, e.g. `restock_2024-05-01.csv`.
pub fn export_filename(date: NaiveDate, extension: &str) -> String {
    format!("restock_{}.{}", date.format("%Y-%m-%d"), extension)
}
