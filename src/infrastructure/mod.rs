pub mod pdf_reader;
pub mod pdf_writer;

pub use pdf_reader::{document_id, extract_pages, extract_text};
pub use pdf_writer::{PageLayout, PdfReportWriter, PlacedLine};
