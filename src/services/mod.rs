pub mod document_preparer;
pub mod prepared_file;

pub use document_preparer::DocumentPreparer;
pub use prepared_file::PreparedDocument;
