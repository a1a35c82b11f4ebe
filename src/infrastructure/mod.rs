pub mod pdf_renderer;

pub use pdf_renderer::{ChromeRenderer, PdfRenderer, PrintOptions};
