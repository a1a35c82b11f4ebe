pub mod job;
pub mod source;

pub use job::{BatchReport, BatchRun, ConversionJob, JobOutcome};
pub use source::{SourceDocument, SourceOrigin};
