pub mod logging;
pub mod paths;

pub use paths::{HtmlInput, PathContext, RawRequest, ResolvedRequest};
