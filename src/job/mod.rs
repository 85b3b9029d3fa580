//! Merge job description, templating and binding

pub mod binder;
pub mod codec;
pub mod document;
pub mod spec;
pub mod template;

pub use binder::{BindError, JobTemplateBinder};
pub use codec::CodecTable;
pub use document::JobDocument;
pub use spec::{JobSpecError, MergeJobSpec, join_path};
pub use template::{JobTemplate, TemplateError};
