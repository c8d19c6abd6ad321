//! Compose file layer
//! - parser.rs: tree-sitter based extraction of service images
//! - options.rs: `impose:` comment annotations
//! - service.rs: Service record updated by the orchestrator
//! - document.rs: ComposeDocument with in-place rewriting and output
//! - error.rs: ComposeError

pub mod document;
pub mod error;
pub mod options;
pub mod parser;
pub mod service;

pub use document::{ComposeDocument, OutputTarget};
pub use error::ComposeError;
pub use options::ServiceOptions;
pub use parser::{ComposeParser, ImageEntry};
pub use service::Service;
