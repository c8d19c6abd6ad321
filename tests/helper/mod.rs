#![allow(dead_code)]

pub mod compose;
pub mod registry;

pub use compose::create_compose_file;
pub use registry::MockRegistry;
