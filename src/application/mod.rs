//! Application layer: services and use cases
//!
//! This layer resolves tags to nodes, drives the domain tree and depends on
//! I/O boundary traits for persistence.

pub mod error;
pub mod error_ext;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
