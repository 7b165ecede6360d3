//! In-memory markup tree editor.
//!
//! A [`domain::DomTree`] owns every element of one document; the
//! [`application::services::DomService`] addresses elements by tag and is
//! driven by the numbered menu in [`cli::menu`].

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
