//! Service container for dependency injection
//!
//! Wires up the editing service with its dependencies.

use std::sync::Arc;

use crate::application::services::DomService;
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding settings and I/O implementations for one session.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);

        Self { settings, fs }
    }

    /// Create an editing service with a fresh tree rooted at the configured tag.
    pub fn dom_service(&self) -> DomService {
        DomService::new(&self.settings.root_tag, Arc::clone(&self.fs))
    }
}
