//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{
    LoadReport, RegistryLoader, TreeRegistry, TrialLookupService, TrialTableService,
};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::{NodeClassifier, SearchTermSanitizer, TreeBuilder};
use crate::infrastructure::registry_client::ClinicalTrialsClient;
use crate::infrastructure::traits::{FileSystem, RealFileSystem, TrialRegistry};
use crate::infrastructure::InfraResult;

/// Container holding shared dependencies and building services from them.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Remote trials registry
    pub registry: Arc<dyn TrialRegistry>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let client = ClinicalTrialsClient::new(&settings.registry)?;
        Ok(Self::with_deps(
            settings,
            Arc::new(RealFileSystem),
            Arc::new(client),
        ))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        registry: Arc<dyn TrialRegistry>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            fs,
            registry,
        }
    }

    pub fn classifier(&self) -> NodeClassifier {
        NodeClassifier::new(self.settings.vocabulary())
    }

    pub fn sanitizer(&self) -> SearchTermSanitizer {
        SearchTermSanitizer::new(&self.settings.vocabulary())
    }

    pub fn tree_builder(&self) -> TreeBuilder {
        TreeBuilder::new(self.classifier())
    }

    pub fn registry_loader(&self) -> RegistryLoader {
        RegistryLoader::new(
            Arc::clone(&self.fs),
            self.tree_builder(),
            self.settings.disease.clone(),
        )
    }

    /// Load the tree registry from the configured data directory.
    pub fn load_trees(&self) -> ApplicationResult<(TreeRegistry, LoadReport)> {
        self.registry_loader().load(&self.settings.data_dir)
    }

    pub fn lookup_service(&self) -> TrialLookupService {
        TrialLookupService::new(
            Arc::clone(&self.registry),
            self.sanitizer(),
            self.settings.registry.status.clone(),
            self.settings.registry.page_size,
        )
    }

    pub fn trial_table_service(&self) -> TrialTableService {
        TrialTableService::new(Arc::clone(&self.fs))
    }
}
