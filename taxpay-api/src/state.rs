use std::sync::Arc;

use anyhow::{Context, Result};
use taxpay_core::backend::{BackendRegistry, Backends, MockBackendFactory};
use taxpay_core::calculations::ScheduleBook;
use taxpay_core::{PaymentProcessor, TaxIdVerifier};
use taxpay_data::TaxScheduleLoader;
use tracing::info;

use crate::config::ServiceConfig;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub verifier: TaxIdVerifier,
    pub processor: PaymentProcessor,
    pub schedules: Arc<ScheduleBook>,
    pub backend: String,
}

impl AppState {
    pub fn new(
        backends: Backends,
        schedules: ScheduleBook,
        backend: impl Into<String>,
    ) -> Self {
        Self {
            verifier: TaxIdVerifier::new(backends.registry),
            processor: PaymentProcessor::new(backends.settlement),
            schedules: Arc::new(schedules),
            backend: backend.into(),
        }
    }

    /// Mock backends and the statutory tables.
    pub fn mock() -> Self {
        Self::new(
            Backends::mock(),
            ScheduleBook::statutory(),
            MockBackendFactory::NAME,
        )
    }

    /// Builds the backends named in `config` and loads the schedule file, if any.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        let backends = BackendRegistry::with_builtin()
            .create(&config.backend_config())
            .await
            .with_context(|| format!("Failed to create backend '{}'", config.backend))?;

        let schedules = match &config.schedule_file {
            Some(path) => TaxScheduleLoader::load_path(path)
                .with_context(|| format!("Failed to load schedules: {}", path.display()))?,
            None => ScheduleBook::statutory(),
        };

        info!(
            backend = %config.backend,
            tax_types = schedules.tax_types().len(),
            "service state ready"
        );
        Ok(Self::new(backends, schedules, config.backend.clone()))
    }
}
