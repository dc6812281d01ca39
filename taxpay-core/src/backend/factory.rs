use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::mock::{MockSettlement, MockTaxIdRegistry};
use super::service::{SettlementGateway, TaxIdRegistry};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("no backend named '{requested}' (built in: {})", known.join(", "))]
    Unknown {
        requested: String,
        known: Vec<&'static str>,
    },
}

/// Which backend implementation serves registry lookups and settlement.
///
/// | backend | behaviour |
/// |---------|-----------|
/// | `mock`  | placeholder names and fabricated settlement records |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Matched case-insensitively against the registered names.
    pub backend: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            backend: MockBackendFactory::NAME.to_string(),
        }
    }
}

/// The pair of collaborators the HTTP surface depends on.
#[derive(Clone)]
pub struct Backends {
    pub registry: Arc<dyn TaxIdRegistry>,
    pub settlement: Arc<dyn SettlementGateway>,
}

impl Backends {
    pub fn mock() -> Self {
        Self {
            registry: Arc::new(MockTaxIdRegistry),
            settlement: Arc::new(MockSettlement),
        }
    }
}

/// Builds one flavour of [`Backends`].
#[async_trait]
pub trait BackendFactory: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn create(
        &self,
        config: &BackendConfig,
    ) -> Result<Backends, BackendError>;
}

pub struct MockBackendFactory;

impl MockBackendFactory {
    pub const NAME: &'static str = "mock";
}

#[async_trait]
impl BackendFactory for MockBackendFactory {
    fn backend_name(&self) -> &'static str {
        Self::NAME
    }

    async fn create(
        &self,
        _config: &BackendConfig,
    ) -> Result<Backends, BackendError> {
        Ok(Backends::mock())
    }
}

/// Backend factories by name. Names iterate in order, so error messages
/// and listings are stable.
#[derive(Default)]
pub struct BackendRegistry {
    factories: BTreeMap<&'static str, Box<dyn BackendFactory>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every backend this crate ships.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(MockBackendFactory));
        registry
    }

    /// Later registrations under the same name win.
    pub fn register(
        &mut self,
        factory: Box<dyn BackendFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    pub async fn create(
        &self,
        config: &BackendConfig,
    ) -> Result<Backends, BackendError> {
        let requested = config.backend.trim().to_ascii_lowercase();
        match self.factories.get(requested.as_str()) {
            Some(factory) => factory.create(config).await,
            None => Err(BackendError::Unknown {
                requested: config.backend.clone(),
                known: self.names(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{PaymentStatus, ValidatedPayment};
    use crate::verification::TaxId;

    fn config(backend: &str) -> BackendConfig {
        BackendConfig {
            backend: backend.to_string(),
        }
    }

    // =========================================================================
    // built-in backends
    // =========================================================================

    #[test]
    fn builtin_registry_offers_only_mock() {
        assert_eq!(BackendRegistry::with_builtin().names(), vec!["mock"]);
        assert!(BackendRegistry::new().names().is_empty());
    }

    #[tokio::test]
    async fn default_config_builds_mock_registry_lookup() {
        let backends = BackendRegistry::with_builtin()
            .create(&BackendConfig::default())
            .await
            .unwrap();

        let id = TaxId::parse("1234567890").unwrap();
        let record = backends.registry.lookup(&id).await.unwrap();

        assert_eq!(record.name, "ADEYEMI OLUWASEUN JOHNSON");
        assert!(record.verified);
    }

    #[tokio::test]
    async fn default_config_builds_mock_settlement() {
        let backends = BackendRegistry::with_builtin()
            .create(&BackendConfig::default())
            .await
            .unwrap();

        let payment = ValidatedPayment {
            wallet_address: "ADDR1".to_string(),
            crypto_amount: dec!(5.16),
            crypto_currency: "SOL".to_string(),
            tax_amount: dec!(43000),
            tax_type: "PAYE".to_string(),
        };
        let record = backends.settlement.settle(&payment).await.unwrap();

        assert!(record.transaction_id.starts_with("TXN-"));
        assert_eq!(record.status, PaymentStatus::Completed);
        assert_eq!(record.net_amount, dec!(43000));
    }

    #[tokio::test]
    async fn backend_name_ignores_case_and_padding() {
        let registry = BackendRegistry::with_builtin();

        assert!(registry.create(&config(" Mock ")).await.is_ok());
    }

    // =========================================================================
    // unknown backends
    // =========================================================================

    #[tokio::test]
    async fn unknown_backend_lists_builtin_names() {
        let result = BackendRegistry::with_builtin().create(&config("remita")).await;

        let Err(error) = result else {
            panic!("remita is not a built-in backend");
        };
        assert_eq!(
            error,
            BackendError::Unknown {
                requested: "remita".to_string(),
                known: vec!["mock"],
            }
        );
        assert_eq!(
            error.to_string(),
            "no backend named 'remita' (built in: mock)"
        );
    }

    #[tokio::test]
    async fn empty_registry_rejects_mock() {
        let result = BackendRegistry::new().create(&BackendConfig::default()).await;

        assert!(matches!(
            result,
            Err(BackendError::Unknown { ref known, .. }) if known.is_empty()
        ));
    }
}
