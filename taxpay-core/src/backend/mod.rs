//! Swappable collaborators behind the verification and payment endpoints.

pub mod factory;
pub mod mock;
pub mod service;

pub use factory::{
    BackendConfig, BackendError, BackendFactory, BackendRegistry, Backends, MockBackendFactory,
};
pub use mock::{MockSettlement, MockTaxIdRegistry};
pub use service::{ServiceError, SettlementGateway, TaxIdRegistry};
