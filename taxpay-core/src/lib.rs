pub mod backend;
pub mod calculations;
pub mod flow;
pub mod models;
pub mod payment;
pub mod receipt;
pub mod verification;
pub mod wallet;

pub use backend::{BackendRegistry, Backends, ServiceError};
pub use calculations::{ScheduleBook, TaxCalculator, TaxCalculatorError, TaxComputation};
pub use flow::{FlowController, FlowError, Session, Step};
pub use models::*;
pub use payment::{APPROVAL_SENTINEL, PaymentError, PaymentProcessor};
pub use receipt::Receipt;
pub use verification::{TaxId, TaxIdError, TaxIdVerification, TaxIdVerifier, VerificationError};
