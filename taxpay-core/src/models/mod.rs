mod payment;
mod tax_bracket;
mod tax_type;

pub use payment::{
    PaymentRecord, PaymentStatus, PaymentSubmission, TaxpayerRecord, ValidatedPayment,
};
pub use tax_bracket::TaxBracket;
pub use tax_type::{TaxType, UnknownTaxType};
