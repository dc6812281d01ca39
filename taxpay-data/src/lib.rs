mod loader;

pub use loader::{ScheduleLoaderError, TaxBracketRecord, TaxScheduleLoader};
