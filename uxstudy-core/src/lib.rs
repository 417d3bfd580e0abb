pub mod condition;
pub mod record;

pub use condition::{Condition, UnknownCondition};
pub use record::{IndexField, LogRow, SelectionRecord, TrialState, NOT_APPLICABLE_SENTINEL};
