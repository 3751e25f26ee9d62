//! Rule source port trait.

use crate::domain::error::TradesigError;

pub trait RuleSourcePort {
    /// Returns the raw rule strings in author order. Order is significant
    /// downstream (first match wins) and must be preserved.
    fn load_rules(&self) -> Result<Vec<String>, TradesigError>;
}
