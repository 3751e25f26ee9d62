//! Market data access port trait.

use crate::domain::error::TradesigError;
use crate::domain::price::PriceSample;

pub trait MarketDataPort {
    /// Fetches the hourly price series, ascending, most-recent last.
    /// Implementations must return at least 2 usable samples or fail.
    fn fetch_hourly(&self) -> Result<Vec<PriceSample>, TradesigError>;
}
