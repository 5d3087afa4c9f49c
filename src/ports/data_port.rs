//! Price data port trait.

use crate::domain::error::TickwiseError;
use crate::domain::ohlcv::PriceSeries;

pub trait DataPort {
    /// Load the full price history for `symbol`, ascending by date.
    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, TickwiseError>;

    fn list_symbols(&self) -> Result<Vec<String>, TickwiseError>;
}
