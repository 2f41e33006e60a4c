//! Price data access port.

use crate::domain::error::StockcastError;
use crate::domain::ohlcv::PricePoint;
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily points for `ticker` within `[start_date, end_date]`, oldest first.
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, StockcastError>;

    fn list_tickers(&self) -> Result<Vec<String>, StockcastError>;
}
