pub mod error;
pub mod finance;
pub mod numbering;
pub mod series;
pub mod store;

pub use error::{OsError, Result};
pub use series::{Granularity, RevenueSeries};
pub use store::{Client, Config, OrderBook, Receipt, ReceiptLog, ServiceItem, ServiceOrder};
