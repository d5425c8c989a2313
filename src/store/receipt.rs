use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A partial payment recorded against an order. `order_id` is a soft
/// back-reference: deleting the order does not delete its receipts, so
/// a receipt may outlive its target.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Receipt {
    pub id: String,
    pub order_id: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    #[serde(default)]
    pub note: Option<String>,
}

/// The `receipts.toml` document: the full receipt collection.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ReceiptLog {
    #[serde(default)]
    pub receipts: Vec<Receipt>,
}
