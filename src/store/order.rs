use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::client::Client;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "PENDING"),
            PaymentStatus::Paid => write!(f, "PAID"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductionStatus {
    Awaiting,
    InProduction,
    Done,
}

impl fmt::Display for ProductionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductionStatus::Awaiting => write!(f, "AWAITING"),
            ProductionStatus::InProduction => write!(f, "IN PRODUCTION"),
            ProductionStatus::Done => write!(f, "DONE"),
        }
    }
}

/// A service line item, owned by its parent order.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceItem {
    pub description: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total: Decimal,
    pub payment: PaymentStatus,
    pub production: ProductionStatus,
}

impl ServiceItem {
    /// New items start unpaid and not yet in production.
    pub fn new(description: String, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            description,
            quantity,
            unit_price,
            total: unit_price * Decimal::from(quantity),
            payment: PaymentStatus::Pending,
            production: ProductionStatus::Awaiting,
        }
    }
}

/// A service order (OS). The client is a denormalized snapshot; scalar
/// fields stay ahead of `client`/`items` so the TOML writer emits values
/// before tables.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceOrder {
    pub id: String,
    pub number: String,
    pub reference: String,
    pub issue_date: NaiveDate,
    pub delivery_date: NaiveDate,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub client: Client,
    pub items: Vec<ServiceItem>,
}

impl ServiceOrder {
    /// Re-derive the order total from its line items. Must be called
    /// after any change to the item list.
    pub fn recompute_total(&mut self) {
        self.total = self.items.iter().map(|i| i.total).sum();
    }

    pub fn production_done(&self) -> bool {
        self.items
            .iter()
            .all(|i| i.production == ProductionStatus::Done)
    }
}

/// The `orders.toml` document: the full order collection.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct OrderBook {
    #[serde(default)]
    pub orders: Vec<ServiceOrder>,
}
