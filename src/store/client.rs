use serde::{Deserialize, Serialize};

/// Postal address as captured on the client form.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Address {
    pub street: String,
    pub number: String,
    #[serde(default)]
    pub complement: Option<String>,
    pub district: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// A client record. Orders embed a value copy of this at creation time;
/// the copy is never re-synced with later edits to the record.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Client {
    pub name: String,
    pub tax_id: String,
    pub phone: String,
    pub email: String,
    pub address: Address,
}
