use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OsError {
    #[error("Config directory not found at {0}. Run 'ordem init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Store file not found: {0}")]
    StoreFileNotFound(PathBuf),

    #[error("Failed to parse store file {path}: {source}")]
    StoreParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Client '{0}' not found in clients.toml")]
    ClientNotFound(String),

    #[error("Client '{0}' already exists")]
    ClientExists(String),

    #[error("Service order '{0}' not found")]
    OrderNotFound(String),

    #[error("Invalid order index '{0}'. Use 'ordem list' to see available orders.")]
    InvalidOrderIndex(String),

    #[error("No service items specified. Use --item <description>:<quantity>:<unit price>.")]
    NoItems,

    #[error("Nothing to edit. Pass --item, --reference, and/or --delivery.")]
    NothingToEdit,

    #[error("Invalid item format '{0}'. Expected 'description:quantity:unit_price' (e.g., 'Polo shirt:2:50.00')")]
    InvalidItemFormat(String),

    #[error("Invalid quantity '{qty}' for item '{item}': {reason}")]
    InvalidQuantity {
        item: String,
        qty: String,
        reason: String,
    },

    #[error("Invalid unit price '{price}' for item '{item}': must be a non-negative amount")]
    InvalidUnitPrice { item: String, price: String },

    #[error("Invalid item number {index} for {order} (order has {count} item(s))")]
    InvalidItemIndex {
        order: String,
        index: usize,
        count: usize,
    },

    #[error("Receipt amount must be greater than zero")]
    InvalidReceiptAmount,

    #[error("No receipts recorded for {0}")]
    NoReceipts(String),

    #[error("Invalid receipt index {index} for {order} (only {count} receipt(s) recorded)")]
    InvalidReceiptIndex {
        order: String,
        index: usize,
        count: usize,
    },

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Invalid --granularity value: '{0}'. Use 'daily', 'monthly', or 'yearly'.")]
    InvalidGranularity(String),

    #[error("Invalid --payment value: '{0}'. Use 'pending' or 'paid'.")]
    InvalidPaymentStatus(String),

    #[error("Invalid --production value: '{0}'. Use 'awaiting', 'in-production', or 'done'.")]
    InvalidProductionStatus(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OsError>;
