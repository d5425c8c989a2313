mod client;
mod order;
mod receipt;
mod settings;

pub use client::{Address, Client};
pub use order::{OrderBook, PaymentStatus, ProductionStatus, ServiceItem, ServiceOrder};
pub use receipt::{Receipt, ReceiptLog};
pub use settings::Config;

use crate::error::{OsError, Result};
use directories::ProjectDirs;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.ordem/)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "ordem") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.ordem/
    let home = dirs_home().ok_or_else(|| {
        OsError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".ordem"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Load the main config.toml
pub fn load_config(config_dir: &PathBuf) -> Result<Config> {
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(OsError::StoreFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| OsError::StoreParse { path, source: e })
}

/// Load clients.toml as a HashMap keyed by client id
pub fn load_clients(config_dir: &PathBuf) -> Result<HashMap<String, Client>> {
    let path = config_dir.join("clients.toml");
    if !path.exists() {
        return Err(OsError::StoreFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| OsError::StoreParse { path, source: e })
}

/// Save clients.toml
pub fn save_clients(config_dir: &PathBuf, clients: &HashMap<String, Client>) -> Result<()> {
    let path = config_dir.join("clients.toml");
    let content = toml::to_string_pretty(clients).map_err(|e| {
        OsError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })?;
    fs::write(path, content)?;
    Ok(())
}

/// Load orders.toml (empty book if missing)
pub fn load_orders(config_dir: &PathBuf) -> Result<OrderBook> {
    let path = config_dir.join("orders.toml");
    if !path.exists() {
        return Ok(OrderBook::default());
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| OsError::StoreParse { path, source: e })
}

/// Save orders.toml
pub fn save_orders(config_dir: &PathBuf, book: &OrderBook) -> Result<()> {
    let path = config_dir.join("orders.toml");
    let content = toml::to_string_pretty(book).map_err(|e| {
        OsError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })?;
    fs::write(path, content)?;
    Ok(())
}

/// Load receipts.toml (empty log if missing)
pub fn load_receipts(config_dir: &PathBuf) -> Result<ReceiptLog> {
    let path = config_dir.join("receipts.toml");
    if !path.exists() {
        return Ok(ReceiptLog::default());
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| OsError::StoreParse { path, source: e })
}

/// Save receipts.toml
pub fn save_receipts(config_dir: &PathBuf, log: &ReceiptLog) -> Result<()> {
    let path = config_dir.join("receipts.toml");
    let content = toml::to_string_pretty(log).map_err(|e| {
        OsError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })?;
    fs::write(path, content)?;
    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[shop]
name = "Your Uniform Shop"
# tax_id = "12.345.678/0001-90"   # optional
# phone = "+55 11 99999-0000"     # optional
# email = "contact@yourshop.com"  # optional

[display]
currency_symbol = "R$"
"#;

/// Template content for clients.toml
pub const CLIENTS_TEMPLATE: &str = r#"# Clients live here, one table per client. The table name (e.g.
# [example-client]) is the client id used by the new-order command:
#
#   ordem new --client example-client --reference "Winter uniforms" \
#     --delivery 2026-12-01 --item "Polo shirt:10:45.00"
#
# Prefer 'ordem add-client' over editing this file by hand.

[example-client]
name = "Example Client Ltda."
tax_id = "11.222.333/0001-44"
phone = "+55 11 98888-7777"
email = "purchasing@example.com"

[example-client.address]
street = "Rua das Flores"
number = "123"
district = "Centro"
city = "Sao Paulo"
state = "SP"
postal_code = "01000-000"
"#;
