mod error;
mod finance;
mod numbering;
mod series;
mod store;

use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

use crate::error::{OsError, Result};
use crate::series::{revenue_series, Granularity, RevenueSeries};
use crate::store::{
    config_dir, load_clients, load_config, load_orders, load_receipts, save_clients, save_orders,
    save_receipts, Address, Client, OrderBook, PaymentStatus, ProductionStatus, Receipt,
    ServiceItem, ServiceOrder, CLIENTS_TEMPLATE, CONFIG_TEMPLATE,
};

#[derive(Parser)]
#[command(name = "ordem")]
#[command(version, about = "CLI service-order management for a uniform shop", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.ordem or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with template files
    Init,

    /// Register a new client
    AddClient {
        /// Client identifier (e.g., 'acme')
        id: String,

        #[arg(long)]
        name: String,

        /// CPF/CNPJ
        #[arg(long)]
        tax_id: String,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        street: String,

        /// Street number
        #[arg(long)]
        number: String,

        /// Address complement (apartment, suite, ...)
        #[arg(long)]
        complement: Option<String>,

        #[arg(long)]
        district: String,

        #[arg(long)]
        city: String,

        #[arg(long)]
        state: String,

        #[arg(long)]
        postal_code: String,
    },

    /// List registered clients
    Clients {
        /// Case-insensitive substring filter on the client name
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Create a new service order
    New {
        /// Client identifier from clients.toml
        #[arg(short, long)]
        client: String,

        /// Free-text reference/project label
        #[arg(short, long)]
        reference: String,

        /// Delivery due date (YYYY-MM-DD)
        #[arg(short, long)]
        delivery: String,

        /// Service items in format "description:quantity:unit_price" (can be repeated)
        #[arg(short, long, value_name = "DESC:QTY:PRICE")]
        item: Vec<String>,

        /// Issue date (default: today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List service orders
    List {
        /// Case-insensitive filter on number, client name, or reference
        #[arg(short, long)]
        search: Option<String>,

        /// Number of orders to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show one order in full: items, receipts, balance
    Show {
        /// Order number or index from 'list' (e.g., 1 or 00001)
        order: String,
    },

    /// Edit an order: replace its item list and/or header fields
    Edit {
        /// Order number or index from 'list' (e.g., 1 or 00001)
        order: String,

        /// New items in format "description:quantity:unit_price" (replaces existing items)
        #[arg(short, long, value_name = "DESC:QTY:PRICE")]
        item: Vec<String>,

        /// New reference label
        #[arg(short, long)]
        reference: Option<String>,

        /// New delivery date (YYYY-MM-DD)
        #[arg(short, long)]
        delivery: Option<String>,
    },

    /// Update payment/production status of one item on an order
    SetItem {
        /// Order number or index from 'list' (e.g., 1 or 00001)
        order: String,

        /// 1-based item number from 'show'
        item: usize,

        /// New payment status: pending or paid
        #[arg(long)]
        payment: Option<String>,

        /// New production status: awaiting, in-production, or done
        #[arg(long)]
        production: Option<String>,
    },

    /// Delete a service order (its receipts are kept)
    Delete {
        /// Order number or index from 'list' (e.g., 1 or 00001)
        order: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Record a partial receipt against an order
    AddReceipt {
        /// Order number or index from 'list' (e.g., 1 or 00001)
        order: String,

        /// Amount received
        amount: Decimal,

        /// Receipt date (default: today)
        #[arg(long)]
        date: Option<String>,

        /// Free-text note
        #[arg(long)]
        note: Option<String>,
    },

    /// Edit a receipt recorded against an order
    EditReceipt {
        /// Order number or index from 'list' (e.g., 1 or 00001)
        order: String,

        /// 1-based index of the receipt to edit (default: last)
        #[arg(long)]
        index: Option<usize>,

        #[arg(long)]
        amount: Option<Decimal>,

        /// New receipt date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        note: Option<String>,
    },

    /// Remove a receipt from an order
    RemoveReceipt {
        /// Order number or index from 'list' (e.g., 1 or 00001)
        order: String,

        /// 1-based index of the receipt to remove (default: last)
        #[arg(long)]
        index: Option<usize>,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// List receipts, for one order or across all orders
    Receipts {
        /// Order number or index from 'list'; omit to list every receipt
        order: Option<String>,
    },

    /// Accounts-receivable report: orders with a positive balance
    Receivables,

    /// Summary figures and the revenue series
    Dashboard {
        /// Chart granularity: daily, monthly, or yearly
        #[arg(short, long, default_value = "daily")]
        granularity: String,

        /// Emit the dashboard as JSON instead of tables
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::AddClient {
            id,
            name,
            tax_id,
            phone,
            email,
            street,
            number,
            complement,
            district,
            city,
            state,
            postal_code,
        } => cmd_add_client(
            &cfg_dir,
            &id,
            Client {
                name,
                tax_id,
                phone,
                email,
                address: Address {
                    street,
                    number,
                    complement,
                    district,
                    city,
                    state,
                    postal_code,
                },
            },
        ),
        Commands::Clients { search } => cmd_clients(&cfg_dir, search.as_deref()),
        Commands::New {
            client,
            reference,
            delivery,
            item,
            date,
        } => cmd_new(&cfg_dir, &client, &reference, &delivery, &item, date),
        Commands::List { search, limit } => cmd_list(&cfg_dir, search.as_deref(), limit),
        Commands::Show { order } => cmd_show(&cfg_dir, &order),
        Commands::Edit {
            order,
            item,
            reference,
            delivery,
        } => cmd_edit(&cfg_dir, &order, &item, reference, delivery),
        Commands::SetItem {
            order,
            item,
            payment,
            production,
        } => cmd_set_item(&cfg_dir, &order, item, payment.as_deref(), production.as_deref()),
        Commands::Delete { order, yes } => cmd_delete(&cfg_dir, &order, yes),
        Commands::AddReceipt {
            order,
            amount,
            date,
            note,
        } => cmd_add_receipt(&cfg_dir, &order, amount, date, note),
        Commands::EditReceipt {
            order,
            index,
            amount,
            date,
            note,
        } => cmd_edit_receipt(&cfg_dir, &order, index, amount, date, note),
        Commands::RemoveReceipt { order, index, yes } => {
            cmd_remove_receipt(&cfg_dir, &order, index, yes)
        }
        Commands::Receipts { order } => cmd_receipts(&cfg_dir, order.as_deref()),
        Commands::Receivables => cmd_receivables(&cfg_dir),
        Commands::Dashboard { granularity, json } => cmd_dashboard(&cfg_dir, &granularity, json),
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &PathBuf) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(OsError::AlreadyInitialized(cfg_dir.clone()));
    }

    fs::create_dir_all(cfg_dir)?;

    // orders.toml and receipts.toml are created on first write
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    fs::write(cfg_dir.join("clients.toml"), CLIENTS_TEMPLATE)?;

    println!("Initialized ordem config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your shop details:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Register your clients:   ordem add-client <id> --name ... ");
    println!();
    println!("Then create your first service order:");
    println!("  ordem new --client <client-id> --reference <label> \\");
    println!("    --delivery <YYYY-MM-DD> --item <description>:<qty>:<unit price>");

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "TAX ID")]
    tax_id: String,
    #[tabled(rename = "PHONE")]
    phone: String,
    #[tabled(rename = "CITY")]
    city: String,
}

#[derive(Tabled)]
struct OrderRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "ISSUED")]
    issued: String,
    #[tabled(rename = "DELIVERY")]
    delivery: String,
    #[tabled(rename = "REFERENCE")]
    reference: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "CLIENT")]
    client: String,
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "QTY")]
    quantity: u32,
    #[tabled(rename = "UNIT PRICE")]
    unit_price: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "PAYMENT")]
    payment: String,
    #[tabled(rename = "PRODUCTION")]
    production: String,
}

#[derive(Tabled)]
struct ReceiptRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
    #[tabled(rename = "NOTE")]
    note: String,
}

#[derive(Tabled)]
struct AllReceiptsRow {
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "OS")]
    order: String,
    #[tabled(rename = "CLIENT")]
    client: String,
    #[tabled(rename = "ORDER TOTAL")]
    order_total: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
    #[tabled(rename = "NOTE")]
    note: String,
}

#[derive(Tabled)]
struct ReceivableRow {
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "CLIENT")]
    client: String,
    #[tabled(rename = "REFERENCE")]
    reference: String,
    #[tabled(rename = "DELIVERY")]
    delivery: String,
    #[tabled(rename = "PENDING")]
    pending: String,
    #[tabled(rename = "RECEIVED")]
    received: String,
    #[tabled(rename = "BALANCE")]
    balance: String,
}

#[derive(Tabled)]
struct SeriesRow {
    #[tabled(rename = "PERIOD")]
    period: String,
    #[tabled(rename = "VALUE")]
    value: String,
}

/// Format a money amount with two decimal places and thousands separators
fn format_money(value: Decimal, symbol: &str) -> String {
    let fixed = format!("{:.2}", value);
    let (whole, frac) = match fixed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (fixed.as_str(), "00"),
    };
    let negative = whole.starts_with('-');
    let digits = whole.trim_start_matches('-');
    let grouped = group_digits(digits);

    if negative {
        format!("-{symbol}{grouped}.{frac}")
    } else {
        format!("{symbol}{grouped}.{frac}")
    }
}

fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out.chars().rev().collect()
}

fn truncate(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_length).collect();
    cut + "..."
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| OsError::InvalidDate(s.to_string()))
}

/// Parse item input like "Polo shirt:2:50.00" into a fresh service item.
/// Splits from the right so the description may itself contain colons.
fn parse_item_input(input: &str) -> Result<ServiceItem> {
    let mut parts = input.rsplitn(3, ':');
    let price_str = parts.next();
    let qty_str = parts.next();
    let description = parts.next();

    let (Some(price_str), Some(qty_str), Some(description)) = (price_str, qty_str, description)
    else {
        return Err(OsError::InvalidItemFormat(input.to_string()));
    };

    if description.is_empty() {
        return Err(OsError::InvalidItemFormat(input.to_string()));
    }

    let quantity: u32 = qty_str.parse().map_err(|_| OsError::InvalidQuantity {
        item: description.to_string(),
        qty: qty_str.to_string(),
        reason: "must be a whole number".to_string(),
    })?;

    if quantity == 0 {
        return Err(OsError::InvalidQuantity {
            item: description.to_string(),
            qty: qty_str.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let unit_price: Decimal = price_str.parse().map_err(|_| OsError::InvalidUnitPrice {
        item: description.to_string(),
        price: price_str.to_string(),
    })?;

    if unit_price < Decimal::ZERO {
        return Err(OsError::InvalidUnitPrice {
            item: description.to_string(),
            price: price_str.to_string(),
        });
    }

    Ok(ServiceItem::new(
        description.to_string(),
        quantity,
        unit_price,
    ))
}

fn parse_items(inputs: &[String]) -> Result<Vec<ServiceItem>> {
    inputs.iter().map(|i| parse_item_input(i)).collect()
}

fn parse_payment_status(s: &str) -> Result<PaymentStatus> {
    match s {
        "pending" => Ok(PaymentStatus::Pending),
        "paid" => Ok(PaymentStatus::Paid),
        _ => Err(OsError::InvalidPaymentStatus(s.to_string())),
    }
}

fn parse_production_status(s: &str) -> Result<ProductionStatus> {
    match s {
        "awaiting" => Ok(ProductionStatus::Awaiting),
        "in-production" => Ok(ProductionStatus::InProduction),
        "done" => Ok(ProductionStatus::Done),
        _ => Err(OsError::InvalidProductionStatus(s.to_string())),
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    use std::io::Write;

    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let answer = line.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Orders in display order: newest issue date first, number as tiebreak.
fn sorted_orders(book: &OrderBook) -> Vec<&ServiceOrder> {
    let mut view: Vec<&ServiceOrder> = book.orders.iter().collect();
    view.sort_by(|a, b| {
        b.issue_date
            .cmp(&a.issue_date)
            .then(b.number.cmp(&a.number))
    });
    view
}

/// Resolve an order reference to the actual order number. Accepts either
/// the order number or a 1-based index from 'list'. Order numbers are
/// themselves numeric, so an exact number match wins over the index
/// interpretation.
fn resolve_order_number(cfg_dir: &PathBuf, reference: &str) -> Result<String> {
    let book = load_orders(cfg_dir)?;

    if book.orders.iter().any(|o| o.number == reference) {
        return Ok(reference.to_string());
    }

    if let Ok(idx) = reference.parse::<usize>() {
        if idx == 0 {
            return Err(OsError::InvalidOrderIndex(reference.to_string()));
        }
        let view = sorted_orders(&book);
        if idx > view.len() {
            return Err(OsError::InvalidOrderIndex(reference.to_string()));
        }
        return Ok(view[idx - 1].number.clone());
    }

    Err(OsError::OrderNotFound(reference.to_string()))
}

/// Register a new client
fn cmd_add_client(cfg_dir: &PathBuf, id: &str, client: Client) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(OsError::ConfigNotFound(cfg_dir.clone()));
    }

    let mut clients = load_clients(cfg_dir)?;
    if clients.contains_key(id) {
        return Err(OsError::ClientExists(id.to_string()));
    }

    let name = client.name.clone();
    clients.insert(id.to_string(), client);
    save_clients(cfg_dir, &clients)?;

    println!("Added client '{id}' ({name})");
    Ok(())
}

/// List registered clients
fn cmd_clients(cfg_dir: &PathBuf, search: Option<&str>) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(OsError::ConfigNotFound(cfg_dir.clone()));
    }

    let clients = load_clients(cfg_dir)?;

    if clients.is_empty() {
        println!("No clients registered.");
        println!("Add one with: ordem add-client <id> --name ...");
        return Ok(());
    }

    let needle = search.map(|s| s.to_lowercase());
    let mut sorted: Vec<_> = clients
        .iter()
        .filter(|(_, c)| match &needle {
            Some(n) => c.name.to_lowercase().contains(n),
            None => true,
        })
        .collect();
    sorted.sort_by_key(|(k, _)| *k);

    if sorted.is_empty() {
        println!("No clients match the search.");
        return Ok(());
    }

    let rows: Vec<ClientRow> = sorted
        .iter()
        .map(|(id, client)| ClientRow {
            id: id.to_string(),
            name: client.name.clone(),
            tax_id: client.tax_id.clone(),
            phone: client.phone.clone(),
            city: format!("{}/{}", client.address.city, client.address.state),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// Create a new service order
fn cmd_new(
    cfg_dir: &PathBuf,
    client_id: &str,
    reference: &str,
    delivery: &str,
    items_input: &[String],
    date: Option<String>,
) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(OsError::ConfigNotFound(cfg_dir.clone()));
    }

    if items_input.is_empty() {
        return Err(OsError::NoItems);
    }

    let config = load_config(cfg_dir)?;
    let clients = load_clients(cfg_dir)?;

    // Snapshot the client into the order; later client edits must not
    // reach past orders.
    let client = clients
        .get(client_id)
        .ok_or_else(|| OsError::ClientNotFound(client_id.to_string()))?
        .clone();

    let items = parse_items(items_input)?;

    let delivery_date = parse_date(delivery)?;
    let issue_date = match date {
        Some(s) => parse_date(&s)?,
        None => Local::now().date_naive(),
    };

    // A failed store read falls back to an empty book: creation still
    // succeeds and numbering restarts at 00001.
    let mut book = load_orders(cfg_dir).unwrap_or_default();
    let number = numbering::next_order_number(book.orders.iter().map(|o| o.number.as_str()));

    let now = Utc::now();
    let mut order = ServiceOrder {
        id: uuid::Uuid::new_v4().to_string(),
        number: number.clone(),
        reference: reference.to_string(),
        issue_date,
        delivery_date,
        total: Decimal::ZERO,
        created_at: now,
        updated_at: now,
        client,
        items,
    };
    order.recompute_total();

    let client_name = order.client.name.clone();
    let total = order.total;
    book.orders.push(order);
    save_orders(cfg_dir, &book)?;

    println!("Created OS {number}");
    println!("  Client:   {client_name}");
    println!("  Delivery: {}", delivery_date.format("%d/%m/%Y"));
    println!(
        "  Total:    {}",
        format_money(total, &config.display.currency_symbol)
    );

    Ok(())
}

/// List service orders with a financial footer
fn cmd_list(cfg_dir: &PathBuf, search: Option<&str>, limit: Option<usize>) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(OsError::ConfigNotFound(cfg_dir.clone()));
    }

    let config = load_config(cfg_dir)?;
    let book = load_orders(cfg_dir)?;
    let log = load_receipts(cfg_dir)?;

    if book.orders.is_empty() {
        println!("No service orders yet.");
        return Ok(());
    }

    let needle = search.map(|s| s.to_lowercase());
    let view: Vec<(usize, &ServiceOrder)> = sorted_orders(&book)
        .into_iter()
        .enumerate()
        .filter(|(_, o)| match &needle {
            Some(n) => {
                o.number.to_lowercase().contains(n)
                    || o.client.name.to_lowercase().contains(n)
                    || o.reference.to_lowercase().contains(n)
            }
            None => true,
        })
        .collect();

    if view.is_empty() {
        println!("No orders match the search.");
        return Ok(());
    }

    let view = match limit {
        Some(n) => &view[..n.min(view.len())],
        None => &view[..],
    };

    let symbol = &config.display.currency_symbol;
    let rows: Vec<OrderRow> = view
        .iter()
        .map(|(idx, order)| OrderRow {
            index: idx + 1,
            number: order.number.clone(),
            issued: order.issue_date.format("%d/%m/%Y").to_string(),
            delivery: order.delivery_date.format("%d/%m/%Y").to_string(),
            reference: truncate(&order.reference, 20),
            total: format_money(order.total, symbol),
            status: if order.production_done() {
                "DONE".to_string()
            } else {
                "IN PRODUCTION".to_string()
            },
            client: order.client.name.clone(),
        })
        .collect();

    // Financial summary over the rows shown
    let shown: Vec<&ServiceOrder> = view.iter().map(|(_, o)| *o).collect();
    let shown_total: Decimal = shown.iter().map(|o| o.total).sum();
    let shown_pending: Decimal = shown.iter().map(|o| finance::pending_value(o)).sum();
    let shown_received: Decimal = shown
        .iter()
        .map(|o| finance::received_total(&o.id, &log.receipts))
        .sum();
    let shown_balance = shown_pending - shown_received;

    let table = Table::new(rows).with(Style::rounded()).to_string();
    let table = add_financial_footer(
        &table,
        &[
            ("TOTAL", format_money(shown_total, symbol)),
            ("PENDING", format_money(shown_pending, symbol)),
            ("(-) RECEIVED", format_money(shown_received, symbol)),
            ("(=) BALANCE", format_money(shown_balance, symbol)),
        ],
    );

    println!("{table}");

    println!();
    println!("Total: {} service orders", book.orders.len());

    let today = Local::now().date_naive();
    let overdue = book
        .orders
        .iter()
        .filter(|o| finance::is_overdue(o, today))
        .count();
    if overdue > 0 {
        println!("Overdue: {overdue}");
    }

    println!("Use index number with show/edit/delete/add-receipt (e.g., 'ordem show 1')");

    Ok(())
}

/// Append summary rows to a rendered 8-column order table: the first
/// five columns merge into a label cell, TOTAL keeps its column, and the
/// trailing STATUS and CLIENT columns are closed off.
fn add_financial_footer(table: &str, rows: &[(&str, String)]) -> String {
    let lines: Vec<&str> = table.lines().collect();
    if lines.len() < 4 {
        return table.to_string();
    }

    // Parse the top border to discover column widths
    let top = lines[0];
    let Some(inner) = top.strip_prefix('╭').and_then(|s| s.strip_suffix('╮')) else {
        return table.to_string();
    };

    let widths: Vec<usize> = inner.split('┬').map(|p| p.chars().count()).collect();
    if widths.len() != 8 {
        return table.to_string();
    }

    // +4 for the four ┴ replaced by spaces
    let left_width = widths[0] + widths[1] + widths[2] + widths[3] + widths[4] + 4;
    let total_width = widths[5];
    let status_width = widths[6];
    let client_width = widths[7];

    // Strip the original bottom border and start building
    let mut out = lines[..lines.len() - 1].join("\n");
    out.push('\n');

    // First separator: merge the left 5 columns, keep TOTAL, close off
    // STATUS+CLIENT
    out.push_str(&format!(
        "├{}┴{}┴{}┴{}┴{}┼{}┼{}┴{}╯\n",
        "─".repeat(widths[0]),
        "─".repeat(widths[1]),
        "─".repeat(widths[2]),
        "─".repeat(widths[3]),
        "─".repeat(widths[4]),
        "─".repeat(total_width),
        "─".repeat(status_width),
        "─".repeat(client_width),
    ));

    // Summary rows with separators between them
    for (idx, (label, value)) in rows.iter().enumerate() {
        out.push_str(&format!(
            "│ {:>left$} │ {:>total$} │\n",
            label,
            value,
            left = left_width - 2,
            total = total_width - 2
        ));
        if idx < rows.len() - 1 {
            out.push_str(&format!(
                "├{}┼{}┤\n",
                "─".repeat(left_width),
                "─".repeat(total_width)
            ));
        }
    }

    // Bottom border
    out.push_str(&format!(
        "╰{}┴{}╯",
        "─".repeat(left_width),
        "─".repeat(total_width)
    ));

    out
}

/// Show one order in full
fn cmd_show(cfg_dir: &PathBuf, order_ref: &str) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(OsError::ConfigNotFound(cfg_dir.clone()));
    }

    let number = resolve_order_number(cfg_dir, order_ref)?;
    let config = load_config(cfg_dir)?;
    let book = load_orders(cfg_dir)?;
    let log = load_receipts(cfg_dir)?;

    let order = book
        .orders
        .iter()
        .find(|o| o.number == number)
        .ok_or_else(|| OsError::OrderNotFound(number.clone()))?;

    let symbol = &config.display.currency_symbol;
    let today = Local::now().date_naive();

    let mut status = if order.production_done() {
        "DONE".to_string()
    } else {
        "IN PRODUCTION".to_string()
    };
    if finance::is_overdue(order, today) {
        status.push_str(" (OVERDUE)");
    }

    println!("OS {} - {}", order.number, order.reference);
    println!("{}", "-".repeat(50));
    println!("Client:    {} ({})", order.client.name, order.client.tax_id);
    println!(
        "           {}, {} - {}, {}/{}",
        order.client.address.street,
        order.client.address.number,
        order.client.address.district,
        order.client.address.city,
        order.client.address.state
    );
    println!("Issued:    {}", order.issue_date.format("%d/%m/%Y"));
    println!("Delivery:  {}", order.delivery_date.format("%d/%m/%Y"));
    println!("Status:    {status}");
    println!();

    let item_rows: Vec<ItemRow> = order
        .items
        .iter()
        .enumerate()
        .map(|(idx, item)| ItemRow {
            index: idx + 1,
            description: item.description.clone(),
            quantity: item.quantity,
            unit_price: format_money(item.unit_price, symbol),
            total: format_money(item.total, symbol),
            payment: item.payment.to_string(),
            production: item.production.to_string(),
        })
        .collect();

    let table = Table::new(item_rows).with(Style::rounded()).to_string();
    println!("{table}");

    let receipts: Vec<&Receipt> = log
        .receipts
        .iter()
        .filter(|r| r.order_id == order.id)
        .collect();

    if !receipts.is_empty() {
        println!();
        println!("Receipts:");
        let receipt_rows: Vec<ReceiptRow> = receipts
            .iter()
            .enumerate()
            .map(|(idx, r)| ReceiptRow {
                index: idx + 1,
                date: r.date.format("%d/%m/%Y").to_string(),
                amount: format_money(r.amount, symbol),
                note: r.note.clone().unwrap_or_default(),
            })
            .collect();
        let table = Table::new(receipt_rows).with(Style::rounded()).to_string();
        println!("{table}");
    }

    let pending = finance::pending_value(order);
    let received = finance::received_total(&order.id, &log.receipts);
    let balance = finance::outstanding_balance(order, &log.receipts);

    println!();
    println!("Total:     {}", format_money(order.total, symbol));
    println!("Pending:   {}", format_money(pending, symbol));
    println!("Received:  {}", format_money(received, symbol));
    println!("Balance:   {}", format_money(balance, symbol));

    Ok(())
}

/// Edit an order: full replacement of the item list
fn cmd_edit(
    cfg_dir: &PathBuf,
    order_ref: &str,
    items_input: &[String],
    reference: Option<String>,
    delivery: Option<String>,
) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(OsError::ConfigNotFound(cfg_dir.clone()));
    }

    if items_input.is_empty() && reference.is_none() && delivery.is_none() {
        return Err(OsError::NothingToEdit);
    }

    let number = resolve_order_number(cfg_dir, order_ref)?;
    let config = load_config(cfg_dir)?;
    let mut book = load_orders(cfg_dir)?;

    let new_items = if items_input.is_empty() {
        None
    } else {
        Some(parse_items(items_input)?)
    };
    let new_delivery = delivery.map(|d| parse_date(&d)).transpose()?;

    let order = book
        .orders
        .iter_mut()
        .find(|o| o.number == number)
        .ok_or_else(|| OsError::OrderNotFound(number.clone()))?;

    // Replacement items restart at PENDING/AWAITING; statuses are set
    // afterwards with set-item.
    if let Some(items) = new_items {
        order.items = items;
    }
    if let Some(r) = reference {
        order.reference = r;
    }
    if let Some(d) = new_delivery {
        order.delivery_date = d;
    }
    order.recompute_total();
    order.updated_at = Utc::now();

    let total = order.total;
    save_orders(cfg_dir, &book)?;

    println!("Updated OS {number}");
    if !items_input.is_empty() {
        println!("  Items:  {}", items_input.join(", "));
    }
    println!(
        "  Total:  {}",
        format_money(total, &config.display.currency_symbol)
    );

    Ok(())
}

/// Update payment/production status of a single item
fn cmd_set_item(
    cfg_dir: &PathBuf,
    order_ref: &str,
    item_index: usize,
    payment: Option<&str>,
    production: Option<&str>,
) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(OsError::ConfigNotFound(cfg_dir.clone()));
    }

    let new_payment = payment.map(parse_payment_status).transpose()?;
    let new_production = production.map(parse_production_status).transpose()?;

    let number = resolve_order_number(cfg_dir, order_ref)?;
    let mut book = load_orders(cfg_dir)?;

    let order = book
        .orders
        .iter_mut()
        .find(|o| o.number == number)
        .ok_or_else(|| OsError::OrderNotFound(number.clone()))?;

    if item_index == 0 || item_index > order.items.len() {
        return Err(OsError::InvalidItemIndex {
            order: number,
            index: item_index,
            count: order.items.len(),
        });
    }

    let item = &mut order.items[item_index - 1];
    if let Some(p) = new_payment {
        item.payment = p;
    }
    if let Some(p) = new_production {
        item.production = p;
    }

    let description = item.description.clone();
    let payment_now = item.payment;
    let production_now = item.production;
    order.updated_at = Utc::now();

    save_orders(cfg_dir, &book)?;

    println!("Updated item {item_index} on OS {number} ({description})");
    println!("  Payment:    {payment_now}");
    println!("  Production: {production_now}");

    Ok(())
}

/// Delete a service order; its receipts stay behind
fn cmd_delete(cfg_dir: &PathBuf, order_ref: &str, yes: bool) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(OsError::ConfigNotFound(cfg_dir.clone()));
    }

    let number = resolve_order_number(cfg_dir, order_ref)?;

    if !yes && !confirm(&format!("Delete OS {number}? This cannot be undone."))? {
        println!("Aborted.");
        return Ok(());
    }

    let mut book = load_orders(cfg_dir)?;
    let before = book.orders.len();
    book.orders.retain(|o| o.number != number);
    if book.orders.len() == before {
        return Err(OsError::OrderNotFound(number));
    }
    save_orders(cfg_dir, &book)?;

    println!("Deleted OS {number}");
    println!("Receipts recorded against it were kept; see 'ordem receipts'.");

    Ok(())
}

/// Record a partial receipt against an order
fn cmd_add_receipt(
    cfg_dir: &PathBuf,
    order_ref: &str,
    amount: Decimal,
    date: Option<String>,
    note: Option<String>,
) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(OsError::ConfigNotFound(cfg_dir.clone()));
    }

    if amount <= Decimal::ZERO {
        return Err(OsError::InvalidReceiptAmount);
    }

    let number = resolve_order_number(cfg_dir, order_ref)?;
    let config = load_config(cfg_dir)?;
    let book = load_orders(cfg_dir)?;
    let mut log = load_receipts(cfg_dir)?;

    let date = match date {
        Some(s) => parse_date(&s)?,
        None => Local::now().date_naive(),
    };

    let order = book
        .orders
        .iter()
        .find(|o| o.number == number)
        .ok_or_else(|| OsError::OrderNotFound(number.clone()))?;

    log.receipts.push(Receipt {
        id: uuid::Uuid::new_v4().to_string(),
        order_id: order.id.clone(),
        amount,
        date,
        note,
    });

    save_receipts(cfg_dir, &log)?;

    // Overpayment is allowed; the negative balance is reported, not
    // rejected.
    let symbol = &config.display.currency_symbol;
    let balance = finance::outstanding_balance(order, &log.receipts);
    if balance < Decimal::ZERO {
        println!(
            "Recorded {} against OS {number} (overpaid by {})",
            format_money(amount, symbol),
            format_money(-balance, symbol)
        );
    } else {
        println!(
            "Recorded {} against OS {number} ({} outstanding)",
            format_money(amount, symbol),
            format_money(balance, symbol)
        );
    }

    Ok(())
}

/// Edit a receipt in place
fn cmd_edit_receipt(
    cfg_dir: &PathBuf,
    order_ref: &str,
    index: Option<usize>,
    amount: Option<Decimal>,
    date: Option<String>,
    note: Option<String>,
) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(OsError::ConfigNotFound(cfg_dir.clone()));
    }

    if let Some(a) = amount {
        if a <= Decimal::ZERO {
            return Err(OsError::InvalidReceiptAmount);
        }
    }
    let new_date = date.map(|d| parse_date(&d)).transpose()?;

    let number = resolve_order_number(cfg_dir, order_ref)?;
    let config = load_config(cfg_dir)?;
    let book = load_orders(cfg_dir)?;
    let mut log = load_receipts(cfg_dir)?;

    let order = book
        .orders
        .iter()
        .find(|o| o.number == number)
        .ok_or_else(|| OsError::OrderNotFound(number.clone()))?;

    let positions: Vec<usize> = log
        .receipts
        .iter()
        .enumerate()
        .filter(|(_, r)| r.order_id == order.id)
        .map(|(i, _)| i)
        .collect();

    if positions.is_empty() {
        return Err(OsError::NoReceipts(number));
    }

    let edit_pos = match index {
        Some(i) => {
            if i == 0 || i > positions.len() {
                return Err(OsError::InvalidReceiptIndex {
                    order: number,
                    index: i,
                    count: positions.len(),
                });
            }
            positions[i - 1]
        }
        None => positions[positions.len() - 1],
    };

    let receipt = &mut log.receipts[edit_pos];
    if let Some(a) = amount {
        receipt.amount = a;
    }
    if let Some(d) = new_date {
        receipt.date = d;
    }
    if note.is_some() {
        receipt.note = note;
    }

    let amount_now = receipt.amount;
    let date_now = receipt.date;
    save_receipts(cfg_dir, &log)?;

    println!(
        "Updated receipt for OS {number} ({} on {})",
        format_money(amount_now, &config.display.currency_symbol),
        date_now.format("%d/%m/%Y")
    );

    Ok(())
}

/// Remove a receipt from an order
fn cmd_remove_receipt(
    cfg_dir: &PathBuf,
    order_ref: &str,
    index: Option<usize>,
    yes: bool,
) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(OsError::ConfigNotFound(cfg_dir.clone()));
    }

    let number = resolve_order_number(cfg_dir, order_ref)?;
    let config = load_config(cfg_dir)?;
    let book = load_orders(cfg_dir)?;
    let mut log = load_receipts(cfg_dir)?;

    let order = book
        .orders
        .iter()
        .find(|o| o.number == number)
        .ok_or_else(|| OsError::OrderNotFound(number.clone()))?;

    let positions: Vec<usize> = log
        .receipts
        .iter()
        .enumerate()
        .filter(|(_, r)| r.order_id == order.id)
        .map(|(i, _)| i)
        .collect();

    if positions.is_empty() {
        return Err(OsError::NoReceipts(number));
    }

    let remove_pos = match index {
        Some(i) => {
            if i == 0 || i > positions.len() {
                return Err(OsError::InvalidReceiptIndex {
                    order: number,
                    index: i,
                    count: positions.len(),
                });
            }
            positions[i - 1]
        }
        None => positions[positions.len() - 1],
    };

    if !yes && !confirm(&format!("Remove this receipt from OS {number}?"))? {
        println!("Aborted.");
        return Ok(());
    }

    let removed = log.receipts.remove(remove_pos);
    save_receipts(cfg_dir, &log)?;

    println!(
        "Removed {} receipt from OS {number}",
        format_money(removed.amount, &config.display.currency_symbol)
    );

    Ok(())
}

/// List receipts for one order, or every receipt across orders
fn cmd_receipts(cfg_dir: &PathBuf, order_ref: Option<&str>) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(OsError::ConfigNotFound(cfg_dir.clone()));
    }

    let config = load_config(cfg_dir)?;
    let book = load_orders(cfg_dir)?;
    let log = load_receipts(cfg_dir)?;
    let symbol = &config.display.currency_symbol;

    if let Some(order_ref) = order_ref {
        let number = resolve_order_number(cfg_dir, order_ref)?;
        let order = book
            .orders
            .iter()
            .find(|o| o.number == number)
            .ok_or_else(|| OsError::OrderNotFound(number.clone()))?;

        println!("Receipts for OS {number}");

        let receipts: Vec<&Receipt> = log
            .receipts
            .iter()
            .filter(|r| r.order_id == order.id)
            .collect();

        if receipts.is_empty() {
            println!("  No receipts recorded.");
        } else {
            let rows: Vec<ReceiptRow> = receipts
                .iter()
                .enumerate()
                .map(|(idx, r)| ReceiptRow {
                    index: idx + 1,
                    date: r.date.format("%d/%m/%Y").to_string(),
                    amount: format_money(r.amount, symbol),
                    note: r.note.clone().unwrap_or_default(),
                })
                .collect();
            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{table}");
        }

        let pending = finance::pending_value(order);
        let received = finance::received_total(&order.id, &log.receipts);
        println!(
            "Total received: {} / pending {} (balance {})",
            format_money(received, symbol),
            format_money(pending, symbol),
            format_money(pending - received, symbol)
        );

        return Ok(());
    }

    // Receipts whose order was deleted are skipped, not reported.
    let rows: Vec<AllReceiptsRow> = log
        .receipts
        .iter()
        .filter_map(|r| {
            let order = book.orders.iter().find(|o| o.id == r.order_id)?;
            Some(AllReceiptsRow {
                date: r.date.format("%d/%m/%Y").to_string(),
                order: order.number.clone(),
                client: order.client.name.clone(),
                order_total: format_money(order.total, symbol),
                amount: format_money(r.amount, symbol),
                note: r.note.clone().unwrap_or_default(),
            })
        })
        .collect();

    if rows.is_empty() {
        println!("No receipts recorded.");
        return Ok(());
    }

    let shown = rows.len();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!();
    println!("Total: {shown} receipts");

    Ok(())
}

/// Accounts-receivable report: orders with a positive balance
fn cmd_receivables(cfg_dir: &PathBuf) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(OsError::ConfigNotFound(cfg_dir.clone()));
    }

    let config = load_config(cfg_dir)?;
    let book = load_orders(cfg_dir)?;
    let log = load_receipts(cfg_dir)?;
    let symbol = &config.display.currency_symbol;

    let rows: Vec<ReceivableRow> = sorted_orders(&book)
        .into_iter()
        .filter_map(|order| {
            let pending = finance::pending_value(order);
            let received = finance::received_total(&order.id, &log.receipts);
            let balance = pending - received;
            if balance <= Decimal::ZERO {
                return None;
            }
            Some(ReceivableRow {
                number: order.number.clone(),
                client: order.client.name.clone(),
                reference: truncate(&order.reference, 12),
                delivery: order.delivery_date.format("%d/%m/%Y").to_string(),
                pending: format_money(pending, symbol),
                received: format_money(received, symbol),
                balance: format_money(balance, symbol),
            })
        })
        .collect();

    if rows.is_empty() {
        println!("Nothing to receive.");
        return Ok(());
    }

    println!(
        "Accounts receivable - {}",
        Local::now().format("%d/%m/%Y %H:%M")
    );

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    let total = finance::total_outstanding(&book.orders, &log.receipts);
    println!();
    println!("Total receivable: {}", format_money(total, symbol));

    Ok(())
}

#[derive(Serialize)]
struct DashboardReport<'a> {
    clients: usize,
    orders: usize,
    overdue: usize,
    total_value: Decimal,
    total_pending: Decimal,
    total_outstanding: Decimal,
    granularity: &'a str,
    series: RevenueSeries,
}

/// Summary figures and the revenue series
fn cmd_dashboard(cfg_dir: &PathBuf, granularity: &str, json: bool) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(OsError::ConfigNotFound(cfg_dir.clone()));
    }

    let granularity = Granularity::parse(granularity)
        .ok_or_else(|| OsError::InvalidGranularity(granularity.to_string()))?;

    let config = load_config(cfg_dir)?;
    let clients = load_clients(cfg_dir)?;
    let book = load_orders(cfg_dir)?;
    let log = load_receipts(cfg_dir)?;

    let today = Local::now().date_naive();
    let overdue = book
        .orders
        .iter()
        .filter(|o| finance::is_overdue(o, today))
        .count();

    let total_value = finance::total_value(&book.orders);
    let total_pending = finance::total_pending(&book.orders);
    let total_outstanding = finance::total_outstanding(&book.orders, &log.receipts);
    let series = revenue_series(&book.orders, granularity, today);

    if json {
        let report = DashboardReport {
            clients: clients.len(),
            orders: book.orders.len(),
            overdue,
            total_value,
            total_pending,
            total_outstanding,
            granularity: granularity.as_str(),
            series,
        };
        let out = serde_json::to_string_pretty(&report).map_err(|e| {
            OsError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                e.to_string(),
            ))
        })?;
        println!("{out}");
        return Ok(());
    }

    let symbol = &config.display.currency_symbol;

    println!("{} - dashboard", config.shop.name);
    println!("{}", "-".repeat(50));
    println!("Clients:           {}", clients.len());
    println!("Service orders:    {}", book.orders.len());
    println!("Overdue orders:    {overdue}");
    println!("Total value:       {}", format_money(total_value, symbol));
    println!("Pending payments:  {}", format_money(total_pending, symbol));
    println!(
        "Outstanding:       {}",
        format_money(total_outstanding, symbol)
    );
    println!();
    println!("Revenue ({})", granularity.as_str());

    let rows: Vec<SeriesRow> = series
        .labels
        .iter()
        .zip(series.values.iter())
        .map(|(label, value)| SeriesRow {
            period: label.clone(),
            value: format_money(*value, symbol),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}
