//! Derived financial figures. Nothing here is ever stored: every amount
//! is recomputed on demand from the order and receipt collections.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::store::{PaymentStatus, Receipt, ServiceOrder};

/// Sum of the unpaid line-item totals on an order. PAID items
/// contribute zero.
pub fn pending_value(order: &ServiceOrder) -> Decimal {
    order
        .items
        .iter()
        .filter(|i| i.payment == PaymentStatus::Pending)
        .map(|i| i.total)
        .sum()
}

/// Sum of all receipts recorded against an order. Zero when none exist.
pub fn received_total(order_id: &str, receipts: &[Receipt]) -> Decimal {
    receipts
        .iter()
        .filter(|r| r.order_id == order_id)
        .map(|r| r.amount)
        .sum()
}

/// Pending value minus partial receipts. Negative when receipts overpay
/// relative to the pending items; reported as-is, never clamped, so the
/// overpayment is visible to the user.
pub fn outstanding_balance(order: &ServiceOrder, receipts: &[Receipt]) -> Decimal {
    pending_value(order) - received_total(&order.id, receipts)
}

/// An order is overdue once its delivery date has passed with at least
/// one item not yet DONE. All items DONE means never overdue, no matter
/// how late.
pub fn is_overdue(order: &ServiceOrder, today: NaiveDate) -> bool {
    order.delivery_date < today && !order.production_done()
}

/// Straight sum of order totals, no filtering.
pub fn total_value(orders: &[ServiceOrder]) -> Decimal {
    orders.iter().map(|o| o.total).sum()
}

/// Sum of pending values across all orders (the dashboard "pending
/// payments" card; receipts are not considered here).
pub fn total_pending(orders: &[ServiceOrder]) -> Decimal {
    orders.iter().map(pending_value).sum()
}

/// Portfolio-level amount owed. Each order contributes its outstanding
/// balance clamped at zero: an overpaid order never reduces what other
/// orders owe.
pub fn total_outstanding(orders: &[ServiceOrder], receipts: &[Receipt]) -> Decimal {
    orders
        .iter()
        .map(|o| outstanding_balance(o, receipts).max(Decimal::ZERO))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Address, Client, ProductionStatus, ServiceItem};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn test_client() -> Client {
        Client {
            name: "Acme".to_string(),
            tax_id: "11.222.333/0001-44".to_string(),
            phone: "+55 11 98888-7777".to_string(),
            email: "acme@example.com".to_string(),
            address: Address {
                street: "Rua das Flores".to_string(),
                number: "123".to_string(),
                complement: None,
                district: "Centro".to_string(),
                city: "Sao Paulo".to_string(),
                state: "SP".to_string(),
                postal_code: "01000-000".to_string(),
            },
        }
    }

    fn order_with_items(id: &str, items: Vec<ServiceItem>) -> ServiceOrder {
        let stamp = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let mut order = ServiceOrder {
            id: id.to_string(),
            number: "00001".to_string(),
            reference: "School uniforms".to_string(),
            issue_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            delivery_date: NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
            total: Decimal::ZERO,
            created_at: stamp,
            updated_at: stamp,
            client: test_client(),
            items,
        };
        order.recompute_total();
        order
    }

    fn receipt(order_id: &str, amount: Decimal) -> Receipt {
        Receipt {
            id: format!("r-{order_id}-{amount}"),
            order_id: order_id.to_string(),
            amount,
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            note: None,
        }
    }

    #[test]
    fn item_total_is_quantity_times_unit_price() {
        let item = ServiceItem::new("Polo shirt".to_string(), 2, dec!(50.00));
        assert_eq!(item.total, dec!(100.00));
    }

    #[test]
    fn order_total_matches_item_sum() {
        let order = order_with_items(
            "a",
            vec![
                ServiceItem::new("Polo shirt".to_string(), 2, dec!(50.00)),
                ServiceItem::new("Embroidery".to_string(), 3, dec!(12.50)),
            ],
        );
        assert_eq!(order.total, dec!(137.50));
        assert_eq!(
            order.total,
            order.items.iter().map(|i| i.total).sum::<Decimal>()
        );
    }

    #[test]
    fn pending_value_ignores_paid_items() {
        let mut order = order_with_items(
            "a",
            vec![
                ServiceItem::new("Polo shirt".to_string(), 2, dec!(50.00)),
                ServiceItem::new("Embroidery".to_string(), 3, dec!(12.50)),
            ],
        );
        assert_eq!(pending_value(&order), dec!(137.50));

        // Marking an item PAID never increases the pending value
        order.items[0].payment = PaymentStatus::Paid;
        assert_eq!(pending_value(&order), dec!(37.50));
        order.items[1].payment = PaymentStatus::Paid;
        assert_eq!(pending_value(&order), dec!(0));
    }

    #[test]
    fn received_total_is_zero_without_receipts() {
        assert_eq!(received_total("a", &[]), Decimal::ZERO);
    }

    #[test]
    fn received_total_sums_only_matching_receipts() {
        let receipts = vec![
            receipt("a", dec!(40.00)),
            receipt("b", dec!(99.00)),
            receipt("a", dec!(10.00)),
        ];
        assert_eq!(received_total("a", &receipts), dec!(50.00));
    }

    #[test]
    fn balance_with_zero_receipts_equals_pending_value() {
        let order = order_with_items(
            "a",
            vec![ServiceItem::new("Polo shirt".to_string(), 2, dec!(50.00))],
        );
        assert_eq!(outstanding_balance(&order, &[]), pending_value(&order));
    }

    #[test]
    fn overpayment_yields_negative_balance_unclamped() {
        let mut order = order_with_items(
            "a",
            vec![ServiceItem::new("Polo shirt".to_string(), 2, dec!(50.00))],
        );
        let receipts = vec![receipt("a", dec!(40.00))];
        assert_eq!(outstanding_balance(&order, &receipts), dec!(60.00));

        order.items[0].payment = PaymentStatus::Paid;
        assert_eq!(outstanding_balance(&order, &receipts), dec!(-40.00));
    }

    #[test]
    fn total_outstanding_clamps_overpaid_orders_at_zero() {
        let mut overpaid = order_with_items(
            "a",
            vec![ServiceItem::new("Polo shirt".to_string(), 1, dec!(50.00))],
        );
        overpaid.items[0].payment = PaymentStatus::Paid;
        let owing = order_with_items(
            "b",
            vec![ServiceItem::new("Jacket".to_string(), 1, dec!(200.00))],
        );

        let receipts = vec![receipt("a", dec!(30.00)), receipt("b", dec!(50.00))];

        // Per-order balances: a = -30, b = 150. The overpayment must not
        // reduce the portfolio total.
        assert_eq!(outstanding_balance(&overpaid, &receipts), dec!(-30.00));
        let orders = vec![overpaid, owing];
        assert_eq!(total_outstanding(&orders, &receipts), dec!(150.00));
    }

    #[test]
    fn total_outstanding_skips_orphaned_receipts() {
        let order = order_with_items(
            "a",
            vec![ServiceItem::new("Polo shirt".to_string(), 1, dec!(50.00))],
        );
        // Receipt for an order that no longer exists
        let receipts = vec![receipt("deleted", dec!(500.00))];
        assert_eq!(total_outstanding(&[order], &receipts), dec!(50.00));
    }

    #[test]
    fn future_delivery_is_never_overdue() {
        let order = order_with_items(
            "a",
            vec![ServiceItem::new("Polo shirt".to_string(), 1, dec!(50.00))],
        );
        let before_delivery = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap();
        assert!(!is_overdue(&order, before_delivery));
        // Delivery day itself is not yet overdue
        assert!(!is_overdue(&order, order.delivery_date));
    }

    #[test]
    fn past_delivery_overdue_unless_all_done() {
        let mut order = order_with_items(
            "a",
            vec![
                ServiceItem::new("Polo shirt".to_string(), 1, dec!(50.00)),
                ServiceItem::new("Jacket".to_string(), 1, dec!(200.00)),
            ],
        );
        let after_delivery = NaiveDate::from_ymd_opt(2024, 2, 11).unwrap();
        assert!(is_overdue(&order, after_delivery));

        order.items[0].production = ProductionStatus::Done;
        assert!(is_overdue(&order, after_delivery));

        order.items[1].production = ProductionStatus::Done;
        assert!(!is_overdue(&order, after_delivery));
    }

    #[test]
    fn total_value_is_a_straight_sum() {
        let orders = vec![
            order_with_items(
                "a",
                vec![ServiceItem::new("Polo shirt".to_string(), 2, dec!(50.00))],
            ),
            order_with_items(
                "b",
                vec![ServiceItem::new("Jacket".to_string(), 1, dec!(200.00))],
            ),
        ];
        assert_eq!(total_value(&orders), dec!(300.00));
        assert_eq!(total_value(&[]), Decimal::ZERO);
    }
}
