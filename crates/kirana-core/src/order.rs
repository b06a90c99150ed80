//! # Order Validation
//!
//! Parses the requested bill lines and checks them against product stock.
//!
//! The validator is sans-IO: it never fetches anything itself. The storage
//! layer drives it line by line, fetching a product only when
//! [`OrderValidator::needs_product`] says the per-call cache misses.
//!
//! ## Flow (driven by kirana-db's bill transaction)
//! ```text
//! for each line (request order)
//!      │
//!      ▼
//! parse_line(index, raw) ──► InvalidLine(index, reason)
//!      │
//!      ▼
//! needs_product(id)? ──yes──► SELECT product (inside the transaction)
//!      │                             │
//!      ▼                             ▼
//! check_line(line, fetched) ──► NotFound(index, id)
//!      │                    └─► InsufficientStock(index, id, available, cumulative)
//!      ▼
//! finish() ──► ValidatedOrder { items, grand_total, reservations }
//! ```
//!
//! ## Cumulative Reservation
//! The same product may appear on several lines. Each line is checked
//! against the product's stock as read at the start of the bill, with the
//! quantities of earlier lines for that product already counted. Stock 3
//! with lines `[2, 2]` fails on the second line even though neither line
//! alone exceeds stock.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{BillDraft, LineItem, Product};
use crate::validation::{validate_mobile_number, validate_person_name, ValidationResult};

// =============================================================================
// Requests
// =============================================================================

/// A bill line exactly as the caller sent it.
///
/// Values stay untyped so that `"3"`, `3` and `"abc"` all reach the
/// validator and a bad one is reported with its line index instead of
/// failing the whole request at deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillLineRequest {
    #[serde(default)]
    pub product_id: serde_json::Value,
    #[serde(default)]
    pub quantity: serde_json::Value,
}

impl BillLineRequest {
    /// Convenience constructor for well-typed callers.
    pub fn new(product_id: i64, quantity: i64) -> Self {
        BillLineRequest {
            product_id: product_id.into(),
            quantity: quantity.into(),
        }
    }
}

/// Incoming bill creation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBillRequest {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default)]
    pub items: Vec<BillLineRequest>,
}

impl CreateBillRequest {
    /// Checks the customer fields; returns trimmed `(name, mobile)`.
    ///
    /// Does not look at `items`: an empty order is reported separately as
    /// [`CoreError::EmptyOrder`].
    pub fn validate_customer(&self) -> ValidationResult<(String, String)> {
        let name = self.customer_name.as_deref().unwrap_or_default();
        validate_person_name("customerName", name)?;

        let mobile = self.mobile_number.as_deref().unwrap_or_default();
        validate_mobile_number(mobile)?;

        Ok((name.trim().to_string(), mobile.trim().to_string()))
    }
}

/// A parsed bill line. `index` is the zero-based position in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub index: usize,
    pub product_id: i64,
    pub quantity: i64,
}

/// Total quantity to take from one product for the whole bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockReservation {
    pub product_id: i64,
    pub quantity: i64,
    /// Stock observed when the bill was validated.
    pub available: i64,
    /// First line that referenced the product, for error reporting.
    pub first_index: usize,
}

// =============================================================================
// Parsing
// =============================================================================

/// Reads a positive integer from a JSON number or numeric string.
///
/// Integral floats (`3.0`) are accepted; fractional ones are not.
pub fn parse_positive_int(value: &serde_json::Value) -> Option<i64> {
    let parsed = match value {
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Some(i),
            None => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 1.0 && *f <= i64::MAX as f64)
                .map(|f| f as i64),
        },
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    parsed.filter(|n| *n > 0)
}

/// Parses one requested line.
pub fn parse_line(index: usize, raw: &BillLineRequest) -> CoreResult<OrderLine> {
    let product_id = parse_positive_int(&raw.product_id).ok_or_else(|| {
        CoreError::invalid_line(index, "productId must be a positive integer")
    })?;

    let quantity = parse_positive_int(&raw.quantity).ok_or_else(|| {
        CoreError::invalid_line(index, "quantity must be a positive integer")
    })?;

    Ok(OrderLine {
        index,
        product_id,
        quantity,
    })
}

// =============================================================================
// Validator
// =============================================================================

/// Per-bill validator with a product cache and running reservations.
///
/// Lives for one bill attempt and is dropped with it; nothing here outlives
/// the transaction that fed it.
#[derive(Debug, Default)]
pub struct OrderValidator {
    products: HashMap<i64, Product>,
    reserved: HashMap<i64, i64>,
    /// Product ids in order of first appearance.
    order: Vec<(i64, usize)>,
    lines: Vec<OrderLine>,
}

impl OrderValidator {
    pub fn new() -> Self {
        OrderValidator::default()
    }

    /// True when the product has not been fetched yet in this bill.
    pub fn needs_product(&self, product_id: i64) -> bool {
        !self.products.contains_key(&product_id)
    }

    /// Number of distinct products fetched so far.
    pub fn cached_products(&self) -> usize {
        self.products.len()
    }

    /// Checks a parsed line, reserving its quantity on success.
    ///
    /// `fetched` is the product as read from storage when
    /// [`needs_product`](Self::needs_product) returned true, `None` otherwise
    /// (or when storage had no such product).
    pub fn check_line(&mut self, line: OrderLine, fetched: Option<Product>) -> CoreResult<()> {
        if let Some(product) = fetched {
            self.products.entry(product.id).or_insert(product);
        }

        let product = self
            .products
            .get(&line.product_id)
            .ok_or(CoreError::LineProductNotFound {
                index: line.index,
                product_id: line.product_id,
            })?;

        let already = self.reserved.get(&line.product_id).copied().unwrap_or(0);
        let requested = already
            .checked_add(line.quantity)
            .ok_or_else(|| CoreError::invalid_line(line.index, "quantity is too large"))?;

        if !product.can_fulfil(requested) {
            return Err(CoreError::InsufficientStock {
                index: line.index,
                product_id: line.product_id,
                available: product.stock,
                requested,
            });
        }

        if already == 0 {
            self.order.push((line.product_id, line.index));
        }
        self.reserved.insert(line.product_id, requested);
        self.lines.push(line);
        Ok(())
    }

    /// Prices every accepted line and collects the stock reservations.
    pub fn finish(self) -> CoreResult<ValidatedOrder> {
        if self.lines.is_empty() {
            return Err(CoreError::EmptyOrder);
        }

        let mut items = Vec::with_capacity(self.lines.len());
        let mut grand_total = Money::zero();

        for line in &self.lines {
            // check_line only accepts lines whose product is cached
            let product = self.products.get(&line.product_id).ok_or(
                CoreError::LineProductNotFound {
                    index: line.index,
                    product_id: line.product_id,
                },
            )?;

            let line_total = product
                .price
                .checked_mul_quantity(line.quantity)
                .ok_or_else(|| CoreError::invalid_line(line.index, "line total is too large"))?;
            grand_total = grand_total
                .checked_add(line_total)
                .ok_or_else(|| CoreError::invalid_line(line.index, "bill total is too large"))?;

            items.push(LineItem {
                product_id: product.id,
                localized_name: product.localized_name.clone(),
                quantity: line.quantity,
                unit_price: product.price,
                line_total,
            });
        }

        let reservations = self
            .order
            .iter()
            .map(|&(product_id, first_index)| StockReservation {
                product_id,
                quantity: self.reserved.get(&product_id).copied().unwrap_or(0),
                available: self.products.get(&product_id).map(|p| p.stock).unwrap_or(0),
                first_index,
            })
            .collect();

        Ok(ValidatedOrder {
            items,
            grand_total,
            reservations,
        })
    }
}

/// Result of a successful validation: priced lines and what to decrement.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedOrder {
    /// One snapshot per requested line, in request order.
    pub items: Vec<LineItem>,
    pub grand_total: Money,
    /// One entry per distinct product, in order of first appearance.
    pub reservations: Vec<StockReservation>,
}

impl ValidatedOrder {
    /// Turns the priced lines into a bill draft for the ledger.
    pub fn into_draft(self, customer_name: String, mobile_number: String) -> BillDraft {
        BillDraft {
            items: self.items,
            grand_total: self.grand_total,
            customer_name,
            mobile_number,
        }
    }
}

/// Rejects a request before a transaction is opened.
///
/// Order of checks: customer fields first, then the empty-order rule.
pub fn precheck(request: &CreateBillRequest) -> CoreResult<(String, String)> {
    let customer = request.validate_customer().map_err(CoreError::from)?;
    if request.items.is_empty() {
        return Err(CoreError::EmptyOrder);
    }
    Ok(customer)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use chrono::Utc;
    use serde_json::json;

    fn chips(stock: i64) -> Product {
        Product {
            id: 1,
            name: "Chips".to_string(),
            localized_name: "சிப்ஸ்".to_string(),
            price: Money::from_rupees(10),
            stock,
            min_stock_level: 5,
            created_at: Utc::now(),
        }
    }

    fn milk(stock: i64) -> Product {
        Product {
            id: 2,
            name: "Milk".to_string(),
            localized_name: "பால்".to_string(),
            price: Money::from_paise(2550),
            stock,
            min_stock_level: 5,
            created_at: Utc::now(),
        }
    }

    /// Drives the validator the way the storage layer does.
    fn run(lines: &[BillLineRequest], catalog: &[Product]) -> CoreResult<ValidatedOrder> {
        let mut validator = OrderValidator::new();
        for (index, raw) in lines.iter().enumerate() {
            let line = parse_line(index, raw)?;
            let fetched = if validator.needs_product(line.product_id) {
                catalog.iter().find(|p| p.id == line.product_id).cloned()
            } else {
                None
            };
            validator.check_line(line, fetched)?;
        }
        validator.finish()
    }

    #[test]
    fn test_parse_positive_int() {
        assert_eq!(parse_positive_int(&json!(3)), Some(3));
        assert_eq!(parse_positive_int(&json!("3")), Some(3));
        assert_eq!(parse_positive_int(&json!(" 12 ")), Some(12));
        assert_eq!(parse_positive_int(&json!(4.0)), Some(4));

        assert_eq!(parse_positive_int(&json!(0)), None);
        assert_eq!(parse_positive_int(&json!(-2)), None);
        assert_eq!(parse_positive_int(&json!(2.5)), None);
        assert_eq!(parse_positive_int(&json!("abc")), None);
        assert_eq!(parse_positive_int(&json!(null)), None);
        assert_eq!(parse_positive_int(&json!([1])), None);
    }

    #[test]
    fn test_single_line_within_stock() {
        let order = run(&[BillLineRequest::new(1, 3)], &[chips(5)]).unwrap();

        assert_eq!(order.grand_total, Money::from_rupees(30));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].localized_name, "சிப்ஸ்");
        assert_eq!(order.items[0].unit_price, Money::from_rupees(10));
        assert_eq!(
            order.reservations,
            vec![StockReservation {
                product_id: 1,
                quantity: 3,
                available: 5,
                first_index: 0
            }]
        );
    }

    #[test]
    fn test_insufficient_stock_single_line() {
        let err = run(&[BillLineRequest::new(1, 3)], &[chips(2)]).unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientStock {
                index: 0,
                product_id: 1,
                available: 2,
                requested: 3
            }
        );
    }

    #[test]
    fn test_cumulative_quantity_across_lines() {
        let lines = [BillLineRequest::new(1, 2), BillLineRequest::new(1, 2)];
        let err = run(&lines, &[chips(3)]).unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientStock {
                index: 1,
                product_id: 1,
                available: 3,
                requested: 4
            }
        );
    }

    #[test]
    fn test_repeated_product_is_fetched_once_and_reserved_together() {
        let lines = [
            BillLineRequest::new(1, 2),
            BillLineRequest::new(2, 1),
            BillLineRequest::new(1, 2),
        ];

        let mut validator = OrderValidator::new();
        let catalog = [chips(10), milk(4)];
        let mut fetches = 0;
        for (index, raw) in lines.iter().enumerate() {
            let line = parse_line(index, raw).unwrap();
            let fetched = if validator.needs_product(line.product_id) {
                fetches += 1;
                catalog.iter().find(|p| p.id == line.product_id).cloned()
            } else {
                None
            };
            validator.check_line(line, fetched).unwrap();
        }
        assert_eq!(fetches, 2);
        assert_eq!(validator.cached_products(), 2);

        let order = validator.finish().unwrap();
        assert_eq!(order.items.len(), 3);
        assert_eq!(
            order.grand_total,
            Money::from_rupees(40) + Money::from_paise(2550)
        );
        let reserved: Vec<(i64, i64)> = order
            .reservations
            .iter()
            .map(|r| (r.product_id, r.quantity))
            .collect();
        assert_eq!(reserved, vec![(1, 4), (2, 1)]);
    }

    #[test]
    fn test_unknown_product_reports_index() {
        let lines = [BillLineRequest::new(1, 1), BillLineRequest::new(999, 1)];
        let err = run(&lines, &[chips(5)]).unwrap_err();
        assert_eq!(
            err,
            CoreError::LineProductNotFound {
                index: 1,
                product_id: 999
            }
        );
    }

    #[test]
    fn test_invalid_line_fails_fast() {
        let lines = [
            BillLineRequest {
                product_id: json!("1"),
                quantity: json!(0),
            },
            BillLineRequest::new(999, 1),
        ];
        let err = run(&lines, &[chips(5)]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidLine { index: 0, .. }));

        let lines = [BillLineRequest {
            product_id: json!("one"),
            quantity: json!(1),
        }];
        let err = run(&lines, &[chips(5)]).unwrap_err();
        assert_eq!(
            err,
            CoreError::invalid_line(0, "productId must be a positive integer")
        );
    }

    #[test]
    fn test_string_values_are_accepted() {
        let lines = [BillLineRequest {
            product_id: json!("1"),
            quantity: json!("2"),
        }];
        let order = run(&lines, &[chips(5)]).unwrap();
        assert_eq!(order.grand_total, Money::from_rupees(20));
    }

    #[test]
    fn test_finish_without_lines_is_empty_order() {
        assert_eq!(OrderValidator::new().finish().unwrap_err(), CoreError::EmptyOrder);
    }

    #[test]
    fn test_precheck() {
        let mut request = CreateBillRequest {
            customer_name: Some("Ravi".to_string()),
            mobile_number: Some("9876543210".to_string()),
            items: vec![],
        };
        assert_eq!(precheck(&request).unwrap_err(), CoreError::EmptyOrder);

        request.items.push(BillLineRequest::new(1, 1));
        assert_eq!(
            precheck(&request).unwrap(),
            ("Ravi".to_string(), "9876543210".to_string())
        );

        request.mobile_number = Some("12345".to_string());
        assert!(matches!(
            precheck(&request).unwrap_err(),
            CoreError::Validation(ValidationError::InvalidFormat { .. })
        ));

        request.customer_name = None;
        assert!(matches!(
            precheck(&request).unwrap_err(),
            CoreError::Validation(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_draft_keeps_request_order() {
        let lines = [BillLineRequest::new(2, 1), BillLineRequest::new(1, 1)];
        let draft = run(&lines, &[chips(5), milk(5)])
            .unwrap()
            .into_draft("Ravi".to_string(), "9876543210".to_string());
        let ids: Vec<i64> = draft.items.iter().map(|i| i.product_id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(draft.customer_name, "Ravi");
    }
}
