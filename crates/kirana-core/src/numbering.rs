//! # Numbering
//!
//! Counter namespaces and the human-readable bill number format.
//!
//! ```text
//!   counter "billNumber" ──► 42 ──► BILL-2026-000042
//!                                   │    │    └── sequence, zero-padded to 6
//!                                   │    └─────── calendar year at billing
//!                                   └──────────── fixed prefix
//! ```
//!
//! The sequence is global, not per-year, so numbers stay unique and strictly
//! increasing across a year boundary as well. Sequences above 999999 widen
//! instead of wrapping.

use crate::error::ValidationError;
use crate::validation::ValidationResult;

/// Prefix of every bill number.
pub const BILL_PREFIX: &str = "BILL";

/// Width of the zero-padded sequence part.
pub const BILL_SEQUENCE_WIDTH: usize = 6;

/// Named monotonic counters kept by the storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    /// Mints product IDs.
    ProductId,
    /// Mints bill sequence numbers.
    BillNumber,
}

impl Counter {
    /// Storage key of the counter.
    pub const fn name(&self) -> &'static str {
        match self {
            Counter::ProductId => "productId",
            Counter::BillNumber => "billNumber",
        }
    }
}

/// Formats a bill number: `BILL-<year>-<sequence padded to 6>`.
pub fn format_bill_number(year: i32, sequence: i64) -> String {
    format!(
        "{}-{:04}-{:0width$}",
        BILL_PREFIX,
        year,
        sequence,
        width = BILL_SEQUENCE_WIDTH
    )
}

/// Parses a bill number back into `(year, sequence)`.
///
/// ## Example
/// ```rust
/// use kirana_core::numbering::parse_bill_number;
///
/// assert_eq!(parse_bill_number("BILL-2026-000042").unwrap(), (2026, 42));
/// assert!(parse_bill_number("BILL-26-42").is_err());
/// ```
pub fn parse_bill_number(input: &str) -> ValidationResult<(i32, i64)> {
    let invalid = || {
        ValidationError::invalid_format("billNumber", "expected BILL-YYYY-NNNNNN")
    };

    let input = input.trim();
    if input.is_empty() {
        return Err(ValidationError::required("billNumber"));
    }

    let mut parts = input.splitn(3, '-');
    let prefix = parts.next().ok_or_else(invalid)?;
    let year = parts.next().ok_or_else(invalid)?;
    let sequence = parts.next().ok_or_else(invalid)?;

    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if prefix != BILL_PREFIX
        || year.len() != 4
        || !all_digits(year)
        || sequence.len() < BILL_SEQUENCE_WIDTH
        || !all_digits(sequence)
    {
        return Err(invalid());
    }

    let year = year.parse().map_err(|_| invalid())?;
    let sequence = sequence.parse().map_err(|_| invalid())?;
    Ok((year, sequence))
}
