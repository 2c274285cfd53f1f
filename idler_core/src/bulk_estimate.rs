//! Bulk price estimator.
//!
//! Walks an imported item list one item at a time, collecting a price for
//! each, and totals the project once every item is priced.
//!
//! ```rust
//! use idler_core::bulk_estimate::{PriceSheet, SubmitOutcome};
//!
//! let mut sheet = PriceSheet::new(vec!["Drive pulley".into(), "Gearbox".into()]);
//! assert_eq!(sheet.current_item(), Some("Drive pulley"));
//!
//! assert!(matches!(sheet.submit("abc"), SubmitOutcome::Rejected(_)));
//! sheet.submit("1250");
//! let SubmitOutcome::Complete(summary) = sheet.submit("980.5") else { panic!() };
//! assert_eq!(summary.total, 2230.5);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::CalcError;

/// One priced item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedItem {
    pub item: String,
    pub price: f64,
}

/// Every item with its price, and the project total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub lines: Vec<PricedItem>,
    pub total: f64,
}

/// What happened to one submitted answer.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Price stored; `next` is the item now being asked for
    Accepted { next: String },
    /// Last price stored
    Complete(PriceSummary),
    /// Not a usable price; the same item is asked again
    Rejected(CalcError),
    /// Nothing left to price
    AlreadyComplete,
}

/// Prices being collected for an item list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSheet {
    items: Vec<String>,
    prices: Vec<f64>,
}

impl PriceSheet {
    pub fn new(items: Vec<String>) -> Self {
        Self {
            items,
            prices: Vec::new(),
        }
    }

    /// Item waiting for a price
    pub fn current_item(&self) -> Option<&str> {
        self.items.get(self.prices.len()).map(String::as_str)
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// (priced, total) item counts
    pub fn progress(&self) -> (usize, usize) {
        (self.prices.len(), self.items.len())
    }

    pub fn is_complete(&self) -> bool {
        self.prices.len() >= self.items.len()
    }

    /// Answer the current question with raw user input.
    pub fn submit(&mut self, input: &str) -> SubmitOutcome {
        let Some(item) = self.current_item() else {
            return SubmitOutcome::AlreadyComplete;
        };

        let price = match parse_price(input) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(item, input, "price rejected");
                return SubmitOutcome::Rejected(e);
            }
        };
        tracing::debug!(item, price, "price entered");
        self.prices.push(price);

        match self.current_item() {
            Some(next) => SubmitOutcome::Accepted {
                next: next.to_string(),
            },
            None => SubmitOutcome::Complete(self.summary()),
        }
    }

    /// Items priced so far and their total
    pub fn summary(&self) -> PriceSummary {
        let lines: Vec<PricedItem> = self
            .items
            .iter()
            .zip(&self.prices)
            .map(|(item, price)| PricedItem {
                item: item.clone(),
                price: *price,
            })
            .collect();
        let total = lines.iter().map(|l| l.price).sum();
        PriceSummary { lines, total }
    }
}

fn parse_price(input: &str) -> Result<f64, CalcError> {
    let trimmed = input.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(CalcError::invalid_input(
            "price",
            trimmed,
            "Please enter a numeric price",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_walk() {
        let mut sheet = PriceSheet::new(vec!["A".into(), "B".into(), "C".into()]);
        assert_eq!(sheet.progress(), (0, 3));

        assert_eq!(
            sheet.submit(" 10 "),
            SubmitOutcome::Accepted { next: "B".into() }
        );
        assert!(matches!(sheet.submit("ten"), SubmitOutcome::Rejected(_)));
        assert_eq!(sheet.current_item(), Some("B"));
        sheet.submit("20.25");

        let SubmitOutcome::Complete(summary) = sheet.submit("0") else {
            panic!("expected completion");
        };
        assert_eq!(summary.lines.len(), 3);
        assert_eq!(summary.lines[1].item, "B");
        assert!((summary.total - 30.25).abs() < 1e-12);
        assert!(sheet.is_complete());
        assert_eq!(sheet.submit("5"), SubmitOutcome::AlreadyComplete);
    }

    #[test]
    fn test_empty_list_complete() {
        let mut sheet = PriceSheet::new(Vec::new());
        assert!(sheet.is_complete());
        assert_eq!(sheet.current_item(), None);
        assert_eq!(sheet.summary().total, 0.0);
        assert_eq!(sheet.submit("1"), SubmitOutcome::AlreadyComplete);
    }

    #[test]
    fn test_non_finite_and_negative_rejected() {
        let mut sheet = PriceSheet::new(vec!["A".into()]);
        for bad in ["", "nan", "inf", "-5", "1,000"] {
            assert!(matches!(sheet.submit(bad), SubmitOutcome::Rejected(_)), "{bad}");
        }
        assert_eq!(sheet.progress(), (0, 1));
    }
}
