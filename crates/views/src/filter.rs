//! Composable filters over the projections.
//!
//! Each dimension is an independent predicate; a filter is the logical AND of
//! its dimensions. `and` merges two filters so that sequential application
//! equals merged application for independent filters.

use serde::{Deserialize, Serialize};

use shelflife_ledger::ExpiryTier;

use crate::projection::{AggregateProduct, BatchView};

/// Stock-level dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockFilter {
    #[default]
    All,
    /// Quantity at or below the safety threshold.
    Low,
    /// Quantity at or below zero.
    Out,
}

impl StockFilter {
    fn matches(self, quantity: i64, safety_stock: i64) -> bool {
        match self {
            StockFilter::All => true,
            StockFilter::Low => quantity <= safety_stock,
            StockFilter::Out => quantity <= 0,
        }
    }
}

/// Expiry-tier dimension; meaningful only at batch grain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryFilter {
    #[default]
    All,
    Only(ExpiryTier),
}

impl ExpiryFilter {
    fn matches(self, tier: ExpiryTier) -> bool {
        match self {
            ExpiryFilter::All => true,
            ExpiryFilter::Only(wanted) => tier == wanted,
        }
    }
}

/// Promotion-tag dimension. The tag is pass-through metadata from the
/// catalog; this core never derives it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionFilter {
    #[default]
    All,
    Tag(String),
}

impl PromotionFilter {
    fn matches(&self, promotion: Option<&str>) -> bool {
        match self {
            PromotionFilter::All => true,
            PromotionFilter::Tag(tag) => promotion == Some(tag.as_str()),
        }
    }
}

/// Case-insensitive substring match against product name or unit.
fn search_matches(query: Option<&str>, name: &str, unit: &str) -> bool {
    match query {
        None => true,
        Some(q) => {
            let q = q.to_lowercase();
            name.to_lowercase().contains(&q) || unit.to_lowercase().contains(&q)
        }
    }
}

/// Filter over the current view (batch grain, all four dimensions).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchFilter {
    pub stock: StockFilter,
    pub expiry: ExpiryFilter,
    pub promotion: PromotionFilter,
    pub search: Option<String>,
}

impl BatchFilter {
    pub fn matches(&self, view: &BatchView) -> bool {
        self.stock
            .matches(view.batch.current_quantity, view.batch.safety_stock)
            && self.expiry.matches(view.expiry.tier)
            && self.promotion.matches(view.batch.promotion.as_deref())
            && search_matches(
                self.search.as_deref(),
                &view.batch.product_name,
                &view.batch.unit,
            )
    }

    pub fn apply(&self, views: &[BatchView]) -> Vec<BatchView> {
        views.iter().filter(|v| self.matches(v)).cloned().collect()
    }

    /// Merge two filters into their conjunction. On a dimension both sides
    /// constrain, `other` wins; composing independent filters is therefore
    /// order-insensitive.
    pub fn and(&self, other: &BatchFilter) -> BatchFilter {
        BatchFilter {
            stock: if other.stock == StockFilter::All {
                self.stock
            } else {
                other.stock
            },
            expiry: if other.expiry == ExpiryFilter::All {
                self.expiry
            } else {
                other.expiry
            },
            promotion: if other.promotion == PromotionFilter::All {
                self.promotion.clone()
            } else {
                other.promotion.clone()
            },
            search: other.search.clone().or_else(|| self.search.clone()),
        }
    }
}

/// Filter over the all view (product grain; no expiry dimension, products
/// have no single expiry date).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductFilter {
    pub stock: StockFilter,
    pub promotion: PromotionFilter,
    pub search: Option<String>,
}

impl ProductFilter {
    pub fn matches(&self, product: &AggregateProduct) -> bool {
        self.stock
            .matches(product.total_quantity, product.safety_stock)
            && self.promotion.matches(product.promotion.as_deref())
            && search_matches(
                self.search.as_deref(),
                &product.product_name,
                &product.unit,
            )
    }

    pub fn apply(&self, products: &[AggregateProduct]) -> Vec<AggregateProduct> {
        products
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect()
    }

    pub fn and(&self, other: &ProductFilter) -> ProductFilter {
        ProductFilter {
            stock: if other.stock == StockFilter::All {
                self.stock
            } else {
                other.stock
            },
            promotion: if other.promotion == PromotionFilter::All {
                self.promotion.clone()
            } else {
                other.promotion.clone()
            },
            search: other.search.clone().or_else(|| self.search.clone()),
        }
    }
}
