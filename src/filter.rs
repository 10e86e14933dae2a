//! Product filter engine
//!
//! [`FilterState`] holds the shopper's current selections and [`FilterState::apply`]
//! computes the visible products from the full catalog. Filtering is a pure
//! conjunction of predicates and is recomputed from scratch on every call.

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::catalog::normalize_category;
use crate::facets::{self, canonical_color};
use crate::model::Product;

/// Category value meaning "no category predicate".
pub const ALL: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetKind {
    Size,
    Color,
    Fabric,
    Subcategory,
}

/// Query parameters of the storefront page
///
/// # Example
/// `?filter=curtains&q=velvet&max=500&color=grey,blue`
#[derive(Deserialize, Debug, Default, Clone)]
pub struct FilterParams {
    pub filter: Option<String>,
    pub q: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub fabric: Option<String>,
    pub subcategory: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub category: String,
    pub query: String,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub sizes: BTreeSet<String>,
    pub colors: BTreeSet<String>,
    pub fabrics: BTreeSet<String>,
    pub subcategories: BTreeSet<String>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            category: ALL.to_string(),
            query: String::new(),
            price_min: None,
            price_max: None,
            sizes: BTreeSet::new(),
            colors: BTreeSet::new(),
            fabrics: BTreeSet::new(),
            subcategories: BTreeSet::new(),
        }
    }
}

fn split_list(raw: Option<&str>) -> BTreeSet<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

fn parse_bound(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

impl FilterState {
    pub fn from_params(params: &FilterParams) -> Self {
        Self {
            category: normalize_category(params.filter.as_deref().unwrap_or_default()),
            query: params.q.as_deref().unwrap_or_default().trim().to_string(),
            price_min: parse_bound(params.min.as_deref()),
            price_max: parse_bound(params.max.as_deref()),
            sizes: split_list(params.size.as_deref()),
            colors: split_list(params.color.as_deref()),
            fabrics: split_list(params.fabric.as_deref()),
            subcategories: split_list(params.subcategory.as_deref()),
        }
    }

    pub fn set_category(&mut self, category: &str) {
        self.category = normalize_category(category);
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.trim().to_string();
    }

    pub fn set_price_range(&mut self, min: Option<f64>, max: Option<f64>) {
        self.price_min = min;
        self.price_max = max;
    }

    fn selection_mut(&mut self, kind: FacetKind) -> &mut BTreeSet<String> {
        match kind {
            FacetKind::Size => &mut self.sizes,
            FacetKind::Color => &mut self.colors,
            FacetKind::Fabric => &mut self.fabrics,
            FacetKind::Subcategory => &mut self.subcategories,
        }
    }

    /// Checkbox change for one facet value.
    pub fn toggle(&mut self, kind: FacetKind, value: &str, checked: bool) {
        let value = value.trim().to_lowercase();
        let selection = self.selection_mut(kind);
        if checked {
            selection.insert(value);
        } else {
            selection.remove(&value);
        }
    }

    /// Resets every selection, including the category.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Number of active price bounds and facet selections.
    pub fn active_count(&self) -> usize {
        usize::from(self.price_min.is_some())
            + usize::from(self.price_max.is_some())
            + self.sizes.len()
            + self.colors.len()
            + self.fabrics.len()
            + self.subcategories.len()
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Whether `product` passes every active predicate.
    pub fn matches(&self, product: &Product) -> bool {
        if self.category != ALL && normalize_category(&product.category) != self.category {
            return false;
        }

        if !self.query.is_empty() && !product.search_text().contains(&self.query.to_lowercase()) {
            return false;
        }

        let price = product.price_value();
        if self.price_min.is_some_and(|min| price < min) {
            return false;
        }
        if self.price_max.is_some_and(|max| price > max) {
            return false;
        }

        if !(self.sizes.is_empty() && self.colors.is_empty() && self.fabrics.is_empty()) {
            let inferred = facets::infer(product);
            if !self.sizes.is_empty() && !self.sizes.iter().any(|s| inferred.has_size(s)) {
                return false;
            }
            if !self.colors.is_empty()
                && !self.colors.iter().any(|c| inferred.has_color(canonical_color(c)))
            {
                return false;
            }
            if !self.fabrics.is_empty() && !self.fabrics.iter().any(|f| inferred.has_fabric(f)) {
                return false;
            }
        }

        if !self.subcategories.is_empty() {
            let subcategory = product
                .subcategory
                .as_deref()
                .unwrap_or_default()
                .to_lowercase();
            if !self.subcategories.contains(&subcategory) {
                return false;
            }
        }

        true
    }

    /// Products passing every active predicate, in catalog order.
    pub fn apply<'a>(&self, catalog: &'a [Product]) -> Vec<&'a Product> {
        catalog.iter().filter(|p| self.matches(p)).collect()
    }
}
