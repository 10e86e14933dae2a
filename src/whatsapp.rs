//! WhatsApp contact links and the browsing cart
//!
//! Every order or contact action ends in a `https://wa.me/<digits>?text=...`
//! deep link. Phone numbers typed by admins are normalized to that form with
//! Ghanaian defaults (country code 233).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::prefs::{Preferences, CART_KEY};
use crate::render::{format_amount, title_case};

pub const COUNTRY_CODE: &str = "233";

/// Normalizes a raw phone number or link into `https://wa.me/<digits>`.
///
/// Links (`http(s)://...` or anything mentioning `wa.me`) pass through
/// unchanged. Returns `None` for blank input or input without digits.
pub fn normalize_contact(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.contains("wa.me") {
        return Some(trimmed.to_string());
    }

    let kept: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    let mut digits = kept.strip_prefix('+').unwrap_or(&kept).replace('+', "");
    if digits.is_empty() {
        return None;
    }
    if let Some(rest) = digits.strip_prefix("00") {
        digits = rest.to_string();
    }
    if let Some(rest) = digits.strip_prefix('0') {
        digits = format!("{COUNTRY_CODE}{rest}");
    }
    if !digits.starts_with(COUNTRY_CODE) && digits.len() <= 10 {
        digits = format!("{COUNTRY_CODE}{digits}");
    }
    Some(format!("https://wa.me/{digits}"))
}

/// Percent-encodes like JavaScript's `encodeURIComponent`, which also
/// leaves `!'()*` alone.
pub fn encode_component(s: &str) -> String {
    urlencoding::encode(s)
        .replace("%21", "!")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
        .replace("%2A", "*")
}

/// Deep link carrying a prefilled message.
///
/// `contact` may be a bare number or an already-normalized link.
pub fn order_link(contact: &str, message: &str) -> String {
    let base = normalize_contact(contact)
        .unwrap_or_else(|| format!("https://wa.me/{COUNTRY_CODE}"));
    let base = base.split('?').next().unwrap_or(&base).to_string();
    format!("{base}?text={}", encode_component(message))
}

/// Selections on the product detail page.
#[derive(Debug, Clone, Default)]
pub struct OrderRequest {
    pub product_name: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub quantity: u32,
}

impl OrderRequest {
    pub fn message(&self) -> String {
        let mut message = format!("Hello! I'm interested in {}", self.product_name);
        if let Some(size) = self.size.as_deref().filter(|s| !s.is_empty()) {
            message.push_str(&format!(" - Size: {}", title_case(size)));
        }
        if let Some(color) = self.color.as_deref().filter(|s| !s.is_empty()) {
            message.push_str(&format!(", Color: {}", title_case(color)));
        }
        if self.quantity > 1 {
            message.push_str(&format!(", Quantity: {}", self.quantity));
        }
        message
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub image: Option<String>,
    pub size: String,
    pub color: String,
    pub quantity: u32,
    #[serde(rename = "addedAt")]
    pub added_at: DateTime<Utc>,
}

/// Cart persisted as a JSON array under the `cart` preference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Loads the stored cart; unreadable data yields an empty cart.
    pub fn load(prefs: &dyn Preferences) -> Self {
        let items = prefs
            .get(CART_KEY)
            .map(|raw| {
                serde_json::from_str(&raw).unwrap_or_else(|e| {
                    warn!("discarding unreadable cart: {e}");
                    Vec::new()
                })
            })
            .unwrap_or_default();
        Cart { items }
    }

    pub fn save(&self, prefs: &mut dyn Preferences) {
        match serde_json::to_string(&self.items) {
            Ok(raw) => prefs.set(CART_KEY, &raw),
            Err(e) => warn!("unable to store cart: {e}"),
        }
    }

    pub fn add(&mut self, item: CartItem) {
        self.items.push(item);
    }

    pub fn total(&self) -> f64 {
        self.items
            .iter()
            .map(|i| i.price.unwrap_or(0.0) * f64::from(i.quantity))
            .sum()
    }

    pub fn order_message(&self) -> String {
        let mut message = String::from("Hello! I'd like to order:");
        for item in &self.items {
            message.push_str(&format!(
                "\n- {} ({}, {}) x{}",
                item.name,
                title_case(&item.size),
                title_case(&item.color),
                item.quantity
            ));
        }
        message.push_str(&format!("\nTotal: GHS {}", format_amount(self.total())));
        message
    }
}
