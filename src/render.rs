//! HTML rendering for product cards and result panels
//!
//! Everything here is a pure function from data to an HTML string; callers
//! decide where the fragment goes.

use crate::catalog::CURTAIN_TYPES;
use crate::model::{Product, StockStatus};

/// Shown when a product has no image.
pub const PLACEHOLDER_IMAGE: &str = "data:image/svg+xml;utf8,<svg xmlns=%22http://www.w3.org/2000/svg%22 width=%22400%22 height=%22300%22><rect width=%22100%25%22 height=%22100%25%22 fill=%22%23f3f4f6%22/><text x=%2250%25%22 y=%2250%25%22 dominant-baseline=%22middle%22 text-anchor=%22middle%22 fill=%22%236b7280%22 font-family=%22Arial, sans-serif%22 font-size=%2220%22>No Image</text></svg>";

/// Cards before this index load eagerly with high fetch priority.
pub const EAGER_IMAGES: usize = 4;

pub const OTHER_CURTAINS: &str = "Other Curtains";

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Upper-cases the first letter of every space separated word.
pub fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// en-GH number formatting: comma thousands separators, at most three
/// fraction digits, trailing zeros dropped.
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let fixed = format!("{:.3}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && (grouped != "0" || !frac_part.is_empty()) {
        "-"
    } else {
        ""
    };
    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

/// `GHS 1,234.5`; a missing price shows as `GHS 0`.
pub fn format_price(price: Option<f64>) -> String {
    format!("GHS {}", format_amount(price.unwrap_or(0.0)))
}

pub fn badge_slug(badge: &str) -> String {
    badge
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Stock badge; rows that never stored a status show none.
pub fn stock_badge(product: &Product) -> String {
    let Some(raw) = product.stock_status.as_deref().filter(|s| !s.trim().is_empty()) else {
        return String::new();
    };
    let status = StockStatus::parse_lenient(raw).unwrap_or_default();
    let class = status.as_str().replace('_', "-");
    format!(r#"<span class="stock-badge {class}">{}</span>"#, status.label())
}

/// Renders one product card.
///
/// `index` is the card's position in the list being rendered and only
/// controls image loading priority.
pub fn render_card(product: &Product, index: usize) -> String {
    let name = if product.name.trim().is_empty() {
        "Unnamed Product"
    } else {
        product.name.as_str()
    };
    let name = html_escape(name);
    let id = html_escape(&product.id);
    let category = if product.category.is_empty() {
        "all".to_string()
    } else {
        html_escape(&product.category)
    };

    let badge = product
        .badge
        .as_deref()
        .filter(|b| !b.trim().is_empty())
        .map(|b| {
            format!(
                r#"<span class="badge badge-{}">{}</span>"#,
                html_escape(&badge_slug(b)),
                html_escape(b)
            )
        })
        .unwrap_or_default();

    let image = product
        .image_url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .map(html_escape)
        .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());
    let (loading, priority) = if index < EAGER_IMAGES {
        ("eager", "high")
    } else {
        ("lazy", "low")
    };

    let description = product
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .map(|d| format!(r#"<p class="product-description">{}</p>"#, html_escape(d)))
        .unwrap_or_default();

    format!(
        r#"<article class="product-card" data-id="{id}" data-category="{category}" role="listitem" aria-label="Product: {name}">
    {badge}
    <span class="price-badge">{price}</span>
    <picture>
        <img src="{image}" alt="{name}" loading="{loading}" decoding="async" width="400" height="300" fetchpriority="{priority}">
    </picture>
    <div class="product-card-content">
        <h3>{name}</h3>
        {description}
        {stock}
        <a href="product.html?id={id}" class="btn">View Details</a>
    </div>
</article>"#,
        price = format_price(product.price),
        stock = stock_badge(product),
    )
}

/// Renders cards in order with indices starting at zero.
pub fn render_cards(products: &[&Product]) -> String {
    products
        .iter()
        .enumerate()
        .map(|(index, product)| render_card(product, index))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A labelled subcategory partition of the curtain results
#[derive(Debug, Clone, PartialEq)]
pub struct CurtainBucket<'a> {
    pub label: String,
    pub products: Vec<&'a Product>,
}

/// Partitions curtain results into the fixed subcategory buckets plus an
/// `Other Curtains` residual. Empty buckets are dropped; bucket order never
/// depends on result order.
pub fn curtain_buckets<'a>(products: &[&'a Product]) -> Vec<CurtainBucket<'a>> {
    let subcategory = |p: &Product| p.subcategory.as_deref().unwrap_or_default().trim().to_lowercase();

    let mut buckets: Vec<CurtainBucket<'a>> = CURTAIN_TYPES
        .iter()
        .map(|kind| CurtainBucket {
            label: title_case(kind),
            products: products
                .iter()
                .copied()
                .filter(|p| subcategory(*p) == *kind)
                .collect(),
        })
        .collect();

    buckets.push(CurtainBucket {
        label: OTHER_CURTAINS.to_string(),
        products: products
            .iter()
            .copied()
            .filter(|p| !CURTAIN_TYPES.contains(&subcategory(*p).as_str()))
            .collect(),
    });

    buckets.retain(|bucket| !bucket.products.is_empty());
    buckets
}

pub fn render_curtain_sections(products: &[&Product]) -> String {
    curtain_buckets(products)
        .iter()
        .map(|bucket| {
            format!(
                r#"<h3 class="curtain-group-heading">{label}</h3>
<div class="products curtain-group" role="list" aria-label="{label}">
{cards}
</div>"#,
                label = html_escape(&bucket.label),
                cards = render_cards(&bucket.products),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn results_text(count: usize) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("{count} product{plural} found")
}

pub fn render_loading() -> String {
    r#"<div class="products-loading" aria-busy="true">Loading products...</div>"#.to_string()
}

pub fn render_empty_state() -> String {
    r#"<div class="empty-state" role="status">
    <p class="lead">No products found matching your criteria.</p>
    <a class="btn" id="clear-all-btn" href="?clear=1">Clear Filters</a>
    <a class="btn" href="contact.html">Contact Us</a>
</div>"#
        .to_string()
}

pub fn render_error_panel(message: &str) -> String {
    format!(
        r#"<div class="load-error" role="alert">
    <p class="lead">Failed to load products. Please try again later.</p>
    <p class="error-detail">{}</p>
    <a class="btn" id="reload-products" href="?reload=1">Reload Page</a>
</div>"#,
        html_escape(message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, subcategory: Option<&str>) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": format!("Curtain {id}"),
            "category": "curtain",
            "subcategory": subcategory,
        }))
        .unwrap()
    }

    #[test]
    fn price_formatting() {
        assert_eq!(format_price(Some(1234.5)), "GHS 1,234.5");
        assert_eq!(format_price(Some(1_000_000.0)), "GHS 1,000,000");
        assert_eq!(format_price(Some(12.3456)), "GHS 12.346");
        assert_eq!(format_price(Some(999.0)), "GHS 999");
        assert_eq!(format_price(None), "GHS 0");
    }

    #[test]
    fn display_does_not_touch_stored_value() {
        let mut p = product("a", None);
        p.price = Some(1234.5);
        let card = render_card(&p, 0);
        assert!(card.contains("GHS 1,234.5"));
        assert_eq!(p.price, Some(1234.5));
    }

    #[test]
    fn image_priority_by_position() {
        let p = product("a", None);
        assert!(render_card(&p, 3).contains(r#"loading="eager""#));
        assert!(render_card(&p, 3).contains(r#"fetchpriority="high""#));
        assert!(render_card(&p, 4).contains(r#"loading="lazy""#));
        assert!(render_card(&p, 4).contains(r#"fetchpriority="low""#));
    }

    #[test]
    fn card_escapes_and_annotates() {
        let mut p = product("x1", None);
        p.name = "<Silk> & Co".into();
        p.badge = Some("Best Seller".into());
        p.stock_status = Some("low-stock".into());
        let card = render_card(&p, 0);
        assert!(card.contains("&lt;Silk&gt; &amp; Co"));
        assert!(card.contains(r#"badge badge-best-seller"#));
        assert!(card.contains("Low stock"));
        assert!(card.contains("product.html?id=x1"));
        assert!(card.contains(PLACEHOLDER_IMAGE));
    }

    #[test]
    fn curtain_buckets_fixed_order_with_residual() {
        let rows = [
            product("1", Some("door curtains")),
            product("2", Some("Two In One")),
            product("3", Some("lace")),
            product("4", None),
        ];
        let refs: Vec<&Product> = rows.iter().collect();
        let buckets = curtain_buckets(&refs);
        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Two In One", "Door Curtains", "Other Curtains"]);
        assert_eq!(buckets[2].products.len(), 2);
    }

    #[test]
    fn results_count_pluralizes() {
        assert_eq!(results_text(1), "1 product found");
        assert_eq!(results_text(0), "0 products found");
    }
}
