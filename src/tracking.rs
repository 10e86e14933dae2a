//! WhatsApp click tracking

use std::collections::HashMap;

use crate::error::AppError;
use crate::model::{ClickStat, Product, TrackRequest};

const NAME_PREFIX: &str = "name:";

/// Counter key for a tracking request: the product id when given, else
/// `name:<name>`.
pub fn click_key(request: &TrackRequest) -> Result<String, AppError> {
    let id = request.product_id.as_deref().map(str::trim).unwrap_or_default();
    if !id.is_empty() {
        return Ok(id.to_string());
    }
    let name = request.name.as_deref().map(str::trim).unwrap_or_default();
    if !name.is_empty() {
        return Ok(format!("{NAME_PREFIX}{name}"));
    }
    Err(AppError::BadRequest("productId or name required".into()))
}

/// Click report: every product in catalog order with its count (zero when
/// never clicked), followed by counters that match no current product.
///
/// Leftover counters keep the last name recorded with them, or the part after
/// `name:`, or their key.
pub fn join_clicks(rows: Vec<(String, Option<String>, u64)>, products: &[Product]) -> Vec<ClickStat> {
    let mut counters: HashMap<String, (Option<String>, u64)> = rows
        .iter()
        .map(|(key, name, clicks)| (key.clone(), (name.clone(), *clicks)))
        .collect();

    let mut stats: Vec<ClickStat> = products
        .iter()
        .map(|p| ClickStat {
            id: p.id.clone(),
            name: p.name.clone(),
            clicks: counters.remove(&p.id).map(|(_, clicks)| clicks).unwrap_or(0),
        })
        .collect();

    for (key, _, _) in rows {
        let Some((recorded, clicks)) = counters.remove(&key) else {
            continue;
        };
        let name = recorded
            .or_else(|| key.strip_prefix(NAME_PREFIX).map(String::from))
            .unwrap_or_else(|| key.clone());
        stats.push(ClickStat {
            id: key,
            name,
            clicks,
        });
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_prefers_product_id() {
        let request = TrackRequest {
            product_id: Some("p1".into()),
            name: Some("Duvet".into()),
        };
        assert_eq!(click_key(&request).unwrap(), "p1");

        let by_name = TrackRequest {
            product_id: Some("  ".into()),
            name: Some("Duvet".into()),
        };
        assert_eq!(click_key(&by_name).unwrap(), "name:Duvet");

        assert!(click_key(&TrackRequest::default()).is_err());
    }

    #[test]
    fn join_lists_products_then_leftover_counters() {
        let products: Vec<Product> = serde_json::from_value(json!([
            {"id": "p2", "name": "Silk Pillow"},
            {"id": "p1", "name": "Renamed Duvet"}
        ]))
        .unwrap();
        let stats = join_clicks(
            vec![
                ("gone".into(), None, 1),
                ("name:Throw".into(), None, 3),
                ("p1".into(), Some("Duvet".into()), 5),
            ],
            &products,
        );
        let report: Vec<(&str, &str, u64)> = stats
            .iter()
            .map(|s| (s.id.as_str(), s.name.as_str(), s.clicks))
            .collect();
        assert_eq!(
            report,
            vec![
                ("p2", "Silk Pillow", 0),
                ("p1", "Renamed Duvet", 5),
                ("gone", "gone", 1),
                ("name:Throw", "Throw", 3),
            ]
        );
    }
}
