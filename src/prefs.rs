//! Client-side preferences
//!
//! The browser pages keep a few values in local storage: the grid/list view,
//! the admin grouping toggle, the cart and collapsed sections. Server-rendered
//! pages keep the same keys in cookies.

use std::collections::BTreeMap;

use crate::whatsapp::encode_component;

pub const VIEW_KEY: &str = "productView";
pub const GROUP_KEY: &str = "groupByCategory";
pub const CART_KEY: &str = "cart";

/// Key under which a section's collapsed state is kept.
pub fn collapse_key(section: &str) -> String {
    format!("collapse_{section}")
}

pub trait Preferences {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);

    fn get_bool(&self, key: &str) -> bool {
        self.get(key).as_deref() == Some("true")
    }

    fn set_bool(&mut self, key: &str, value: bool) {
        self.set(key, if value { "true" } else { "false" });
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: BTreeMap<String, String>,
}

impl Preferences for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// Reverses percent-encoding; values that do not decode to UTF-8 are kept
/// as written.
fn decode_component(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|value| value.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Preferences read from a `Cookie` request header.
///
/// Changes are remembered so the handler can answer with `Set-Cookie`.
#[derive(Debug, Clone, Default)]
pub struct CookiePreferences {
    values: BTreeMap<String, String>,
    changed: BTreeMap<String, Option<String>>,
}

impl CookiePreferences {
    pub fn from_header(header: Option<&str>) -> Self {
        let values = header
            .unwrap_or_default()
            .split(';')
            .filter_map(|pair| {
                let (key, value) = pair.split_once('=')?;
                let key = key.trim();
                (!key.is_empty()).then(|| (key.to_string(), decode_component(value.trim())))
            })
            .collect();
        Self {
            values,
            changed: BTreeMap::new(),
        }
    }

    /// `Set-Cookie` values for every key changed since construction.
    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.changed
            .iter()
            .map(|(key, value)| match value {
                Some(value) => format!(
                    "{key}={}; Path=/; Max-Age=31536000; SameSite=Lax",
                    encode_component(value)
                ),
                None => format!("{key}=; Path=/; Max-Age=0"),
            })
            .collect()
    }
}

impl Preferences for CookiePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        if self.values.get(key).map(String::as_str) != Some(value) {
            self.changed.insert(key.to_string(), Some(value.to_string()));
        }
        self.values.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.changed.insert(key.to_string(), None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_header_parsing() {
        let prefs = CookiePreferences::from_header(Some("productView=list; groupByCategory=true; junk"));
        assert_eq!(prefs.get(VIEW_KEY).as_deref(), Some("list"));
        assert!(prefs.get_bool(GROUP_KEY));
        assert!(prefs.set_cookie_headers().is_empty());
    }

    #[test]
    fn only_changes_are_emitted() {
        let mut prefs = CookiePreferences::from_header(Some("productView=grid"));
        prefs.set(VIEW_KEY, "grid");
        assert!(prefs.set_cookie_headers().is_empty());
        prefs.set(VIEW_KEY, "list");
        prefs.set_bool(&collapse_key("filters"), true);
        let headers = prefs.set_cookie_headers();
        assert_eq!(headers.len(), 2);
        assert!(headers.iter().any(|h| h.starts_with("productView=list;")));
        assert!(headers.iter().any(|h| h.starts_with("collapse_filters=true;")));
    }

    #[test]
    fn undecodable_cookie_values_are_kept() {
        let prefs = CookiePreferences::from_header(Some("cart=%FF%FE; productView=li%73t"));
        assert_eq!(prefs.get(CART_KEY).as_deref(), Some("%FF%FE"));
        assert_eq!(prefs.get(VIEW_KEY).as_deref(), Some("list"));
    }

    #[test]
    fn json_values_survive_the_cookie_round_trip() {
        let mut prefs = CookiePreferences::default();
        prefs.set(CART_KEY, r#"[{"id":"p1","quantity":2}]"#);
        let header = prefs.set_cookie_headers().remove(0);
        let pair = header.split(';').next().unwrap();
        assert!(!pair.contains('"'));

        let restored = CookiePreferences::from_header(Some(pair));
        assert_eq!(restored.get(CART_KEY).as_deref(), Some(r#"[{"id":"p1","quantity":2}]"#));
    }
}
