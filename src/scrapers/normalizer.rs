use crate::models::{NormalizedItem, SearchSpec};
use chrono::{DateTime, Local};
use serde_json::{Map, Value};

pub const NO_TITLE: &str = "Senza titolo";
pub const NOT_AVAILABLE: &str = "N/A";

// Ordered fallback tables: the first populated key wins.
const TITLE_KEYS: &[&str] = &["title", "description"];
const PRICE_KEYS: &[&str] = &["price", "price_amount"];
const PRICE_OBJECT_KEYS: &[&str] = &["amount", "value", "raw"];
const SIZE_KEYS: &[&str] = &["size_title", "sizes"];
const CONDITION_KEYS: &[&str] = &["condition_title", "condition"];
const ID_KEYS: &[&str] = &["id", "item_id"];
const LINK_KEYS: &[&str] = &["url", "permalink"];
const PHOTO_LIST_KEYS: &[&str] = &["photos", "photos_urls"];
const PHOTO_LIST_ENTRY_KEYS: &[&str] = &["url_fullxfull", "url_full", "url", "xlarge", "thumb"];
const MAIN_PHOTO_KEYS: &[&str] = &["main_photo", "photo", "photos_urls"];
const MAIN_PHOTO_ENTRY_KEYS: &[&str] = &["url_fullxfull", "url_full", "url", "xlarge"];

/// Turns raw catalog records into [`NormalizedItem`]s
#[derive(Debug, Clone)]
pub struct Normalizer {
    item_base: String,
}

impl Normalizer {
    /// `marketplace` is the origin used to build `/items/{id}` links
    pub fn new(marketplace: &str) -> Self {
        Self {
            item_base: format!("{}/items/", marketplace.trim_end_matches('/')),
        }
    }

    pub fn normalize(&self, raw: &Map<String, Value>, spec: &SearchSpec) -> NormalizedItem {
        self.normalize_at(raw, spec, Local::now())
    }

    pub fn normalize_at(
        &self,
        raw: &Map<String, Value>,
        spec: &SearchSpec,
        found_at: DateTime<Local>,
    ) -> NormalizedItem {
        let id = first_populated(raw, ID_KEYS).map(value_text).unwrap_or_default();
        let link = if id.is_empty() {
            first_populated(raw, LINK_KEYS)
                .map(value_text)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        } else {
            format!("{}{}", self.item_base, id)
        };

        NormalizedItem {
            title: text_field(raw, TITLE_KEYS, NO_TITLE),
            price_text: extract_price(raw),
            sizes: text_field(raw, SIZE_KEYS, NOT_AVAILABLE),
            condition: text_field(raw, CONDITION_KEYS, NOT_AVAILABLE),
            photo_url: extract_photo_url(raw),
            brand: spec.brand.clone(),
            category: spec.category.clone(),
            id,
            link,
            found_at,
        }
    }
}

/// Whether a value counts as present: not null, false, zero or empty
pub fn is_populated(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// First populated value among `keys`, in table order
pub fn first_populated<'a>(raw: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| raw.get(*key))
        .find(|value| is_populated(value))
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

fn text_field(raw: &Map<String, Value>, keys: &[&str], fallback: &str) -> String {
    first_populated(raw, keys)
        .map(value_text)
        .unwrap_or_else(|| fallback.to_string())
}

/// Price as display text.
///
/// Numbers and numeric strings get exactly two decimals; anything else keeps
/// its raw text; a missing price becomes `N/A`.
pub fn extract_price(raw: &Map<String, Value>) -> String {
    let mut price = first_populated(raw, PRICE_KEYS);
    if let Some(Value::Object(inner)) = price {
        price = first_populated(inner, PRICE_OBJECT_KEYS);
    }
    let Some(price) = price else {
        return NOT_AVAILABLE.to_string();
    };

    let numeric = match price {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match numeric {
        Some(amount) if amount.is_finite() => format!("{:.2}", amount),
        _ => value_text(price),
    }
}

/// Best photo URL for a listing, if any.
///
/// Photo lists win over single photo fields. Within a list, the first entry
/// carrying any of the known size keys decides, in strict key order.
pub fn extract_photo_url(raw: &Map<String, Value>) -> Option<String> {
    if let Some(Value::Array(photos)) = first_populated(raw, PHOTO_LIST_KEYS) {
        for photo in photos {
            match photo {
                Value::Object(entry) => {
                    if let Some(url) = first_populated(entry, PHOTO_LIST_ENTRY_KEYS) {
                        return Some(value_text(url));
                    }
                }
                Value::String(url) => return Some(url.clone()),
                _ => {}
            }
        }
    }

    match first_populated(raw, MAIN_PHOTO_KEYS) {
        Some(Value::Object(entry)) => first_populated(entry, MAIN_PHOTO_ENTRY_KEYS).map(value_text),
        Some(Value::String(url)) => Some(url.clone()),
        _ => None,
    }
}
