use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

pub const DEFAULT_CURRENCY: &str = "IDR";
pub const DEFAULT_CONDITION: &str = "Baru";

/// Key spesifikasi yang punya field sendiri di `Specifications`
const KNOWN_SPEC_KEYS: [&str; 6] = [
    "rating",
    "sold",
    "stock",
    "condition",
    "shop_name",
    "shop_location",
];

/// Canonical product record. Every field is always present after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    pub brand: String,
    pub price: f64,
    pub currency: String,
    pub description: String,
    pub specifications: Specifications,
    pub images: Vec<String>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specifications {
    pub rating: f64,
    pub sold: u64,
    pub stock: u64,
    pub condition: String,
    pub shop_name: String,
    pub shop_location: String,
    /// Unknown keys from the source record, kept verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for Specifications {
    fn default() -> Self {
        Self {
            rating: 0.0,
            sold: 0,
            stock: 0,
            condition: DEFAULT_CONDITION.to_string(),
            shop_name: String::new(),
            shop_location: String::new(),
            extra: BTreeMap::new(),
        }
    }
}

impl Product {
    /// Map a loosely typed JSON record into the canonical schema.
    ///
    /// Missing or mistyped fields fall back to their defaults, so this never fails.
    pub fn normalize(raw: &Value) -> Self {
        let empty = Map::new();
        let obj = match raw.as_object() {
            Some(obj) => obj,
            None => {
                warn!("Product record is not a JSON object, using defaults: {}", raw);
                &empty
            }
        };

        let id = string_field(obj, &["id", "product_id"]);
        if id.is_empty() {
            warn!(
                "Product record without id (name: '{}')",
                string_field(obj, &["name", "nama"])
            );
        }

        let raw_price = field(obj, &["price", "harga"]);
        let price = match raw_price.map(parse_number) {
            Some(Some(price)) if price >= 0.0 => price,
            Some(Some(price)) => {
                warn!("Negative price {} for product '{}', using 0", price, id);
                0.0
            }
            Some(None) => {
                warn!("Unparseable price {:?} for product '{}', using 0", raw_price, id);
                0.0
            }
            None => 0.0,
        };

        let currency = match string_field(obj, &["currency"]) {
            c if c.is_empty() => DEFAULT_CURRENCY.to_string(),
            c => c,
        };

        Self {
            name: string_field(obj, &["name", "nama"]),
            category: string_field(obj, &["category"]),
            brand: string_field(obj, &["brand"]),
            price,
            currency,
            description: string_field(obj, &["description"]),
            specifications: Specifications::normalize(obj.get("specifications")),
            images: images_field(obj.get("images")),
            url: string_field(obj, &["url"]),
            id,
        }
    }
}

impl Specifications {
    fn normalize(raw: Option<&Value>) -> Self {
        let Some(obj) = raw.and_then(Value::as_object) else {
            return Self::default();
        };

        let condition = match string_field(obj, &["condition"]) {
            c if c.is_empty() => DEFAULT_CONDITION.to_string(),
            c => c,
        };

        let extra = obj
            .iter()
            .filter(|(key, _)| !KNOWN_SPEC_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Self {
            rating: obj
                .get("rating")
                .and_then(parse_number)
                .filter(|r| *r >= 0.0)
                .unwrap_or(0.0),
            sold: count_field(obj, "sold"),
            stock: count_field(obj, "stock"),
            condition,
            shop_name: string_field(obj, &["shop_name"]),
            shop_location: string_field(obj, &["shop_location"]),
            extra,
        }
    }
}

fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| obj.get(*key)).filter(|v| !v.is_null())
}

fn string_field(obj: &Map<String, Value>, keys: &[&str]) -> String {
    match field(obj, keys) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn count_field(obj: &Map<String, Value>, key: &str) -> u64 {
    obj.get(key)
        .and_then(parse_number)
        .filter(|n| *n >= 0.0)
        .map(|n| n.floor() as u64)
        .unwrap_or(0)
}

fn images_field(raw: Option<&Value>) -> Vec<String> {
    match raw {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

/// Numbers may arrive as JSON numbers or as text like "21999000" / "Rp 21.999.000".
///
/// Non-finite values ("inf", "NaN", "1e999") are rejected.
fn parse_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            match trimmed.parse::<f64>() {
                Ok(n) => Some(n),
                Err(_) => {
                    // Format rupiah: titik sebagai pemisah ribuan
                    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
                    if digits.is_empty() {
                        None
                    } else {
                        digits.parse::<f64>().ok()
                    }
                }
            }
        }
        _ => None,
    };

    parsed.filter(|n| n.is_finite())
}
