//! Query Intent Analyzer
//! Reads a product category and a maximum budget out of a free-text question
//! using a fixed keyword table and a price pattern.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

/// Harga di atas ini dianggap bukan budget (nomor telepon, ID pesanan, dll)
pub const MAX_PRICE_CEILING: f64 = 1_000_000_000.0;

/// Category keyword table. Declaration order is the match priority.
///
/// "headphone" sits before "smartphone" because "headphone" contains "phone".
pub const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "headphone",
        &["headphone", "earphone", "headset", "earbuds", "tws"],
    ),
    ("smartwatch", &["smartwatch", "jam tangan", "watch"]),
    ("tablet", &["tablet", "ipad"]),
    ("laptop", &["laptop", "notebook", "macbook"]),
    (
        "smartphone",
        &["smartphone", "hp", "handphone", "phone", "telepon", "ponsel"],
    ),
    ("kamera", &["kamera", "camera", "mirrorless", "dslr"]),
];

static PRICE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*(juta|jt|ribu|rb|k\b)?").expect("price pattern is valid")
});

#[derive(Debug, Clone, PartialEq)]
pub struct QueryIntent {
    pub category: Option<&'static str>,
    pub max_price: Option<f64>,
}

pub struct QueryAnalyzer;

impl QueryAnalyzer {
    /// Extract category and maximum price from a question
    pub fn extract_intent(question: &str) -> QueryIntent {
        let question_lower = question.to_lowercase();

        let intent = QueryIntent {
            category: Self::extract_category(&question_lower),
            max_price: Self::extract_max_price(&question_lower),
        };

        debug!(
            "Extracted intent: category={:?}, max_price={:?}",
            intent.category, intent.max_price
        );
        intent
    }

    /// First category (in table order) with any keyword contained in the text
    pub fn extract_category(text: &str) -> Option<&'static str> {
        let text = text.to_lowercase();

        for (category, keywords) in CATEGORY_KEYWORDS {
            if let Some(keyword) = keywords.iter().find(|k| text.contains(*k)) {
                debug!("Detected category '{}': matched '{}'", category, keyword);
                return Some(*category);
            }
        }

        None
    }

    /// First number in the text, scaled by its k/ribu/jt/juta suffix
    pub fn extract_max_price(text: &str) -> Option<f64> {
        let text = text.to_lowercase();
        let captures = PRICE_PATTERN.captures(&text)?;

        let raw = captures.get(1)?.as_str();
        let value: f64 = match raw.parse() {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to parse price '{}': {}", raw, e);
                return None;
            }
        };

        let multiplier = match captures.get(2).map(|m| m.as_str()) {
            Some("k") | Some("ribu") | Some("rb") => 1_000.0,
            Some("jt") | Some("juta") => 1_000_000.0,
            _ => 1.0,
        };

        let price = value * multiplier;
        if !price.is_finite() || price < 0.0 || price > MAX_PRICE_CEILING {
            warn!(
                "Ignoring extracted price {} from '{}': outside 0..={}",
                price,
                captures.get(0).map(|m| m.as_str()).unwrap_or(raw),
                MAX_PRICE_CEILING
            );
            return None;
        }

        Some(price)
    }
}
