use serde::{Deserialize, Serialize};

use crate::models::Product;
use crate::services::query_analyzer::QueryIntent;

// ===== REQUEST MODELS =====

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

// ===== RESPONSE MODELS =====

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub products: Vec<Product>,
    pub question: String,
    pub note: String,
    pub intent: IntentInfo,
}

/// Category and budget the interpreter read from the question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentInfo {
    pub category: Option<String>,
    pub max_price: Option<f64>,
}

impl From<&QueryIntent> for IntentInfo {
    fn from(intent: &QueryIntent) -> Self {
        Self {
            category: intent.category.map(str::to_string),
            max_price: intent.max_price,
        }
    }
}
