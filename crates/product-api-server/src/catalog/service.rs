use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;
use tracing::debug;

use super::loader::{CatalogOrigin, LoadedCatalog};
use crate::models::Product;

pub const NO_MATCH_NOTE: &str =
    "Maaf, belum ada produk yang cocok dengan kriteria Anda. Coba ubah kategori atau budget.";

/// Result of the combined category + budget lookup used by `/ask`
#[derive(Debug, Clone, PartialEq)]
pub struct RelevantProducts {
    pub products: Vec<Product>,
    /// Always non-empty when `products` is empty
    pub note: String,
}

/// Read-only query engine over the catalog loaded at startup.
///
/// Every operation is a linear scan over an immutable list, so the service
/// can be shared across request handlers without locking.
#[derive(Debug)]
pub struct CatalogService {
    products: Vec<Product>,
    origin: CatalogOrigin,
    default_limit: usize,
}

impl CatalogService {
    pub fn new(catalog: LoadedCatalog, default_limit: usize) -> Self {
        Self {
            products: catalog.products,
            origin: catalog.origin,
            default_limit: default_limit.max(1),
        }
    }

    pub fn origin(&self) -> &CatalogOrigin {
        &self.origin
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Full catalog in load order
    pub fn get_all(&self) -> &[Product] {
        &self.products
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Case-insensitive substring match on name, description, category and brand
    pub fn search(&self, query: &str) -> Vec<Product> {
        let query = query.to_lowercase();

        self.products
            .iter()
            .filter(|p| {
                [&p.name, &p.description, &p.category, &p.brand]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&query))
            })
            .cloned()
            .collect()
    }

    pub fn filter_by_category(&self, category: &str) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| same_category(&p.category, category))
            .cloned()
            .collect()
    }

    /// Inclusive bounds; `min` defaults to 0 and `max` to unbounded
    pub fn filter_by_price_range(&self, min: Option<f64>, max: Option<f64>) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| within_price_range(p, min, max))
            .cloned()
            .collect()
    }

    /// `n` distinct products in random order (whole catalog if `n` is larger)
    pub fn sample(&self, n: usize) -> Vec<Product> {
        self.sample_with_rng(n, &mut rand::rng())
    }

    pub fn sample_with_rng<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<Product> {
        let mut picked = self.products.clone();
        picked.shuffle(rng);
        picked.truncate(n);
        picked
    }

    /// Category filter intersected with `[0, max_price]`.
    ///
    /// Without any intent the first `default_limit` products are returned.
    pub fn get_relevant(&self, category: Option<&str>, max_price: Option<f64>) -> RelevantProducts {
        let products: Vec<Product> = if category.is_none() && max_price.is_none() {
            self.products.iter().take(self.default_limit).cloned().collect()
        } else {
            self.products
                .iter()
                .filter(|p| category.map_or(true, |c| same_category(&p.category, c)))
                .filter(|p| max_price.map_or(true, |max| p.price >= 0.0 && p.price <= max))
                .cloned()
                .collect()
        };

        debug!(
            "Relevant products for category={:?}, max_price={:?}: {}",
            category,
            max_price,
            products.len()
        );

        let note = if products.is_empty() {
            NO_MATCH_NOTE.to_string()
        } else {
            format!("Ditemukan {} produk yang sesuai.", products.len())
        };

        RelevantProducts { products, note }
    }

    /// Distinct non-empty categories (lower-cased), sorted
    pub fn categories(&self) -> Vec<String> {
        distinct(self.products.iter().map(|p| fold(&p.category)))
    }

    /// Distinct non-empty brands, sorted
    pub fn brands(&self) -> Vec<String> {
        distinct(self.products.iter().map(|p| p.brand.trim().to_string()))
    }
}

/// Inclusive price check shared by the query engine and `/products` filters
pub fn within_price_range(product: &Product, min: Option<f64>, max: Option<f64>) -> bool {
    product.price >= min.unwrap_or(0.0) && product.price <= max.unwrap_or(f64::INFINITY)
}

/// Same folding as `search` and `categories`: trimmed, Unicode lower-case
fn fold(value: &str) -> String {
    value.trim().to_lowercase()
}

fn same_category(product_category: &str, wanted: &str) -> bool {
    fold(product_category) == fold(wanted)
}

fn distinct(values: impl Iterator<Item = String>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
