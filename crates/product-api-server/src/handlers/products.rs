use crate::catalog::{within_price_range, CatalogService};
use crate::models::Product;
use crate::utils::error::ApiError;
use crate::utils::extract::{ApiPath, ApiQuery};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

const DEFAULT_SEARCH_LIMIT: usize = 10;
const MAX_LIMIT: usize = 50;
const DEFAULT_RANDOM_COUNT: usize = 3;

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BrandsResponse {
    pub brands: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub products: Vec<Product>,
    pub query: String,
    pub source: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductsParams {
    pub limit: Option<usize>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RandomParams {
    pub count: Option<usize>,
}

pub async fn list_categories_handler(
    State(catalog): State<Arc<CatalogService>>,
) -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: catalog.categories(),
    })
}

pub async fn list_brands_handler(State(catalog): State<Arc<CatalogService>>) -> Json<BrandsResponse> {
    Json(BrandsResponse {
        brands: catalog.brands(),
    })
}

pub async fn search_handler(
    State(catalog): State<Arc<CatalogService>>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = params.query.unwrap_or_default().trim().to_string();
    if query.is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".to_string()));
    }

    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).min(MAX_LIMIT);
    let mut products = catalog.search(&query);
    products.truncate(limit);

    info!("Search '{}' -> {} products", query, products.len());

    Ok(Json(SearchResponse {
        products,
        query,
        source: "local".to_string(),
    }))
}

/// GET /products - search menang atas category, category menang atas "semua"
pub async fn list_products_handler(
    State(catalog): State<Arc<CatalogService>>,
    ApiQuery(params): ApiQuery<ProductsParams>,
) -> Json<Vec<Product>> {
    let search = non_blank(params.search.as_deref());
    let category = non_blank(params.category.as_deref());

    let mut products = match (search, category) {
        (Some(query), _) => catalog.search(query),
        (None, Some(category)) => catalog.filter_by_category(category),
        (None, None) => catalog.get_all().to_vec(),
    };

    if params.min_price.is_some() || params.max_price.is_some() {
        products.retain(|p| within_price_range(p, params.min_price, params.max_price));
    }

    if let Some(limit) = params.limit {
        products.truncate(limit);
    }

    debug!("List products {:?} -> {}", params, products.len());

    Json(products)
}

pub async fn get_product_handler(
    State(catalog): State<Arc<CatalogService>>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<Product>, ApiError> {
    catalog
        .get_by_id(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Product {} not found", id)))
}

pub async fn random_products_handler(
    State(catalog): State<Arc<CatalogService>>,
    ApiQuery(params): ApiQuery<RandomParams>,
) -> Json<Vec<Product>> {
    let count = params.count.unwrap_or(DEFAULT_RANDOM_COUNT).min(MAX_LIMIT);
    Json(catalog.sample(count))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
