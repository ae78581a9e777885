use serde_json::json;

use crate::models::Product;

/// Synthetic products served when the catalog file cannot be used.
pub fn fallback_products() -> Vec<Product> {
    [
        json!({
            "id": "FB001",
            "name": "Samsung Galaxy A55 5G",
            "category": "smartphone",
            "brand": "Samsung",
            "price": 5999000,
            "currency": "IDR",
            "description": "Smartphone kelas menengah dengan layar Super AMOLED 6.6 inci dan baterai 5000 mAh.",
            "specifications": {
                "rating": 4.7,
                "sold": 1200,
                "stock": 25,
                "condition": "Baru",
                "shop_name": "Samsung Official Store",
                "shop_location": "Jakarta"
            }
        }),
        json!({
            "id": "FB002",
            "name": "ASUS VivoBook 14",
            "category": "laptop",
            "brand": "ASUS",
            "price": 8499000,
            "currency": "IDR",
            "description": "Laptop ringan untuk kerja dan kuliah, Intel Core i5, RAM 8GB, SSD 512GB.",
            "specifications": {
                "rating": 4.6,
                "sold": 450,
                "stock": 10,
                "condition": "Baru",
                "shop_name": "ASUS Official Store",
                "shop_location": "Surabaya"
            }
        }),
    ]
    .iter()
    .map(Product::normalize)
    .collect()
}
