//! Product and category endpoints

use reqwest::Method;

use super::{admin_delete, admin_json, encode, get_json};
use crate::models::{Category, CategoryInput, Product, ProductInput};

pub async fn list_products(category_id: Option<&str>) -> Result<Vec<Product>, String> {
    match category_id {
        Some(id) => get_json(&format!("/products?category={}", encode(id))).await,
        None => get_json("/products").await,
    }
}

pub async fn get_product(id: &str) -> Result<Product, String> {
    get_json(&format!("/products/{}", encode(id))).await
}

pub async fn create_product(input: &ProductInput) -> Result<Product, String> {
    admin_json(Method::POST, "/products", input).await
}

pub async fn update_product(id: &str, input: &ProductInput) -> Result<Product, String> {
    admin_json(Method::PUT, &format!("/products/{}", encode(id)), input).await
}

pub async fn delete_product(id: &str) -> Result<(), String> {
    admin_delete(&format!("/products/{}", encode(id))).await
}

pub async fn list_categories() -> Result<Vec<Category>, String> {
    get_json("/categories").await
}

pub async fn create_category(input: &CategoryInput) -> Result<Category, String> {
    admin_json(Method::POST, "/categories", input).await
}

pub async fn update_category(id: &str, input: &CategoryInput) -> Result<Category, String> {
    admin_json(Method::PUT, &format!("/categories/{}", encode(id)), input).await
}

pub async fn delete_category(id: &str) -> Result<(), String> {
    admin_delete(&format!("/categories/{}", encode(id))).await
}
