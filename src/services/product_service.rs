// src/services/product_service.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    db::ProductRepository,
    models::product::{NewProduct, Product},
};

#[derive(Clone)]
pub struct ProductService {
    repo: ProductRepository,
}

impl ProductService {
    pub fn new(repo: ProductRepository) -> Self {
        Self { repo }
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_active(executor).await
    }

    pub async fn create<'e, E>(&self, executor: E, product: NewProduct) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = NewProduct {
            sku: product.sku.trim().to_string(),
            name: product.name.trim().to_string(),
            category: product.category.trim().to_string(),
            brand: product.brand.trim().to_string(),
            target_price: product.target_price,
        };

        let fields = [&product.sku, &product.name, &product.category, &product.brand];
        if fields.iter().any(|f| f.is_empty()) {
            return Err(AppError::BadRequest("Todos los campos son requeridos".to_string()));
        }
        if product.target_price <= Decimal::ZERO {
            return Err(AppError::BadRequest(
                "El precio objetivo debe ser mayor a 0".to_string(),
            ));
        }

        self.repo.create(executor, &product).await
    }
}
