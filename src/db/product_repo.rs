// src/db/product_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{conflict_on_unique, AppError},
    models::product::{NewProduct, Product, UpsertOutcome},
};

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_active<'e, E>(&self, executor: E) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE is_active = TRUE ORDER BY name ASC",
        )
        .fetch_all(executor)
        .await?;
        Ok(products)
    }

    pub async fn create<'e, E>(&self, executor: E, product: &NewProduct) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (sku, name, category, brand, target_price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.brand)
        .bind(product.target_price)
        .fetch_one(executor)
        .await
        .map_err(|e| conflict_on_unique(e, || format!("El SKU \"{}\" ya existe", product.sku)))
    }

    /// Cria ou atualiza pelo SKU, reativando o produto.
    /// `xmax = 0` só é verdadeiro na linha recém-inserida.
    pub async fn upsert_by_sku<'e, E>(
        &self,
        executor: E,
        product: &NewProduct,
    ) -> Result<UpsertOutcome, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let inserted: bool = sqlx::query_scalar(
            r#"
            INSERT INTO products (sku, name, category, brand, target_price)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (sku) DO UPDATE
                SET name = EXCLUDED.name,
                    category = EXCLUDED.category,
                    brand = EXCLUDED.brand,
                    target_price = EXCLUDED.target_price,
                    is_active = TRUE,
                    updated_at = NOW()
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.brand)
        .bind(product.target_price)
        .fetch_one(executor)
        .await?;

        Ok(if inserted { UpsertOutcome::Created } else { UpsertOutcome::Updated })
    }

    // IDs do catálogo ativo, na ordem de exibição
    pub async fn list_active_ids<'e, E>(&self, executor: E) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM products WHERE is_active = TRUE ORDER BY name ASC")
                .fetch_all(executor)
                .await?;
        Ok(ids)
    }
}
