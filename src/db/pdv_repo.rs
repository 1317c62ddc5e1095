// src/db/pdv_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{conflict_on_unique, AppError},
    models::pdv::{ClientPdv, ClientPdvView, NewPdvMaster, PdvMaster, PdvMasterSummary},
};

#[derive(Clone)]
pub struct PdvRepository {
    pool: PgPool,
}

impl PdvRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  PDV MASTER
    // =========================================================================

    pub async fn count<'e, E>(&self, executor: E) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pdv_masters")
            .fetch_one(executor)
            .await?;
        Ok(total)
    }

    pub async fn list_page<'e, E>(
        &self,
        executor: E,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PdvMasterSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pdvs = sqlx::query_as::<_, PdvMasterSummary>(
            r#"
            SELECT
                p.id, p.name, p.address, p.city, p.region, p.phone, p.email,
                p.postal_code, p.latitude, p.longitude, p.is_active,
                (SELECT COUNT(*) FROM client_pdvs cp WHERE cp.pdv_master_id = p.id) AS clients_count
            FROM pdv_masters p
            ORDER BY p.name ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await?;
        Ok(pdvs)
    }

    pub async fn create<'e, E>(&self, executor: E, pdv: &NewPdvMaster) -> Result<PdvMaster, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let created = sqlx::query_as::<_, PdvMaster>(
            r#"
            INSERT INTO pdv_masters (
                name, address, city, region, phone, email,
                postal_code, latitude, longitude, is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&pdv.name)
        .bind(&pdv.address)
        .bind(&pdv.city)
        .bind(&pdv.region)
        .bind(pdv.phone.as_deref())
        .bind(pdv.email.as_deref())
        .bind(pdv.postal_code.as_deref())
        .bind(pdv.latitude)
        .bind(pdv.longitude)
        .bind(pdv.is_active)
        .fetch_one(executor)
        .await?;
        Ok(created)
    }

    // `is_active` do payload é ignorado aqui; use `set_active`.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        pdv: &NewPdvMaster,
    ) -> Result<Option<PdvMaster>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, PdvMaster>(
            r#"
            UPDATE pdv_masters
            SET name = $2, address = $3, city = $4, region = $5, phone = $6,
                email = $7, postal_code = $8, latitude = $9, longitude = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&pdv.name)
        .bind(&pdv.address)
        .bind(&pdv.city)
        .bind(&pdv.region)
        .bind(pdv.phone.as_deref())
        .bind(pdv.email.as_deref())
        .bind(pdv.postal_code.as_deref())
        .bind(pdv.latitude)
        .bind(pdv.longitude)
        .fetch_optional(executor)
        .await?;
        Ok(updated)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<PdvMaster>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pdv = sqlx::query_as::<_, PdvMaster>("SELECT * FROM pdv_masters WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(pdv)
    }

    pub async fn set_active<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        is_active: bool,
    ) -> Result<Option<PdvMaster>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pdv = sqlx::query_as::<_, PdvMaster>(
            "UPDATE pdv_masters SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(is_active)
        .fetch_optional(executor)
        .await?;
        Ok(pdv)
    }

    /// Quantos clientes usam o PDV. `None` = PDV não existe.
    /// `FOR UPDATE` trava a linha até o fim da transação do chamador.
    pub async fn usage_count_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<i64>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let usage: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT (SELECT COUNT(*) FROM client_pdvs cp WHERE cp.pdv_master_id = p.id)
            FROM pdv_masters p
            WHERE p.id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(usage)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM pdv_masters WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| {
                // A FK RESTRICT de client_pdvs cobre a corrida com uma atribuição concorrente
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::Conflict(
                            "No se puede eliminar el PDV porque está asignado a clientes".to_string(),
                        );
                    }
                }
                e.into()
            })?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    //  CLIENT PDV
    // =========================================================================

    pub async fn assign_to_client<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        pdv_master_id: Uuid,
        level: &str,
    ) -> Result<ClientPdv, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ClientPdv>(
            r#"
            INSERT INTO client_pdvs (client_id, pdv_master_id, level)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(client_id)
        .bind(pdv_master_id)
        .bind(level)
        .fetch_one(executor)
        .await
        .map_err(|e| conflict_on_unique(e, || "El PDV ya está asignado a este cliente".to_string()))
    }

    pub async fn list_client_pdvs<'e, E>(
        &self,
        executor: E,
        client_id: Option<Uuid>,
    ) -> Result<Vec<ClientPdvView>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pdvs = sqlx::query_as::<_, ClientPdvView>(
            r#"
            SELECT
                cp.id, cp.client_id, c.name AS client_name, cp.pdv_master_id,
                p.name, p.address, p.city, p.region, p.latitude, p.longitude,
                cp.level, cp.is_active
            FROM client_pdvs cp
            INNER JOIN clients c ON c.id = cp.client_id
            INNER JOIN pdv_masters p ON p.id = cp.pdv_master_id
            WHERE ($1::uuid IS NULL OR cp.client_id = $1)
            ORDER BY p.name ASC
            "#,
        )
        .bind(client_id)
        .fetch_all(executor)
        .await?;
        Ok(pdvs)
    }
}
