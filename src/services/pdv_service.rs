// src/services/pdv_service.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{PageParams, Paginated},
    },
    db::{ClientRepository, PdvRepository},
    models::pdv::{
        latitude_in_range, longitude_in_range, ClientPdv, ClientPdvView, NewPdvMaster, PdvMaster,
        PdvMasterSummary,
    },
};

pub const DEFAULT_PDV_LEVEL: &str = "A";

/// Campos obrigatórios, e-mail e faixa das coordenadas de um PDV.
pub fn validate_pdv(pdv: &NewPdvMaster) -> Result<(), AppError> {
    let required = [&pdv.name, &pdv.address, &pdv.city, &pdv.region];
    if required.iter().any(|f| f.trim().is_empty()) {
        return Err(AppError::BadRequest(
            "Nombre, dirección, ciudad y región son requeridos".to_string(),
        ));
    }
    if pdv.email.as_deref().is_some_and(|e| !e.contains('@')) {
        return Err(AppError::BadRequest("El email no es válido".to_string()));
    }
    if !latitude_in_range(pdv.latitude) {
        return Err(AppError::BadRequest(
            "La latitud debe ser un número entre -90 y 90".to_string(),
        ));
    }
    if !longitude_in_range(pdv.longitude) {
        return Err(AppError::BadRequest(
            "La longitud debe ser un número entre -180 y 180".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct PdvService {
    repo: PdvRepository,
    clients: ClientRepository,
}

impl PdvService {
    pub fn new(repo: PdvRepository, clients: ClientRepository) -> Self {
        Self { repo, clients }
    }

    pub async fn list(
        &self,
        pool: &PgPool,
        params: &PageParams,
    ) -> Result<Paginated<PdvMasterSummary>, AppError> {
        let total = self.repo.count(pool).await?;
        let data = self
            .repo
            .list_page(pool, params.limit(), params.offset())
            .await?;
        Ok(Paginated::new(data, params, total))
    }

    pub async fn create<'e, E>(&self, executor: E, pdv: &NewPdvMaster) -> Result<PdvMaster, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        validate_pdv(pdv)?;
        self.repo.create(executor, pdv).await
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        pdv: &NewPdvMaster,
    ) -> Result<PdvMaster, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        validate_pdv(pdv)?;
        self.repo
            .update(executor, id, pdv)
            .await?
            .ok_or_else(|| AppError::not_found("PDV"))
    }

    pub async fn set_active<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        is_active: bool,
    ) -> Result<PdvMaster, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .set_active(executor, id, is_active)
            .await?
            .ok_or_else(|| AppError::not_found("PDV"))
    }

    /// Só apaga PDVs que nenhum cliente usa. A linha fica travada entre a contagem e o DELETE.
    pub async fn delete(&self, pool: &PgPool, id: Uuid) -> Result<(), AppError> {
        let mut tx = pool.begin().await?;

        let usage = self
            .repo
            .usage_count_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("PDV"))?;

        if usage > 0 {
            return Err(AppError::Conflict(format!(
                "No se puede eliminar el PDV porque está asignado a {} cliente(s)",
                usage
            )));
        }

        self.repo.delete(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!("PDV {} eliminado", id);
        Ok(())
    }

    // =========================================================================
    //  CLIENT PDV
    // =========================================================================

    pub async fn list_client_pdvs<'e, E>(
        &self,
        executor: E,
        client_id: Option<Uuid>,
    ) -> Result<Vec<ClientPdvView>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_client_pdvs(executor, client_id).await
    }

    pub async fn assign_to_client(
        &self,
        pool: &PgPool,
        client_id: Uuid,
        pdv_master_id: Uuid,
        level: Option<&str>,
    ) -> Result<ClientPdv, AppError> {
        self.clients
            .find_by_id(pool, client_id)
            .await?
            .ok_or_else(|| AppError::not_found("Cliente"))?;
        self.repo
            .find_by_id(pool, pdv_master_id)
            .await?
            .ok_or_else(|| AppError::not_found("PDV"))?;

        let level = level
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_uppercase)
            .unwrap_or_else(|| DEFAULT_PDV_LEVEL.to_string());

        self.repo
            .assign_to_client(pool, client_id, pdv_master_id, &level)
            .await
    }
}
