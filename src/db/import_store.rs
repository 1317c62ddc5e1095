// src/db/import_store.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ClientRepository, PdvRepository, ProductRepository, RouteRepository, TaskTemplateRepository, UserRepository},
    models::{
        client::{ClientKey, NewClient},
        pdv::NewPdvMaster,
        product::{NewProduct, UpsertOutcome},
        route::RouteAssignment,
        task_template::{SkuItemInput, TaskTemplate},
        user::{AgentKey, NewUser, UserRole},
    },
};

/// Tudo o que as importações em lote precisam do armazenamento.
/// As inserções são "insert if absent": `false` significa chave natural já existente.
#[async_trait]
pub trait ImportStore: Send + Sync {
    async fn client_keys(&self) -> Result<Vec<ClientKey>, AppError>;
    async fn agent_keys(&self) -> Result<Vec<AgentKey>, AppError>;

    async fn insert_client(&self, client: &NewClient) -> Result<bool, AppError>;
    async fn insert_pdv(&self, pdv: &NewPdvMaster) -> Result<(), AppError>;
    /// Usuários AGENT ganham o registro de agente no mesmo passo.
    async fn insert_user(&self, user: &NewUser) -> Result<bool, AppError>;
    async fn insert_route(&self, assignment: &RouteAssignment) -> Result<(), AppError>;

    async fn find_template(&self, id: Uuid) -> Result<Option<TaskTemplate>, AppError>;
    async fn upsert_product(&self, product: &NewProduct) -> Result<UpsertOutcome, AppError>;
    /// Troca os itens SKU da plantilla pelo catálogo ativo inteiro. Retorna quantos itens ficaram.
    async fn replace_template_catalog(&self, template_id: Uuid) -> Result<u32, AppError>;
}

#[derive(Clone)]
pub struct PgImportStore {
    pool: PgPool,
    clients: ClientRepository,
    pdvs: PdvRepository,
    users: UserRepository,
    routes: RouteRepository,
    products: ProductRepository,
    templates: TaskTemplateRepository,
}

impl PgImportStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            clients: ClientRepository::new(pool.clone()),
            pdvs: PdvRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            routes: RouteRepository::new(pool.clone()),
            products: ProductRepository::new(pool.clone()),
            templates: TaskTemplateRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl ImportStore for PgImportStore {
    async fn client_keys(&self) -> Result<Vec<ClientKey>, AppError> {
        self.clients.list_keys(&self.pool).await
    }

    async fn agent_keys(&self) -> Result<Vec<AgentKey>, AppError> {
        self.users.list_agent_keys(&self.pool).await
    }

    async fn insert_client(&self, client: &NewClient) -> Result<bool, AppError> {
        let created = self.clients.insert_if_absent(&self.pool, client).await?;
        Ok(created.is_some())
    }

    async fn insert_pdv(&self, pdv: &NewPdvMaster) -> Result<(), AppError> {
        self.pdvs.create(&self.pool, pdv).await?;
        Ok(())
    }

    async fn insert_user(&self, user: &NewUser) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let Some(created) = self.users.insert_if_absent(&mut *tx, user).await? else {
            return Ok(false);
        };
        if let (UserRole::Agent, Some(client_id)) = (created.role, created.client_id) {
            self.users
                .upsert_agent(&mut *tx, created.id, client_id, created.is_active)
                .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn insert_route(&self, assignment: &RouteAssignment) -> Result<(), AppError> {
        self.routes.create(&self.pool, assignment).await?;
        Ok(())
    }

    async fn find_template(&self, id: Uuid) -> Result<Option<TaskTemplate>, AppError> {
        self.templates.find_by_id(&self.pool, id).await
    }

    async fn upsert_product(&self, product: &NewProduct) -> Result<UpsertOutcome, AppError> {
        self.products.upsert_by_sku(&self.pool, product).await
    }

    async fn replace_template_catalog(&self, template_id: Uuid) -> Result<u32, AppError> {
        let mut tx = self.pool.begin().await?;

        let items: Vec<SkuItemInput> = self
            .products
            .list_active_ids(&mut *tx)
            .await?
            .into_iter()
            .map(|product_id| SkuItemInput { product_id, is_required: true })
            .collect();

        self.templates.delete_sku_items(&mut *tx, template_id).await?;
        self.templates.insert_sku_items(&mut *tx, template_id, &items).await?;

        tx.commit().await?;
        Ok(items.len() as u32)
    }
}
