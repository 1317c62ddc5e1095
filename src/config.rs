// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        ClientRepository, PdvRepository, PgImportStore, ProductRepository, RouteRepository,
        TaskTemplateRepository, UserRepository,
    },
    services::{
        vision_service, ClientService, ImportService, PdvService, ProductService, RouteService,
        TaskTemplateService, UserService, VisionService,
    },
};

// Configuração lida do ambiente (.env incluso)
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_addr: String,
    pub bcrypt_cost: u32,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} inválido: {}", key, raw)),
        _ => Ok(default),
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?,
            max_connections: env_parsed("DB_MAX_CONNECTIONS", 5)?,
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:3000"),
            bcrypt_cost: env_parsed("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            openai_base_url: env_or("OPENAI_BASE_URL", vision_service::DEFAULT_BASE_URL),
            openai_model: env_or("OPENAI_MODEL", vision_service::DEFAULT_MODEL),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub bind_addr: String,
    pub client_service: ClientService,
    pub pdv_service: PdvService,
    pub user_service: UserService,
    pub product_service: ProductService,
    pub task_template_service: TaskTemplateService,
    pub route_service: RouteService,
    pub import_service: ImportService,
    /// `None` quando OPENAI_API_KEY não está definida; os endpoints de IA respondem 503.
    pub vision_service: Option<VisionService>,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let settings = Settings::from_env()?;

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let vision_service = match &settings.openai_api_key {
            Some(key) => Some(VisionService::new(
                key.clone(),
                settings.openai_base_url.clone(),
                settings.openai_model.clone(),
            )?),
            None => {
                tracing::warn!("OPENAI_API_KEY ausente: análise de imagens desativada");
                None
            }
        };

        Ok(Self::build(db_pool, &settings, vision_service))
    }

    /// Monta o gráfico de dependências sobre um pool já criado.
    pub fn build(db_pool: PgPool, settings: &Settings, vision_service: Option<VisionService>) -> Self {
        let clients = ClientRepository::new(db_pool.clone());
        let pdvs = PdvRepository::new(db_pool.clone());
        let users = UserRepository::new(db_pool.clone());
        let products = ProductRepository::new(db_pool.clone());
        let templates = TaskTemplateRepository::new(db_pool.clone());
        let routes = RouteRepository::new(db_pool.clone());

        let import_store = Arc::new(PgImportStore::new(db_pool.clone()));

        Self {
            bind_addr: settings.bind_addr.clone(),
            client_service: ClientService::new(clients.clone()),
            pdv_service: PdvService::new(pdvs, clients.clone()),
            user_service: UserService::new(users.clone(), clients.clone(), settings.bcrypt_cost),
            product_service: ProductService::new(products),
            task_template_service: TaskTemplateService::new(templates),
            route_service: RouteService::new(routes, clients, users),
            import_service: ImportService::new(import_store, settings.bcrypt_cost),
            vision_service,
            db_pool,
        }
    }
}
