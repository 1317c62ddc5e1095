// src/services/import/memory.rs
//
// ImportStore em memória para os testes do motor de importação.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ImportStore,
    models::{
        client::{ClientKey, NewClient},
        pdv::NewPdvMaster,
        product::{NewProduct, UpsertOutcome},
        route::RouteAssignment,
        task_template::{TaskTemplate, TaskTemplateType},
        user::{AgentKey, NewUser, UserRole},
    },
};

#[derive(Default)]
struct State {
    clients: Vec<(Uuid, NewClient)>,
    pdvs: Vec<NewPdvMaster>,
    users: Vec<NewUser>,
    agents: Vec<AgentKey>,
    routes: Vec<RouteAssignment>,
    products: Vec<(NewProduct, bool)>,
    templates: HashMap<Uuid, TaskTemplate>,
    template_items: HashMap<Uuid, usize>,
    failing_code: Option<String>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    fn with<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        f(&mut self.state.lock().unwrap())
    }

    pub fn seed_client(&self, code: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.with(|s| {
            s.clients.push((
                id,
                NewClient {
                    name: code.to_string(),
                    code: code.to_string(),
                    description: None,
                    is_active: true,
                },
            ))
        });
        id
    }

    pub fn seed_agent(&self, email: &str, client_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        self.with(|s| s.agents.push(AgentKey { id, email: email.to_string(), client_id }));
        id
    }

    pub fn seed_product(&self, sku: &str, name: &str) {
        self.with(|s| {
            s.products.push((
                NewProduct {
                    sku: sku.to_string(),
                    name: name.to_string(),
                    category: "Bebidas".to_string(),
                    brand: "Marca".to_string(),
                    target_price: Decimal::ONE,
                },
                true,
            ))
        });
    }

    pub fn seed_template(&self, kind: TaskTemplateType) -> Uuid {
        let id = Uuid::new_v4();
        let template = TaskTemplate {
            id,
            name: "Auditoría".to_string(),
            description: None,
            kind,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.with(|s| s.templates.insert(id, template));
        id
    }

    /// Qualquer insert com este código de cliente falha como erro de banco.
    pub fn fail_on_code(&self, code: &str) {
        self.with(|s| s.failing_code = Some(code.to_string()));
    }

    pub fn client_codes(&self) -> Vec<String> {
        self.with(|s| s.clients.iter().map(|(_, c)| c.code.clone()).collect())
    }

    pub fn client_active(&self, code: &str) -> bool {
        self.with(|s| s.clients.iter().any(|(_, c)| c.code == code && c.is_active))
    }

    pub fn pdvs(&self) -> Vec<NewPdvMaster> {
        self.with(|s| s.pdvs.clone())
    }

    pub fn user(&self, email: &str) -> Option<NewUser> {
        self.with(|s| s.users.iter().find(|u| u.email == email).cloned())
    }

    pub fn agent_keys_snapshot(&self) -> Vec<AgentKey> {
        self.with(|s| s.agents.clone())
    }

    pub fn routes(&self) -> Vec<RouteAssignment> {
        self.with(|s| s.routes.clone())
    }

    pub fn template_item_count(&self, template_id: Uuid) -> usize {
        self.with(|s| s.template_items.get(&template_id).copied().unwrap_or(0))
    }
}

#[async_trait]
impl ImportStore for MemoryStore {
    async fn client_keys(&self) -> Result<Vec<ClientKey>, AppError> {
        Ok(self.with(|s| {
            s.clients
                .iter()
                .map(|(id, c)| ClientKey { id: *id, code: c.code.clone() })
                .collect()
        }))
    }

    async fn agent_keys(&self) -> Result<Vec<AgentKey>, AppError> {
        Ok(self.agent_keys_snapshot())
    }

    async fn insert_client(&self, client: &NewClient) -> Result<bool, AppError> {
        self.with(|s| {
            if s.failing_code.as_deref() == Some(client.code.as_str()) {
                return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
            }
            if s.clients.iter().any(|(_, c)| c.code == client.code) {
                return Ok(false);
            }
            s.clients.push((Uuid::new_v4(), client.clone()));
            Ok(true)
        })
    }

    async fn insert_pdv(&self, pdv: &NewPdvMaster) -> Result<(), AppError> {
        self.with(|s| s.pdvs.push(pdv.clone()));
        Ok(())
    }

    async fn insert_user(&self, user: &NewUser) -> Result<bool, AppError> {
        Ok(self.with(|s| {
            if s.users.iter().any(|u| u.email == user.email) {
                return false;
            }
            if let (UserRole::Agent, Some(client_id)) = (user.role, user.client_id) {
                s.agents.push(AgentKey {
                    id: Uuid::new_v4(),
                    email: user.email.clone(),
                    client_id,
                });
            }
            s.users.push(user.clone());
            true
        }))
    }

    async fn insert_route(&self, assignment: &RouteAssignment) -> Result<(), AppError> {
        self.with(|s| s.routes.push(assignment.clone()));
        Ok(())
    }

    async fn find_template(&self, id: Uuid) -> Result<Option<TaskTemplate>, AppError> {
        Ok(self.with(|s| s.templates.get(&id).cloned()))
    }

    async fn upsert_product(&self, product: &NewProduct) -> Result<UpsertOutcome, AppError> {
        Ok(self.with(|s| {
            match s.products.iter_mut().find(|(p, _)| p.sku == product.sku) {
                Some(existing) => {
                    *existing = (product.clone(), true);
                    UpsertOutcome::Updated
                }
                None => {
                    s.products.push((product.clone(), true));
                    UpsertOutcome::Created
                }
            }
        }))
    }

    async fn replace_template_catalog(&self, template_id: Uuid) -> Result<u32, AppError> {
        Ok(self.with(|s| {
            let active = s.products.iter().filter(|(_, active)| *active).count();
            s.template_items.insert(template_id, active);
            active as u32
        }))
    }
}
