// src/services/import/resolver.rs
//
// Índices de chaves naturais montados uma vez por importação, a partir de um
// snapshot completo da coleção de referência. Somente leitura durante o laço.

use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{
    client::{normalize_code, ClientKey},
    route::AgentRef,
    user::{normalize_email, AgentKey},
};

#[derive(Debug, Clone, Default)]
pub struct ClientCodeIndex {
    by_code: HashMap<String, Uuid>,
}

impl ClientCodeIndex {
    pub fn build(keys: impl IntoIterator<Item = ClientKey>) -> Self {
        let by_code = keys
            .into_iter()
            .map(|k| (normalize_code(&k.code), k.id))
            .collect();
        Self { by_code }
    }

    pub fn resolve(&self, code: &str) -> Option<Uuid> {
        self.by_code.get(&normalize_code(code)).copied()
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AgentEmailIndex {
    by_email: HashMap<String, AgentRef>,
}

impl AgentEmailIndex {
    pub fn build(keys: impl IntoIterator<Item = AgentKey>) -> Self {
        let by_email = keys
            .into_iter()
            .map(|k| {
                (
                    normalize_email(&k.email),
                    AgentRef { id: k.id, client_id: k.client_id },
                )
            })
            .collect();
        Self { by_email }
    }

    pub fn resolve(&self, email: &str) -> Option<AgentRef> {
        self.by_email.get(&normalize_email(email)).copied()
    }

    pub fn len(&self) -> usize {
        self.by_email.len()
    }
}
