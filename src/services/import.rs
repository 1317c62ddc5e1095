// src/services/import.rs

pub mod clients;
pub mod engine;
pub mod fields;
pub mod pdvs;
pub mod products;
pub mod resolver;
pub mod routes;
pub mod sheet;
pub mod users;

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ImportStore,
    models::{
        import::{ImportResponse, ProductImportResponse},
        task_template::{TaskTemplate, TaskTemplateType},
    },
};
use engine::ImportLayout;
use resolver::{AgentEmailIndex, ClientCodeIndex};
use sheet::Sheet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportEntity {
    Clients,
    PdvMasters,
    Users,
    RouteAssignments,
    Products,
}

impl ImportEntity {
    pub fn layout(&self) -> &'static ImportLayout {
        match self {
            ImportEntity::Clients => &clients::LAYOUT,
            ImportEntity::PdvMasters => &pdvs::LAYOUT,
            ImportEntity::Users => &users::LAYOUT,
            ImportEntity::RouteAssignments => &routes::LAYOUT,
            ImportEntity::Products => &products::LAYOUT,
        }
    }
}

#[derive(Clone)]
pub struct ImportService {
    store: Arc<dyn ImportStore>,
    bcrypt_cost: u32,
}

impl ImportService {
    pub fn new(store: Arc<dyn ImportStore>, bcrypt_cost: u32) -> Self {
        Self { store, bcrypt_cost }
    }

    /// Planilha de exemplo para download: (nome do arquivo, bytes xlsx).
    pub fn template(&self, entity: ImportEntity) -> Result<(&'static str, Vec<u8>), AppError> {
        let layout = entity.layout();
        let bytes = sheet::build_template(layout.sheet_name, layout.headers, layout.examples)?;
        Ok((layout.file_name, bytes))
    }

    pub async fn import_workbook(
        &self,
        entity: ImportEntity,
        bytes: Vec<u8>,
    ) -> Result<ImportResponse, AppError> {
        let sheet = Sheet::read_workbook(bytes).await?;
        self.import_sheet(entity, &sheet).await
    }

    pub async fn import_sheet(
        &self,
        entity: ImportEntity,
        sheet: &Sheet,
    ) -> Result<ImportResponse, AppError> {
        let layout = entity.layout();
        if let Err(e) = sheet.require_headers(layout.headers) {
            tracing::warn!("Importação de {:?} rejeitada: {}", entity, e);
            return Err(e);
        }

        let store = self.store.as_ref();
        let results = match entity {
            ImportEntity::Clients => engine::run(&clients::ClientImporter, sheet, store).await,
            ImportEntity::PdvMasters => engine::run(&pdvs::PdvImporter, sheet, store).await,
            ImportEntity::Users => {
                let importer = users::UserImporter {
                    clients: ClientCodeIndex::build(store.client_keys().await?),
                    bcrypt_cost: self.bcrypt_cost,
                };
                tracing::debug!("Índice de clientes: {} códigos", importer.clients.len());
                engine::run(&importer, sheet, store).await
            }
            ImportEntity::RouteAssignments => {
                let importer = routes::RouteImporter {
                    clients: ClientCodeIndex::build(store.client_keys().await?),
                    agents: AgentEmailIndex::build(store.agent_keys().await?),
                };
                tracing::debug!(
                    "Índices: {} clientes, {} agentes",
                    importer.clients.len(),
                    importer.agents.len()
                );
                engine::run(&importer, sheet, store).await
            }
            // Produtos sempre entram por uma plantilla
            ImportEntity::Products => {
                return Err(AppError::BadRequest("ID de plantilla requerido".to_string()));
            }
        };

        tracing::info!(
            "Importação de {:?} concluída: {}/{} linhas, {} erros",
            entity,
            results.success,
            results.total,
            results.errors.len()
        );

        Ok(ImportResponse {
            message: format!(
                "Importación completada. {} de {} {} correctamente.",
                results.success, results.total, layout.noun
            ),
            results,
        })
    }

    // =========================================================================
    //  PRODUTOS (via plantilla PRICE_AUDIT_SKU)
    // =========================================================================

    async fn price_audit_template(&self, template_id: Uuid) -> Result<TaskTemplate, AppError> {
        let template = self
            .store
            .find_template(template_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Plantilla no encontrada".to_string()))?;

        if template.kind != TaskTemplateType::PriceAuditSku {
            return Err(AppError::BadRequest(
                "Solo se pueden importar productos en plantillas de tipo PRICE_AUDIT_SKU".to_string(),
            ));
        }
        Ok(template)
    }

    pub async fn import_products_workbook(
        &self,
        template_id: Uuid,
        bytes: Vec<u8>,
    ) -> Result<ProductImportResponse, AppError> {
        // A plantilla é conferida antes de abrir o arquivo
        self.price_audit_template(template_id).await?;
        let sheet = Sheet::read_workbook(bytes).await?;
        self.import_product_sheet(template_id, &sheet).await
    }

    pub async fn import_product_sheet(
        &self,
        template_id: Uuid,
        sheet: &Sheet,
    ) -> Result<ProductImportResponse, AppError> {
        let template = self.price_audit_template(template_id).await?;
        sheet.require_headers(products::LAYOUT.headers)?;

        let store = self.store.as_ref();
        let results = products::run(sheet, store).await;
        let products_added = store.replace_template_catalog(template.id).await?;

        tracing::info!(
            "Produtos importados na plantilla {}: {} criados, {} atualizados, {} erros, {} itens",
            template.id,
            results.created,
            results.updated,
            results.errors.len(),
            products_added
        );

        Ok(ProductImportResponse {
            message: "Importación completada".to_string(),
            results,
            products_added,
        })
    }
}

#[cfg(test)]
mod memory;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{import::ImportResults, user::UserRole};
    use memory::MemoryStore;
    use sheet::grid;

    const CLIENT_HEADERS: &[&str] = &["nombre", "codigo", "descripcion", "activo"];

    fn service(store: &Arc<MemoryStore>) -> ImportService {
        ImportService::new(store.clone(), 4 /* bcrypt MIN_COST (private const in bcrypt) */)
    }

    fn sheet(rows: &[&[&str]]) -> Sheet {
        Sheet::from_grid(grid(rows), 1).unwrap()
    }

    fn clients_sheet() -> Sheet {
        sheet(&[
            CLIENT_HEADERS,
            &["Coca-Cola Chile", "cc-cl", "Bebidas", "si"],
            &["", "PE-CL", "", "si"],
            &["Nestlé Chile", "NE-CL", "", "no"],
        ])
    }

    // ----- clientes -----

    #[tokio::test]
    async fn client_rows_fail_individually() {
        let store = Arc::new(MemoryStore::default());
        let response = service(&store)
            .import_sheet(ImportEntity::Clients, &clients_sheet())
            .await
            .unwrap();

        assert_eq!(
            response.results,
            ImportResults {
                success: 2,
                errors: vec!["Fila 3: El nombre es requerido".to_string()],
                total: 3,
            }
        );
        assert_eq!(
            response.message,
            "Importación completada. 2 de 3 clientes importados correctamente."
        );
        let codes = store.client_codes();
        assert_eq!(codes, vec!["CC-CL".to_string(), "NE-CL".to_string()]);
        assert!(store.client_active("CC-CL"));
        assert!(!store.client_active("NE-CL"));
    }

    #[tokio::test]
    async fn reimporting_the_same_clients_creates_nothing() {
        let store = Arc::new(MemoryStore::default());
        let service = service(&store);
        let rows = sheet(&[
            CLIENT_HEADERS,
            &["Coca-Cola Chile", "CC-CL", "", "si"],
            &["PepsiCo Chile", "PE-CL", "", "si"],
        ]);

        let first = service.import_sheet(ImportEntity::Clients, &rows).await.unwrap();
        assert_eq!(first.results.success, 2);

        let second = service.import_sheet(ImportEntity::Clients, &rows).await.unwrap();
        assert_eq!(second.results.success, 0);
        assert_eq!(second.results.total, 2);
        assert_eq!(
            second.results.errors,
            vec![
                "Fila 2: El código \"CC-CL\" ya existe".to_string(),
                "Fila 3: El código \"PE-CL\" ya existe".to_string(),
            ]
        );
        assert_eq!(store.client_codes().len(), 2);
    }

    #[tokio::test]
    async fn missing_headers_reject_the_whole_batch() {
        let store = Arc::new(MemoryStore::default());
        let err = service(&store)
            .import_sheet(
                ImportEntity::Clients,
                &sheet(&[&["nombre", "codigo"], &["Coca-Cola Chile", "CC-CL"]]),
            )
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Faltan los siguientes encabezados requeridos: descripcion, activo"
        );
        assert!(store.client_codes().is_empty());
    }

    #[tokio::test]
    async fn store_failure_is_reported_on_its_row_and_the_loop_continues() {
        let store = Arc::new(MemoryStore::default());
        store.fail_on_code("PE-CL");
        let response = service(&store)
            .import_sheet(
                ImportEntity::Clients,
                &sheet(&[
                    CLIENT_HEADERS,
                    &["PepsiCo Chile", "PE-CL", "", "si"],
                    &["Nestlé Chile", "NE-CL", "", "si"],
                ]),
            )
            .await
            .unwrap();

        assert_eq!(response.results.success, 1);
        assert_eq!(response.results.total, 2);
        assert!(response.results.errors[0].starts_with("Fila 2: Error al procesar - "));
    }

    // ----- PDVs -----

    #[tokio::test]
    async fn pdv_coordinates_are_range_checked() {
        let store = Arc::new(MemoryStore::default());
        let headers = pdvs::LAYOUT.headers;
        let response = service(&store)
            .import_sheet(
                ImportEntity::PdvMasters,
                &sheet(&[
                    headers,
                    &["A", "Dir 1", "Santiago", "RM", "", "", "-33.4", "-70.6", "", "si"],
                    &["B", "Dir 2", "Santiago", "RM", "", "", "91", "-70.6", "", "si"],
                    &["C", "Dir 3", "Santiago", "RM", "", "", "-33.4", "-180.5", "", "si"],
                    &["D", "Dir 4", "Santiago", "RM", "", "correo", "", "", "", "si"],
                    &["E", "Dir 5", "Santiago", "RM", "", "e@x.cl", "", "", "", "no"],
                    &["F", "", "Santiago", "RM", "", "", "", "", "", "si"],
                ]),
            )
            .await
            .unwrap();

        assert_eq!(response.results.success, 2);
        assert_eq!(
            response.results.errors,
            vec![
                "Fila 3: La latitud debe ser un número entre -90 y 90".to_string(),
                "Fila 4: La longitud debe ser un número entre -180 y 180".to_string(),
                "Fila 5: El email no es válido".to_string(),
                "Fila 7: La dirección es requerida".to_string(),
            ]
        );
        let pdvs = store.pdvs();
        assert_eq!((pdvs[1].latitude, pdvs[1].longitude), (0.0, 0.0));
        assert!(!pdvs[1].is_active);
    }

    // ----- usuários -----

    fn user_sheet(rows: &[&[&str]]) -> Sheet {
        let mut all: Vec<&[&str]> = vec![users::LAYOUT.headers];
        all.extend_from_slice(rows);
        sheet(&all)
    }

    #[tokio::test]
    async fn user_roles_and_clients_are_resolved() {
        let store = Arc::new(MemoryStore::default());
        let client_id = store.seed_client("CC-CL");

        let response = service(&store)
            .import_sheet(
                ImportEntity::Users,
                &user_sheet(&[
                    &["Juan", "Juan@Empresa.com", "agent", "cc-cl", "secreto", "si"],
                    &["Ana", "ana@empresa.com", "SUPER_ADMIN", "CC-CL", "secreto", "si"],
                    &["Pedro", "pedro@empresa.com", "MANAGER", "CC-CL", "secreto", "si"],
                    &["Luis", "luis@empresa.com", "ADMIN", "", "secreto", "si"],
                    &["Rosa", "rosa@empresa.com", "ADMIN", "XX-CL", "secreto", "si"],
                    &["Eva", "eva@empresa.com", "ADMIN", "CC-CL", "123", "si"],
                    &["Juan 2", "juan@empresa.com", "ADMIN", "CC-CL", "secreto", "si"],
                ]),
            )
            .await
            .unwrap();

        assert_eq!(response.results.success, 2);
        assert_eq!(response.results.total, 7);
        assert_eq!(
            response.results.errors,
            vec![
                "Fila 4: El rol \"MANAGER\" no es válido. Roles válidos: SUPER_ADMIN, ADMIN, STORE_KEEPER, AGENT".to_string(),
                "Fila 5: El código de cliente es requerido para el rol \"ADMIN\"".to_string(),
                "Fila 6: El cliente con código \"XX-CL\" no existe".to_string(),
                "Fila 7: La contraseña debe tener al menos 6 caracteres".to_string(),
                "Fila 8: El email \"juan@empresa.com\" ya existe".to_string(),
            ]
        );

        let juan = store.user("juan@empresa.com").unwrap();
        assert_eq!(juan.role, UserRole::Agent);
        assert_eq!(juan.client_id, Some(client_id));
        assert!(bcrypt::verify("secreto", &juan.password_hash).unwrap());

        let ana = store.user("ana@empresa.com").unwrap();
        assert_eq!(ana.client_id, None);

        // O usuário AGENT ganhou o registro de agente no mesmo cliente
        let agents = store.agent_keys_snapshot();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].client_id, client_id);
    }

    // ----- rotas -----

    #[tokio::test]
    async fn route_rows_require_agent_of_the_same_client() {
        let store = Arc::new(MemoryStore::default());
        let coca = store.seed_client("CC-CL");
        let pepsi = store.seed_client("PE-CL");
        store.seed_agent("juan.perez@empresa.com", coca);
        store.seed_agent("maria@empresa.com", pepsi);

        let mut rows: Vec<&[&str]> = vec![routes::LAYOUT.headers];
        rows.extend_from_slice(&[
            &["CC-CL", "Juan.Perez@empresa.com", "2024-01-15", ""],
            &["CC-CL", "maria@empresa.com", "2024-01-16", "10:30"],
            &["CC-CL", "nadie@empresa.com", "2024-01-16", ""],
            &["CC-CL", "juan.perez@empresa.com", "mañana", ""],
            &["XX-CL", "juan.perez@empresa.com", "2024-01-16", ""],
            &["PE-CL", "maria@empresa.com", "16/01/2024", "10:30"],
            &["", "maria@empresa.com", "16/01/2024", ""],
        ]);

        let response = service(&store)
            .import_sheet(ImportEntity::RouteAssignments, &sheet(&rows))
            .await
            .unwrap();

        assert_eq!(response.results.success, 2);
        assert_eq!(
            response.results.errors,
            vec![
                "Fila 3: El agente \"maria@empresa.com\" no pertenece al cliente \"CC-CL\"".to_string(),
                "Fila 4: El agente con email \"nadie@empresa.com\" no existe".to_string(),
                "Fila 5: La fecha \"mañana\" no es válida".to_string(),
                "Fila 6: El cliente con código \"XX-CL\" no existe".to_string(),
                "Fila 8: El código de cliente es requerido".to_string(),
            ]
        );
        assert_eq!(
            response.message,
            "Importación completada. 2 de 7 asignaciones importadas correctamente."
        );

        let routes = store.routes();
        assert_eq!(routes[0].client_id, coca);
        assert_eq!(routes[0].scheduled_time.format("%H:%M").to_string(), "09:00");
        assert_eq!(routes[1].client_id, pepsi);
        assert_eq!(routes[1].scheduled_time.format("%H:%M").to_string(), "10:30");
    }

    // ----- produtos -----

    fn product_sheet() -> Sheet {
        sheet(&[
            products::LAYOUT.headers,
            &["COCA500", "Coca-Cola 500ml", "Bebidas", "Coca-Cola", "1.50"],
            &["PEPSI500", "Pepsi 500ml", "Bebidas", "PepsiCo", "abc"],
            &["AGUA1L", "Agua 1L", "Bebidas", "Cachantún", "0.90"],
        ])
    }

    #[tokio::test]
    async fn product_import_upserts_and_refills_the_template() {
        let store = Arc::new(MemoryStore::default());
        store.seed_product("COCA500", "Coca-Cola vieja");
        let template = store.seed_template(TaskTemplateType::PriceAuditSku);

        let response = service(&store)
            .import_product_sheet(template, &product_sheet())
            .await
            .unwrap();

        assert_eq!(response.results.created, 1);
        assert_eq!(response.results.updated, 1);
        assert_eq!(
            response.results.errors,
            vec!["Fila 3: Datos incompletos o inválidos".to_string()]
        );
        assert_eq!(response.products_added, 2);
        assert_eq!(store.template_item_count(template), 2);
    }

    #[tokio::test]
    async fn product_import_needs_a_price_audit_template() {
        let store = Arc::new(MemoryStore::default());
        let checklist = store.seed_template(TaskTemplateType::ExhibitionChecklist);
        let service = service(&store);

        let err = service
            .import_product_sheet(checklist, &product_sheet())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = service
            .import_product_sheet(Uuid::new_v4(), &product_sheet())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Plantilla no encontrada");
    }

    // ----- plantillas -----

    #[test]
    fn every_download_template_passes_its_own_header_check() {
        let store = Arc::new(MemoryStore::default());
        let service = service(&store);
        for entity in [
            ImportEntity::Clients,
            ImportEntity::PdvMasters,
            ImportEntity::Users,
            ImportEntity::RouteAssignments,
            ImportEntity::Products,
        ] {
            let (file_name, bytes) = service.template(entity).unwrap();
            assert!(file_name.starts_with("plantilla_"));
            let sheet = Sheet::from_workbook(&bytes).unwrap();
            sheet.require_headers(entity.layout().headers).unwrap();
            assert_eq!(sheet.rows().count(), entity.layout().examples.len());
        }
    }
}
