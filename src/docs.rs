// src/docs.rs

use utoipa::OpenApi;
use crate::common;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Sistema ---
        handlers::health::health,

        // --- Clientes ---
        handlers::clients::list_clients,
        handlers::clients::create_client,
        handlers::clients::update_client,
        handlers::clients::toggle_client,

        // --- PDVs ---
        handlers::pdv_masters::list_pdv_masters,
        handlers::pdv_masters::create_pdv_master,
        handlers::pdv_masters::update_pdv_master,
        handlers::pdv_masters::toggle_pdv_master,
        handlers::pdv_masters::delete_pdv_master,
        handlers::client_pdvs::list_client_pdvs,
        handlers::client_pdvs::assign_pdv,

        // --- Usuários e agentes ---
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::toggle_user,
        handlers::agents::list_agents,

        // --- Produtos ---
        handlers::products::list_products,
        handlers::products::create_product,

        // --- Plantillas ---
        handlers::task_templates::list_templates,
        handlers::task_templates::create_template,
        handlers::task_templates::get_template,
        handlers::task_templates::update_template,
        handlers::task_templates::toggle_template,
        handlers::task_templates::delete_template,

        // --- Planejamento ---
        handlers::route_assignments::list_assignments,
        handlers::route_assignments::create_assignment,
        handlers::route_assignments::update_assignment,
        handlers::route_assignments::delete_assignment,

        // --- Importações ---
        handlers::imports::import_clients,
        handlers::imports::clients_template,
        handlers::imports::import_pdv_masters,
        handlers::imports::pdv_masters_template,
        handlers::imports::import_users,
        handlers::imports::users_template,
        handlers::imports::import_route_assignments,
        handlers::imports::route_assignments_template,
        handlers::imports::import_products,
        handlers::imports::products_template,

        // --- IA ---
        handlers::ai::process_receipt,
        handlers::ai::analyze_prices,
    ),
    components(
        schemas(
            // --- COMUM ---
            common::pagination::Pagination,
            handlers::ToggleActivePayload,

            // --- CLIENTES ---
            models::client::Client,
            models::client::ClientSummary,
            handlers::clients::ClientPayload,

            // --- PDVs ---
            models::pdv::PdvMaster,
            models::pdv::PdvMasterSummary,
            models::pdv::ClientPdv,
            models::pdv::ClientPdvView,
            handlers::pdv_masters::PdvMasterPayload,
            handlers::client_pdvs::AssignPdvPayload,

            // --- USUÁRIOS ---
            models::user::UserRole,
            models::user::UserView,
            models::user::AgentView,
            handlers::users::CreateUserPayload,
            handlers::users::UpdateUserPayload,

            // --- PRODUTOS ---
            models::product::Product,
            handlers::products::CreateProductPayload,

            // --- PLANTILLAS ---
            models::task_template::TaskTemplateType,
            models::task_template::TaskTemplate,
            models::task_template::TaskTemplateSummary,
            models::task_template::TaskTemplateDetail,
            models::task_template::TemplateItemsView,
            models::task_template::SkuItemView,
            models::task_template::ChecklistItemView,
            models::task_template::SkuItemInput,
            models::task_template::ChecklistItemInput,
            handlers::task_templates::CreateTemplatePayload,
            handlers::task_templates::UpdateTemplatePayload,

            // --- PLANEJAMENTO ---
            models::route::RouteStatus,
            models::route::Route,
            models::route::RouteAssignmentView,
            handlers::route_assignments::AssignmentPayload,

            // --- IMPORTAÇÕES ---
            models::import::ImportResults,
            models::import::ImportResponse,
            models::import::ProductImportResults,
            models::import::ProductImportResponse,

            // --- IA ---
            models::ai::ImageAnalysisPayload,
            models::ai::ReceiptItem,
            models::ai::ReceiptData,
            models::ai::PriceData,
            models::ai::ReceiptResponse,
            models::ai::PricesResponse,
        )
    ),
    tags(
        (name = "Sistema", description = "Saúde do serviço"),
        (name = "Clientes", description = "Clientes (raiz de tenancy)"),
        (name = "PDVs", description = "Catálogo global de pontos de venda e atribuições"),
        (name = "Usuarios", description = "Usuários e agentes de campo"),
        (name = "Productos", description = "Catálogo de produtos"),
        (name = "Plantillas", description = "Plantillas de tarefas e seus itens"),
        (name = "Planificación", description = "Visitas planejadas (rotas)"),
        (name = "Importaciones", description = "Cargas em lote via Excel e planilhas modelo"),
        (name = "IA", description = "Análise de imagens com modelo de visão")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_import_path_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/clients/import",
            "/api/pdv-masters/import",
            "/api/users/import",
            "/api/route-assignments/import",
            "/api/task-templates/import-products",
        ] {
            let item = doc.paths.paths.get(path).unwrap();
            assert!(item.get.is_some(), "{path} sem GET");
            assert!(item.post.is_some(), "{path} sem POST");
        }
    }
}
