// src/handlers/imports.rs

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::import::{ImportResponse, ProductImportResponse},
    services::import::{
        sheet::{ensure_excel_file_name, XLSX_CONTENT_TYPE},
        ImportEntity,
    },
};

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

// Campos do formulário de upload
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<(String, Vec<u8>)>,
    template_id: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidFile(format!("Formulario inválido: {}", e)))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidFile(format!("No se pudo leer el archivo: {}", e)))?;
                form.file = Some((file_name, bytes.to_vec()));
            }
            Some("templateId") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("templateId inválido: {}", e)))?;
                form.template_id = Some(text);
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Arquivo obrigatório, não vazio e com extensão de Excel.
fn take_excel(form: &mut UploadForm) -> Result<Vec<u8>, AppError> {
    let (file_name, bytes) = form
        .file
        .take()
        .filter(|(_, bytes)| !bytes.is_empty())
        .ok_or_else(|| AppError::BadRequest("No se proporcionó archivo".to_string()))?;
    ensure_excel_file_name(&file_name)?;
    Ok(bytes)
}

async fn import_entity(
    app_state: AppState,
    entity: ImportEntity,
    multipart: Multipart,
) -> Result<Json<ImportResponse>, AppError> {
    let mut form = read_form(multipart).await?;
    let bytes = match take_excel(&mut form) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Upload de {:?} rejeitado: {}", entity, e);
            return Err(e);
        }
    };
    let response = app_state.import_service.import_workbook(entity, bytes).await?;
    Ok(Json(response))
}

fn download_template(
    app_state: &AppState,
    entity: ImportEntity,
) -> Result<Response, AppError> {
    let (file_name, bytes) = app_state.import_service.template(entity)?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response())
}

// =============================================================================
//  CLIENTES
// =============================================================================

// POST /api/clients/import
#[utoipa::path(
    post,
    path = "/api/clients/import",
    tag = "Importaciones",
    request_body(content_type = "multipart/form-data", description = "Campo `file` (.xlsx/.xls)"),
    responses(
        (status = 200, description = "Resultado por linha", body = ImportResponse),
        (status = 400, description = "Arquivo ausente, inválido ou sem cabeçalhos")
    )
)]
pub async fn import_clients(
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    import_entity(app_state, ImportEntity::Clients, multipart).await
}

// GET /api/clients/import
#[utoipa::path(
    get,
    path = "/api/clients/import",
    tag = "Importaciones",
    responses((status = 200, description = "Planilha modelo (.xlsx) com cabeçalhos e exemplos"))
)]
pub async fn clients_template(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    download_template(&app_state, ImportEntity::Clients)
}

// =============================================================================
//  PDVs
// =============================================================================

// POST /api/pdv-masters/import
#[utoipa::path(
    post,
    path = "/api/pdv-masters/import",
    tag = "Importaciones",
    request_body(content_type = "multipart/form-data", description = "Campo `file` (.xlsx/.xls)"),
    responses(
        (status = 200, description = "Resultado por linha", body = ImportResponse),
        (status = 400, description = "Arquivo ausente, inválido ou sem cabeçalhos")
    )
)]
pub async fn import_pdv_masters(
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    import_entity(app_state, ImportEntity::PdvMasters, multipart).await
}

// GET /api/pdv-masters/import
#[utoipa::path(
    get,
    path = "/api/pdv-masters/import",
    tag = "Importaciones",
    responses((status = 200, description = "Planilha modelo (.xlsx) com cabeçalhos e exemplos"))
)]
pub async fn pdv_masters_template(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    download_template(&app_state, ImportEntity::PdvMasters)
}

// =============================================================================
//  USUÁRIOS
// =============================================================================

// POST /api/users/import
#[utoipa::path(
    post,
    path = "/api/users/import",
    tag = "Importaciones",
    request_body(content_type = "multipart/form-data", description = "Campo `file` (.xlsx/.xls)"),
    responses(
        (status = 200, description = "Resultado por linha", body = ImportResponse),
        (status = 400, description = "Arquivo ausente, inválido ou sem cabeçalhos")
    )
)]
pub async fn import_users(
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    import_entity(app_state, ImportEntity::Users, multipart).await
}

// GET /api/users/import
#[utoipa::path(
    get,
    path = "/api/users/import",
    tag = "Importaciones",
    responses((status = 200, description = "Planilha modelo (.xlsx) com cabeçalhos e exemplos"))
)]
pub async fn users_template(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    download_template(&app_state, ImportEntity::Users)
}

// =============================================================================
//  PLANEJAMENTO
// =============================================================================

// POST /api/route-assignments/import
#[utoipa::path(
    post,
    path = "/api/route-assignments/import",
    tag = "Importaciones",
    request_body(content_type = "multipart/form-data", description = "Campo `file` (.xlsx/.xls)"),
    responses(
        (status = 200, description = "Resultado por linha", body = ImportResponse),
        (status = 400, description = "Arquivo ausente, inválido ou sem cabeçalhos")
    )
)]
pub async fn import_route_assignments(
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    import_entity(app_state, ImportEntity::RouteAssignments, multipart).await
}

// GET /api/route-assignments/import
#[utoipa::path(
    get,
    path = "/api/route-assignments/import",
    tag = "Importaciones",
    responses((status = 200, description = "Planilha modelo (.xlsx) com cabeçalhos e exemplos"))
)]
pub async fn route_assignments_template(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    download_template(&app_state, ImportEntity::RouteAssignments)
}

// =============================================================================
//  PRODUTOS (catálogo de uma plantilla PRICE_AUDIT_SKU)
// =============================================================================

// POST /api/task-templates/import-products
#[utoipa::path(
    post,
    path = "/api/task-templates/import-products",
    tag = "Importaciones",
    request_body(content_type = "multipart/form-data", description = "Campos `file` (.xlsx/.xls) e `templateId`"),
    responses(
        (status = 200, description = "Produtos criados/atualizados e itens da plantilla", body = ProductImportResponse),
        (status = 400, description = "Arquivo ou plantilla inválidos"),
        (status = 404, description = "Plantilla não encontrada")
    )
)]
pub async fn import_products(
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = read_form(multipart).await?;

    let template_id = form
        .template_id
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("ID de plantilla requerido".to_string()))?;
    let template_id = Uuid::parse_str(template_id)
        .map_err(|_| AppError::BadRequest("ID de plantilla inválido".to_string()))?;

    let bytes = take_excel(&mut form)?;
    let response = app_state
        .import_service
        .import_products_workbook(template_id, bytes)
        .await?;
    Ok(Json(response))
}

// GET /api/task-templates/import-products
#[utoipa::path(
    get,
    path = "/api/task-templates/import-products",
    tag = "Importaciones",
    responses((status = 200, description = "Planilha modelo (.xlsx) com cabeçalhos e exemplos"))
)]
pub async fn products_template(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    download_template(&app_state, ImportEntity::Products)
}
