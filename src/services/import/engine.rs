// src/services/import/engine.rs

use std::fmt;

use async_trait::async_trait;

use super::sheet::{Sheet, SheetRow};
use crate::{common::error::AppError, db::ImportStore, models::import::ImportResults};

/// Formato de uma planilha de importação: cabeçalhos obrigatórios e plantilha de download.
#[derive(Debug, Clone, Copy)]
pub struct ImportLayout {
    pub headers: &'static [&'static str],
    pub sheet_name: &'static str,
    pub file_name: &'static str,
    /// Substantivo da mensagem final ("clientes importados").
    pub noun: &'static str,
    pub examples: &'static [&'static [&'static str]],
}

/// Falha de uma linha. Nunca interrompe o lote.
#[derive(Debug)]
pub enum RowError {
    Invalid(String),
    Store(AppError),
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowError::Invalid(msg) => f.write_str(msg),
            RowError::Store(e) => write!(f, "Error al procesar - {}", e),
        }
    }
}

impl From<AppError> for RowError {
    fn from(e: AppError) -> Self {
        RowError::Store(e)
    }
}

pub fn invalid<T>(msg: impl Into<String>) -> Result<T, RowError> {
    Err(RowError::Invalid(msg.into()))
}

#[async_trait]
pub trait RowImporter: Send + Sync {
    async fn import_row(&self, row: SheetRow<'_>, store: &dyn ImportStore) -> Result<(), RowError>;
}

/// Laço sequencial: cada linha conta no total e termina em sucesso ou em "Fila n: causa".
pub async fn run(
    importer: &dyn RowImporter,
    sheet: &Sheet,
    store: &dyn ImportStore,
) -> ImportResults {
    let mut results = ImportResults::default();

    for row in sheet.rows() {
        results.total += 1;
        match importer.import_row(row, store).await {
            Ok(()) => results.success += 1,
            Err(e) => {
                let message = format!("Fila {}: {}", row.line(), e);
                tracing::debug!("{}", message);
                results.errors.push(message);
            }
        }
    }

    results
}
