// src/services/import/sheet.rs

use std::{collections::HashMap, io::Cursor};

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_xlsxwriter::{Format, Workbook};

use crate::common::error::AppError;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const NOT_ENOUGH_ROWS: &str =
    "El archivo debe tener al menos una fila de encabezados y una fila de datos";

/// Aceita apenas `.xlsx` e `.xls`, sem diferenciar maiúsculas.
pub fn ensure_excel_file_name(file_name: &str) -> Result<(), AppError> {
    let lower = file_name.trim().to_lowercase();
    if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
        Ok(())
    } else {
        Err(AppError::InvalidFile(
            "Solo se permiten archivos Excel (.xlsx, .xls)".to_string(),
        ))
    }
}

/// Primeira aba de uma planilha: cabeçalho + linhas de dados, tudo como texto.
#[derive(Debug, Clone)]
pub struct Sheet {
    columns: HashMap<String, usize>,
    rows: Vec<(u32, Vec<String>)>,
}

impl Sheet {
    /// `first_line` é a linha da planilha onde está o cabeçalho (1 na maioria dos arquivos).
    pub fn from_grid(grid: Vec<Vec<String>>, first_line: u32) -> Result<Self, AppError> {
        let mut grid = grid;
        while grid.last().is_some_and(|row| is_blank(row)) {
            grid.pop();
        }
        if grid.len() < 2 {
            return Err(AppError::InvalidFile(NOT_ENOUGH_ROWS.to_string()));
        }

        let mut lines = grid.into_iter().zip(first_line..);
        let mut columns = HashMap::new();
        if let Some((header, _)) = lines.next() {
            for (idx, name) in header.iter().enumerate() {
                let key = normalize_header(name);
                if !key.is_empty() {
                    // Cabeçalho repetido: vale a primeira coluna
                    columns.entry(key).or_insert(idx);
                }
            }
        }
        let rows = lines.map(|(cells, line)| (line, cells)).collect();

        Ok(Self { columns, rows })
    }

    /// Leitura do calamine fora do runtime assíncrono.
    pub async fn read_workbook(bytes: Vec<u8>) -> Result<Self, AppError> {
        tokio::task::spawn_blocking(move || Self::from_workbook(&bytes))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de leitura da planilha: {}", e))?
    }

    pub fn from_workbook(bytes: &[u8]) -> Result<Self, AppError> {
        let unreadable = |e: calamine::Error| {
            tracing::warn!("Planilha ilegível: {}", e);
            AppError::InvalidFile("No se pudo leer el archivo Excel".to_string())
        };

        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(unreadable)?;
        let range = match workbook.worksheet_range_at(0) {
            Some(range) => range.map_err(unreadable)?,
            None => return Err(AppError::InvalidFile(NOT_ENOUGH_ROWS.to_string())),
        };

        // O range começa na primeira célula usada, não necessariamente em A1
        let first_line = range.start().map(|(row, _)| row + 1).unwrap_or(1);
        let grid = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();

        Self::from_grid(grid, first_line)
    }

    /// Falha com a lista de todos os cabeçalhos ausentes, na ordem pedida.
    pub fn require_headers(&self, required: &[&str]) -> Result<(), AppError> {
        let missing: Vec<String> = required
            .iter()
            .filter(|h| !self.columns.contains_key(&normalize_header(h)))
            .map(|h| h.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::MissingHeaders(missing))
        }
    }

    /// Linhas de dados, pulando as totalmente vazias.
    pub fn rows(&self) -> impl Iterator<Item = SheetRow<'_>> {
        self.rows
            .iter()
            .filter(|(_, cells)| !is_blank(cells))
            .map(|(line, cells)| SheetRow {
                line: *line,
                cells,
                columns: &self.columns,
            })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SheetRow<'a> {
    line: u32,
    cells: &'a [String],
    columns: &'a HashMap<String, usize>,
}

impl<'a> SheetRow<'a> {
    /// Número da linha na planilha (cabeçalho = 1).
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Valor aparado da coluna; "" se a coluna ou a célula não existir.
    pub fn get(&self, header: &str) -> &'a str {
        self.columns
            .get(&normalize_header(header))
            .and_then(|idx| self.cells.get(*idx))
            .map(|s| s.trim())
            .unwrap_or("")
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn is_blank(cells: &[String]) -> bool {
    cells.iter().all(|c| c.trim().is_empty())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => {
            // Série < 1 é só hora (ex.: coluna hora_programada formatada como hora)
            let serial = dt.as_f64();
            match dt.as_datetime() {
                Some(value) if serial < 1.0 => value.format("%H:%M").to_string(),
                Some(value) if value.time() == chrono::NaiveTime::MIN => {
                    value.format("%Y-%m-%d").to_string()
                }
                Some(value) => value.format("%Y-%m-%d %H:%M:%S").to_string(),
                None => serial.to_string(),
            }
        }
        Data::Error(e) => format!("{:?}", e),
    }
}

/// Gera a plantilha de importação: cabeçalho em negrito + linhas de exemplo.
pub fn build_template(
    sheet_name: &str,
    headers: &[&str],
    examples: &[&[&str]],
) -> Result<Vec<u8>, AppError> {
    let xlsx_err = |e: rust_xlsxwriter::XlsxError| {
        AppError::InternalServerError(anyhow::anyhow!("Falha ao gerar a plantilha: {}", e))
    };

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name).map_err(xlsx_err)?;

    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &bold)
            .map_err(xlsx_err)?;
        worksheet
            .set_column_width(col as u16, (header.chars().count() + 8) as f64)
            .map_err(xlsx_err)?;
    }
    for (row, values) in examples.iter().enumerate() {
        for (col, value) in values.iter().enumerate() {
            worksheet
                .write_string(row as u32 + 1, col as u16, *value)
                .map_err(xlsx_err)?;
        }
    }

    workbook.save_to_buffer().map_err(xlsx_err)
}

#[cfg(test)]
pub(crate) fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_excel_extensions_pass() {
        assert!(ensure_excel_file_name("clientes.xlsx").is_ok());
        assert!(ensure_excel_file_name("CLIENTES.XLS").is_ok());
        assert!(matches!(
            ensure_excel_file_name("clientes.csv"),
            Err(AppError::InvalidFile(_))
        ));
    }

    #[test]
    fn header_only_sheet_is_rejected() {
        let err = Sheet::from_grid(grid(&[&["nombre", "codigo"], &["", ""]]), 1).unwrap_err();
        assert_eq!(err.to_string(), NOT_ENOUGH_ROWS);
    }

    #[test]
    fn headers_match_case_insensitively_and_report_all_missing() {
        let sheet = Sheet::from_grid(grid(&[&[" Nombre ", "CODIGO"], &["a", "b"]]), 1).unwrap();
        assert!(sheet.require_headers(&["nombre", "codigo"]).is_ok());

        let err = sheet
            .require_headers(&["nombre", "descripcion", "activo"])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Faltan los siguientes encabezados requeridos: descripcion, activo"
        );
    }

    #[test]
    fn rows_are_read_by_header_and_blank_rows_skipped() {
        let sheet = Sheet::from_grid(
            grid(&[
                &["codigo", "nombre"],
                &[" cc-cl ", "Coca-Cola"],
                &["", "  "],
                &["PE-CL"],
            ]),
            1,
        )
        .unwrap();

        let rows: Vec<_> = sheet.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line(), 2);
        assert_eq!(rows[0].get("NOMBRE"), "Coca-Cola");
        assert_eq!(rows[0].get("codigo"), "cc-cl");
        assert_eq!(rows[1].line(), 4);
        assert_eq!(rows[1].get("nombre"), "");
        assert_eq!(rows[1].get("inexistente"), "");
    }

    #[test]
    fn generated_template_reads_back() {
        let bytes = build_template(
            "Clientes",
            &["nombre", "codigo"],
            &[&["Coca-Cola Chile", "CC-CL"]],
        )
        .unwrap();

        let sheet = Sheet::from_workbook(&bytes).unwrap();
        sheet.require_headers(&["nombre", "codigo"]).unwrap();
        let row = sheet.rows().next().unwrap();
        assert_eq!(row.line(), 2);
        assert_eq!(row.get("codigo"), "CC-CL");
    }

    #[test]
    fn garbage_bytes_are_an_invalid_file() {
        assert!(matches!(
            Sheet::from_workbook(b"isto nao e uma planilha"),
            Err(AppError::InvalidFile(_))
        ));
    }

    #[tokio::test]
    async fn workbook_is_read_on_the_blocking_pool() {
        let bytes = build_template("Clientes", &["nombre", "codigo"], &[&["Acme", "ACME"]]).unwrap();
        let sheet = Sheet::read_workbook(bytes).await.unwrap();
        assert_eq!(sheet.rows().next().unwrap().get("nombre"), "Acme");

        assert!(matches!(
            Sheet::read_workbook(b"nao".to_vec()).await,
            Err(AppError::InvalidFile(_))
        ));
    }
}
