// src/services/vision_service.rs
//
// Cliente do modelo de visão (API de chat compatível com OpenAI).

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::{
    common::error::AppError,
    models::ai::{PriceData, ReceiptData},
};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

const TEMPERATURE: f64 = 0.1;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const RECEIPT_PROMPT: &str = r#"Eres un experto en OCR de boletas y facturas chilenas. Extrae la información estructurada de la boleta.
Responde SOLO con JSON válido siguiendo este formato:
{
  "total": number,
  "items": [{"name": string, "price": number, "quantity": number}],
  "confidence": number (0-1),
  "date": string (opcional),
  "store": string (opcional)
}"#;

const PRICES_PROMPT: &str = r#"Eres un experto en análisis de precios en góndolas de supermercados y retail.
Identifica todos los productos visibles con sus precios.
Responde SOLO con JSON válido siguiendo este formato:
[
  {
    "productName": string,
    "price": number,
    "brand": string (opcional),
    "confidence": number (0-1)
  }
]"#;

/// Remove o prefixo `data:image/<tipo>;base64,` de um data URL.
pub fn strip_data_url_prefix(raw: &str) -> &str {
    let raw = raw.trim();
    let Some(rest) = raw.strip_prefix("data:image/") else {
        return raw;
    };
    match rest.split_once(";base64,") {
        Some((kind, payload)) if !kind.is_empty() && kind.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') => {
            payload
        }
        _ => raw,
    }
}

/// Limpa o payload e confere que é base64 decodificável.
pub fn prepare_image(raw: &str) -> Result<&str, AppError> {
    let payload = strip_data_url_prefix(raw);
    if payload.is_empty() {
        return Err(AppError::BadRequest("No se proporcionó imagen".to_string()));
    }
    STANDARD
        .decode(payload)
        .map_err(|_| AppError::BadRequest("La imagen no es un base64 válido".to_string()))?;
    Ok(payload)
}

/// O modelo às vezes embrulha o JSON num bloco ```json; o conteúdo útil é o de dentro.
pub fn extract_json(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn parse_content<T: DeserializeOwned>(content: Option<&str>, fallback: &str) -> Result<T, AppError> {
    let content = content.map(extract_json).filter(|c| !c.is_empty()).unwrap_or(fallback);
    serde_json::from_str(content)
        .map_err(|e| AppError::Vision(format!("Resposta do modelo não é JSON válido: {}", e)))
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Clone)]
pub struct VisionService {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl VisionService {
    pub fn new(api_key: String, base_url: String, model: String) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| anyhow::anyhow!("Falha ao criar o cliente HTTP: {}", e))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }

    pub async fn process_receipt(&self, image_base64: &str) -> Result<ReceiptData, AppError> {
        let image = prepare_image(image_base64)?;
        let content = self
            .complete(
                RECEIPT_PROMPT,
                image,
                "Extrae todos los datos de esta boleta/factura.",
                1000,
            )
            .await?;
        parse_content(content.as_deref(), "{}")
    }

    pub async fn analyze_prices(&self, image_base64: &str) -> Result<Vec<PriceData>, AppError> {
        let image = prepare_image(image_base64)?;
        let content = self
            .complete(
                PRICES_PROMPT,
                image,
                "Identifica todos los productos y sus precios en esta imagen de góndola.",
                2000,
            )
            .await?;
        parse_content(content.as_deref(), "[]")
    }

    async fn complete(
        &self,
        system_prompt: &str,
        image: &str,
        instruction: &str,
        max_tokens: u32,
    ) -> Result<Option<String>, AppError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                {
                    "role": "user",
                    "content": [
                        {
                            "type": "image_url",
                            "image_url": { "url": format!("data:image/jpeg;base64,{}", image) }
                        },
                        { "type": "text", "text": instruction }
                    ]
                }
            ],
            "max_tokens": max_tokens,
            "temperature": TEMPERATURE,
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Vision(format!("Falha na chamada ao modelo: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::Vision(format!("Modelo respondeu {}: {}", status, detail)));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Vision(format!("Resposta do modelo ilegível: {}", e)))?;

        let content = chat.choices.into_iter().next().and_then(|c| c.message.content);
        tracing::debug!("Modelo de visão respondeu {} bytes", content.as_ref().map_or(0, |c| c.len()));
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_data_url_prefix() {
        assert_eq!(strip_data_url_prefix("data:image/png;base64,iVBORw0K"), "iVBORw0K");
        assert_eq!(strip_data_url_prefix("data:image/jpeg;base64,/9j/4AAQ"), "/9j/4AAQ");
        assert_eq!(strip_data_url_prefix("/9j/4AAQ"), "/9j/4AAQ");
        // Só prefixos de imagem são removidos
        assert_eq!(
            strip_data_url_prefix("data:text/plain;base64,aGVsbG8="),
            "data:text/plain;base64,aGVsbG8="
        );
    }

    #[test]
    fn empty_or_invalid_images_are_bad_requests() {
        let err = prepare_image("data:image/png;base64,").unwrap_err();
        assert_eq!(err.to_string(), "No se proporcionó imagen");
        assert!(matches!(prepare_image("no es base64!!"), Err(AppError::BadRequest(_))));
        assert_eq!(prepare_image("data:image/png;base64,aGVsbG8=").unwrap(), "aGVsbG8=");
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        assert_eq!(extract_json("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(extract_json("```\n{}\n```"), "{}");
        assert_eq!(extract_json("  {\"total\": 1} "), "{\"total\": 1}");
    }

    #[test]
    fn receipt_content_parses_with_optional_fields() {
        let receipt: ReceiptData = parse_content(
            Some(r#"{"total": 4990, "items": [{"name": "Pan", "price": 1990}], "confidence": 0.9, "store": "Lider"}"#),
            "{}",
        )
        .unwrap();
        assert_eq!(receipt.total, 4990.0);
        assert_eq!(receipt.items[0].quantity, 1.0);
        assert_eq!(receipt.store.as_deref(), Some("Lider"));
        assert_eq!(receipt.date, None);
    }

    #[test]
    fn empty_content_falls_back() {
        let prices: Vec<PriceData> = parse_content(None, "[]").unwrap();
        assert!(prices.is_empty());
        let receipt: ReceiptData = parse_content(Some("   "), "{}").unwrap();
        assert_eq!(receipt.total, 0.0);
    }

    #[test]
    fn prose_answers_are_vision_errors() {
        let err = parse_content::<Vec<PriceData>>(Some("No veo precios."), "[]").unwrap_err();
        assert!(matches!(err, AppError::Vision(_)));
    }
}
