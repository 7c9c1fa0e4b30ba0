//! Sohbet modeli istemcisi - Gemini generateContent
//!
//! Kurulan topraklama istemini barındırılan modele gönderir ve üretilen
//! metni olduğu gibi döndürür. Hata durumunda tekrar denenmez; hata
//! çağırana iletilir.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Varsayılan sohbet modeli
pub const DEFAULT_CHAT_MODEL: &str = "gemini-2.0-flash";
/// Varsayılan örnekleme sıcaklığı (deterministike yakın, sıfır değil)
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Cevap başına üst token sınırı
const MAX_OUTPUT_TOKENS: u32 = 2048;

/// Gemini generateContent uç nokta kökü
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

// ============================================================================
// GeminiChat
// ============================================================================

/// Gemini sohbet istemcisi
#[derive(Debug)]
pub struct GeminiChat {
    api_key: String,
    client: reqwest::Client,
    model: String,
    temperature: f32,
}

impl GeminiChat {
    /// Varsayılan model ve sıcaklıkla oluştur
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_model(api_key, DEFAULT_CHAT_MODEL.to_string(), DEFAULT_TEMPERATURE)
    }

    /// Model ve sıcaklık belirterek oluştur
    pub fn with_model(api_key: String, model: String, temperature: f32) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            api_key,
            client,
            model,
            temperature,
        })
    }

    /// Model adı
    pub fn model(&self) -> &str {
        &self.model
    }

    /// İstemi modele gönder, üretilen metni döndür
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, self.model);

        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![TextPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send generate request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<GeminiError>(&body) {
                anyhow::bail!(
                    "Gemini API error ({}): {}",
                    error.error.status,
                    error.error.message
                );
            }
            anyhow::bail!("Gemini API error ({}): {}", status, body);
        }

        let generate_response: GenerateResponse =
            serde_json::from_str(&body).context("Failed to parse generate response")?;

        extract_text(generate_response)
            .ok_or_else(|| anyhow::anyhow!("Gemini returned an empty response"))
    }
}

/// İlk adayın metin parçalarını birleştir
fn extract_text(response: GenerateResponse) -> Option<String> {
    let candidate = response.candidates.into_iter().next()?;
    let text: String = candidate
        .content
        .parts
        .into_iter()
        .map(|part| part.text)
        .collect();

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

/// Gemini API hata gövdesi
#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
    #[serde(default)]
    status: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![TextPart {
                    text: "Zeus kimdir?".to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                max_output_tokens: 2048,
            },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "Zeus kimdir?");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 2048);
        assert!((value["generationConfig"]["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_extract_text_from_response() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Zeus, "}, {"text": "gök tanrısıdır."}]}}
            ]
        }"#;

        let response: GenerateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            extract_text(response),
            Some("Zeus, gök tanrısıdır.".to_string())
        );
    }

    #[test]
    fn test_extract_text_empty_candidates() {
        let response: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert_eq!(extract_text(response), None);
    }

    #[test]
    fn test_chat_defaults() {
        let chat = GeminiChat::new("fake_key".to_string()).unwrap();
        assert_eq!(chat.model(), "gemini-2.0-flash");
    }
}
