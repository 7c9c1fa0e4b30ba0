//! Embedding modülü - Gemini API ile metin vektörleştirme
//!
//! Belge parçalarını ve soruları sabit boyutlu vektörlere çevirir.
//! İndeks kurulumunda ve sorgu anında AYNI model kullanılmak zorundadır;
//! aksi halde benzerlik skorları anlamsızlaşır.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

// ============================================================================
// EmbeddingProvider Trait
// ============================================================================

/// Embedding sağlayıcı arayüzü
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Belge parçası embedding'i (indeks kurulumu)
    async fn embed_document(&self, text: &str) -> Result<Vec<f32>>;

    /// Sorgu embedding'i (cevaplama anı)
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Toplu belge embedding'i (varsayılan: sıralı çağrı)
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed_document(text).await?);
        }
        Ok(results)
    }

    /// Embedding boyutu
    fn dimension(&self) -> usize;

    /// Model adı
    fn name(&self) -> &str;
}

// ============================================================================
// Google Gemini Embedding
// ============================================================================

/// Gemini embedding modeli
pub const GEMINI_EMBED_MODEL: &str = "gemini-embedding-001";

/// Gemini embedding API uç noktası
/// ref: https://ai.google.dev/gemini-api/docs/embeddings
const GEMINI_EMBED_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-embedding-001:embedContent";

/// Varsayılan embedding boyutu
pub const DEFAULT_DIMENSION: usize = 768;

/// Çağrılar arası en az bekleme (ücretsiz katman 60 RPM)
const MIN_DELAY_MS: u64 = 1000;

/// Gemini embedding istemcisi
///
/// Başarısız çağrı tekrar denenmez; hata olduğu gibi çağırana gider.
#[derive(Debug)]
pub struct GeminiEmbedding {
    api_key: String,
    client: reqwest::Client,
    dimension: usize,
    pacer: Arc<Mutex<Pacer>>,
}

/// Çağrı hızı sınırlayıcı
///
/// Ardışık istekler arasına en az `min_delay` koyar.
#[derive(Debug)]
struct Pacer {
    min_delay: Duration,
    last_request: Option<Instant>,
}

impl Pacer {
    fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_request: None,
        }
    }

    async fn acquire(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_delay {
                let wait = self.min_delay - elapsed;
                tracing::debug!("Pacing embedding call: waiting {:?}", wait);
                tokio::time::sleep(wait).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

impl GeminiEmbedding {
    /// Varsayılan boyutla oluştur
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_dimension(api_key, DEFAULT_DIMENSION)
    }

    /// Boyut belirterek oluştur (768, 1536 veya 3072)
    pub fn with_dimension(api_key: String, dimension: usize) -> Result<Self> {
        if ![768, 1536, 3072].contains(&dimension) {
            anyhow::bail!(
                "Invalid dimension: {}. Must be 768, 1536, or 3072",
                dimension
            );
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let pacer = Arc::new(Mutex::new(Pacer::new(Duration::from_millis(MIN_DELAY_MS))));

        Ok(Self {
            api_key,
            client,
            dimension,
            pacer,
        })
    }

    /// Görev türü belirterek embedding al
    async fn embed_with_task(&self, text: &str, task_type: &str) -> Result<Vec<f32>> {
        // Boş metin için sıfır vektör; API çağrısı yapılmaz
        if text.trim().is_empty() {
            return Ok(vec![0.0; self.dimension]);
        }

        let request = EmbedRequest {
            model: format!("models/{}", GEMINI_EMBED_MODEL),
            content: EmbedContent {
                parts: vec![EmbedPart {
                    text: text.to_string(),
                }],
            },
            task_type: task_type.to_string(),
            output_dimensionality: Some(self.dimension),
        };

        {
            let mut pacer = self.pacer.lock().await;
            pacer.acquire().await;
        }

        // API anahtarı URL yerine başlıkta taşınır
        let response = self
            .client
            .post(GEMINI_EMBED_URL)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send embedding request")?;

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

        let embed_response: EmbedResponse =
            serde_json::from_str(&body).context("Failed to parse embedding response")?;

        Ok(embed_response.embedding.values)
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbedding {
    async fn embed_document(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_with_task(text, "RETRIEVAL_DOCUMENT").await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_with_task(text, "RETRIEVAL_QUERY").await
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        // Gemini'nin toplu API'si yok; pacer hız kontrolünü üstlenir
        let mut results = Vec::with_capacity(texts.len());

        for (i, text) in texts.iter().enumerate() {
            tracing::debug!("Embedding batch {}/{}", i + 1, texts.len());
            results.push(self.embed_document(text).await?);
        }

        Ok(results)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        GEMINI_EMBED_MODEL
    }
}

// ============================================================================
// API Types
// ============================================================================

/// Gemini embedContent istek gövdesi
/// ref: https://ai.google.dev/gemini-api/docs/embeddings
#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    content: EmbedContent,
    #[serde(rename = "taskType")]
    task_type: String,
    #[serde(rename = "outputDimensionality", skip_serializing_if = "Option::is_none")]
    output_dimensionality: Option<usize>,
}

#[derive(Debug, Serialize)]
struct EmbedContent {
    parts: Vec<EmbedPart>,
}

#[derive(Debug, Serialize)]
struct EmbedPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
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
    fn test_invalid_dimension() {
        let result = GeminiEmbedding::with_dimension("fake_key".to_string(), 999);
        assert!(result.is_err());
        let err = result.err().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.contains("Invalid dimension"));
    }

    #[test]
    fn test_valid_dimensions() {
        for dim in [768, 1536, 3072] {
            let embedder = GeminiEmbedding::with_dimension("fake_key".to_string(), dim).unwrap();
            assert_eq!(embedder.dimension(), dim);
        }
    }

    #[test]
    fn test_provider_name() {
        let embedder = GeminiEmbedding::new("fake_key".to_string()).unwrap();
        assert_eq!(embedder.name(), "gemini-embedding-001");
    }

    #[tokio::test]
    async fn test_empty_text_embeds_to_zero_vector() {
        // Boş metin ağ çağrısı olmadan sıfır vektör döndürür
        let embedder = GeminiEmbedding::new("fake_key".to_string()).unwrap();
        let vector = embedder.embed_document("   ").await.unwrap();
        assert_eq!(vector.len(), DEFAULT_DIMENSION);
        assert!(vector.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_embed_request_serialization() {
        let request = EmbedRequest {
            model: "models/gemini-embedding-001".to_string(),
            content: EmbedContent {
                parts: vec![EmbedPart {
                    text: "Zeus kimdir?".to_string(),
                }],
            },
            task_type: "RETRIEVAL_QUERY".to_string(),
            output_dimensionality: Some(768),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["taskType"], "RETRIEVAL_QUERY");
        assert_eq!(value["outputDimensionality"], 768);
        assert_eq!(value["content"]["parts"][0]["text"], "Zeus kimdir?");
    }
}
