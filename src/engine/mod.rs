//! Cevap motoru
//!
//! Soru başına hat: soruyu embed et -> indeksten en benzer parçaları
//! getir -> bağlam bloğu kur -> topraklama istemini sohbet modeline
//! gönder -> modelin cevabını olduğu gibi döndür.
//!
//! Motor süreç başına bir kez kurulur; indeks ve model tutamaçları
//! pahalı olduğundan çağrılar arasında paylaşılır. İç kilitleme yoktur;
//! çağrılar sıralı kabul edilir.

use std::path::Path;

use anyhow::{Context, Result};

use crate::credentials;
use crate::embedding::{
    EmbeddingProvider, GeminiEmbedding, DEFAULT_DIMENSION, GEMINI_EMBED_MODEL,
};
use crate::error::RagError;
use crate::indexer::{get_data_dir, index_path, manifest_path, IndexManifest};
use crate::knowledge::{LanceVectorStore, SearchResult, VectorStore};
use crate::llm::{GeminiChat, DEFAULT_CHAT_MODEL, DEFAULT_TEMPERATURE};

/// Varsayılan getirilecek parça sayısı
pub const DEFAULT_TOP_K: usize = 8;

// ============================================================================
// Engine Configuration
// ============================================================================

/// Cevap motoru ayarları
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Getirilecek parça sayısı
    pub top_k: usize,
    /// Sohbet modeli
    pub chat_model: String,
    /// Örnekleme sıcaklığı
    pub temperature: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

// ============================================================================
// AnswerEngine
// ============================================================================

/// Soru-cevap motoru
///
/// Kurulum sırasında üç ön koşul sırayla denetlenir, hiçbiri ağ
/// çağrısı gerektirmez: indeks ve manifest mevcut mu, indeks bu
/// motorun embedding modeliyle mi kurulmuş, API anahtarı çözülüyor mu.
pub struct AnswerEngine {
    vector: LanceVectorStore,
    embedder: GeminiEmbedding,
    chat: GeminiChat,
    manifest: IndexManifest,
    config: EngineConfig,
}

impl std::fmt::Debug for AnswerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerEngine").finish_non_exhaustive()
    }
}

impl AnswerEngine {
    /// Varsayılan veri dizininden kur
    pub async fn open() -> Result<Self> {
        Self::with_data_dir(&get_data_dir(), EngineConfig::default()).await
    }

    /// Belirtilen veri dizininden kur
    pub async fn with_data_dir(data_dir: &Path, config: EngineConfig) -> Result<Self> {
        let index_path = index_path(data_dir);
        if !index_path.exists() {
            return Err(RagError::MissingIndex(index_path).into());
        }

        let manifest = IndexManifest::load(&manifest_path(data_dir))?;

        // İndeks hangi modelle kurulduysa sorgu da o modeli kullanmalı
        if manifest.embedding_model != GEMINI_EMBED_MODEL
            || manifest.dimension != DEFAULT_DIMENSION
        {
            return Err(RagError::ModelMismatch {
                index_model: manifest.embedding_model,
                index_dimension: manifest.dimension,
                engine_model: GEMINI_EMBED_MODEL.to_string(),
                engine_dimension: DEFAULT_DIMENSION,
            }
            .into());
        }

        let api_key = credentials::resolve_api_key(data_dir)?;

        let vector = LanceVectorStore::open_existing(&index_path).await?;
        let embedder = GeminiEmbedding::with_dimension(api_key.clone(), manifest.dimension)?;
        let chat = GeminiChat::with_model(api_key, config.chat_model.clone(), config.temperature)?;

        Ok(Self {
            vector,
            embedder,
            chat,
            manifest,
            config,
        })
    }

    /// Soruyu cevapla
    ///
    /// Modelin cevabı olduğu gibi döner; "Bilmiyorum." yaptırımı
    /// istemdeki talimata bırakılmıştır. Ağ/sağlayıcı hataları
    /// yakalanmadan çağırana gider.
    pub async fn answer(&self, question: &str) -> Result<String> {
        let (answer, _) = self.answer_with_sources(question).await?;
        Ok(answer)
    }

    /// Soruyu cevapla ve kullanılan parçaları da döndür
    pub async fn answer_with_sources(
        &self,
        question: &str,
    ) -> Result<(String, Vec<SearchResult>)> {
        let results = self.retrieve(question, self.config.top_k).await?;
        let context_block = build_context(&results);
        let prompt = build_prompt(&context_block, question);

        tracing::debug!(
            "Answering with {} retrieved chunks ({} chars of context)",
            results.len(),
            context_block.len()
        );

        let answer = self.chat.generate(&prompt).await?;
        Ok((answer, results))
    }

    /// Soruya en benzer parçaları getir
    pub async fn retrieve(&self, question: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let query_embedding = self
            .embedder
            .embed_query(question)
            .await
            .context("Failed to embed question")?;

        self.vector.search(&query_embedding, limit).await
    }

    /// İndeks manifesti
    pub fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }
}

// ============================================================================
// Prompt Assembly
// ============================================================================

/// Getirilen parçaları sıra bozmadan boş satırla birleştir
pub fn build_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|result| result.chunk_text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Sabit şablonlu topraklama istemi
///
/// Model yalnızca verilen bağlamdan cevap vermeye, bağlam yetersizse
/// "Bilmiyorum." yazmaya yönlendirilir. Soru olduğu gibi eklenir.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "Sen bir mitoloji ansiklopedisi asistanısın.\n\
         SADECE aşağıdaki BAĞLAM'a dayanarak cevap ver.\n\
         - BAĞLAM'da yoksa: \"Bilmiyorum.\" yaz.\n\
         - Türkçe, düzgün yaz.\n\
         \n\
         BAĞLAM:\n\
         {context}\n\
         \n\
         SORU:\n\
         {question}\n\
         \n\
         CEVAP:\n"
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use crate::indexer::{manifest_path, IndexManifest, INDEX_DIR_NAME};

    fn write_manifest(data_dir: &Path, model: &str, dimension: usize) {
        let manifest = IndexManifest {
            embedding_model: model.to_string(),
            dimension,
            chunk_size: 900,
            chunk_overlap: 150,
            document_count: 1,
            chunk_count: 1,
            built_at: chrono::Utc::now(),
        };
        manifest.save(&manifest_path(data_dir)).unwrap();
    }

    #[tokio::test]
    async fn test_missing_index_error() {
        let data_dir = TempDir::new().unwrap();

        let err = AnswerEngine::with_data_dir(data_dir.path(), EngineConfig::default())
            .await
            .unwrap_err();

        let rag_err = err.downcast_ref::<RagError>();
        assert!(matches!(rag_err, Some(RagError::MissingIndex(_))));
        assert!(err.to_string().contains("mitos-rag build"));
    }

    #[tokio::test]
    async fn test_model_mismatch_error() {
        let data_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(data_dir.path().join(INDEX_DIR_NAME)).unwrap();
        write_manifest(data_dir.path(), "eski-embedding-modeli", 768);

        let err = AnswerEngine::with_data_dir(data_dir.path(), EngineConfig::default())
            .await
            .unwrap_err();

        let rag_err = err.downcast_ref::<RagError>();
        assert!(matches!(rag_err, Some(RagError::ModelMismatch { .. })));
    }

    #[tokio::test]
    async fn test_missing_credential_error() {
        // Testlerin hiçbiri bu değişkenleri set etmez
        std::env::remove_var(crate::credentials::ENV_GEMINI_KEY);
        std::env::remove_var(crate::credentials::ENV_GOOGLE_KEY);

        let data_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(data_dir.path().join(INDEX_DIR_NAME)).unwrap();
        write_manifest(data_dir.path(), GEMINI_EMBED_MODEL, DEFAULT_DIMENSION);

        let err = AnswerEngine::with_data_dir(data_dir.path(), EngineConfig::default())
            .await
            .unwrap_err();

        let rag_err = err.downcast_ref::<RagError>();
        assert!(matches!(rag_err, Some(RagError::MissingCredential(_))));
    }

    #[test]
    fn test_build_context_preserves_rank_order() {
        let results = vec![
            SearchResult {
                source: "zeus.txt".to_string(),
                page: 0,
                chunk_index: 0,
                chunk_text: "Zeus, Olimpos tanrılarının kralıdır.".to_string(),
                similarity: 0.9,
            },
            SearchResult {
                source: "hera.txt".to_string(),
                page: 0,
                chunk_index: 0,
                chunk_text: "Hera, Zeus'un eşidir.".to_string(),
                similarity: 0.7,
            },
        ];

        let context = build_context(&results);
        assert_eq!(
            context,
            "Zeus, Olimpos tanrılarının kralıdır.\n\nHera, Zeus'un eşidir."
        );
    }

    #[test]
    fn test_build_prompt_contains_context_and_question() {
        let context = "Zeus, Olimpos tanrılarının kralıdır.";
        let question = "Zeus kimdir?";
        let prompt = build_prompt(context, question);

        assert!(prompt.contains(context));
        assert!(prompt.contains(question));
        assert!(prompt.contains("BAĞLAM:"));
        assert!(prompt.contains("SORU:"));
        assert!(prompt.contains("Bilmiyorum."));
    }

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.top_k, 8);
        assert_eq!(config.chat_model, "gemini-2.0-flash");
        assert!((config.temperature - 0.2).abs() < 1e-6);
    }
}
