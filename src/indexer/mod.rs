//! İndeks kurulum modülü
//!
//! Tek seferlik çevrimdışı hat: derlemi oku -> normalize et -> parçala
//! -> embed et -> indeksi baştan yaz. Derlem veya embedding modeli
//! değiştiğinde yeniden çalıştırılır; artımlı güncelleme yoktur.
//!
//! İndeksin hangi modelle kurulduğu `manifest.json` dosyasına yazılır;
//! cevap motoru bu kaydı kendi modeliyle karşılaştırır.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::corpus::{self, CorpusStats, Document};
use crate::credentials;
use crate::embedding::{
    EmbeddingProvider, GeminiEmbedding, DEFAULT_DIMENSION, GEMINI_EMBED_MODEL,
};
use crate::knowledge::{
    ChunkConfig, Chunker, LanceVectorStore, RecursiveChunker, VectorEntry, VectorStore,
};
use crate::text::normalize;

// ============================================================================
// Data Directory
// ============================================================================

/// İndeks dizini adı
pub const INDEX_DIR_NAME: &str = "index.lance";
/// Manifest dosyası adı
pub const MANIFEST_FILE: &str = "manifest.json";

/// Veri dizini (~/.mitos-rag/)
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mitos-rag")
}

/// Veri dizinindeki indeks yolu
pub fn index_path(data_dir: &Path) -> PathBuf {
    data_dir.join(INDEX_DIR_NAME)
}

/// Veri dizinindeki manifest yolu
pub fn manifest_path(data_dir: &Path) -> PathBuf {
    data_dir.join(MANIFEST_FILE)
}

// ============================================================================
// Index Manifest
// ============================================================================

/// İndeksin yanına yazılan kurulum kaydı
///
/// Embedding modeli indeksle birlikte sabitlenir; farklı modelle
/// yapılan sorgu sessizce bozuk sonuç vermek yerine reddedilir.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexManifest {
    pub embedding_model: String,
    pub dimension: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub document_count: usize,
    pub chunk_count: usize,
    pub built_at: DateTime<Utc>,
}

impl IndexManifest {
    /// Manifest dosyasını oku
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read index manifest: {:?}", path))?;
        serde_json::from_str(&raw).context("Failed to parse index manifest")
    }

    /// Manifest dosyasını yaz
    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self).context("Failed to serialize manifest")?;
        std::fs::write(path, raw)
            .with_context(|| format!("Failed to write index manifest: {:?}", path))
    }
}

// ============================================================================
// Index Builder
// ============================================================================

/// Kurulum sonucu özeti
#[derive(Debug)]
pub struct IndexReport {
    pub corpus: CorpusStats,
    pub document_count: usize,
    pub chunk_count: usize,
    pub index_path: PathBuf,
}

/// Embedding bekleyen parça
#[derive(Debug)]
struct PendingChunk {
    source: String,
    page: i32,
    chunk_index: i32,
    text: String,
}

/// Tek seferlik indeks kurucu
pub struct IndexBuilder {
    chunk_config: ChunkConfig,
    chunker: Box<dyn Chunker>,
}

impl IndexBuilder {
    /// Parçalama ayarlarıyla oluştur
    pub fn new(chunk_config: ChunkConfig) -> Self {
        Self {
            chunk_config,
            chunker: Box::new(RecursiveChunker::new(chunk_config)),
        }
    }

    /// Varsayılan ayarlarla oluştur (900/150)
    pub fn with_defaults() -> Self {
        Self::new(ChunkConfig::default())
    }

    /// Derlemden indeksi kur
    ///
    /// Derlem boşsa indeks tarafına hiç dokunulmadan
    /// `RagError::EmptyCorpus` döner. Başarılı kurulum önceki indeksi
    /// tamamen değiştirir ve manifesti günceller.
    pub async fn build(&self, corpus_dir: &Path, data_dir: &Path) -> Result<IndexReport> {
        // 1. Derlem (boş derlem burada, yan etkisiz düşer)
        let files = corpus::scan_corpus(corpus_dir)?;
        let stats = CorpusStats::from_files(&files);
        let documents = corpus::load_corpus(corpus_dir).await?;

        // 2. Normalize + parçala
        let chunks = self.chunk_documents(&documents);
        if chunks.is_empty() {
            anyhow::bail!(
                "Corpus produced no chunks (documents may be empty): {:?}",
                corpus_dir
            );
        }
        tracing::info!(
            "Chunked {} documents into {} chunks",
            documents.len(),
            chunks.len()
        );

        // 3. Embedding (anahtar ağ çağrısından önce çözülür)
        let api_key = credentials::resolve_api_key(data_dir)?;
        let embedder = GeminiEmbedding::with_dimension(api_key, DEFAULT_DIMENSION)?;

        let mut entries = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            tracing::info!("Embedding chunk {}/{}", i + 1, chunks.len());
            let embedding = embedder
                .embed_document(&chunk.text)
                .await
                .with_context(|| format!("Failed to embed chunk from {}", chunk.source))?;

            entries.push(VectorEntry {
                source: chunk.source.clone(),
                page: chunk.page,
                chunk_index: chunk.chunk_index,
                chunk_text: chunk.text.clone(),
                embedding,
            });
        }

        // 4. İndeksi baştan yaz
        let index_path = index_path(data_dir);
        let store = LanceVectorStore::open(&index_path).await?;
        store.rebuild(&entries).await?;

        // 5. Manifest
        let manifest = IndexManifest {
            embedding_model: GEMINI_EMBED_MODEL.to_string(),
            dimension: DEFAULT_DIMENSION,
            chunk_size: self.chunk_config.chunk_size,
            chunk_overlap: self.chunk_config.overlap,
            document_count: documents.len(),
            chunk_count: entries.len(),
            built_at: Utc::now(),
        };
        manifest.save(&manifest_path(data_dir))?;

        tracing::info!(
            "Index built: {} documents, {} chunks at {:?}",
            documents.len(),
            entries.len(),
            index_path
        );

        Ok(IndexReport {
            corpus: stats,
            document_count: documents.len(),
            chunk_count: entries.len(),
            index_path,
        })
    }

    /// Belgeleri normalize edip kaynak bilgisiyle parçala
    fn chunk_documents(&self, documents: &[Document]) -> Vec<PendingChunk> {
        let mut chunks = Vec::new();

        for doc in documents {
            let clean = normalize(&doc.text);
            let pieces = self.chunker.chunk(&clean);

            for (i, text) in pieces.into_iter().enumerate() {
                chunks.push(PendingChunk {
                    source: doc.source.clone(),
                    page: doc.page.map(|p| p as i32).unwrap_or(0),
                    chunk_index: i as i32,
                    text,
                });
            }
        }

        chunks
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use crate::error::RagError;

    #[test]
    fn test_manifest_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(MANIFEST_FILE);

        let manifest = IndexManifest {
            embedding_model: GEMINI_EMBED_MODEL.to_string(),
            dimension: DEFAULT_DIMENSION,
            chunk_size: 900,
            chunk_overlap: 150,
            document_count: 3,
            chunk_count: 42,
            built_at: Utc::now(),
        };

        manifest.save(&path).unwrap();
        let loaded = IndexManifest::load(&path).unwrap();

        assert_eq!(loaded.embedding_model, manifest.embedding_model);
        assert_eq!(loaded.dimension, manifest.dimension);
        assert_eq!(loaded.chunk_count, 42);
    }

    #[tokio::test]
    async fn test_build_empty_corpus_writes_nothing() {
        let corpus_dir = TempDir::new().unwrap();
        let data_dir = TempDir::new().unwrap();

        let builder = IndexBuilder::with_defaults();
        let err = builder
            .build(corpus_dir.path(), data_dir.path())
            .await
            .unwrap_err();

        let rag_err = err.downcast_ref::<RagError>();
        assert!(matches!(rag_err, Some(RagError::EmptyCorpus(_))));

        // Hata yan etkisiz: ne indeks ne manifest yazılmış olmalı
        assert!(!index_path(data_dir.path()).exists());
        assert!(!manifest_path(data_dir.path()).exists());
    }

    #[test]
    fn test_chunk_documents_carries_source_metadata() {
        let builder = IndexBuilder::new(ChunkConfig::new(50, 10));

        let long_text = (0..40)
            .map(|i| format!("cümle{}", i))
            .collect::<Vec<_>>()
            .join(" ");

        let documents = vec![
            Document {
                source: "zeus.txt".to_string(),
                page: None,
                text: long_text.clone(),
            },
            Document {
                source: "destan.pdf".to_string(),
                page: Some(3),
                text: long_text,
            },
        ];

        let chunks = builder.chunk_documents(&documents);
        assert!(chunks.len() >= 4);

        for chunk in &chunks {
            assert!(!chunk.text.trim().is_empty());
            match chunk.source.as_str() {
                "zeus.txt" => assert_eq!(chunk.page, 0),
                "destan.pdf" => assert_eq!(chunk.page, 3),
                other => panic!("beklenmeyen kaynak: {}", other),
            }
        }

        // Parça sırası belge içinde 0'dan başlar
        let zeus_first = chunks.iter().find(|c| c.source == "zeus.txt").unwrap();
        assert_eq!(zeus_first.chunk_index, 0);
    }

    #[test]
    fn test_chunk_documents_drops_empty_documents() {
        let builder = IndexBuilder::with_defaults();
        let documents = vec![Document {
            source: "bos.txt".to_string(),
            page: None,
            text: "   \n\n  ".to_string(),
        }];

        assert!(builder.chunk_documents(&documents).is_empty());
    }
}
