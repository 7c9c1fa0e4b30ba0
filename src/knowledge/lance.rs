//! LanceDB vektör deposu
//!
//! Parça vektörleri Apache Arrow tabanlı LanceDB'de saklanır.
//! İndeks dizini tek parça halinde yazılır ve okunur; iç düzeni
//! LanceDB'ye aittir.
//! ref: https://lancedb.github.io/lancedb/

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow_array::{
    Array, FixedSizeListArray, Float32Array, Int32Array, RecordBatch, RecordBatchIterator,
    StringArray,
};
use arrow_schema::{DataType, Field, Schema};
use async_trait::async_trait;
use lancedb::connection::Connection;
use lancedb::query::{ExecutableQuery, QueryBase};

use crate::error::RagError;

use super::vector::{SearchResult, VectorEntry, VectorStore, EMBEDDING_DIMENSION};

/// Parça tablosu adı
const TABLE_NAME: &str = "chunks";

// ============================================================================
// LanceVectorStore
// ============================================================================

/// LanceDB vektör deposu
pub struct LanceVectorStore {
    db: Connection,
}

impl std::fmt::Debug for LanceVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanceVectorStore").finish_non_exhaustive()
    }
}

impl LanceVectorStore {
    /// İndeks dizinini aç (yoksa oluşturur)
    ///
    /// İndeks kurulumunda kullanılır.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .context("Failed to create index directory")?;
            }
        }

        let path_str = path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid path encoding"))?;

        let db = lancedb::connect(path_str)
            .execute()
            .await
            .context("Failed to connect to LanceDB")?;

        Ok(Self { db })
    }

    /// Var olan indeksi aç
    ///
    /// Dizin yoksa `RagError::MissingIndex` döner; cevap motoru bu
    /// yolu kullanır ve operatörü `build` komutuna yönlendirir.
    pub async fn open_existing(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RagError::MissingIndex(path.to_path_buf()).into());
        }
        Self::open(path).await
    }

    /// Parça tablosu şeması
    fn create_schema() -> Schema {
        Schema::new(vec![
            Field::new("source", DataType::Utf8, false),
            Field::new("page", DataType::Int32, false),
            Field::new("chunk_index", DataType::Int32, false),
            Field::new("chunk_text", DataType::Utf8, false),
            Field::new(
                "embedding",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    EMBEDDING_DIMENSION,
                ),
                false,
            ),
        ])
    }

    /// Kayıtları Arrow RecordBatch'e çevir
    fn entries_to_batch(entries: &[VectorEntry]) -> Result<RecordBatch> {
        if entries.is_empty() {
            anyhow::bail!("Cannot create batch from empty entries");
        }

        let sources: Vec<&str> = entries.iter().map(|e| e.source.as_str()).collect();
        let pages: Vec<i32> = entries.iter().map(|e| e.page).collect();
        let chunk_indices: Vec<i32> = entries.iter().map(|e| e.chunk_index).collect();
        let chunk_texts: Vec<&str> = entries.iter().map(|e| e.chunk_text.as_str()).collect();

        let embeddings_flat: Vec<f32> = entries
            .iter()
            .flat_map(|e| e.embedding.iter().copied())
            .collect();

        let values = Float32Array::from(embeddings_flat);
        let field = Arc::new(Field::new("item", DataType::Float32, true));
        let embeddings_list = FixedSizeListArray::try_new(
            field,
            EMBEDDING_DIMENSION,
            Arc::new(values) as Arc<dyn Array>,
            None,
        )
        .context("Failed to create embedding array")?;

        let batch = RecordBatch::try_new(
            Arc::new(Self::create_schema()),
            vec![
                Arc::new(StringArray::from(sources)),
                Arc::new(Int32Array::from(pages)),
                Arc::new(Int32Array::from(chunk_indices)),
                Arc::new(StringArray::from(chunk_texts)),
                Arc::new(embeddings_list),
            ],
        )
        .context("Failed to create RecordBatch")?;

        Ok(batch)
    }

    /// Tablo var mı
    async fn table_exists(&self) -> bool {
        self.db
            .table_names()
            .execute()
            .await
            .map(|names| names.contains(&TABLE_NAME.to_string()))
            .unwrap_or(false)
    }
}

#[async_trait]
impl VectorStore for LanceVectorStore {
    async fn rebuild(&self, entries: &[VectorEntry]) -> Result<usize> {
        let batch = Self::entries_to_batch(entries)?;
        let schema = batch.schema();

        // Eski tablo tamamen silinir; eski modelden kalma vektör kalmaz
        if self.table_exists().await {
            self.db
                .drop_table(TABLE_NAME)
                .await
                .context("Failed to drop existing table")?;
        }

        let batches = RecordBatchIterator::new(vec![Ok(batch)], schema);
        self.db
            .create_table(TABLE_NAME, batches)
            .execute()
            .await
            .context("Failed to create table")?;

        Ok(entries.len())
    }

    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        if !self.table_exists().await {
            return Ok(vec![]);
        }

        let table = self
            .db
            .open_table(TABLE_NAME)
            .execute()
            .await
            .context("Failed to open table for search")?;

        let results = table
            .vector_search(query_embedding.to_vec())
            .context("Failed to create vector search")?
            .limit(limit)
            .execute()
            .await
            .context("Failed to execute vector search")?;

        let mut search_results = Vec::new();

        use futures::TryStreamExt;
        let batches: Vec<RecordBatch> = results.try_collect().await?;

        for batch in batches {
            let sources = batch
                .column_by_name("source")
                .and_then(|c| c.as_any().downcast_ref::<StringArray>())
                .ok_or_else(|| anyhow::anyhow!("Missing source column"))?;

            let pages = batch
                .column_by_name("page")
                .and_then(|c| c.as_any().downcast_ref::<Int32Array>())
                .ok_or_else(|| anyhow::anyhow!("Missing page column"))?;

            let chunk_indices = batch
                .column_by_name("chunk_index")
                .and_then(|c| c.as_any().downcast_ref::<Int32Array>())
                .ok_or_else(|| anyhow::anyhow!("Missing chunk_index column"))?;

            let chunk_texts = batch
                .column_by_name("chunk_text")
                .and_then(|c| c.as_any().downcast_ref::<StringArray>())
                .ok_or_else(|| anyhow::anyhow!("Missing chunk_text column"))?;

            // _distance kolonunu LanceDB kendisi ekler
            let distances = batch
                .column_by_name("_distance")
                .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
                .ok_or_else(|| anyhow::anyhow!("Missing _distance column"))?;

            for i in 0..batch.num_rows() {
                let distance = distances.value(i);
                // L2 uzaklığı benzerlik skoruna çevrilir
                let similarity = 1.0 / (1.0 + distance);

                search_results.push(SearchResult {
                    source: sources.value(i).to_string(),
                    page: pages.value(i),
                    chunk_index: chunk_indices.value(i),
                    chunk_text: chunk_texts.value(i).to_string(),
                    similarity,
                });
            }
        }

        Ok(search_results)
    }

    async fn count(&self) -> Result<usize> {
        if !self.table_exists().await {
            return Ok(0);
        }

        let table = self
            .db
            .open_table(TABLE_NAME)
            .execute()
            .await
            .context("Failed to open table for count")?;

        let count = table.count_rows(None).await.context("Failed to count rows")?;
        Ok(count)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_entry(source: &str, chunk_index: i32, fill: f32) -> VectorEntry {
        VectorEntry {
            source: source.to_string(),
            page: 1,
            chunk_index,
            chunk_text: format!("{} parça {}", source, chunk_index),
            embedding: vec![fill; EMBEDDING_DIMENSION as usize],
        }
    }

    #[tokio::test]
    async fn test_open_existing_missing_index() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("index.lance");

        let err = LanceVectorStore::open_existing(&missing).await.unwrap_err();
        let rag_err = err.downcast_ref::<RagError>();
        assert!(matches!(rag_err, Some(RagError::MissingIndex(_))));
    }

    #[tokio::test]
    async fn test_rebuild_and_count() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("index.lance");

        let store = LanceVectorStore::open(&path).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);

        let entries = vec![test_entry("zeus.txt", 0, 0.1), test_entry("zeus.txt", 1, 0.2)];
        let written = store.rebuild(&entries).await.unwrap();
        assert_eq!(written, 2);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_search_returns_nearest() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("index.lance");

        let store = LanceVectorStore::open(&path).await.unwrap();
        let entries = vec![
            test_entry("zeus.txt", 0, 0.1),
            test_entry("hera.txt", 0, 0.5),
            test_entry("ares.txt", 0, 0.9),
        ];
        store.rebuild(&entries).await.unwrap();

        let query = vec![0.5; EMBEDDING_DIMENSION as usize];
        let results = store.search(&query, 2).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].source, "hera.txt");
    }

    #[tokio::test]
    async fn test_rebuild_replaces_previous_index() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("index.lance");

        let store = LanceVectorStore::open(&path).await.unwrap();
        let old = vec![
            test_entry("eski1.txt", 0, 0.1),
            test_entry("eski2.txt", 0, 0.2),
            test_entry("eski3.txt", 0, 0.3),
        ];
        store.rebuild(&old).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 3);

        // Yeniden kurulum eski kayıtların hiçbirini bırakmaz
        let new = vec![test_entry("yeni.txt", 0, 0.7)];
        store.rebuild(&new).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);

        let query = vec![0.1; EMBEDDING_DIMENSION as usize];
        let results = store.search(&query, 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source, "yeni.txt");
    }

    #[tokio::test]
    async fn test_search_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("index.lance");

        let store = LanceVectorStore::open(&path).await.unwrap();
        let query = vec![0.1; EMBEDDING_DIMENSION as usize];
        let results = store.search(&query, 5).await.unwrap();
        assert!(results.is_empty());
    }
}
