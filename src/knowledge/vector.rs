//! Vektör deposu - arayüz ve yardımcılar
//!
//! Parça vektörleri (metin ve kaynak bilgisiyle birlikte) kalıcı bir
//! indekste tutulur; en yakın komşu aramasıyla geri getirilir.

use anyhow::Result;
use async_trait::async_trait;

/// Embedding boyutu (gemini-embedding-001 varsayılanı)
pub const EMBEDDING_DIMENSION: i32 = 768;

// ============================================================================
// Types
// ============================================================================

/// İndekse yazılacak parça kaydı
#[derive(Debug, Clone)]
pub struct VectorEntry {
    /// Kaynak dosya adı
    pub source: String,
    /// PDF sayfa numarası (0 = sayfa bilgisi yok)
    pub page: i32,
    /// Belge içindeki parça sırası (0 tabanlı)
    pub chunk_index: i32,
    /// Parça metni
    pub chunk_text: String,
    /// Embedding vektörü
    pub embedding: Vec<f32>,
}

/// Arama sonucu
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Kaynak dosya adı
    pub source: String,
    /// PDF sayfa numarası (0 = sayfa bilgisi yok)
    pub page: i32,
    /// Parça sırası
    pub chunk_index: i32,
    /// Parça metni
    pub chunk_text: String,
    /// Benzerlik skoru (yüksek = daha yakın)
    pub similarity: f32,
}

// ============================================================================
// VectorStore Trait
// ============================================================================

/// Vektör deposu ortak arayüzü
///
/// İndeks artımlı güncellenmez: derlem veya model değiştiğinde
/// `rebuild` ile baştan kurulur.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// İndeksi verilen kayıtlarla baştan kur (öncekini tamamen siler)
    async fn rebuild(&self, entries: &[VectorEntry]) -> Result<usize>;

    /// En benzer parçaları getir
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>>;

    /// Kayıt sayısı
    async fn count(&self) -> Result<usize>;
}

// ============================================================================
// Utility Functions
// ============================================================================

/// Kosinüs benzerliği (-1.0 ~ 1.0)
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_same() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let a = vec![1.0, 0.0, 0.0];
        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_empty_or_mismatched() {
        let empty: Vec<f32> = vec![];
        assert_eq!(cosine_similarity(&empty, &empty), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
    }
}
