//! Hata türleri
//!
//! Operatöre gösterilen üç ölümcül başlangıç hatası (boş derlem, eksik
//! indeks, eksik API anahtarı) ile indeks/model uyumsuzluğu burada
//! tanımlanır. Diğer tüm hatalar `anyhow` ile bağlam eklenerek çağırana
//! iletilir.

use std::path::PathBuf;

use thiserror::Error;

/// RAG hattının tanıdığı hata türleri
#[derive(Debug, Error)]
pub enum RagError {
    /// Derlem dizininde desteklenen dosya yok
    #[error(
        "derlem dizininde pdf veya txt bulunamadı: {}",
        .0.display()
    )]
    EmptyCorpus(PathBuf),

    /// Vektör indeksi henüz oluşturulmamış
    #[error(
        "vektör indeksi yok: {}. Önce `mitos-rag build` çalıştırın",
        .0.display()
    )]
    MissingIndex(PathBuf),

    /// Hiçbir kaynaktan API anahtarı çözülemedi
    #[error(
        "API anahtarı bulunamadı. GEMINI_API_KEY veya GOOGLE_API_KEY \
         ortam değişkenini ayarlayın ya da anahtarı {} dosyasına yazın",
        .0.display()
    )]
    MissingCredential(PathBuf),

    /// İndeks farklı bir embedding modeliyle oluşturulmuş
    #[error(
        "indeks '{index_model}' ({index_dimension} boyut) ile oluşturulmuş, \
         motor '{engine_model}' ({engine_dimension} boyut) bekliyor. \
         İndeksi `mitos-rag build` ile yeniden oluşturun"
    )]
    ModelMismatch {
        index_model: String,
        index_dimension: usize,
        engine_model: String,
        engine_dimension: usize,
    },
}

// ============================================================================
// Tests
// ============================================================================
