//! Derlem yükleme modülü
//!
//! Derlem dizinini özyinelemesiz tarar ve desteklenen dosyalardan
//! (.pdf, .txt) belge metinlerini çıkarır. PDF'ler sayfa başına bir
//! belge üretir; metin dosyaları UTF-8 olarak tek belge okunur.

pub mod pdf;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::RagError;

// ============================================================================
// File Types
// ============================================================================

/// Desteklenen derlem dosya türleri
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// PDF dosyası (sayfa sayfa çıkarılır)
    Pdf,
    /// Düz metin dosyası (UTF-8)
    Text,
}

impl FileKind {
    /// Uzantıdan dosya türü belirle
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(FileKind::Pdf),
            "txt" => Some(FileKind::Text),
            _ => None,
        }
    }

    /// Dosya yolundan tür belirle
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

// ============================================================================
// Document
// ============================================================================

/// Derlemden okunan ham belge
///
/// Parçalama sonrası atılır; parçalar kaynak bilgisini devralır.
#[derive(Debug, Clone)]
pub struct Document {
    /// Kaynak dosya adı
    pub source: String,
    /// PDF sayfa numarası (1'den başlar; metin dosyasında yok)
    pub page: Option<usize>,
    /// Ham metin
    pub text: String,
}

/// Derlem taraması istatistikleri
#[derive(Debug, Default)]
pub struct CorpusStats {
    pub pdf_files: usize,
    pub text_files: usize,
    pub total_files: usize,
}

impl CorpusStats {
    /// Taranan dosya listesinden istatistik çıkar
    pub fn from_files(files: &[(PathBuf, FileKind)]) -> Self {
        let mut stats = Self::default();
        for (_, kind) in files {
            stats.total_files += 1;
            match kind {
                FileKind::Pdf => stats.pdf_files += 1,
                FileKind::Text => stats.text_files += 1,
            }
        }
        stats
    }
}

// ============================================================================
// Corpus Loading
// ============================================================================

/// Derlem dizinini tara
///
/// Yalnızca dizinin kendi içine bakar (alt dizinlere inmez);
/// desteklenmeyen uzantılar sessizce atlanır. Sonuç deterministik
/// olması için yol sırasına göre sıralanır.
///
/// Hiç uygun dosya yoksa `RagError::EmptyCorpus` döner.
pub fn scan_corpus(dir: &Path) -> Result<Vec<(PathBuf, FileKind)>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read corpus directory: {:?}", dir))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.context("Failed to read directory entry")?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        if let Some(kind) = FileKind::from_path(&path) {
            files.push((path, kind));
        }
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));

    if files.is_empty() {
        return Err(RagError::EmptyCorpus(dir.to_path_buf()).into());
    }

    tracing::info!("Collected {} corpus files from {:?}", files.len(), dir);
    Ok(files)
}

/// Derlemdeki tüm belgeleri yükle
///
/// PDF çıkarımı CPU yoğun olduğundan `spawn_blocking` altında çalışır.
pub async fn load_corpus(dir: &Path) -> Result<Vec<Document>> {
    let files = scan_corpus(dir)?;
    let mut documents = Vec::new();

    for (path, kind) in files {
        let source = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("unknown")
            .to_string();

        match kind {
            FileKind::Text => {
                let text = tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read text file: {:?}", path))?;

                documents.push(Document {
                    source,
                    page: None,
                    text,
                });
            }
            FileKind::Pdf => {
                let pdf_path = path.clone();
                let pages =
                    tokio::task::spawn_blocking(move || pdf::extract_text_from_pdf(&pdf_path))
                        .await
                        .context("PDF extraction task failed")??;

                for (page, text) in pages {
                    documents.push(Document {
                        source: source.clone(),
                        page: Some(page),
                        text,
                    });
                }
            }
        }
    }

    Ok(documents)
}

// ============================================================================
// Tests
// ============================================================================
