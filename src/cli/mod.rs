//! CLI modülü
//!
//! mitos-rag komutları: indeks kurulumu, soru cevaplama, durum.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use crate::credentials::has_api_key;
use crate::engine::{AnswerEngine, EngineConfig, DEFAULT_TOP_K};
use crate::indexer::{
    get_data_dir, index_path, manifest_path, IndexBuilder, IndexManifest,
};
use crate::knowledge::{
    ChunkConfig, LanceVectorStore, VectorStore, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE,
};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "mitos-rag")]
#[command(version, about = "Mitoloji ansiklopedisi RAG asistanı", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Derlemden vektör indeksini (yeniden) kur
    Build {
        /// Derlem dizini (.pdf ve .txt dosyaları)
        #[arg(short, long, default_value = "data")]
        corpus: PathBuf,

        /// Parça boyutu (karakter)
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Parçalar arası örtüşme (karakter)
        #[arg(long, default_value_t = DEFAULT_CHUNK_OVERLAP)]
        overlap: usize,

        /// Veri dizini (varsayılan: ~/.mitos-rag)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// İndekse dayanarak soru cevapla
    Ask {
        /// Soru metni
        question: String,

        /// Getirilecek parça sayısı
        #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,

        /// Kullanılan parçaları da göster
        #[arg(long)]
        sources: bool,

        /// Veri dizini (varsayılan: ~/.mitos-rag)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Sistem durumunu göster
    Status {
        /// Veri dizini (varsayılan: ~/.mitos-rag)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

// ============================================================================
// CLI Runner
// ============================================================================

/// Komutu çalıştır
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Build {
            corpus,
            chunk_size,
            overlap,
            data_dir,
        } => cmd_build(corpus, chunk_size, overlap, data_dir).await,
        Commands::Ask {
            question,
            top_k,
            sources,
            data_dir,
        } => cmd_ask(&question, top_k, sources, data_dir).await,
        Commands::Status { data_dir } => cmd_status(data_dir).await,
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

/// İndeks kurulum komutu (build)
async fn cmd_build(
    corpus: PathBuf,
    chunk_size: usize,
    overlap: usize,
    data_dir: Option<PathBuf>,
) -> Result<()> {
    let data_dir = data_dir.unwrap_or_else(get_data_dir);

    if !has_api_key(&data_dir) {
        bail!(
            "API anahtarı ayarlı değil.\n\n\
             Ayarlamak için:\n  \
             export GEMINI_API_KEY=anahtariniz\n  \
             veya\n  \
             export GOOGLE_API_KEY=anahtariniz\n\n\
             Anahtar almak için: https://aistudio.google.com/app/apikey"
        );
    }

    println!("[*] Derlem okunuyor: {}", corpus.display());

    let builder = IndexBuilder::new(ChunkConfig::new(chunk_size, overlap));
    let report = builder
        .build(&corpus, &data_dir)
        .await
        .context("İndeks kurulumu başarısız")?;

    println!(
        "    Dosyalar: {} PDF, {} metin",
        report.corpus.pdf_files, report.corpus.text_files
    );
    println!(
        "[OK] İndeks oluşturuldu: {} belge, {} parça",
        report.document_count, report.chunk_count
    );
    println!("     Konum: {}", report.index_path.display());

    Ok(())
}

/// Soru cevaplama komutu (ask)
async fn cmd_ask(
    question: &str,
    top_k: usize,
    sources: bool,
    data_dir: Option<PathBuf>,
) -> Result<()> {
    let data_dir = data_dir.unwrap_or_else(get_data_dir);

    let config = EngineConfig {
        top_k,
        ..EngineConfig::default()
    };

    // Motor bir kez kurulur; indeks ve model tutamaçları yüklenir
    let engine = AnswerEngine::with_data_dir(&data_dir, config)
        .await
        .context("Cevap motoru kurulamadı")?;

    println!("[*] Soru: {}", question);

    let (answer, results) = engine
        .answer_with_sources(question)
        .await
        .context("Cevap alınamadı")?;

    if sources {
        println!("\n[*] Kullanılan parçalar ({}):\n", results.len());
        for (i, result) in results.iter().enumerate() {
            let page = if result.page > 0 {
                format!(" s.{}", result.page)
            } else {
                String::new()
            };
            println!(
                "{}. [{:.4}] {}{}: {}",
                i + 1,
                result.similarity,
                result.source,
                page,
                truncate_text(&result.chunk_text, 120)
            );
        }
    }

    println!("\n{}", answer);

    Ok(())
}

/// Durum komutu (status)
async fn cmd_status(data_dir: Option<PathBuf>) -> Result<()> {
    let data_dir = data_dir.unwrap_or_else(get_data_dir);

    println!("mitos-rag v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("[*] Veri dizini: {}", data_dir.display());

    if has_api_key(&data_dir) {
        println!("[OK] API anahtarı: ayarlı");
    } else {
        println!("[!] API anahtarı: yok");
        println!("    Ayarlamak için: export GEMINI_API_KEY=anahtariniz");
    }

    let manifest_file = manifest_path(&data_dir);
    if !manifest_file.exists() {
        println!("[!] İndeks: kurulmamış (önce `mitos-rag build` çalıştırın)");
        return Ok(());
    }

    match IndexManifest::load(&manifest_file) {
        Ok(manifest) => {
            println!(
                "[OK] İndeks: {} belge, {} parça",
                manifest.document_count, manifest.chunk_count
            );
            println!(
                "     Model: {} ({} boyut)",
                manifest.embedding_model, manifest.dimension
            );
            println!(
                "     Kurulum: {}",
                manifest.built_at.format("%Y-%m-%d %H:%M")
            );
        }
        Err(err) => {
            println!("[!] Manifest okunamadı: {}", err);
        }
    }

    // İndeksteki gerçek kayıt sayısı
    match LanceVectorStore::open_existing(&index_path(&data_dir)).await {
        Ok(store) => match store.count().await {
            Ok(count) => println!("[OK] Vektör kaydı: {}", count),
            Err(err) => tracing::debug!("Vector count failed: {}", err),
        },
        Err(err) => tracing::debug!("Vector store open failed: {}", err),
    }

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Metni kısalt (UTF-8 güvenli)
fn truncate_text(text: &str, max_chars: usize) -> String {
    let cleaned = text.replace('\n', " ").replace('\r', "");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() <= max_chars {
        cleaned.to_string()
    } else {
        let truncated: String = cleaned.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

// ============================================================================
// Tests
// ============================================================================
