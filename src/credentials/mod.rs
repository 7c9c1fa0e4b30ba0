//! API anahtarı çözümleme
//!
//! Anahtar, sıralı bir sağlayıcı zincirinden çözülür: önce ortam
//! değişkenleri, sonra uygulama düzeyindeki secrets dosyası. İlk boş
//! olmayan değer kazanır. Hiçbir kaynak değer vermezse
//! `RagError::MissingCredential` döner; ağ çağrısı yapılmaz.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::RagError;

/// Birincil ortam değişkeni
pub const ENV_GEMINI_KEY: &str = "GEMINI_API_KEY";
/// İkincil ortam değişkeni
pub const ENV_GOOGLE_KEY: &str = "GOOGLE_API_KEY";
/// Veri dizinindeki secrets dosyası adı
pub const SECRETS_FILE: &str = "secrets.json";

// ============================================================================
// CredentialSource Trait
// ============================================================================

/// Tek bir anahtar kaynağı
pub trait CredentialSource: Send + Sync {
    /// Anahtarı çözmeyi dene; boş değer yok sayılır
    fn resolve(&self) -> Option<String>;

    /// Kaynak adı (log için)
    fn name(&self) -> String;
}

// ============================================================================
// Providers
// ============================================================================

/// Ortam değişkeni kaynağı
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialSource for EnvCredential {
    fn resolve(&self) -> Option<String> {
        std::env::var(&self.var).ok().filter(|key| !key.is_empty())
    }

    fn name(&self) -> String {
        format!("env:{}", self.var)
    }
}

/// Secrets dosyası kaynağı
///
/// JSON sözlük biçiminde: `{"GOOGLE_API_KEY": "..."}`.
/// `GOOGLE_API_KEY` ve `GEMINI_API_KEY` anahtarları denenir.
pub struct SecretsFileCredential {
    path: PathBuf,
}

impl SecretsFileCredential {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CredentialSource for SecretsFileCredential {
    fn resolve(&self) -> Option<String> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        let secrets: HashMap<String, String> = match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(err) => {
                tracing::warn!("Malformed secrets file {:?}: {}", self.path, err);
                return None;
            }
        };

        [ENV_GOOGLE_KEY, ENV_GEMINI_KEY]
            .iter()
            .find_map(|key| secrets.get(*key))
            .filter(|key| !key.is_empty())
            .cloned()
    }

    fn name(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Varsayılan kaynak zinciri
///
/// Sıra: GEMINI_API_KEY, GOOGLE_API_KEY, `<veri dizini>/secrets.json`.
pub fn default_chain(data_dir: &Path) -> Vec<Box<dyn CredentialSource>> {
    vec![
        Box::new(EnvCredential::new(ENV_GEMINI_KEY)),
        Box::new(EnvCredential::new(ENV_GOOGLE_KEY)),
        Box::new(SecretsFileCredential::new(data_dir.join(SECRETS_FILE))),
    ]
}

/// Zincirden ilk boş olmayan anahtarı çöz
pub fn resolve_from(sources: &[Box<dyn CredentialSource>]) -> Option<String> {
    for source in sources {
        if let Some(key) = source.resolve() {
            tracing::debug!("Using API key from {}", source.name());
            return Some(key);
        }
    }
    None
}

/// Varsayılan zincirden API anahtarı çöz
pub fn resolve_api_key(data_dir: &Path) -> Result<String, RagError> {
    resolve_from(&default_chain(data_dir))
        .ok_or_else(|| RagError::MissingCredential(data_dir.join(SECRETS_FILE)))
}

/// Herhangi bir kaynakta anahtar var mı
pub fn has_api_key(data_dir: &Path) -> bool {
    resolve_api_key(data_dir).is_ok()
}

// ============================================================================
// Tests
// ============================================================================
