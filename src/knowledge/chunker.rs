//! Metin parçalama modülü
//!
//! Belge metnini azalan ayırıcı sırasıyla (paragraf, satır, cümle,
//! kelime) özyinelemeli bölerek hedef boyuta yakın, örtüşmeli parçalar
//! üretir. Ardışık parçalar arasındaki örtüşme bağlam sürekliliğini
//! korur.

// ============================================================================
// Chunk Configuration
// ============================================================================

/// Varsayılan parça boyutu (karakter)
pub const DEFAULT_CHUNK_SIZE: usize = 900;
/// Varsayılan örtüşme (karakter)
pub const DEFAULT_CHUNK_OVERLAP: usize = 150;

/// Parçalama ayarları
///
/// `overlap` her zaman `chunk_size`dan küçük olmalıdır. Bir parça
/// en fazla `chunk_size + overlap` karaktere ulaşabilir (örtüşme
/// tohumu kadar tolerans).
#[derive(Debug, Clone, Copy)]
pub struct ChunkConfig {
    /// Hedef parça boyutu (karakter)
    pub chunk_size: usize,
    /// Ardışık parçalar arası örtüşme (karakter)
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl ChunkConfig {
    /// Ayarlarla oluştur
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size.saturating_sub(1)),
        }
    }
}

// ============================================================================
// Chunker Trait
// ============================================================================

/// Metin parçalama stratejisi
pub trait Chunker: Send + Sync {
    /// Metni parçalara böl
    fn chunk(&self, text: &str) -> Vec<String>;

    /// Parçalayıcı adı
    fn name(&self) -> &'static str;
}

// ============================================================================
// RecursiveChunker
// ============================================================================

/// Azalan ayırıcı listesi: paragraf, satır, cümle, kelime
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Özyinelemeli ayırıcı tabanlı parçalayıcı
///
/// Metni önce paragraf sınırlarından böler; hedef boyutu aşan
/// bölümler sırasıyla satır, cümle ve kelime sınırlarından bölünür.
/// Hiçbir ayırıcı işe yaramazsa karakter sınırından kesilir.
pub struct RecursiveChunker {
    config: ChunkConfig,
}

impl RecursiveChunker {
    /// Ayarlarla oluştur
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    /// Varsayılan ayarlarla oluştur (900/150)
    pub fn with_defaults() -> Self {
        Self::new(ChunkConfig::default())
    }

    /// Metni hedef boyutu aşmayan birimlere böl
    ///
    /// Ayırıcı birimlerin sonunda korunur; birimler birleştirildiğinde
    /// özgün metin elde edilir.
    fn split_units(&self, text: &str, separators: &[&str]) -> Vec<String> {
        if text.len() <= self.config.chunk_size {
            return vec![text.to_string()];
        }

        let Some((sep, rest)) = separators.split_first() else {
            // Ayırıcı kalmadı: karakter sınırından kes
            return self.hard_split(text);
        };

        let mut units = Vec::new();
        for piece in text.split_inclusive(sep) {
            if piece.len() <= self.config.chunk_size {
                units.push(piece.to_string());
            } else {
                units.extend(self.split_units(piece, rest));
            }
        }
        units
    }

    /// UTF-8 sınırlarına saygılı sabit boyutlu kesim
    fn hard_split(&self, text: &str) -> Vec<String> {
        let mut units = Vec::new();
        let mut rest = text;
        while rest.len() > self.config.chunk_size {
            let cut = floor_char_boundary(rest, self.config.chunk_size);
            units.push(rest[..cut].to_string());
            rest = &rest[cut..];
        }
        if !rest.is_empty() {
            units.push(rest.to_string());
        }
        units
    }

    /// Birimleri hedef boyuta kadar biriktirip örtüşmeli parçalar üret
    ///
    /// Yeni parça, bir önceki parçanın son `overlap` karakteriyle
    /// tohumlanır; böylece her ardışık çift aynı metni paylaşır.
    fn assemble(&self, units: Vec<String>) -> Vec<String> {
        let mut chunks: Vec<String> = Vec::new();
        let mut current = String::new();
        // current'ın başındaki tohumun uzunluğu; tohumdan ibaret bir
        // parçayı kapatmak sonsuz döngüye girerdi
        let mut seed_len = 0usize;

        for unit in units {
            if current.len() > seed_len
                && current.len() + unit.len() > self.config.chunk_size
            {
                let seed = overlap_tail(&current, self.config.overlap).to_string();
                push_chunk(&mut chunks, current);
                seed_len = seed.len();
                current = seed;
            }
            current.push_str(&unit);
        }

        // Yalnızca tohumdan ibaret kalan son parça atılır
        if current.len() > seed_len {
            push_chunk(&mut chunks, current);
        }

        chunks
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return vec![];
        }

        let units = self.split_units(text, &SEPARATORS);
        self.assemble(units)
    }

    fn name(&self) -> &'static str {
        "RecursiveChunker"
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Boş olmayan parçayı listeye ekle
fn push_chunk(chunks: &mut Vec<String>, chunk: String) {
    if !chunk.trim().is_empty() {
        chunks.push(chunk);
    }
}

/// Parçanın son `overlap` karakteri (UTF-8 sınırı gözetilir)
fn overlap_tail(s: &str, overlap: usize) -> &str {
    let start = floor_char_boundary(s, s.len().saturating_sub(overlap));
    &s[start..]
}

/// UTF-8 sınır düzeltmesi (indeks ve altı)
#[inline]
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        i
    }
}

// ============================================================================
// Factory Functions
// ============================================================================

/// Varsayılan parçalayıcı
pub fn default_chunker() -> Box<dyn Chunker> {
    Box::new(RecursiveChunker::with_defaults())
}

/// Ayarlı parçalayıcı
pub fn recursive_chunker(config: ChunkConfig) -> Box<dyn Chunker> {
    Box::new(RecursiveChunker::new(config))
}

// ============================================================================
// Tests
// ============================================================================
