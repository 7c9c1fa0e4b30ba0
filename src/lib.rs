//! mitos-rag - Mitoloji ansiklopedisi için RAG soru-cevap asistanı
//!
//! Derlemdeki (PDF/TXT) belgeleri temizleyip parçalara böler, Gemini
//! embedding'leriyle LanceDB indeksine yazar; soruları aynı indeksten
//! getirilen parçalara dayandırarak Gemini sohbet modeline cevaplatır.

pub mod cli;
pub mod corpus;
pub mod credentials;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod indexer;
pub mod knowledge;
pub mod llm;
pub mod text;

// Re-exports
pub use corpus::{Document, FileKind};
pub use credentials::{has_api_key, resolve_api_key, CredentialSource, EnvCredential,
    SecretsFileCredential};
pub use embedding::{EmbeddingProvider, GeminiEmbedding, DEFAULT_DIMENSION, GEMINI_EMBED_MODEL};
pub use engine::{build_context, build_prompt, AnswerEngine, EngineConfig, DEFAULT_TOP_K};
pub use error::RagError;
pub use indexer::{get_data_dir, IndexBuilder, IndexManifest, IndexReport};
pub use knowledge::{
    cosine_similarity, default_chunker, recursive_chunker, ChunkConfig, Chunker,
    LanceVectorStore, RecursiveChunker, SearchResult, VectorEntry, VectorStore,
    DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, EMBEDDING_DIMENSION,
};
pub use llm::{GeminiChat, DEFAULT_CHAT_MODEL, DEFAULT_TEMPERATURE};
pub use text::normalize;
