//! Knowledge modülü - parçalama ve vektör indeksi
//!
//! - Chunker: ayırıcı tabanlı, örtüşmeli metin parçalama
//! - Vector: parça kayıtları ve depo arayüzü
//! - Lance: LanceDB kalıcı vektör indeksi

mod chunker;
mod lance;
mod vector;

// Re-exports
pub use chunker::{
    default_chunker, recursive_chunker, ChunkConfig, Chunker, RecursiveChunker,
    DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE,
};
pub use lance::LanceVectorStore;
pub use vector::{
    cosine_similarity, SearchResult, VectorEntry, VectorStore, EMBEDDING_DIMENSION,
};
