mod chunker;
mod embedding;
mod uploader;
mod vector_store;

pub use chunker::{BOUNDARY_SEARCH_WINDOW, TextChunker};
pub use embedding::{EMBEDDING_DIM, EmbeddingClient, InputType};
pub use uploader::{
    DEFAULT_EXTENSIONS, DirectorySummary, FailedFile, UploadReceipt, UploadedFile, Uploader,
};
pub use vector_store::{IndexStats, VectorRecord, VectorStoreClient};
