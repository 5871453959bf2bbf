pub mod generation;
pub mod llm_service;
pub mod page_fetcher;
pub mod text_extractor;

pub use generation::{GenerationBackend, StructuredGenerationClient};
pub use llm_service::LlmService;
pub use page_fetcher::{HttpPageFetcher, PageSource};
