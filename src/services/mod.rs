pub mod normalizer;
pub mod ollama; // Ollama /api/generate client
pub mod vision_service;

pub use ollama::OllamaService;
pub use vision_service::{Analysis, VisionService};
