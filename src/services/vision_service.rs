use crate::error::AnalysisError;
use crate::models::NutritionRecord;

/// A finished analysis: the normalized record plus the reply it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub record: NutritionRecord,
    pub raw_output: String,
}

/// Trait for vision model backends (Ollama, test doubles, ...)
#[async_trait::async_trait]
pub trait VisionService: Send + Sync {
    async fn analyze_food_image(&self, image_bytes: &[u8]) -> Result<Analysis, AnalysisError>;
    fn model(&self) -> &str;
}
