use anyhow::Result;
use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::normalizer;
use super::vision_service::{Analysis, VisionService};
use crate::error::AnalysisError;

pub const ANALYSIS_PROMPT: &str = r#"Analyze the food item(s) shown in this image. Provide a detailed analysis strictly in JSON format. Include the following keys:
- "food_name": The common name of the dish or primary food item(s). Be specific if possible (e.g., "Pepperoni Pizza", "Chicken Caesar Salad").
- "cuisine_type": The likely cuisine style (e.g., "Italian", "Mexican", "Indian", "American", "Undetermined").
- "detailed_ingredients": A list of visible or highly likely core ingredients (e.g., ["Pasta", "Tomato Sauce", "Ground Beef", "Parmesan Cheese"]).
- "preparation_guess": A guess at the primary preparation method (e.g., "Fried", "Baked", "Grilled", "Steamed", "Raw", "Mixed").
- "estimated_serving_size_g": An estimated serving size in grams (provide a single number, e.g., 350). Acknowledge this is an estimate.
- "estimated_calories_kcal": Estimated total calories (kcal) for the serving size (provide a single number).
- "estimated_macronutrients_g": An object containing estimated macronutrient content in grams for the serving size:
    - "carbohydrates": Estimated grams (number).
    - "protein": Estimated grams (number).
    - "fat": Estimated grams (number).
- "potential_allergens": List common potential allergens visually identifiable or highly associated with the dish (e.g., ["Dairy", "Gluten"]), or state "None obvious".
- "confidence_level": A qualitative assessment of the estimation confidence ("High", "Medium", "Low") based on image clarity, typicality, and visibility of components.
- "notes": Any important notes, such as "Nutritional values are estimates based on visual interpretation and common recipes. Actual values vary significantly based on specific ingredients, preparation, and portion size. Allergen information is indicative, not exhaustive."

Output ONLY the JSON object. Do not include ANY introductory text, explanations, markdown formatting (like ```json), or anything else outside the JSON structure.

Example Output Format:
{
  "food_name": "Cheeseburger with Fries",
  "cuisine_type": "American",
  "detailed_ingredients": ["Beef Patty", "Cheese", "Bun", "Lettuce", "Tomato", "French Fries", "Ketchup (possible)"],
  "preparation_guess": "Grilled (Patty), Fried (Fries)",
  "estimated_serving_size_g": 550,
  "estimated_calories_kcal": 950,
  "estimated_macronutrients_g": {
    "carbohydrates": 80,
    "protein": 45,
    "fat": 50
  },
  "potential_allergens": ["Gluten (Bun)", "Dairy (Cheese)", "Sesame (possible on bun)"],
  "confidence_level": "Medium",
  "notes": "Nutritional values are estimates based on visual interpretation and common recipes. Actual values vary significantly based on specific ingredients, preparation, and portion size. Allergen information is indicative, not exhaustive."
}
"#;

/// Body of one `/api/generate` call.
#[derive(Debug, Clone, Serialize)]
pub struct InferenceRequest {
    model: String,
    prompt: &'static str,
    images: Vec<String>,
    stream: bool,
    options: GenerateOptions,
    format: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct GenerateOptions {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Build the request for one image. Pure; the bytes must not be empty.
pub fn build_request(model: &str, image_bytes: &[u8]) -> Result<InferenceRequest, AnalysisError> {
    if image_bytes.is_empty() {
        return Err(AnalysisError::InternalError(
            "cannot build an inference request from empty image data".to_string(),
        ));
    }

    Ok(InferenceRequest {
        model: model.to_string(),
        prompt: ANALYSIS_PROMPT,
        images: vec![general_purpose::STANDARD.encode(image_bytes)],
        stream: false,
        options: GenerateOptions { temperature: 0.0 },
        format: "json",
    })
}

pub struct OllamaService {
    api_url: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl OllamaService {
    pub fn new(api_url: String, model: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_url,
            model,
            timeout,
            client,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Send one request and return the model's raw `response` text.
    async fn generate(&self, request: &InferenceRequest) -> Result<String, AnalysisError> {
        log::info!("🤖 Sending request to Ollama model: {}", self.model);

        let response = self
            .client
            .post(&self.api_url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify_error(e))?;

        let status = response.status();
        log::debug!("📥 Ollama response status: {}", status);

        if status == reqwest::StatusCode::NOT_FOUND {
            log::error!("❌ Model '{}' not found at {}", self.model, self.api_url);
            return Err(AnalysisError::ModelNotFound {
                model: self.model.clone(),
                url: self.api_url.clone(),
            });
        }

        if !status.is_success() {
            let error_text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("⚠️ Could not read Ollama error body: {}", e);
                    String::new()
                }
            };
            log::error!("❌ Ollama API error ({}): {}", status, error_text);
            return Err(AnalysisError::TransportError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body = response.text().await.map_err(|e| self.classify_error(e))?;
        log::debug!("📄 Raw Ollama response size: {} bytes", body.len());

        let generated: GenerateResponse = serde_json::from_str(&body).map_err(|e| {
            log::error!("❌ Unexpected Ollama response envelope: {}", e);
            AnalysisError::TransportError(format!("invalid response envelope: {}", e))
        })?;

        Ok(generated.response)
    }

    fn classify_error(&self, e: reqwest::Error) -> AnalysisError {
        if e.is_timeout() {
            log::error!("⏱️ Request to {} timed out after {:?}", self.api_url, self.timeout);
            AnalysisError::Timeout {
                timeout: self.timeout,
            }
        } else if e.is_connect() {
            log::error!("❌ Could not connect to {}: {}", self.api_url, e);
            AnalysisError::ConnectionFailure {
                url: self.api_url.clone(),
            }
        } else {
            log::error!("❌ Request to {} failed: {}", self.api_url, e);
            AnalysisError::TransportError(e.to_string())
        }
    }
}

#[async_trait::async_trait]
impl VisionService for OllamaService {
    async fn analyze_food_image(&self, image_bytes: &[u8]) -> Result<Analysis, AnalysisError> {
        log::debug!("📸 Starting image analysis: {} bytes", image_bytes.len());

        let request = build_request(&self.model, image_bytes)?;
        let raw_output = self.generate(&request).await?;
        let record = normalizer::normalize(&raw_output)?;

        log::info!(
            "✅ Analysis complete: {} ({} kcal)",
            record.text_or(&["food_name".into()], "unnamed food"),
            record.number_or(&["estimated_calories_kcal".into()], 0.0)
        );

        Ok(Analysis { record, raw_output })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
