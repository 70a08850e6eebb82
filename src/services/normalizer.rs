use serde_json::Value;

use crate::error::AnalysisError;
use crate::models::NutritionRecord;

/// Best-effort cut of a JSON object out of noisy model text.
///
/// Drops a surrounding ```` ```json ```` / ```` ``` ```` fence, then takes
/// everything from the first `{` to the last `}`. When no such span exists
/// the trimmed text itself is the candidate.
pub fn extract_json_candidate(text: &str) -> &str {
    let mut candidate = text.trim();

    if let Some(rest) = candidate.strip_prefix("```") {
        candidate = rest
            .strip_prefix("json")
            .or_else(|| rest.strip_prefix("JSON"))
            .unwrap_or(rest);
    }
    if let Some(rest) = candidate.strip_suffix("```") {
        candidate = rest;
    }
    candidate = candidate.trim();

    match (candidate.find('{'), candidate.rfind('}')) {
        (Some(start), Some(end)) if start < end => &candidate[start..=end],
        _ => candidate,
    }
}

/// Turn the model's raw reply into a [`NutritionRecord`].
pub fn normalize(raw_output: &str) -> Result<NutritionRecord, AnalysisError> {
    let trimmed = raw_output.trim();
    if trimmed.is_empty() {
        log::error!("❌ Model returned an empty response");
        return Err(AnalysisError::EmptyResponse);
    }

    let candidate = extract_json_candidate(trimmed);
    log::debug!("🔎 JSON candidate: {} of {} bytes", candidate.len(), trimmed.len());

    let parsed: Value = serde_json::from_str(candidate).map_err(|e| {
        log::error!("❌ JSON parsing error: {}", e);
        AnalysisError::MalformedJson {
            message: e.to_string(),
            raw_output: raw_output.to_string(),
        }
    })?;

    match parsed {
        Value::Object(object) => Ok(NutritionRecord::from_object(object)),
        other => {
            log::warn!("⚠️ Model returned JSON that is not an object: {}", other);
            Err(AnalysisError::MalformedJson {
                message: "expected a JSON object".to_string(),
                raw_output: raw_output.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Allergens;
    use serde_json::json;

    #[test]
    fn test_extract_from_fence() {
        let text = "```json\n{\"food_name\":\"Pizza\"}\n```";
        assert_eq!(extract_json_candidate(text), "{\"food_name\":\"Pizza\"}");
    }

    #[test]
    fn test_extract_from_bare_fence_with_prose() {
        let text = "Here you go:\n```\n{\"a\": {\"b\": 1}}\n```\nEnjoy!";
        assert_eq!(extract_json_candidate(text), "{\"a\": {\"b\": 1}}");
    }

    #[test]
    fn test_extract_without_braces_returns_trimmed_text() {
        assert_eq!(extract_json_candidate("  not json at all \n"), "not json at all");
        assert_eq!(extract_json_candidate("} backwards {"), "} backwards {");
    }

    #[test]
    fn test_normalize_fenced_pizza() {
        let raw = "```json\n{\"food_name\":\"Pizza\",\"estimated_macronutrients_g\":{\"carbohydrates\":80,\"protein\":20,\"fat\":30}}\n```";
        let record = normalize(raw).unwrap();

        assert_eq!(record.food_name.as_deref(), Some("Pizza"));
        assert!(record.macronutrients.is_some());
    }

    #[test]
    fn test_normalize_embedded_in_prose() {
        let payloads = [
            json!({}),
            json!({"food_name": "Salad", "detailed_ingredients": ["Lettuce", "Tomato"]}),
            json!({"notes": "braces } inside { strings", "estimated_calories_kcal": 320}),
        ];

        for payload in payloads {
            let raw = format!("Sure, here it is: {}\nHope this helps.", payload);
            let record = normalize(&raw).unwrap();
            assert_eq!(record.document(), &payload);
        }
    }

    #[test]
    fn test_normalize_empty_object_defaults() {
        let record = normalize("Sure, here it is: {}").unwrap();

        assert_eq!(record.food_name, None);
        assert!(record.detailed_ingredients.is_empty());
        assert_eq!(record.potential_allergens, Allergens::Unknown);
    }

    #[test]
    fn test_normalize_empty_response() {
        assert_eq!(normalize(""), Err(AnalysisError::EmptyResponse));
        assert_eq!(normalize("   \n"), Err(AnalysisError::EmptyResponse));
    }

    #[test]
    fn test_normalize_not_json_keeps_raw() {
        match normalize("not json at all") {
            Err(AnalysisError::MalformedJson { raw_output, .. }) => {
                assert_eq!(raw_output, "not json at all");
            }
            other => panic!("expected MalformedJson, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_rejects_non_object() {
        assert!(matches!(
            normalize("[1, 2, 3]"),
            Err(AnalysisError::MalformedJson { .. })
        ));
    }
}
