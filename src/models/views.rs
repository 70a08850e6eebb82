use serde::Serialize;
use serde_json::Value;

use super::Macronutrient;

pub const NOT_AVAILABLE: &str = "N/A";

/// Everything the display surface needs for one successful analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderModel {
    pub summary: SummaryView,
    pub nutrients: NutrientView,
    pub details: DetailsView,
    pub raw: RawView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryView {
    pub food_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub cuisine_type: String,
    pub serving_size: String,
    pub confidence_level: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientView {
    pub calories: String,
    pub macronutrients: MacroSection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MacroSection {
    Breakdown(MacroBreakdown),
    Unavailable { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroBreakdown {
    pub entries: Vec<MacroEntry>,
    pub chart: Option<MacroChart>,
    pub disclaimer: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroEntry {
    pub nutrient: Macronutrient,
    pub label: &'static str,
    /// Raw value when the model sent text, grams otherwise.
    pub display: String,
    pub grams: f64,
    pub daily_value_percent: f64,
    pub daily_value_text: String,
    /// `daily_value_percent` truncated and clamped to 0..=100.
    pub progress: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroChart {
    pub title: &'static str,
    pub slices: Vec<ChartSlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSlice {
    pub nutrient: Macronutrient,
    pub label: &'static str,
    pub grams: f64,
    pub share_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailsView {
    pub ingredients: ItemList,
    pub preparation_guess: String,
    pub allergens: ItemList,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergen_disclaimer: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ItemList {
    Items(Vec<String>),
    Text(String),
    Empty(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawView {
    pub record: Value,
    pub raw_output: String,
}
