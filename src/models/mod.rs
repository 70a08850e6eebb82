pub mod access;
pub mod views;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

pub use access::{PathStep, Scalar};

pub const MACRONUTRIENTS_KEY: &str = "estimated_macronutrients_g";

/// Nutrition estimate parsed from the model's reply.
///
/// The model may omit or mistype any key, so every field is optional or
/// carries a default. The parsed document is kept as-is for the raw view
/// and for arbitrary key-path lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct NutritionRecord {
    pub food_name: Option<String>,
    pub description: Option<String>,  // older prompt template
    pub cuisine_type: Option<String>,
    pub detailed_ingredients: Vec<String>,
    pub preparation_guess: Option<String>,
    pub estimated_serving_size_g: Option<Scalar>,
    pub estimated_calories_kcal: Option<Scalar>,
    pub macronutrients: Option<Macronutrients>,  // None when missing or not an object
    pub potential_allergens: Allergens,
    pub confidence_level: Option<String>,
    pub notes: Option<String>,
    document: Value,
}

impl NutritionRecord {
    pub fn from_object(object: Map<String, Value>) -> Self {
        let document = Value::Object(object);
        let text = |key: &str| access::lookup(&document, &[key.into()]).and_then(access::as_text);
        let scalar = |key: &str| access::lookup(&document, &[key.into()]).map(Scalar::from_value);

        let macronutrients = match access::lookup(&document, &[MACRONUTRIENTS_KEY.into()]) {
            Some(Value::Object(_)) => Some(Macronutrients {
                carbohydrates: Self::macro_scalar(&document, Macronutrient::Carbohydrates),
                protein: Self::macro_scalar(&document, Macronutrient::Protein),
                fat: Self::macro_scalar(&document, Macronutrient::Fat),
            }),
            _ => None,
        };

        Self {
            food_name: text("food_name"),
            description: text("description"),
            cuisine_type: text("cuisine_type"),
            detailed_ingredients: access::lookup(&document, &["detailed_ingredients".into()])
                .map(access::as_text_list)
                .unwrap_or_default(),
            preparation_guess: text("preparation_guess"),
            estimated_serving_size_g: scalar("estimated_serving_size_g"),
            estimated_calories_kcal: scalar("estimated_calories_kcal"),
            macronutrients,
            potential_allergens: Allergens::from_value(
                access::lookup(&document, &["potential_allergens".into()]),
            ),
            confidence_level: text("confidence_level"),
            notes: text("notes"),
            document,
        }
    }

    fn macro_scalar(document: &Value, nutrient: Macronutrient) -> Option<Scalar> {
        access::lookup(document, &[MACRONUTRIENTS_KEY.into(), nutrient.key().into()])
            .map(Scalar::from_value)
    }

    /// The parsed document exactly as the model sent it.
    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn get(&self, path: &[PathStep<'_>]) -> Option<&Value> {
        access::lookup(&self.document, path)
    }

    pub fn text_or(&self, path: &[PathStep<'_>], default: &str) -> String {
        self.get(path)
            .and_then(access::as_text)
            .unwrap_or_else(|| default.to_string())
    }

    /// Numeric lookup with string coercion; anything non-numeric yields `default`.
    pub fn number_or(&self, path: &[PathStep<'_>], default: f64) -> f64 {
        self.get(path)
            .map(Scalar::from_value)
            .and_then(|s| s.as_number())
            .unwrap_or(default)
    }
}

impl Serialize for NutritionRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.document.serialize(serializer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Macronutrient {
    Carbohydrates,
    Protein,
    Fat,
}

impl Macronutrient {
    pub const ALL: [Macronutrient; 3] = [
        Macronutrient::Carbohydrates,
        Macronutrient::Protein,
        Macronutrient::Fat,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Macronutrient::Carbohydrates => "carbohydrates",
            Macronutrient::Protein => "protein",
            Macronutrient::Fat => "fat",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Macronutrient::Carbohydrates => "Carbohydrates",
            Macronutrient::Protein => "Protein",
            Macronutrient::Fat => "Fat",
        }
    }

    /// Generic 2000 kcal reference values, for illustration only.
    pub fn reference_daily_grams(self) -> f64 {
        match self {
            Macronutrient::Carbohydrates => 275.0,
            Macronutrient::Protein => 50.0,
            Macronutrient::Fat => 78.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Macronutrients {
    pub carbohydrates: Option<Scalar>,
    pub protein: Option<Scalar>,
    pub fat: Option<Scalar>,
}

impl Macronutrients {
    pub fn get(&self, nutrient: Macronutrient) -> Option<&Scalar> {
        match nutrient {
            Macronutrient::Carbohydrates => self.carbohydrates.as_ref(),
            Macronutrient::Protein => self.protein.as_ref(),
            Macronutrient::Fat => self.fat.as_ref(),
        }
    }

    /// Grams used for charts and percentages. Missing or non-numeric is 0.
    pub fn grams(&self, nutrient: Macronutrient) -> f64 {
        self.get(nutrient).and_then(Scalar::as_number).unwrap_or(0.0)
    }
}

/// Allergens arrive either as a list or as a plain statement such as "None obvious".
#[derive(Debug, Clone, PartialEq)]
pub enum Allergens {
    List(Vec<String>),
    Statement(String),
    Unknown,
}

impl Allergens {
    fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(list @ Value::Array(_)) => {
                let items = access::as_text_list(list);
                if items.is_empty() {
                    Allergens::Unknown
                } else {
                    Allergens::List(items)
                }
            }
            Some(Value::String(s)) if !s.trim().is_empty() => Allergens::Statement(s.clone()),
            _ => Allergens::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> NutritionRecord {
        match value {
            Value::Object(map) => NutritionRecord::from_object(map),
            other => panic!("test fixture must be an object, got {}", other),
        }
    }

    #[test]
    fn test_full_record() {
        let rec = record(json!({
            "food_name": "Cheeseburger with Fries",
            "cuisine_type": "American",
            "detailed_ingredients": ["Beef Patty", "Cheese", "Bun"],
            "preparation_guess": "Grilled",
            "estimated_serving_size_g": 550,
            "estimated_calories_kcal": "950",
            "estimated_macronutrients_g": {"carbohydrates": 80, "protein": "45", "fat": 50},
            "potential_allergens": ["Gluten (Bun)", "Dairy (Cheese)"],
            "confidence_level": "Medium",
            "notes": "Estimates only."
        }));

        assert_eq!(rec.food_name.as_deref(), Some("Cheeseburger with Fries"));
        assert_eq!(rec.detailed_ingredients.len(), 3);
        assert_eq!(rec.estimated_serving_size_g, Some(Scalar::Number(550.0)));
        assert_eq!(rec.estimated_calories_kcal, Some(Scalar::Number(950.0)));

        let macros = rec.macronutrients.as_ref().unwrap();
        assert_eq!(macros.grams(Macronutrient::Protein), 45.0);
        assert_eq!(macros.grams(Macronutrient::Fat), 50.0);
        assert_eq!(
            rec.potential_allergens,
            Allergens::List(vec!["Gluten (Bun)".to_string(), "Dairy (Cheese)".to_string()])
        );
    }

    #[test]
    fn test_empty_record_defaults() {
        let rec = record(json!({}));

        assert_eq!(rec.food_name, None);
        assert!(rec.detailed_ingredients.is_empty());
        assert_eq!(rec.estimated_calories_kcal, None);
        assert_eq!(rec.macronutrients, None);
        assert_eq!(rec.potential_allergens, Allergens::Unknown);
        assert_eq!(rec.text_or(&["food_name".into()], "N/A"), "N/A");
        assert_eq!(rec.number_or(&[MACRONUTRIENTS_KEY.into(), "fat".into()], 0.0), 0.0);
        assert_eq!(rec.get(&["detailed_ingredients".into()]), None);
    }

    #[test]
    fn test_mistyped_fields_fall_back() {
        let rec = record(json!({
            "detailed_ingredients": "Pasta, Sauce",
            "estimated_macronutrients_g": "lots",
            "potential_allergens": "None obvious",
            "estimated_calories_kcal": "around 600"
        }));

        assert!(rec.detailed_ingredients.is_empty());
        assert_eq!(rec.macronutrients, None);
        assert_eq!(rec.potential_allergens, Allergens::Statement("None obvious".to_string()));
        assert_eq!(rec.estimated_calories_kcal, Some(Scalar::Text("around 600".to_string())));
        assert_eq!(rec.number_or(&["estimated_calories_kcal".into()], -1.0), -1.0);
    }

    #[test]
    fn test_non_numeric_macro_is_zero_for_math_but_kept_as_text() {
        let rec = record(json!({
            "estimated_macronutrients_g": {"carbohydrates": "unknown", "protein": 20}
        }));

        let macros = rec.macronutrients.unwrap();
        assert_eq!(macros.grams(Macronutrient::Carbohydrates), 0.0);
        assert_eq!(macros.carbohydrates, Some(Scalar::Text("unknown".to_string())));
        assert_eq!(macros.grams(Macronutrient::Fat), 0.0);
        assert_eq!(macros.fat, None);
    }

    #[test]
    fn test_reserialize_is_json_equivalent() {
        let input = json!({
            "food_name": "Pizza",
            "estimated_macronutrients_g": {"carbohydrates": 80, "protein": 20, "fat": 30},
            "potential_allergens": "None obvious",
            "extra": [1, 2, {"nested": null}]
        });

        let rec = record(input.clone());
        let text = serde_json::to_string(&rec).unwrap();
        let back: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(back, input);
    }

    #[test]
    fn test_reference_values() {
        assert_eq!(Macronutrient::Carbohydrates.reference_daily_grams(), 275.0);
        assert_eq!(Macronutrient::Protein.reference_daily_grams(), 50.0);
        assert_eq!(Macronutrient::Fat.reference_daily_grams(), 78.0);
    }
}
