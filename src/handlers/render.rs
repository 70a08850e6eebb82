use crate::models::access::format_number;
use crate::models::views::{
    ChartSlice, DetailsView, ItemList, MacroBreakdown, MacroChart, MacroEntry, MacroSection,
    NutrientView, RawView, RenderModel, SummaryView, NOT_AVAILABLE,
};
use crate::models::{Allergens, Macronutrient, Macronutrients, NutritionRecord, Scalar};

pub const DAILY_VALUE_DISCLAIMER: &str = "These percentages are based on generic 2000 kcal daily values \
     (Carbs: 275g, Protein: 50g, Fat: 78g) for illustration only. Individual needs vary significantly. \
     This is not dietary advice.";
pub const ALLERGEN_DISCLAIMER: &str = "Allergen list is based on visual cues & typical recipes. \
     It's not exhaustive and doesn't account for cross-contamination. Always verify if you have allergies.";
pub const NO_INGREDIENTS: &str = "No specific ingredients listed or data unavailable.";
pub const NO_ALLERGENS: &str = "No obvious potential allergens identified visually or data unavailable.";
pub const NO_MACROS: &str = "Macronutrient data is missing or not in the expected format.";
pub const CHART_TITLE: &str = "Estimated Macronutrient Distribution (grams)";

pub fn build_render_model(record: &NutritionRecord, raw_output: &str) -> RenderModel {
    RenderModel {
        summary: summary_view(record),
        nutrients: nutrient_view(record),
        details: details_view(record),
        raw: RawView {
            record: record.document().clone(),
            raw_output: raw_output.to_string(),
        },
    }
}

fn or_not_available(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn summary_view(record: &NutritionRecord) -> SummaryView {
    SummaryView {
        food_name: or_not_available(&record.food_name),
        description: record.description.clone(),
        cuisine_type: or_not_available(&record.cuisine_type),
        serving_size: record
            .estimated_serving_size_g
            .as_ref()
            .map(|size| format!("{} g", size))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        confidence_level: or_not_available(&record.confidence_level),
        notes: or_not_available(&record.notes),
    }
}

pub fn nutrient_view(record: &NutritionRecord) -> NutrientView {
    let calories = match record.estimated_calories_kcal.as_ref().and_then(Scalar::as_number) {
        Some(kcal) => format!("{} kcal", format_number(kcal)),
        None => NOT_AVAILABLE.to_string(),
    };

    let macronutrients = match &record.macronutrients {
        Some(macros) => MacroSection::Breakdown(MacroBreakdown {
            entries: Macronutrient::ALL
                .iter()
                .map(|&nutrient| macro_entry(macros, nutrient))
                .collect(),
            chart: macro_chart(macros),
            disclaimer: DAILY_VALUE_DISCLAIMER,
        }),
        None => MacroSection::Unavailable {
            message: NO_MACROS.to_string(),
        },
    };

    NutrientView {
        calories,
        macronutrients,
    }
}

/// `grams / reference * 100`, unclamped.
pub fn daily_value_percent(nutrient: Macronutrient, grams: f64) -> f64 {
    grams / nutrient.reference_daily_grams() * 100.0
}

/// Progress-bar value: truncated to a whole percent and clamped to 0..=100.
pub fn progress_value(percent: f64) -> u8 {
    percent.clamp(0.0, 100.0) as u8
}

fn macro_entry(macros: &Macronutrients, nutrient: Macronutrient) -> MacroEntry {
    let grams = macros.grams(nutrient);
    let percent = daily_value_percent(nutrient, grams);

    // non-numeric values count as zero here but are still shown as sent
    let display = match macros.get(nutrient) {
        Some(Scalar::Text(raw)) => raw.clone(),
        _ => format!("{} g", format_number(grams)),
    };

    MacroEntry {
        nutrient,
        label: nutrient.label(),
        display,
        grams,
        daily_value_percent: percent,
        daily_value_text: format!("{:.1}%", percent),
        progress: progress_value(percent),
    }
}

/// Pie chart data, or `None` when no macro has a positive amount.
pub fn macro_chart(macros: &Macronutrients) -> Option<MacroChart> {
    let present: Vec<(Macronutrient, f64)> = Macronutrient::ALL
        .iter()
        .map(|&nutrient| (nutrient, macros.grams(nutrient)))
        .filter(|(_, grams)| *grams > 0.0)
        .collect();

    if present.is_empty() {
        return None;
    }

    let total: f64 = present.iter().map(|(_, grams)| grams).sum();
    let slices = present
        .into_iter()
        .map(|(nutrient, grams)| ChartSlice {
            nutrient,
            label: nutrient.label(),
            grams,
            share_percent: grams / total * 100.0,
        })
        .collect();

    Some(MacroChart {
        title: CHART_TITLE,
        slices,
    })
}

pub fn details_view(record: &NutritionRecord) -> DetailsView {
    let ingredients = if record.detailed_ingredients.is_empty() {
        ItemList::Empty(NO_INGREDIENTS)
    } else {
        ItemList::Items(record.detailed_ingredients.clone())
    };

    let (allergens, allergen_disclaimer) = match &record.potential_allergens {
        Allergens::List(items) => (ItemList::Items(items.clone()), Some(ALLERGEN_DISCLAIMER)),
        Allergens::Statement(text) => (ItemList::Text(text.clone()), None),
        Allergens::Unknown => (ItemList::Empty(NO_ALLERGENS), None),
    };

    DetailsView {
        ingredients,
        preparation_guess: or_not_available(&record.preparation_guess),
        allergens,
        allergen_disclaimer,
    }
}
