//! Defensive decoding of untyped candidate JSON
//!
//! Every field gets a type and presence default, so the rest of the
//! pipeline only ever sees fully populated candidates.

use crate::types::{
    CandidateBundle, CompoundCandidate, PaperCandidate, StepCandidate, SynthesisRouteCandidate,
};
use chrono::{Datelike, Utc};
use serde_json::{Map, Value};

/// Title used when the model supplies none
pub const TITLE_SENTINEL: &str = "Unable to extract";

/// Turns raw JSON into a `CandidateBundle`
///
/// The year used for missing or invalid years is captured on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    current_year: i32,
}

impl Normalizer {
    /// Create a normalizer using today's year
    pub fn new() -> Self {
        Self::with_year(Utc::now().year())
    }

    /// Create a normalizer with a fixed fallback year
    pub fn with_year(current_year: i32) -> Self {
        Self { current_year }
    }

    /// Fallback year
    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    /// The bundle used when extraction produced nothing usable
    pub fn skeleton(&self) -> CandidateBundle {
        self.normalize(&Value::Null)
    }

    /// Decode `raw`; never fails
    pub fn normalize(&self, raw: &Value) -> CandidateBundle {
        let empty = Map::new();
        let root = raw.as_object().unwrap_or(&empty);

        let paper = root
            .get("paper")
            .and_then(Value::as_object)
            .map(|obj| self.paper(obj))
            .unwrap_or_else(|| self.paper(&empty));

        let compounds = objects(root.get("compounds")).map(compound).collect();

        let synthesis_routes = objects(root.get("synthesisRoutes")).map(route).collect();

        CandidateBundle {
            paper,
            compounds,
            synthesis_routes,
        }
    }

    fn paper(&self, obj: &Map<String, Value>) -> PaperCandidate {
        let title = match obj.get("title").and_then(Value::as_str) {
            Some(title) if !title.trim().is_empty() => title.to_string(),
            _ => TITLE_SENTINEL.to_string(),
        };

        PaperCandidate {
            title,
            authors: string_list(obj, "authors"),
            abstract_text: string_field(obj, "abstract"),
            journal: string_field(obj, "journal"),
            year: obj.get("year").and_then(year_value).unwrap_or(self.current_year),
            keywords: string_list(obj, "keywords"),
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn compound(obj: &Map<String, Value>) -> CompoundCandidate {
    let possible_smiles = ["possibleSMILES", "possibleSmiles", "smiles"]
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string();

    CompoundCandidate {
        name: string_field(obj, "name"),
        category: string_field(obj, "category"),
        description: string_field(obj, "description"),
        possible_smiles,
        bioactivity: string_list(obj, "bioactivity"),
        tags: string_list(obj, "tags"),
    }
}

fn route(obj: &Map<String, Value>) -> SynthesisRouteCandidate {
    let steps = objects(obj.get("steps"))
        .enumerate()
        .map(|(idx, step_obj)| step(step_obj, idx as u32 + 1))
        .collect();

    SynthesisRouteCandidate {
        name: string_field(obj, "name"),
        steps,
        notes: string_field(obj, "notes"),
    }
}

fn step(obj: &Map<String, Value>, position: u32) -> StepCandidate {
    StepCandidate {
        step_number: obj.get("stepNumber").and_then(step_number).unwrap_or(position),
        from: string_field(obj, "from"),
        to: string_field(obj, "to"),
        reagent: string_field(obj, "reagent"),
        conditions: string_field(obj, "conditions"),
        description: string_field(obj, "description"),
    }
}

/// Object elements of an array value; anything else yields nothing
fn objects(value: Option<&Value>) -> impl Iterator<Item = &Map<String, Value>> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

fn string_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn string_list(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn year_value(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i32::try_from(i).ok()
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .map(f64::trunc)
                    .filter(|f| *f >= i32::MIN as f64 && *f <= i32::MAX as f64)
                    .map(|f| f as i32)
            }
        }
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}

fn step_number(value: &Value) -> Option<u32> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(u) = n.as_u64() {
        return u32::try_from(u).ok();
    }
    n.as_f64()
        .filter(|f| f.is_finite() && *f >= 0.0 && *f <= u32::MAX as f64)
        .map(|f| f.trunc() as u32)
}
