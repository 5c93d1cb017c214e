//! Normalizes the countries payload into a uniform record sequence.
//!
//! The upstream API has shipped the country list under several different
//! envelopes over time. Each known shape is a pure extractor tried in
//! priority order; the first match wins.

use crate::country_provider::CountryRecord;
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug)]
pub enum Shape {
    Matched(Vec<CountryRecord>),
    Unmatched,
}

type Extractor = fn(&Value) -> Option<&Value>;

/// Known payload shapes, most common first.
const SHAPE_MATCHERS: &[(&str, Extractor)] = &[
    ("top-level array", |raw| raw.is_array().then_some(raw)),
    ("array under `data`", |raw| {
        raw.get("data").filter(|v| v.is_array())
    }),
    ("array under `data.countries`", |raw| {
        raw.get("data")
            .and_then(|d| d.get("countries"))
            .filter(|v| v.is_array())
    }),
];

pub fn match_shape(raw: &Value) -> Shape {
    for (shape, extract) in SHAPE_MATCHERS {
        let Some(array) = extract(raw) else {
            continue;
        };

        match serde_json::from_value::<Vec<CountryRecord>>(array.clone()) {
            Ok(records) => {
                debug!(shape, count = records.len(), "Matched countries payload shape");
                return Shape::Matched(records);
            }
            Err(error) => {
                warn!(shape, %error, "Countries array failed to deserialize");
                return Shape::Matched(Vec::new());
            }
        }
    }
    Shape::Unmatched
}

/// Returns the country records for any recognized payload shape, or an empty
/// sequence when the shape is unknown. Never an error: an unrecognized
/// payload degrades the run to "no countries found".
pub fn normalize(raw: &Value) -> Vec<CountryRecord> {
    match match_shape(raw) {
        Shape::Matched(records) => records,
        Shape::Unmatched => {
            warn!("Unrecognized countries payload shape, continuing with empty list");
            Vec::new()
        }
    }
}
