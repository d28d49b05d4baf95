//! Traveler roster resolution.
//!
//! Trips that never had explicit traveler records still carry a roster in
//! their generated metadata under `generated_content.travelers`. Entries
//! there are either bare names or objects with a `name` and optional `id`.

use crate::error::{EngineError, Result};
use crate::traveler::Traveler;
use indexmap::IndexMap;
use log::{debug, warn};
use serde_json::Value;

/// Picks the roster the engine should split costs among.
///
/// Explicit travelers win whenever there is at least one. Otherwise the
/// roster is read from trip metadata, if any.
pub fn resolve_roster(explicit: Vec<Traveler>, metadata: Option<&Value>) -> Result<Vec<Traveler>> {
    if !explicit.is_empty() {
        return Ok(explicit);
    }

    match metadata {
        Some(metadata) => {
            let travelers = travelers_from_metadata(metadata)?;
            debug!("Resolved {} travelers from trip metadata", travelers.len());
            Ok(travelers)
        }
        None => Ok(Vec::new()),
    }
}

/// Reads `generated_content.travelers` out of trip metadata.
///
/// A missing path yields an empty roster. A path that holds something other
/// than an array is an error. Duplicate ids keep their first occurrence.
pub fn travelers_from_metadata(metadata: &Value) -> Result<Vec<Traveler>> {
    let Some(entries) = metadata.pointer("/generated_content/travelers") else {
        return Ok(Vec::new());
    };

    let entries = match entries {
        Value::Null => return Ok(Vec::new()),
        Value::Array(entries) => entries,
        other => {
            return Err(EngineError::InvalidMetadata(format!(
                "generated_content.travelers must be an array, found {}",
                kind(other)
            )))
        }
    };

    let mut roster: IndexMap<String, Traveler> = IndexMap::new();
    for (idx, entry) in entries.iter().enumerate() {
        let Some(traveler) = parse_entry(entry) else {
            warn!("Skipping unusable traveler entry {} in trip metadata", idx);
            continue;
        };
        let key = traveler.id.as_str().to_string();
        if roster.contains_key(&key) {
            warn!("Duplicate traveler {} in trip metadata, ignoring", key);
            continue;
        }
        roster.insert(key, traveler);
    }

    Ok(roster.into_values().collect())
}

fn parse_entry(entry: &Value) -> Option<Traveler> {
    match entry {
        Value::String(name) => {
            let name = name.trim();
            (!name.is_empty()).then(|| Traveler::new(name, name))
        }
        Value::Object(fields) => {
            let name = fields
                .get("name")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|n| !n.is_empty());
            let id = fields.get("id").and_then(|id| match id {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });

            match (id, name) {
                (Some(id), Some(name)) => Some(Traveler::new(id, name)),
                (Some(id), None) => Some(Traveler::new(id.clone(), id)),
                (None, Some(name)) => Some(Traveler::new(name, name)),
                (None, None) => None,
            }
        }
        _ => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_explicit_travelers_win() {
        let explicit = vec![Traveler::new("t1", "Ana")];
        let metadata = json!({"generated_content": {"travelers": ["Ben"]}});

        let roster = resolve_roster(explicit.clone(), Some(&metadata)).unwrap();
        assert_eq!(roster, explicit);
    }

    #[test]
    fn test_falls_back_to_metadata() {
        let metadata = json!({
            "generated_content": {
                "travelers": [
                    "Ana",
                    {"name": "Ben", "id": "t2"},
                    {"id": 7},
                    {"name": "  "},
                    42,
                    "Ana"
                ]
            }
        });

        let roster = resolve_roster(Vec::new(), Some(&metadata)).unwrap();
        assert_eq!(
            roster,
            vec![
                Traveler::new("Ana", "Ana"),
                Traveler::new("t2", "Ben"),
                Traveler::new("7", "7"),
            ]
        );
    }

    #[test]
    fn test_missing_metadata_roster_is_empty() {
        assert!(resolve_roster(Vec::new(), None).unwrap().is_empty());

        let metadata = json!({"generated_content": {"days": []}});
        assert!(travelers_from_metadata(&metadata).unwrap().is_empty());

        let metadata = json!({"generated_content": {"travelers": null}});
        assert!(travelers_from_metadata(&metadata).unwrap().is_empty());
    }

    #[test]
    fn test_non_array_roster_is_an_error() {
        let metadata = json!({"generated_content": {"travelers": "Ana, Ben"}});
        assert!(matches!(
            travelers_from_metadata(&metadata),
            Err(EngineError::InvalidMetadata(_))
        ));
    }
}
