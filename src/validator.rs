//! PDL shape validation
//!
//! Every rule runs independently and appends to one defect list, so a single
//! pass reports everything wrong with a document. Nothing here fails: an empty
//! list means the document is accepted downstream.
//!
//! # Rules
//!
//! - `scenario` is a mapping with a non-blank string `id`
//! - `entities` is a non-empty list of mappings with unique non-blank string ids
//! - `events`, when present and not null, is a list following the entity rules
//!
//! Entity ids and event ids are tracked separately, so the same id may appear
//! once in each.

use std::collections::HashSet;

use serde_yaml::Value;

use crate::document::PdlDocument;

// =============================================================================
// ID COLLECTIONS
// =============================================================================

/// The two id-bearing lists of a PDL document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdCollection {
    Entities,
    Events,
}

impl IdCollection {
    fn key(self) -> &'static str {
        match self {
            IdCollection::Entities => "entities",
            IdCollection::Events => "events",
        }
    }

    fn singular(self) -> &'static str {
        match self {
            IdCollection::Entities => "entity",
            IdCollection::Events => "event",
        }
    }
}

// =============================================================================
// VALIDATOR
// =============================================================================

/// Validate a loaded PDL document, returning every defect in detection order.
pub fn validate_pdl_document(document: &PdlDocument) -> Vec<String> {
    let mut defects = Vec::new();

    check_scenario(document, &mut defects);
    check_entities(document, &mut defects);
    check_events(document, &mut defects);

    defects
}

fn check_scenario(document: &PdlDocument, defects: &mut Vec<String>) {
    let Some(scenario) = document.scenario() else {
        defects.push("Missing or invalid key: scenario (object expected)".to_string());
        return;
    };

    if non_blank_str(scenario.get("id")).is_none() {
        defects.push("Missing or invalid key: scenario.id (non-empty string expected)".to_string());
    }
}

fn check_entities(document: &PdlDocument, defects: &mut Vec<String>) {
    match document.entities() {
        Some(entities) if !entities.is_empty() => {
            check_items(IdCollection::Entities, entities, defects);
        }
        _ => defects.push("Missing or invalid key: entities (non-empty list expected)".to_string()),
    }
}

fn check_events(document: &PdlDocument, defects: &mut Vec<String>) {
    match document.get("events") {
        None | Some(Value::Null) => {}
        Some(Value::Sequence(events)) => check_items(IdCollection::Events, events, defects),
        Some(_) => defects.push("events must be a list when provided".to_string()),
    }
}

/// Per-element checks shared by entities and events.
fn check_items(collection: IdCollection, items: &[Value], defects: &mut Vec<String>) {
    let mut seen: HashSet<&str> = HashSet::new();

    for (idx, item) in items.iter().enumerate() {
        let Some(mapping) = item.as_mapping() else {
            defects.push(format!("{}[{}] must be an object", collection.key(), idx));
            continue;
        };

        let Some(id) = non_blank_str(mapping.get("id")) else {
            defects.push(format!(
                "{}[{}].id must be a non-empty string",
                collection.key(),
                idx
            ));
            continue;
        };

        if !seen.insert(id) {
            defects.push(format!(
                "Duplicate {} id: {}",
                collection.singular(),
                id
            ));
        }
    }
}

/// The string value when it has non-whitespace content. The untrimmed string is returned.
fn non_blank_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}
