//! Sensor and actuator identifiers
//!
//! palaestrAI agents address simulation signals by string id and index the
//! sensor list positionally, so the order produced here is part of the
//! output contract:
//!
//! ```text
//! {env}.entity.{entity}.{supply|demand|price|health}   per entity, suffixes nested
//! {env}.event.{event}.active                           per event
//! {env}.sim.tick                                       always last
//! ```

use std::fmt;

use serde_yaml::Value;

use crate::document::PdlDocument;

/// Signals every entity contributes, in sensor order.
pub const ENTITY_SENSOR_SUFFIXES: [&str; 4] = ["supply", "demand", "price", "health"];

/// The two agents of an ARL experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentRole {
    Attacker,
    Defender,
}

impl AgentRole {
    pub const ALL: [AgentRole; 2] = [AgentRole::Attacker, AgentRole::Defender];

    pub fn as_str(self) -> &'static str {
        match self {
            AgentRole::Attacker => "attacker",
            AgentRole::Defender => "defender",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ids of entities that are mappings with a string id, in source order.
pub fn entity_ids(document: &PdlDocument) -> Vec<String> {
    collect_ids(document.entities().unwrap_or_default())
}

/// Ids of events that are mappings with a string id; empty when events are absent.
pub fn event_ids(document: &PdlDocument) -> Vec<String> {
    collect_ids(document.events().unwrap_or_default())
}

fn collect_ids(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| item.as_mapping()?.get("id")?.as_str())
        .map(str::to_string)
        .collect()
}

pub fn build_sensor_ids(
    environment_uid: &str,
    entity_ids: &[String],
    event_ids: &[String],
) -> Vec<String> {
    let mut sensor_ids = Vec::with_capacity(entity_ids.len() * 4 + event_ids.len() + 1);

    for entity_id in entity_ids {
        for suffix in ENTITY_SENSOR_SUFFIXES {
            sensor_ids.push(format!("{}.entity.{}.{}", environment_uid, entity_id, suffix));
        }
    }

    for event_id in event_ids {
        sensor_ids.push(format!("{}.event.{}.active", environment_uid, event_id));
    }

    sensor_ids.push(format!("{}.sim.tick", environment_uid));
    sensor_ids
}

pub fn build_actuator_ids(
    environment_uid: &str,
    entity_ids: &[String],
    role: AgentRole,
) -> Vec<String> {
    entity_ids
        .iter()
        .map(|entity_id| format!("{}.{}.{}", environment_uid, role, entity_id))
        .collect()
}

/// Everything derived from a document's ids for one environment uid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedIdentifiers {
    pub environment_uid: String,
    pub entity_ids: Vec<String>,
    pub event_ids: Vec<String>,
    pub sensor_ids: Vec<String>,
}

impl DerivedIdentifiers {
    pub fn derive(document: &PdlDocument, environment_uid: &str) -> Self {
        let entity_ids = entity_ids(document);
        let event_ids = event_ids(document);
        let sensor_ids = build_sensor_ids(environment_uid, &entity_ids, &event_ids);

        Self {
            environment_uid: environment_uid.to_string(),
            entity_ids,
            event_ids,
            sensor_ids,
        }
    }

    pub fn actuator_ids(&self, role: AgentRole) -> Vec<String> {
        build_actuator_ids(&self.environment_uid, &self.entity_ids, role)
    }
}
