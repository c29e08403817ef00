//! PDL to palaestrAI conversion
//!
//! Turns a PROVIDER scenario description (PDL) into a palaestrAI experiment
//! configuration. The pipeline is a single pass:
//!
//! - load the YAML document and require a mapping at the root
//! - validate its shape, collecting every defect
//! - derive entity/event ids and the sensor/actuator ids built from them
//! - fill the experiment template for the selected agent profile
//! - write the result as block-style YAML
//!
//! # Example
//!
//! ```yaml
//! scenario:
//!   id: minimal_demo
//! entities:
//!   - id: supplier
//! events:
//!   - id: supplier_outage
//! ```
//!
//! converts (with default options) into an experiment with uid
//! `provider-minimal_demo-arl-dummy` whose agents observe
//! `provider_env.entity.supplier.supply`, ..., `provider_env.sim.tick`.

pub mod convert;
pub mod document;
pub mod error;
pub mod experiment;
pub mod identifiers;
pub mod options;
pub mod validator;

pub use convert::{collect_pdl_files, convert_directory, convert_file, resolve_output_file};
pub use document::{load_pdl_file, parse_pdl_str, PdlDocument};
pub use error::ConvertError;
pub use experiment::{
    build_experiment_config, scenario_basename, AgentDefinition, ComponentRef, ExperimentConfig,
};
pub use identifiers::{
    build_actuator_ids, build_sensor_ids, entity_ids, event_ids, AgentRole, DerivedIdentifiers,
};
pub use options::{ConvertOptions, Profile};
pub use validator::validate_pdl_document;
