//! Experiment configuration builder
//!
//! Fills the palaestrAI ARL experiment template from a validated PDL
//! document. The output types serialize in field declaration order, which is
//! the key order of the written YAML.
//!
//! The `name` strings are references into palaestrAI and `provider_sim` and
//! are written verbatim.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::document::PdlDocument;
use crate::identifiers::{AgentRole, DerivedIdentifiers};
use crate::options::{ConvertOptions, Profile};

pub const EXPERIMENT_SCHEMA_VERSION: &str = "3.4.1";

pub const ENVIRONMENT_NAME: &str = "provider_sim.env.environment:ProviderEnvironment";
pub const DUMMY_OBJECTIVE: &str = "palaestrai.agent.dummy_objective:DummyObjective";
pub const DUMMY_BRAIN: &str = "palaestrai.agent.dummy_brain:DummyBrain";
pub const DUMMY_MUSCLE: &str = "palaestrai.agent.dummy_muscle:DummyMuscle";
pub const PPO_BRAIN: &str = "provider_sim.rl.ppo_brain:PPOBrain";
pub const PPO_MUSCLE: &str = "provider_sim.rl.ppo_muscle:PPOMuscle";
pub const ATTACKER_OBJECTIVE: &str = "provider_sim.env.objectives:AttackerObjective";
pub const DEFENDER_OBJECTIVE: &str = "provider_sim.env.objectives:DefenderObjective";
pub const SIM_CONTROLLER: &str =
    "palaestrai.simulation.vanilla_sim_controller:VanillaSimController";
pub const SIM_TERMINATION_CONDITION: &str = "palaestrai.simulation.vanilla_simcontroller_termination_condition:VanillaSimControllerTerminationCondition";
pub const RUN_GOVERNOR_TERMINATION_CONDITION: &str = "palaestrai.experiment.vanilla_rungovernor_termination_condition:VanillaRunGovernorTerminationCondition";

/// Suffixes stripped from a file name to get the scenario basename, most specific first.
const PDL_SUFFIXES: [&str; 4] = [".pdl.yaml", ".pdl.yml", ".yaml", ".yml"];

// =============================================================================
// OUTPUT DOCUMENT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentConfig {
    pub uid: String,
    pub seed: u64,
    pub version: String,
    pub schedule: Vec<SchedulePhase>,
    pub run_config: RunConfig,
}

/// One schedule entry. The phase is always named `phase_train`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulePhase {
    pub phase_train: PhaseDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseDefinition {
    pub environments: Vec<EnvironmentEntry>,
    pub agents: Vec<AgentDefinition>,
    pub simulation: SimulationDefinition,
    pub phase_config: PhaseConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentEntry {
    pub environment: EnvironmentDefinition,
    pub reward: ComponentRef<RewardParams>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentDefinition {
    pub name: String,
    pub uid: String,
    pub params: EnvironmentParams,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentParams {
    pub pdl_source: String,
    pub max_ticks: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentDefinition {
    pub name: String,
    pub brain: ComponentRef<BrainParams>,
    pub muscle: ComponentRef<MuscleParams>,
    pub objective: ComponentRef<ObjectiveParams>,
    pub sensors: Vec<String>,
    pub actuators: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationDefinition {
    pub name: String,
    pub conditions: Vec<ComponentRef<NoParams>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseConfig {
    pub mode: String,
    pub worker: u32,
    pub episodes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfig {
    pub condition: ComponentRef<NoParams>,
}

/// A `name` + `params` reference to an external palaestrAI component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentRef<P> {
    pub name: String,
    pub params: P,
}

impl<P> ComponentRef<P> {
    fn new(name: &str, params: P) -> Self {
        Self {
            name: name.to_string(),
            params,
        }
    }
}

/// Serializes as an empty mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NoParams {}

/// The environment-level reward takes a nested, empty `params` mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RewardParams {
    pub params: NoParams,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectiveParams {
    pub reward_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BrainParams {
    Ppo(PpoBrainParams),
    Placeholder(NoParams),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MuscleParams {
    Ppo(PpoMuscleParams),
    Placeholder(NoParams),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PpoBrainParams {
    pub checkpoint_path: String,
    pub lr: f64,
    pub gamma: f64,
    pub gae_lambda: f64,
    pub clip_eps: f64,
    pub entropy_coef: f64,
    pub value_coef: f64,
    pub ppo_epochs: u32,
    pub n_obs: usize,
    pub n_act: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PpoMuscleParams {
    pub checkpoint_path: String,
    pub n_obs: usize,
    pub n_act: usize,
    pub budget: f64,
}

// =============================================================================
// PROFILES
// =============================================================================

/// PPO hyperparameters shared by both agents.
const PPO_LEARNING_RATE: f64 = 3e-4;
const PPO_GAMMA: f64 = 0.99;
const PPO_GAE_LAMBDA: f64 = 0.95;
const PPO_CLIP_EPS: f64 = 0.2;
const PPO_ENTROPY_COEF: f64 = 0.01;
const PPO_VALUE_COEF: f64 = 0.5;
const PPO_EPOCHS: u32 = 4;

/// Brain and muscle references for one agent.
struct AgentComponents {
    brain: ComponentRef<BrainParams>,
    muscle: ComponentRef<MuscleParams>,
}

impl Profile {
    fn agent_components(
        self,
        role: AgentRole,
        ids: &DerivedIdentifiers,
        options: &ConvertOptions,
    ) -> AgentComponents {
        match self {
            Profile::Dummy => AgentComponents {
                brain: ComponentRef::new(DUMMY_BRAIN, BrainParams::Placeholder(NoParams {})),
                muscle: ComponentRef::new(DUMMY_MUSCLE, MuscleParams::Placeholder(NoParams {})),
            },
            Profile::Ppo => {
                let checkpoint_path = absolute_path_string(
                    &options
                        .checkpoint_dir
                        .join(format!("{}.pt", role.as_str())),
                );
                let n_obs = ids.sensor_ids.len();
                let n_act = ids.entity_ids.len();
                let budget = match role {
                    AgentRole::Attacker => options.attacker_budget,
                    AgentRole::Defender => options.defender_budget,
                };

                AgentComponents {
                    brain: ComponentRef::new(
                        PPO_BRAIN,
                        BrainParams::Ppo(PpoBrainParams {
                            checkpoint_path: checkpoint_path.clone(),
                            lr: PPO_LEARNING_RATE,
                            gamma: PPO_GAMMA,
                            gae_lambda: PPO_GAE_LAMBDA,
                            clip_eps: PPO_CLIP_EPS,
                            entropy_coef: PPO_ENTROPY_COEF,
                            value_coef: PPO_VALUE_COEF,
                            ppo_epochs: PPO_EPOCHS,
                            n_obs,
                            n_act,
                        }),
                    ),
                    muscle: ComponentRef::new(
                        PPO_MUSCLE,
                        MuscleParams::Ppo(PpoMuscleParams {
                            checkpoint_path,
                            n_obs,
                            n_act,
                            budget,
                        }),
                    ),
                }
            }
        }
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Build the experiment configuration for an already validated document.
pub fn build_experiment_config(
    document: &PdlDocument,
    pdl_path: &Path,
    options: &ConvertOptions,
) -> ExperimentConfig {
    let scenario_id = document
        .scenario_id()
        .map(str::to_string)
        .unwrap_or_else(|| scenario_basename(pdl_path));

    let ids = DerivedIdentifiers::derive(document, &options.environment_uid);
    debug!(
        "Scenario {}: {} entities, {} events, {} sensors",
        scenario_id,
        ids.entity_ids.len(),
        ids.event_ids.len(),
        ids.sensor_ids.len()
    );

    let agents = AgentRole::ALL
        .into_iter()
        .map(|role| build_agent(role, &ids, options))
        .collect();

    ExperimentConfig {
        uid: format!(
            "{}-{}-arl-{}",
            options.experiment_uid_prefix, scenario_id, options.profile
        ),
        seed: options.seed,
        version: EXPERIMENT_SCHEMA_VERSION.to_string(),
        schedule: vec![SchedulePhase {
            phase_train: PhaseDefinition {
                environments: vec![EnvironmentEntry {
                    environment: EnvironmentDefinition {
                        name: ENVIRONMENT_NAME.to_string(),
                        uid: options.environment_uid.clone(),
                        params: EnvironmentParams {
                            pdl_source: absolute_path_string(pdl_path),
                            max_ticks: options.max_ticks,
                        },
                    },
                    reward: ComponentRef::new(DUMMY_OBJECTIVE, RewardParams::default()),
                }],
                agents,
                simulation: SimulationDefinition {
                    name: SIM_CONTROLLER.to_string(),
                    conditions: vec![ComponentRef::new(SIM_TERMINATION_CONDITION, NoParams {})],
                },
                phase_config: PhaseConfig {
                    mode: "train".to_string(),
                    worker: 1,
                    episodes: options.episodes,
                },
            },
        }],
        run_config: RunConfig {
            condition: ComponentRef::new(RUN_GOVERNOR_TERMINATION_CONDITION, NoParams {}),
        },
    }
}

fn build_agent(
    role: AgentRole,
    ids: &DerivedIdentifiers,
    options: &ConvertOptions,
) -> AgentDefinition {
    let AgentComponents { brain, muscle } = options.profile.agent_components(role, ids, options);

    let (objective, reward_id) = match role {
        AgentRole::Attacker => (ATTACKER_OBJECTIVE, "reward.attacker"),
        AgentRole::Defender => (DEFENDER_OBJECTIVE, "reward.defender"),
    };

    AgentDefinition {
        name: role.as_str().to_string(),
        brain,
        muscle,
        objective: ComponentRef::new(
            objective,
            ObjectiveParams {
                reward_id: reward_id.to_string(),
            },
        ),
        sensors: ids.sensor_ids.clone(),
        actuators: ids.actuator_ids(role),
    }
}

/// File name with the first matching PDL/YAML suffix removed, else the stem.
pub fn scenario_basename(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    for suffix in PDL_SUFFIXES {
        if let Some(stripped) = name.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }

    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Absolute form of `path`: canonical if it exists, else joined onto the working directory.
fn absolute_path_string(path: &Path) -> String {
    let resolved = std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|e| {
            warn!("Could not make {} absolute: {}", path.display(), e);
            PathBuf::from(path)
        });
    resolved.to_string_lossy().into_owned()
}
