//! End-to-end conversion tests over real files on disk.

use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use serde_yaml::Value;
use tempfile::TempDir;

use pdl2palaestrai::{
    build_experiment_config, convert_directory, convert_file, load_pdl_file,
    validate_pdl_document, ConvertError, ConvertOptions, Profile,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn read_yaml(path: &Path) -> Value {
    let text = std::fs::read_to_string(path).expect("read output");
    serde_yaml::from_str(&text).expect("parse output")
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write input");
    path
}

#[test]
fn test_validate_minimal_example() {
    let document = load_pdl_file(&fixture("minimal.pdl.yaml")).unwrap();
    assert!(validate_pdl_document(&document).is_empty());
}

#[test]
fn test_build_config_contains_expected_uids() {
    let document = load_pdl_file(&fixture("minimal.pdl.yaml")).unwrap();
    let config = build_experiment_config(
        &document,
        Path::new("examples/minimal.pdl.yaml"),
        &ConvertOptions::default(),
    );

    assert_eq!(config.uid, "provider-minimal_demo-arl-dummy");
    let sensors = &config.schedule[0].phase_train.agents[0].sensors;
    assert!(sensors.contains(&"provider_env.entity.supplier.supply".to_string()));
    assert!(sensors.contains(&"provider_env.event.supplier_outage.active".to_string()));
}

#[test]
fn test_convert_minimal_writes_expected_document() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("minimal.arl.dummy.yaml");

    let written = convert_file(
        &fixture("minimal.pdl.yaml"),
        Some(&target),
        &ConvertOptions::default(),
    )
    .unwrap();
    assert_eq!(written, target);

    let value = read_yaml(&target);
    assert_eq!(value["uid"], Value::from("provider-minimal_demo-arl-dummy"));
    assert_eq!(value["seed"], Value::from(42));
    assert_eq!(value["version"], Value::from("3.4.1"));

    let phase = &value["schedule"][0]["phase_train"];
    let environment = &phase["environments"][0]["environment"];
    assert_eq!(environment["uid"], Value::from("provider_env"));
    assert_eq!(environment["params"]["max_ticks"], Value::from(365));
    let pdl_source = environment["params"]["pdl_source"].as_str().unwrap();
    assert!(Path::new(pdl_source).is_absolute());
    assert!(pdl_source.ends_with("minimal.pdl.yaml"));

    assert_eq!(phase["phase_config"]["mode"], Value::from("train"));
    assert_eq!(phase["phase_config"]["worker"], Value::from(1));
    assert_eq!(phase["phase_config"]["episodes"], Value::from(1));

    let attacker = &phase["agents"][0];
    assert_eq!(attacker["name"], Value::from("attacker"));
    assert_eq!(
        attacker["brain"]["name"],
        Value::from("palaestrai.agent.dummy_brain:DummyBrain")
    );
    let sensors: Vec<&str> = attacker["sensors"]
        .as_sequence()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(
        sensors,
        vec![
            "provider_env.entity.supplier.supply",
            "provider_env.entity.supplier.demand",
            "provider_env.entity.supplier.price",
            "provider_env.entity.supplier.health",
            "provider_env.event.supplier_outage.active",
            "provider_env.sim.tick",
        ]
    );

    assert_eq!(
        value["run_config"]["condition"]["name"],
        Value::from("palaestrai.experiment.vanilla_rungovernor_termination_condition:VanillaRunGovernorTerminationCondition")
    );
}

#[test]
fn test_output_is_block_style_in_insertion_order() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("out.yaml");
    convert_file(
        &fixture("minimal.pdl.yaml"),
        Some(&target),
        &ConvertOptions::default(),
    )
    .unwrap();

    let text = std::fs::read_to_string(&target).unwrap();
    let top_level: Vec<&str> = text
        .lines()
        .filter(|l| !l.starts_with(' ') && !l.starts_with('-'))
        .map(|l| l.split(':').next().unwrap())
        .collect();
    assert_eq!(top_level, vec!["uid", "seed", "version", "schedule", "run_config"]);
    assert!(!text.contains("sensors: ["), "sensors should be block style");
}

#[test]
fn test_non_ascii_written_unescaped() {
    let temp = TempDir::new().unwrap();
    let input = write(
        temp.path(),
        "lieferkette.pdl.yaml",
        "scenario:\n  id: lieferkette_süd\nentities:\n  - id: mühle\n",
    );
    let target = temp.path().join("out.yaml");

    convert_file(&input, Some(&target), &ConvertOptions::default()).unwrap();

    let text = std::fs::read_to_string(&target).unwrap();
    assert!(text.contains("provider-lieferkette_süd-arl-dummy"));
    assert!(text.contains("provider_env.entity.mühle.supply"));
    assert!(!text.contains("\\u"));
}

#[test]
fn test_ppo_profile_output() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("ppo.yaml");
    let options = ConvertOptions::default()
        .with_profile(Profile::Ppo)
        .with_checkpoint_dir(temp.path().join("ckpt"));

    convert_file(&fixture("minimal.pdl.yaml"), Some(&target), &options).unwrap();

    let value = read_yaml(&target);
    assert_eq!(value["uid"], Value::from("provider-minimal_demo-arl-ppo"));

    let agents = &value["schedule"][0]["phase_train"]["agents"];
    for (idx, (role, budget)) in [("attacker", 0.8), ("defender", 0.4)].iter().enumerate() {
        let agent = &agents[idx];
        let brain = &agent["brain"]["params"];
        let muscle = &agent["muscle"]["params"];

        assert_eq!(
            agent["brain"]["name"],
            Value::from("provider_sim.rl.ppo_brain:PPOBrain")
        );
        assert_eq!(brain["n_obs"], Value::from(6));
        assert_eq!(brain["n_act"], Value::from(1));
        assert_eq!(brain["gamma"], Value::from(0.99));
        assert_eq!(brain["ppo_epochs"], Value::from(4));
        assert_eq!(muscle["budget"], Value::from(*budget));

        let expected_ckpt = temp.path().join("ckpt").join(format!("{}.pt", role));
        assert_eq!(
            muscle["checkpoint_path"].as_str().map(PathBuf::from),
            Some(std::path::absolute(expected_ckpt).unwrap())
        );
        assert_eq!(brain["checkpoint_path"], muscle["checkpoint_path"]);
    }
}

#[test]
fn test_root_not_mapping_fails_as_validation() {
    let temp = TempDir::new().unwrap();
    let input = write(temp.path(), "list.yaml", "- id: a\n- id: b\n");

    let err = convert_file(&input, Some(&temp.path().join("o.yaml")), &ConvertOptions::default())
        .unwrap_err();
    assert!(matches!(err, ConvertError::RootNotMapping { .. }));
    assert!(err.is_validation());
}

#[test]
fn test_validation_failure_message_shape() {
    let temp = TempDir::new().unwrap();
    let input = write(
        temp.path(),
        "broken.pdl.yaml",
        "scenario: {}\nentities: [{id: a}, {id: a}]\nevents: nope\n",
    );

    let err = convert_file(&input, None, &ConvertOptions::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        format!(
            "PDL validation failed for {}:\n\
             - Missing or invalid key: scenario.id (non-empty string expected)\n\
             - Duplicate entity id: a\n\
             - events must be a list when provided",
            input.display()
        )
    );
}

#[test]
fn test_batch_processes_same_basename_files_once_each() {
    let temp = TempDir::new().unwrap();
    let input_dir = temp.path().join("pdl");
    let output_dir = temp.path().join("configs");
    std::fs::create_dir(&input_dir).unwrap();
    let valid = "scenario:\n  id: same\nentities:\n  - id: a\n";
    write(&input_dir, "a.yaml", valid);
    write(&input_dir, "a.pdl.yaml", valid);

    let results = convert_directory(&input_dir, &output_dir, &ConvertOptions::default()).unwrap();

    assert_eq!(
        results,
        vec![
            output_dir.join("a.arl.dummy.yaml"),
            output_dir.join("a.arl.dummy.yaml"),
        ]
    );
    assert!(output_dir.join("a.arl.dummy.yaml").is_file());
}

#[test]
fn test_batch_results_follow_sorted_input_order() {
    let temp = TempDir::new().unwrap();
    let input_dir = temp.path().join("pdl");
    let output_dir = temp.path().join("configs");
    std::fs::create_dir(&input_dir).unwrap();
    for name in ["zeta.yml", "alpha.pdl.yml", "mid.pdl.yaml"] {
        write(&input_dir, name, "scenario: {id: s}\nentities: [{id: a}]\n");
    }

    let options = ConvertOptions::default().with_profile(Profile::Ppo);
    let results = convert_directory(&input_dir, &output_dir, &options).unwrap();

    assert_eq!(
        results,
        vec![
            output_dir.join("alpha.arl.ppo.yaml"),
            output_dir.join("mid.arl.ppo.yaml"),
            output_dir.join("zeta.arl.ppo.yaml"),
        ]
    );
}

#[test]
fn test_batch_on_empty_directory() {
    let temp = TempDir::new().unwrap();
    let results =
        convert_directory(temp.path(), &temp.path().join("out"), &ConvertOptions::default())
            .unwrap();
    assert!(results.is_empty());
    assert!(!temp.path().join("out").exists());
}
