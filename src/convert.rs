//! Single-file and batch conversion
//!
//! Ties the loader, validator, builder and YAML writer together. A batch
//! stops at the first failing file; outputs already written stay on disk.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::document::load_pdl_file;
use crate::error::ConvertError;
use crate::experiment::{build_experiment_config, scenario_basename, ExperimentConfig};
use crate::options::{ConvertOptions, Profile};
use crate::validator::validate_pdl_document;

/// Default directory for single-file output when no path is given.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// File patterns picked up by batch conversion, in collection order.
pub const PDL_FILE_PATTERNS: [&str; 4] = ["*.pdl.yaml", "*.pdl.yml", "*.yaml", "*.yml"];

/// Convert one PDL file and return the path written.
pub fn convert_file(
    input_file: &Path,
    output_file: Option<&Path>,
    options: &ConvertOptions,
) -> Result<PathBuf, ConvertError> {
    let document = load_pdl_file(input_file)?;

    let defects = validate_pdl_document(&document);
    if !defects.is_empty() {
        return Err(ConvertError::Validation {
            path: input_file.to_path_buf(),
            defects,
        });
    }

    let config = build_experiment_config(&document, input_file, options);
    let target_file = resolve_output_file(input_file, output_file, options.profile);
    write_experiment_config(&config, &target_file)?;

    info!("Converted {} -> {}", input_file.display(), target_file.display());
    Ok(target_file)
}

/// Convert every PDL file directly inside `input_dir` into `output_dir`.
pub fn convert_directory(
    input_dir: &Path,
    output_dir: &Path,
    options: &ConvertOptions,
) -> Result<Vec<PathBuf>, ConvertError> {
    let files = collect_pdl_files(input_dir)?;
    info!(
        "Converting {} PDL files from {}",
        files.len(),
        input_dir.display()
    );

    let mut results = Vec::with_capacity(files.len());
    for input_file in files {
        let out_file = output_dir.join(output_file_name(&input_file, options.profile));
        results.push(convert_file(&input_file, Some(&out_file), options)?);
    }

    Ok(results)
}

/// Explicit output path if given, else `output/{basename}.arl.{profile}.yaml`.
pub fn resolve_output_file(
    input_file: &Path,
    output_file: Option<&Path>,
    profile: Profile,
) -> PathBuf {
    match output_file {
        Some(path) => path.to_path_buf(),
        None => Path::new(DEFAULT_OUTPUT_DIR).join(output_file_name(input_file, profile)),
    }
}

fn output_file_name(input_file: &Path, profile: Profile) -> String {
    format!("{}.arl.{}.yaml", scenario_basename(input_file), profile)
}

/// Files in `input_dir` (not recursive) matching [`PDL_FILE_PATTERNS`],
/// sorted by path with repeated paths dropped.
pub fn collect_pdl_files(input_dir: &Path) -> Result<Vec<PathBuf>, ConvertError> {
    let escaped_dir = glob::Pattern::escape(&input_dir.to_string_lossy());

    let mut matches = Vec::new();
    for pattern in PDL_FILE_PATTERNS {
        let full_pattern = Path::new(&escaped_dir)
            .join(pattern)
            .to_string_lossy()
            .into_owned();

        let paths = glob::glob(&full_pattern).map_err(|source| ConvertError::Pattern {
            pattern: full_pattern.clone(),
            source,
        })?;

        for entry in paths {
            let path = entry.map_err(|e| ConvertError::ReadDir {
                path: input_dir.to_path_buf(),
                message: e.to_string(),
            })?;
            if path.is_file() {
                matches.push(path);
            }
        }
    }

    matches.sort();

    let mut seen = HashSet::new();
    matches.retain(|path| seen.insert(path.clone()));

    debug!(
        "Matched {} PDL files in {}",
        matches.len(),
        input_dir.display()
    );
    Ok(matches)
}

/// Write block-style YAML, creating parent directories as needed.
fn write_experiment_config(config: &ExperimentConfig, target_file: &Path) -> Result<(), ConvertError> {
    if let Some(parent) = target_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| ConvertError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let yaml = serde_yaml::to_string(config).map_err(|source| ConvertError::Serialize {
        path: target_file.to_path_buf(),
        source,
    })?;

    std::fs::write(target_file, yaml).map_err(|source| ConvertError::Write {
        path: target_file.to_path_buf(),
        source,
    })
}
