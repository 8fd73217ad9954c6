//! Semantic validation for parsed pipeline configuration values.

use std::sync::LazyLock;

use anyhow::{bail, Result};
use regex::Regex;

use crate::config::types::PipelineConfig;
use crate::stage::Stage;

pub(crate) static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_]+)\}").expect("valid placeholder regex"));

/// Placeholders a stage command may reference.
pub const PLACEHOLDERS: [&str; 6] = [
    "source",
    "records",
    "fragments",
    "similarity",
    "clusters",
    "workdir",
];

fn validate_command(stage: Stage, command: &[String], errors: &mut Vec<String>) {
    let context = format!("stages.{}", stage.config_key());
    match command.first() {
        None => errors.push(format!("{context}: command must not be empty")),
        Some(program) if program.trim().is_empty() => {
            errors.push(format!("{context}: command program must not be empty"));
        }
        Some(_) => {}
    }
    for arg in command {
        for cap in PLACEHOLDER_RE.captures_iter(arg) {
            if !PLACEHOLDERS.contains(&&cap[1]) {
                errors.push(format!(
                    "{context}: unknown placeholder '{{{}}}' (expected one of: {})",
                    &cap[1],
                    PLACEHOLDERS.join(", ")
                ));
            }
        }
    }
}

/// Validate a parsed pipeline configuration.
/// Returns `Ok(())` if valid, Err with all validation errors if not.
///
/// # Errors
///
/// Returns an error listing all validation failures found in the pipeline config.
pub fn validate_pipeline(config: &PipelineConfig) -> Result<()> {
    let mut errors = Vec::new();

    if config.version != "1.0" {
        errors.push(format!(
            "Unsupported pipeline version '{}', expected '1.0'",
            config.version
        ));
    }

    if config.records_key.trim().is_empty() {
        errors.push("records_key must not be empty".to_string());
    }

    let paths = [
        ("source", &config.paths.source),
        ("records", &config.paths.records),
        ("fragments", &config.paths.fragments),
        ("similarity", &config.paths.similarity),
        ("clusters", &config.paths.clusters),
    ];
    for (name, path) in paths {
        if path.as_os_str().is_empty() {
            errors.push(format!("paths.{name} must not be empty"));
        }
    }

    for stage in Stage::ALL {
        let stage_config = config.stage(stage);
        if let Some(command) = &stage_config.command {
            validate_command(stage, command, &mut errors);
        } else if !stage_config.skip && !stage.has_builtin() {
            errors.push(format!(
                "stages.{}: a command is required (no built-in implementation)",
                stage.config_key()
            ));
        }
        if stage_config.detach && stage != Stage::Visualization {
            errors.push(format!(
                "stages.{}: detach is only supported for the visualization stage",
                stage.config_key()
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        bail!("Pipeline validation failed:\n  - {}", errors.join("\n  - "));
    }
}
