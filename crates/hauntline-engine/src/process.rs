//! External stage processes: placeholder expansion, spawning and output capture.

use std::collections::HashMap;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use regex::Captures;
use tokio::process::Command;

use crate::config::validator::PLACEHOLDER_RE;
use crate::errors::PipelineError;
use crate::stage::Stage;

/// Lines of stderr kept in a failure report.
const STDERR_TAIL_LINES: usize = 20;

/// Replace every `{name}` whose name is a known placeholder, in one pass.
/// Substituted values are never expanded again.
pub fn expand_args(command: &[String], values: &HashMap<&'static str, String>) -> Vec<String> {
    command
        .iter()
        .map(|arg| {
            PLACEHOLDER_RE
                .replace_all(arg, |caps: &Captures<'_>| match values.get(&caps[1]) {
                    Some(value) => value.clone(),
                    None => caps[0].to_string(),
                })
                .into_owned()
        })
        .collect()
}

fn build_command(stage: Stage, argv: &[String], workdir: &Path) -> Result<Command, PipelineError> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| PipelineError::stage_failed(stage, "no command configured"))?;
    let mut command = Command::new(program);
    command.args(args).current_dir(workdir).stdin(Stdio::null());
    Ok(command)
}

fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

/// Run a stage command to completion.
///
/// Output is captured and replayed through `tracing`: stdout at debug,
/// stderr at warn.
///
/// # Errors
///
/// Returns [`PipelineError::StageExecution`] if the process cannot be spawned
/// or exits unsuccessfully; the detail carries the exit status and the tail
/// of stderr.
pub async fn run_to_completion(
    stage: Stage,
    argv: &[String],
    workdir: &Path,
) -> Result<(), PipelineError> {
    let mut command = build_command(stage, argv, workdir)?;
    tracing::info!(stage = %stage, command = %argv.join(" "), "Launching stage process");

    let output = command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| PipelineError::stage_failed(stage, format!("failed to spawn '{}': {e}", argv[0])))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
        tracing::debug!(stage = %stage, "{}", line);
    }
    for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
        tracing::warn!(stage = %stage, "{}", line);
    }

    if output.status.success() {
        return Ok(());
    }

    let tail = stderr_tail(&stderr);
    let detail = if tail.is_empty() {
        describe_status(output.status)
    } else {
        format!("{}\n{}", describe_status(output.status), tail)
    };
    Err(PipelineError::stage_failed(stage, detail))
}

/// Start a stage command in the background and return its pid.
///
/// The child is not awaited and outlives the run; its output is discarded.
///
/// # Errors
///
/// Returns [`PipelineError::StageExecution`] if the process cannot be spawned.
pub fn spawn_detached(
    stage: Stage,
    argv: &[String],
    workdir: &Path,
) -> Result<Option<u32>, PipelineError> {
    let mut command = build_command(stage, argv, workdir)?;
    tracing::info!(stage = %stage, command = %argv.join(" "), "Launching stage process in background");

    let child = command
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(false)
        .spawn()
        .map_err(|e| PipelineError::stage_failed(stage, format!("failed to spawn '{}': {e}", argv[0])))?;
    Ok(child.id())
}
