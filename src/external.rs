//! External build commands run after generation.
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

/// Run a shell-word command line with `extra_args` appended, from `cwd`.
///
/// Only the exit status matters; output is logged.
pub fn run_external(command_line: &str, extra_args: &[String], cwd: &Path) -> Result<()> {
    let args = shell_words::split(command_line)
        .with_context(|| format!("parse command: {command_line}"))?;
    let (program, args) = args
        .split_first()
        .ok_or_else(|| anyhow!("command is empty"))?;
    let program = resolve_program(program, cwd)?;

    let start = Instant::now();
    let output = Command::new(&program)
        .args(args)
        .args(extra_args)
        .current_dir(cwd)
        .output()
        .with_context(|| format!("run {}", program.display()))?;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        command = command_line,
        extra_args = ?extra_args,
        elapsed_ms,
        stdout_bytes = output.stdout.len(),
        "external command complete"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in stdout.lines() {
        tracing::debug!(target: "ideproj::external", "{line}");
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = stderr.trim().lines().last().unwrap_or_default().to_string();
        return Err(anyhow!(
            "command `{command_line}` failed with status {}: {detail}",
            output.status
        ));
    }
    Ok(())
}

/// Bare program names are looked up on `PATH`; anything with a separator is
/// taken relative to `cwd`.
fn resolve_program(program: &str, cwd: &Path) -> Result<PathBuf> {
    let path = Path::new(program);
    if path.components().count() > 1 || path.is_absolute() {
        return Ok(cwd.join(path));
    }
    which::which(program).with_context(|| format!("find {program} on PATH"))
}
