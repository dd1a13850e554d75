//! Bridge-process backend
//!
//! Spawns `program args... <subcommand> ...` for every call:
//!
//! | subcommand | extra arguments                          | stdin            | stdout (last line)      |
//! |------------|------------------------------------------|------------------|-------------------------|
//! | `train`    | `--model M --dataset D`                  | run config JSON  | passed to the console   |
//! | `inspect`  | `--checkpoint P`                         | -                | resolved config object  |
//! | `evaluate` | `--checkpoint P --model-type T --model M`| -                | metrics object          |
//!
//! A non-zero exit status fails the call with the tail of the bridge's stderr.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tracing::{debug, info};

use super::{LoadedCheckpoint, Recommender};
use crate::config::TrainerSettings;
use crate::experiment::RunConfig;
use crate::results::Record;
use crate::{Error, Result};

const STDERR_TAIL_LINES: usize = 20;

/// Backend driving a recommendation framework through a bridge command.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    settings: TrainerSettings,
}

impl CommandBackend {
    /// Create a backend for the configured bridge.
    #[must_use]
    pub const fn new(settings: TrainerSettings) -> Self {
        Self { settings }
    }

    fn command(&self, subcommand: &str) -> Command {
        let mut cmd = Command::new(&self.settings.program);
        cmd.args(&self.settings.args)
            .arg(subcommand)
            .envs(&self.settings.env);
        cmd
    }

    fn execute(subcommand: &str, mut cmd: Command, input: Option<&[u8]>, stdout: Stdio) -> Result<Output> {
        debug!(?cmd, "spawning backend");
        cmd.stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(stdout)
        .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| Error::Backend {
            command: subcommand.to_string(),
            status: "spawn failed".to_string(),
            stderr: e.to_string(),
        })?;

        // A bridge that dies before reading stdin closes the pipe; its exit
        // status and stderr explain why, so the write error is held back.
        let write_result = match (input, child.stdin.take()) {
            (Some(input), Some(mut stdin)) => stdin.write_all(input),
            _ => Ok(()),
        };

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(Error::Backend {
                command: subcommand.to_string(),
                status: output.status.to_string(),
                stderr: stderr_tail(&output.stderr),
            });
        }
        write_result?;
        Ok(output)
    }

    fn json_object(subcommand: &str, stdout: &[u8]) -> Result<Record> {
        let text = String::from_utf8_lossy(stdout);
        let line = text
            .lines()
            .map(str::trim)
            .rfind(|line| !line.is_empty())
            .ok_or_else(|| Error::BackendOutput {
                command: subcommand.to_string(),
                reason: "no output".to_string(),
            })?;
        serde_json::from_str(line).map_err(|e| Error::BackendOutput {
            command: subcommand.to_string(),
            reason: e.to_string(),
        })
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

impl Recommender for CommandBackend {
    fn train(&self, model: &str, dataset: &str, config: &RunConfig) -> Result<()> {
        let mut cmd = self.command("train");
        cmd.args(["--model", model, "--dataset", dataset]);
        let payload = config.to_json()?;

        // Training progress goes straight to the console.
        Self::execute("train", cmd, Some(payload.as_bytes()), Stdio::inherit())?;
        info!(model, dataset, "training finished");
        Ok(())
    }

    fn load_checkpoint(&self, checkpoint: &Path) -> Result<LoadedCheckpoint> {
        let mut cmd = self.command("inspect");
        cmd.arg("--checkpoint").arg(checkpoint);

        let output = Self::execute("inspect", cmd, None, Stdio::piped())?;
        let config = Self::json_object("inspect", &output.stdout)?;
        Ok(LoadedCheckpoint::new(checkpoint, config))
    }

    fn evaluate(&self, checkpoint: &LoadedCheckpoint) -> Result<Record> {
        let mut cmd = self.command("evaluate");
        cmd.arg("--checkpoint").arg(checkpoint.path());
        if let Some(model_type) = checkpoint.model_type() {
            cmd.args(["--model-type", model_type]);
        }
        if let Some(model) = checkpoint.model() {
            cmd.args(["--model", model]);
        }

        let output = Self::execute("evaluate", cmd, None, Stdio::piped())?;
        Self::json_object("evaluate", &output.stdout)
    }
}
