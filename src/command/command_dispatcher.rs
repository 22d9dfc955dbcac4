use super::command::{Command, CommandError};
use crate::deployment::{CancelOutcome, LaunchOutcome};
use crate::payload::{Payload, PayloadField};
use crate::payload_deployer::PayloadDeployer;
use crate::warn;
use itertools::Itertools;
use std::sync::Arc;
use strum::IntoEnumIterator;

/// Outcome of one command invocation as shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub ok: bool,
    pub lines: Vec<String>,
}

impl Reply {
    fn success(lines: Vec<String>) -> Self { Self { ok: true, lines } }

    fn failure(err: &CommandError) -> Self { Self { ok: false, lines: vec![err.to_string()] } }

    /// Output lines followed by a final `ok` or `error: ..` status line.
    pub fn render(&self) -> Vec<String> {
        if self.ok {
            self.lines.iter().cloned().chain(std::iter::once("ok".to_string())).collect()
        } else {
            self.lines.iter().map(|l| format!("error: {l}")).collect()
        }
    }
}

/// Runs typed commands against the deployer and formats their results.
pub struct CommandDispatcher {
    deployer: Arc<PayloadDeployer>,
}

impl CommandDispatcher {
    const COLUMN_WIDTH: usize = 16;

    pub fn new(deployer: Arc<PayloadDeployer>) -> Self { Self { deployer } }

    /// Parses and executes one text line. Blank lines produce no reply.
    pub async fn handle_line(&self, line: &str) -> Option<Reply> {
        let res = match Command::parse(line) {
            Ok(None) => return None,
            Ok(Some(cmd)) => self.execute(cmd).await,
            Err(e) => Err(e),
        };
        Some(match res {
            Ok(lines) => Reply::success(lines),
            Err(e) => {
                warn!("Command '{}' failed: {e}", line.trim());
                Reply::failure(&e)
            }
        })
    }

    pub async fn execute(&self, cmd: Command) -> Result<Vec<String>, CommandError> {
        let d = &self.deployer;
        Ok(match cmd {
            Command::Add(payload) => {
                let index = payload.index();
                d.add(payload).await?;
                vec![format!("payload {index} added")]
            }
            Command::Edit { index, field, value } => {
                let edit = d.edit(index, &field, &value).await?;
                vec![format!("payload {}: {} = {}", edit.index, edit.field, edit.current)]
            }
            Command::Remove(index) => {
                d.remove(index).await?;
                vec![format!("payload {index} removed")]
            }
            Command::List => Self::render_table(&d.list().await),
            Command::Launch(index) => match d.launch(index).await? {
                LaunchOutcome::Started { target, committed } => {
                    vec![format!("deploying {target}, {committed} payload(s) committed")]
                }
                LaunchOutcome::NothingToDeploy => {
                    vec!["warning: no payloads registered, nothing to deploy".to_string()]
                }
            },
            Command::Cancel => match d.cancel().await {
                CancelOutcome::Aborted(target) => vec![format!("deployment of {target} cancelled")],
                CancelOutcome::AlreadyIdle => vec!["no deployment in progress".to_string()],
            },
            Command::TestServo(index) => {
                let pwm_id = d.test_servo(index).await?;
                vec![format!("servo test of payload {index} sent on pwm channel {pwm_id}")]
            }
            Command::Status => {
                let status = d.status().await;
                let mut lines = vec![
                    format!("payloads: {}/{}", status.payloads, status.capacity),
                    format!("deployment: {}", status.state),
                ];
                if let Some(since) = status.since {
                    lines.push(format!("since: {}", since.format("%Y-%m-%d %H:%M:%S UTC")));
                }
                lines
            }
        })
    }

    /// One header line plus one row per payload, columns in `add` argument order.
    pub fn render_table(payloads: &[Payload]) -> Vec<String> {
        if payloads.is_empty() {
            return vec!["no payloads registered".to_string()];
        }
        let w = Self::COLUMN_WIDTH;
        let header = PayloadField::iter().map(|f| format!("{:>w$}", f.to_string())).join("");
        let rows = payloads
            .iter()
            .map(|p| PayloadField::iter().map(|f| format!("{:>w$}", p.get(f).to_string())).join(""));
        std::iter::once(header).chain(rows).collect()
    }
}
