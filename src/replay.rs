//! Scripted replays.
//!
//! A script is a TOML list of `[[step]]` tables, each naming an action, an
//! optional seat (the acting player when omitted), and the action's params:
//!
//! ```toml
//! [[step]]
//! action = "place-workers"
//! params = { area = "Egypt", count = 1 }
//!
//! [[step]]
//! action = "finish-turn"
//! ```

use crate::engine::{IntegrityError, Outcome, Params, PlayerId, Submission};
use crate::session::{SessionError, SessionManager};
use derive_getters::Getters;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// One scripted submission.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct Step {
    action: String,
    /// Seat index; the acting player when absent.
    #[serde(default)]
    player: Option<u8>,
    #[serde(default)]
    params: Params,
    #[serde(default)]
    admin: bool,
}

/// A whole replay script.
#[derive(Debug, Clone, Default, Deserialize, Getters)]
pub struct Script {
    #[serde(default, rename = "step")]
    steps: Vec<Step>,
}

/// What happened when a script ran.
#[derive(Debug, Default, Getters)]
pub struct ReplayReport {
    /// Rendered log lines, in order.
    lines: Vec<String>,
    /// Steps applied successfully.
    applied: usize,
    /// The first rejected step and why, if any.
    rejection: Option<(usize, String)>,
}

impl Script {
    /// Reads a script file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Parses a script from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let script: Self = toml::from_str(content)?;
        debug!(steps = script.steps.len(), "Script parsed");
        Ok(script)
    }

    /// Runs every step against game `id`, stopping at the first rejection.
    ///
    /// Validation failures end the replay and are reported; fatal errors are
    /// returned.
    #[instrument(skip(self, sessions))]
    pub fn run(&self, sessions: &SessionManager, id: &str) -> Result<ReplayReport, SessionError> {
        let mut report = ReplayReport::default();
        let game = sessions.game(id)?;
        let names = game.names();
        report.lines = game.render_log();

        for (index, step) in self.steps.iter().enumerate() {
            let submission = match self.submission(sessions, id, step) {
                Ok(sub) => sub,
                Err(reason) => {
                    warn!(index, %reason, "Step could not be built");
                    report.rejection = Some((index, reason));
                    break;
                }
            };
            match sessions.submit(id, &submission) {
                Ok(outcome) => {
                    report.applied += 1;
                    report.lines.extend(render(&outcome, &names));
                }
                Err(e) if !e.is_fatal() => {
                    warn!(index, error = %e, "Step rejected");
                    report.rejection = Some((index, e.to_string()));
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        info!(applied = report.applied, rejected = report.rejection.is_some(), "Replay finished");
        Ok(report)
    }

    fn submission(
        &self,
        sessions: &SessionManager,
        id: &str,
        step: &Step,
    ) -> Result<Submission, String> {
        let player = match step.player {
            Some(seat) => PlayerId::from_index(seat as usize)
                .ok_or_else(|| format!("Seat {} does not exist", seat))?,
            None => sessions
                .game(id)
                .map_err(|e: IntegrityError| e.to_string())?
                .acting()
                .ok_or_else(|| "No player is acting".to_string())?,
        };
        let submission = Submission::parse(&step.action, player, step.params.clone())
            .map_err(|e| e.to_string())?;
        Ok(if step.admin {
            submission.as_admin()
        } else {
            submission
        })
    }
}

fn render(outcome: &Outcome, names: &[String; 3]) -> Vec<String> {
    outcome.entries().iter().map(|r| r.render(names)).collect()
}
