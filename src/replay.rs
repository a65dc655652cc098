//! Path replay as a step-driven state machine.
//!
//! A `ReplaySession` holds a cursor into a snapshot of the path's target
//! contexts. Each `advance_replay` call performs one switch; the host owns
//! pacing and may cancel between steps through a `CancelHandle`.

use crate::error::PathfinderError;
use crate::manager::ContextManager;
use crate::model::Context;
use crate::types::{ContextId, PathId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Cloneable cancellation flag, checked before every step
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct ReplaySession {
    path_id: PathId,
    path_name: String,
    targets: Vec<ContextId>,
    cursor: usize,
    cancel: CancelHandle,
}

impl ReplaySession {
    pub fn path_id(&self) -> &str {
        &self.path_id
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.targets.len() - self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.targets.len()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    fn reason(&self) -> String {
        format!("Replaying path {}", self.path_name)
    }
}

/// Result of one `advance_replay` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayStep {
    Switched { index: usize, context_id: ContextId },
    Finished,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayOutcome {
    pub steps: usize,
    pub cancelled: bool,
}

impl ContextManager {
    /// Begin replaying `path_id`. Transitions appended afterwards (for
    /// example while recording into the same path) are not replayed.
    pub fn start_replay(&self, path_id: &str) -> Result<ReplaySession, PathfinderError> {
        let path = self.require_path(path_id)?;
        info!(path_id, path_name = %path.name, steps = path.transitions().len(), "Replaying path");
        Ok(ReplaySession {
            path_id: path.id.clone(),
            path_name: path.name.clone(),
            targets: path
                .transitions()
                .iter()
                .map(|t| t.to_context_id.clone())
                .collect(),
            cursor: 0,
            cancel: CancelHandle::default(),
        })
    }

    /// Perform the next switch of `session`, if any.
    ///
    /// A failed switch leaves the cursor in place.
    pub fn advance_replay(&mut self, session: &mut ReplaySession) -> Result<ReplayStep, PathfinderError> {
        if session.cancel.is_cancelled() {
            return Ok(ReplayStep::Cancelled);
        }
        let Some(context_id) = session.targets.get(session.cursor).cloned() else {
            return Ok(ReplayStep::Finished);
        };

        self.switch_context(&context_id, &session.reason(), &[])?;
        let index = session.cursor;
        session.cursor += 1;
        debug!(path_id = %session.path_id, index, context_id = %context_id, "Replay step");
        Ok(ReplayStep::Switched { index, context_id })
    }

    /// Replay a whole path synchronously, calling `on_step` after each switch.
    ///
    /// No delay is inserted between steps; use [`drive_paced`] for pacing.
    pub fn replay_path<F>(&mut self, path_id: &str, on_step: F) -> Result<ReplayOutcome, PathfinderError>
    where
        F: FnMut(&Context),
    {
        let mut session = self.start_replay(path_id)?;
        drive(self, &mut session, on_step)
    }

    /// Default pause between paced replay steps.
    pub fn replay_interval(&self) -> Duration {
        Duration::from_millis(self.replay.step_interval_ms)
    }
}

fn drive<F>(
    manager: &mut ContextManager,
    session: &mut ReplaySession,
    mut on_step: F,
) -> Result<ReplayOutcome, PathfinderError>
where
    F: FnMut(&Context),
{
    let mut steps = 0;
    loop {
        match manager.advance_replay(session)? {
            ReplayStep::Switched { context_id, .. } => {
                steps += 1;
                if let Some(context) = manager.context(&context_id) {
                    on_step(context);
                }
            }
            ReplayStep::Finished => return Ok(ReplayOutcome { steps, cancelled: false }),
            ReplayStep::Cancelled => return Ok(ReplayOutcome { steps, cancelled: true }),
        }
    }
}

/// Drive `session` to completion, sleeping `interval` between steps.
///
/// Cancellation through the session's handle is checked before each step,
/// so a cancel issued during a pause takes effect when the pause ends.
pub async fn drive_paced<F>(
    manager: &mut ContextManager,
    session: &mut ReplaySession,
    interval: Duration,
    mut on_step: F,
) -> Result<ReplayOutcome, PathfinderError>
where
    F: FnMut(&Context),
{
    let mut steps = 0;
    loop {
        match manager.advance_replay(session)? {
            ReplayStep::Switched { context_id, .. } => {
                steps += 1;
                if let Some(context) = manager.context(&context_id) {
                    on_step(context);
                }
                if !session.is_finished() {
                    tokio::time::sleep(interval).await;
                }
            }
            ReplayStep::Finished => return Ok(ReplayOutcome { steps, cancelled: false }),
            ReplayStep::Cancelled => return Ok(ReplayOutcome { steps, cancelled: true }),
        }
    }
}
