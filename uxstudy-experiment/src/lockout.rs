use std::time::Duration;

use tracing::{debug, error};
use uxstudy_core::{Condition, UnknownCondition};
use uxstudy_timing::{OneShot, Ticket};

use crate::adapter::ConditionAdapters;
use crate::error::StudyResult;

/// Disables input right after a selection and re-enables it once the pause has
/// elapsed. Only the most recent arm can re-enable input.
#[derive(Debug, Default)]
pub struct SelectionLockout {
    pending: OneShot,
}

impl SelectionLockout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(
        &mut self,
        now_ns: u64,
        pause: Duration,
        condition: Option<Condition>,
        adapters: &mut ConditionAdapters,
    ) -> StudyResult<Ticket> {
        let condition = condition.ok_or_else(|| {
            error!("cannot arm selection lockout without a condition");
            UnknownCondition::none()
        })?;
        if condition.has_button_input() {
            adapters.get_mut(condition).set_input_enabled(false);
        }
        let ticket = self.pending.schedule(now_ns, pause);
        debug!(%condition, ?pause, ?ticket, "selection lockout armed");
        Ok(ticket)
    }

    /// Re-enables input for the condition active now, if the pause has elapsed.
    /// Returns whether the lockout fired.
    pub fn fire_due(
        &mut self,
        now_ns: u64,
        current: Option<Condition>,
        adapters: &mut ConditionAdapters,
    ) -> StudyResult<bool> {
        let Some(ticket) = self.pending.take_due(now_ns) else {
            return Ok(false);
        };
        let Some(condition) = current else {
            error!(?ticket, "selection lockout expired without a condition; input stays disabled");
            return Err(UnknownCondition::none().into());
        };
        if condition.has_button_input() {
            adapters.get_mut(condition).set_input_enabled(true);
        }
        debug!(%condition, ?ticket, "selection lockout released");
        Ok(true)
    }

    pub fn cancel(&mut self) -> Option<Ticket> {
        self.pending.cancel()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_pending()
    }

    pub fn remaining(&self, now_ns: u64) -> Option<Duration> {
        self.pending.remaining(now_ns)
    }
}
