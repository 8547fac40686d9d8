//! The round runner.
//!
//! One [`Engine`] per device. Rounds are strictly sequential: the engine owns
//! the state store and the latest inbound envelopes, builds a fresh
//! [`RoundContext`] per round, and commits the outbound envelope only when
//! the program ran to completion. A failed round leaves the previously
//! committed state untouched; the device just tries again next round.

use crate::context::RoundContext;
use crate::envelope::InboundEnvelopes;
use crate::errors::{Result, RoundError};
use crate::path::Path;
use crate::state::StateStore;
use crate::wire::Message;
use fieldcast_core::DeviceId;

/// Where a device is in its round lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStatus {
    /// No round running; ready to receive messages and start one
    Idle,
    /// The user program is executing
    RoundInProgress,
    /// The last round committed; equivalent to `Idle` for starting the next
    RoundCommitted,
}

/// Per-device execution engine.
#[derive(Debug)]
pub struct Engine {
    id: DeviceId,
    status: RoundStatus,
    rounds_committed: u64,
    state: StateStore,
    inbound: InboundEnvelopes,
}

impl Engine {
    /// Create an engine for `id` with empty state.
    pub fn new(id: DeviceId) -> Self {
        Self {
            id,
            status: RoundStatus::Idle,
            rounds_committed: 0,
            state: StateStore::new(),
            inbound: InboundEnvelopes::new(),
        }
    }

    /// This engine's device id.
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Current lifecycle status.
    pub fn status(&self) -> RoundStatus {
        self.status
    }

    /// Number of successfully committed rounds.
    pub fn rounds_committed(&self) -> u64 {
        self.rounds_committed
    }

    /// Number of paths retained by the committed state store.
    pub fn committed_path_count(&self) -> usize {
        self.state.len()
    }

    /// Iterate over the paths retained by the committed state store.
    pub fn committed_paths(&self) -> impl Iterator<Item = &Path> {
        self.state.paths()
    }

    /// Install a neighbor's message as its latest envelope.
    ///
    /// A device's own broadcast echoed back by the transport is dropped: a
    /// device is never its own neighbor.
    pub fn receive(&mut self, message: Message) -> Result<()> {
        if self.status == RoundStatus::RoundInProgress {
            return Err(RoundError::RoundInProgress);
        }
        if message.sender == self.id {
            tracing::trace!(device = %self.id, "dropping own echoed message");
            return Ok(());
        }
        self.inbound.accept(message);
        Ok(())
    }

    /// Drop a departed neighbor's latest message so its values stop
    /// appearing in fields. Returns whether anything was held.
    pub fn forget_neighbor(&mut self, neighbor: DeviceId) -> bool {
        self.inbound.forget(neighbor)
    }

    /// Execute one round of `program`.
    ///
    /// Resets the alignment scope, binds the state store and inbound
    /// envelopes read-only, runs the program, then commits the outbound
    /// envelope into the state store and freezes it into the broadcast
    /// message. On any error the round is treated as not having happened.
    pub fn run_round<R>(
        &mut self,
        program: impl FnOnce(&mut RoundContext<'_>) -> Result<R>,
    ) -> Result<(R, Message)> {
        if self.status == RoundStatus::RoundInProgress {
            return Err(RoundError::RoundInProgress);
        }
        self.status = RoundStatus::RoundInProgress;

        let mut ctx = RoundContext::new(self.id, &self.state, &self.inbound);
        let result = match program(&mut ctx) {
            Ok(result) => result,
            Err(err) => {
                self.status = RoundStatus::Idle;
                tracing::debug!(device = %self.id, error = %err, "round aborted");
                return Err(err);
            }
        };

        let message = ctx.into_outbound().freeze(self.id);
        self.state.commit(message.exports.clone());
        self.rounds_committed += 1;
        self.status = RoundStatus::RoundCommitted;
        tracing::debug!(
            device = %self.id,
            round = self.rounds_committed,
            exports = message.len(),
            "round committed"
        );
        Ok((result, message))
    }
}
