//! Leaderboard view state.
//!
//! Tracks whether the board is loading, showing results, or showing an
//! error, and runs the fetch / aggregate cycle behind a refresh. Each
//! refresh takes a ticket with a sequence number; only the latest ticket
//! may settle the state, so an older cycle that finishes late is dropped.

use crate::error::LeaderboardError;
use crate::models::{Leaderboard, ScoringPolicy};
use crate::scoring::aggregate;
use crate::source::RecordSource;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// What the board currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// A refresh cycle is in flight.
    Loading,
    /// The latest cycle succeeded.
    Ready(Leaderboard),
    /// The latest cycle failed with this message.
    Error(String),
}

/// Handle for one refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// The Loading / Ready / Error transitions, without any I/O.
#[derive(Debug)]
pub struct ViewStateMachine {
    state: ViewState,
    issued: u64,
}

impl Default for ViewStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewStateMachine {
    pub fn new() -> Self {
        Self {
            state: ViewState::Loading,
            issued: 0,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Enter `Loading` and issue a ticket newer than every earlier one.
    ///
    /// Accepted from any state.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued += 1;
        self.state = ViewState::Loading;
        RefreshTicket(self.issued)
    }

    /// Apply a cycle's outcome if `ticket` is the latest issued.
    ///
    /// Returns `false` when the ticket was superseded and the outcome dropped.
    pub fn settle(
        &mut self,
        ticket: RefreshTicket,
        outcome: Result<Leaderboard, LeaderboardError>,
    ) -> bool {
        if ticket.0 != self.issued {
            debug!(
                "Dropping result of refresh #{} (latest is #{})",
                ticket.0, self.issued
            );
            return false;
        }

        self.state = match outcome {
            Ok(board) => ViewState::Ready(board),
            Err(e) => ViewState::Error(e.to_string()),
        };
        true
    }
}

/// A leaderboard bound to one source and one scoring policy.
pub struct LeaderboardView {
    source: Arc<dyn RecordSource>,
    policy: ScoringPolicy,
    machine: Mutex<ViewStateMachine>,
}

impl LeaderboardView {
    pub fn new(source: Arc<dyn RecordSource>, policy: ScoringPolicy) -> Self {
        Self {
            source,
            policy,
            machine: Mutex::new(ViewStateMachine::new()),
        }
    }

    pub fn source_location(&self) -> &str {
        self.source.location()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ViewState {
        self.machine().state().clone()
    }

    /// Run one fetch / aggregate cycle and return the state afterwards.
    ///
    /// The state lock is released while fetching, so overlapping refreshes
    /// run side by side; the one started last decides the final state.
    pub async fn refresh(&self) -> ViewState {
        let ticket = self.machine().begin_refresh();
        info!(
            "Refreshing leaderboard #{} from {}",
            ticket.sequence(),
            self.source.location()
        );

        let outcome = self.run_cycle().await;
        if let Err(ref e) = outcome {
            warn!("Refresh #{} failed: {}", ticket.sequence(), e);
        }

        let mut machine = self.machine();
        machine.settle(ticket, outcome);
        machine.state().clone()
    }

    async fn run_cycle(&self) -> Result<Leaderboard, LeaderboardError> {
        let records = self.source.fetch().await?;
        let entries = aggregate(&records, self.policy)?;
        Ok(Leaderboard::new(self.policy, entries, records.len()))
    }

    fn machine(&self) -> MutexGuard<'_, ViewStateMachine> {
        self.machine.lock().unwrap_or_else(|e| e.into_inner())
    }
}
