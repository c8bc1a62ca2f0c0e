//! Round counter and debate-in-progress flag.

/// Tracks which round the service reports and whether a debate is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundTracker {
    current_round: u32,
    total_rounds: Option<u32>,
    debating: bool,
}

impl RoundTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a round start. Round numbers are taken as-is; nothing
    /// enforces that they increase.
    pub fn start_round(&mut self, round: u32, total_rounds: Option<u32>) {
        self.current_round = round;
        if total_rounds.is_some() {
            self.total_rounds = total_rounds;
        }
        self.debating = true;
    }

    /// Marks the debate finished and resets the counter.
    pub fn complete(&mut self) {
        self.debating = false;
        self.current_round = 0;
        self.total_rounds = None;
    }

    /// Optimistically marks a debate as started before any round arrives.
    pub fn begin(&mut self) {
        self.debating = true;
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn total_rounds(&self) -> Option<u32> {
        self.total_rounds
    }

    pub fn is_debating(&self) -> bool {
        self.debating
    }
}
