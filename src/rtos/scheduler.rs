//! Round-robin slot selection for the main loop

use super::task::{TaskId, TASK_COUNT};

/// Cursor over the fixed task table.
///
/// Each call to [`RoundRobin::advance`] moves to the next slot; past the last
/// slot the cursor resets to the first. There are no priorities and no
/// preemption: one slot per main-loop pass.
pub struct RoundRobin {
    slot: u8,
}

impl RoundRobin {
    pub const fn new() -> Self {
        Self { slot: 0 }
    }

    /// Select the task for this pass
    pub fn advance(&mut self) -> TaskId {
        self.slot += 1;
        if self.slot > TASK_COUNT {
            self.slot = 1;
        }
        TaskId::ALL[usize::from(self.slot - 1)]
    }
}

impl Default for RoundRobin {
    fn default() -> Self {
        Self::new()
    }
}
