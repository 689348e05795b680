/// Number of task slots served by the main loop
pub const TASK_COUNT: u8 = 4;

/// Task slots, in dispatch order
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum TaskId {
    /// Measure the supply rail against the internal reference
    Supply = 1,
    /// Measure the HV rail through the sense divider
    HighVoltage = 2,
    /// Drive the status LED and the fire-ready flag
    Indicator = 3,
    /// Poll the serial console for one command byte
    Console = 4,
}

impl TaskId {
    pub const ALL: [TaskId; TASK_COUNT as usize] = [
        TaskId::Supply,
        TaskId::HighVoltage,
        TaskId::Indicator,
        TaskId::Console,
    ];

    /// Slot number, 1-based
    #[cfg(test)]
    pub(crate) fn slot(self) -> u8 {
        self as u8
    }
}

/// Result of one task invocation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The task finished its work for this pass
    Done,
    /// A precondition failed; the task abandoned this pass and runs again on
    /// its next turn
    Retry,
}
