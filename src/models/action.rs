use serde::{Deserialize, Serialize};
use std::fmt;

/// What a captured event does to an employee's shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockAction {
    ClockIn,
    ClockOut,
}

impl ClockAction {
    /// Convert enum → DB / wire string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ClockAction::ClockIn => "clock_in",
            ClockAction::ClockOut => "clock_out",
        }
    }

    /// Convert DB / wire string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "clock_in" => Some(ClockAction::ClockIn),
            "clock_out" => Some(ClockAction::ClockOut),
            _ => None,
        }
    }

    /// The action that follows the last recorded one.
    /// No history, or a closed shift, opens a new one.
    pub fn next_after(last: Option<ClockAction>) -> ClockAction {
        match last {
            None | Some(ClockAction::ClockOut) => ClockAction::ClockIn,
            Some(ClockAction::ClockIn) => ClockAction::ClockOut,
        }
    }

    pub fn is_in(&self) -> bool {
        matches!(self, ClockAction::ClockIn)
    }

    /// Past-tense phrase for operator messages.
    pub fn describe(&self) -> &'static str {
        match self {
            ClockAction::ClockIn => "clocked in",
            ClockAction::ClockOut => "clocked out",
        }
    }
}

impl fmt::Display for ClockAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}
