use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// MachineState
// ---------------------------------------------------------------------------

/// Lifecycle state of the phone book machine. There is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineState {
    Idle,
    Ready,
    Running,
}

impl MachineState {
    pub fn as_str(self) -> &'static str {
        match self {
            MachineState::Idle => "idle",
            MachineState::Ready => "ready",
            MachineState::Running => "running",
        }
    }
}

impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DialogMode
// ---------------------------------------------------------------------------

/// Which transition a dialog submission should trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogMode {
    Closed,
    Create,
    Update,
    Delete,
    Reset,
}

impl DialogMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DialogMode::Closed => "closed",
            DialogMode::Create => "create",
            DialogMode::Update => "update",
            DialogMode::Delete => "delete",
            DialogMode::Reset => "reset",
        }
    }
}

impl fmt::Display for DialogMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DialogMode {
    type Err = crate::error::PhonebookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "closed" => Ok(DialogMode::Closed),
            "create" => Ok(DialogMode::Create),
            "update" => Ok(DialogMode::Update),
            "delete" => Ok(DialogMode::Delete),
            "reset" => Ok(DialogMode::Reset),
            _ => Err(crate::error::PhonebookError::InvalidMode(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// FilterMode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Case-insensitive pattern against the display name.
    Name,
    /// `>N`, `<N`, `>=N`, `<=N`, `N-M`, `N,M,K`, `N`, `=N` against the age.
    #[default]
    Age,
}

impl FilterMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterMode::Name => "name",
            FilterMode::Age => "age",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FilterMode {
    type Err = crate::error::PhonebookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(FilterMode::Name),
            "age" => Ok(FilterMode::Age),
            _ => Err(crate::error::PhonebookError::InvalidFilter(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn dialog_mode_parses_case_insensitively() {
        assert_eq!(DialogMode::from_str("UPDATE").unwrap(), DialogMode::Update);
        assert_eq!(DialogMode::from_str("reset").unwrap(), DialogMode::Reset);
        assert!(DialogMode::from_str("archive").is_err());
    }

    #[test]
    fn display_matches_serde_names() {
        for state in [MachineState::Idle, MachineState::Ready, MachineState::Running] {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{state}\""));
        }
    }

    #[test]
    fn filter_mode_defaults_to_age() {
        assert_eq!(FilterMode::default(), FilterMode::Age);
        assert!(FilterMode::from_str("phone").is_err());
    }
}
