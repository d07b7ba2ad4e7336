//! Finder dialog state machine and the persisted user profile.

use serde::{Deserialize, Serialize};

use crate::catalog::Facility;
use crate::geo::Distance;
use crate::ranker::RankedFacility;

/// The phases of the finder dialog.
///
/// Progresses linearly: Idle → AwaitingLocation → AwaitingSelection → Complete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinderPhase {
    #[default]
    Idle,
    AwaitingLocation,
    AwaitingSelection,
    Complete,
}

impl FinderPhase {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: FinderPhase) -> bool {
        use FinderPhase::*;
        matches!(
            (self, target),
            (Idle, AwaitingLocation) | (AwaitingLocation, AwaitingSelection) | (AwaitingSelection, Complete)
        )
    }

    /// Whether this phase is terminal (dialog is done).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Whether the dialog is waiting on the user.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::AwaitingLocation | Self::AwaitingSelection)
    }

    /// Get the next phase in the linear progression, if any.
    pub fn next(&self) -> Option<FinderPhase> {
        use FinderPhase::*;
        match self {
            Idle => Some(AwaitingLocation),
            AwaitingLocation => Some(AwaitingSelection),
            AwaitingSelection => Some(Complete),
            Complete => None,
        }
    }
}

impl std::fmt::Display for FinderPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::AwaitingLocation => "awaiting_location",
            Self::AwaitingSelection => "awaiting_selection",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

/// Why the dialog was started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinderPurpose {
    /// Show a nearby clinic.
    #[default]
    Find,
    /// Pick a clinic and remember it as the user's preferred one.
    Set,
}

/// One entry of the shortlist offered to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shortlisted {
    pub facility: Facility,
    pub distance: Distance,
}

impl From<RankedFacility> for Shortlisted {
    fn from(ranked: RankedFacility) -> Self {
        Self {
            facility: (*ranked.facility).clone(),
            distance: ranked.distance,
        }
    }
}

/// Persisted dialog state, stored per conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinderState {
    pub phase: FinderPhase,
    pub purpose: FinderPurpose,
    /// Shortlist the user is choosing from.
    #[serde(default)]
    pub candidates: Vec<Shortlisted>,
    /// Invalid answers given to the current prompt.
    #[serde(default)]
    pub reprompts: u32,
}

impl FinderState {
    pub fn new(purpose: FinderPurpose) -> Self {
        Self {
            purpose,
            ..Default::default()
        }
    }

    /// Advance to the next phase. Returns an error if already at terminal phase.
    pub fn advance(&mut self) -> Result<FinderPhase, String> {
        let next = self
            .phase
            .next()
            .ok_or_else(|| "Already at terminal phase".to_string())?;
        if !self.phase.can_transition_to(next) {
            return Err(format!("Cannot transition from {} to {}", self.phase, next));
        }
        self.phase = next;
        self.reprompts = 0;
        Ok(next)
    }

    /// Count an invalid answer; returns the new count.
    pub fn record_reprompt(&mut self) -> u32 {
        self.reprompts += 1;
        self.reprompts
    }
}

/// Persisted user profile, stored per user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Last location the user gave, as typed.
    pub location: Option<String>,
    /// 1-based option picked from the last shortlist.
    pub selected: Option<usize>,
    pub preferred_clinic: Option<Facility>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions() {
        use FinderPhase::*;
        for (from, to) in [
            (Idle, AwaitingLocation),
            (AwaitingLocation, AwaitingSelection),
            (AwaitingSelection, Complete),
        ] {
            assert!(from.can_transition_to(to), "{from} should transition to {to}");
        }
    }

    #[test]
    fn invalid_transitions() {
        use FinderPhase::*;
        assert!(!Idle.can_transition_to(AwaitingSelection));
        assert!(!AwaitingSelection.can_transition_to(AwaitingLocation));
        assert!(!Complete.can_transition_to(Idle));
        assert!(!AwaitingLocation.can_transition_to(AwaitingLocation));
    }

    #[test]
    fn active_phases() {
        use FinderPhase::*;
        assert!(!Idle.is_active());
        assert!(AwaitingLocation.is_active());
        assert!(AwaitingSelection.is_active());
        assert!(!Complete.is_active());
        assert!(Complete.is_terminal());
    }

    #[test]
    fn display_matches_serde() {
        use FinderPhase::*;
        for phase in [Idle, AwaitingLocation, AwaitingSelection, Complete] {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(format!("\"{phase}\""), json, "Display and serde should match for {phase:?}");
        }
    }

    #[test]
    fn advance_walks_all_phases_and_resets_reprompts() {
        let mut state = FinderState::new(FinderPurpose::Set);
        for expected in [
            FinderPhase::AwaitingLocation,
            FinderPhase::AwaitingSelection,
            FinderPhase::Complete,
        ] {
            state.record_reprompt();
            assert_eq!(state.advance().unwrap(), expected);
            assert_eq!(state.reprompts, 0);
        }
        assert!(state.advance().is_err());
        assert_eq!(state.purpose, FinderPurpose::Set);
    }

    #[test]
    fn state_deserializes_without_optional_fields() {
        let parsed: FinderState = serde_json::from_value(serde_json::json!({
            "phase": "awaiting_location",
            "purpose": "find"
        }))
        .unwrap();
        assert_eq!(parsed.phase, FinderPhase::AwaitingLocation);
        assert!(parsed.candidates.is_empty());
        assert_eq!(parsed.reprompts, 0);
    }
}
