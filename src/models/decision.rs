//! Decision output model: verdict, action, reasons, and position state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RuleError;

/// Whether the stock currently has an open position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionState {
    /// No open position; entry rules apply
    Flat,
    /// Position held; exit rules apply
    Holding,
}

impl FromStr for PositionState {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flat" => Ok(Self::Flat),
            "holding" => Ok(Self::Holding),
            _ => Err(RuleError::InvalidPositionState),
        }
    }
}

/// Whether the evaluation allows acting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    /// A rule fired; the action may be taken
    Allow,
    /// No rule fired; hold still
    Block,
}

impl Verdict {
    /// Stable wire form (`ALLOW` / `BLOCK`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "ALLOW",
            Self::Block => "BLOCK",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The trade action a decision points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    /// Open a position
    Buy,
    /// Close the position
    Sell,
    /// Nothing to do
    None,
}

impl Action {
    /// Stable wire form (`BUY` / `SELL` / `NONE`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::None => "NONE",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reason attached to a decision.
///
/// Serializes without a `source` key when absent. The canonical JSON form
/// feeds the state-key hash, so the shape here is part of the stable
/// contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    /// Stable reason code (`ENTRY_TRIGGERED`, `EXIT_CONDITION_NOT_MET`, ...)
    pub code: String,
    /// The rule id the reason points at, when one applies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Reason {
    /// Reason with a code only
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            source: None,
        }
    }

    /// Reason with a code and a source rule id
    pub fn with_source(code: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            source: Some(source.into()),
        }
    }
}

/// The outcome of evaluating a rule plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// `ALLOW` or `BLOCK`
    pub decision: Verdict,
    /// `BUY`, `SELL`, or `NONE`
    pub action: Action,
    /// Deterministic change-detection fingerprint
    pub state_key: String,
    /// Ordered reasons explaining the outcome
    pub reasons: Vec<Reason>,
}

impl Decision {
    /// Whether this decision differs from a previously stored state key.
    ///
    /// `None` means nothing was stored yet, which counts as a change.
    pub fn changed_from(&self, previous_state_key: Option<&str>) -> bool {
        match previous_state_key {
            Some(previous) => previous != self.state_key,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_state_from_str() {
        assert_eq!("flat".parse::<PositionState>().unwrap(), PositionState::Flat);
        assert_eq!(
            "holding".parse::<PositionState>().unwrap(),
            PositionState::Holding
        );
        assert!("long".parse::<PositionState>().is_err());
        assert!("FLAT".parse::<PositionState>().is_err());
    }

    #[test]
    fn test_reason_serialization_omits_missing_source() {
        let with = Reason::with_source("ENTRY_TRIGGERED", "E1");
        let without = Reason::new("ENTRY_CONDITION_NOT_MET");
        assert_eq!(
            serde_json::to_string(&with).unwrap(),
            r#"{"code":"ENTRY_TRIGGERED","source":"E1"}"#
        );
        assert_eq!(
            serde_json::to_string(&without).unwrap(),
            r#"{"code":"ENTRY_CONDITION_NOT_MET"}"#
        );
    }

    #[test]
    fn test_wire_enums() {
        assert_eq!(serde_json::to_string(&Verdict::Allow).unwrap(), "\"ALLOW\"");
        assert_eq!(serde_json::to_string(&Action::None).unwrap(), "\"NONE\"");
        assert_eq!(
            serde_json::to_string(&PositionState::Holding).unwrap(),
            "\"holding\""
        );
    }

    #[test]
    fn test_changed_from() {
        let decision = Decision {
            decision: Verdict::Block,
            action: Action::None,
            state_key: "BLOCK_NONE_NONE_QK55OQEO".to_string(),
            reasons: vec![Reason::new("ENTRY_CONDITION_NOT_MET")],
        };
        assert!(decision.changed_from(None));
        assert!(decision.changed_from(Some("ALLOW_BUY_E1_EA23XMW5")));
        assert!(!decision.changed_from(Some("BLOCK_NONE_NONE_QK55OQEO")));
    }
}
