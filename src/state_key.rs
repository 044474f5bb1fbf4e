//! Deterministic decision fingerprints for change detection.
//!
//! Callers persist one `{stock_id, state_key, decision}` row per stock and
//! signal a change iff a fresh evaluation produces a different key. The
//! algorithm is part of the stable external contract: any change here
//! invalidates every persisted decision state.

use data_encoding::BASE32;
use sha2::{Digest, Sha256};

use crate::models::{Action, Reason, Verdict};

/// Build the state key for a decision.
///
/// Format: `<decision>_<action>_<ids_part>_<reason_hash>` where `ids_part`
/// is the triggered rule ids sorted ascending and comma-joined (`NONE` when
/// empty), and `reason_hash` is the first 8 characters of the base32
/// (RFC 4648, padded alphabet) SHA-256 of the reasons serialized as
/// canonical JSON: sorted by `(code, source)`, reduced to their `code` and
/// `source` keys, no whitespace.
///
/// # Example
///
/// ```
/// use finance_rules::state_key::build_state_key;
/// use finance_rules::{Action, Reason, Verdict};
///
/// let key = build_state_key(
///     Verdict::Allow,
///     Action::Buy,
///     &["E1".to_string()],
///     &[Reason::with_source("ENTRY_TRIGGERED", "E1")],
/// );
/// assert_eq!(key, "ALLOW_BUY_E1_EA23XMW5");
/// ```
pub fn build_state_key(
    decision: Verdict,
    action: Action,
    rule_ids: &[String],
    reasons: &[Reason],
) -> String {
    let mut ids: Vec<&str> = rule_ids.iter().map(String::as_str).collect();
    ids.sort_unstable();
    let ids_part = if ids.is_empty() {
        "NONE".to_string()
    } else {
        ids.join(",")
    };

    let mut normalized: Vec<&Reason> = reasons.iter().collect();
    normalized.sort_by(|a, b| {
        (a.code.as_str(), a.source.as_deref().unwrap_or(""))
            .cmp(&(b.code.as_str(), b.source.as_deref().unwrap_or("")))
    });
    // Reason serializes exactly its code and optional source, in that order
    let payload =
        serde_json::to_string(&normalized).expect("reason serialization cannot fail");

    let digest = Sha256::digest(payload.as_bytes());
    let encoded = BASE32.encode(digest.as_slice());

    format!(
        "{}_{}_{}_{}",
        decision.as_str(),
        action.as_str(),
        ids_part,
        &encoded[..8]
    )
}
