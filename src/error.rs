//! Error types for storage, upgrades and session commands.

use thiserror::Error;

use crate::progression::UpgradeKind;
use crate::session::RunPhase;

/// Failures of the key-value backend or of a stored record.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend could not be reached at all (no window, storage disabled).
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    /// Read or write failed.
    #[error("I/O error on key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Record exists but does not decode.
    #[error("corrupt persisted state under '{key}': {reason}")]
    CorruptPersistedState { key: String, reason: String },
}

/// Rejected upgrade purchase. No state was changed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("not enough currency for {kind}: costs {cost}, have {currency}")]
    InsufficientFunds {
        kind: UpgradeKind,
        cost: u64,
        currency: u64,
    },

    #[error("{kind} is already at its maximum level")]
    MaxLevelReached { kind: UpgradeKind },
}

/// Rejected session command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no saved run to resume")]
    NoSavedRun,

    #[error("level is not cleared (phase: {phase:?})")]
    NotLevelCleared { phase: RunPhase },

    #[error("cannot {command} while {phase:?}")]
    InvalidPhase {
        command: &'static str,
        phase: RunPhase,
    },

    #[error(transparent)]
    Purchase(#[from] PurchaseError),
}
