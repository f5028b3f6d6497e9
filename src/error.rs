//! Error types for the reward engines and their collaborators.
//!
//! Every variant maps onto one [`ErrorKind`] so the views can decide how to
//! present it. None of them is fatal: the engines reject before mutating.

use thiserror::Error;

/// Coarse classification shared by all error enums.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed input; retrying the same call will fail again.
    Validation,
    /// The looked-up entity does not exist.
    NotFound,
    /// A collaborator (wallet, profile service) failed.
    Upstream,
    /// The operation is not allowed in the current state.
    Precondition,
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum SettlementError {
    #[error("No wallet provider available")]
    NoProvider,

    #[error("Wallet has no connected account")]
    NoAccount,

    #[error("Settlement amount must be positive")]
    ZeroAmount,

    #[error("Settlement rejected: {0}")]
    Rejected(String),
}

impl SettlementError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SettlementError::ZeroAmount => ErrorKind::Validation,
            _ => ErrorKind::Upstream,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum MiningError {
    #[error("Mining already running")]
    AlreadyRunning,

    #[error("Minimum {min} points required to claim (have {have})")]
    InsufficientPoints { have: u64, min: u64 },

    #[error("A mining claim is already in progress")]
    ClaimInProgress,

    #[error("No mining claim is in progress")]
    NoClaimPending,

    #[error("Mining claim failed: {0}")]
    Settlement(#[from] SettlementError),
}

impl MiningError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MiningError::Settlement(e) => e.kind(),
            _ => ErrorKind::Precondition,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum GameError {
    #[error("No reward to claim")]
    NoReward,

    #[error("A game claim is already in progress")]
    ClaimInProgress,

    #[error("No game claim is in progress")]
    NoClaimPending,

    #[error("Game claim failed: {0}")]
    Settlement(#[from] SettlementError),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::Settlement(e) => e.kind(),
            _ => ErrorKind::Precondition,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ProfileError {
    #[error("FID is required")]
    BadRequest,

    #[error("Profile service is missing its API credential")]
    MissingCredential,

    #[error("User not found")]
    NotFound,

    #[error("Profile lookup failed: {0}")]
    LookupFailed(String),
}

impl ProfileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProfileError::BadRequest => ErrorKind::Validation,
            ProfileError::NotFound => ErrorKind::NotFound,
            ProfileError::MissingCredential | ProfileError::LookupFailed(_) => ErrorKind::Upstream,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config override: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid claim contract address: {0}")]
    BadAddress(String),

    #[error("Unsupported token decimals: {0}")]
    BadDecimals(u32),
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}
