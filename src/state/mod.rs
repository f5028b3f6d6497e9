pub mod clock;
pub mod game;
pub mod mining;
pub mod store;

pub use clock::{BrowserClock, Clock, Entropy, MathRandom};
pub use game::{Cell, CellKind, GameRound, Phase, RevealOutcome};
pub use mining::MiningEngine;
pub use store::{LocalStore, MemoryStore, StateStore};

/// A reserved claim slot: the amount handed to the settlement bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClaimTicket {
    /// Distinguishes successive claims from the same engine.
    pub serial: u32,
    pub amount: u64,
}
