//! Reducers wrapping the two engines for the views.
//!
//! Each UI action becomes one engine transition; the outcome is recorded as a
//! status line. Claims are two-step: `Claim` reserves the slot and the view
//! settles the ticket, then reports back with `ClaimSettled`.

use std::cell::RefCell;
use std::rc::Rc;
use yew::Reducible;

use crate::error::{ErrorKind, SettlementError};
use crate::state::game::{ExitOutcome, RoundSummary};
use crate::state::{Clock, Entropy, GameRound, MiningEngine, Phase, RevealOutcome, StateStore};
use crate::util::cerror;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    /// `None` for progress and success messages.
    pub error: Option<ErrorKind>,
}

impl StatusLine {
    fn info(text: impl Into<String>) -> Option<Self> {
        Some(Self {
            text: text.into(),
            error: None,
        })
    }

    fn failed(err: impl std::fmt::Display, kind: ErrorKind) -> Option<Self> {
        let text = match kind {
            ErrorKind::Upstream => format!("{err} ❌"),
            _ => err.to_string(),
        };
        cerror(&text);
        Some(Self {
            text,
            error: Some(kind),
        })
    }
}

// ---------------- Mining -----------------
#[derive(Clone, Debug)]
pub enum MiningAction {
    Tick, // once per second
    Start,
    Claim,
    ClaimSettled {
        serial: u32,
        outcome: Result<(), SettlementError>,
    },
}

#[derive(Clone)]
pub struct MiningModel {
    pub engine: MiningEngine,
    pub status: Option<StatusLine>,
}

impl MiningModel {
    pub fn load(clock: Rc<dyn Clock>, store: Rc<dyn StateStore>) -> Self {
        let mut engine = MiningEngine::load(clock, store);
        engine.tick();
        Self {
            engine,
            status: None,
        }
    }
}

impl Reducible for MiningModel {
    type Action = MiningAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        use MiningAction::*;
        let mut new = (*self).clone();
        match action {
            Tick => {
                if new.engine.tick().is_none() {
                    return self;
                }
            }
            Start => {
                new.status = match new.engine.start() {
                    Ok(_) => StatusLine::info("Mining started 🪙"),
                    Err(e) => StatusLine::failed(&e, e.kind()),
                };
            }
            Claim => {
                new.status = match new.engine.begin_claim() {
                    Ok(_) => StatusLine::info("Claiming mining reward..."),
                    Err(e) => StatusLine::failed(&e, e.kind()),
                };
            }
            ClaimSettled { serial, outcome } => {
                if new.engine.claim_in_flight().map(|t| t.serial) != Some(serial) {
                    return self;
                }
                new.status = match new.engine.settle_claim(outcome) {
                    Ok(amount) => StatusLine::info(format!("Claimed {amount} mining points ✅")),
                    Err(e) => StatusLine::failed(&e, e.kind()),
                };
            }
        }
        Rc::new(new)
    }
}

// ---------------- Game -----------------
#[derive(Clone, Debug)]
pub enum GameAction {
    Start,
    Tick, // once per second
    Reveal(u32),
    Exit,
    Claim,
    ClaimSettled {
        serial: u32,
        outcome: Result<(), SettlementError>,
    },
}

#[derive(Clone)]
pub struct GameModel {
    pub round: GameRound,
    pub status: Option<StatusLine>,
    entropy: Rc<RefCell<dyn Entropy>>,
}

impl GameModel {
    pub fn new(entropy: Rc<RefCell<dyn Entropy>>) -> Self {
        Self {
            round: GameRound::default(),
            status: None,
            entropy,
        }
    }
}

impl Reducible for GameModel {
    type Action = GameAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        use GameAction::*;
        let mut new = (*self).clone();
        match action {
            Start => {
                let started = {
                    let mut rng = new.entropy.borrow_mut();
                    new.round.start(&mut *rng)
                };
                new.status = match started {
                    Ok(()) => StatusLine::info("Game started 🎮"),
                    Err(e) => StatusLine::failed(&e, e.kind()),
                };
            }
            Tick => match new.round.tick() {
                Some(RoundSummary { score, reward }) => {
                    new.status = StatusLine::info(format!(
                        "Time's up! Score {score}, reward {reward} 🎯"
                    ))
                }
                None if new.round.phase() == Phase::Running => {}
                None => return self,
            },
            Reveal(id) => match new.round.reveal(id) {
                RevealOutcome::Ignored => return self,
                RevealOutcome::Revealed => {}
                RevealOutcome::Won(RoundSummary { score, reward }) => {
                    new.status = StatusLine::info(format!(
                        "Game finished 🎯 Score {score}, reward {reward}"
                    ))
                }
            },
            Exit => {
                new.status = match new.round.exit() {
                    ExitOutcome::Exited => StatusLine::info("Game exited"),
                    ExitOutcome::Deferred => {
                        StatusLine::info("Exiting once the reward claim settles...")
                    }
                };
            }
            Claim => {
                new.status = match new.round.begin_claim() {
                    Ok(_) => StatusLine::info("Claiming game reward..."),
                    Err(e) => StatusLine::failed(&e, e.kind()),
                };
            }
            ClaimSettled { serial, outcome } => {
                if new.round.claim_in_flight().map(|t| t.serial) != Some(serial) {
                    return self;
                }
                new.status = match new.round.settle_claim(outcome) {
                    Ok(_) => StatusLine::info("Game reward claimed ✅"),
                    Err(e) => StatusLine::failed(&e, e.kind()),
                };
            }
        }
        Rc::new(new)
    }
}
