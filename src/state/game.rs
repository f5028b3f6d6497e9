//! Timed tap game.
//!
//! `Idle -> Running -> Finished -> Idle`. A round is won by revealing every
//! target cell; otherwise it ends when the countdown reaches [`MAX_TIME`].
//! Either way the score depends only on elapsed seconds.

use super::ClaimTicket;
use super::clock::Entropy;
use crate::error::{GameError, SettlementError};
use crate::util::clog;

pub const GRID_SIZE: usize = 25;
pub const BLUE_COUNT: usize = 13;
pub const MAX_TIME: u32 = 30;

/// `(minimum score, reward)`, highest threshold first.
const REWARD_TIERS: [(u32, u32); 4] = [(12_000, 10), (10_000, 7), (7_000, 4), (4_000, 2)];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    Target,
    Decoy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub id: u32,
    pub kind: CellKind,
    pub revealed: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundSummary {
    pub score: u32,
    pub reward: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Not running, unknown id, or already revealed.
    Ignored,
    Revealed,
    Won(RoundSummary),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitOutcome {
    Exited,
    /// A claim is settling; the exit happens once it does.
    Deferred,
}

pub fn score_for_elapsed(elapsed_seconds: u32) -> u32 {
    let max = BLUE_COUNT as u32 * 1000;
    max.saturating_sub(elapsed_seconds.saturating_mul(100))
}

pub fn reward_for_score(score: u32) -> u32 {
    REWARD_TIERS
        .iter()
        .find(|(min, _)| score >= *min)
        .map(|(_, reward)| *reward)
        .unwrap_or(0)
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GameRound {
    cells: Vec<Cell>,
    elapsed_seconds: u32,
    phase: Phase,
    score: u32,
    reward: u32,
    claim_in_flight: Option<ClaimTicket>,
    exit_requested: bool,
    next_serial: u32,
}

impl GameRound {
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn reward(&self) -> u32 {
        self.reward
    }

    pub fn claim_in_flight(&self) -> Option<ClaimTicket> {
        self.claim_in_flight
    }

    /// True while ticks advance the round. The caller arms its one-second
    /// timer when this turns on, so the first tick lands a full second in.
    pub fn countdown_active(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn targets_left(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.kind == CellKind::Target && !c.revealed)
            .count()
    }

    /// Deals a fresh grid and starts the countdown. Refused while a claim
    /// from the previous round is settling.
    pub fn start(&mut self, rng: &mut dyn Entropy) -> Result<(), GameError> {
        if self.claim_in_flight.is_some() {
            return Err(GameError::ClaimInProgress);
        }
        // Partial Fisher-Yates: the first BLUE_COUNT slots become targets.
        let mut order: Vec<usize> = (0..GRID_SIZE).collect();
        for i in 0..BLUE_COUNT {
            let j = i + rng.next_index(GRID_SIZE - i);
            order.swap(i, j);
        }
        let mut kinds = [CellKind::Decoy; GRID_SIZE];
        for &pos in &order[..BLUE_COUNT] {
            kinds[pos] = CellKind::Target;
        }
        self.cells = kinds
            .iter()
            .enumerate()
            .map(|(i, &kind)| Cell {
                id: i as u32,
                kind,
                revealed: false,
            })
            .collect();
        self.elapsed_seconds = 0;
        self.score = 0;
        self.reward = 0;
        self.exit_requested = false;
        self.phase = Phase::Running;
        Ok(())
    }

    /// One second of countdown. Ends the round on expiry.
    pub fn tick(&mut self) -> Option<RoundSummary> {
        if self.phase != Phase::Running {
            return None;
        }
        self.elapsed_seconds = (self.elapsed_seconds + 1).min(MAX_TIME);
        if self.elapsed_seconds >= MAX_TIME {
            return Some(self.end_round());
        }
        None
    }

    pub fn reveal(&mut self, cell_id: u32) -> RevealOutcome {
        if self.phase != Phase::Running {
            return RevealOutcome::Ignored;
        }
        let Some(cell) = self.cells.iter_mut().find(|c| c.id == cell_id) else {
            return RevealOutcome::Ignored;
        };
        if cell.revealed {
            return RevealOutcome::Ignored;
        }
        cell.revealed = true;
        if cell.kind == CellKind::Target && self.targets_left() == 0 {
            return RevealOutcome::Won(self.end_round());
        }
        RevealOutcome::Revealed
    }

    fn end_round(&mut self) -> RoundSummary {
        self.phase = Phase::Finished;
        self.score = score_for_elapsed(self.elapsed_seconds);
        self.reward = reward_for_score(self.score);
        clog(&format!(
            "round finished at {}s: score {} reward {}",
            self.elapsed_seconds, self.score, self.reward
        ));
        RoundSummary {
            score: self.score,
            reward: self.reward,
        }
    }

    /// Clears the round back to idle, or defers that while a claim settles.
    pub fn exit(&mut self) -> ExitOutcome {
        if self.claim_in_flight.is_some() {
            self.exit_requested = true;
            return ExitOutcome::Deferred;
        }
        self.clear();
        ExitOutcome::Exited
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.elapsed_seconds = 0;
        self.phase = Phase::Idle;
        self.score = 0;
        self.reward = 0;
        self.exit_requested = false;
    }

    pub fn begin_claim(&mut self) -> Result<ClaimTicket, GameError> {
        if self.claim_in_flight.is_some() {
            return Err(GameError::ClaimInProgress);
        }
        if self.reward == 0 {
            return Err(GameError::NoReward);
        }
        self.next_serial = self.next_serial.wrapping_add(1);
        let ticket = ClaimTicket {
            serial: self.next_serial,
            amount: u64::from(self.reward),
        };
        self.claim_in_flight = Some(ticket);
        clog(&format!("game claim of {} submitted", self.reward));
        Ok(ticket)
    }

    /// Success consumes the reward (score and reward drop to zero) but leaves
    /// the finished grid in place. A deferred exit is applied either way.
    pub fn settle_claim(&mut self, outcome: Result<(), SettlementError>) -> Result<u64, GameError> {
        let ticket = self
            .claim_in_flight
            .take()
            .ok_or(GameError::NoClaimPending)?;
        if outcome.is_ok() {
            self.reward = 0;
            self.score = 0;
        }
        if self.exit_requested {
            self.clear();
        }
        outcome?;
        Ok(ticket.amount)
    }
}
