//! Time-based mining accrual.
//!
//! A cycle starts at `started_at` and accrues points linearly toward
//! [`DAILY_CAP`] over [`CYCLE_DURATION_MS`]. Points are never advanced
//! tick-by-tick: every recomputation re-derives them from `started_at` and the
//! injected clock, so reloads and missed ticks do not drift.

use std::rc::Rc;

use super::ClaimTicket;
use super::clock::{Clock, EpochMillis};
use super::store::{KEY_POINTS, KEY_STARTED_AT, StateStore};
use crate::error::{MiningError, SettlementError};
use crate::util::{clog, cwarn};

pub const DAILY_CAP: f64 = 100.0;
pub const CYCLE_DURATION_SECS: u64 = 24 * 60 * 60;
pub const CYCLE_DURATION_MS: u64 = CYCLE_DURATION_SECS * 1000;
/// Points per second (~0.0011574).
pub const ACCRUAL_RATE: f64 = DAILY_CAP / CYCLE_DURATION_SECS as f64;
pub const MIN_CLAIM: u64 = 5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Accrual {
    pub points: f64,
    pub remaining_ms: u64,
}

/// Points accrued at `now` for a cycle that began at `started_at`.
pub fn accrual_at(started_at: EpochMillis, now: EpochMillis) -> Accrual {
    let elapsed = now.saturating_sub(started_at);
    if elapsed >= CYCLE_DURATION_MS {
        return Accrual {
            points: DAILY_CAP,
            remaining_ms: 0,
        };
    }
    // elapsed_secs * ACCRUAL_RATE, kept in integer milliseconds for exact thresholds
    let points = (elapsed as f64 * DAILY_CAP / CYCLE_DURATION_MS as f64).min(DAILY_CAP);
    Accrual {
        points,
        remaining_ms: CYCLE_DURATION_MS - elapsed,
    }
}

#[derive(Clone)]
pub struct MiningEngine {
    clock: Rc<dyn Clock>,
    store: Rc<dyn StateStore>,
    started_at: Option<EpochMillis>,
    points: f64,
    remaining_ms: u64,
    claim_in_flight: Option<ClaimTicket>,
    next_serial: u32,
}

impl MiningEngine {
    /// Restores the persisted cycle. Missing or unreadable entries fall back
    /// to "not started" and zero points.
    pub fn load(clock: Rc<dyn Clock>, store: Rc<dyn StateStore>) -> Self {
        let started_at = store.get(KEY_STARTED_AT).and_then(|raw| {
            let parsed = parse_millis(&raw);
            if parsed.is_none() {
                cwarn(&format!("ignoring unreadable {KEY_STARTED_AT}: {raw:?}"));
            }
            parsed
        });
        let points = store
            .get(KEY_POINTS)
            .and_then(|raw| match raw.trim().parse::<f64>() {
                Ok(p) if p.is_finite() => Some(p.clamp(0.0, DAILY_CAP)),
                _ => {
                    cwarn(&format!("ignoring unreadable {KEY_POINTS}: {raw:?}"));
                    None
                }
            })
            .unwrap_or(0.0);
        Self {
            clock,
            store,
            started_at,
            points,
            remaining_ms: 0,
            claim_in_flight: None,
            next_serial: 0,
        }
    }

    pub fn points(&self) -> f64 {
        self.points
    }

    /// Time left in the current cycle as of the last tick.
    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn claimable(&self) -> u64 {
        self.points.floor() as u64
    }

    pub fn claim_in_flight(&self) -> Option<ClaimTicket> {
        self.claim_in_flight
    }

    pub fn cycle_active(&self) -> bool {
        self.started_at
            .is_some_and(|s| self.clock.now().saturating_sub(s) < CYCLE_DURATION_MS)
    }

    pub fn start(&mut self) -> Result<EpochMillis, MiningError> {
        if self.claim_in_flight.is_some() {
            return Err(MiningError::ClaimInProgress);
        }
        if self.cycle_active() {
            return Err(MiningError::AlreadyRunning);
        }
        let now = self.clock.now();
        self.begin_cycle(now);
        clog(&format!("mining started at {now}"));
        Ok(now)
    }

    pub fn tick(&mut self) -> Option<Accrual> {
        let now = self.clock.now();
        self.tick_at(now)
    }

    /// Recomputes points for `now` and persists them. `None` when no cycle
    /// has been started.
    pub fn tick_at(&mut self, now: EpochMillis) -> Option<Accrual> {
        let started_at = self.started_at?;
        let accrual = accrual_at(started_at, now);
        self.points = accrual.points;
        self.remaining_ms = accrual.remaining_ms;
        self.store.set(KEY_POINTS, &self.points.to_string());
        Some(accrual)
    }

    /// Reserves the claim slot for `floor(points)`. The caller settles the
    /// returned ticket and reports back through [`Self::settle_claim`].
    pub fn begin_claim(&mut self) -> Result<ClaimTicket, MiningError> {
        if self.claim_in_flight.is_some() {
            return Err(MiningError::ClaimInProgress);
        }
        let have = self.claimable();
        if have < MIN_CLAIM {
            return Err(MiningError::InsufficientPoints {
                have,
                min: MIN_CLAIM,
            });
        }
        self.next_serial = self.next_serial.wrapping_add(1);
        let ticket = ClaimTicket {
            serial: self.next_serial,
            amount: have,
        };
        self.claim_in_flight = Some(ticket);
        clog(&format!("mining claim of {have} submitted"));
        Ok(ticket)
    }

    /// Applies the bridge outcome. Success re-arms a fresh cycle at the
    /// current time; failure leaves the cycle untouched.
    pub fn settle_claim(&mut self, outcome: Result<(), SettlementError>) -> Result<u64, MiningError> {
        let ticket = self
            .claim_in_flight
            .take()
            .ok_or(MiningError::NoClaimPending)?;
        outcome?;
        let now = self.clock.now();
        self.begin_cycle(now);
        clog(&format!("claimed {} mining points", ticket.amount));
        Ok(ticket.amount)
    }

    fn begin_cycle(&mut self, now: EpochMillis) {
        self.started_at = Some(now);
        self.points = 0.0;
        self.remaining_ms = CYCLE_DURATION_MS;
        self.store.set(KEY_STARTED_AT, &now.to_string());
        self.store.set(KEY_POINTS, "0");
    }
}

fn parse_millis(raw: &str) -> Option<EpochMillis> {
    let raw = raw.trim();
    raw.parse::<EpochMillis>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v as EpochMillis)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::clock::testing::ManualClock;
    use crate::state::store::MemoryStore;
    use proptest::prelude::*;

    const T0: EpochMillis = 1_700_000_000_000;

    fn engine() -> (Rc<ManualClock>, Rc<MemoryStore>, MiningEngine) {
        let clock = Rc::new(ManualClock::new(T0));
        let store = Rc::new(MemoryStore::default());
        let engine = MiningEngine::load(clock.clone(), store.clone());
        (clock, store, engine)
    }

    #[test]
    fn load_from_empty_store_is_not_started() {
        let (_, _, m) = engine();
        assert_eq!(m.started_at, None);
        assert_eq!(m.points(), 0.0);
        assert!(!m.cycle_active());
    }

    #[test]
    fn load_restores_persisted_fields_and_skips_garbage() {
        let clock = Rc::new(ManualClock::new(T0));
        let store = Rc::new(MemoryStore::default());
        store.set(KEY_STARTED_AT, &T0.to_string());
        store.set(KEY_POINTS, "12.5");
        let m = MiningEngine::load(clock.clone(), store.clone());
        assert_eq!(m.started_at, Some(T0));
        assert_eq!(m.points(), 12.5);

        store.set(KEY_STARTED_AT, "yesterday");
        store.set(KEY_POINTS, "NaN");
        let m = MiningEngine::load(clock, store);
        assert_eq!(m.started_at, None);
        assert_eq!(m.points(), 0.0);
    }

    #[test]
    fn start_persists_and_rejects_within_cycle() {
        let (clock, store, mut m) = engine();
        assert_eq!(m.start(), Ok(T0));
        assert_eq!(store.get(KEY_STARTED_AT), Some(T0.to_string()));
        assert_eq!(store.get(KEY_POINTS).as_deref(), Some("0"));

        clock.advance_secs(CYCLE_DURATION_SECS - 1);
        assert_eq!(m.start(), Err(MiningError::AlreadyRunning));
        assert_eq!(m.started_at, Some(T0));

        clock.advance_secs(1);
        let restarted = m.start().expect("cycle expired");
        assert_eq!(restarted, T0 + CYCLE_DURATION_MS);
        assert_eq!(m.points(), 0.0);
    }

    #[test]
    fn reload_mid_cycle_rederives_points_from_start() {
        let (clock, store, mut a) = engine();
        a.start().expect("start");
        clock.advance_secs(CYCLE_DURATION_SECS / 2);
        a.tick();

        let mut b = MiningEngine::load(clock.clone(), store.clone());
        assert_eq!(b.started_at, Some(T0));
        b.tick().expect("restored cycle");
        assert_eq!(b.points(), a.points());
        assert_eq!(b.points(), 50.0);
        assert_eq!(b.remaining_ms(), 43_200_000);

        // Time spent closed still accrues.
        clock.advance_secs(3_600);
        let mut c = MiningEngine::load(clock, store);
        c.tick().expect("restored cycle");
        assert_eq!(c.remaining_ms(), 39_600_000);
        assert!(c.points() > b.points());
    }

    #[test]
    fn tick_without_cycle_is_noop() {
        let (_, store, mut m) = engine();
        assert_eq!(m.tick(), None);
        assert_eq!(store.get(KEY_POINTS), None);
    }

    #[test]
    fn tick_caps_at_daily_cap() {
        let (clock, store, mut m) = engine();
        m.start().expect("start");
        clock.advance_secs(CYCLE_DURATION_SECS + 3600);
        let acc = m.tick().expect("started");
        assert_eq!(acc.points, DAILY_CAP);
        assert_eq!(acc.remaining_ms, 0);
        assert_eq!(store.get(KEY_POINTS).as_deref(), Some("100"));
        assert!(!m.cycle_active());
    }

    #[test]
    fn tick_is_independent_of_tick_cadence() {
        let (clock, _, mut a) = engine();
        a.start().expect("start");
        for _ in 0..600 {
            clock.advance_secs(1);
            a.tick();
        }
        let (clock_b, _, mut b) = engine();
        b.start().expect("start");
        clock_b.advance_secs(600);
        b.tick();
        assert_eq!(a.points(), b.points());
    }

    #[test]
    fn claim_below_minimum_is_rejected_without_mutation() {
        let (clock, _, mut m) = engine();
        m.start().expect("start");
        clock.advance_secs(4319);
        m.tick();
        let before = (m.started_at, m.points());
        assert_eq!(
            m.begin_claim(),
            Err(MiningError::InsufficientPoints { have: 4, min: MIN_CLAIM })
        );
        assert_eq!((m.started_at, m.points()), before);
        assert_eq!(m.claim_in_flight(), None);
    }

    #[test]
    fn claim_at_exact_minimum_is_accepted() {
        let (clock, _, mut m) = engine();
        m.start().expect("start");
        clock.advance_secs(4320);
        m.tick();
        assert_eq!(m.points(), 5.0);
        let ticket = m.begin_claim().expect("threshold is inclusive");
        assert_eq!(ticket.amount, 5);
    }

    #[test]
    fn only_one_claim_in_flight() {
        let (clock, _, mut m) = engine();
        m.start().expect("start");
        clock.advance_secs(CYCLE_DURATION_SECS);
        m.tick();
        m.begin_claim().expect("first");
        assert_eq!(m.begin_claim(), Err(MiningError::ClaimInProgress));
        assert_eq!(m.start(), Err(MiningError::ClaimInProgress));
    }

    #[test]
    fn failed_settlement_keeps_cycle() {
        let (clock, store, mut m) = engine();
        m.start().expect("start");
        clock.advance_secs(CYCLE_DURATION_SECS / 2);
        m.tick();
        m.begin_claim().expect("claim");
        let err = m
            .settle_claim(Err(SettlementError::Rejected("denied".into())))
            .unwrap_err();
        assert!(matches!(err, MiningError::Settlement(_)));
        assert_eq!(m.started_at, Some(T0));
        assert_eq!(m.points(), 50.0);
        assert_eq!(store.get(KEY_STARTED_AT), Some(T0.to_string()));
        // Slot is free again for a manual retry.
        assert!(m.begin_claim().is_ok());
    }

    #[test]
    fn settle_without_claim_is_rejected() {
        let (_, _, mut m) = engine();
        assert_eq!(m.settle_claim(Ok(())), Err(MiningError::NoClaimPending));
    }

    #[test]
    fn half_cycle_claim_rearms_new_cycle() {
        let (clock, store, mut m) = engine();
        m.start().expect("start");
        clock.advance_secs(43_200);
        let acc = m.tick().expect("started");
        assert!((acc.points - 50.0).abs() < 1e-9);
        assert_eq!(acc.remaining_ms, 43_200_000);

        let ticket = m.begin_claim().expect("claim");
        assert_eq!(ticket.amount, 50);
        clock.advance_secs(3);
        assert_eq!(m.settle_claim(Ok(())), Ok(50));

        let now = T0 + 43_203_000;
        assert_eq!(m.points(), 0.0);
        assert_eq!(m.started_at, Some(now));
        assert!(m.cycle_active());
        assert_eq!(store.get(KEY_STARTED_AT), Some(now.to_string()));
        assert_eq!(store.get(KEY_POINTS).as_deref(), Some("0"));
    }

    proptest! {
        #[test]
        fn accrual_is_linear_within_cycle(elapsed in 0u64..CYCLE_DURATION_MS) {
            let acc = accrual_at(T0, T0 + elapsed);
            let expected = (elapsed as f64 / 1000.0) * ACCRUAL_RATE;
            prop_assert!((acc.points - expected).abs() < 1e-9);
            prop_assert_eq!(acc.remaining_ms, CYCLE_DURATION_MS - elapsed);
        }

        #[test]
        fn accrual_strictly_increases(a in 0u64..CYCLE_DURATION_MS, b in 0u64..CYCLE_DURATION_MS) {
            prop_assume!(a != b);
            let (lo, hi) = (a.min(b), a.max(b));
            prop_assert!(accrual_at(T0, T0 + lo).points < accrual_at(T0, T0 + hi).points);
        }

        #[test]
        fn accrual_is_capped_after_cycle(extra in 0u64..(10 * CYCLE_DURATION_MS)) {
            let acc = accrual_at(T0, T0 + CYCLE_DURATION_MS + extra);
            prop_assert_eq!(acc.points, DAILY_CAP);
            prop_assert_eq!(acc.remaining_ms, 0);
        }

        #[test]
        fn claim_rejected_iff_below_minimum(secs in 0u64..CYCLE_DURATION_SECS) {
            let (clock, _, mut m) = engine();
            m.start().expect("start");
            clock.advance_secs(secs);
            m.tick();
            let below = m.points().floor() < MIN_CLAIM as f64;
            let rejected = matches!(m.begin_claim(), Err(MiningError::InsufficientPoints { .. }));
            prop_assert_eq!(below, rejected);
        }
    }
}
