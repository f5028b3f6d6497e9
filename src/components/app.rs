use std::cell::RefCell;
use std::rc::Rc;

use super::{
    game_card::GameCard, game_over_overlay::GameOverOverlay, header::Header,
    mining_card::MiningCard,
};
use crate::config::AppConfig;
use crate::error::{ErrorKind, ProfileError};
use crate::host::{announce_ready, listen_for_context};
use crate::model::{GameAction, GameModel, MiningAction, MiningModel, StatusLine};
use crate::profile::{Profile, ProfileClient};
use crate::settlement::{Bridge, SettlementBridge, SettlementReceipt};
use crate::state::{BrowserClock, Clock, LocalStore, MathRandom, MemoryStore, Phase, StateStore};
use crate::util::{clog, cwarn};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use yew::prelude::*;

/// Collaborators wired once per page load.
struct Services {
    clock: Rc<dyn Clock>,
    store: Rc<dyn StateStore>,
    bridge: Rc<Bridge>,
    profiles: ProfileClient,
}

impl Services {
    fn init() -> Self {
        let store: Rc<dyn StateStore> = match LocalStore::open() {
            Some(s) => Rc::new(s),
            None => {
                cwarn("localStorage unavailable; mining progress will not survive reloads");
                Rc::new(MemoryStore::default())
            }
        };
        let config = AppConfig::load(store.as_ref());
        Self {
            clock: Rc::new(BrowserClock),
            bridge: Rc::new(Bridge::from_config(&config)),
            profiles: ProfileClient::new(config.profile_endpoint.clone()),
            store,
        }
    }
}

fn note_receipt(wallet: &UseStateHandle<Option<String>>, receipt: SettlementReceipt) {
    clog(&format!("settlement receipt: {}", receipt.tx_hash));
    if let Some(account) = receipt.account {
        wallet.set(Some(account));
    }
}

fn status_color(error: Option<ErrorKind>) -> &'static str {
    match error {
        None => "#334155",
        Some(ErrorKind::Precondition) => "#b45309",
        Some(_) => "#b91c1c",
    }
}

/// Runs `f` every second until the returned cleanup is called.
fn every_second(f: impl FnMut() + 'static) -> impl FnOnce() {
    let window = web_sys::window();
    let tick = Closure::wrap(Box::new(f) as Box<dyn FnMut()>);
    let id = window.as_ref().and_then(|w| {
        w.set_interval_with_callback_and_timeout_and_arguments_0(tick.as_ref().unchecked_ref(), 1000)
            .ok()
    });
    move || {
        if let (Some(w), Some(id)) = (window, id) {
            w.clear_interval_with_handle(id);
        }
        drop(tick);
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let services = use_memo((), |_| Services::init());
    let mining = {
        let services = services.clone();
        use_reducer(move || MiningModel::load(services.clock.clone(), services.store.clone()))
    };
    let game = use_reducer(|| GameModel::new(Rc::new(RefCell::new(MathRandom))));
    let fid = use_state(|| None::<u64>);
    let profile = use_state(|| None::<Result<Profile, ProfileError>>);
    let wallet = use_state(|| None::<String>);

    // Mining accrual is re-derived from the clock, so its tick can free-run
    {
        let mining = mining.clone();
        use_effect_with((), move |_| every_second(move || mining.dispatch(MiningAction::Tick)));
    }
    {
        // Re-armed on every start so the first tick lands one second in
        let game = game.clone();
        let counting = game.round.countdown_active();
        use_effect_with(counting, move |&counting| {
            let stop = counting.then(|| every_second(move || game.dispatch(GameAction::Tick)));
            move || {
                if let Some(stop) = stop {
                    stop();
                }
            }
        });
    }

    // Host handshake
    {
        let fid = fid.clone();
        use_effect_with((), move |_| {
            announce_ready();
            let listener = listen_for_context(move |id| fid.set(Some(id)));
            move || drop(listener)
        });
    }
    {
        let profile = profile.clone();
        let services = services.clone();
        use_effect_with(*fid, move |fid| {
            if let Some(fid) = *fid {
                let client = services.profiles.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    profile.set(Some(client.lookup(Some(fid)).await));
                });
            }
            || ()
        });
    }

    // Settle whichever claim ticket is outstanding
    {
        let ticket = mining.engine.claim_in_flight();
        let mining = mining.clone();
        let bridge = services.bridge.clone();
        let wallet = wallet.clone();
        use_effect_with(ticket.map(|t| t.serial), move |_| {
            if let Some(t) = ticket {
                wasm_bindgen_futures::spawn_local(async move {
                    let outcome = bridge
                        .settle(t.amount)
                        .await
                        .map(|r| note_receipt(&wallet, r));
                    mining.dispatch(MiningAction::ClaimSettled {
                        serial: t.serial,
                        outcome,
                    });
                });
            }
            || ()
        });
    }
    {
        let ticket = game.round.claim_in_flight();
        let game = game.clone();
        let bridge = services.bridge.clone();
        let wallet = wallet.clone();
        use_effect_with(ticket.map(|t| t.serial), move |_| {
            if let Some(t) = ticket {
                wasm_bindgen_futures::spawn_local(async move {
                    let outcome = bridge
                        .settle(t.amount)
                        .await
                        .map(|r| note_receipt(&wallet, r));
                    game.dispatch(GameAction::ClaimSettled {
                        serial: t.serial,
                        outcome,
                    });
                });
            }
            || ()
        });
    }

    let dispatch_mining = |action: fn() -> MiningAction| {
        let mining = mining.clone();
        Callback::from(move |_: ()| mining.dispatch(action()))
    };
    let dispatch_game = |action: fn() -> GameAction| {
        let game = game.clone();
        Callback::from(move |_: ()| game.dispatch(action()))
    };
    let on_reveal = {
        let game = game.clone();
        Callback::from(move |id: u32| game.dispatch(GameAction::Reveal(id)))
    };

    let round = &game.round;
    let in_game = round.phase() != Phase::Idle;
    // Latest message from either engine
    let status: Option<StatusLine> = if in_game {
        game.status.clone().or_else(|| mining.status.clone())
    } else {
        mining.status.clone().or_else(|| game.status.clone())
    };

    html! {
        <div style="min-height:100vh; background:#f5f7fb; display:flex; justify-content:center; padding:20px 12px;">
            <div style="width:100%; max-width:420px; background:#ffffff; border-radius:16px; padding:16px; box-shadow:0 10px 25px rgba(0,0,0,0.08);">
                if !in_game {
                    <>
                    <Header profile={(*profile).clone()} wallet={(*wallet).clone()} />
                    <MiningCard
                        points={mining.engine.points()}
                        remaining_ms={mining.engine.remaining_ms()}
                        cycle_active={mining.engine.cycle_active()}
                        claiming={mining.engine.claim_in_flight().is_some()}
                        on_start={dispatch_mining(|| MiningAction::Start)}
                        on_claim={dispatch_mining(|| MiningAction::Claim)}
                    />
                    </>
                }
                <GameCard
                    cells={round.cells().to_vec()}
                    elapsed_seconds={round.elapsed_seconds()}
                    score={round.score()}
                    phase={round.phase()}
                    on_start={dispatch_game(|| GameAction::Start)}
                    on_exit={dispatch_game(|| GameAction::Exit)}
                    {on_reveal}
                />
                <GameOverOverlay
                    show={round.phase() == Phase::Finished}
                    score={round.score()}
                    reward={round.reward()}
                    claiming={round.claim_in_flight().is_some()}
                    on_claim={dispatch_game(|| GameAction::Claim)}
                    on_exit={dispatch_game(|| GameAction::Exit)}
                />
                if let Some(s) = status {
                    <p style={format!("margin-top:12px; font-size:13px; text-align:center; color:{};", status_color(s.error))}>
                        { s.text }
                    </p>
                }
            </div>
        </div>
    }
}
