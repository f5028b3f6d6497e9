use crate::state::game::MAX_TIME;
use crate::state::{Cell, CellKind, Phase};
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct GameCardProps {
    pub cells: Vec<Cell>,
    pub elapsed_seconds: u32,
    pub score: u32,
    pub phase: Phase,
    pub on_start: Callback<()>,
    pub on_exit: Callback<()>,
    pub on_reveal: Callback<u32>,
}

fn cell_color(cell: &Cell) -> &'static str {
    if cell.revealed {
        return "#e5e7eb";
    }
    match cell.kind {
        CellKind::Target => "#3b82f6",
        CellKind::Decoy => "#ef4444",
    }
}

#[function_component]
pub fn GameCard(props: &GameCardProps) -> Html {
    let start_cb = {
        let cb = props.on_start.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let exit_cb = {
        let cb = props.on_exit.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let row_style = "display:flex; justify-content:space-between; margin-bottom:6px;";
    html! {
        <div style="background:#f8fafc; border-radius:14px; padding:14px; border:1px solid #e5e7eb;">
            <div style="display:flex; align-items:center; margin-bottom:8px;">
                <span style="font-size:18px; margin-right:6px;">{"🎮"}</span>
                <h4 style="margin:0;">{"Game"}</h4>
            </div>
            <div style={row_style}>
                <span style="color:#6b7280;">{"Time"}</span>
                <span>{ format!("{}s / {}s", props.elapsed_seconds, MAX_TIME) }</span>
            </div>
            <div style={row_style}>
                <span style="color:#6b7280;">{"Score"}</span>
                <span style="font-size:18px; font-weight:600;">{ props.score }</span>
            </div>
            if props.phase == Phase::Idle {
                <button onclick={start_cb} style="width:100%;">{"Start Game"}</button>
            }
            if props.phase == Phase::Running {
                <button onclick={exit_cb} style="width:100%;">{"Exit Game"}</button>
            }
            <div style="display:grid; grid-template-columns:repeat(5, 1fr); gap:8px; margin-top:12px;">
                { for props.cells.iter().map(|c| {
                    let id = c.id;
                    let on_reveal = props.on_reveal.clone();
                    let onclick = Callback::from(move |_: MouseEvent| on_reveal.emit(id));
                    let shadow = if c.revealed { "none" } else { "0 4px 10px rgba(0,0,0,0.12)" };
                    html! {
                        <div key={id} {onclick}
                            style={format!("aspect-ratio:1; border-radius:10px; cursor:pointer; background:{}; box-shadow:{};", cell_color(c), shadow)} />
                    }
                }) }
            </div>
        </div>
    }
}
