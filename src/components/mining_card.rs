use super::time_display::TimeDisplay;
use crate::state::mining::{ACCRUAL_RATE, DAILY_CAP};
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct MiningCardProps {
    pub points: f64,
    pub remaining_ms: u64,
    pub cycle_active: bool,
    pub claiming: bool,
    pub on_start: Callback<()>,
    pub on_claim: Callback<()>,
}

#[function_component]
pub fn MiningCard(props: &MiningCardProps) -> Html {
    let start_cb = {
        let cb = props.on_start.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let claim_cb = {
        let cb = props.on_claim.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let start_style = if props.cycle_active {
        "flex:1; background:#94a3b8; cursor:not-allowed;"
    } else {
        "flex:1; background:#0ea5e9; cursor:pointer;"
    };
    html! {
        <div style="background:#f8fafc; border-radius:14px; padding:14px; margin-bottom:16px; border:1px solid #e5e7eb;">
            <div style="display:flex; align-items:center; margin-bottom:8px;">
                <span style="font-size:18px; margin-right:6px;">{"⛏️"}</span>
                <h4 style="margin:0;">{"Mining"}</h4>
            </div>
            <div style="background:#ffffff; border-radius:10px; padding:10px 12px; margin-bottom:10px; display:flex; justify-content:space-between; align-items:center;">
                <span style="font-size:14px; color:#6b7280;">{"Points"}</span>
                <span style="font-size:20px; font-weight:600; font-variant-numeric:tabular-nums;">
                    { format!("{:.4} / {}", props.points, DAILY_CAP) }
                </span>
            </div>
            if props.cycle_active {
                <div style="font-size:12px; color:#64748b; margin-bottom:6px;">
                    { format!("+{ACCRUAL_RATE:.6} points / second") }
                </div>
            }
            <TimeDisplay remaining_ms={props.remaining_ms} />
            <div style="display:flex; gap:8px;">
                <button onclick={start_cb} disabled={props.cycle_active} style={start_style}>{"Start Mining"}</button>
                <button onclick={claim_cb} disabled={props.claiming} style="flex:1;">
                    { if props.claiming { "Claiming..." } else { "Claim" } }
                </button>
            </div>
        </div>
    }
}
