use crate::util::format_remaining;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct TimeDisplayProps {
    pub remaining_ms: u64,
}

#[function_component(TimeDisplay)]
pub fn time_display(props: &TimeDisplayProps) -> Html {
    if props.remaining_ms == 0 {
        return html! {};
    }
    html! {<div style="margin:8px 0 10px 0; padding:6px 10px; background:#fef3c7; color:#92400e; border-radius:8px; font-size:13px;">
        { format!("⏳ Next mining in {}", format_remaining(props.remaining_ms)) }
    </div>}
}
