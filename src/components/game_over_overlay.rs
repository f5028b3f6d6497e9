use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct GameOverOverlayProps {
    pub show: bool,
    pub score: u32,
    pub reward: u32,
    pub claiming: bool,
    pub on_claim: Callback<()>,
    pub on_exit: Callback<()>,
}

#[function_component]
pub fn GameOverOverlay(props: &GameOverOverlayProps) -> Html {
    if !props.show {
        return html! {};
    }
    let claim_btn = {
        let cb = props.on_claim.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let exit_btn = {
        let cb = props.on_exit.clone();
        Callback::from(move |_| cb.emit(()))
    };
    html! {
        <div style="margin-top:16px; padding:14px; border-radius:12px; background:#ecfdf5; border:1px solid #a7f3d0; text-align:center;">
            <p style="margin:0 0 6px 0; font-weight:700; color:#047857;">{"🎉 Game Finished"}</p>
            <p style="margin:4px 0;">{ format!("Score: {}", props.score) }</p>
            <div style="margin-top:12px; display:flex; flex-direction:column; gap:8px;">
                if props.reward > 0 {
                    <button onclick={claim_btn} disabled={props.claiming}>
                        { if props.claiming { "Claiming...".to_string() } else { format!("🎁 Claim Game Reward ({})", props.reward) } }
                    </button>
                }
                <button onclick={exit_btn}>{"Exit Game"}</button>
            </div>
        </div>
    }
}
