use crate::error::{ErrorKind, ProfileError};
use crate::profile::Profile;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct HeaderProps {
    /// `None` until the host delivers an identity and the lookup settles.
    pub profile: Option<Result<Profile, ProfileError>>,
    /// Account reported by the last wallet settlement.
    #[prop_or_default]
    pub wallet: Option<String>,
}

/// Shown in place of the profile row.
fn connection_line(wallet: Option<&str>) -> String {
    match wallet {
        Some(account) => format!("Wallet: {account}"),
        None => "Wallet will auto-connect when opened inside Base App".to_string(),
    }
}

#[function_component]
pub fn Header(props: &HeaderProps) -> Html {
    let row_style = "display:flex; align-items:center; gap:8px;";
    let identity = match &props.profile {
        Some(Ok(p)) => html! {
            <div style={row_style}>
                if let Some(src) = &p.pfp {
                    <img src={src.clone()} alt="" style="width:32px; height:32px; border-radius:50%;" />
                }
                <div style="display:flex; flex-direction:column;">
                    <b>{ if p.display_name.is_empty() { p.username.clone() } else { p.display_name.clone() } }</b>
                    <span style="font-size:12px; color:#64748b;">
                        { format!("@{} · {} followers · {} following", p.username, p.follower_count, p.following_count) }
                    </span>
                    if let Some(score) = p.score {
                        <span style="font-size:12px; color:#2563eb;">{ format!("Neynar score {score:.2}") }</span>
                    }
                </div>
            </div>
        },
        Some(Err(e)) => {
            let color = if e.kind() == ErrorKind::NotFound { "#64748b" } else { "#b91c1c" };
            html! { <span style={format!("color:{color};")}>{ e.to_string() }</span> }
        }
        None => html! { <span>{ connection_line(props.wallet.as_deref()) }</span> },
    };
    html! {
        <div style="margin-bottom:16px; text-align:center;">
            <h2 style="margin:0; font-size:22px; font-weight:800; color:#0f172a;">{"Base Rush"}</h2>
            <p style="margin:6px 0 12px 0; font-size:14px; color:#64748b; font-weight:500;">{"Play • Mine • Earn on Base"}</p>
            <div style="padding:10px 12px; border-radius:10px; background:#f1f5f9; font-size:14px; text-align:left;">
                { identity }
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_line_shows_account_once_known() {
        assert_eq!(
            connection_line(None),
            "Wallet will auto-connect when opened inside Base App"
        );
        assert_eq!(connection_line(Some("0xabc")), "Wallet: 0xabc");
    }
}
