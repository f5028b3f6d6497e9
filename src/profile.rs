//! Client for the profile proxy.
//!
//! The proxy holds the upstream credential; this side only validates the
//! request and turns the proxy's status codes back into [`ProfileError`].

use serde::Deserialize;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::error::ProfileError;
use crate::util::{clog, cwarn};

/// Error text the proxy returns when it has no upstream credential.
pub const MISSING_CREDENTIAL_MESSAGE: &str = "Missing Neynar API key";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub fid: u64,
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub pfp: Option<String>,
    #[serde(default)]
    pub follower_count: u64,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

pub fn lookup_url(endpoint: &str, fid: Option<u64>) -> Result<String, ProfileError> {
    let fid = fid.ok_or(ProfileError::BadRequest)?;
    Ok(format!("{endpoint}?fid={fid}"))
}

/// Maps a proxy response onto the lookup taxonomy.
pub fn interpret_response(status: u16, body: &str) -> Result<Profile, ProfileError> {
    match status {
        200..=299 => serde_json::from_str(body)
            .map_err(|e| ProfileError::LookupFailed(format!("malformed profile: {e}"))),
        400 => Err(ProfileError::BadRequest),
        404 => Err(ProfileError::NotFound),
        _ => {
            let message = serde_json::from_str::<ErrorBody>(body)
                .map(|b| b.error)
                .unwrap_or_else(|_| format!("HTTP {status}"));
            if message == MISSING_CREDENTIAL_MESSAGE {
                Err(ProfileError::MissingCredential)
            } else {
                Err(ProfileError::LookupFailed(message))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProfileClient {
    endpoint: String,
}

impl ProfileClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub async fn lookup(&self, fid: Option<u64>) -> Result<Profile, ProfileError> {
        let url = lookup_url(&self.endpoint, fid)?;
        let win = web_sys::window()
            .ok_or_else(|| ProfileError::LookupFailed("no window".into()))?;
        let resp: web_sys::Response = JsFuture::from(win.fetch_with_str(&url))
            .await
            .and_then(|v| v.dyn_into())
            .map_err(|e| ProfileError::LookupFailed(format!("fetch failed: {e:?}")))?;
        let text = resp
            .text()
            .map_err(|e| ProfileError::LookupFailed(format!("{e:?}")))?;
        let body = JsFuture::from(text)
            .await
            .map_err(|e| ProfileError::LookupFailed(format!("{e:?}")))?
            .as_string()
            .unwrap_or_default();

        let result = interpret_response(resp.status(), &body);
        match &result {
            Ok(p) => clog(&format!("profile loaded for fid {} (@{})", p.fid, p.username)),
            Err(e) => cwarn(&format!("profile lookup failed: {e}")),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fid_is_rejected_before_request() {
        assert_eq!(lookup_url("/api/p", None), Err(ProfileError::BadRequest));
        assert_eq!(lookup_url("/api/p", Some(42)).as_deref(), Ok("/api/p?fid=42"));
    }

    #[test]
    fn success_body_parses_with_null_score() {
        let body = r#"{"fid":3,"username":"dwr","displayName":"Dan","pfp":"https://img/x.png",
            "followerCount":10,"followingCount":2,"score":null}"#;
        let p = interpret_response(200, body).expect("profile");
        assert_eq!(p.fid, 3);
        assert_eq!(p.display_name, "Dan");
        assert_eq!(p.pfp.as_deref(), Some("https://img/x.png"));
        assert_eq!(p.score, None);
    }

    #[test]
    fn status_codes_map_to_taxonomy() {
        assert_eq!(
            interpret_response(400, r#"{"error":"FID is required"}"#),
            Err(ProfileError::BadRequest)
        );
        assert_eq!(
            interpret_response(404, r#"{"error":"User not found"}"#),
            Err(ProfileError::NotFound)
        );
        assert_eq!(
            interpret_response(500, r#"{"error":"Missing Neynar API key"}"#),
            Err(ProfileError::MissingCredential)
        );
        assert_eq!(
            interpret_response(500, r#"{"error":"Neynar fetch failed"}"#),
            Err(ProfileError::LookupFailed("Neynar fetch failed".into()))
        );
        assert_eq!(
            interpret_response(502, "<html>"),
            Err(ProfileError::LookupFailed("HTTP 502".into()))
        );
    }

    #[test]
    fn malformed_success_body_is_a_lookup_failure() {
        assert!(matches!(
            interpret_response(200, "{}"),
            Err(ProfileError::LookupFailed(_))
        ));
    }
}
