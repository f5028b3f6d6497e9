//! Runtime configuration.
//!
//! Defaults match the production deployment. A JSON object stored under
//! [`CONFIG_KEY`] overrides individual fields, e.g.
//! `{"settlement":"dryRun"}` for local development.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::state::StateStore;
use crate::util::{clog, cwarn};

pub const CONFIG_KEY: &str = "br_config";

/// `10^decimals * DAILY_CAP` must fit the 256-bit word with room to spare.
const MAX_TOKEN_DECIMALS: u32 = 30;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettlementMode {
    /// Submit `claim(uint256)` through the injected wallet.
    #[default]
    Wallet,
    /// Accept every claim without touching a wallet.
    DryRun,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub claim_contract: String,
    pub token_decimals: u32,
    pub settlement: SettlementMode,
    pub profile_endpoint: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            claim_contract: "0x0000D14CCf81aD6a9e7b8f03b1F94d57015fCD06".to_string(),
            token_decimals: 18,
            settlement: SettlementMode::Wallet,
            profile_endpoint: "/api/neynar/profile".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_override(raw: &str) -> Result<Self, ConfigError> {
        let cfg: AppConfig = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let addr = &self.claim_contract;
        let hex = addr.strip_prefix("0x").unwrap_or("");
        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::BadAddress(addr.clone()));
        }
        if self.token_decimals > MAX_TOKEN_DECIMALS {
            return Err(ConfigError::BadDecimals(self.token_decimals));
        }
        Ok(())
    }

    /// Defaults, replaced by the stored override when it is valid.
    pub fn load(store: &dyn StateStore) -> Self {
        let Some(raw) = store.get(CONFIG_KEY) else {
            return Self::default();
        };
        match Self::from_override(&raw) {
            Ok(cfg) => {
                clog(&format!("using config override: {cfg:?}"));
                cfg
            }
            Err(e) => {
                cwarn(&format!("{e} ({:?}); falling back to defaults", e.kind()));
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::state::MemoryStore;

    #[test]
    fn defaults_are_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.settlement, SettlementMode::Wallet);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let cfg = AppConfig::from_override(r#"{"settlement":"dryRun"}"#).expect("valid");
        assert_eq!(cfg.settlement, SettlementMode::DryRun);
        assert_eq!(cfg.token_decimals, 18);
        assert_eq!(cfg.profile_endpoint, "/api/neynar/profile");
    }

    #[test]
    fn bad_override_is_rejected() {
        assert!(matches!(
            AppConfig::from_override(r#"{"claimContract":"0x1234"}"#),
            Err(ConfigError::BadAddress(_))
        ));
        assert!(matches!(
            AppConfig::from_override(r#"{"tokenDecimals":40}"#),
            Err(ConfigError::BadDecimals(40))
        ));
        let err = AppConfig::from_override("not json").expect_err("not json");
        assert!(matches!(err, ConfigError::Parse(_)));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn load_falls_back_on_invalid_override() {
        let store = MemoryStore::default();
        store.set(CONFIG_KEY, r#"{"tokenDecimals":"many"}"#);
        assert_eq!(AppConfig::load(&store), AppConfig::default());

        store.set(CONFIG_KEY, r#"{"tokenDecimals":6}"#);
        assert_eq!(AppConfig::load(&store).token_decimals, 6);
    }
}
