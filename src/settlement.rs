//! Reward settlement.
//!
//! The engines hand over integer reward units; everything chain-specific
//! (base-unit scaling, calldata, the wallet round trip) lives here.

use js_sys::{Array, Function, Object, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::config::{AppConfig, SettlementMode};
use crate::error::SettlementError;
use crate::util::clog;

/// First four bytes of `keccak256("claim(uint256)")`.
pub const CLAIM_SELECTOR: [u8; 4] = [0x37, 0x96, 0x07, 0xf5];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettlementReceipt {
    pub tx_hash: String,
    /// Account that signed the claim; `None` when no wallet was involved.
    pub account: Option<String>,
}

#[allow(async_fn_in_trait)]
pub trait SettlementBridge {
    async fn settle(&self, amount: u64) -> Result<SettlementReceipt, SettlementError>;
}

/// `amount * 10^decimals`, or `None` on overflow.
pub fn to_base_units(amount: u64, decimals: u32) -> Option<u128> {
    10u128.checked_pow(decimals)?.checked_mul(u128::from(amount))
}

/// ABI-encoded `claim(uint256)` call as a `0x`-prefixed hex string.
pub fn encode_claim_calldata(base_units: u128) -> String {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&base_units.to_be_bytes());
    let mut out = String::with_capacity(2 + 2 * (4 + 32));
    out.push_str("0x");
    for b in CLAIM_SELECTOR.iter().chain(word.iter()) {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

/// EIP-1193 provider injected by the host (`window.ethereum`).
#[derive(Clone, Debug)]
pub struct WalletBridge {
    contract: String,
    decimals: u32,
}

impl WalletBridge {
    pub fn new(contract: String, decimals: u32) -> Self {
        Self { contract, decimals }
    }
}

impl SettlementBridge for WalletBridge {
    async fn settle(&self, amount: u64) -> Result<SettlementReceipt, SettlementError> {
        if amount == 0 {
            return Err(SettlementError::ZeroAmount);
        }
        let units = to_base_units(amount, self.decimals)
            .ok_or_else(|| SettlementError::Rejected("amount overflows uint256 scaling".into()))?;
        let provider = injected_provider()?;

        let accounts = request(&provider, "eth_requestAccounts", Array::new()).await?;
        let from = Array::from(&accounts)
            .get(0)
            .as_string()
            .ok_or(SettlementError::NoAccount)?;

        let tx = Object::new();
        set_field(&tx, "from", &JsValue::from_str(&from))?;
        set_field(&tx, "to", &JsValue::from_str(&self.contract))?;
        set_field(&tx, "data", &JsValue::from_str(&encode_claim_calldata(units)))?;
        let hash = request(&provider, "eth_sendTransaction", Array::of1(&tx)).await?;

        let tx_hash = hash.as_string().unwrap_or_default();
        clog(&format!("claim({units}) sent from {from}: {tx_hash}"));
        Ok(SettlementReceipt {
            tx_hash,
            account: Some(from),
        })
    }
}

/// Accepts every claim; selected with `settlement: dryRun`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DryRunBridge;

impl SettlementBridge for DryRunBridge {
    async fn settle(&self, amount: u64) -> Result<SettlementReceipt, SettlementError> {
        if amount == 0 {
            return Err(SettlementError::ZeroAmount);
        }
        clog(&format!("dry-run settlement of {amount}"));
        Ok(SettlementReceipt {
            tx_hash: format!("dry-run:{amount}"),
            account: None,
        })
    }
}

/// Bridge selected by configuration.
#[derive(Clone, Debug)]
pub enum Bridge {
    Wallet(WalletBridge),
    DryRun(DryRunBridge),
}

impl Bridge {
    pub fn from_config(cfg: &AppConfig) -> Self {
        match cfg.settlement {
            SettlementMode::Wallet => {
                Bridge::Wallet(WalletBridge::new(cfg.claim_contract.clone(), cfg.token_decimals))
            }
            SettlementMode::DryRun => Bridge::DryRun(DryRunBridge),
        }
    }
}

impl SettlementBridge for Bridge {
    async fn settle(&self, amount: u64) -> Result<SettlementReceipt, SettlementError> {
        match self {
            Bridge::Wallet(b) => b.settle(amount).await,
            Bridge::DryRun(b) => b.settle(amount).await,
        }
    }
}

fn injected_provider() -> Result<JsValue, SettlementError> {
    let win = web_sys::window().ok_or(SettlementError::NoProvider)?;
    let provider = Reflect::get(&win, &JsValue::from_str("ethereum"))
        .map_err(|_| SettlementError::NoProvider)?;
    if provider.is_undefined() || provider.is_null() {
        return Err(SettlementError::NoProvider);
    }
    Ok(provider)
}

async fn request(provider: &JsValue, method: &str, params: Array) -> Result<JsValue, SettlementError> {
    let args = Object::new();
    set_field(&args, "method", &JsValue::from_str(method))?;
    set_field(&args, "params", &params)?;
    let func: Function = Reflect::get(provider, &JsValue::from_str("request"))
        .ok()
        .and_then(|f| f.dyn_into().ok())
        .ok_or(SettlementError::NoProvider)?;
    let promise: Promise = func
        .call1(provider, &args)
        .map_err(js_reason)?
        .dyn_into()
        .map_err(|_| SettlementError::Rejected(format!("{method} did not return a promise")))?;
    JsFuture::from(promise).await.map_err(js_reason)
}

fn set_field(target: &Object, key: &str, value: &JsValue) -> Result<(), SettlementError> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(js_reason)
}

fn js_reason(err: JsValue) -> SettlementError {
    let msg = Reflect::get(&err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| "unknown wallet error".to_string());
    SettlementError::Rejected(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::pin;
    use std::task::{Context, Poll, Waker};

    fn poll_ready<F: Future>(fut: F) -> F::Output {
        let mut cx = Context::from_waker(Waker::noop());
        match pin!(fut).poll(&mut cx) {
            Poll::Ready(out) => out,
            Poll::Pending => panic!("future was not immediately ready"),
        }
    }

    #[test]
    fn base_units_scale_by_decimals() {
        assert_eq!(to_base_units(10, 18), Some(10_000_000_000_000_000_000));
        assert_eq!(to_base_units(5, 0), Some(5));
        assert_eq!(to_base_units(u64::MAX, 30), None);
    }

    #[test]
    fn claim_calldata_is_selector_plus_word() {
        let data = encode_claim_calldata(10_000_000_000_000_000_000);
        assert_eq!(data.len(), 2 + 8 + 64);
        assert!(data.starts_with("0x379607f5"));
        assert!(data.ends_with("8ac7230489e80000"));
        assert_eq!(&data[10..58], "0".repeat(48));
    }

    #[test]
    fn dry_run_accepts_positive_amounts() {
        let receipt = poll_ready(DryRunBridge.settle(10)).expect("accepted");
        assert_eq!(receipt.tx_hash, "dry-run:10");
        assert_eq!(receipt.account, None);
        assert_eq!(poll_ready(DryRunBridge.settle(0)), Err(SettlementError::ZeroAmount));
    }

    #[test]
    fn bridge_follows_configured_mode() {
        let cfg = AppConfig {
            settlement: SettlementMode::DryRun,
            ..AppConfig::default()
        };
        assert!(matches!(Bridge::from_config(&cfg), Bridge::DryRun(_)));
        assert!(matches!(
            Bridge::from_config(&AppConfig::default()),
            Bridge::Wallet(_)
        ));
    }
}
