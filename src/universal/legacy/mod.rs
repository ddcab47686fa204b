use crate::*;
use crate::universal::datastore::{LegacyTokenRecord, LegacyTransferEvent, Tick};

mod http;

pub use self::http::HttpOracle;

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
  #[error("oracle unavailable: {0}")]
  Unavailable(String),
  #[error("oracle returned malformed data: {0}")]
  Malformed(String),
}

/// Capability over the inscription-based legacy namespace. Both calls are
/// idempotent; responses for a given query at a given height must be
/// stable, which is what makes the bridge policy deterministic.
pub trait LegacyOracle: Send + Sync {
  fn lookup_ticker(&self, tick: &Tick) -> Result<Option<LegacyTokenRecord>, OracleError>;
  fn transfer_events_for_tx(&self, txid: &Txid) -> Result<Vec<LegacyTransferEvent>, OracleError>;
}

/// Oracle used when no `oracle_url` is configured. Deterministically
/// reports an empty legacy namespace, which is only sound when
/// `require_legacy` is off; `Config::validate` enforces that pairing.
pub struct DisabledOracle;

impl LegacyOracle for DisabledOracle {
  fn lookup_ticker(&self, _tick: &Tick) -> Result<Option<LegacyTokenRecord>, OracleError> {
    Ok(None)
  }

  fn transfer_events_for_tx(&self, _txid: &Txid) -> Result<Vec<LegacyTransferEvent>, OracleError> {
    Ok(Vec::new())
  }
}
