use super::*;

/// Append-only operation log entry. Every parsed protocol operation, valid
/// or not, gets exactly one receipt at its `(height, tx_index, sub_index)`
/// position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
  pub id: u64,
  pub txid: Txid,
  pub op: String,
  pub tick: Option<Tick>,
  pub amount: Option<u128>,
  pub height: u64,
  pub block_hash: BlockHash,
  pub tx_index: u32,
  pub sub_index: u32,
  pub from: Option<ScriptKey>,
  pub to: Option<ScriptKey>,
  pub valid: bool,
  pub error_code: Option<String>,
  pub timestamp: u32,
}

impl Receipt {
  /// Canonical ordering key within the log.
  pub fn position(&self) -> (u64, u32, u32) {
    (self.height, self.tx_index, self.sub_index)
  }
}
