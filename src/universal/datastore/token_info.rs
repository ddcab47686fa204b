use super::*;

/// Deploy record, one per ticker. Immutable outside reorg rollback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
  pub tick: Tick,
  pub max_supply: u128,
  pub limit_per_mint: Option<u128>,
  pub decimals: u8,
  pub deployer: ScriptKey,
  pub deploy_txid: Txid,
  pub deploy_height: u64,
  pub deploy_tx_index: u32,
  pub deploy_timestamp: u32,
  pub legacy_validated: bool,
  pub legacy_snapshot: Option<LegacyTokenRecord>,
}
