use super::*;

/// Denormalized cache of an inscription-based deploy, as reported by the
/// legacy oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyTokenRecord {
  pub tick: Tick,
  pub max_supply: u128,
  pub decimals: u8,
  pub limit_per_mint: Option<u128>,
  pub deploy_inscription_id: String,
  pub deploy_height: u64,
  pub deployer_address: Option<String>,
  pub last_verified_at: i64,
}

/// An inscription-based transfer credited in a given transaction, as
/// reported by the legacy oracle. Amounts are base units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyTransferEvent {
  pub tick: Tick,
  pub amount: u128,
  pub sender_address: ScriptKey,
  pub inscription_id: String,
}
