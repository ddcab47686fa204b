use super::*;

/// One signed balance movement inside a commit plan. `created` is filled in
/// by the commit engine so the inverse knows whether to delete the row or
/// restore its previous amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceDelta {
  pub script: ScriptKey,
  pub tick: Tick,
  pub delta: i128,
  pub created: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyDelta {
  pub tick: Tick,
  pub universal: i128,
  pub legacy: i128,
  pub burned: i128,
}

impl SupplyDelta {
  pub fn is_zero(&self) -> bool {
    self.universal == 0 && self.legacy == 0 && self.burned == 0
  }
}

/// The complete effect of one block, applied and inverted atomically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitPlan {
  pub height: u64,
  pub hash: BlockHash,
  pub prev_hash: BlockHash,
  pub balance_deltas: Vec<BalanceDelta>,
  pub new_deploys: Vec<TokenInfo>,
  pub supply_deltas: Vec<SupplyDelta>,
  pub receipts: Vec<Receipt>,
}

impl CommitPlan {
  pub fn encode(&self) -> Vec<u8> {
    bincode::serialize(self).expect("commit plan serialization cannot fail")
  }

  pub fn decode(blob: &[u8]) -> Result<Self, bincode::Error> {
    bincode::deserialize(blob)
  }

  pub fn checksum(blob: &[u8]) -> sha256::Hash {
    sha256::Hash::hash(blob)
  }
}

/// Row of the processed-block table. The plan blob travels with the block
/// so a reorg can derive the inverse without replaying anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedBlockEntry {
  pub hash: BlockHash,
  pub prev_hash: BlockHash,
  pub commit_checksum: sha256::Hash,
  pub committed_at: i64,
  pub plan: Vec<u8>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn checksum_detects_corruption() {
    let plan = CommitPlan {
      height: 100,
      hash: BlockHash::all_zeros(),
      prev_hash: BlockHash::all_zeros(),
      balance_deltas: Vec::new(),
      new_deploys: Vec::new(),
      supply_deltas: Vec::new(),
      receipts: Vec::new(),
    };

    let mut blob = plan.encode();
    let checksum = CommitPlan::checksum(&blob);
    assert_eq!(CommitPlan::checksum(&blob), checksum);

    blob[0] ^= 0xff;
    assert_ne!(CommitPlan::checksum(&blob), checksum);
  }

  #[test]
  fn plan_round_trips_through_bincode() {
    let plan = CommitPlan {
      height: 7,
      hash: BlockHash::all_zeros(),
      prev_hash: BlockHash::all_zeros(),
      balance_deltas: vec![BalanceDelta {
        script: ScriptKey::Address("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4".into()),
        tick: Tick::from_str("ALFA").unwrap(),
        delta: -42,
        created: false,
      }],
      new_deploys: Vec::new(),
      supply_deltas: vec![SupplyDelta {
        tick: Tick::from_str("ALFA").unwrap(),
        universal: 42,
        legacy: 0,
        burned: 0,
      }],
      receipts: Vec::new(),
    };

    assert_eq!(CommitPlan::decode(&plan.encode()).unwrap(), plan);
  }
}
