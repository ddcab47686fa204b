use super::*;

#[derive(Debug, Clone, Copy)]
pub struct BlockContext {
  pub network: Network,
  pub height: u64,
  pub hash: BlockHash,
  pub prev_hash: BlockHash,
  pub time: u32,
}

/// Read-only view handed to processors: committed state overlaid with the
/// block's intermediate deltas, so an operation sees everything earlier in
/// its own block. Store failures surface as transient errors because a
/// half-read block must retry, not commit.
pub struct Context<'a> {
  pub chain: BlockContext,
  pub require_legacy: bool,
  store: &'a dyn UniversalReader,
  intermediate: &'a IntermediateState,
  oracle: &'a dyn LegacyOracle,
}

fn store_conflict(e: StoreError) -> TransientError {
  TransientError::StoreConflict(e.to_string())
}

impl<'a> Context<'a> {
  pub fn new(
    chain: BlockContext,
    require_legacy: bool,
    store: &'a dyn UniversalReader,
    intermediate: &'a IntermediateState,
    oracle: &'a dyn LegacyOracle,
  ) -> Self {
    Self {
      chain,
      require_legacy,
      store,
      intermediate,
      oracle,
    }
  }

  pub fn balance_of(&self, script: &ScriptKey, tick: &Tick) -> Result<u128, TransientError> {
    let committed = self
      .store
      .balance(script, tick)
      .map_err(store_conflict)?
      .map(|balance| balance.amount)
      .unwrap_or_default();

    let overlaid = i128::try_from(committed).expect("amounts fit in 127 bits")
      + self.intermediate.balance_delta(script, tick);

    Ok(u128::try_from(overlaid.max(0)).expect("non-negative"))
  }

  pub fn deploy_of(&self, tick: &Tick) -> Result<Option<TokenInfo>, TransientError> {
    if let Some(info) = self.intermediate.deploy(tick) {
      return Ok(Some(info.clone()));
    }
    self.store.token_info(tick).map_err(store_conflict)
  }

  pub fn supply_of(&self, tick: &Tick) -> Result<TokenSupply, TransientError> {
    let committed = self
      .store
      .supply(tick)
      .map_err(store_conflict)?
      .unwrap_or_default();
    let delta = self.intermediate.supply_delta(tick);

    let overlay = |base: u128, delta: i128| -> u128 {
      let value = i128::try_from(base).expect("amounts fit in 127 bits") + delta;
      u128::try_from(value.max(0)).expect("non-negative")
    };

    Ok(TokenSupply {
      universal_minted: overlay(committed.universal_minted, delta.universal),
      legacy_minted: overlay(committed.legacy_minted, delta.legacy),
      burned: overlay(committed.burned, delta.burned),
    })
  }

  pub fn oracle(&self) -> &dyn LegacyOracle {
    self.oracle
  }
}
