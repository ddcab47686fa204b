use super::*;

/// High-level state change proposed by a processor. Processors never touch
/// the store; they return these and the block processor folds them into the
/// intermediate state.
#[derive(Debug, Clone, PartialEq)]
pub enum StateUpdate {
  BalanceAdd {
    script: ScriptKey,
    tick: Tick,
    amount: u128,
  },
  BalanceSub {
    script: ScriptKey,
    tick: Tick,
    amount: u128,
  },
  DeployCreate {
    info: TokenInfo,
  },
  SupplyAdd {
    tick: Tick,
    bucket: SupplyBucket,
    amount: u128,
  },
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BlockSupplyDelta {
  pub universal: i128,
  pub legacy: i128,
  pub burned: i128,
}

#[derive(Debug)]
pub(crate) enum ApplyError {
  Protocol(ProtocolError),
  Store(StoreError),
}

impl From<StoreError> for ApplyError {
  fn from(e: StoreError) -> Self {
    Self::Store(e)
  }
}

/// Per-block accumulator. Later operations in the same block observe
/// earlier effects through the `Context` overlay; nothing here reaches the
/// store until the block seals into a commit plan.
#[derive(Debug, Default)]
pub struct IntermediateState {
  balance_delta: HashMap<(ScriptKey, Tick), i128>,
  new_deploys: HashMap<Tick, TokenInfo>,
  supply_delta: HashMap<Tick, BlockSupplyDelta>,
}

fn to_i128(amount: u128) -> i128 {
  i128::try_from(amount).expect("amounts fit in 127 bits")
}

impl IntermediateState {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn balance_delta(&self, script: &ScriptKey, tick: &Tick) -> i128 {
    self
      .balance_delta
      .get(&(script.clone(), tick.clone()))
      .copied()
      .unwrap_or(0)
  }

  pub fn deploy(&self, tick: &Tick) -> Option<&TokenInfo> {
    self.new_deploys.get(tick)
  }

  pub fn supply_delta(&self, tick: &Tick) -> BlockSupplyDelta {
    self.supply_delta.get(tick).copied().unwrap_or_default()
  }

  /// Folds one operation's updates in, all-or-nothing: the batch is
  /// validated against the overlay before any of it lands.
  pub(crate) fn apply(
    &mut self,
    updates: &[StateUpdate],
    store: &dyn UniversalReader,
  ) -> Result<(), ApplyError> {
    let mut staged_balances: HashMap<(ScriptKey, Tick), i128> = HashMap::new();
    let mut staged_deploys: Vec<Tick> = Vec::new();

    for update in updates {
      match update {
        StateUpdate::BalanceAdd {
          script,
          tick,
          amount,
        } => {
          let key = (script.clone(), tick.clone());
          let delta = staged_balances
            .entry(key)
            .or_insert_with(|| self.balance_delta(script, tick));
          *delta += to_i128(*amount);
        }
        StateUpdate::BalanceSub {
          script,
          tick,
          amount,
        } => {
          let committed = store
            .balance(script, tick)?
            .map(|balance| balance.amount)
            .unwrap_or_default();
          let key = (script.clone(), tick.clone());
          let delta = staged_balances
            .entry(key)
            .or_insert_with(|| self.balance_delta(script, tick));
          *delta -= to_i128(*amount);
          if to_i128(committed) + *delta < 0 {
            return Err(ApplyError::Protocol(ProtocolError::InsufficientBalance {
              available: u128::try_from(to_i128(committed) + *delta + to_i128(*amount))
                .unwrap_or_default(),
              required: *amount,
            }));
          }
        }
        StateUpdate::DeployCreate { info } => {
          let deployed_in_block = self.new_deploys.contains_key(&info.tick)
            || staged_deploys.contains(&info.tick);
          if deployed_in_block || store.token_info(&info.tick)?.is_some() {
            return Err(ApplyError::Protocol(ProtocolError::TickerAlreadyDeployed(
              info.tick.clone(),
            )));
          }
          staged_deploys.push(info.tick.clone());
        }
        StateUpdate::SupplyAdd { .. } => {}
      }
    }

    // Validated; land the batch.
    for update in updates {
      match update {
        StateUpdate::BalanceAdd {
          script,
          tick,
          amount,
        } => {
          *self
            .balance_delta
            .entry((script.clone(), tick.clone()))
            .or_default() += to_i128(*amount);
        }
        StateUpdate::BalanceSub {
          script,
          tick,
          amount,
        } => {
          *self
            .balance_delta
            .entry((script.clone(), tick.clone()))
            .or_default() -= to_i128(*amount);
        }
        StateUpdate::DeployCreate { info } => {
          self.new_deploys.insert(info.tick.clone(), info.clone());
          self.supply_delta.entry(info.tick.clone()).or_default();
        }
        StateUpdate::SupplyAdd {
          tick,
          bucket,
          amount,
        } => {
          let delta = self.supply_delta.entry(tick.clone()).or_default();
          match bucket {
            SupplyBucket::Universal => delta.universal += to_i128(*amount),
            SupplyBucket::Legacy => delta.legacy += to_i128(*amount),
            SupplyBucket::Burned => delta.burned += to_i128(*amount),
          }
        }
      }
    }

    Ok(())
  }

  /// Seals the block into its commit plan. Rows are ordered by key so the
  /// plan, and therefore its checksum, is deterministic.
  pub fn seal(
    self,
    height: u64,
    hash: BlockHash,
    prev_hash: BlockHash,
    receipts: Vec<Receipt>,
  ) -> CommitPlan {
    let mut balance_deltas = self
      .balance_delta
      .into_iter()
      .map(|((script, tick), delta)| BalanceDelta {
        script,
        tick,
        delta,
        created: false,
      })
      .collect::<Vec<BalanceDelta>>();
    balance_deltas.sort_by(|a, b| {
      (a.script.to_string(), &a.tick).cmp(&(b.script.to_string(), &b.tick))
    });

    let mut new_deploys = self.new_deploys.into_values().collect::<Vec<TokenInfo>>();
    new_deploys.sort_by(|a, b| a.tick.cmp(&b.tick));

    let mut supply_deltas = self
      .supply_delta
      .into_iter()
      .map(|(tick, delta)| SupplyDelta {
        tick,
        universal: delta.universal,
        legacy: delta.legacy,
        burned: delta.burned,
      })
      .collect::<Vec<SupplyDelta>>();
    supply_deltas.sort_by(|a, b| a.tick.cmp(&b.tick));

    CommitPlan {
      height,
      hash,
      prev_hash,
      balance_deltas,
      new_deploys,
      supply_deltas,
      receipts,
    }
  }
}
