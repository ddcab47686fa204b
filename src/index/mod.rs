use super::*;
use crate::universal::{
  datastore::{
    redb::{initialize_tables, DataStore, DataStoreReader},
    Balance, CommitPlan, ProcessedBlockEntry, Receipt, ScriptKey, StoreError, Tick, TokenInfo,
    TokenSupply, UniversalReader, UniversalReaderWriter,
  },
  protocol::FatalError,
};
use ::redb::{Database, ReadTransaction};

mod fetcher;
pub(crate) mod reorg;
mod updater;

pub use self::updater::{Progress, UpdateError, Updater};

#[derive(Debug, thiserror::Error)]
pub enum CommitError {
  #[error(transparent)]
  Store(#[from] StoreError),

  #[error("balance of {script} for {tick} would go negative")]
  NegativeBalance { script: ScriptKey, tick: Tick },

  #[error("ticker `{0}` already deployed")]
  DuplicateDeploy(Tick),

  #[error("supply invariant violated for `{0}`")]
  SupplyInvariant(Tick),

  #[error("plan for block {plan_height} does not extend indexed tip {tip_height}")]
  TipMismatch { plan_height: u64, tip_height: u64 },

  #[error(transparent)]
  Fatal(#[from] FatalError),
}

/// The store plus its commit engine. All writes go through `commit_block`
/// and `rollback_block`, each a single redb write transaction: every step
/// lands or none do.
pub struct Index {
  database: Database,
}

fn apply_bucket(value: u128, delta: i128, tick: &Tick) -> Result<u128, CommitError> {
  let result = i128::try_from(value).expect("amounts fit in 127 bits") + delta;
  u128::try_from(result).map_err(|_| CommitError::SupplyInvariant(tick.clone()))
}

impl Index {
  pub fn open(data_dir: &Path) -> Result<Self> {
    let path = data_dir.join("index.redb");
    let database = Database::create(&path)
      .with_context(|| format!("failed to open index database `{}`", path.display()))?;

    let wtx = database.begin_write().map_err(StoreError::from)?;
    initialize_tables(&wtx).map_err(StoreError::from)?;
    wtx.commit().map_err(StoreError::from)?;

    Ok(Self { database })
  }

  pub fn begin_read(&self) -> Result<ReadTransaction, StoreError> {
    Ok(self.database.begin_read()?)
  }

  fn with_reader<T>(
    &self,
    f: impl FnOnce(&DataStoreReader) -> Result<T, StoreError>,
  ) -> Result<T, StoreError> {
    let rtx = self.begin_read()?;
    f(&DataStoreReader::new(&rtx))
  }

  pub fn indexed_tip(&self) -> Result<Option<(u64, BlockHash)>, StoreError> {
    self.with_reader(|reader| reader.indexed_tip())
  }

  pub fn balance_of(&self, script: &ScriptKey, tick: &Tick) -> Result<u128, StoreError> {
    self.with_reader(|reader| {
      Ok(
        reader
          .balance(script, tick)?
          .map(|balance| balance.amount)
          .unwrap_or_default(),
      )
    })
  }

  pub fn balances(&self, script: &ScriptKey) -> Result<Vec<(Tick, Balance)>, StoreError> {
    self.with_reader(|reader| reader.balances(script))
  }

  pub fn balances_for_tick(&self, tick: &Tick) -> Result<Vec<(ScriptKey, Balance)>, StoreError> {
    self.with_reader(|reader| reader.balances_for_tick(tick))
  }

  pub fn token_info(&self, tick: &Tick) -> Result<Option<TokenInfo>, StoreError> {
    self.with_reader(|reader| reader.token_info(tick))
  }

  pub fn tokens_info(&self) -> Result<Vec<TokenInfo>, StoreError> {
    self.with_reader(|reader| reader.tokens_info())
  }

  pub fn supply_of(&self, tick: &Tick) -> Result<Option<TokenSupply>, StoreError> {
    self.with_reader(|reader| reader.supply(tick))
  }

  pub fn transaction_receipts(&self, txid: &Txid) -> Result<Vec<Receipt>, StoreError> {
    self.with_reader(|reader| reader.transaction_receipts(txid))
  }

  pub fn receipts_in_block(&self, height: u64) -> Result<Vec<Receipt>, StoreError> {
    self.with_reader(|reader| reader.receipts_in_block(height))
  }

  pub fn processed_block(&self, height: u64) -> Result<Option<ProcessedBlockEntry>, StoreError> {
    self.with_reader(|reader| reader.processed_block(height))
  }

  /// Applies a commit plan atomically: balances, deploys, supplies,
  /// receipts, processed-block row, tip advance. The plan is persisted with
  /// the block, enriched with the `created` flags and receipt ids the
  /// inverse needs.
  pub fn commit_block(&self, mut plan: CommitPlan) -> Result<(), CommitError> {
    let wtx = self.database.begin_write().map_err(StoreError::from)?;
    {
      let mut store = DataStore::new(&wtx);

      if let Some((tip_height, tip_hash)) = store.indexed_tip()? {
        if plan.height != tip_height + 1 || plan.prev_hash != tip_hash {
          return Err(CommitError::TipMismatch {
            plan_height: plan.height,
            tip_height,
          });
        }
      }

      for delta in &mut plan.balance_deltas {
        let current = store.balance(&delta.script, &delta.tick)?;
        delta.created = current.is_none();
        let current = current.map(|balance| balance.amount).unwrap_or_default();
        let next = i128::try_from(current).expect("amounts fit in 127 bits") + delta.delta;
        let next = u128::try_from(next).map_err(|_| CommitError::NegativeBalance {
          script: delta.script.clone(),
          tick: delta.tick.clone(),
        })?;
        store.put_balance(&delta.script, &delta.tick, Balance::new(next))?;
      }

      for info in &plan.new_deploys {
        if store.token_info(&info.tick)?.is_some() {
          return Err(CommitError::DuplicateDeploy(info.tick.clone()));
        }
        store.insert_token_info(info)?;
        if store.supply(&info.tick)?.is_none() {
          store.put_supply(&info.tick, TokenSupply::default())?;
        }
      }

      for delta in &plan.supply_deltas {
        let mut supply = store.supply(&delta.tick)?.unwrap_or_default();
        supply.universal_minted =
          apply_bucket(supply.universal_minted, delta.universal, &delta.tick)?;
        supply.legacy_minted = apply_bucket(supply.legacy_minted, delta.legacy, &delta.tick)?;
        supply.burned = apply_bucket(supply.burned, delta.burned, &delta.tick)?;

        if let Some(info) = store.token_info(&delta.tick)? {
          if supply.total() + supply.burned > info.max_supply {
            return Err(CommitError::SupplyInvariant(delta.tick.clone()));
          }
        }

        store.put_supply(&delta.tick, supply)?;
      }

      let mut next_id = store.next_receipt_id()?;
      for receipt in &mut plan.receipts {
        receipt.id = next_id;
        next_id += 1;
        store.put_receipt(receipt)?;
      }
      store.set_next_receipt_id(next_id)?;

      let blob = plan.encode();
      let entry = ProcessedBlockEntry {
        hash: plan.hash,
        prev_hash: plan.prev_hash,
        commit_checksum: CommitPlan::checksum(&blob),
        committed_at: Utc::now().timestamp(),
        plan: blob,
      };
      store.put_processed_block(plan.height, &entry)?;
    }
    wtx.commit().map_err(StoreError::from)?;

    log::info!(
      "committed block {} ({} receipts, {} balance deltas, {} deploys)",
      plan.height,
      plan.receipts.len(),
      plan.balance_deltas.len(),
      plan.new_deploys.len(),
    );

    Ok(())
  }

  /// Applies the inverse of the stored commit plan for the tip block. Only
  /// ever called top-down by the reorg handler.
  pub fn rollback_block(&self, height: u64) -> Result<(), CommitError> {
    let wtx = self.database.begin_write().map_err(StoreError::from)?;
    {
      let mut store = DataStore::new(&wtx);

      match store.indexed_tip()? {
        Some((tip_height, _)) if tip_height == height => {}
        Some((tip_height, _)) => {
          return Err(CommitError::TipMismatch {
            plan_height: height,
            tip_height,
          })
        }
        None => {
          return Err(
            FatalError::ReorgIrrecoverable(format!(
              "no processed block at height {height} to roll back"
            ))
            .into(),
          )
        }
      }

      let Some(entry) = store.processed_block(height)? else {
        return Err(
          FatalError::ReorgIrrecoverable(format!("missing commit plan for block {height}")).into(),
        );
      };

      if CommitPlan::checksum(&entry.plan) != entry.commit_checksum {
        return Err(FatalError::CommitChecksumMismatch(height).into());
      }

      let plan = CommitPlan::decode(&entry.plan).map_err(StoreError::from)?;

      for delta in &plan.supply_deltas {
        let mut supply = store.supply(&delta.tick)?.unwrap_or_default();
        supply.universal_minted =
          apply_bucket(supply.universal_minted, -delta.universal, &delta.tick)?;
        supply.legacy_minted = apply_bucket(supply.legacy_minted, -delta.legacy, &delta.tick)?;
        supply.burned = apply_bucket(supply.burned, -delta.burned, &delta.tick)?;

        // A row this block conjured without a deploy goes away entirely
        // once it zeroes out, restoring the pre-commit bytes.
        if supply == TokenSupply::default() && store.token_info(&delta.tick)?.is_none() {
          store.delete_supply(&delta.tick)?;
        } else {
          store.put_supply(&delta.tick, supply)?;
        }
      }

      for info in &plan.new_deploys {
        store.delete_token_info(&info.tick)?;
        store.delete_supply(&info.tick)?;
      }

      for delta in &plan.balance_deltas {
        if delta.created {
          store.delete_balance(&delta.script, &delta.tick)?;
          continue;
        }
        let current = store
          .balance(&delta.script, &delta.tick)?
          .map(|balance| balance.amount)
          .unwrap_or_default();
        let previous = i128::try_from(current).expect("amounts fit in 127 bits") - delta.delta;
        let previous = u128::try_from(previous).map_err(|_| CommitError::NegativeBalance {
          script: delta.script.clone(),
          tick: delta.tick.clone(),
        })?;
        store.put_balance(&delta.script, &delta.tick, Balance::new(previous))?;
      }

      for receipt in plan.receipts.iter().rev() {
        store.delete_receipt(receipt)?;
      }
      let next_id = store.next_receipt_id()?;
      store.set_next_receipt_id(next_id - u64::try_from(plan.receipts.len()).unwrap())?;

      store.delete_processed_block(height)?;
    }
    wtx.commit().map_err(StoreError::from)?;

    log::info!("rolled back block {height}");

    Ok(())
  }
}
