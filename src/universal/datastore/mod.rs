use crate::*;

pub(crate) mod balance;
mod legacy_record;
mod plan;
pub mod redb;
mod receipt;
mod script_key;
pub(crate) mod supply;
mod tick;
mod token_info;

pub use self::{
  balance::Balance,
  legacy_record::{LegacyTokenRecord, LegacyTransferEvent},
  plan::{BalanceDelta, CommitPlan, ProcessedBlockEntry, SupplyDelta},
  receipt::Receipt,
  script_key::ScriptKey,
  supply::{SupplyBucket, TokenSupply},
  tick::{Tick, TickError, TICK_MAX_BYTE_COUNT, TICK_MIN_BYTE_COUNT},
  token_info::TokenInfo,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("store error: {0}")]
  Redb(#[from] ::redb::Error),
  #[error("store codec error: {0}")]
  Codec(#[from] bincode::Error),
}

impl From<::redb::TableError> for StoreError {
  fn from(e: ::redb::TableError) -> Self {
    Self::Redb(e.into())
  }
}

impl From<::redb::StorageError> for StoreError {
  fn from(e: ::redb::StorageError) -> Self {
    Self::Redb(e.into())
  }
}

impl From<::redb::TransactionError> for StoreError {
  fn from(e: ::redb::TransactionError) -> Self {
    Self::Redb(e.into())
  }
}

impl From<::redb::CommitError> for StoreError {
  fn from(e: ::redb::CommitError) -> Self {
    Self::Redb(e.into())
  }
}

/// Read view over committed state. Implemented by the redb store and by
/// test doubles; processors only ever see it through the block `Context`.
pub trait UniversalReader {
  fn balance(&self, script: &ScriptKey, tick: &Tick) -> Result<Option<Balance>, StoreError>;
  fn balances(&self, script: &ScriptKey) -> Result<Vec<(Tick, Balance)>, StoreError>;
  fn balances_for_tick(&self, tick: &Tick) -> Result<Vec<(ScriptKey, Balance)>, StoreError>;
  fn token_info(&self, tick: &Tick) -> Result<Option<TokenInfo>, StoreError>;
  fn tokens_info(&self) -> Result<Vec<TokenInfo>, StoreError>;
  fn supply(&self, tick: &Tick) -> Result<Option<TokenSupply>, StoreError>;
  fn transaction_receipts(&self, txid: &Txid) -> Result<Vec<Receipt>, StoreError>;
  fn receipts_in_block(&self, height: u64) -> Result<Vec<Receipt>, StoreError>;
  fn processed_block(&self, height: u64) -> Result<Option<ProcessedBlockEntry>, StoreError>;
  fn indexed_tip(&self) -> Result<Option<(u64, BlockHash)>, StoreError>;
  fn next_receipt_id(&self) -> Result<u64, StoreError>;
}

/// Write half, used only by the commit engine and the reorg inverse. All
/// methods run inside one store transaction; nothing is visible until the
/// transaction commits.
pub trait UniversalReaderWriter: UniversalReader {
  fn put_balance(
    &mut self,
    script: &ScriptKey,
    tick: &Tick,
    balance: Balance,
  ) -> Result<(), StoreError>;
  fn delete_balance(&mut self, script: &ScriptKey, tick: &Tick) -> Result<(), StoreError>;

  fn insert_token_info(&mut self, info: &TokenInfo) -> Result<(), StoreError>;
  fn delete_token_info(&mut self, tick: &Tick) -> Result<(), StoreError>;

  fn put_supply(&mut self, tick: &Tick, supply: TokenSupply) -> Result<(), StoreError>;
  fn delete_supply(&mut self, tick: &Tick) -> Result<(), StoreError>;

  fn put_receipt(&mut self, receipt: &Receipt) -> Result<(), StoreError>;
  fn delete_receipt(&mut self, receipt: &Receipt) -> Result<(), StoreError>;
  fn set_next_receipt_id(&mut self, next: u64) -> Result<(), StoreError>;

  fn put_processed_block(
    &mut self,
    height: u64,
    entry: &ProcessedBlockEntry,
  ) -> Result<(), StoreError>;
  fn delete_processed_block(&mut self, height: u64) -> Result<(), StoreError>;
}
