use super::*;
use ::redb::{ReadTransaction, WriteTransaction};

pub struct DataStoreReader<'db, 'a> {
  wrapper: ReaderWrapper<'db, 'a>,
}

impl<'db, 'a> DataStoreReader<'db, 'a> {
  pub fn new(rtx: &'a ReadTransaction<'db>) -> Self {
    Self {
      wrapper: ReaderWrapper::Rtx(rtx),
    }
  }
}

pub fn new_with_wtx<'db, 'a>(wtx: &'a WriteTransaction<'db>) -> DataStoreReader<'db, 'a> {
  DataStoreReader {
    wrapper: ReaderWrapper::Wtx(wtx),
  }
}

enum ReaderWrapper<'db, 'a> {
  Rtx(&'a ReadTransaction<'db>),
  Wtx(&'a WriteTransaction<'db>),
}

macro_rules! with_table {
  ($self:ident, $definition:expr, $table:ident, $body:expr) => {
    match &$self.wrapper {
      ReaderWrapper::Rtx(rtx) => {
        let $table = rtx.open_table($definition)?;
        $body
      }
      ReaderWrapper::Wtx(wtx) => {
        let $table = wtx.open_table($definition)?;
        $body
      }
    }
  };
}

impl<'db, 'a> UniversalReader for DataStoreReader<'db, 'a> {
  fn balance(&self, script: &ScriptKey, tick: &Tick) -> Result<Option<Balance>, StoreError> {
    with_table!(self, BALANCES, t, table::get_balance(&t, script, tick))
  }

  fn balances(&self, script: &ScriptKey) -> Result<Vec<(Tick, Balance)>, StoreError> {
    with_table!(self, BALANCES, t, table::get_balances(&t, script))
  }

  fn balances_for_tick(&self, tick: &Tick) -> Result<Vec<(ScriptKey, Balance)>, StoreError> {
    with_table!(
      self,
      TICK_BALANCES,
      t,
      table::get_balances_for_tick(&t, tick)
    )
  }

  fn token_info(&self, tick: &Tick) -> Result<Option<TokenInfo>, StoreError> {
    with_table!(self, TOKENS, t, table::get_token_info(&t, tick))
  }

  fn tokens_info(&self) -> Result<Vec<TokenInfo>, StoreError> {
    with_table!(self, TOKENS, t, table::get_tokens_info(&t))
  }

  fn supply(&self, tick: &Tick) -> Result<Option<TokenSupply>, StoreError> {
    with_table!(self, SUPPLIES, t, table::get_supply(&t, tick))
  }

  fn transaction_receipts(&self, txid: &Txid) -> Result<Vec<Receipt>, StoreError> {
    with_table!(
      self,
      TX_RECEIPTS,
      t,
      table::get_transaction_receipts(&t, txid)
    )
  }

  fn receipts_in_block(&self, height: u64) -> Result<Vec<Receipt>, StoreError> {
    match &self.wrapper {
      ReaderWrapper::Rtx(rtx) => {
        let positions = rtx.open_table(OP_LOG_POSITION)?;
        let log = rtx.open_table(OP_LOG)?;
        table::get_receipts_in_block(&positions, &log, height)
      }
      ReaderWrapper::Wtx(wtx) => {
        let positions = wtx.open_table(OP_LOG_POSITION)?;
        let log = wtx.open_table(OP_LOG)?;
        table::get_receipts_in_block(&positions, &log, height)
      }
    }
  }

  fn processed_block(&self, height: u64) -> Result<Option<ProcessedBlockEntry>, StoreError> {
    with_table!(
      self,
      PROCESSED_BLOCKS,
      t,
      table::get_processed_block(&t, height)
    )
  }

  fn indexed_tip(&self) -> Result<Option<(u64, BlockHash)>, StoreError> {
    with_table!(self, PROCESSED_BLOCKS, t, table::get_indexed_tip(&t))
  }

  fn next_receipt_id(&self) -> Result<u64, StoreError> {
    with_table!(self, STAT, t, {
      let value = ::redb::ReadableTable::get(&t, NEXT_RECEIPT_ID_KEY)?
        .map(|guard| guard.value())
        .unwrap_or(0);
      Ok(value)
    })
  }
}
