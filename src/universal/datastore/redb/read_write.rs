use super::*;
use ::redb::WriteTransaction;

pub struct DataStore<'db, 'a> {
  wtx: &'a WriteTransaction<'db>,
}

impl<'db, 'a> DataStore<'db, 'a> {
  pub fn new(wtx: &'a WriteTransaction<'db>) -> Self {
    Self { wtx }
  }
}

impl<'db, 'a> UniversalReader for DataStore<'db, 'a> {
  fn balance(&self, script: &ScriptKey, tick: &Tick) -> Result<Option<Balance>, StoreError> {
    new_with_wtx(self.wtx).balance(script, tick)
  }

  fn balances(&self, script: &ScriptKey) -> Result<Vec<(Tick, Balance)>, StoreError> {
    new_with_wtx(self.wtx).balances(script)
  }

  fn balances_for_tick(&self, tick: &Tick) -> Result<Vec<(ScriptKey, Balance)>, StoreError> {
    new_with_wtx(self.wtx).balances_for_tick(tick)
  }

  fn token_info(&self, tick: &Tick) -> Result<Option<TokenInfo>, StoreError> {
    new_with_wtx(self.wtx).token_info(tick)
  }

  fn tokens_info(&self) -> Result<Vec<TokenInfo>, StoreError> {
    new_with_wtx(self.wtx).tokens_info()
  }

  fn supply(&self, tick: &Tick) -> Result<Option<TokenSupply>, StoreError> {
    new_with_wtx(self.wtx).supply(tick)
  }

  fn transaction_receipts(&self, txid: &Txid) -> Result<Vec<Receipt>, StoreError> {
    new_with_wtx(self.wtx).transaction_receipts(txid)
  }

  fn receipts_in_block(&self, height: u64) -> Result<Vec<Receipt>, StoreError> {
    new_with_wtx(self.wtx).receipts_in_block(height)
  }

  fn processed_block(&self, height: u64) -> Result<Option<ProcessedBlockEntry>, StoreError> {
    new_with_wtx(self.wtx).processed_block(height)
  }

  fn indexed_tip(&self) -> Result<Option<(u64, BlockHash)>, StoreError> {
    new_with_wtx(self.wtx).indexed_tip()
  }

  fn next_receipt_id(&self) -> Result<u64, StoreError> {
    new_with_wtx(self.wtx).next_receipt_id()
  }
}

impl<'db, 'a> UniversalReaderWriter for DataStore<'db, 'a> {
  fn put_balance(
    &mut self,
    script: &ScriptKey,
    tick: &Tick,
    balance: Balance,
  ) -> Result<(), StoreError> {
    let mut balances = self.wtx.open_table(BALANCES)?;
    let mut tick_balances = self.wtx.open_table(TICK_BALANCES)?;
    table::update_balance(&mut balances, &mut tick_balances, script, tick, balance)
  }

  fn delete_balance(&mut self, script: &ScriptKey, tick: &Tick) -> Result<(), StoreError> {
    let mut balances = self.wtx.open_table(BALANCES)?;
    let mut tick_balances = self.wtx.open_table(TICK_BALANCES)?;
    table::remove_balance(&mut balances, &mut tick_balances, script, tick)
  }

  fn insert_token_info(&mut self, info: &TokenInfo) -> Result<(), StoreError> {
    table::insert_token_info(&mut self.wtx.open_table(TOKENS)?, info)
  }

  fn delete_token_info(&mut self, tick: &Tick) -> Result<(), StoreError> {
    table::remove_token_info(&mut self.wtx.open_table(TOKENS)?, tick)
  }

  fn put_supply(&mut self, tick: &Tick, supply: TokenSupply) -> Result<(), StoreError> {
    table::update_supply(&mut self.wtx.open_table(SUPPLIES)?, tick, supply)
  }

  fn delete_supply(&mut self, tick: &Tick) -> Result<(), StoreError> {
    table::remove_supply(&mut self.wtx.open_table(SUPPLIES)?, tick)
  }

  fn put_receipt(&mut self, receipt: &Receipt) -> Result<(), StoreError> {
    self
      .wtx
      .open_table(OP_LOG)?
      .insert(receipt.id, bincode::serialize(receipt)?.as_slice())?;
    self.wtx.open_table(OP_LOG_POSITION)?.insert(
      position_key(receipt.height, receipt.tx_index, receipt.sub_index).as_str(),
      receipt.id,
    )?;

    let mut receipts = self.transaction_receipts(&receipt.txid)?;
    receipts.push(receipt.clone());
    table::save_transaction_receipts(
      &mut self.wtx.open_table(TX_RECEIPTS)?,
      &receipt.txid,
      &receipts,
    )
  }

  fn delete_receipt(&mut self, receipt: &Receipt) -> Result<(), StoreError> {
    self.wtx.open_table(OP_LOG)?.remove(receipt.id)?;
    self
      .wtx
      .open_table(OP_LOG_POSITION)?
      .remove(position_key(receipt.height, receipt.tx_index, receipt.sub_index).as_str())?;

    let mut receipts = self.transaction_receipts(&receipt.txid)?;
    receipts.retain(|r| r.id != receipt.id);
    table::save_transaction_receipts(
      &mut self.wtx.open_table(TX_RECEIPTS)?,
      &receipt.txid,
      &receipts,
    )
  }

  fn set_next_receipt_id(&mut self, next: u64) -> Result<(), StoreError> {
    self.wtx.open_table(STAT)?.insert(NEXT_RECEIPT_ID_KEY, next)?;
    Ok(())
  }

  fn put_processed_block(
    &mut self,
    height: u64,
    entry: &ProcessedBlockEntry,
  ) -> Result<(), StoreError> {
    self
      .wtx
      .open_table(PROCESSED_BLOCKS)?
      .insert(height, bincode::serialize(entry)?.as_slice())?;
    Ok(())
  }

  fn delete_processed_block(&mut self, height: u64) -> Result<(), StoreError> {
    self.wtx.open_table(PROCESSED_BLOCKS)?.remove(height)?;
    Ok(())
  }
}
