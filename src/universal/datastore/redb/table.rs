use super::*;
use ::redb::{ReadableTable, Table};

#[derive(Serialize, Deserialize)]
pub(crate) struct StoredBalance {
  pub(crate) tick: Tick,
  pub(crate) balance: Balance,
}

#[derive(Serialize, Deserialize)]
pub(crate) struct StoredHolding {
  pub(crate) script: ScriptKey,
  pub(crate) balance: Balance,
}

pub(crate) fn get_balance<T: ReadableTable<&'static str, &'static [u8]>>(
  table: &T,
  script: &ScriptKey,
  tick: &Tick,
) -> Result<Option<Balance>, StoreError> {
  Ok(
    table
      .get(script_tick_key(script, tick).as_str())?
      .map(|guard| bincode::deserialize::<StoredBalance>(guard.value()))
      .transpose()?
      .map(|stored| stored.balance),
  )
}

pub(crate) fn get_balances<T: ReadableTable<&'static str, &'static [u8]>>(
  table: &T,
  script: &ScriptKey,
) -> Result<Vec<(Tick, Balance)>, StoreError> {
  let mut result = Vec::new();
  for entry in table.range::<&str>(
    min_script_tick_key(script).as_str()..=max_script_tick_key(script).as_str(),
  )? {
    let (_, value) = entry?;
    let stored = bincode::deserialize::<StoredBalance>(value.value())?;
    result.push((stored.tick, stored.balance));
  }
  Ok(result)
}

pub(crate) fn get_balances_for_tick<T: ReadableTable<&'static str, &'static [u8]>>(
  table: &T,
  tick: &Tick,
) -> Result<Vec<(ScriptKey, Balance)>, StoreError> {
  let mut result = Vec::new();
  for entry in
    table.range::<&str>(min_tick_script_key(tick).as_str()..max_tick_script_key(tick).as_str())?
  {
    let (_, value) = entry?;
    let stored = bincode::deserialize::<StoredHolding>(value.value())?;
    result.push((stored.script, stored.balance));
  }
  Ok(result)
}

pub(crate) fn update_balance(
  balances: &mut Table<&'static str, &'static [u8]>,
  tick_balances: &mut Table<&'static str, &'static [u8]>,
  script: &ScriptKey,
  tick: &Tick,
  balance: Balance,
) -> Result<(), StoreError> {
  let stored = StoredBalance {
    tick: tick.clone(),
    balance,
  };
  balances.insert(
    script_tick_key(script, tick).as_str(),
    bincode::serialize(&stored)?.as_slice(),
  )?;

  let holding = StoredHolding {
    script: script.clone(),
    balance,
  };
  tick_balances.insert(
    tick_script_key(tick, script).as_str(),
    bincode::serialize(&holding)?.as_slice(),
  )?;
  Ok(())
}

pub(crate) fn remove_balance(
  balances: &mut Table<&'static str, &'static [u8]>,
  tick_balances: &mut Table<&'static str, &'static [u8]>,
  script: &ScriptKey,
  tick: &Tick,
) -> Result<(), StoreError> {
  balances.remove(script_tick_key(script, tick).as_str())?;
  tick_balances.remove(tick_script_key(tick, script).as_str())?;
  Ok(())
}

pub(crate) fn get_token_info<T: ReadableTable<&'static str, &'static [u8]>>(
  table: &T,
  tick: &Tick,
) -> Result<Option<TokenInfo>, StoreError> {
  Ok(
    table
      .get(tick.hex().as_str())?
      .map(|guard| bincode::deserialize::<TokenInfo>(guard.value()))
      .transpose()?,
  )
}

pub(crate) fn get_tokens_info<T: ReadableTable<&'static str, &'static [u8]>>(
  table: &T,
) -> Result<Vec<TokenInfo>, StoreError> {
  let mut result = Vec::new();
  for entry in table.iter()? {
    let (_, value) = entry?;
    result.push(bincode::deserialize::<TokenInfo>(value.value())?);
  }
  Ok(result)
}

pub(crate) fn insert_token_info(
  table: &mut Table<&'static str, &'static [u8]>,
  info: &TokenInfo,
) -> Result<(), StoreError> {
  table.insert(info.tick.hex().as_str(), bincode::serialize(info)?.as_slice())?;
  Ok(())
}

pub(crate) fn remove_token_info(
  table: &mut Table<&'static str, &'static [u8]>,
  tick: &Tick,
) -> Result<(), StoreError> {
  table.remove(tick.hex().as_str())?;
  Ok(())
}

pub(crate) fn get_supply<T: ReadableTable<&'static str, &'static [u8]>>(
  table: &T,
  tick: &Tick,
) -> Result<Option<TokenSupply>, StoreError> {
  Ok(
    table
      .get(tick.hex().as_str())?
      .map(|guard| bincode::deserialize::<TokenSupply>(guard.value()))
      .transpose()?,
  )
}

pub(crate) fn update_supply(
  table: &mut Table<&'static str, &'static [u8]>,
  tick: &Tick,
  supply: TokenSupply,
) -> Result<(), StoreError> {
  table.insert(tick.hex().as_str(), bincode::serialize(&supply)?.as_slice())?;
  Ok(())
}

pub(crate) fn remove_supply(
  table: &mut Table<&'static str, &'static [u8]>,
  tick: &Tick,
) -> Result<(), StoreError> {
  table.remove(tick.hex().as_str())?;
  Ok(())
}

pub(crate) fn get_transaction_receipts<T: ReadableTable<&'static str, &'static [u8]>>(
  table: &T,
  txid: &Txid,
) -> Result<Vec<Receipt>, StoreError> {
  Ok(
    table
      .get(txid.to_string().as_str())?
      .map(|guard| bincode::deserialize::<Vec<Receipt>>(guard.value()))
      .transpose()?
      .unwrap_or_default(),
  )
}

pub(crate) fn save_transaction_receipts(
  table: &mut Table<&'static str, &'static [u8]>,
  txid: &Txid,
  receipts: &[Receipt],
) -> Result<(), StoreError> {
  if receipts.is_empty() {
    table.remove(txid.to_string().as_str())?;
  } else {
    table.insert(
      txid.to_string().as_str(),
      bincode::serialize(receipts)?.as_slice(),
    )?;
  }
  Ok(())
}

pub(crate) fn get_receipts_in_block<
  P: ReadableTable<&'static str, u64>,
  L: ReadableTable<u64, &'static [u8]>,
>(
  positions: &P,
  log: &L,
  height: u64,
) -> Result<Vec<Receipt>, StoreError> {
  let mut result = Vec::new();
  for entry in
    positions.range::<&str>(min_position_key(height).as_str()..max_position_key(height).as_str())?
  {
    let (_, id) = entry?;
    if let Some(guard) = log.get(id.value())? {
      result.push(bincode::deserialize::<Receipt>(guard.value())?);
    }
  }
  Ok(result)
}

pub(crate) fn get_processed_block<T: ReadableTable<u64, &'static [u8]>>(
  table: &T,
  height: u64,
) -> Result<Option<ProcessedBlockEntry>, StoreError> {
  Ok(
    table
      .get(height)?
      .map(|guard| bincode::deserialize::<ProcessedBlockEntry>(guard.value()))
      .transpose()?,
  )
}

pub(crate) fn get_indexed_tip<T: ReadableTable<u64, &'static [u8]>>(
  table: &T,
) -> Result<Option<(u64, BlockHash)>, StoreError> {
  match table.iter()?.next_back() {
    Some(entry) => {
      let (height, value) = entry?;
      let stored = bincode::deserialize::<ProcessedBlockEntry>(value.value())?;
      Ok(Some((height.value(), stored.hash)))
    }
    None => Ok(None),
  }
}
