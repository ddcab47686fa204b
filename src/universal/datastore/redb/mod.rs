use super::*;
use ::redb::TableDefinition;

mod read_only;
mod read_write;
pub(crate) mod table;

pub use self::{
  read_only::{new_with_wtx, DataStoreReader},
  read_write::DataStore,
};

pub(crate) const BALANCES: TableDefinition<&str, &[u8]> = TableDefinition::new("BALANCES");
pub(crate) const TICK_BALANCES: TableDefinition<&str, &[u8]> =
  TableDefinition::new("TICK_BALANCES");
pub(crate) const TOKENS: TableDefinition<&str, &[u8]> = TableDefinition::new("TOKENS");
pub(crate) const SUPPLIES: TableDefinition<&str, &[u8]> = TableDefinition::new("SUPPLIES");
pub(crate) const OP_LOG: TableDefinition<u64, &[u8]> = TableDefinition::new("OP_LOG");
pub(crate) const OP_LOG_POSITION: TableDefinition<&str, u64> =
  TableDefinition::new("OP_LOG_POSITION");
pub(crate) const TX_RECEIPTS: TableDefinition<&str, &[u8]> = TableDefinition::new("TX_RECEIPTS");
pub(crate) const PROCESSED_BLOCKS: TableDefinition<u64, &[u8]> =
  TableDefinition::new("PROCESSED_BLOCKS");
pub(crate) const STAT: TableDefinition<&str, u64> = TableDefinition::new("STAT");

pub(crate) const NEXT_RECEIPT_ID_KEY: &str = "next_receipt_id";

pub(crate) fn script_tick_key(script: &ScriptKey, tick: &Tick) -> String {
  format!("{script}_{}", tick.hex())
}

pub(crate) fn min_script_tick_key(script: &ScriptKey) -> String {
  format!("{script}_")
}

pub(crate) fn max_script_tick_key(script: &ScriptKey) -> String {
  format!("{script}_{}", Tick::max_hex())
}

pub(crate) fn tick_script_key(tick: &Tick, script: &ScriptKey) -> String {
  format!("{}_{script}", tick.hex())
}

pub(crate) fn min_tick_script_key(tick: &Tick) -> String {
  format!("{}_", tick.hex())
}

// `` ` `` sorts immediately after `_`, so this bound closes the prefix.
pub(crate) fn max_tick_script_key(tick: &Tick) -> String {
  format!("{}`", tick.hex())
}

pub(crate) fn position_key(height: u64, tx_index: u32, sub_index: u32) -> String {
  format!("{height:010}:{tx_index:06}:{sub_index:04}")
}

pub(crate) fn min_position_key(height: u64) -> String {
  format!("{height:010}:")
}

pub(crate) fn max_position_key(height: u64) -> String {
  format!("{height:010};")
}

/// Opens every table once so later read transactions never observe a
/// missing table.
pub fn initialize_tables(wtx: &::redb::WriteTransaction) -> Result<(), StoreError> {
  wtx.open_table(BALANCES)?;
  wtx.open_table(TICK_BALANCES)?;
  wtx.open_table(TOKENS)?;
  wtx.open_table(SUPPLIES)?;
  wtx.open_table(OP_LOG)?;
  wtx.open_table(OP_LOG_POSITION)?;
  wtx.open_table(TX_RECEIPTS)?;
  wtx.open_table(PROCESSED_BLOCKS)?;
  wtx.open_table(STAT)?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn prefix_bounds_do_not_leak_into_longer_keys() {
    let alfa = Tick::from_str("ALFA").unwrap();
    let alfab = Tick::from_str("ALFAB").unwrap();
    let script = ScriptKey::Address("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4".into());

    let key = tick_script_key(&alfab, &script);
    assert!(key < min_tick_script_key(&alfa) || key >= max_tick_script_key(&alfa));

    let inside = tick_script_key(&alfa, &script);
    assert!(inside >= min_tick_script_key(&alfa) && inside < max_tick_script_key(&alfa));
  }

  #[test]
  fn position_keys_sort_canonically() {
    assert!(position_key(100, 2, 0) < position_key(100, 2, 1));
    assert!(position_key(100, 2, 1) < position_key(100, 3, 0));
    assert!(position_key(100, 3, 0) < position_key(101, 0, 0));
    assert!(position_key(101, 0, 0) < max_position_key(101));
    assert!(min_position_key(101) < position_key(101, 0, 0));
  }
}
