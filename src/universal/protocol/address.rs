use super::*;

/// Owners of the standard (non-OP_RETURN) outputs, in output order. The
/// first is the mint receiver; multi-receiver transfers pay the first N.
pub(crate) fn standard_receivers(tx: &Transaction, network: Network) -> Vec<ScriptKey> {
  tx.output
    .iter()
    .filter(|output| !output.script_pubkey.is_op_return())
    .map(|output| ScriptKey::from_script(&output.script_pubkey, network))
    .collect()
}

/// Owner of the first input whose previous output resolved.
pub(crate) fn resolve_sender(tx: &TxData) -> Option<ScriptKey> {
  tx.input_owners.iter().flatten().next().cloned()
}

#[cfg(test)]
mod tests {
  use super::*;
  use bitcoin::script::PushBytesBuf;

  fn address_output(address: &str) -> bitcoin::TxOut {
    bitcoin::TxOut {
      value: 546,
      script_pubkey: Address::from_str(address)
        .unwrap()
        .assume_checked()
        .script_pubkey(),
    }
  }

  #[test]
  fn op_return_outputs_are_skipped() {
    let tx = Transaction {
      version: 2,
      lock_time: bitcoin::absolute::LockTime::ZERO,
      input: Vec::new(),
      output: vec![
        bitcoin::TxOut {
          value: 0,
          script_pubkey: ScriptBuf::new_op_return(&PushBytesBuf::new()),
        },
        address_output("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4"),
        address_output("1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2"),
      ],
    };

    let receivers = standard_receivers(&tx, Network::Bitcoin);
    assert_eq!(receivers.len(), 2);
    assert_eq!(
      receivers[0].to_string(),
      "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4"
    );
  }

  #[test]
  fn sender_is_first_resolvable_input() {
    let tx = TxData {
      txid: Txid::all_zeros(),
      transaction: Transaction {
        version: 2,
        lock_time: bitcoin::absolute::LockTime::ZERO,
        input: Vec::new(),
        output: Vec::new(),
      },
      input_owners: vec![
        None,
        Some(ScriptKey::Address("1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2".into())),
        Some(ScriptKey::Address("other".into())),
      ],
    };

    assert_eq!(
      resolve_sender(&tx).unwrap().to_string(),
      "1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2"
    );
  }
}
