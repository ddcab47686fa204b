use super::*;
use bitcoin::ScriptHash;

/// Canonical owner key for balances and receipts. Scripts that encode an
/// address use its textual form; anything else keys by script hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScriptKey {
  Address(String),
  ScriptHash(ScriptHash),
}

impl ScriptKey {
  pub fn from_address(address: Address) -> Self {
    ScriptKey::Address(address.to_string())
  }

  pub fn from_script(script: &Script, network: Network) -> Self {
    match Address::from_script(script, network) {
      Ok(address) => ScriptKey::Address(address.to_string()),
      Err(_) => ScriptKey::ScriptHash(script.script_hash()),
    }
  }
}

impl Display for ScriptKey {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self {
      ScriptKey::Address(address) => write!(f, "{address}"),
      ScriptKey::ScriptHash(script_hash) => write!(f, "{script_hash}"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn address_script_resolves_to_address() {
    let address = Address::from_str("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4")
      .unwrap()
      .assume_checked();
    let key = ScriptKey::from_script(&address.script_pubkey(), Network::Bitcoin);
    assert_eq!(
      key.to_string(),
      "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4"
    );
  }

  #[test]
  fn bare_op_return_falls_back_to_script_hash() {
    let script = ScriptBuf::new_op_return(&bitcoin::script::PushBytesBuf::new());
    assert!(matches!(
      ScriptKey::from_script(&script, Network::Bitcoin),
      ScriptKey::ScriptHash(_)
    ));
  }
}
