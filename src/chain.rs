use super::*;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
  #[default]
  #[value(alias("main"))]
  Mainnet,
  #[value(alias("test"))]
  Testnet,
  Signet,
  Regtest,
}

impl Chain {
  pub fn network(self) -> Network {
    match self {
      Self::Mainnet => Network::Bitcoin,
      Self::Testnet => Network::Testnet,
      Self::Signet => Network::Signet,
      Self::Regtest => Network::Regtest,
    }
  }

  pub fn default_rpc_port(self) -> u16 {
    match self {
      Self::Mainnet => 8332,
      Self::Testnet => 18332,
      Self::Signet => 38332,
      Self::Regtest => 18443,
    }
  }

  pub fn join_with_data_dir(self, data_dir: &Path) -> PathBuf {
    match self {
      Self::Mainnet => data_dir.to_owned(),
      Self::Testnet => data_dir.join("testnet3"),
      Self::Signet => data_dir.join("signet"),
      Self::Regtest => data_dir.join("regtest"),
    }
  }
}

impl Display for Chain {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(
      f,
      "{}",
      match self {
        Self::Mainnet => "mainnet",
        Self::Testnet => "testnet",
        Self::Signet => "signet",
        Self::Regtest => "regtest",
      }
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn network_mapping() {
    assert_eq!(Chain::Mainnet.network(), Network::Bitcoin);
    assert_eq!(Chain::Regtest.network(), Network::Regtest);
  }

  #[test]
  fn data_dir_suffix() {
    assert_eq!(
      Chain::Signet.join_with_data_dir(Path::new("/var/lib/ubrc20")),
      Path::new("/var/lib/ubrc20/signet")
    );
  }
}
