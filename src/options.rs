use super::*;
use crate::node::CoreClient;
use bitcoincore_rpc::Auth;

#[derive(Debug, Clone, Default, Parser)]
pub struct Options {
  #[arg(long, help = "Connect to Bitcoin Core RPC at <BITCOIN_RPC_URL>.")]
  pub(crate) bitcoin_rpc_url: Option<String>,
  #[arg(long, help = "Authenticate to Bitcoin Core RPC as <BITCOIN_RPC_USER>.")]
  pub(crate) bitcoin_rpc_user: Option<String>,
  #[arg(long, help = "Authenticate to Bitcoin Core RPC with <BITCOIN_RPC_PASS>.")]
  pub(crate) bitcoin_rpc_pass: Option<String>,
  #[arg(long, help = "Load Bitcoin Core RPC cookie file from <COOKIE_FILE>.")]
  pub(crate) cookie_file: Option<PathBuf>,
  #[arg(long, help = "Store index in <DATA_DIR>.")]
  pub(crate) data_dir: Option<PathBuf>,
  #[arg(long, value_enum, default_value_t, help = "Index <CHAIN>.")]
  pub(crate) chain: Chain,
  #[arg(long, help = "Load configuration from <CONFIG>.")]
  pub(crate) config: Option<PathBuf>,
  #[arg(long, help = "Start indexing at <START_HEIGHT>, overriding the config file.")]
  pub(crate) start_height: Option<u64>,
  #[arg(long, help = "Query the legacy oracle at <ORACLE_URL>, overriding the config file.")]
  pub(crate) oracle_url: Option<String>,
  #[arg(long, help = "Defer deploys while the legacy oracle is unreachable.")]
  pub(crate) require_legacy: bool,
}

impl Options {
  pub fn config(&self) -> Result<Config> {
    let mut config = Config::load(self.config.as_deref())?;

    if let Some(start_height) = self.start_height {
      config.start_height = start_height;
    }

    if let Some(oracle_url) = &self.oracle_url {
      config.oracle_url = Some(oracle_url.clone());
    }

    if self.require_legacy {
      config.require_legacy = true;
    }

    config.validate()?;

    Ok(config)
  }

  pub fn chain(&self) -> Chain {
    self.chain
  }

  pub fn data_dir(&self) -> Result<PathBuf> {
    let base = self
      .data_dir
      .clone()
      .unwrap_or_else(|| PathBuf::from("ubrc20-data"));
    let dir = self.chain.join_with_data_dir(&base);
    fs::create_dir_all(&dir)
      .with_context(|| format!("failed to create data dir `{}`", dir.display()))?;
    Ok(dir)
  }

  pub fn rpc_url(&self) -> String {
    self
      .bitcoin_rpc_url
      .clone()
      .unwrap_or_else(|| format!("127.0.0.1:{}", self.chain.default_rpc_port()))
  }

  fn auth(&self) -> Result<Auth> {
    match (&self.bitcoin_rpc_user, &self.bitcoin_rpc_pass) {
      (Some(user), Some(pass)) => Ok(Auth::UserPass(user.clone(), pass.clone())),
      (None, None) => match &self.cookie_file {
        Some(cookie_file) => Ok(Auth::CookieFile(cookie_file.clone())),
        None => Ok(Auth::None),
      },
      _ => bail!("--bitcoin-rpc-user and --bitcoin-rpc-pass must be set together"),
    }
  }

  pub fn node_client(&self) -> Result<CoreClient> {
    CoreClient::new(&self.rpc_url(), self.auth()?, self.chain.network())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cli_overrides_config_file() {
    let options = Options {
      start_height: Some(840_000),
      ..Default::default()
    };
    assert_eq!(options.config().unwrap().start_height, 840_000);
  }

  #[test]
  fn user_without_pass_is_rejected() {
    let options = Options {
      bitcoin_rpc_user: Some("satoshi".into()),
      ..Default::default()
    };
    assert!(options.node_client().is_err());
  }

  #[test]
  fn default_rpc_url_follows_chain() {
    let options = Options {
      chain: Chain::Regtest,
      ..Default::default()
    };
    assert_eq!(options.rpc_url(), "127.0.0.1:18443");
  }
}
