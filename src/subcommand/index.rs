use super::*;
use crate::universal::legacy::{DisabledOracle, HttpOracle, LegacyOracle};
use crate::universal::protocol::OpiRegistry;

pub(crate) fn run(options: Options) -> SubcommandResult {
  let config = options.config()?;
  let registry = OpiRegistry::from_enabled_ops(&config.enabled_ops)?;

  let oracle: Arc<dyn LegacyOracle> = match &config.oracle_url {
    Some(url) => Arc::new(HttpOracle::new(
      url,
      Duration::from_millis(config.oracle_timeout_ms),
    )?),
    None => Arc::new(DisabledOracle),
  };

  let index = Arc::new(Index::open(&options.data_dir()?)?);
  let node = Arc::new(options.node_client()?);
  let network = options.chain().network();

  log::info!(
    "indexing {} from height {} with ops [{}]",
    options.chain(),
    config.start_height,
    config.enabled_ops.join(", "),
  );

  Updater::new(index, node, oracle, registry, config, network).run()?;

  Ok(Box::new(Empty {}))
}
