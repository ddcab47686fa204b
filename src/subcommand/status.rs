use super::*;
use crate::node::NodeClient;

#[derive(Debug, Serialize, Deserialize)]
pub struct Output {
  pub indexed_height: Option<u64>,
  pub indexed_hash: Option<BlockHash>,
  pub node_height: u64,
  pub node_hash: BlockHash,
  pub blocks_behind: u64,
  pub sync_percentage: f64,
}

pub(crate) fn run(options: Options) -> SubcommandResult {
  let index = Index::open(&options.data_dir()?)?;
  let node = options.node_client()?;

  let (node_height, node_hash) = node
    .chain_tip()
    .map_err(|e| anyhow!("failed to query node tip: {e}"))?;
  let indexed_tip = index.indexed_tip()?;

  let indexed_height = indexed_tip.map(|(height, _)| height);
  let blocks_behind = node_height.saturating_sub(indexed_height.unwrap_or(0));

  #[allow(clippy::cast_precision_loss)]
  let sync_percentage = match indexed_height {
    Some(height) if node_height > 0 => (height as f64 / node_height as f64) * 100.0,
    _ => 0.0,
  };

  Ok(Box::new(Output {
    indexed_height,
    indexed_hash: indexed_tip.map(|(_, hash)| hash),
    node_height,
    node_hash,
    blocks_behind,
    sync_percentage,
  }))
}
