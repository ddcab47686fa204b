use super::*;
use crate::node::NodeClient;
use crate::universal::protocol::TransientError;
use super::updater::UpdateError;

/// Rolls the index back to the last block shared with the node's chain.
pub(crate) struct ReorgHandler<'a> {
  pub(crate) index: &'a Index,
  pub(crate) node: &'a dyn NodeClient,
  pub(crate) depth_limit: u64,
}

impl<'a> ReorgHandler<'a> {
  /// Returns the height to resume forward indexing from.
  pub(crate) fn handle(&self) -> Result<u64, UpdateError> {
    let Some((tip_height, tip_hash)) = self
      .index
      .indexed_tip()
      .map_err(|e| TransientError::StoreConflict(e.to_string()))?
    else {
      return Err(
        FatalError::ReorgIrrecoverable("reorg signalled on an empty index".into()).into(),
      );
    };

    log::warn!("chain reorganization detected at indexed tip {tip_height} {tip_hash}");

    let mut ancestor = None;
    for depth in 0..=self.depth_limit {
      let Some(height) = tip_height.checked_sub(depth) else {
        break;
      };

      let Some(entry) = self
        .index
        .processed_block(height)
        .map_err(|e| TransientError::StoreConflict(e.to_string()))?
      else {
        // Below our start height; nothing left to compare against.
        break;
      };

      let node_hash = self
        .node
        .block_hash_at(height)
        .map_err(|e| TransientError::NodeUnavailable(e.to_string()))?;

      if node_hash == Some(entry.hash) {
        ancestor = Some(height);
        break;
      }
    }

    let Some(ancestor) = ancestor else {
      return Err(
        FatalError::ReorgIrrecoverable(format!(
          "no common ancestor within {} blocks of tip {tip_height}",
          self.depth_limit
        ))
        .into(),
      );
    };

    for height in ((ancestor + 1)..=tip_height).rev() {
      self.index.rollback_block(height).map_err(|e| match e {
        CommitError::Fatal(fatal) => UpdateError::Fatal(fatal),
        other => UpdateError::Transient(TransientError::StoreConflict(other.to_string())),
      })?;
    }

    log::info!(
      "rolled back {} blocks to common ancestor {ancestor}",
      tip_height - ancestor
    );

    Ok(ancestor + 1)
  }
}
