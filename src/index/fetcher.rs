use super::*;
use crate::node::{BlockData, NodeClient, NodeError};

/// Prefetches `start..=end` into a bounded channel so block processing
/// overlaps with node round-trips. The consumer drains in height order;
/// dropping the receiver stops the thread.
pub(crate) fn spawn(
  node: Arc<dyn NodeClient>,
  start: u64,
  end: u64,
  depth: usize,
) -> mpsc::Receiver<Result<BlockData, NodeError>> {
  let (sender, receiver) = mpsc::sync_channel(depth);

  thread::spawn(move || {
    for height in start..=end {
      if shutting_down() {
        break;
      }

      let result = node.block_hash_at(height).and_then(|hash| match hash {
        Some(hash) => node.block(&hash),
        None => Err(NodeError::Unavailable(format!(
          "node no longer has a block at height {height}"
        ))),
      });

      let errored = result.is_err();
      if sender.send(result).is_err() || errored {
        break;
      }
    }
  });

  receiver
}
