use super::*;
use crate::{
  node::NodeClient,
  universal::{
    datastore::redb::DataStoreReader,
    legacy::LegacyOracle,
    protocol::{BlockExecutor, OpiRegistry, TransientError},
  },
};
use super::reorg::ReorgHandler;

/// Blocks committed per batch before re-checking the node tip.
const BATCH_SIZE: u64 = 1_000;

#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
  #[error(transparent)]
  Transient(#[from] TransientError),

  #[error(transparent)]
  Fatal(#[from] FatalError),
}

#[derive(Debug, PartialEq)]
pub enum Progress {
  /// Caught up with the node tip; nothing to do.
  Synced,
  /// Committed this many blocks.
  Advanced(u64),
  /// Rolled back to a common ancestor; forward indexing resumes there.
  RolledBack { resume_height: u64 },
}

/// The sequential indexing loop: one block at a time, in height order,
/// reorg checks first, retries with backoff on transient failures.
pub struct Updater {
  index: Arc<Index>,
  node: Arc<dyn NodeClient>,
  oracle: Arc<dyn LegacyOracle>,
  registry: OpiRegistry,
  config: Config,
  network: Network,
}

impl Updater {
  pub fn new(
    index: Arc<Index>,
    node: Arc<dyn NodeClient>,
    oracle: Arc<dyn LegacyOracle>,
    registry: OpiRegistry,
    config: Config,
    network: Network,
  ) -> Self {
    Self {
      index,
      node,
      oracle,
      registry,
      config,
      network,
    }
  }

  fn store_conflict(e: impl Display) -> UpdateError {
    UpdateError::Transient(TransientError::StoreConflict(e.to_string()))
  }

  /// One pass: detect reorgs, then fetch and commit up to a batch of
  /// blocks. Transient failures leave the store exactly as it was.
  pub fn update_once(&self) -> Result<Progress, UpdateError> {
    let (node_height, _) = self
      .node
      .chain_tip()
      .map_err(|e| TransientError::NodeUnavailable(e.to_string()))?;

    let indexed_tip = self.index.indexed_tip().map_err(Self::store_conflict)?;

    if let Some((tip_height, tip_hash)) = indexed_tip {
      let node_hash = self
        .node
        .block_hash_at(tip_height)
        .map_err(|e| TransientError::NodeUnavailable(e.to_string()))?;

      match node_hash {
        Some(hash) if hash == tip_hash => {}
        Some(_) => {
          let resume_height = ReorgHandler {
            index: &self.index,
            node: self.node.as_ref(),
            depth_limit: self.config.reorg_depth_limit,
          }
          .handle()?;
          return Ok(Progress::RolledBack { resume_height });
        }
        // The node is behind our tip; wait for it to catch up.
        None => return Ok(Progress::Synced),
      }
    }

    let next_height = match indexed_tip {
      Some((tip_height, _)) => tip_height + 1,
      None => self.config.start_height,
    };

    if next_height > node_height {
      return Ok(Progress::Synced);
    }

    let batch_end = cmp::min(node_height, next_height + BATCH_SIZE - 1);
    let blocks = fetcher::spawn(
      self.node.clone(),
      next_height,
      batch_end,
      self.config.prefetch_depth,
    );

    let mut expected_prev = indexed_tip.map(|(_, hash)| hash);
    let mut committed = 0;

    for block in blocks {
      if shutting_down() {
        break;
      }

      let block = block.map_err(|e| TransientError::NodeUnavailable(e.to_string()))?;

      if let Some(prev) = expected_prev {
        if block.prev_hash != prev {
          let resume_height = ReorgHandler {
            index: &self.index,
            node: self.node.as_ref(),
            depth_limit: self.config.reorg_depth_limit,
          }
          .handle()?;
          return Ok(Progress::RolledBack { resume_height });
        }
      }

      let plan = {
        let rtx = self.index.begin_read().map_err(Self::store_conflict)?;
        let reader = DataStoreReader::new(&rtx);
        let executor = BlockExecutor::new(
          &self.registry,
          &reader,
          self.oracle.as_ref(),
          &self.config,
          self.network,
        );
        executor.execute(&block)?
      };

      expected_prev = Some(plan.hash);
      self.index.commit_block(plan).map_err(|e| match e {
        CommitError::Fatal(fatal) => UpdateError::Fatal(fatal),
        other => Self::store_conflict(other),
      })?;
      committed += 1;
    }

    if committed == 0 {
      return Ok(Progress::Synced);
    }

    Ok(Progress::Advanced(committed))
  }

  /// Runs until shutdown or a fatal error, pacing retries by the
  /// configured backoff and escalating once the budget is spent.
  pub fn run(&self) -> Result {
    let mut attempts: u32 = 0;

    loop {
      if shutting_down() {
        log::info!("shutdown requested, stopping between blocks");
        return Ok(());
      }

      match self.update_once() {
        Ok(Progress::Synced) => {
          attempts = 0;
          thread::sleep(Duration::from_millis(self.config.poll_interval_ms));
        }
        Ok(Progress::Advanced(blocks)) => {
          attempts = 0;
          log::debug!("advanced {blocks} blocks");
        }
        Ok(Progress::RolledBack { resume_height }) => {
          attempts = 0;
          log::info!("resuming forward indexing at {resume_height}");
        }
        Err(UpdateError::Transient(e)) => {
          attempts += 1;
          if attempts > self.config.retry_backoff.budget {
            bail!("retry budget exhausted after {attempts} attempts: {e}");
          }
          let delay = self.config.retry_backoff.delay(attempts - 1);
          log::warn!(
            "{} ({}), retry {attempts}/{} in {delay:?}",
            e,
            e.code(),
            self.config.retry_backoff.budget,
          );
          thread::sleep(delay);
        }
        Err(UpdateError::Fatal(e)) => {
          log::error!("fatal indexer error: {e}");
          return Err(e.into());
        }
      }
    }
  }
}
