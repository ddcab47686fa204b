use super::*;
use crate::universal::datastore::ScriptKey;
use bitcoincore_rpc::{jsonrpc, Auth, Client, RpcApi};
use std::sync::Mutex;

/// A block as delivered to the indexer: the raw transactions plus the
/// resolved owner of every input, so the core never chases previous
/// outputs itself.
#[derive(Debug, Clone)]
pub struct BlockData {
  pub height: u64,
  pub hash: BlockHash,
  pub prev_hash: BlockHash,
  pub time: u32,
  pub txdata: Vec<TxData>,
}

#[derive(Debug, Clone)]
pub struct TxData {
  pub txid: Txid,
  pub transaction: Transaction,
  /// Parallel to `transaction.input`; `None` when the previous output
  /// could not be resolved to an owner.
  pub input_owners: Vec<Option<ScriptKey>>,
}

impl TxData {
  pub fn is_coinbase(&self) -> bool {
    self
      .transaction
      .input
      .first()
      .map(|input| input.previous_output.is_null())
      .unwrap_or_default()
  }
}

#[derive(Debug, thiserror::Error)]
pub enum NodeError {
  #[error("node unavailable: {0}")]
  Unavailable(String),
  #[error("node returned inconsistent data: {0}")]
  Inconsistent(String),
}

pub trait NodeClient: Send + Sync {
  fn chain_tip(&self) -> Result<(u64, BlockHash), NodeError>;
  fn block_hash_at(&self, height: u64) -> Result<Option<BlockHash>, NodeError>;
  fn block(&self, hash: &BlockHash) -> Result<BlockData, NodeError>;
}

/// `NodeClient` over Bitcoin Core's JSON-RPC interface.
pub struct CoreClient {
  client: Mutex<Client>,
  network: Network,
}

impl CoreClient {
  pub fn new(url: &str, auth: Auth, network: Network) -> Result<Self> {
    let client = Client::new(url, auth)
      .with_context(|| format!("failed to connect to Bitcoin Core RPC at `{url}`"))?;
    Ok(Self {
      client: Mutex::new(client),
      network,
    })
  }

  fn unavailable(e: bitcoincore_rpc::Error) -> NodeError {
    NodeError::Unavailable(e.to_string())
  }
}

const RPC_BLOCK_HEIGHT_OUT_OF_RANGE: i32 = -8;

impl NodeClient for CoreClient {
  fn chain_tip(&self) -> Result<(u64, BlockHash), NodeError> {
    let client = self.client.lock().unwrap();
    let height = client.get_block_count().map_err(Self::unavailable)?;
    let hash = client.get_block_hash(height).map_err(Self::unavailable)?;
    Ok((height, hash))
  }

  fn block_hash_at(&self, height: u64) -> Result<Option<BlockHash>, NodeError> {
    match self.client.lock().unwrap().get_block_hash(height) {
      Ok(hash) => Ok(Some(hash)),
      Err(bitcoincore_rpc::Error::JsonRpc(jsonrpc::error::Error::Rpc(e)))
        if e.code == RPC_BLOCK_HEIGHT_OUT_OF_RANGE =>
      {
        Ok(None)
      }
      Err(e) => Err(Self::unavailable(e)),
    }
  }

  fn block(&self, hash: &BlockHash) -> Result<BlockData, NodeError> {
    let client = self.client.lock().unwrap();

    let block = client.get_block(hash).map_err(Self::unavailable)?;
    let header = client
      .get_block_header_info(hash)
      .map_err(Self::unavailable)?;

    let mut prev_tx_cache: HashMap<Txid, Transaction> = HashMap::new();
    let mut txdata = Vec::with_capacity(block.txdata.len());

    for transaction in block.txdata {
      let txid = transaction.txid();
      let coinbase = transaction
        .input
        .first()
        .map(|input| input.previous_output.is_null())
        .unwrap_or_default();

      let mut input_owners = Vec::with_capacity(transaction.input.len());
      for input in &transaction.input {
        if coinbase {
          input_owners.push(None);
          continue;
        }

        let prev_txid = input.previous_output.txid;
        if !prev_tx_cache.contains_key(&prev_txid) {
          match client.get_raw_transaction(&prev_txid, None) {
            Ok(prev) => {
              prev_tx_cache.insert(prev_txid, prev);
            }
            Err(e) => {
              log::debug!("failed to resolve previous transaction {prev_txid}: {e}");
            }
          }
        }

        let owner = prev_tx_cache.get(&prev_txid).and_then(|prev| {
          prev
            .output
            .get(usize::try_from(input.previous_output.vout).unwrap())
            .map(|txout| ScriptKey::from_script(&txout.script_pubkey, self.network))
        });
        input_owners.push(owner);
      }

      txdata.push(TxData {
        txid,
        transaction,
        input_owners,
      });
    }

    Ok(BlockData {
      height: u64::try_from(header.height)
        .map_err(|_| NodeError::Inconsistent("negative block height".into()))?,
      hash: *hash,
      prev_hash: header
        .previous_block_hash
        .unwrap_or_else(BlockHash::all_zeros),
      time: u32::try_from(header.time)
        .map_err(|_| NodeError::Inconsistent("block time out of range".into()))?,
      txdata,
    })
  }
}
