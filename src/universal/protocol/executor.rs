use super::*;

/// Orchestrates one block: decode, route, process, accumulate, seal. The
/// canonical sequence is `(tx_index, sub_index)`; nothing is reordered and
/// nothing is written here — the output is a commit plan.
pub struct BlockExecutor<'a> {
  registry: &'a OpiRegistry,
  store: &'a dyn UniversalReader,
  oracle: &'a dyn LegacyOracle,
  config: &'a Config,
  network: Network,
}

impl<'a> BlockExecutor<'a> {
  pub fn new(
    registry: &'a OpiRegistry,
    store: &'a dyn UniversalReader,
    oracle: &'a dyn LegacyOracle,
    config: &'a Config,
    network: Network,
  ) -> Self {
    Self {
      registry,
      store,
      oracle,
      config,
      network,
    }
  }

  fn receipt(
    &self,
    block: &BlockData,
    txid: Txid,
    tx_index: u32,
    sub_index: u32,
    op: String,
  ) -> Receipt {
    Receipt {
      id: 0,
      txid,
      op,
      tick: None,
      amount: None,
      height: block.height,
      block_hash: block.hash,
      tx_index,
      sub_index,
      from: None,
      to: None,
      valid: false,
      error_code: None,
      timestamp: block.time,
    }
  }

  pub fn execute(&self, block: &BlockData) -> Result<CommitPlan, TransientError> {
    let start = Instant::now();
    let chain = BlockContext {
      network: self.network,
      height: block.height,
      hash: block.hash,
      prev_hash: block.prev_hash,
      time: block.time,
    };

    let mut intermediate = IntermediateState::new();
    let mut receipts: Vec<Receipt> = Vec::new();

    for (tx_index, tx) in block.txdata.iter().enumerate() {
      if tx.is_coinbase() {
        continue;
      }

      let operations =
        envelope::operations_from_transaction(&tx.transaction, &tx.txid, self.config.payload_max_bytes);
      if operations.is_empty() {
        continue;
      }

      let tx_index = u32::try_from(tx_index).expect("tx index fits in u32");
      let sender = address::resolve_sender(tx);
      let receivers = address::standard_receivers(&tx.transaction, self.network);

      for parsed in operations {
        let tag = parsed.tag.clone().unwrap_or_else(|| "unknown".into());
        let mut receipt = self.receipt(block, tx.txid, tx_index, parsed.sub_index, tag);

        match parsed.result {
          Err(e) => {
            receipt.error_code = Some(e.code().to_string());
          }
          Ok(op) => match self.registry.route(&op.op) {
            None => {
              receipt.error_code =
                Some(JsonPayloadError::UnknownOp(op.op.clone()).code().to_string());
            }
            Some(processor) => {
              let msg = ExecutionMessage {
                txid: tx.txid,
                tx_index,
                sub_index: parsed.sub_index,
                op,
                raw: parsed.raw.clone(),
                sender: sender.clone(),
                receivers: receivers.clone(),
              };

              let execution = {
                let ctx = Context::new(
                  chain,
                  self.config.require_legacy,
                  self.store,
                  &intermediate,
                  self.oracle,
                );
                processor.process(&msg, &ctx)?
              };

              receipt.tick = execution.tick.clone();
              receipt.amount = execution.amount;
              receipt.from = execution.from.clone();
              receipt.to = execution.to.clone();

              match execution.outcome {
                Outcome::Invalid(e) => {
                  receipt.error_code = Some(e.code().to_string());
                }
                Outcome::Success => {
                  match intermediate.apply(&execution.updates, self.store) {
                    Ok(()) => {
                      receipt.valid = true;
                    }
                    Err(ApplyError::Protocol(e)) => {
                      receipt.error_code = Some(e.code().to_string());
                    }
                    Err(ApplyError::Store(e)) => {
                      return Err(TransientError::StoreConflict(e.to_string()));
                    }
                  }
                }
              }
            }
          },
        }

        log::debug!(
          "block {} tx {} sub {}: op `{}` {}",
          block.height,
          receipt.tx_index,
          receipt.sub_index,
          receipt.op,
          if receipt.valid {
            "valid".to_string()
          } else {
            format!("invalid ({})", receipt.error_code.as_deref().unwrap_or("?"))
          }
        );

        receipts.push(receipt);
      }
    }

    log::info!(
      "executed block {} with {} operations in {} ms",
      block.height,
      receipts.len(),
      start.elapsed().as_millis(),
    );

    Ok(intermediate.seal(block.height, block.hash, block.prev_hash, receipts))
  }
}
