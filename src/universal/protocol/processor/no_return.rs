use super::*;

/// Terminates an inscription-based transfer without a receiver: the legacy
/// tokens are recorded as burned and re-credited to the sender's universal
/// balance. Matching against the oracle's transfer events is exact on
/// `(ticker, amount, sender)`; payload `tick`/`amt` narrow the match when
/// present.
pub struct NoReturnProcessor;

impl NoReturnProcessor {
  fn matches(msg: &ExecutionMessage, event: &LegacyTransferEvent) -> bool {
    if let Some(sender) = &msg.sender {
      if event.sender_address != *sender {
        return false;
      }
    }

    if let Some(tick) = &msg.op.tick {
      match tick.parse::<Tick>() {
        Ok(tick) => {
          if event.tick != tick {
            return false;
          }
        }
        Err(_) => return false,
      }
    }

    if let Some(amount) = msg.op.body.get("amt").and_then(serde_json::Value::as_str) {
      match amount.parse::<u128>() {
        Ok(amount) => {
          if event.amount != amount {
            return false;
          }
        }
        Err(_) => return false,
      }
    }

    true
  }
}

impl OpiProcessor for NoReturnProcessor {
  fn tag(&self) -> &'static str {
    "no_return"
  }

  fn process(
    &self,
    msg: &ExecutionMessage,
    ctx: &Context,
  ) -> Result<Execution, TransientError> {
    let events = ctx
      .oracle()
      .transfer_events_for_tx(&msg.txid)
      .map_err(|e| TransientError::OracleUnavailable(e.to_string()))?;

    let Some(event) = events.iter().find(|event| Self::matches(msg, event)) else {
      return Ok(Execution::invalid(ProtocolError::NoLegacyTransfer));
    };

    // Migration needs headroom on both sides of the supply split when the
    // ticker is also deployed here: the re-credit counts as universal mint
    // and the terminated legacy transfer lands in the burn bucket.
    if let Some(info) = ctx.deploy_of(&event.tick)? {
      let supply = ctx.supply_of(&event.tick)?;
      let remaining = supply.remaining(info.max_supply);
      let required = event.amount.saturating_mul(2);
      if required > remaining {
        return Ok(Execution::invalid(ProtocolError::MintExceedsSupply {
          amount: required,
          remaining,
        }));
      }
    }

    let sender = event.sender_address.clone();
    Ok(Execution {
      tick: Some(event.tick.clone()),
      amount: Some(event.amount),
      to: Some(sender.clone()),
      ..Execution::success(vec![
        StateUpdate::BalanceAdd {
          script: sender,
          tick: event.tick.clone(),
          amount: event.amount,
        },
        StateUpdate::SupplyAdd {
          tick: event.tick.clone(),
          bucket: SupplyBucket::Universal,
          amount: event.amount,
        },
        StateUpdate::SupplyAdd {
          tick: event.tick.clone(),
          bucket: SupplyBucket::Burned,
          amount: event.amount,
        },
      ])
    })
  }
}
