use super::*;
use bitcoin::script::Instruction;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde_json::Value;

/// A protocol operation as decoded from an OP_RETURN payload, before
/// routing. `body` keeps the full object so processors can read their
/// operation-specific fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RawOperation {
  pub op: String,
  pub tick: Option<String>,
  pub body: Value,
}

/// One routed slot of a transaction's operation list. Structurally broken
/// candidates keep their error so rejection is logged deterministically at
/// the slot's `(tx_index, sub_index)` position.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedOperation {
  pub vout: u32,
  pub sub_index: u32,
  pub tag: Option<String>,
  pub raw: Vec<u8>,
  pub result: Result<RawOperation, JsonPayloadError>,
}

/// `serde_json::Value` with strict object semantics: duplicate keys are a
/// parse error instead of last-wins.
struct StrictValue(Value);

impl<'de> Deserialize<'de> for StrictValue {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: serde::Deserializer<'de>,
  {
    struct StrictVisitor;

    impl<'de> Visitor<'de> for StrictVisitor {
      type Value = Value;

      fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.write_str("any valid JSON value")
      }

      fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Value::Bool(v))
      }

      fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Value::from(v))
      }

      fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Value::from(v))
      }

      fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Value::from(v))
      }

      fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Value::String(v.to_string()))
      }

      fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Value::String(v))
      }

      fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Value::Null)
      }

      fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
      where
        A: SeqAccess<'de>,
      {
        let mut elements = Vec::new();
        while let Some(element) = seq.next_element::<StrictValue>()? {
          elements.push(element.0);
        }
        Ok(Value::Array(elements))
      }

      fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
      where
        A: MapAccess<'de>,
      {
        let mut object = serde_json::Map::new();
        while let Some(key) = map.next_key::<String>()? {
          let value = map.next_value::<StrictValue>()?;
          if object.insert(key.clone(), value.0).is_some() {
            return Err(de::Error::custom(format!("duplicate key `{key}`")));
          }
        }
        Ok(Value::Object(object))
      }
    }

    deserializer.deserialize_any(StrictVisitor).map(StrictValue)
  }
}

fn op_return_payload(script: &Script) -> Option<Vec<u8>> {
  if !script.is_op_return() {
    return None;
  }

  let mut instructions = script.instructions();
  match instructions.next() {
    Some(Ok(Instruction::Op(op))) if op == opcodes::all::OP_RETURN => {}
    _ => return None,
  }

  match instructions.next() {
    Some(Ok(Instruction::PushBytes(push))) => Some(push.as_bytes().to_vec()),
    _ => None,
  }
}

fn sniff_candidate(raw: &[u8]) -> bool {
  let needle = PROTOCOL_LITERAL.as_bytes();
  raw
    .windows(needle.len())
    .any(|window| window == needle)
}

fn candidate_object(value: &Value) -> bool {
  value.get("p").and_then(Value::as_str) == Some(PROTOCOL_LITERAL)
}

fn operation_from_object(object: Value) -> Result<RawOperation, JsonPayloadError> {
  let op = match object.get("op").and_then(Value::as_str) {
    Some(op) => op.to_string(),
    None => return Err(JsonPayloadError::MissingField("op")),
  };

  let tick = object
    .get("tick")
    .and_then(Value::as_str)
    .map(str::to_string);

  Ok(RawOperation {
    op,
    tick,
    body: object,
  })
}

/// Decodes one OP_RETURN payload into its operation list. Non-candidate
/// payloads (no `"brc-20"` marker) yield nothing; candidates always yield
/// at least one slot, broken ones carrying the structural error.
pub fn payload_operations(
  raw: &[u8],
  payload_max_bytes: usize,
) -> Vec<Result<RawOperation, JsonPayloadError>> {
  let candidate = sniff_candidate(raw);

  let text = match std::str::from_utf8(raw) {
    Ok(text) => text,
    Err(_) => {
      return if candidate {
        vec![Err(JsonPayloadError::UnsupportedEncoding)]
      } else {
        Vec::new()
      }
    }
  };

  if !text.starts_with('{') && !text.starts_with('[') {
    return if candidate {
      vec![Err(JsonPayloadError::MalformedJson(
        "payload does not begin with an opening brace".into(),
      ))]
    } else {
      Vec::new()
    };
  }

  if raw.len() > payload_max_bytes {
    return if candidate {
      vec![Err(JsonPayloadError::PayloadTooLarge {
        size: raw.len(),
        cap: payload_max_bytes,
      })]
    } else {
      Vec::new()
    };
  }

  let value = match serde_json::from_str::<StrictValue>(text) {
    Ok(value) => value.0,
    Err(e) => {
      return if candidate {
        vec![Err(JsonPayloadError::MalformedJson(e.to_string()))]
      } else {
        Vec::new()
      }
    }
  };

  match value {
    Value::Object(_) => {
      if candidate_object(&value) {
        vec![operation_from_object(value)]
      } else {
        Vec::new()
      }
    }
    Value::Array(elements) => elements
      .into_iter()
      .filter(|element| candidate_object(element))
      .map(operation_from_object)
      .collect(),
    _ => Vec::new(),
  }
}

/// Builds the ordered operation list of a transaction: every OP_RETURN
/// output's operations concatenated in output order, `sub_index` assigned
/// sequentially, hard-capped at `MAX_OPS_PER_TX`.
pub fn operations_from_transaction(
  tx: &Transaction,
  txid: &Txid,
  payload_max_bytes: usize,
) -> Vec<ParsedOperation> {
  let mut operations = Vec::new();

  for (vout, output) in tx.output.iter().enumerate() {
    let Some(raw) = op_return_payload(&output.script_pubkey) else {
      continue;
    };

    for result in payload_operations(&raw, payload_max_bytes) {
      if operations.len() >= MAX_OPS_PER_TX {
        log::warn!("transaction {txid} exceeds {MAX_OPS_PER_TX} operations, dropping the rest");
        return operations;
      }

      let tag = match &result {
        Ok(operation) => Some(operation.op.clone()),
        Err(_) => None,
      };

      operations.push(ParsedOperation {
        vout: u32::try_from(vout).unwrap_or(u32::MAX),
        sub_index: u32::try_from(operations.len()).unwrap_or(u32::MAX),
        tag,
        raw: raw.clone(),
        result,
      });
    }
  }

  operations
}

#[cfg(test)]
mod tests {
  use super::*;
  use bitcoin::script::PushBytesBuf;

  fn op_return_script(payload: &[u8]) -> ScriptBuf {
    let mut push = PushBytesBuf::new();
    push.extend_from_slice(payload).unwrap();
    ScriptBuf::new_op_return(&push)
  }

  fn tx_with_payloads(payloads: &[&[u8]]) -> Transaction {
    Transaction {
      version: 2,
      lock_time: bitcoin::absolute::LockTime::ZERO,
      input: Vec::new(),
      output: payloads
        .iter()
        .map(|payload| bitcoin::TxOut {
          value: 0,
          script_pubkey: op_return_script(payload),
        })
        .collect(),
    }
  }

  fn single(raw: &[u8]) -> Vec<Result<RawOperation, JsonPayloadError>> {
    payload_operations(raw, 520)
  }

  #[test]
  fn simple_mint_decodes() {
    let ops = single(br#"{"p":"brc-20","op":"mint","tick":"ALFA","amt":"10"}"#);
    assert_eq!(ops.len(), 1);
    let op = ops[0].as_ref().unwrap();
    assert_eq!(op.op, "mint");
    assert_eq!(op.tick.as_deref(), Some("ALFA"));
  }

  #[test]
  fn non_candidate_payloads_are_skipped() {
    assert!(single(b"hello world").is_empty());
    assert!(single(br#"{"p":"sns","op":"reg"}"#).is_empty());
    assert!(single(&[0xff, 0xfe]).is_empty());
  }

  #[test]
  fn duplicate_keys_are_malformed() {
    let ops = single(br#"{"p":"brc-20","op":"mint","tick":"A","amt":"3","amt":"33"}"#);
    assert_eq!(ops.len(), 1);
    assert!(matches!(
      ops[0],
      Err(JsonPayloadError::MalformedJson(_))
    ));
  }

  #[test]
  fn invalid_utf8_candidate_is_logged() {
    let mut raw = br#"{"p":"brc-20","op":"mint""#.to_vec();
    raw.push(0xff);
    assert_eq!(
      single(&raw),
      vec![Err(JsonPayloadError::UnsupportedEncoding)]
    );
  }

  #[test]
  fn candidate_missing_op_is_structurally_invalid() {
    let ops = single(br#"{"p":"brc-20","tick":"ALFA"}"#);
    assert_eq!(ops, vec![Err(JsonPayloadError::MissingField("op"))]);
  }

  #[test]
  fn size_cap_is_exact() {
    let payload = br#"{"p":"brc-20","op":"mint","tick":"ALFA","amt":"10"}"#;
    assert_eq!(payload_operations(payload, payload.len()).len(), 1);
    assert!(payload_operations(payload, payload.len()).iter().all(Result::is_ok));
    assert!(matches!(
      payload_operations(payload, payload.len() - 1).as_slice(),
      [Err(JsonPayloadError::PayloadTooLarge { .. })]
    ));
  }

  #[test]
  fn array_payload_fans_out_with_sub_indices() {
    let tx = tx_with_payloads(&[
      br#"[{"p":"brc-20","op":"mint","tick":"A","amt":"5"},{"p":"brc-20","op":"transfer","tick":"A","amt":"3"}]"#,
    ]);
    let ops = operations_from_transaction(&tx, &Txid::all_zeros(), 520);
    assert_eq!(ops.len(), 2);
    assert_eq!(ops[0].sub_index, 0);
    assert_eq!(ops[1].sub_index, 1);
    assert_eq!(ops[0].tag.as_deref(), Some("mint"));
    assert_eq!(ops[1].tag.as_deref(), Some("transfer"));
  }

  #[test]
  fn multiple_op_returns_concatenate_in_output_order() {
    let tx = tx_with_payloads(&[
      br#"{"p":"brc-20","op":"mint","tick":"A","amt":"5"}"#,
      br#"{"p":"brc-20","op":"transfer","tick":"A","amt":"3"}"#,
    ]);
    let ops = operations_from_transaction(&tx, &Txid::all_zeros(), 520);
    assert_eq!(ops.len(), 2);
    assert_eq!((ops[0].vout, ops[0].sub_index), (0, 0));
    assert_eq!((ops[1].vout, ops[1].sub_index), (1, 1));
  }

  #[test]
  fn op_count_is_capped() {
    let element = r#"{"p":"brc-20","op":"mint","tick":"A","amt":"1"}"#;
    let array = format!("[{}]", vec![element; 40].join(","));
    let tx = tx_with_payloads(&[array.as_bytes()]);
    let ops = operations_from_transaction(&tx, &Txid::all_zeros(), 4096);
    assert_eq!(ops.len(), MAX_OPS_PER_TX);
  }

  #[test]
  fn array_skips_foreign_elements() {
    let ops = single(
      br#"[{"p":"other","op":"x"},{"p":"brc-20","op":"mint","tick":"A","amt":"1"}]"#,
    );
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].as_ref().unwrap().op, "mint");
  }
}
