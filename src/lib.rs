#![allow(clippy::too_many_arguments, clippy::type_complexity)]
#![deny(
  clippy::cast_lossless,
  clippy::cast_possible_truncation,
  clippy::cast_possible_wrap,
  clippy::cast_sign_loss
)]

use {
  self::{
    arguments::Arguments,
    chain::Chain,
    config::Config,
    options::Options,
    subcommand::{Subcommand, SubcommandResult},
  },
  anyhow::{anyhow, bail, Context as _, Error},
  bitcoin::{
    blockdata::opcodes,
    hash_types::BlockHash,
    hashes::{sha256, Hash},
    Address, Network, Script, ScriptBuf, Transaction, Txid,
  },
  chrono::Utc,
  clap::Parser,
  serde::{Deserialize, Serialize},
  std::{
    cmp,
    collections::{BTreeMap, HashMap},
    env,
    fmt::{self, Display, Formatter},
    fs,
    io,
    path::{Path, PathBuf},
    process,
    str::FromStr,
    sync::{
      atomic::{self, AtomicBool},
      mpsc, Arc,
    },
    thread,
    time::{Duration, Instant},
  },
};

pub use crate::{
  index::{Index, Updater},
  node::{BlockData, NodeClient, NodeError, TxData},
  universal::{
    datastore::{
      Balance, CommitPlan, LegacyTokenRecord, LegacyTransferEvent, ProcessedBlockEntry, Receipt,
      ScriptKey, SupplyBucket, Tick, TokenInfo, TokenSupply,
    },
    legacy::{HttpOracle, LegacyOracle, OracleError},
    protocol::{BlockContext, BlockExecutor, OpiProcessor, OpiRegistry},
  },
};

pub mod arguments;
pub mod chain;
pub mod config;
pub mod index;
mod logger;
pub mod node;
pub mod options;
pub mod subcommand;
pub mod universal;

pub type Result<T = (), E = Error> = std::result::Result<T, E>;

static SHUTTING_DOWN: AtomicBool = AtomicBool::new(false);

pub fn shutting_down() -> bool {
  SHUTTING_DOWN.load(atomic::Ordering::Relaxed)
}

pub fn main() {
  if let Err(e) = logger::init() {
    eprintln!("failed to initialize logger: {e}");
    process::exit(1);
  }

  ctrlc::set_handler(move || {
    if SHUTTING_DOWN.fetch_or(true, atomic::Ordering::Relaxed) {
      process::exit(1);
    }

    println!("Shutting down gracefully. Press <CTRL-C> again to shutdown immediately.");
  })
  .expect("Error setting <CTRL-C> handler");

  match Arguments::parse().run() {
    Err(err) => {
      eprintln!("error: {err}");
      err
        .chain()
        .skip(1)
        .for_each(|cause| eprintln!("because: {cause}"));
      if env::var_os("RUST_BACKTRACE")
        .map(|val| val == "1")
        .unwrap_or_default()
      {
        eprintln!("{}", err.backtrace());
      }
      process::exit(1);
    }
    Ok(output) => output.print_json(),
  }
}
