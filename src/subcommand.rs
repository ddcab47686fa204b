use super::*;

pub mod decode;
mod index;
mod status;
mod supply;

#[derive(Debug, Parser)]
pub(crate) enum Subcommand {
  #[command(about = "Run the indexer")]
  Index,
  #[command(about = "Decode a protocol payload without touching the index")]
  Decode(decode::Decode),
  #[command(about = "Report indexed tip against the node tip")]
  Status,
  #[command(about = "Show deploy and supply state for a ticker")]
  Supply(supply::Supply),
}

impl Subcommand {
  pub(crate) fn run(self, options: Options) -> SubcommandResult {
    match self {
      Self::Index => index::run(options),
      Self::Decode(decode) => decode.run(options),
      Self::Status => status::run(options),
      Self::Supply(supply) => supply.run(options),
    }
  }
}

#[derive(Serialize, Deserialize)]
pub struct Empty {}

pub(crate) trait Output: Send {
  fn print_json(&self);
}

impl<T> Output for T
where
  T: Serialize + Send,
{
  fn print_json(&self) {
    serde_json::to_writer_pretty(io::stdout(), self).ok();
    println!();
  }
}

pub(crate) type SubcommandResult = Result<Box<dyn Output>>;
