use std::io::Write;

pub(crate) fn init() -> Result<(), log::SetLoggerError> {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
    .format(|buf, record| {
      writeln!(
        buf,
        "{} [{}] {}: {}",
        chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
        record.level(),
        record.target(),
        record.args()
      )
    })
    .try_init()
}
