use super::*;

/// Op-tag → processor map, populated once at startup. Lookup is
/// case-insensitive; registering the same tag twice is fatal.
#[derive(Default)]
pub struct OpiRegistry {
  processors: HashMap<String, Box<dyn OpiProcessor>>,
}

impl OpiRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register(&mut self, processor: Box<dyn OpiProcessor>) -> Result<(), FatalError> {
    let tag = processor.tag().to_ascii_lowercase();
    if self.processors.contains_key(&tag) {
      return Err(FatalError::DuplicateProcessorRegistration(tag));
    }
    log::info!("registered processor for op tag `{tag}`");
    self.processors.insert(tag, processor);
    Ok(())
  }

  pub fn route(&self, tag: &str) -> Option<&dyn OpiProcessor> {
    self
      .processors
      .get(&tag.to_ascii_lowercase())
      .map(Box::as_ref)
  }

  pub fn tags(&self) -> Vec<&str> {
    let mut tags = self
      .processors
      .keys()
      .map(String::as_str)
      .collect::<Vec<&str>>();
    tags.sort_unstable();
    tags
  }

  /// Registry restricted to the configured `enabled_ops`. Unknown tags are
  /// a configuration error, not a silent no-op.
  pub fn from_enabled_ops(enabled_ops: &[String]) -> Result<Self, FatalError> {
    let mut registry = Self::new();
    for tag in enabled_ops {
      let processor: Box<dyn OpiProcessor> = match tag.to_ascii_lowercase().as_str() {
        "deploy" => Box::new(DeployProcessor),
        "mint" => Box::new(MintProcessor),
        "transfer" => Box::new(TransferProcessor),
        "no_return" => Box::new(NoReturnProcessor),
        other => {
          return Err(FatalError::ConfigInvalid(format!(
            "no processor for enabled op `{other}`"
          )))
        }
      };
      registry.register(processor)?;
    }
    Ok(registry)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builtin_registry_routes_case_insensitively() {
    let registry = OpiRegistry::from_enabled_ops(&[
      "deploy".into(),
      "mint".into(),
      "transfer".into(),
      "no_return".into(),
    ])
    .unwrap();

    assert_eq!(registry.route("mint").unwrap().tag(), "mint");
    assert_eq!(registry.route("MINT").unwrap().tag(), "mint");
    assert_eq!(registry.route("Deploy").unwrap().tag(), "deploy");
    assert!(registry.route("stake").is_none());
  }

  #[test]
  fn duplicate_registration_fails() {
    let mut registry = OpiRegistry::new();
    registry.register(Box::new(MintProcessor)).unwrap();
    assert!(matches!(
      registry.register(Box::new(MintProcessor)),
      Err(FatalError::DuplicateProcessorRegistration(_))
    ));
  }

  #[test]
  fn unknown_enabled_op_is_config_error() {
    assert!(matches!(
      OpiRegistry::from_enabled_ops(&["stake".into()]),
      Err(FatalError::ConfigInvalid(_))
    ));
  }

  #[test]
  fn disabled_ops_are_not_routable() {
    let registry = OpiRegistry::from_enabled_ops(&["deploy".into(), "mint".into()]).unwrap();
    assert!(registry.route("transfer").is_none());
    assert_eq!(registry.tags(), vec!["deploy", "mint"]);
  }
}
