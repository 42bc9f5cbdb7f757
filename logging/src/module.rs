use crate::config::LoggerConfig;
use crate::logger::Logger;
use arbor_ioc::{Bean, BoxError, Configuration, Module};

/// A configuration module that registers an unnamed [`Logger`] bean built from `config`.
///
/// Components receive it with `Inject<Logger>`; other modules take it as an
/// `Arc<Logger>` parameter.
pub fn configuration<H: 'static>(config: LoggerConfig) -> Module<H> {
  Module::new(move || -> Result<Configuration<H>, BoxError> {
    let logger = Logger::new(&config)?;
    Ok(Configuration::new().bean(Bean::component(logger)))
  })
  .named("arbor_logging")
}
