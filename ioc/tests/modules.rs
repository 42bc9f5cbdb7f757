mod common;

use arbor_ioc::{bean, Bean, BoxError, Configuration, Error, Module};
use common::Handler;
use std::sync::Arc;

// --- Test Fixtures ---

struct Settings {
  redis_url: String,
  pool_size: usize,
}

struct RedisClient {
  url: String,
}

struct SessionStore {
  client: Arc<RedisClient>,
  pool_size: usize,
}

trait Clock: Send + Sync {
  fn now(&self) -> u64;
}

struct FixedClock(u64);
impl Clock for FixedClock {
  fn now(&self) -> u64 {
    self.0
  }
}

struct Audit {
  started_at: u64,
}

fn settings_module() -> Result<Configuration<Handler>, BoxError> {
  Ok(Configuration::new().bean(Bean::value(Settings {
    redis_url: "redis://cache:6379".to_string(),
    pool_size: 4,
  })))
}

fn redis_module(settings: Arc<Settings>) -> Result<Configuration<Handler>, BoxError> {
  Ok(Configuration::new().bean(Bean::value(RedisClient {
    url: settings.redis_url.clone(),
  })))
}

fn session_module(
  settings: Arc<Settings>,
  client: Arc<RedisClient>,
) -> Result<Configuration<Handler>, BoxError> {
  Ok(Configuration::new().bean(Bean::value(SessionStore {
    client,
    pool_size: settings.pool_size,
  })))
}

fn audit_module(clock: Arc<dyn Clock>) -> Result<Configuration<Handler>, BoxError> {
  Ok(Configuration::new().bean(Bean::value(Audit {
    started_at: clock.now(),
  })))
}

// --- Module Tests ---

#[test]
fn test_module_order_does_not_matter() {
  let (app, _) = common::application();

  // Dependents are imported before the module that provides their parameters.
  app.import(Module::new(session_module)).unwrap();
  app.import(Module::new(redis_module)).unwrap();
  assert!(app.get_bean_by_type::<RedisClient>().is_err());

  app.import(Module::new(settings_module)).unwrap();

  let store = bean!(app, SessionStore);
  assert_eq!(store.pool_size, 4);
  assert_eq!(store.client.url, "redis://cache:6379");
  assert!(Arc::ptr_eq(&store.client, &bean!(app, RedisClient)));
}

#[test]
fn test_import_all_resolves_in_one_call() {
  let (app, _) = common::application();
  app
    .import_all([
      Module::new(session_module),
      Module::new(redis_module),
      Module::new(settings_module),
    ])
    .unwrap();

  assert_eq!(bean!(app, SessionStore).pool_size, 4);
}

#[test]
fn test_module_parameters_can_be_trait_objects() {
  let (app, _) = common::application();
  app.import(Module::new(audit_module)).unwrap();
  app
    .register_bean(Bean::value(FixedClock(1_700_000_000)).exposes::<dyn Clock>(|clock| clock))
    .unwrap();

  assert_eq!(bean!(app, Audit).started_at, 1_700_000_000);
}

#[test]
fn test_closure_modules() {
  let (app, _) = common::application();
  let greeting = String::from("hello");
  app
    .import(
      Module::new(move || -> Result<Configuration<Handler>, BoxError> {
        Ok(Configuration::new().bean(Bean::value(greeting).named("greeting")))
      })
      .named("greeting"),
    )
    .unwrap();

  assert_eq!(*bean!(app, String, "greeting"), "hello");
}

#[test]
fn test_module_error_is_wrapped() {
  let (app, _) = common::application();
  app.import(Module::new(settings_module)).unwrap();

  let failing = |_: Arc<Settings>| -> Result<Configuration<Handler>, BoxError> {
    Err("vault is sealed".into())
  };
  let err = app.import(Module::new(failing).named("secrets")).unwrap_err();
  match err {
    Error::Module { module, source } => {
      assert_eq!(module, "secrets");
      assert_eq!(source.to_string(), "vault is sealed");
    }
    other => panic!("expected a module failure, got {other:?}"),
  }

  // Beans from earlier modules are still there.
  assert!(app.get_bean_by_type::<Settings>().is_ok());
}

#[test]
fn test_unsatisfiable_module_fails_run() {
  let (app, log) = common::application();
  app.import(Module::new(redis_module).named("redis")).unwrap();

  let err = app.run("0.0.0.0:3000").unwrap_err();
  match err {
    Error::UnsatisfiedDependency { bean, dependency } => {
      assert_eq!(bean, "redis");
      assert!(dependency.contains("Settings"));
    }
    other => panic!("expected an unsatisfied module, got {other:?}"),
  }
  assert!(log.lock().served_on.is_empty());
}

#[test]
fn test_module_output_conflicts_abort_the_call() {
  let (app, _) = common::application();
  app
    .register_bean(Bean::value(Settings {
      redis_url: "redis://explicit".to_string(),
      pool_size: 1,
    }))
    .unwrap();

  let err = app.import(Module::new(settings_module)).unwrap_err();
  assert!(matches!(err, Error::DuplicateUnnamedBean { .. }));
  assert_eq!(bean!(app, Settings).redis_url, "redis://explicit");
}

#[test]
fn test_module_output_is_registered_all_or_nothing() {
  let (app, _) = common::application();
  app.import(Module::new(settings_module)).unwrap();

  let overlapping = || -> Result<Configuration<Handler>, BoxError> {
    Ok(
      Configuration::new()
        .bean(Bean::value(RedisClient {
          url: "redis://replica:6379".to_string(),
        }))
        .bean(Bean::value(Settings {
          redis_url: "redis://other".to_string(),
          pool_size: 8,
        })),
    )
  };
  let err = app.import(Module::new(overlapping)).unwrap_err();
  assert!(matches!(err, Error::DuplicateUnnamedBean { .. }));

  // The client listed before the conflict was not registered either.
  assert!(app.get_bean_by_type::<RedisClient>().is_err());
  app.import(Module::new(redis_module)).unwrap();
  assert_eq!(bean!(app, RedisClient).url, "redis://cache:6379");
}
