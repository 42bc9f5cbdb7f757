#![allow(dead_code)]

use arbor_ioc::{Application, HttpEngine, Method};
use parking_lot::Mutex;
use std::sync::Arc;

pub type Handler = Box<dyn Fn(&str) -> String + Send + Sync>;

/// What a `RecordingEngine` was asked to do.
#[derive(Default)]
pub struct EngineLog {
  pub routes: Vec<(Method, String, Handler)>,
  pub served_on: Vec<String>,
}

impl EngineLog {
  pub fn route_keys(&self) -> Vec<(Method, String)> {
    self
      .routes
      .iter()
      .map(|(method, path, _)| (*method, path.clone()))
      .collect()
  }

  /// Calls the handler installed for `method` and `path`.
  pub fn call(&self, method: Method, path: &str, body: &str) -> Option<String> {
    self
      .routes
      .iter()
      .find(|(m, p, _)| *m == method && p == path)
      .map(|(_, _, handler)| handler(body))
  }
}

/// An engine that records routes and returns from `listen_and_serve` immediately.
pub struct RecordingEngine {
  log: Arc<Mutex<EngineLog>>,
}

impl HttpEngine for RecordingEngine {
  type Handler = Handler;
  type Error = std::io::Error;

  fn register_route(&mut self, method: Method, path: &str, handler: Handler) {
    self.log.lock().routes.push((method, path.to_owned(), handler));
  }

  fn listen_and_serve(self, address: &str) -> Result<(), std::io::Error> {
    self.log.lock().served_on.push(address.to_owned());
    Ok(())
  }
}

/// An engine whose listener always fails.
pub struct FailingEngine;

impl HttpEngine for FailingEngine {
  type Handler = Handler;
  type Error = std::io::Error;

  fn register_route(&mut self, _method: Method, _path: &str, _handler: Handler) {}

  fn listen_and_serve(self, address: &str) -> Result<(), std::io::Error> {
    Err(std::io::Error::new(
      std::io::ErrorKind::AddrInUse,
      format!("{address} is taken"),
    ))
  }
}

pub fn application() -> (Application<RecordingEngine>, Arc<Mutex<EngineLog>>) {
  let log = Arc::new(Mutex::new(EngineLog::default()));
  let engine = RecordingEngine { log: log.clone() };
  (Application::new(engine), log)
}

pub fn handler(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Handler {
  Box::new(f)
}
