use crate::controller::Method;

/// The HTTP server an application installs its routes on.
///
/// The container never looks inside handlers or paths; it hands each staged route to
/// `register_route` once and then calls `listen_and_serve`, which is expected to block
/// until the server stops.
pub trait HttpEngine {
  type Handler: Send + 'static;
  type Error: std::error::Error + Send + Sync + 'static;

  fn register_route(&mut self, method: Method, path: &str, handler: Self::Handler);

  fn listen_and_serve(self, address: &str) -> Result<(), Self::Error>;
}
