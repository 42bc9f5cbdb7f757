use crate::controller::Method;
use crate::engine::HttpEngine;
use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use axum::routing::{on, MethodFilter};
use axum::Router;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

/// A request handler for [`AxumEngine`].
pub type AxumHandler =
  Arc<dyn Fn(Request) -> Pin<Box<dyn Future<Output = Response> + Send>> + Send + Sync>;

/// Wraps an async function into an [`AxumHandler`].
pub fn axum_handler<F, Fut, R>(handler: F) -> AxumHandler
where
  F: Fn(Request) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = R> + Send + 'static,
  R: IntoResponse,
{
  Arc::new(move |request| {
    let response = handler(request);
    Box::pin(async move { response.await.into_response() })
  })
}

/// An [`HttpEngine`] backed by an `axum::Router`, served on its own tokio runtime.
#[derive(Default)]
pub struct AxumEngine {
  router: Router,
}

impl AxumEngine {
  pub fn new() -> Self {
    Self::default()
  }

  /// Starts from an existing router, for routes and layers managed outside the container.
  pub fn with_router(router: Router) -> Self {
    Self { router }
  }
}

fn method_filter(method: Method) -> MethodFilter {
  match method {
    Method::Get => MethodFilter::GET,
    Method::Post => MethodFilter::POST,
    Method::Put => MethodFilter::PUT,
    Method::Delete => MethodFilter::DELETE,
    Method::Patch => MethodFilter::PATCH,
    Method::Head => MethodFilter::HEAD,
    Method::Options => MethodFilter::OPTIONS,
  }
}

impl HttpEngine for AxumEngine {
  type Handler = AxumHandler;
  type Error = std::io::Error;

  fn register_route(&mut self, method: Method, path: &str, handler: AxumHandler) {
    debug!(%method, path, "Installing axum route");
    let router = std::mem::take(&mut self.router);
    self.router = router.route(path, on(method_filter(method), move |request: Request| handler(request)));
  }

  fn listen_and_serve(self, address: &str) -> Result<(), std::io::Error> {
    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(async move {
      let listener = tokio::net::TcpListener::bind(address).await?;
      axum::serve(listener, self.router).await
    })
  }
}
