//! Controllers and the routes they declare.

use crate::bean::{Bean, BeanDescriptor, Component, SharedAny};
use crate::error::{Error, Result};
use crate::engine::HttpEngine;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// The HTTP verbs a mapping may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
  Get,
  Post,
  Put,
  Delete,
  Patch,
  Head,
  Options,
}

impl Method {
  pub fn as_str(&self) -> &'static str {
    match self {
      Method::Get => "GET",
      Method::Post => "POST",
      Method::Put => "PUT",
      Method::Delete => "DELETE",
      Method::Patch => "PATCH",
      Method::Head => "HEAD",
      Method::Options => "OPTIONS",
    }
  }
}

impl fmt::Display for Method {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One route declared by a controller: a verb, a path and the handler serving it.
///
/// The path is handed to the engine as written.
pub struct Mapping<H> {
  method: Method,
  path: String,
  handler: H,
}

impl<H> Mapping<H> {
  pub fn new(method: Method, path: impl Into<String>, handler: H) -> Self {
    Self {
      method,
      path: path.into(),
      handler,
    }
  }

  pub fn get(path: impl Into<String>, handler: H) -> Self {
    Self::new(Method::Get, path, handler)
  }

  pub fn post(path: impl Into<String>, handler: H) -> Self {
    Self::new(Method::Post, path, handler)
  }

  pub fn put(path: impl Into<String>, handler: H) -> Self {
    Self::new(Method::Put, path, handler)
  }

  pub fn delete(path: impl Into<String>, handler: H) -> Self {
    Self::new(Method::Delete, path, handler)
  }

  pub fn patch(path: impl Into<String>, handler: H) -> Self {
    Self::new(Method::Patch, path, handler)
  }

  pub fn head(path: impl Into<String>, handler: H) -> Self {
    Self::new(Method::Head, path, handler)
  }

  pub fn options(path: impl Into<String>, handler: H) -> Self {
    Self::new(Method::Options, path, handler)
  }

  pub fn method(&self) -> Method {
    self.method
  }

  pub fn path(&self) -> &str {
    &self.path
  }

  pub fn handler(&self) -> &H {
    &self.handler
  }
}

impl<H> fmt::Debug for Mapping<H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Mapping")
      .field("method", &self.method)
      .field("path", &self.path)
      .finish_non_exhaustive()
  }
}

/// A component that serves requests.
///
/// `mappings` is called exactly once, when the controller becomes ready. Handlers usually
/// capture the `Arc<Self>` they are given.
///
/// ```
/// use arbor_ioc::{Component, Controller, Mapping};
/// use std::sync::Arc;
///
/// type Handler = Box<dyn Fn() -> String + Send + Sync>;
///
/// struct Hello {
///   greeting: String,
/// }
///
/// impl Component for Hello {}
///
/// impl Controller<Handler> for Hello {
///   fn mappings(self: Arc<Self>) -> Vec<Mapping<Handler>> {
///     let hello: Handler = Box::new(move || self.greeting.clone());
///     vec![Mapping::get("/hello", hello)]
///   }
/// }
/// ```
pub trait Controller<H>: Component {
  fn mappings(self: Arc<Self>) -> Vec<Mapping<H>>;
}

pub(crate) type Mapper<H> = Box<dyn FnOnce(SharedAny) -> Option<Vec<Mapping<H>>> + Send>;

/// A controller bean plus the means to collect its mappings once it is ready.
pub struct ControllerDescriptor<H> {
  pub(crate) bean: BeanDescriptor,
  pub(crate) mapper: Mapper<H>,
}

impl<H> ControllerDescriptor<H> {
  pub fn bean(&self) -> &BeanDescriptor {
    &self.bean
  }
}

impl<H> fmt::Debug for ControllerDescriptor<H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ControllerDescriptor")
      .field("bean", &self.bean)
      .finish_non_exhaustive()
  }
}

impl<H: 'static, C: Controller<H>> From<Bean<C>> for ControllerDescriptor<H> {
  fn from(bean: Bean<C>) -> Self {
    let mapper: Mapper<H> = Box::new(|instance: SharedAny| {
      instance
        .downcast::<C>()
        .ok()
        .map(<C as Controller<H>>::mappings)
    });
    Self {
      bean: bean.into(),
      mapper,
    }
  }
}

/// An installed or staged route, without its handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
  pub method: Method,
  pub path: String,
  /// The bean that declared the route.
  pub controller: String,
}

struct StagedRoute<H> {
  route: Route,
  handler: Option<H>,
}

/// Every route of one application, in staging order.
pub(crate) struct RouteTable<H> {
  routes: Vec<StagedRoute<H>>,
}

impl<H> RouteTable<H> {
  pub(crate) fn new() -> Self {
    Self { routes: Vec::new() }
  }

  /// Validates and stages all mappings of one controller. Nothing is staged on error.
  pub(crate) fn stage(&mut self, controller: &str, mappings: Vec<Mapping<H>>) -> Result<()> {
    let mut claimed: HashSet<(Method, &str)> = self
      .routes
      .iter()
      .map(|staged| (staged.route.method, staged.route.path.as_str()))
      .collect();

    for mapping in &mappings {
      let reason = if mapping.path.is_empty() {
        Some("path is empty")
      } else if !mapping.path.starts_with('/') {
        Some("path must start with '/'")
      } else {
        None
      };
      if let Some(reason) = reason {
        return Err(Error::InvalidMappingSignature {
          controller: controller.to_owned(),
          method: mapping.method,
          path: mapping.path.clone(),
          reason,
        });
      }
      if !claimed.insert((mapping.method, mapping.path.as_str())) {
        return Err(Error::DuplicateRoute {
          method: mapping.method,
          path: mapping.path.clone(),
        });
      }
    }
    drop(claimed);

    for mapping in mappings {
      debug!(controller, method = %mapping.method, path = %mapping.path, "Mapped route");
      self.routes.push(StagedRoute {
        route: Route {
          method: mapping.method,
          path: mapping.path,
          controller: controller.to_owned(),
        },
        handler: Some(mapping.handler),
      });
    }
    Ok(())
  }

  pub(crate) fn routes(&self) -> Vec<Route> {
    self.routes.iter().map(|staged| staged.route.clone()).collect()
  }

  /// Hands every staged handler to the engine. Each handler is installed at most once.
  pub(crate) fn install<E: HttpEngine<Handler = H>>(&mut self, engine: &mut E) -> usize {
    let mut installed = 0;
    for staged in &mut self.routes {
      if let Some(handler) = staged.handler.take() {
        engine.register_route(staged.route.method, &staged.route.path, handler);
        installed += 1;
      }
    }
    installed
  }
}
