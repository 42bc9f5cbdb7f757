use crate::application::AppState;
use crate::controller::Method;
use thiserror::Error;

/// A type-erased error returned by user code: factories, lifecycle hooks, modules.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The main error type for the `arbor_ioc` crate.
#[derive(Debug, Error)]
pub enum Error {
  #[error("An unnamed bean of type `{type_name}` is already registered")]
  DuplicateUnnamedBean { type_name: &'static str },

  #[error("A bean named '{name}' is already registered")]
  DuplicateBeanName { name: String },

  #[error("No bean matches {dependency}")]
  NoSuchBean { dependency: String },

  #[error("{dependency} is ambiguous, candidates: {}", .candidates.join(", "))]
  AmbiguousBean {
    dependency: String,
    candidates: Vec<String>,
  },

  #[error("Bean '{name}' is a `{actual}` and cannot be injected as `{expected}`")]
  BeanTypeMismatch {
    name: String,
    expected: &'static str,
    actual: &'static str,
  },

  #[error("Circular dependency detected: {}", .chain.join(" -> "))]
  CyclicDependency { chain: Vec<String> },

  #[error("'{bean}' has an unsatisfied dependency on {dependency}")]
  UnsatisfiedDependency { bean: String, dependency: String },

  #[error("'{bean}' requested {dependency} without declaring it")]
  UndeclaredDependency { bean: String, dependency: String },

  #[error("Controller '{controller}' declares an invalid mapping {method} {path:?}: {reason}")]
  InvalidMappingSignature {
    controller: String,
    method: Method,
    path: String,
    reason: &'static str,
  },

  #[error("Route {method} {path} is already mapped")]
  DuplicateRoute { method: Method, path: String },

  #[error("Cannot {operation} while the application is {state}")]
  InvalidState {
    operation: &'static str,
    state: AppState,
  },

  #[error("Failed to create bean '{bean}': {source}")]
  BeanCreation { bean: String, source: BoxError },

  #[error("Post-construct hook of '{bean}' failed: {source}")]
  LifecycleHook { bean: String, source: BoxError },

  #[error("Configuration module '{module}' failed: {source}")]
  Module { module: String, source: BoxError },

  #[error("HTTP engine failed: {0}")]
  Engine(#[source] BoxError),
}

impl Error {
  pub(crate) fn invalid_state(operation: &'static str, state: AppState) -> Self {
    Self::InvalidState { operation, state }
  }

  /// A copy of a route rejection. Other errors carry boxed sources and are not copied.
  pub(crate) fn route_rejection(&self) -> Option<Self> {
    match self {
      Error::InvalidMappingSignature {
        controller,
        method,
        path,
        reason,
      } => Some(Error::InvalidMappingSignature {
        controller: controller.clone(),
        method: *method,
        path: path.clone(),
        reason: *reason,
      }),
      Error::DuplicateRoute { method, path } => Some(Error::DuplicateRoute {
        method: *method,
        path: path.clone(),
      }),
      _ => None,
    }
  }
}

/// A specialized `Result` type for `arbor_ioc` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
