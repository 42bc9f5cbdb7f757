//! Configuration modules: functions that contribute beans and controllers once the beans
//! they take as parameters are ready.

use crate::bean::BeanDescriptor;
use crate::controller::ControllerDescriptor;
use crate::core::{Dependency, Injector};
use crate::error::{BoxError, Error, Result};
use crate::registry::Registry;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// What a module contributes.
pub struct Configuration<H> {
  beans: Vec<BeanDescriptor>,
  controllers: Vec<ControllerDescriptor<H>>,
}

impl<H> Configuration<H> {
  pub fn new() -> Self {
    Self {
      beans: Vec::new(),
      controllers: Vec::new(),
    }
  }

  pub fn bean(mut self, bean: impl Into<BeanDescriptor>) -> Self {
    self.beans.push(bean.into());
    self
  }

  pub fn controller(mut self, controller: impl Into<ControllerDescriptor<H>>) -> Self {
    self.controllers.push(controller.into());
    self
  }

  pub fn beans(&self) -> &[BeanDescriptor] {
    &self.beans
  }

  pub fn controllers(&self) -> &[ControllerDescriptor<H>] {
    &self.controllers
  }

  pub(crate) fn into_parts(self) -> (Vec<BeanDescriptor>, Vec<ControllerDescriptor<H>>) {
    (self.beans, self.controllers)
  }
}

impl<H> Default for Configuration<H> {
  fn default() -> Self {
    Self::new()
  }
}

impl<H> fmt::Debug for Configuration<H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Configuration")
      .field("beans", &self.beans)
      .field("controllers", &self.controllers)
      .finish()
  }
}

/// A function usable as a module: zero to six `Arc<T>` parameters, each resolved by type,
/// returning a [`Configuration`].
pub trait ModuleFn<H, Args>: Send + 'static {
  fn dependencies() -> Vec<Dependency>;

  fn call(self, injector: &Injector<'_>) -> Result<Configuration<H>, BoxError>;
}

macro_rules! impl_module_fn {
  ($($param:ident),*) => {
    impl<H, F, $($param,)*> ModuleFn<H, ($(Arc<$param>,)*)> for F
    where
      F: FnOnce($(Arc<$param>),*) -> Result<Configuration<H>, BoxError> + Send + 'static,
      $($param: ?Sized + Any + Send + Sync,)*
    {
      fn dependencies() -> Vec<Dependency> {
        vec![$(Dependency::by_type::<$param>()),*]
      }

      #[allow(non_snake_case, unused_variables)]
      fn call(self, injector: &Injector<'_>) -> Result<Configuration<H>, BoxError> {
        $(let $param = injector.get::<$param>()?;)*
        (self)($($param),*)
      }
    }
  };
}

impl_module_fn!();
impl_module_fn!(A);
impl_module_fn!(A, B);
impl_module_fn!(A, B, C);
impl_module_fn!(A, B, C, D);
impl_module_fn!(A, B, C, D, E);
impl_module_fn!(A, B, C, D, E, G);

type RunFn<H> = Box<dyn FnOnce(&Injector<'_>) -> Result<Configuration<H>, BoxError> + Send>;

/// A configuration function queued on an application.
///
/// ```
/// use arbor_ioc::{BoxError, Configuration, Module, Bean};
/// use std::sync::Arc;
///
/// struct Settings {
///   pool_size: usize,
/// }
///
/// struct Pool {
///   size: usize,
/// }
///
/// fn database(settings: Arc<Settings>) -> Result<Configuration<()>, BoxError> {
///   Ok(Configuration::new().bean(Bean::value(Pool { size: settings.pool_size })))
/// }
///
/// let module = Module::new(database).named("database");
/// assert_eq!(module.name(), "database");
/// assert_eq!(module.dependencies().len(), 1);
/// ```
pub struct Module<H> {
  name: String,
  dependencies: Vec<Dependency>,
  run: RunFn<H>,
}

impl<H: 'static> Module<H> {
  pub fn new<F, Args>(function: F) -> Self
  where
    F: ModuleFn<H, Args>,
    Args: 'static,
  {
    Self {
      name: std::any::type_name::<F>().to_owned(),
      dependencies: F::dependencies(),
      run: Box::new(move |injector: &Injector<'_>| function.call(injector)),
    }
  }
}

impl<H> Module<H> {
  pub fn named(mut self, name: impl Into<String>) -> Self {
    self.name = name.into();
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn dependencies(&self) -> &[Dependency] {
    &self.dependencies
  }

  /// Resolves the parameters from ready beans and calls the function.
  pub(crate) fn run(self, registry: &Registry) -> Result<Configuration<H>> {
    let Module {
      name,
      dependencies,
      run,
    } = self;
    let injector = Injector::new(registry, &name, &dependencies);
    run(&injector).map_err(|source| Error::Module {
      module: name.clone(),
      source,
    })
  }
}

impl<H> fmt::Debug for Module<H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Module")
      .field("name", &self.name)
      .field("dependencies", &self.dependencies)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::bean::Bean;
  use crate::lifecycle;

  struct Settings {
    url: &'static str,
  }

  struct Client {
    url: &'static str,
  }

  fn client(settings: Arc<Settings>) -> Result<Configuration<()>, BoxError> {
    Ok(Configuration::new().bean(Bean::value(Client { url: settings.url })))
  }

  #[test]
  fn parameters_become_dependencies() {
    let module = Module::new(client);
    assert_eq!(module.dependencies(), &[Dependency::by_type::<Settings>()]);
    assert!(module.name().ends_with("client"));
  }

  #[test]
  fn run_injects_ready_beans() {
    let mut registry = Registry::new();
    let id = registry
      .register(Bean::value(Settings { url: "redis://cache" }).into())
      .unwrap();
    lifecycle::instantiate(&mut registry, id).unwrap();

    let configuration = Module::new(client).run(&registry).unwrap();
    assert_eq!(configuration.beans().len(), 1);
    assert!(configuration.beans()[0].is_assignable_to::<Client>());
  }

  #[test]
  fn errors_are_wrapped_with_the_module_name() {
    let registry = Registry::new();
    let failing = || -> Result<Configuration<()>, BoxError> { Err("no credentials".into()) };

    let err = Module::new(failing).named("secrets").run(&registry).unwrap_err();
    assert!(matches!(err, Error::Module { ref module, .. } if module == "secrets"));
  }
}
