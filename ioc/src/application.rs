//! The application facade: the registration API, the run loop and bean lookups.

use crate::bean::BeanDescriptor;
use crate::controller::{ControllerDescriptor, Mapper, Route, RouteTable};
use crate::core::Dependency;
use crate::engine::HttpEngine;
use crate::error::{Error, Result};
use crate::module::Module;
use crate::registry::{BeanId, Registry, Scope};
use crate::resolver;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where an application is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
  /// Nothing has been imported or registered yet.
  New,
  /// Beans, modules and controllers are being added.
  Configuring,
  /// The engine is serving.
  Running,
  /// The engine returned.
  Stopped,
}

impl fmt::Display for AppState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      AppState::New => "new",
      AppState::Configuring => "configuring",
      AppState::Running => "running",
      AppState::Stopped => "stopped",
    };
    f.write_str(name)
  }
}

struct ControllerSlot<H> {
  id: BeanId,
  label: String,
  /// Taken when the controller is mapped.
  mapper: Option<Mapper<H>>,
  /// Why the controller's mappings were refused. The bean is failed and `run` refuses to
  /// serve until a replacement with the same label is registered.
  rejection: Option<Error>,
}

impl<H> ControllerSlot<H> {
  /// Whether a controller registered under `label` may take this slot's place.
  fn replaceable_by(&self, label: &str, registry: &Registry) -> bool {
    self.label == label && (self.rejection.is_some() || registry.is_failed(self.id))
  }
}

struct Inner<E: HttpEngine> {
  state: AppState,
  registry: Registry,
  modules: Vec<Module<E::Handler>>,
  controllers: Vec<ControllerSlot<E::Handler>>,
  routes: RouteTable<E::Handler>,
  /// Cycles already reported to a caller, by their sorted members.
  reported_cycles: HashSet<Vec<BeanId>>,
  engine: Option<E>,
}

impl<E: HttpEngine> Inner<E> {
  fn begin(&mut self, operation: &'static str) -> Result<()> {
    match self.state {
      AppState::New | AppState::Configuring => {
        self.state = AppState::Configuring;
        Ok(())
      }
      state => Err(Error::invalid_state(operation, state)),
    }
  }

  fn add_controller(&mut self, controller: ControllerDescriptor<E::Handler>) -> Result<()> {
    let ControllerDescriptor { bean, mapper } = controller;
    let label = bean.label();
    let id = self.registry.register(bean)?;
    let registry = &self.registry;
    self.controllers.retain(|slot| !slot.replaceable_by(&label, registry));
    self.controllers.push(ControllerSlot {
      id,
      label,
      mapper: Some(mapper),
      rejection: None,
    });
    Ok(())
  }

  /// Alternates resolution passes and module runs until neither makes progress.
  ///
  /// A cycle fails only the call during which it first appears; its beans stay pending
  /// while the rest of the graph keeps resolving.
  fn drive(&mut self) -> Result<()> {
    loop {
      let pass = resolver::run_pass(&mut self.registry);
      // Controllers that became ready before a failure are still mapped.
      self.map_controllers()?;
      let pass = pass?;

      let mut closed = None;
      for cycle in &pass.cycles {
        if self.reported_cycles.insert(cycle.members.clone()) && closed.is_none() {
          closed = Some(cycle.to_error());
        }
      }
      if let Some(error) = closed {
        return Err(error);
      }

      let ran = self.run_modules()?;
      if pass.promoted == 0 && ran == 0 {
        return Ok(());
      }
    }
  }

  fn map_controllers(&mut self) -> Result<()> {
    for slot in &mut self.controllers {
      if slot.mapper.is_none() || !self.registry.is_ready(slot.id) {
        continue;
      }
      let (Some(mapper), Some(instance)) = (slot.mapper.take(), self.registry.ready_instance(slot.id)) else {
        continue;
      };
      let mappings = mapper(instance).ok_or_else(|| Error::NoSuchBean {
        dependency: format!("controller '{}'", slot.label),
      })?;
      if let Err(error) = self.routes.stage(&slot.label, mappings) {
        warn!(controller = %slot.label, %error, "Controller mappings were rejected");
        self.registry.fail(slot.id);
        slot.rejection = error.route_rejection();
        return Err(error);
      }
    }
    Ok(())
  }

  /// Runs every queued module whose parameters are ready. Returns how many ran.
  fn run_modules(&mut self) -> Result<usize> {
    let mut ran = 0;
    let mut index = 0;
    while index < self.modules.len() {
      if !module_ready(&self.registry, self.modules[index].dependencies())? {
        index += 1;
        continue;
      }
      let module = self.modules.remove(index);
      let name = module.name().to_owned();
      let configuration = module.run(&self.registry).map_err(|error| {
        warn!(module = %name, %error, "Configuration module failed");
        error
      })?;
      let (beans, controllers) = configuration.into_parts();
      self.registry.check_available(
        beans
          .iter()
          .chain(controllers.iter().map(|controller| &controller.bean)),
      )?;
      debug!(
        module = %name,
        beans = beans.len(),
        controllers = controllers.len(),
        "Configuration module ran"
      );
      for bean in beans {
        self.registry.register(bean)?;
      }
      for controller in controllers {
        self.add_controller(controller)?;
      }
      ran += 1;
    }
    Ok(ran)
  }

  /// Final checks before serving: nothing may remain pending or queued, and every
  /// controller must have contributed its routes.
  fn ensure_complete(&self) -> Result<()> {
    resolver::ensure_satisfied(&self.registry)?;
    for slot in &self.controllers {
      if let Some(rejection) = slot.rejection.as_ref().and_then(Error::route_rejection) {
        return Err(rejection);
      }
      if slot.mapper.is_some() {
        return Err(Error::NoSuchBean {
          dependency: format!("controller '{}'", slot.label),
        });
      }
    }
    if let Some(module) = self.modules.first() {
      for dependency in module.dependencies() {
        if let Err(Error::NoSuchBean { .. }) = self.registry.find(dependency, Scope::Ready) {
          return Err(Error::UnsatisfiedDependency {
            bean: module.name().to_owned(),
            dependency: dependency.to_string(),
          });
        }
      }
    }
    Ok(())
  }

  fn lookup<T: ?Sized + Any + Send + Sync>(&self, dependency: &Dependency) -> Result<Arc<T>> {
    if self.state == AppState::New {
      return Err(Error::invalid_state("look up beans", self.state));
    }
    let id = self.registry.find(dependency, Scope::Ready)?;
    self.registry.instance::<T>(id, dependency)
  }
}

fn module_ready(registry: &Registry, dependencies: &[Dependency]) -> Result<bool> {
  for dependency in dependencies {
    match registry.find(dependency, Scope::Ready) {
      Ok(_) => {}
      Err(Error::NoSuchBean { .. }) => return Ok(false),
      Err(error) => return Err(error),
    }
  }
  Ok(true)
}

/// An IoC application bound to one HTTP engine.
///
/// Every registration call resolves as much of the bean graph as it can before returning,
/// so beans become ready as soon as their dependencies are. `run` performs the final checks,
/// installs the collected routes and blocks while the engine serves.
///
/// Factories, hooks and modules run while the application is locked and must not call back
/// into the application.
pub struct Application<E: HttpEngine> {
  inner: Mutex<Inner<E>>,
}

impl<E: HttpEngine> Application<E> {
  pub fn new(engine: E) -> Self {
    Self {
      inner: Mutex::new(Inner {
        state: AppState::New,
        registry: Registry::new(),
        modules: Vec::new(),
        controllers: Vec::new(),
        routes: RouteTable::new(),
        reported_cycles: HashSet::new(),
        engine: Some(engine),
      }),
    }
  }

  pub fn state(&self) -> AppState {
    self.inner.lock().state
  }

  /// Queues a module. It runs as soon as its parameters are ready, possibly right away.
  pub fn import(&self, module: Module<E::Handler>) -> Result<()> {
    self.import_all([module])
  }

  pub fn import_all(&self, modules: impl IntoIterator<Item = Module<E::Handler>>) -> Result<()> {
    let mut inner = self.inner.lock();
    inner.begin("import modules")?;
    inner.modules.extend(modules);
    inner.drive()
  }

  pub fn register_bean(&self, bean: impl Into<BeanDescriptor>) -> Result<()> {
    self.register_beans([bean.into()])
  }

  /// Registers beans in order. On a conflict the beans before it stay registered.
  pub fn register_beans(&self, beans: impl IntoIterator<Item = BeanDescriptor>) -> Result<()> {
    let mut inner = self.inner.lock();
    inner.begin("register beans")?;
    for bean in beans {
      inner.registry.register(bean)?;
    }
    inner.drive()
  }

  pub fn register_controller(&self, controller: impl Into<ControllerDescriptor<E::Handler>>) -> Result<()> {
    self.register_controllers([controller.into()])
  }

  pub fn register_controllers(
    &self,
    controllers: impl IntoIterator<Item = ControllerDescriptor<E::Handler>>,
  ) -> Result<()> {
    let mut inner = self.inner.lock();
    inner.begin("register controllers")?;
    for controller in controllers {
      inner.add_controller(controller)?;
    }
    inner.drive()
  }

  /// Finishes resolution, installs the routes and serves on `address` until the engine
  /// returns.
  ///
  /// The application lock is released while serving, so lookups keep working from other
  /// threads.
  pub fn run(&self, address: &str) -> Result<()> {
    let engine = {
      let mut inner = self.inner.lock();
      inner.begin("run")?;
      inner.drive()?;
      inner.ensure_complete()?;
      let Some(mut engine) = inner.engine.take() else {
        return Err(Error::invalid_state("run", inner.state));
      };
      let installed = inner.routes.install(&mut engine);
      inner.state = AppState::Running;
      info!(
        address,
        beans = inner.registry.ready_count(),
        routes = installed,
        "Application is running"
      );
      engine
    };

    let result = engine.listen_and_serve(address);
    self.inner.lock().state = AppState::Stopped;
    info!(address, "Application stopped");
    result.map_err(|error| Error::Engine(Box::new(error)))
  }

  /// The unique ready bean assignable to `T`.
  pub fn get_bean_by_type<T: ?Sized + Any + Send + Sync>(&self) -> Result<Arc<T>> {
    self.inner.lock().lookup(&Dependency::by_type::<T>())
  }

  /// The ready bean named `name`, viewed as `T`.
  pub fn get_bean_by_name<T: ?Sized + Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
    self.inner.lock().lookup(&Dependency::by_name::<T>(name))
  }

  /// # Panics
  ///
  /// Panics when [`Application::get_bean_by_type`] fails.
  pub fn must_get_bean_by_type<T: ?Sized + Any + Send + Sync>(&self) -> Arc<T> {
    match self.get_bean_by_type::<T>() {
      Ok(bean) => bean,
      Err(error) => panic!("Failed to get required bean: {error}"),
    }
  }

  /// # Panics
  ///
  /// Panics when [`Application::get_bean_by_name`] fails.
  pub fn must_get_bean_by_name<T: ?Sized + Any + Send + Sync>(&self, name: &str) -> Arc<T> {
    match self.get_bean_by_name::<T>(name) {
      Ok(bean) => bean,
      Err(error) => panic!("Failed to get required bean '{name}': {error}"),
    }
  }

  /// Every route mapped so far, in the order controllers became ready.
  pub fn routes(&self) -> Vec<Route> {
    self.inner.lock().routes.routes()
  }
}

impl<E: HttpEngine> fmt::Debug for Application<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let inner = self.inner.lock();
    f.debug_struct("Application")
      .field("state", &inner.state)
      .field("queued_modules", &inner.modules.len())
      .field("routes", &inner.routes.routes())
      .finish_non_exhaustive()
  }
}
