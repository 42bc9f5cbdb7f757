//! Core data structures shared by the registry, the resolver and user components:
//! type keys, dependency edges and injectable fields.

use crate::error::{Error, Result};
use crate::registry::{Registry, Scope};
use once_cell::sync::OnceCell;
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// Identifies a Rust type for matching. Only the `TypeId` takes part in equality; the
/// name is kept for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeKey {
  id: TypeId,
  name: &'static str,
}

impl TypeKey {
  pub fn of<T: ?Sized + Any>() -> Self {
    Self {
      id: TypeId::of::<T>(),
      name: std::any::type_name::<T>(),
    }
  }

  pub fn id(&self) -> TypeId {
    self.id
  }

  pub fn name(&self) -> &'static str {
    self.name
  }
}

impl PartialEq for TypeKey {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.id.hash(state);
  }
}

impl fmt::Debug for TypeKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "TypeKey({})", self.name)
  }
}

/// How a dependency edge picks its target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Qualifier {
  /// The unique bean assignable to the requested type.
  ByType,
  /// The bean registered under this exact name, which must be assignable to the requested type.
  ByName(String),
}

/// A declared dependency: the type the dependent wants and how to find it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
  type_key: TypeKey,
  qualifier: Qualifier,
}

impl Dependency {
  pub fn by_type<T: ?Sized + Any + Send + Sync>() -> Self {
    Self {
      type_key: TypeKey::of::<T>(),
      qualifier: Qualifier::ByType,
    }
  }

  pub fn by_name<T: ?Sized + Any + Send + Sync>(name: impl Into<String>) -> Self {
    Self {
      type_key: TypeKey::of::<T>(),
      qualifier: Qualifier::ByName(name.into()),
    }
  }

  pub fn type_key(&self) -> TypeKey {
    self.type_key
  }

  pub fn qualifier(&self) -> &Qualifier {
    &self.qualifier
  }
}

impl fmt::Debug for Dependency {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.qualifier {
      Qualifier::ByType => write!(f, "Dependency({})", self.type_key.name),
      Qualifier::ByName(name) => write!(f, "Dependency({}, Name({}))", self.type_key.name, name),
    }
  }
}

impl fmt::Display for Dependency {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.qualifier {
      Qualifier::ByType => write!(f, "`{}`", self.type_key.name),
      Qualifier::ByName(name) => write!(f, "`{}` named '{}'", self.type_key.name, name),
    }
  }
}

/// Read access to ready beans, handed to factories, injection points and modules.
///
/// An injector only hands out what its owner declared, so every lookup it serves is an
/// edge the resolver has already ordered.
pub struct Injector<'a> {
  registry: &'a Registry,
  owner: &'a str,
  declared: &'a [Dependency],
}

impl<'a> Injector<'a> {
  pub(crate) fn new(registry: &'a Registry, owner: &'a str, declared: &'a [Dependency]) -> Self {
    Self {
      registry,
      owner,
      declared,
    }
  }

  /// Resolves a declared dependency to the live instance.
  pub fn resolve<T: ?Sized + Any + Send + Sync>(&self, dependency: &Dependency) -> Result<Arc<T>> {
    if !self.declared.contains(dependency) {
      return Err(Error::UndeclaredDependency {
        bean: self.owner.to_owned(),
        dependency: dependency.to_string(),
      });
    }
    let id = self.registry.find(dependency, Scope::Ready)?;
    self.registry.instance::<T>(id, dependency)
  }

  /// Resolves the unique bean assignable to `T`.
  pub fn get<T: ?Sized + Any + Send + Sync>(&self) -> Result<Arc<T>> {
    self.resolve(&Dependency::by_type::<T>())
  }

  /// Resolves the bean registered under `name`.
  pub fn get_named<T: ?Sized + Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
    self.resolve(&Dependency::by_name::<T>(name))
  }
}

/// A field that receives a dependency during wiring.
pub trait InjectionPoint: Send + Sync {
  fn dependency(&self) -> &Dependency;

  fn inject(&self, injector: &Injector<'_>) -> Result<()>;
}

/// An injectable field. Empty until the container wires the owning bean, frozen afterwards.
///
/// ```
/// use arbor_ioc::{Component, Inject, InjectionPoint};
///
/// struct Clock;
///
/// struct Scheduler {
///   clock: Inject<Clock>,
///   backup: Inject<Clock>,
/// }
///
/// impl Component for Scheduler {
///   fn injection_points(&self) -> Vec<&dyn InjectionPoint> {
///     vec![&self.clock, &self.backup]
///   }
/// }
///
/// let scheduler = Scheduler {
///   clock: Inject::by_type(),
///   backup: Inject::by_name("backup_clock"),
/// };
/// assert!(!scheduler.clock.is_injected());
/// ```
pub struct Inject<T: ?Sized> {
  dependency: Dependency,
  cell: OnceCell<Arc<T>>,
}

impl<T: ?Sized + Any + Send + Sync> Inject<T> {
  pub fn by_type() -> Self {
    Self {
      dependency: Dependency::by_type::<T>(),
      cell: OnceCell::new(),
    }
  }

  pub fn by_name(name: impl Into<String>) -> Self {
    Self {
      dependency: Dependency::by_name::<T>(name),
      cell: OnceCell::new(),
    }
  }

  pub fn get(&self) -> Option<&Arc<T>> {
    self.cell.get()
  }

  pub fn is_injected(&self) -> bool {
    self.cell.get().is_some()
  }
}

impl<T: ?Sized + Any + Send + Sync> Default for Inject<T> {
  fn default() -> Self {
    Self::by_type()
  }
}

impl<T: ?Sized + Any + Send + Sync> Deref for Inject<T> {
  type Target = T;

  /// # Panics
  ///
  /// Panics when the owning bean has not been wired yet.
  fn deref(&self) -> &T {
    match self.cell.get() {
      Some(value) => value,
      None => panic!("Dependency {} has not been injected yet", self.dependency),
    }
  }
}

impl<T: ?Sized + Any + Send + Sync> InjectionPoint for Inject<T> {
  fn dependency(&self) -> &Dependency {
    &self.dependency
  }

  fn inject(&self, injector: &Injector<'_>) -> Result<()> {
    let value = injector.resolve::<T>(&self.dependency)?;
    // A point is only ever wired once; a second wiring of the same instance is a no-op.
    let _ = self.cell.set(value);
    Ok(())
  }
}

impl<T: ?Sized> fmt::Debug for Inject<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Inject")
      .field("dependency", &self.dependency)
      .field("injected", &self.cell.get().is_some())
      .finish()
  }
}
