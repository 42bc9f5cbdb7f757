//! Bean definitions: the typed `Bean<T>` builder and the type-erased `BeanDescriptor`
//! the registry stores.

use crate::core::{Dependency, Injector, InjectionPoint, TypeKey};
use crate::error::{BoxError, Error, Result};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A managed component.
///
/// Both methods have no-op defaults, so `impl Component for MyType {}` is enough for a
/// component with no injected fields and no post-construct hook.
pub trait Component: Any + Send + Sync {
  /// The fields the container must populate before the component becomes ready.
  fn injection_points(&self) -> Vec<&dyn InjectionPoint> {
    Vec::new()
  }

  /// Runs once, after all injection points are populated and before the component
  /// becomes visible to lookups.
  fn post_construct(&self) -> Result<(), BoxError> {
    Ok(())
  }
}

pub(crate) type SharedAny = Arc<dyn Any + Send + Sync>;

/// A typed view of a ready bean: a boxed `Arc<V>` for some concrete or exposed type `V`.
pub(crate) type View = Box<dyn Any + Send + Sync>;

type Caster<T> = Box<dyn Fn(&Arc<T>) -> View + Send>;
pub(crate) type Hook = Box<dyn FnOnce() -> Result<(), BoxError> + Send>;
pub(crate) type Assembler = Box<dyn FnOnce(&Injector<'_>) -> Result<Assembled> + Send>;

/// The product of wiring one bean, before its hook has run.
pub(crate) struct Assembled {
  pub(crate) instance: SharedAny,
  pub(crate) views: Vec<(TypeId, View)>,
  pub(crate) post_construct: Option<Hook>,
}

type WireFn<T> = fn(&T, &Injector<'_>) -> Result<()>;
type HookFn<T> = fn(&T) -> Result<(), BoxError>;

enum Construction<T> {
  Value(T),
  Component {
    value: T,
    wire: WireFn<T>,
    hook: HookFn<T>,
  },
  Factory {
    factory: Box<dyn FnOnce(&Injector<'_>) -> Result<T, BoxError> + Send>,
    hook: HookFn<T>,
  },
}

fn boxed_assembler<F>(assemble: F) -> Assembler
where
  F: FnOnce(&Injector<'_>) -> Result<Assembled> + Send + 'static,
{
  Box::new(assemble)
}

fn wire_component<T: Component>(component: &T, injector: &Injector<'_>) -> Result<()> {
  for point in component.injection_points() {
    point.inject(injector)?;
  }
  Ok(())
}

fn run_hook<T: Component>(component: &T) -> Result<(), BoxError> {
  component.post_construct()
}

/// Typed builder for a bean registration.
///
/// ```
/// use arbor_ioc::{Bean, BeanDescriptor};
///
/// let descriptor: BeanDescriptor = Bean::value(String::from("postgres://localhost"))
///   .named("database_url")
///   .into();
/// assert_eq!(descriptor.name(), Some("database_url"));
/// ```
pub struct Bean<T: Any + Send + Sync> {
  name: Option<String>,
  construction: Construction<T>,
  dependencies: Vec<Dependency>,
  exposed: Vec<(TypeKey, Caster<T>)>,
}

impl<T: Any + Send + Sync> Bean<T> {
  fn with_construction(construction: Construction<T>) -> Self {
    Self {
      name: None,
      construction,
      dependencies: Vec::new(),
      exposed: Vec::new(),
    }
  }

  /// An already-built value with no dependencies and no hook. Works for any type,
  /// including foreign ones such as `String`.
  pub fn value(value: T) -> Self {
    Self::with_construction(Construction::Value(value))
  }

  /// Registers this bean under `name`.
  pub fn named(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  /// Makes the bean assignable to `I`, usually a trait object type.
  ///
  /// ```
  /// use arbor_ioc::{Bean, BeanDescriptor};
  /// use std::sync::Arc;
  ///
  /// trait Greeter: Send + Sync {
  ///   fn greet(&self) -> String;
  /// }
  ///
  /// struct English;
  ///
  /// impl Greeter for English {
  ///   fn greet(&self) -> String {
  ///     "Hello!".into()
  ///   }
  /// }
  ///
  /// let descriptor: BeanDescriptor = Bean::value(English)
  ///   .exposes::<dyn Greeter>(|english| english)
  ///   .into();
  /// assert!(descriptor.is_assignable_to::<dyn Greeter>());
  /// ```
  pub fn exposes<I: ?Sized + Any + Send + Sync>(
    mut self,
    cast: impl Fn(Arc<T>) -> Arc<I> + Send + 'static,
  ) -> Self {
    let key = TypeKey::of::<I>();
    if key == TypeKey::of::<T>() || self.exposed.iter().any(|(k, _)| *k == key) {
      return self;
    }
    let caster: Caster<T> = Box::new(move |instance: &Arc<T>| -> View { Box::new(cast(instance.clone())) });
    self.exposed.push((key, caster));
    self
  }
}

impl<T: Component> Bean<T> {
  /// An already-built component whose injection points are wired and whose
  /// `post_construct` hook runs when it is resolved.
  pub fn component(component: T) -> Self {
    let mut dependencies: Vec<Dependency> = Vec::new();
    for point in component.injection_points() {
      if !dependencies.contains(point.dependency()) {
        dependencies.push(point.dependency().clone());
      }
    }
    let mut bean = Self::with_construction(Construction::Component {
      value: component,
      wire: wire_component::<T>,
      hook: run_hook::<T>,
    });
    bean.dependencies = dependencies;
    bean
  }

  /// A component produced by `factory` once its declared dependencies are ready.
  ///
  /// Factory dependencies are declared with [`Bean::depends_on`] and
  /// [`Bean::depends_on_named`]; the injection points of the produced component are not
  /// consulted. The `post_construct` hook runs as for any component.
  pub fn factory<F>(factory: F) -> Self
  where
    F: FnOnce(&Injector<'_>) -> Result<T, BoxError> + Send + 'static,
  {
    Self::with_construction(Construction::Factory {
      factory: Box::new(factory),
      hook: run_hook::<T>,
    })
  }

  /// Declares a by-type dependency of a factory bean.
  pub fn depends_on<D: ?Sized + Any + Send + Sync>(mut self) -> Self {
    self.declare(Dependency::by_type::<D>());
    self
  }

  /// Declares a by-name dependency of a factory bean.
  pub fn depends_on_named<D: ?Sized + Any + Send + Sync>(mut self, name: impl Into<String>) -> Self {
    self.declare(Dependency::by_name::<D>(name));
    self
  }

  fn declare(&mut self, dependency: Dependency) {
    if !self.dependencies.contains(&dependency) {
      self.dependencies.push(dependency);
    }
  }
}

/// A type-erased bean registration, ready to be handed to the registry.
pub struct BeanDescriptor {
  pub(crate) name: Option<String>,
  pub(crate) type_key: TypeKey,
  pub(crate) provides: Vec<TypeKey>,
  pub(crate) dependencies: Vec<Dependency>,
  pub(crate) assembler: Assembler,
}

impl BeanDescriptor {
  pub fn name(&self) -> Option<&str> {
    self.name.as_deref()
  }

  pub fn type_name(&self) -> &'static str {
    self.type_key.name()
  }

  pub fn dependencies(&self) -> &[Dependency] {
    &self.dependencies
  }

  pub fn is_assignable_to<I: ?Sized + Any>(&self) -> bool {
    let key = TypeKey::of::<I>();
    self.provides.contains(&key)
  }

  /// The display label used in logs and errors: the name, or the type name.
  pub(crate) fn label(&self) -> String {
    match &self.name {
      Some(name) => name.clone(),
      None => self.type_key.name().to_owned(),
    }
  }
}

impl fmt::Debug for BeanDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BeanDescriptor")
      .field("name", &self.name)
      .field("type", &self.type_key)
      .field("provides", &self.provides)
      .field("dependencies", &self.dependencies)
      .finish()
  }
}

impl<T: Any + Send + Sync> From<Bean<T>> for BeanDescriptor {
  fn from(bean: Bean<T>) -> Self {
    let type_key = TypeKey::of::<T>();
    let label = match &bean.name {
      Some(name) => name.clone(),
      None => type_key.name().to_owned(),
    };
    let mut provides = vec![type_key];
    provides.extend(bean.exposed.iter().map(|(key, _)| *key));

    let Bean {
      name,
      construction,
      dependencies,
      exposed,
    } = bean;

    let assembler = boxed_assembler(move |injector| {
      let (instance, hook): (Arc<T>, Option<HookFn<T>>) = match construction {
        Construction::Value(value) => (Arc::new(value), None),
        Construction::Component { value, wire, hook } => {
          wire(&value, injector)?;
          (Arc::new(value), Some(hook))
        }
        Construction::Factory { factory, hook } => {
          let value = factory(injector).map_err(|source| Error::BeanCreation {
            bean: label.clone(),
            source,
          })?;
          (Arc::new(value), Some(hook))
        }
      };

      let mut views: Vec<(TypeId, View)> = Vec::with_capacity(exposed.len() + 1);
      let concrete: View = Box::new(instance.clone());
      views.push((TypeId::of::<T>(), concrete));
      for (key, cast) in &exposed {
        views.push((key.id(), cast(&instance)));
      }

      let post_construct = hook.map(|hook| {
        let target = instance.clone();
        Box::new(move || hook(&target)) as Hook
      });

      Ok(Assembled {
        instance,
        views,
        post_construct,
      })
    });

    Self {
      name,
      type_key,
      provides,
      dependencies,
      assembler,
    }
  }
}
