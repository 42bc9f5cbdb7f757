//! The bean registry: descriptors and live instances keyed by type and by name.

use crate::bean::{Assembler, BeanDescriptor, SharedAny, View};
use crate::core::{Dependency, Qualifier, TypeKey};
use crate::error::{Error, Result};
use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Index of a bean within its registry. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct BeanId(usize);

/// Which beans a lookup may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
  /// Only beans whose hook has completed.
  Ready,
  /// Ready beans and beans still waiting for their dependencies.
  Registered,
}

struct ReadyBean {
  instance: SharedAny,
  views: Vec<(TypeId, View)>,
}

enum BeanState {
  Pending(Assembler),
  Assembling,
  Ready(ReadyBean),
  Failed,
}

struct BeanEntry {
  name: Option<String>,
  type_key: TypeKey,
  provides: Vec<TypeKey>,
  dependencies: Vec<Dependency>,
  state: BeanState,
}

impl BeanEntry {
  fn visible_in(&self, scope: Scope) -> bool {
    match (&self.state, scope) {
      (BeanState::Ready(_), _) => true,
      (BeanState::Pending(_) | BeanState::Assembling, Scope::Registered) => true,
      _ => false,
    }
  }

  fn label(&self) -> String {
    match &self.name {
      Some(name) => name.clone(),
      None => self.type_key.name().to_owned(),
    }
  }
}

/// Stores every bean of one container. State only grows: beans are added, promoted from
/// pending to ready, or marked failed; nothing is removed.
#[derive(Default)]
pub(crate) struct Registry {
  entries: Vec<BeanEntry>,
  names: HashMap<String, BeanId>,
  unnamed: HashMap<TypeId, BeanId>,
}

impl Registry {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  /// Adds a descriptor in the pending state.
  pub(crate) fn register(&mut self, descriptor: BeanDescriptor) -> Result<BeanId> {
    let BeanDescriptor {
      name,
      type_key,
      provides,
      dependencies,
      assembler,
    } = descriptor;

    match &name {
      Some(name) if self.names.contains_key(name) => {
        return Err(Error::DuplicateBeanName { name: name.clone() });
      }
      None if self.unnamed.contains_key(&type_key.id()) => {
        return Err(Error::DuplicateUnnamedBean {
          type_name: type_key.name(),
        });
      }
      _ => {}
    }

    let id = BeanId(self.entries.len());
    match &name {
      Some(name) => {
        self.names.insert(name.clone(), id);
      }
      None => {
        self.unnamed.insert(type_key.id(), id);
      }
    }
    self.entries.push(BeanEntry {
      name,
      type_key,
      provides,
      dependencies,
      state: BeanState::Pending(assembler),
    });
    Ok(id)
  }

  /// Checks that `descriptors` could all be registered together, without registering any
  /// of them.
  pub(crate) fn check_available<'a>(
    &self,
    descriptors: impl IntoIterator<Item = &'a BeanDescriptor>,
  ) -> Result<()> {
    let mut names = HashSet::new();
    let mut unnamed = HashSet::new();
    for descriptor in descriptors {
      match &descriptor.name {
        Some(name) => {
          if self.names.contains_key(name) || !names.insert(name.as_str()) {
            return Err(Error::DuplicateBeanName { name: name.clone() });
          }
        }
        None => {
          let type_id = descriptor.type_key.id();
          if self.unnamed.contains_key(&type_id) || !unnamed.insert(type_id) {
            return Err(Error::DuplicateUnnamedBean {
              type_name: descriptor.type_key.name(),
            });
          }
        }
      }
    }
    Ok(())
  }

  pub(crate) fn find(&self, dependency: &Dependency, scope: Scope) -> Result<BeanId> {
    match dependency.qualifier() {
      Qualifier::ByType => self.find_by_type(dependency, scope),
      Qualifier::ByName(name) => {
        let id = self.find_by_name(name, dependency, scope)?;
        let entry = &self.entries[id.0];
        if !entry.provides.contains(&dependency.type_key()) {
          return Err(Error::BeanTypeMismatch {
            name: name.clone(),
            expected: dependency.type_key().name(),
            actual: entry.type_key.name(),
          });
        }
        Ok(id)
      }
    }
  }

  /// Unnamed candidates win over named ones; within the winning group the match must be
  /// unique.
  fn find_by_type(&self, dependency: &Dependency, scope: Scope) -> Result<BeanId> {
    let key = dependency.type_key();
    let mut unnamed = Vec::new();
    let mut named = Vec::new();
    for (index, entry) in self.entries.iter().enumerate() {
      if !entry.visible_in(scope) || !entry.provides.contains(&key) {
        continue;
      }
      if entry.name.is_some() {
        named.push(BeanId(index));
      } else {
        unnamed.push(BeanId(index));
      }
    }

    let candidates = if unnamed.is_empty() { named } else { unnamed };
    match candidates.as_slice() {
      [] => Err(Error::NoSuchBean {
        dependency: dependency.to_string(),
      }),
      [id] => Ok(*id),
      _ => Err(Error::AmbiguousBean {
        dependency: dependency.to_string(),
        candidates: candidates.iter().map(|id| self.label(*id)).collect(),
      }),
    }
  }

  fn find_by_name(&self, name: &str, dependency: &Dependency, scope: Scope) -> Result<BeanId> {
    self
      .names
      .get(name)
      .copied()
      .filter(|id| self.entries[id.0].visible_in(scope))
      .ok_or_else(|| Error::NoSuchBean {
        dependency: dependency.to_string(),
      })
  }

  /// The live instance of a ready bean, viewed as `T`.
  pub(crate) fn instance<T: ?Sized + Any + Send + Sync>(
    &self,
    id: BeanId,
    dependency: &Dependency,
  ) -> Result<Arc<T>> {
    let entry = &self.entries[id.0];
    let BeanState::Ready(ready) = &entry.state else {
      return Err(Error::NoSuchBean {
        dependency: dependency.to_string(),
      });
    };
    ready
      .views
      .iter()
      .find(|(type_id, _)| *type_id == TypeId::of::<T>())
      .and_then(|(_, view)| view.downcast_ref::<Arc<T>>())
      .cloned()
      .ok_or_else(|| Error::BeanTypeMismatch {
        name: entry.label(),
        expected: std::any::type_name::<T>(),
        actual: entry.type_key.name(),
      })
  }

  pub(crate) fn ready_instance(&self, id: BeanId) -> Option<SharedAny> {
    match &self.entries[id.0].state {
      BeanState::Ready(ready) => Some(ready.instance.clone()),
      _ => None,
    }
  }

  pub(crate) fn label(&self, id: BeanId) -> String {
    self.entries[id.0].label()
  }

  pub(crate) fn dependencies(&self, id: BeanId) -> &[Dependency] {
    &self.entries[id.0].dependencies
  }

  pub(crate) fn is_ready(&self, id: BeanId) -> bool {
    matches!(self.entries[id.0].state, BeanState::Ready(_))
  }

  pub(crate) fn is_failed(&self, id: BeanId) -> bool {
    matches!(self.entries[id.0].state, BeanState::Failed)
  }

  /// Pending beans in registration order.
  pub(crate) fn pending(&self) -> Vec<BeanId> {
    self
      .entries
      .iter()
      .enumerate()
      .filter(|(_, entry)| matches!(entry.state, BeanState::Pending(_)))
      .map(|(index, _)| BeanId(index))
      .collect()
  }

  pub(crate) fn ready_count(&self) -> usize {
    self
      .entries
      .iter()
      .filter(|entry| matches!(entry.state, BeanState::Ready(_)))
      .count()
  }

  /// Moves a pending bean into assembly and hands back its assembler.
  pub(crate) fn take_pending(&mut self, id: BeanId) -> Option<Assembler> {
    let entry = &mut self.entries[id.0];
    match std::mem::replace(&mut entry.state, BeanState::Assembling) {
      BeanState::Pending(assembler) => Some(assembler),
      other => {
        entry.state = other;
        None
      }
    }
  }

  pub(crate) fn promote(&mut self, id: BeanId, instance: SharedAny, views: Vec<(TypeId, View)>) {
    self.entries[id.0].state = BeanState::Ready(ReadyBean { instance, views });
  }

  /// Marks a bean failed. Its name and unnamed-type slot are released so a corrected
  /// bean can take its place.
  pub(crate) fn fail(&mut self, id: BeanId) {
    let entry = &mut self.entries[id.0];
    entry.state = BeanState::Failed;
    match &entry.name {
      Some(name) => {
        if self.names.get(name) == Some(&id) {
          self.names.remove(name);
        }
      }
      None => {
        if self.unnamed.get(&entry.type_key.id()) == Some(&id) {
          self.unnamed.remove(&entry.type_key.id());
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::bean::Bean;

  struct User {
    name: &'static str,
  }

  fn ready(registry: &mut Registry, id: BeanId) {
    let assembler = registry.take_pending(id).unwrap();
    let injector = crate::core::Injector::new(registry, "test", &[]);
    let assembled = assembler(&injector).unwrap();
    registry.promote(id, assembled.instance, assembled.views);
  }

  #[test]
  fn unnamed_bean_wins_over_named_ones() {
    let mut registry = Registry::new();
    let plain = registry.register(Bean::value(User { name: "user" }).into()).unwrap();
    registry
      .register(Bean::value(User { name: "user2" }).named("user2").into())
      .unwrap();

    let found = registry
      .find(&Dependency::by_type::<User>(), Scope::Registered)
      .unwrap();
    assert_eq!(found, plain);
  }

  #[test]
  fn named_only_candidates_are_ambiguous() {
    let mut registry = Registry::new();
    registry.register(Bean::value(User { name: "a" }).named("a").into()).unwrap();
    registry.register(Bean::value(User { name: "b" }).named("b").into()).unwrap();

    let err = registry
      .find(&Dependency::by_type::<User>(), Scope::Registered)
      .unwrap_err();
    assert!(matches!(err, Error::AmbiguousBean { ref candidates, .. } if candidates.len() == 2));
  }

  #[test]
  fn ready_scope_hides_pending_beans() {
    let mut registry = Registry::new();
    let id = registry.register(Bean::value(User { name: "late" }).into()).unwrap();
    let dependency = Dependency::by_type::<User>();

    assert!(matches!(
      registry.find(&dependency, Scope::Ready),
      Err(Error::NoSuchBean { .. })
    ));

    ready(&mut registry, id);
    let user = registry
      .instance::<User>(registry.find(&dependency, Scope::Ready).unwrap(), &dependency)
      .unwrap();
    assert_eq!(user.name, "late");
  }

  #[test]
  fn name_lookup_checks_assignability() {
    let mut registry = Registry::new();
    registry
      .register(Bean::value(String::from("not a user")).named("user").into())
      .unwrap();

    let err = registry
      .find(&Dependency::by_name::<User>("user"), Scope::Registered)
      .unwrap_err();
    assert!(matches!(err, Error::BeanTypeMismatch { .. }));
  }

  #[test]
  fn failed_bean_releases_its_slot() {
    let mut registry = Registry::new();
    let id = registry.register(Bean::value(User { name: "broken" }).into()).unwrap();
    assert!(matches!(
      registry.register(Bean::value(User { name: "again" }).into()),
      Err(Error::DuplicateUnnamedBean { .. })
    ));

    registry.fail(id);
    assert!(registry.is_failed(id));
    assert!(registry.register(Bean::value(User { name: "fixed" }).into()).is_ok());
  }

  #[test]
  fn availability_check_covers_the_whole_batch() {
    let mut registry = Registry::new();
    registry.register(Bean::value(User { name: "admin" }).named("admin").into()).unwrap();

    let fresh: Vec<BeanDescriptor> = vec![
      Bean::value(User { name: "guest" }).named("guest").into(),
      Bean::value(User { name: "root" }).into(),
    ];
    assert!(registry.check_available(&fresh).is_ok());

    let clashing_with_registry: Vec<BeanDescriptor> = vec![
      Bean::value(User { name: "guest" }).named("guest").into(),
      Bean::value(User { name: "admin" }).named("admin").into(),
    ];
    assert!(matches!(
      registry.check_available(&clashing_with_registry),
      Err(Error::DuplicateBeanName { ref name }) if name == "admin"
    ));

    let clashing_within_batch: Vec<BeanDescriptor> = vec![
      Bean::value(User { name: "first" }).into(),
      Bean::value(User { name: "second" }).into(),
    ];
    assert!(matches!(
      registry.check_available(&clashing_within_batch),
      Err(Error::DuplicateUnnamedBean { .. })
    ));
    assert_eq!(registry.pending().len(), 1);
  }
}
