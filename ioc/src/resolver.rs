//! Orders pending beans so that every bean is assembled after the beans it depends on.

use crate::core::Dependency;
use crate::error::{Error, Result};
use crate::lifecycle;
use crate::registry::{BeanId, Registry, Scope};
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
  Visiting,
  Ordered,
  Deferred,
}

/// Pending beans that reach themselves.
#[derive(Debug, Clone)]
pub(crate) struct Cycle {
  /// The beans on the cycle, sorted.
  pub(crate) members: Vec<BeanId>,
  /// Labels along the cycle, starting and ending with the same bean.
  pub(crate) chain: Vec<String>,
}

impl Cycle {
  pub(crate) fn to_error(&self) -> Error {
    Error::CyclicDependency {
      chain: self.chain.clone(),
    }
  }
}

/// The outcome of planning one pass.
#[derive(Debug, Default)]
pub(crate) struct Plan {
  /// Satisfiable beans, dependencies first.
  pub(crate) order: Vec<BeanId>,
  /// Beans that must wait, each with the first dependency that holds it back.
  pub(crate) deferred: Vec<(BeanId, Dependency)>,
  /// Cycles found while planning. Their beans, and the beans depending on them, are
  /// deferred.
  pub(crate) cycles: Vec<Cycle>,
}

/// The outcome of one resolution pass.
#[derive(Debug, Default)]
pub(crate) struct Pass {
  pub(crate) promoted: usize,
  pub(crate) cycles: Vec<Cycle>,
}

struct Planner<'a> {
  registry: &'a Registry,
  marks: HashMap<BeanId, Mark>,
  stack: Vec<BeanId>,
  plan: Plan,
}

impl<'a> Planner<'a> {
  /// Returns whether `id` can be assembled in this pass.
  fn visit(&mut self, id: BeanId) -> Result<bool> {
    match self.marks.get(&id) {
      Some(Mark::Ordered) => return Ok(true),
      Some(Mark::Deferred) => return Ok(false),
      Some(Mark::Visiting) => {
        self.record_cycle(id);
        return Ok(false);
      }
      None => {}
    }
    if self.registry.is_ready(id) {
      return Ok(true);
    }

    self.marks.insert(id, Mark::Visiting);
    self.stack.push(id);

    let registry = self.registry;
    let mut blocked_on: Option<&Dependency> = None;
    for dependency in registry.dependencies(id) {
      let satisfiable = match registry.find(dependency, Scope::Registered) {
        Ok(target) => self.visit(target)?,
        Err(Error::NoSuchBean { .. }) => false,
        Err(error) => return Err(error),
      };
      if !satisfiable && blocked_on.is_none() {
        blocked_on = Some(dependency);
      }
    }

    self.stack.pop();
    match blocked_on {
      None => {
        self.marks.insert(id, Mark::Ordered);
        self.plan.order.push(id);
        Ok(true)
      }
      Some(dependency) => {
        self.marks.insert(id, Mark::Deferred);
        self.plan.deferred.push((id, dependency.clone()));
        Ok(false)
      }
    }
  }

  fn record_cycle(&mut self, id: BeanId) {
    let start = self.stack.iter().position(|entry| *entry == id).unwrap_or(0);
    let on_cycle = &self.stack[start..];
    let mut chain: Vec<String> = on_cycle.iter().map(|entry| self.registry.label(*entry)).collect();
    chain.push(self.registry.label(id));
    let mut members = on_cycle.to_vec();
    members.sort();
    self.plan.cycles.push(Cycle { members, chain });
  }
}

/// Plans the assembly order of every pending bean.
///
/// A pending bean that reaches itself is recorded as a cycle and deferred together with its
/// dependents; the rest of the graph is still planned. Fails with `AmbiguousBean` or
/// `BeanTypeMismatch` when an edge can never resolve to a single compatible bean. Edges
/// with no candidate yet defer the bean and its dependents.
pub(crate) fn plan(registry: &Registry) -> Result<Plan> {
  let mut planner = Planner {
    registry,
    marks: HashMap::new(),
    stack: Vec::new(),
    plan: Plan::default(),
  };
  for id in registry.pending() {
    planner.visit(id)?;
  }
  Ok(planner.plan)
}

/// Assembles every currently satisfiable bean and reports the cycles that hold others back.
///
/// The whole graph is planned before anything is assembled. An assembly or hook failure
/// stops the pass; beans promoted before it stay ready.
pub(crate) fn run_pass(registry: &mut Registry) -> Result<Pass> {
  let plan = plan(registry)?;
  if !plan.deferred.is_empty() {
    debug!(deferred = plan.deferred.len(), "Deferring beans with missing dependencies");
  }
  for cycle in &plan.cycles {
    warn!(chain = %cycle.chain.join(" -> "), "Beans on a dependency cycle stay pending");
  }
  let mut promoted = 0;
  for id in plan.order {
    lifecycle::instantiate(registry, id)?;
    promoted += 1;
  }
  Ok(Pass {
    promoted,
    cycles: plan.cycles,
  })
}

/// Fails with `CyclicDependency` for the first remaining cycle, then with
/// `UnsatisfiedDependency` for the first bean still waiting on a dependency.
pub(crate) fn ensure_satisfied(registry: &Registry) -> Result<()> {
  let plan = plan(registry)?;
  if let Some(cycle) = plan.cycles.first() {
    return Err(cycle.to_error());
  }
  match plan.deferred.first() {
    Some((id, dependency)) => Err(Error::UnsatisfiedDependency {
      bean: registry.label(*id),
      dependency: dependency.to_string(),
    }),
    None => Ok(()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::bean::{Bean, Component};
  use crate::core::{Inject, InjectionPoint};

  struct Repository;

  struct Service {
    repository: Inject<Repository>,
  }

  impl Component for Service {
    fn injection_points(&self) -> Vec<&dyn InjectionPoint> {
      vec![&self.repository]
    }
  }

  struct Ping {
    pong: Inject<Pong>,
  }

  impl Component for Ping {
    fn injection_points(&self) -> Vec<&dyn InjectionPoint> {
      vec![&self.pong]
    }
  }

  struct Pong {
    ping: Inject<Ping>,
  }

  impl Component for Pong {
    fn injection_points(&self) -> Vec<&dyn InjectionPoint> {
      vec![&self.ping]
    }
  }

  #[test]
  fn dependencies_come_first_in_the_plan() {
    let mut registry = Registry::new();
    let service = registry
      .register(
        Bean::component(Service {
          repository: Inject::by_type(),
        })
        .into(),
      )
      .unwrap();
    let repository = registry.register(Bean::value(Repository).into()).unwrap();

    let plan = plan(&registry).unwrap();
    assert_eq!(plan.order, vec![repository, service]);
    assert!(plan.deferred.is_empty());
  }

  #[test]
  fn missing_dependency_defers_the_bean() {
    let mut registry = Registry::new();
    let service = registry
      .register(
        Bean::component(Service {
          repository: Inject::by_type(),
        })
        .into(),
      )
      .unwrap();

    assert_eq!(run_pass(&mut registry).unwrap().promoted, 0);
    let plan = plan(&registry).unwrap();
    assert_eq!(plan.deferred.len(), 1);
    assert_eq!(plan.deferred[0].0, service);

    let err = ensure_satisfied(&registry).unwrap_err();
    assert!(matches!(err, Error::UnsatisfiedDependency { .. }));
  }

  #[test]
  fn cycle_names_the_chain() {
    let mut registry = Registry::new();
    registry
      .register(Bean::component(Ping { pong: Inject::by_type() }).into())
      .unwrap();
    registry
      .register(Bean::component(Pong { ping: Inject::by_type() }).into())
      .unwrap();

    let pass = run_pass(&mut registry).unwrap();
    assert_eq!(pass.promoted, 0);
    assert_eq!(pass.cycles.len(), 1);
    let chain = &pass.cycles[0].chain;
    assert_eq!(chain.len(), 3);
    assert_eq!(chain.first(), chain.last());
    assert_eq!(registry.ready_count(), 0);

    match ensure_satisfied(&registry) {
      Err(Error::CyclicDependency { chain }) => assert_eq!(chain.len(), 3),
      other => panic!("expected a cycle, got {other:?}"),
    }
  }

  #[test]
  fn cycle_does_not_hold_back_unrelated_beans() {
    let mut registry = Registry::new();
    let ping = registry
      .register(Bean::component(Ping { pong: Inject::by_type() }).into())
      .unwrap();
    let pong = registry
      .register(Bean::component(Pong { ping: Inject::by_type() }).into())
      .unwrap();
    let repository = registry.register(Bean::value(Repository).into()).unwrap();
    let service = registry
      .register(
        Bean::component(Service {
          repository: Inject::by_type(),
        })
        .into(),
      )
      .unwrap();

    let pass = run_pass(&mut registry).unwrap();
    assert_eq!(pass.promoted, 2);
    assert_eq!(pass.cycles[0].members, vec![ping, pong]);
    assert!(registry.is_ready(repository));
    assert!(registry.is_ready(service));
    assert!(!registry.is_ready(ping));
    assert!(!registry.is_ready(pong));
  }
}
