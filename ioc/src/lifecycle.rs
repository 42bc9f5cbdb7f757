use crate::core::Injector;
use crate::error::{Error, Result};
use crate::registry::{BeanId, Registry};
use tracing::{debug, warn};

/// Wires a pending bean, runs its post-construct hook, and promotes it to ready.
///
/// Any failure marks the bean failed. Its dependents stay pending.
pub(crate) fn instantiate(registry: &mut Registry, id: BeanId) -> Result<()> {
  let Some(assembler) = registry.take_pending(id) else {
    return Ok(());
  };
  let label = registry.label(id);

  let assembled = {
    let injector = Injector::new(registry, &label, registry.dependencies(id));
    assembler(&injector)
  };
  let assembled = match assembled {
    Ok(assembled) => assembled,
    Err(error) => {
      warn!(bean = %label, %error, "Bean could not be assembled");
      registry.fail(id);
      return Err(error);
    }
  };

  if let Some(hook) = assembled.post_construct {
    if let Err(source) = hook() {
      warn!(bean = %label, error = %source, "Post-construct hook failed");
      registry.fail(id);
      return Err(Error::LifecycleHook { bean: label, source });
    }
  }

  registry.promote(id, assembled.instance, assembled.views);
  debug!(bean = %label, "Bean is ready");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::bean::{Bean, Component};
  use crate::core::Dependency;
  use crate::error::BoxError;
  use crate::registry::Scope;
  use std::sync::atomic::{AtomicUsize, Ordering};

  struct Counted {
    calls: AtomicUsize,
  }

  impl Component for Counted {
    fn post_construct(&self) -> Result<(), BoxError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      Ok(())
    }
  }

  struct Broken;

  impl Component for Broken {
    fn post_construct(&self) -> Result<(), BoxError> {
      Err("disk unavailable".into())
    }
  }

  #[test]
  fn hook_runs_once_before_promotion() {
    let mut registry = Registry::new();
    let id = registry
      .register(
        Bean::component(Counted {
          calls: AtomicUsize::new(0),
        })
        .into(),
      )
      .unwrap();

    instantiate(&mut registry, id).unwrap();
    instantiate(&mut registry, id).unwrap();

    let dependency = Dependency::by_type::<Counted>();
    let counted = registry.instance::<Counted>(id, &dependency).unwrap();
    assert_eq!(counted.calls.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn failing_hook_marks_the_bean_failed() {
    let mut registry = Registry::new();
    let id = registry.register(Bean::component(Broken).into()).unwrap();

    let err = instantiate(&mut registry, id).unwrap_err();
    assert!(matches!(err, Error::LifecycleHook { ref bean, .. } if bean.ends_with("Broken")));
    assert!(registry.is_failed(id));
    assert!(registry
      .find(&Dependency::by_type::<Broken>(), Scope::Registered)
      .is_err());
  }
}
