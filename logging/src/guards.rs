// Keeps non-blocking writers alive; dropping the guards flushes them.

use tracing_appender::non_blocking::WorkerGuard;

/// The `WorkerGuard`s of one logger's non-blocking writers.
///
/// When this struct is dropped, all contained guards are dropped, ensuring that
/// any buffered log lines are written out.
#[derive(Default)]
pub(crate) struct WorkerGuards {
  guards: Vec<WorkerGuard>,
}

impl WorkerGuards {
  pub(crate) fn add(&mut self, guard: WorkerGuard) {
    self.guards.push(guard);
  }

  #[cfg(test)]
  pub(crate) fn len(&self) -> usize {
    self.guards.len()
  }
}

impl std::fmt::Debug for WorkerGuards {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("WorkerGuards")
      .field("count", &self.guards.len())
      .finish()
  }
}
