//! Run with `cargo run -p arbor_ioc --example axum_server --features axum`.

use arbor_ioc::{
  axum_handler, Application, AxumEngine, AxumHandler, Bean, Component, Controller, Inject,
  InjectionPoint, Mapping,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

struct VisitCounter {
  visits: AtomicU64,
}

impl Component for VisitCounter {}

struct HelloController {
  counter: Inject<VisitCounter>,
}

impl Component for HelloController {
  fn injection_points(&self) -> Vec<&dyn InjectionPoint> {
    vec![&self.counter]
  }
}

impl Controller<AxumHandler> for HelloController {
  fn mappings(self: Arc<Self>) -> Vec<Mapping<AxumHandler>> {
    let controller = self.clone();
    vec![
      Mapping::get(
        "/hello",
        axum_handler(move |_request| {
          let visits = controller.counter.visits.fetch_add(1, Ordering::SeqCst) + 1;
          async move { format!("Hello, visitor #{visits}!") }
        }),
      ),
      Mapping::get(
        "/visits",
        axum_handler(move |_request| {
          let visits = self.counter.visits.load(Ordering::SeqCst);
          async move { visits.to_string() }
        }),
      ),
    ]
  }
}

fn main() -> Result<(), arbor_ioc::Error> {
  let app = Application::new(AxumEngine::new());
  app.register_controller(Bean::component(HelloController {
    counter: Inject::by_type(),
  }))?;
  app.register_bean(Bean::component(VisitCounter {
    visits: AtomicU64::new(0),
  }))?;

  println!("Listening on http://127.0.0.1:3000/hello");
  app.run("127.0.0.1:3000")
}
