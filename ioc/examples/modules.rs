use arbor_ioc::{
  Application, Bean, BoxError, Component, Configuration, Controller, HttpEngine, Inject,
  InjectionPoint, Mapping, Method, Module,
};
use std::collections::HashMap;
use std::sync::Arc;

type Handler = Box<dyn Fn(&str) -> String + Send + Sync>;

// Keeps the routes so the example can "call" them after `run`.
struct InMemoryEngine {
  routes: HashMap<(Method, String), Handler>,
}

impl HttpEngine for InMemoryEngine {
  type Handler = Handler;
  type Error = std::io::Error;

  fn register_route(&mut self, method: Method, path: &str, handler: Handler) {
    self.routes.insert((method, path.to_owned()), handler);
  }

  fn listen_and_serve(self, address: &str) -> Result<(), std::io::Error> {
    println!("serving {} routes on {}", self.routes.len(), address);
    for ((method, path), handler) in &self.routes {
      println!("{} {} -> {}", method, path, handler("arbor"));
    }
    Ok(())
  }
}

struct Settings {
  greeting: String,
}

struct Greeter {
  settings: Inject<Settings>,
}

impl Component for Greeter {
  fn injection_points(&self) -> Vec<&dyn InjectionPoint> {
    vec![&self.settings]
  }

  fn post_construct(&self) -> Result<(), BoxError> {
    println!("greeter ready with '{}'", self.settings.greeting);
    Ok(())
  }
}

struct HelloController {
  greeter: Inject<Greeter>,
}

impl Component for HelloController {
  fn injection_points(&self) -> Vec<&dyn InjectionPoint> {
    vec![&self.greeter]
  }
}

impl Controller<Handler> for HelloController {
  fn mappings(self: Arc<Self>) -> Vec<Mapping<Handler>> {
    let hello: Handler = Box::new(move |name: &str| format!("{}, {}!", self.greeter.settings.greeting, name));
    vec![Mapping::get("/hello", hello)]
  }
}

fn settings() -> Result<Configuration<Handler>, BoxError> {
  Ok(Configuration::new().bean(Bean::value(Settings {
    greeting: "Hello".to_string(),
  })))
}

// Runs only once `Settings` is ready.
fn web(settings: Arc<Settings>) -> Result<Configuration<Handler>, BoxError> {
  println!("configuring web layer for '{}'", settings.greeting);
  Ok(
    Configuration::new()
      .bean(Bean::component(Greeter {
        settings: Inject::by_type(),
      }))
      .controller(Bean::component(HelloController {
        greeter: Inject::by_type(),
      })),
  )
}

fn main() -> Result<(), arbor_ioc::Error> {
  let app = Application::new(InMemoryEngine {
    routes: HashMap::new(),
  });

  // The web module is imported first and waits for the settings module.
  app.import(Module::new(web).named("web"))?;
  app.import(Module::new(settings).named("settings"))?;

  for route in app.routes() {
    println!("mapped {} {} from {}", route.method, route.path, route.controller);
  }
  app.run("127.0.0.1:8080")
}
