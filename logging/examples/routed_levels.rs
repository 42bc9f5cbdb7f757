use arbor_ioc::{Application, Bean, BoxError, Component, HttpEngine, Inject, InjectionPoint, Method};
use arbor_logging::{Logger, LoggerConfig};
use tracing::Level;

// Serves nothing; the example only wires beans.
struct NoEngine;

impl HttpEngine for NoEngine {
  type Handler = ();
  type Error = std::io::Error;

  fn register_route(&mut self, _method: Method, _path: &str, _handler: ()) {}

  fn listen_and_serve(self, address: &str) -> Result<(), std::io::Error> {
    println!("(not) listening on {}", address);
    Ok(())
  }
}

struct Scheduler {
  logger: Inject<Logger>,
}

impl Component for Scheduler {
  fn injection_points(&self) -> Vec<&dyn InjectionPoint> {
    vec![&self.logger]
  }

  fn post_construct(&self) -> Result<(), BoxError> {
    self.logger.info("scheduler ready");
    Ok(())
  }
}

const CONFIG: &str = r#"
level: debug
writer:
  kind: console
level_writers:
  error:
    kind: rolling_file
    directory: logs
    file_name_prefix: errors.log
    rotation: daily
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
  let config = LoggerConfig::from_yaml_str(CONFIG)?;

  let app = Application::new(NoEngine);
  app.import(arbor_logging::configuration(config))?;
  app.register_bean(Bean::component(Scheduler {
    logger: Inject::by_type(),
  }))?;

  let scheduler = app.must_get_bean_by_type::<Scheduler>();
  scheduler.logger.debug("tick");
  scheduler.logger.error("job 17 failed; see logs/errors.log");
  scheduler.logger.in_scope(Level::WARN, || {
    tracing::warn!(job = 18, retries = 2, "job is retrying");
  });

  app.run("127.0.0.1:8080")?;
  Ok(())
}
