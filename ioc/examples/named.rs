use arbor_ioc::{bean, Application, Bean, Component, HttpEngine, Inject, InjectionPoint, Method};
use std::sync::Arc;

// A console "server" that only prints what it would serve.
struct PrintEngine;

impl HttpEngine for PrintEngine {
  type Handler = ();
  type Error = std::io::Error;

  fn register_route(&mut self, method: Method, path: &str, _handler: ()) {
    println!("route {} {}", method, path);
  }

  fn listen_and_serve(self, address: &str) -> Result<(), std::io::Error> {
    println!("would listen on {}", address);
    Ok(())
  }
}

// --- Abstraction and Implementations ---
trait MessageSender: Send + Sync {
  fn send(&self, to: &str, message: &str) -> String;
}

struct EmailSender;
impl MessageSender for EmailSender {
  fn send(&self, to: &str, message: &str) -> String {
    format!("Sending email to {}: '{}'", to, message)
  }
}

struct SmsSender;
impl MessageSender for SmsSender {
  fn send(&self, to: &str, message: &str) -> String {
    format!("Sending SMS to {}: '{}'", to, message)
  }
}

// Picks the SMS implementation by name.
struct AlertService {
  sender: Inject<dyn MessageSender>,
}

impl Component for AlertService {
  fn injection_points(&self) -> Vec<&dyn InjectionPoint> {
    vec![&self.sender]
  }
}

fn main() {
  let app = Application::new(PrintEngine);

  // --- Registration ---
  // Both implementations are exposed as the trait, under unique names.
  app
    .register_beans([
      Bean::value(EmailSender)
        .named("email")
        .exposes::<dyn MessageSender>(|sender| sender)
        .into(),
      Bean::value(SmsSender)
        .named("sms")
        .exposes::<dyn MessageSender>(|sender| sender)
        .into(),
      Bean::component(AlertService {
        sender: Inject::by_name("sms"),
      })
      .into(),
    ])
    .expect("beans should resolve");

  // --- Resolution ---
  let email_notifier = bean!(app, trait MessageSender, "email");
  let sms_notifier: Arc<dyn MessageSender> = bean!(app, trait MessageSender, "sms");

  let result1 = email_notifier.send("test@example.com", "Hello from Arbor!");
  let result2 = sms_notifier.send("+123456789", "Hello from Arbor!");
  println!("{}", result1);
  println!("{}", result2);

  // A by-type lookup has two named candidates and no unnamed one.
  match app.get_bean_by_type::<dyn MessageSender>() {
    Ok(_) => println!("unexpected unique sender"),
    Err(error) => println!("by type: {}", error),
  }

  let alerts = bean!(app, AlertService);
  println!("{}", alerts.sender.send("+123456789", "disk almost full"));

  app.run("127.0.0.1:8080").expect("print engine never fails");
}
