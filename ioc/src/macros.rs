//! Public macros for ergonomic bean lookup.

/// Fetches a ready bean from an application.
///
/// This is shorthand for [`Application::must_get_bean_by_type`] and
/// [`Application::must_get_bean_by_name`] and panics the same way they do.
///
/// [`Application::must_get_bean_by_type`]: crate::Application::must_get_bean_by_type
/// [`Application::must_get_bean_by_name`]: crate::Application::must_get_bean_by_name
///
/// # Panics
///
/// Panics if the bean is missing, ambiguous or of the wrong type. For a non-panicking
/// version, use `get_bean_by_type` or `get_bean_by_name` directly.
///
/// # Examples
///
/// ```
/// use arbor_ioc::{bean, Application, Bean};
/// # use arbor_ioc::{HttpEngine, Method};
/// # struct NoEngine;
/// # impl HttpEngine for NoEngine {
/// #   type Handler = ();
/// #   type Error = std::io::Error;
/// #   fn register_route(&mut self, _: Method, _: &str, _: ()) {}
/// #   fn listen_and_serve(self, _: &str) -> Result<(), std::io::Error> { Ok(()) }
/// # }
///
/// trait Greeter: Send + Sync {
///   fn greet(&self) -> String;
/// }
///
/// struct English;
///
/// impl Greeter for English {
///   fn greet(&self) -> String {
///     "Hello!".to_string()
///   }
/// }
///
/// let app = Application::new(NoEngine);
/// app.register_bean(Bean::value(String::from("hello")).named("message")).unwrap();
/// app.register_bean(Bean::value(English).exposes::<dyn Greeter>(|english| english)).unwrap();
///
/// let message = bean!(app, String, "message");
/// assert_eq!(*message, "hello");
///
/// let greeter = bean!(app, trait Greeter);
/// assert_eq!(greeter.greet(), "Hello!");
/// ```
#[macro_export]
macro_rules! bean {
    // bean!(app, trait MyTrait)
    ($app:expr, trait $trait_ident:ident) => {
        $app.must_get_bean_by_type::<dyn $trait_ident>()
    };

    // bean!(app, trait MyTrait, "name")
    ($app:expr, trait $trait_ident:ident, $name:expr) => {
        $app.must_get_bean_by_name::<dyn $trait_ident>($name)
    };

    // bean!(app, MyBean)
    ($app:expr, $type:ty) => {
        $app.must_get_bean_by_type::<$type>()
    };

    // bean!(app, MyBean, "name")
    ($app:expr, $type:ty, $name:expr) => {
        $app.must_get_bean_by_name::<$type>($name)
    };
}
