//! # Arbor IoC
//!
//! A small inversion-of-control runtime for server processes.
//!
//! An [`Application`] owns a registry of beans. Beans declare what they depend on, by type or
//! by name, and the application assembles them in dependency order as soon as those
//! dependencies are ready. Each component gets one `post_construct` call before anything
//! else can see it. Configuration [`Module`]s contribute more beans once their own parameters
//! are ready, and [`Controller`]s declare the routes the application installs on its
//! [`HttpEngine`] when it runs.
//!
//! ## Core Concepts
//!
//! - **Bean**: any `Send + Sync + 'static` value, registered through [`Bean`].
//! - **Component**: a bean with [`Inject`] fields and an optional lifecycle hook.
//! - **Module**: a function whose `Arc<T>` parameters are injected and which returns a
//!   [`Configuration`].
//! - **Controller**: a component that returns [`Mapping`]s for the engine.
//!
//! ## Quick Start
//!
//! ```
//! use arbor_ioc::{bean, Application, Bean, BoxError, Component, Inject, InjectionPoint};
//! # use arbor_ioc::{HttpEngine, Method};
//! # struct NoEngine;
//! # impl HttpEngine for NoEngine {
//! #   type Handler = ();
//! #   type Error = std::io::Error;
//! #   fn register_route(&mut self, _: Method, _: &str, _: ()) {}
//! #   fn listen_and_serve(self, _: &str) -> Result<(), std::io::Error> { Ok(()) }
//! # }
//!
//! struct Database {
//!   url: String,
//! }
//!
//! impl Component for Database {}
//!
//! struct UserService {
//!   database: Inject<Database>,
//! }
//!
//! impl Component for UserService {
//!   fn injection_points(&self) -> Vec<&dyn InjectionPoint> {
//!     vec![&self.database]
//!   }
//!
//!   fn post_construct(&self) -> Result<(), BoxError> {
//!     println!("users stored at {}", self.database.url);
//!     Ok(())
//!   }
//! }
//!
//! let app = Application::new(NoEngine);
//!
//! // Registration order does not matter.
//! app.register_bean(Bean::component(UserService { database: Inject::by_type() })).unwrap();
//! app.register_bean(Bean::component(Database { url: "postgres://localhost".into() })).unwrap();
//!
//! let users = bean!(app, UserService);
//! assert_eq!(users.database.url, "postgres://localhost");
//! ```

mod application;
#[cfg(feature = "axum")]
mod axum_engine;
mod bean;
mod controller;
mod core;
mod engine;
mod error;
mod lifecycle;
mod macros;
mod module;
mod registry;
mod resolver;

pub use application::{AppState, Application};
#[cfg(feature = "axum")]
pub use axum_engine::{axum_handler, AxumEngine, AxumHandler};
pub use bean::{Bean, BeanDescriptor, Component};
pub use controller::{Controller, ControllerDescriptor, Mapping, Method, Route};
pub use core::{Dependency, Inject, InjectionPoint, Injector, Qualifier, TypeKey};
pub use engine::HttpEngine;
pub use error::{BoxError, Error, Result};
pub use module::{Configuration, Module, ModuleFn};
