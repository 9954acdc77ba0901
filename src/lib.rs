#![doc = "The `tasklane` library crate."]
#![doc = ""]
#![doc = "This crate contains the domain models, authentication mechanisms, the"]
#![doc = "password-reset code lifecycle, routing configuration, and error handling"]
#![doc = "for the Tasklane application. It is used by the main binary (`main.rs`)"]
#![doc = "to construct and run the application."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod reset;
pub mod routes;
