//! # dsg-core
//!
//! Core crate for the data service generator. Contains configuration
//! schemas, the declarative model types handed to plugins (entities,
//! fields, Prisma descriptors, plugin installations), generated-module
//! artifacts, and the unified error system.
//!
//! This crate has **no** internal dependencies on other DSG crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
