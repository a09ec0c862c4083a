//! Admin user management

pub mod service;

pub use service::{AdminUserService, Operation};
