//! Database models split into domain-specific modules.
//!
//! Everything is re-exported so callers can use `crate::db::*`.

pub mod activity;
pub mod blog;
pub mod common;
pub mod contact;
pub mod profile;
pub mod stats;
pub mod user;

pub use activity::*;
pub use blog::*;
pub use common::*;
pub use contact::*;
pub use profile::*;
pub use stats::*;
pub use user::*;
