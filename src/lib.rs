//! 3Bfreeze: guided credit freezes at Equifax, TransUnion and Experian.
//!
//! The HTTP API lives in [`api`]; domain logic and persistence come from
//! [`freeze_core`].

pub mod api;
pub mod config;
pub mod telemetry;

pub use freeze_core::{db, models};
