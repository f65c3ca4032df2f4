//! Core library for 3Bfreeze.
//!
//! This crate provides the domain models, SQLite persistence, the guided freeze
//! workflow and the anonymous-to-authenticated migration, independent of any
//! transport layer (HTTP, CLI).
//!
//! # Usage
//!
//! ```no_run
//! use chrono::Utc;
//! use freeze_core::db::Database;
//! use freeze_core::resolver;
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//!
//! let user_id = uuid::Uuid::new_v4();
//! let statuses = db.get_bureau_statuses(user_id)?;
//! let reminders = db.get_thaw_reminders(user_id)?;
//! let summary = resolver::resolve_all(&statuses, &reminders, Utc::now().date_naive());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod db;
pub mod local;
pub mod migrator;
pub mod models;
pub mod resolver;
pub mod session;
pub mod store;
pub mod thaw;
pub mod workflow;

// Re-export commonly used types at crate root
pub use db::Database;
pub use migrator::{MigrationOutcome, WorkflowMigrator};
pub use store::FreezeStore;
