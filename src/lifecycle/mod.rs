//! Backing file lifecycle.
//!
//! A configuration starts unbound. [`FileLifecycleManager::create_file`]
//! binds it to a file it owns, [`FileLifecycleManager::load`] binds it to a
//! file it merely reads, and [`FileLifecycleManager::delete_file`] removes an
//! owned file together with the directories created for it.
//!
//! ```text
//!             create_file                 delete_file
//!   Unbound ─────────────► BoundOwned ───────────────► Unbound
//!      │                      ▲
//!      │ load                 │ create_file
//!      ▼                      │
//!   BoundUnowned ─────────────┘
//! ```
//!
//! Directory pruning after deletion never climbs above the first directory
//! `create_file` had to create (or the file's parent when none was needed).

mod binding;
mod manager;
mod temp;

pub use binding::{BindingState, FileBinding};
pub use manager::{DeletionReport, FileLifecycleManager};
pub use temp::{
    default_temp_root, TemporaryNameCounter, TEMPORARY_NAMES, TEMP_ROOT_DIR, TEMP_ROOT_ENV,
};
