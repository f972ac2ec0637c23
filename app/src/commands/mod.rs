//! Session Handlers
//!
//! Every user action is a plain function over a [`Session`](crate::state::Session)
//! and an [`AppEventEmitter`](crate::events::AppEventEmitter). Handlers are
//! organized into logical groups:
//!
//! # Module Organization
//!
//! - **file_io**: Upload, load from disk, close (reset)
//! - **dataframe**: Row slices, preview grids, dataset summary
//! - **ml**: Forecast and report export
//!
//! # Re-exports
//!
//! All handlers are re-exported at the module level, so callers can import
//! them with `use demand_app::commands::*;`

pub mod dataframe;
pub mod file_io;
pub mod ml;

pub use dataframe::*;
pub use file_io::*;
pub use ml::*;
