//! Integration Ledger
//!
//! Host-side persistence for the integration layer. This is the host's own
//! SQLite file, never the workflow engine's database:
//!
//! - **Settings**: key/value pairs, including the fallback API key
//! - **Purposes**: which workflow serves a named purpose, at most one each
//! - **Packages**: installed community packages as the host last saw them,
//!   including whether the engine still needs a restart to load them

pub mod error;
pub mod packages;
pub mod purposes;
pub mod settings;
mod store;

pub use error::{LedgerError, Result};
pub use packages::InstalledNodePackage;
pub use purposes::PurposeAssignment;
pub use store::IntegrationLedger;
