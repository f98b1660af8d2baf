//! The sqlgate safety boundary.
//!
//! Everything between raw caller SQL and the backend lives here, in the order
//! a request traverses it:
//! - **Access guard** (`authz`): token check before anything else runs.
//! - **Classifier** (`classify`): conservative textual read-only policy.
//! - **Limit enforcer** (`limit`): row cap injection for unbounded statements.
//! - **Parameters** (`params`): quote-aware placeholder scanning and binding.
//! - **Backends** (`backend`): pooled SQLite/PostgreSQL execution and
//!   catalog introspection.
//! - **Gateway** (`gateway`): the facade composing the above.
pub mod authz;
pub mod backend;
pub mod classify;
pub mod gateway;
pub mod limit;
pub mod params;

pub use authz::AccessGuard;
pub use backend::{connect, SqlBackend};
pub use classify::{classify, Classification, RejectReason};
pub use gateway::Gateway;
pub use limit::{enforce_limit, QueryPlan};
