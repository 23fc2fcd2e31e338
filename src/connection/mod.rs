//! Connection Module
//!
//! Defines what the server requires of a protocol connection. The byte
//! level handshake, chunk streams and command parsing live in the
//! implementation; the server only drives it through [`Connection`].
//!
//! ## Lifecycle
//!
//! ```text
//!   Connection::new(rw, Role::Server)
//!          │
//!          ▼
//!   on_new_conn hook (optional)
//!          │
//!          ▼
//!   prepare(Stage::GotPublishOrPlayCommand, 0)
//!          │
//!     ┌────┴─────┐
//!     ▼          ▼
//!   Err        Ok ──> application handler owns it
//!     │
//!     ▼
//!   into_inner() ──> transport closed
//! ```

pub mod traits;

// Re-export commonly used types
pub use traits::{Connection, PrepareError, Role};
