//! TaskaDeck cookie jar storage.
//!
//! Provides SQLite connection management and schema migrations for the
//! per-partition cookie jar.
//!
//! # Usage
//!
//! ```no_run
//! use taskadeck::database::Database;
//!
//! // Open the jar of a persistent partition
//! let db = Database::open("Partitions/web-view/Cookies.db").expect("failed to open jar");
//!
//! // Or use an in-memory jar for testing
//! let db = Database::open_in_memory().expect("failed to open in-memory jar");
//! let cookies = db.load_cookies().expect("failed to read jar");
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
