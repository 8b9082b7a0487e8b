//! Linkshelf database layer.
//!
//! The only persisted state is the bookmark cache; the linkding server is
//! the source of truth for everything else.
//!
//! ```no_run
//! use linkshelf::database::Database;
//!
//! let db = Database::open("cache.db").expect("failed to open database");
//! let conn = db.connection();
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
