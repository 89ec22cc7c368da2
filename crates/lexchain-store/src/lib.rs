//! # LexChain Store
//!
//! Storage abstraction for the LexChain registry. Provides a trait-based
//! interface for document, grant, and emergency persistence with SQLite and
//! in-memory implementations.
//!
//! ## Overview
//!
//! The registry never writes records directly. It hands the store a
//! [`Transition`](lexchain_core::Transition), and [`Store::commit`] applies
//! the record mutation and appends the matching event in one atomic step.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lexchain_store::{SqliteStore, Store};
//!
//! async fn example() {
//!     // Open a SQLite database
//!     let store = SqliteStore::open("registry.db").unwrap();
//!
//!     // Or use an in-memory database for testing
//!     let store = SqliteStore::open_memory().unwrap();
//!
//!     let head = store.head_seq().await.unwrap();
//!     println!("{} events committed", head);
//! }
//! ```

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::Store;
