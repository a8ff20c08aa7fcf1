//! # Reelboard Database Crate
//!
//! This crate is the application-specific interface to the MongoDB document
//! database that stores movies, cast, earnings and users.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** All driver-specific code (filters, projections, aggregation
//!   pipelines) lives here. The rest of the application sees the
//!   `CatalogStore` trait and the schemas from `core-types`.
//! - **Injected connection:** `ConnectionManager` establishes the database
//!   handle once and memoizes it. It is created at startup and handed to the
//!   store; nothing here is a process-global.
//! - **Swappable store:** `DbRepository` implements `CatalogStore` over
//!   MongoDB, `InMemoryStore` implements it in memory for tests.
//!
//! ## Public API
//!
//! - `ConnectionManager`: memoized connection establishment.
//! - `CatalogStore`: every query and write the web server performs.
//! - `DbRepository` / `InMemoryStore`: the two store implementations.
//! - `lookup_movie` / `MovieLookup`: the detail read path.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod lookup;
pub mod memory;
pub mod repository;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use connection::ConnectionManager;
pub use error::DbError;
pub use lookup::{MovieLookup, lookup_movie};
pub use memory::InMemoryStore;
pub use repository::DbRepository;
pub use store::{CatalogStore, CollectionKind, CountryTotal, EarningsSummary};
