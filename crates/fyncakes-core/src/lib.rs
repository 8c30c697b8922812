//! FynCakes Core Library
//!
//! This crate provides the data layer for the FynCakes bakery shop: an
//! in-memory document store that stands in for a real document database
//! during local development, and typed models for the records it holds.
//!
//! # Architecture
//!
//! - **Collections**: insertion-ordered, schema-less records queried with
//!   a subset of document-database filter semantics
//! - **Models**: typed entities validated where records enter the app
//!
//! All data lives for the lifetime of the process only.
//!
//! # Quick Start
//!
//! ```text
//! let mut db = Database::open(&Config::load()?)?;
//!
//! let cakes = db.collection_mut("cakes");
//! let query = Query::parse(&document(json!({
//!     "name": {"$regex": "^choc", "$options": "i"}
//! })))?;
//! let page = cakes.find(&query).skip(6).limit(6).to_vec();
//! ```
//!
//! # Modules
//!
//! - `collection`: Collections, cursors and operation results
//! - `query`: The document query matcher
//! - `update`: `$set` / `$unset` / `$inc` update specs
//! - `value`: Record type and value comparison rules
//! - `database`: Named collections and backend selection
//! - `models`: Data structures for cakes, users, orders, comments, carts,
//!   wishlists and class registrations
//! - `catalog`: Storefront queries
//! - `shop`: Cart, checkout, class registration and dashboard figures
//! - `config`: Application configuration

pub mod catalog;
pub mod collection;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod query;
pub mod shop;
pub mod update;
pub mod value;

pub use collection::{Collection, Cursor, DeleteResult, InsertOneResult, SortOrder, UpdateResult};
pub use config::Config;
pub use database::{Database, MockDatabase};
pub use error::{ModelError, QueryError, ShopError, StoreError, StoreResult};
pub use models::{Cake, CartItem, Comment, Entity, Order, Role, Student, User, WishlistItem};
pub use query::{matches, Query};
pub use update::UpdateSpec;
pub use value::{document, Document, FIELD_ID};
