//! # Ruleschema Architecture
//!
//! Ruleschema is a **UI-agnostic engine** for authoring rule schemas: a tree of
//! categories (objects) carrying named groups of typed attributes (property
//! sets), where groups can structurally inherit from each other. Tree widgets,
//! rule exporters and spreadsheet importers are collaborators that talk to
//! the engine through the API; none of them live here.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs) + Views (view.rs)                       │
//! │  - Thin facade over commands, owns Project + EngineConfig   │
//! │  - Read-only serializable snapshots for presentation        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Validation, local writes, cascades, dirty marking        │
//! │  - Operates on the Registry explicitly, returns CmdResult   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Registry: one arena per entity kind, identifier index    │
//! │  - Arena: id-addressed records, iterative tree operations   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: Ids, Not References
//!
//! Entities never point at each other. Parent/child and clone/source links
//! are stored as ids and maintained on both ends by the command layer. Every
//! traversal is iterative and carries a visited set, and any operation that
//! assigns a parent rejects cycles before it writes anything.
//!
//! ## Single-Threaded, Synchronous
//!
//! Commands take `&mut Registry`. A cascade runs to completion before the
//! call returns, and the borrow rules make it impossible to re-enter a
//! mutation while one is in progress.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Engine logic per entity kind
//! - [`store`]: The document-scoped registry and its arenas
//! - [`model`]: Entity records, ids, value and data types
//! - [`hierarchy`]: Parent/children links shared by all tree-shaped entities
//! - [`project`]: Document metadata and the aggregated change flag
//! - [`view`]: Presentation snapshots
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod model;
pub mod project;
pub mod store;
pub mod view;

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures;
