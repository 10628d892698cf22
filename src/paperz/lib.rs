//! # Paperz Architecture
//!
//! Paperz is a **UI-agnostic client library** for paperless-ngx document
//! servers. This is not a CLI application that happens to have some
//! library code—it's a library that happens to have a CLI client.
//!
//! ## The Three-Layer Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs + args.rs)                              │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Holds the session: remote client + registry snapshot     │
//! │  - Returns structured Result types, never hidden state      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Pure business logic                                      │
//! │  - Operates on Rust types, returns Rust types               │
//! │  - No I/O assumptions beyond the injected transport         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Remote Layer (remote/)                                     │
//! │  - Abstract Transport trait                                 │
//! │  - HttpTransport (production), InMemoryTransport (testing)  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Pipeline
//!
//! A document query flows through: query composition ([`query`]) →
//! cursor-following pagination ([`remote`]) → materialization against
//! the entity registry ([`model`], [`registry`]) → client-side secondary
//! filters ([`filter`]). Exports then name files with the compiled
//! filename pattern ([`pattern`]) and can fold a batch into a single
//! annotated composite ([`merge`]).
//!
//! Everything runs single-threaded and sequentially: network calls are
//! blocking, pagination never overlaps, and the registry belongs to one
//! session. Degradation beats failure throughout — an unresolvable name
//! drops that criterion with a warning, a failed page yields the partial
//! result, a failed single fetch leaves that document out.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade—entry point for all operations
//! - [`commands`]: Business logic for each command
//! - [`remote`]: Transport abstraction and the paginated client
//! - [`model`]: Core data types (`Entity`, `Document`, `Identifier`)
//! - [`registry`]: Entity snapshots and name resolution
//! - [`query`]: Compound query composition
//! - [`filter`]: Client-side secondary filters
//! - [`pattern`]: Filename pattern compiler
//! - [`merge`]: Batch merge pipeline
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod filter;
pub mod merge;
pub mod model;
pub mod pattern;
pub mod query;
pub mod registry;
pub mod remote;
