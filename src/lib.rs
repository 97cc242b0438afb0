//! # quadrantd
//!
//! Self-hosted Eisenhower matrix backend for Todoist tasks.
//!
//! This library provides:
//! - A pure classifier deriving urgency, importance and quadrant from
//!   a task's priority, due date and content
//! - An in-memory task store that keeps the classified view in sync
//!   with the remote service across mutations
//! - An HTTP API for the matrix UI
//!
//! ## Architecture
//!
//! ```text
//!   Todoist REST v2 ──▶ TaskService ──▶ classify ──▶ TaskStore ──▶ HTTP API
//!        (remote            (seam)       (pure)      (session       (axum)
//!      system of record)                               cache)
//! ```
//!
//! ## Data Flow
//! 1. Fetch raw tasks from the remote service
//! 2. Classify each into one of four quadrants (`do`, `schedule`,
//!    `delegate`, `delete`)
//! 3. Serve the classified view; translate user intents (create,
//!    edit, drag to quadrant, complete, delete) into remote mutations
//! 4. Refetch to reconcile — quadrant membership is always derived,
//!    never stored
//!
//! ## Modules
//! - `classify`: pure urgency/importance/quadrant derivation
//! - `store`: session-authoritative cache of classified tasks
//! - `todoist`: the remote task service boundary
//! - `api`: axum routes fronting the store

pub mod api;
pub mod classify;
pub mod config;
pub mod store;
pub mod task;
pub mod todoist;

pub use classify::{classify, Classification, Importance, Quadrant, Urgency};
pub use config::Config;
pub use store::{MatrixState, SharedTaskStore, TaskStore};
pub use task::{ClassifiedTask, Due, NewTask, Task, TaskUpdate};
pub use todoist::{ServiceError, TaskService, TodoistClient};
