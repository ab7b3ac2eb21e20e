//! # Postdate
//!
//! Postdate is a time-delayed message delivery service. A capsule is a
//! message authored today with an unlock date in the future; once that date
//! passes, a background scheduler emails it to the recipient.
//!
//! ## Features
//!
//! - Capsule creation and listing over a small HTTP API
//! - Periodic delivery passes over due capsules, bounded per pass
//! - Per-capsule failure counting with a permanent-failure cutoff
//! - Pluggable storage (in-memory, Redis) and mail backends (console, SMTP)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use postdate::capsule::Capsule;
//! use postdate::config::SchedulerConfig;
//! use postdate::notify::ConsoleNotifier;
//! use postdate::scheduler::DeliveryScheduler;
//! use postdate::store::{CapsuleStore, MemoryStore};
//! use chrono::Utc;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> postdate::Result<()> {
//!     let store = Arc::new(MemoryStore::new());
//!
//!     let capsule = Capsule::builder()
//!         .sender_name("Past Me")
//!         .receiver_email("future@example.com")
//!         .message("Remember to water the plants.")
//!         .unlock_at(Utc::now())
//!         .build()?;
//!     store.create(capsule).await?;
//!
//!     let scheduler = DeliveryScheduler::new(
//!         store,
//!         Arc::new(ConsoleNotifier::new()),
//!         SchedulerConfig::default(),
//!     );
//!     let summary = scheduler.run_once(Utc::now()).await?;
//!     println!("sent {} capsule(s)", summary.sent);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Public module exports
pub mod error;
pub mod config;

// Capsule records
pub mod capsule;

// Storage layer
pub mod store;

// Mail delivery backends
pub mod notify;

// Delivery scheduler
pub mod scheduler;

// HTTP surface
pub mod http;

// Re-export common types
pub use capsule::{Capsule, CapsuleStatus};
pub use error::{Error, Result};
