//! Pathway Storage - the durable [`EventStore`] trait and its two
//! conforming backends, plus the JSONL transport codec.
//!
//! One trait ([`store::EventStore`]), two backends ([`memory::InMemoryEventStore`]
//! and [`sqlite::SqliteEventStore`]): callers write against the trait and
//! choose a backend by deployment shape, not by API surface.

pub mod jsonl;
pub mod memory;
pub mod sqlite;
pub mod store;

pub use jsonl::{export_session, find_event, import_events};
pub use memory::InMemoryEventStore;
pub use sqlite::SqliteEventStore;
pub use store::{EventFilter, EventStore, Order, SessionSummary};
