//! Work items and launch configurations

mod harness;
mod ticket;

pub use harness::{dedup_preserving_order, Harness};
pub use ticket::{SqliteTicketSource, TicketError, TicketFilter, TicketSource, WorkItem};
