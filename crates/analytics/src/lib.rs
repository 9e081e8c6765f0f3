//! Ticket normalization and sprint analytics.
//!
//! Takes the raw, loosely-typed issue collection returned by the tracker
//! search API and derives sprint-level metrics (velocity, completion rate,
//! capacity projection, bug quality) plus a composable multi-dimension
//! filter over the ticket set. Every pass is a pure function over its
//! inputs: `today` is injected, filter state is passed by value, and the
//! input tickets are never mutated.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod filter;
pub mod resolve;
pub mod ticket;

pub use aggregate::{aggregate, SprintSnapshot};
pub use classify::{classify, ClassifiedTicket, DueBucket};
pub use config::AnalyticsConfig;
pub use filter::{apply_filter, summarize, FilterState, FilterSummary, FilterToggle, Presence};
pub use resolve::FieldCandidates;
pub use ticket::{parse_tickets, Ticket, TicketFields};
