//! Ingest metrics client
//!
//! Client-side models for two endpoints of an ingest-metrics web service:
//!
//! - [`rate::RateRefresher`] holds the latest query-rate statistics and can
//!   keep them fresh with a self-rescheduling polling chain.
//! - [`history::HistoryWindow`] holds ingest-history records for a mutable
//!   `[start, end)` window and ingest-type filter.
//!
//! Both reach the network through the [`transport::Transport`] seam; the
//! polling chain schedules its next cycle through [`schedule::Scheduler`].

pub mod cli;
pub mod config;
pub mod history;
pub mod logging;
pub mod rate;
pub mod schedule;
pub mod transport;
