//! Roster Scheduling Engine for retail stores.
//!
//! This crate builds weekly shift rosters, validates them against statutory
//! labour-compliance rules, repairs violations, and optimizes labour cost,
//! escalating deterministically to human review when automated resolution fails.

#![warn(missing_docs)]

pub mod calendar;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestration;
pub mod providers;
pub mod scheduling;
