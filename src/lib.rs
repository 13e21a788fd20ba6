//! Shift attendance engine for restaurant point-of-sale.
//!
//! This crate enforces shift-based attendance for cashiers and waiters:
//! clock-in only inside the assigned shift window, no clock-out before the
//! shift ends, automatic logout once the window has elapsed, and audited
//! admin overrides that extend or terminate a session.

#![warn(missing_docs)]

pub mod api;
pub mod attendance;
pub mod config;
pub mod error;
pub mod models;
pub mod sales;
pub mod store;
