//! Attendance Reconciliation Engine
//!
//! This crate reconciles raw employee punches (clock-in, lunch-out, lunch-in,
//! clock-out) into worked time, lateness and hour-bank balances. It
//! classifies incoming punches, summarizes days and months on the local
//! calendar, and projects the results onto spreadsheet exports.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod calendar;
pub mod config;
pub mod error;
pub mod models;
pub mod registration;
pub mod store;
