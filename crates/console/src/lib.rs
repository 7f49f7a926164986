//! Terminal front end for the connector console.
//!
//! `ops` watches the fleet snapshot, one connector or one run; `studio`
//! drives the draft wizard (validate, preview, propose, run now) and the
//! connector catalog.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod render;
