//! HTTP adapter for the connector console.
//!
//! Provides the typed REST client, the studio validate/preview/propose
//! pipeline, and the ops controller with its polling loop.

pub mod api;
pub mod controller;
pub mod error;
pub mod pipeline;
pub mod poller;
