//! Pure model for the connector console.
//!
//! Holds the connector draft schema, the mode resolver and source
//! builder, the ops read-model with its query state, and the response
//! normalisation shared by every remote call. Nothing in this crate
//! performs I/O; the `gsb-client` crate supplies the transport.

pub mod catalog;
pub mod draft;
pub mod error;
pub mod form;
pub mod mode;
pub mod ops;
pub mod proposal;
pub mod response;
pub mod source;
pub mod types;
