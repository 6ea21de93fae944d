//! replicate_client - Streaming access to the hosted inference endpoint
//!
//! A generation is a two-step exchange: create a prediction over HTTP, then
//! consume its server-sent-event stream of text fragments. The crate exposes
//! the [`GenerationClient`] trait so the session engine never depends on the
//! concrete transport, plus [`ReplicateClient`], the production implementation.

pub mod api;
pub mod client_trait;
pub mod error;
pub mod params;

pub use api::{ClientConfig, ReplicateClient, DEFAULT_MODEL};
pub use client_trait::{GenerationClient, GenerationStream};
pub use error::{GenerationError, Result};
pub use params::GenerationParams;
