//! Account API client.
//!
//! [`BackendRequest`] names the mutating calls, each HTTP response is
//! classified into a [`BackendResult`], and [`Backend`] is the seam the app
//! talks to. [`HttpBackend`] is the reqwest implementation.

mod client;
mod model;

pub use client::{Backend, BackendError, HttpBackend};
pub use model::{
    Account, AnalyticsSeries, BackendRequest, BackendResult, MALFORMED, Payload,
};
