//! Bounded retry with exponential backoff.
//!
//! Every outbound call in the pipeline goes through [`retry`]: the model
//! API, repository hosting, pushes and the callback delivery all share the
//! same discipline and only differ in their budget and classifier.

mod executor;

pub use executor::{retry, Classification, RetryPolicy};
