//! Portal-facing login descriptors (data) and per-attempt outcomes.
//!
//! `candidate` lists the login URL shapes tried in fallback order, `retry` holds the
//! per-candidate attempt budget and backoff schedule, and `response` turns a raw login
//! response into a tagged [`LoginOutcome`] so expected failures never surface as errors.

pub mod candidate;
pub mod response;
pub mod retry;

pub use candidate::*;
pub use response::*;
pub use retry::*;
