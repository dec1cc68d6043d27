//! DNS MX resolution.
//!
//! The public entry point is [`check_mx`], a synchronous lookup through the
//! system resolver. The [`LookupMx`] trait is the seam that lets the
//! verifier (and tests) substitute a stub resolver.

mod error;
mod resolver;
mod types;

pub use error::MxError;
pub use resolver::{check_mx, LookupMx};
pub(crate) use resolver::resolve_with;
pub use types::{MxRecord, MxStatus};
