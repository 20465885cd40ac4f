//! Canonicalization driver and high-level APIs
//!
//! Ties the stages together: the source text of a function value comes from
//! a [`SourceProvider`](cn_vfs::SourceProvider), is tokenized and scanned
//! into a scope table (shared through [`SourceCache`]), the definition is
//! located, every short name in it is root-anchored and the result is
//! rendered as a [`CanonicalSource`](cn_canon::CanonicalSource).

pub mod cache;
pub mod config;
pub mod error;
pub mod pipeline;

pub use cache::{AnalyzedSource, SourceCache};
pub use config::CanonConfig;
pub use error::CanonError;
pub use pipeline::{CanonicalClosure, Canonicalizer, FunctionValue};

pub use cn_canon::{CanonicalSource, Signature};
pub use cn_locate::{CallableReference, ClosureOrigin, Dispatch, Origin};
pub use cn_rewrite::{ClosureTraits, UnresolvedPolicy};
