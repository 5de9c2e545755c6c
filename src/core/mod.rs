//! Core data structures for ensemble stacks.

mod stack;
mod weights;

pub use stack::{unstack, validate_stack};
pub use weights::MemberWeights;

pub(crate) use weights::ResolvedWeights;
