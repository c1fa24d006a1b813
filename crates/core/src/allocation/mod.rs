//! Amount splitting and allocation rules.
//!
//! Splits use the Largest Remainder Method so the parts always add back up to
//! the original amount with no cent lost or gained.

pub mod rule;
pub mod split;

#[cfg(test)]
mod props;

pub use rule::{AllocationBasis, AllocationError, RuleTarget, apply_rule};
pub use split::AllocationUtil;
