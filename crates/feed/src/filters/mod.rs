//! Filter implementations for the profile pipeline.
//!
//! This module contains all the concrete filters that can be composed into a
//! FilterPipeline.

pub mod already_matched;
pub mod duplicate_profile;
pub mod exclude_self;

// Re-export for convenience
pub use already_matched::AlreadyMatchedFilter;
pub use duplicate_profile::DuplicateProfileFilter;
pub use exclude_self::ExcludeSelfFilter;
