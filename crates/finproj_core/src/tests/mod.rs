//! Integration tests for the projection engine
//!
//! Tests are organized by topic:
//! - `engine` - Facade pipeline: caching, invalidation, performance samples
//! - `validation` - Rejected inputs never reach the cache
//! - `properties` - Randomised monotonicity and termination checks

mod engine;
