//! FormDB scenario suite
//!
//! End-to-end tests through the public `formdb` API.
//!
//! ## Groups
//!
//! - **school**: the Student table walk-through (insert, duplicate, query)
//! - **persistence**: save, reopen and cache handling
//! - **laws**: merge, dedup and shape invariants across the stack
//! - **queries**: partitioned/stacked agreement and wait bounds
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test scenarios
//! ```

// Test modules
mod test_utils;

mod laws;
mod persistence;
mod queries;
mod school;
