//! Integration test crate; see the tests directory.
