//! Property-based tests for ranking, persistence and pattern analysis

mod persistence;
mod ranking;
