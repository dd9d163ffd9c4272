//! Cross-crate integration tests for the MLO Stack live in `tests/`.
//! This crate intentionally has no library code.
