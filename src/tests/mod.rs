//! Cross-module scenario tests over mock trait implementations.

mod engine;
