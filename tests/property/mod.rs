//! Property-based tests for the wireframe pipeline

mod determinism;
