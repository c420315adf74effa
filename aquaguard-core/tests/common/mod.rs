//! Shared helpers for aquaguard-core integration tests

#![allow(dead_code)]

pub mod generators;

pub use generators::*;
