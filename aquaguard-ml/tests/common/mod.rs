//! Shared fixtures for aquaguard-ml integration tests

#![allow(dead_code)]

pub mod generators;
pub mod stubs;

pub use generators::*;
pub use stubs::*;
