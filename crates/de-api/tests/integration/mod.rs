//! Integration test modules.

pub mod alerts_tests;
pub mod common;
pub mod health_tests;
pub mod lookup_tests;
pub mod registration_tests;
