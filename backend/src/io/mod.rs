//! # IO Module
//!
//! Adapter layer between HTTP clients and the domain services. Requests are
//! deserialized into `shared` DTOs, mapped to domain commands, and domain
//! results are mapped back to DTOs before serialization.

pub mod rest;

pub use rest::*;
