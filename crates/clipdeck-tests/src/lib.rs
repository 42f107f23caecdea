//! Integration test crate for ClipDeck.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on the core, canvas and timeline crates to verify they work
//! together.

#[cfg(test)]
mod scenarios;

#[cfg(test)]
mod properties;

#[cfg(test)]
mod workflow;
