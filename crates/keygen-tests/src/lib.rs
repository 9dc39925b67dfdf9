//! Integration test suite for key-gen.
//!
//! Checks the derivation engine against published BIP vectors, pins the
//! export ordering, and exercises the sealed store and address encoders
//! under randomized inputs.

pub mod helpers;
