// src/readers/mod.rs

//! Processing drivers: corpus materialization, format classification,
//! scrub filtering, signature aggregation, fingerprint suppression.

pub mod classifier;
pub mod corpus;
pub mod filter;
pub mod fingerprint;
pub mod helpers;
pub mod sighash;
