//! Hash computation and object identity for the gitcore merge engine.
//!
//! This crate provides the core `ObjectId` type, hash computation, and hex
//! encoding/decoding used throughout gitcore.

mod error;
pub mod hex;
mod algorithm;
mod oid;
pub mod hasher;

pub use algorithm::HashAlgorithm;
pub use error::HashError;
pub use hasher::Hasher;
pub use oid::ObjectId;
