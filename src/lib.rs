//! Shrine proxy library
//!
//! Fetches the weekly shrine from the first healthy mirror, enriches its perks
//! from the perk catalog and serves the result from an in-memory cache backed
//! by an on-disk snapshot file.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod logging;
pub mod pipeline;
pub mod refresh;
pub mod server;

#[cfg(test)]
mod test_support;
