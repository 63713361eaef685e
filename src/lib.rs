//! Single-node proof-of-work hash chain: five selectable digests, mining under
//! a leading-zero difficulty, full-chain validation and tamper detection, with
//! an actix-web API and a JSON snapshot store on top.

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod registry;
pub mod store;
