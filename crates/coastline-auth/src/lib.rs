//! # coastline-auth
//!
//! Authentication and authorization for CoastlineVibe.
//!
//! - `jwt`: verification of access tokens issued by the hosted backend
//! - `policy`: the single function deciding what a profile may do in a
//!   community, used by services and reported to the UI

pub mod jwt;
pub mod policy;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use policy::{AccessReport, Action, Actor, Policy, PolicyDecision};
