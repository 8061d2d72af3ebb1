//! House Hunter: a rental-listing backend.
//!
//! Registers and authenticates users, and manages house listings scoped to
//! their owner. Sessions are signed, time-limited tokens (JWT) carried in an
//! HTTP-only cookie; users and listings live as JSON documents in Sled.
//!
//! This lib exposes the store, the token codec and the REST surface.

pub mod auth;
pub mod error;
pub mod models;
// REST API module: Axum router, session/role middleware and route handlers
pub mod rest;
pub mod storage;
