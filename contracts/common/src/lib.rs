//! Shared utilities and error types for the registry contracts.
//!
//! This crate provides:
//! - [`CommonError`] — error codes for the cross-cutting guards below.
//! - [`pausable`] — admin-controlled circuit breaker for mutating entry points.
//! - [`reentrancy`] — transaction-scoped lock around external value transfers.
//! - [`ttl`] — persistent-storage TTL extension with workspace-wide constants.
//!
//! Contract-specific errors map these codes into their own `#[contracterror]`
//! enum at the contract boundary.

#![no_std]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

use soroban_sdk::contracterror;

// ── Modules ──────────────────────────────────────────────────────────────────

pub mod pausable;
pub mod reentrancy;
pub mod ttl;

pub use pausable::*;
pub use reentrancy::*;
pub use ttl::*;

// ── Shared error enum ────────────────────────────────────────────────────────

/// Error codes raised by the shared guards.
///
/// # Code ranges
/// | Range   | Purpose                       |
/// |---------|-------------------------------|
/// | 1 – 9   | Lifecycle / initialisation    |
/// | 10 – 19 | Authentication & authorisation|
/// | 40 – 49 | Contract state                |
#[contracterror]
#[derive(Clone, Debug, Eq, PartialEq, Copy)]
#[repr(u32)]
pub enum CommonError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    AccessDenied = 10,
    // ── Contract state (40–49) ───────────────────────────────
    /// The contract is currently paused and cannot process requests.
    Paused = 40,
    /// A guarded section was entered while already held in this transaction.
    ReentrantCall = 41,
}
