//! Purpose: Library crate behind the `apio-api` CLI.
//! Exports: `api` (config, transport, request executor), `core` (errors).
//! Role: Performs one authenticated GET against the GitHub repos API per call.
//! Invariants: Every failure is returned as `api::Error`; the binary picks exit codes.
pub mod api;
pub mod core;
