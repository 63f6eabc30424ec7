// ABOUTME: Library root for carelog — re-exports all modules for integration testing.
// ABOUTME: The binary entry point is in main.rs, which uses this crate as a library.

pub mod app;
pub mod config;
pub mod media;
pub mod service;
pub mod session;
