//! E2E test suite entry point.

mod fixture;
#[cfg(unix)]
mod packaging_workflow;
