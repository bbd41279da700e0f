//! Integration tests for save-hook dispatch.

mod helpers;

mod config_test;
mod exception_test;
mod validation_test;
