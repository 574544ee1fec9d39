//! Integration tests for clipsync

mod helpers;

mod cli_test;
mod config_test;
mod scenario_test;
mod timeline_test;
