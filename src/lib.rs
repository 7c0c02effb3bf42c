//! Mokeke Tracker
//!
//! モケケ収集リストのCLI。コア処理は `mokeke_common` にある。

pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod store;
