// Library exports for integration tests and embedding hosts
// This allows tests to access internal modules

pub mod config;
pub mod demo_ref;
pub mod dispatch;
pub mod edits;
pub mod error;
pub mod logging;
pub mod page;
pub mod payload;
pub mod project;
pub mod storage;
