// Library exports for Blogly
// This allows integration tests and the binary to share one router

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;
