//! Helpers shared by the integration tests.

pub mod mock_server;

pub use mock_server::{CapturedRequest, spawn_mock_server, tcp_listener};
