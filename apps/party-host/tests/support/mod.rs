#![allow(dead_code)]

pub mod app_builder;
pub mod fixtures;
pub mod websocket;
pub mod websocket_client;

pub use app_builder::create_test_app;
pub use fixtures::TestRepo;
