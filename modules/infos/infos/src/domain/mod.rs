pub mod error;
pub mod local_client;
pub mod ports;
pub mod repo;
pub mod service;
