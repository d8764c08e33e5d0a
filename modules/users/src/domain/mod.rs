pub mod error;
pub mod ports;
pub mod repo;
pub mod schemas;
pub mod service;
