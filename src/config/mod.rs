//! Configuration management for TcpFrame

pub mod settings;

pub use settings::ServerConfig;
