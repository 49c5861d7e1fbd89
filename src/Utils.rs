//! different utility modules used throughout the project
/// terminal and file logging on top of simplelog
pub mod logger;
/// resolver configuration loaded from a TOML document
pub mod resolver_config;
