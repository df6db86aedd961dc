//! Configuration module for the connector

mod settings;

pub use settings::*;
