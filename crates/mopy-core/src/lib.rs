//! Core types and configuration for mopy.
//!
//! This crate defines the `mopy.toml` schema ([`MopyConfig`]), its
//! validation, dependency classification ([`DependencyKind`]), and shared
//! error types.
//!
//! A [`MopyConfig`] obtained through [`MopyConfig::load`],
//! [`MopyConfig::from_file`] or [`MopyConfig::parse`] has already been
//! validated, which is the precondition for Dockerfile generation.

pub mod config;
pub mod dependency;
pub mod error;

pub use config::{CONFIG_FILE_NAME, MopyConfig};
pub use dependency::DependencyKind;
pub use error::{Error, Result};
