//! Scanlinker - scan tracking service for dynamic QR codes
//!
//! Registers target URLs under opaque code ids, counts every scan in total
//! and per visitor, and pushes live count updates to subscribed dashboards.
//!
//! # Architecture
//! - `storage`: SeaORM-backed persistence of codes and visitor stats
//! - `services`: scan accounting, device classification, live broadcast
//! - `api`: HTTP handlers, responses and middleware
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging setup

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
