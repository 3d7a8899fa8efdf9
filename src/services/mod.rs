//! Service layer for business logic
//!
//! Shared between the HTTP handlers and the live channel.

pub mod broadcast;
pub mod device;
mod scan_service;

pub use broadcast::{LiveHub, ScanUpdate, Subscription, UpdateBroadcaster};
pub use device::{DeviceCategory, classify};
pub use scan_service::ScanService;
