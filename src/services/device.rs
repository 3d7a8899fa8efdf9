//! Visitor device classification
//!
//! Maps the raw `User-Agent` descriptor to a coarse device category. The
//! category is stored with a visitor on its first scan and never re-derived.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};
use ts_rs::TS;

use crate::storage::models::TS_EXPORT_PATH;

/// 访客设备类型
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Default,
    TS,
    EnumIter,
    EnumString,
    AsRefStr,
)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "PascalCase")]
#[strum(serialize_all = "PascalCase")]
pub enum DeviceCategory {
    Mobile,
    Tablet,
    Desktop,
    /// No descriptor was available to classify
    #[default]
    Unknown,
}

impl std::fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

const TABLET_MARKERS: [&str; 3] = ["iPad", "Android", "Touch"];

/// Classify a client descriptor
///
/// First match wins: `mobile` (any case) is Mobile, then `iPad`, `Android`
/// or `Touch` (exact case) is Tablet, anything else is Desktop. A missing
/// descriptor is Unknown.
pub fn classify(descriptor: Option<&str>) -> DeviceCategory {
    let Some(ua) = descriptor else {
        return DeviceCategory::Unknown;
    };

    if ua.to_ascii_lowercase().contains("mobile") {
        DeviceCategory::Mobile
    } else if TABLET_MARKERS.iter().any(|marker| ua.contains(marker)) {
        DeviceCategory::Tablet
    } else {
        DeviceCategory::Desktop
    }
}

/// Parse a stored device label; unrecognised labels map to Unknown
pub fn parse_device(label: &str) -> DeviceCategory {
    label.parse().unwrap_or_default()
}
