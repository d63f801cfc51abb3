//! Public models for the `infos` module.
//!
//! These are transport-agnostic data structures that define the contract
//! between the `infos` module and its consumers.

use serde_json::Value;

/// A stored reminder.
#[derive(Debug, Clone, PartialEq)]
pub struct Info {
    pub id: i64,
    pub title: String,
    pub desc: Option<String>,
    pub is_complete: Option<bool>,
    pub remind_at_address: Option<String>,
    /// Derived from `remind_at_address` as `"<lat>,<lng>"`.
    pub remind_at_geo: Option<String>,
    pub tag: Option<Value>,
}

/// Data for creating a new reminder.
///
/// `id` and `remind_at_geo` are accepted by the repository layer only; the
/// service rejects them from callers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewInfo {
    pub id: Option<i64>,
    pub title: String,
    pub desc: Option<String>,
    pub is_complete: Option<bool>,
    pub remind_at_address: Option<String>,
    pub remind_at_geo: Option<String>,
    pub tag: Option<Value>,
}

impl NewInfo {
    /// Minimal record with only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update data for a reminder.
///
/// The outer `Option` tells whether a field is touched; for nullable fields
/// the inner `None` clears the stored value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InfoPatch {
    pub title: Option<String>,
    pub desc: Option<Option<String>>,
    pub is_complete: Option<Option<bool>>,
    pub remind_at_address: Option<Option<String>>,
    pub remind_at_geo: Option<Option<String>>,
    pub tag: Option<Option<Value>>,
}

impl InfoPatch {
    /// True when the patch does not touch any field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.desc.is_none()
            && self.is_complete.is_none()
            && self.remind_at_address.is_none()
            && self.remind_at_geo.is_none()
            && self.tag.is_none()
    }

    /// Merge the touched fields into `info`.
    pub fn apply_to(&self, info: &mut Info) {
        if let Some(title) = &self.title {
            info.title.clone_from(title);
        }
        if let Some(desc) = &self.desc {
            info.desc.clone_from(desc);
        }
        if let Some(is_complete) = self.is_complete {
            info.is_complete = is_complete;
        }
        if let Some(address) = &self.remind_at_address {
            info.remind_at_address.clone_from(address);
        }
        if let Some(geo) = &self.remind_at_geo {
            info.remind_at_geo.clone_from(geo);
        }
        if let Some(tag) = &self.tag {
            info.tag.clone_from(tag);
        }
    }
}

/// A geocoded point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Encode as the `"<lat>,<lng>"` string stored in `remind_at_geo`.
    #[must_use]
    pub fn to_geo_string(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}
