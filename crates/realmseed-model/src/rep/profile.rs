//! User-profile schema document.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The realm's user-profile schema.
///
/// Attribute and group definitions are free-form documents; the engine
/// compares them at the JSON level and replaces the whole document on
/// drift, so they stay untyped here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unmanaged_attribute_policy: Option<String>,
}
