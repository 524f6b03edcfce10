// SPDX-License-Identifier: MIT

//! Product bundle catalog entries.

use serde::{Deserialize, Serialize};

/// Read-only storefront entity; never created through API flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bundle {
    pub id: i32,
    /// Unique slug used as the external key
    pub slug: String,
    pub name: String,
    pub description: String,
    /// Price in the smallest currency unit
    pub price: i32,
    pub features: Vec<String>,
    pub image_url: Option<String>,
    pub category: String,
}
