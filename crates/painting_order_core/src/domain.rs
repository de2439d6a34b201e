//! crates/painting_order_core/src/domain.rs
//!
//! Defines the pure, core data structures for the ordering workflow.
//! These structs are independent of any database or transport format.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::WizardError;

/// The authenticated user a wizard is opened for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: Option<String>,
}

/// A selectable painting style, validated at the catalog boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintingStyle {
    pub id: String,
    pub localized_name: String,
    pub english_name: String,
    pub description: String,
    pub is_active: bool,
}

/// The four canvas tiers, from small to extra-large.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum CanvasSize {
    #[serde(rename = "30x40")]
    S1,
    #[default]
    #[serde(rename = "50x70")]
    S2,
    #[serde(rename = "70x100")]
    S3,
    #[serde(rename = "100x150")]
    S4,
}

impl CanvasSize {
    pub const ALL: [CanvasSize; 4] = [
        CanvasSize::S1,
        CanvasSize::S2,
        CanvasSize::S3,
        CanvasSize::S4,
    ];

    /// Dimensions in centimetres, as shown to the customer and stored on the order.
    pub fn label(self) -> &'static str {
        match self {
            CanvasSize::S1 => "30x40",
            CanvasSize::S2 => "50x70",
            CanvasSize::S3 => "70x100",
            CanvasSize::S4 => "100x150",
        }
    }
}

impl fmt::Display for CanvasSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CanvasSize {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "30x40" | "S1" => Ok(CanvasSize::S1),
            "50x70" | "S2" => Ok(CanvasSize::S2),
            "70x100" | "S3" => Ok(CanvasSize::S3),
            "100x150" | "S4" => Ok(CanvasSize::S4),
            other => Err(WizardError::InvalidInput(format!(
                "unknown canvas size '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    #[default]
    Oil,
    Watercolor,
    Acrylic,
    Pencil,
    DigitalPrint,
}

impl Material {
    pub fn as_str(self) -> &'static str {
        match self {
            Material::Oil => "oil",
            Material::Watercolor => "watercolor",
            Material::Acrylic => "acrylic",
            Material::Pencil => "pencil",
            Material::DigitalPrint => "digital_print",
        }
    }
}

impl FromStr for Material {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "oil" => Ok(Material::Oil),
            "watercolor" => Ok(Material::Watercolor),
            "acrylic" => Ok(Material::Acrylic),
            "pencil" => Ok(Material::Pencil),
            "digital_print" | "digitalPrint" => Ok(Material::DigitalPrint),
            other => Err(WizardError::InvalidInput(format!(
                "unknown material '{}'",
                other
            ))),
        }
    }
}

/// An image the customer attached as a reference for the artist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// A generated preview together with the prompt that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewImage {
    pub url: String,
    pub prompt: String,
}

/// The in-progress order configuration owned by one wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderDraft {
    pub style_id: Option<String>,
    pub canvas_size: CanvasSize,
    pub material: Material,
    pub is_rush: bool,
    pub customer_notes: String,
    pub ai_prompt: String,
    pub reference_image: Option<ReferenceImage>,
    pub preview: Option<PreviewImage>,
}

/// A partial edit of the draft. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct DraftUpdate {
    /// An empty string clears the selection.
    pub style_id: Option<String>,
    pub canvas_size: Option<CanvasSize>,
    pub material: Option<Material>,
    pub is_rush: Option<bool>,
    pub customer_notes: Option<String>,
    pub ai_prompt: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceBreakdown {
    pub base_price: u64,
    pub rush_fee: u64,
    pub total_price: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Previewed,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Previewed => "previewed",
        }
    }
}

// The create-request handed to the order store. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub style_id: Option<String>,
    pub canvas_size: CanvasSize,
    pub material: Material,
    pub ai_prompt: Option<String>,
    pub customer_notes: Option<String>,
    pub preview_image_url: Option<String>,
    pub price: PriceBreakdown,
    pub is_rush: bool,
    pub status: OrderStatus,
}

/// A persisted order, immutable from this crate's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub style_id: Option<String>,
    pub canvas_size: CanvasSize,
    pub material: Material,
    pub ai_prompt: Option<String>,
    pub customer_notes: Option<String>,
    pub preview_image_url: Option<String>,
    pub price: PriceBreakdown,
    pub is_rush: bool,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}
