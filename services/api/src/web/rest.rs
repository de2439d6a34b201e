//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification and the JSON payloads
//! exchanged with the browser client.

use painting_order_core::{
    Order, OrderDraft, PaintingStyle, PreviewImage, PriceBreakdown, WizardSnapshot,
};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::web::{auth, catalog, wizard};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::signin_handler,
        auth::signout_handler,
        auth::me_handler,
        catalog::list_styles_handler,
        catalog::pricing_handler,
        wizard::start_wizard_handler,
        wizard::get_wizard_handler,
        wizard::update_draft_handler,
        wizard::upload_reference_image_handler,
        wizard::clear_reference_image_handler,
        wizard::next_step_handler,
        wizard::previous_step_handler,
        wizard::reload_styles_handler,
        wizard::generate_preview_handler,
        wizard::submit_handler,
        wizard::abandon_handler,
    ),
    components(
        schemas(
            auth::SignupRequest,
            auth::SigninRequest,
            auth::AuthResponse,
            StyleResponse,
            PriceResponse,
            PreviewResponse,
            ReferenceImageResponse,
            DraftResponse,
            OrderResponse,
            WizardResponse,
            StepResponse,
            UpdateDraftRequest,
        )
    ),
    tags(
        (name = "Painting Order API", description = "Configure, preview and submit custom painting orders.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StyleResponse {
    pub id: String,
    pub name: String,
    pub name_en: String,
    pub description: String,
}

impl From<&PaintingStyle> for StyleResponse {
    fn from(style: &PaintingStyle) -> Self {
        Self {
            id: style.id.clone(),
            name: style.localized_name.clone(),
            name_en: style.english_name.clone(),
            description: style.description.clone(),
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceResponse {
    pub base_price: u64,
    pub rush_fee: u64,
    pub total_price: u64,
}

impl From<PriceBreakdown> for PriceResponse {
    fn from(price: PriceBreakdown) -> Self {
        Self {
            base_price: price.base_price,
            rush_fee: price.rush_fee,
            total_price: price.total_price,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub image_url: String,
    pub prompt: String,
}

impl From<PreviewImage> for PreviewResponse {
    fn from(preview: PreviewImage) -> Self {
        Self {
            image_url: preview.url,
            prompt: preview.prompt,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceImageResponse {
    pub file_name: String,
    pub content_type: Option<String>,
    pub size_bytes: usize,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftResponse {
    pub style_id: Option<String>,
    pub canvas_size: String,
    pub material: String,
    pub is_rush: bool,
    pub customer_notes: String,
    pub ai_prompt: String,
    pub reference_image: Option<ReferenceImageResponse>,
    pub preview: Option<PreviewResponse>,
}

impl From<OrderDraft> for DraftResponse {
    fn from(draft: OrderDraft) -> Self {
        Self {
            style_id: draft.style_id,
            canvas_size: draft.canvas_size.label().to_string(),
            material: draft.material.as_str().to_string(),
            is_rush: draft.is_rush,
            customer_notes: draft.customer_notes,
            ai_prompt: draft.ai_prompt,
            reference_image: draft.reference_image.map(|image| ReferenceImageResponse {
                size_bytes: image.data.len(),
                file_name: image.file_name,
                content_type: image.content_type,
            }),
            preview: draft.preview.map(PreviewResponse::from),
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub style_id: Option<String>,
    pub canvas_size: String,
    pub material: String,
    pub ai_prompt: Option<String>,
    pub customer_notes: Option<String>,
    pub preview_image_url: Option<String>,
    pub base_price: u64,
    pub rush_fee: u64,
    pub total_price: u64,
    pub is_rush: bool,
    pub status: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            style_id: order.style_id,
            canvas_size: order.canvas_size.label().to_string(),
            material: order.material.as_str().to_string(),
            ai_prompt: order.ai_prompt,
            customer_notes: order.customer_notes,
            preview_image_url: order.preview_image_url,
            base_price: order.price.base_price,
            rush_fee: order.price.rush_fee,
            total_price: order.price.total_price,
            is_rush: order.is_rush,
            status: order.status.as_str().to_string(),
        }
    }
}

/// The full state of one wizard, as rendered by the client.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WizardResponse {
    pub id: Uuid,
    pub step: String,
    pub step_number: Option<u8>,
    pub draft: DraftResponse,
    pub styles: Vec<StyleResponse>,
    pub catalog_unavailable: Option<String>,
    pub price: PriceResponse,
    pub preview_pending: bool,
    pub submitting: bool,
    pub order: Option<OrderResponse>,
}

impl From<WizardSnapshot> for WizardResponse {
    fn from(snapshot: WizardSnapshot) -> Self {
        Self {
            id: snapshot.id,
            step: step_name(snapshot.step),
            step_number: snapshot.step.number(),
            draft: snapshot.draft.into(),
            styles: snapshot.styles.iter().map(StyleResponse::from).collect(),
            catalog_unavailable: snapshot.catalog_error,
            price: snapshot.price.into(),
            preview_pending: snapshot.preview_pending,
            submitting: snapshot.submitting,
            order: snapshot.order.map(OrderResponse::from),
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StepResponse {
    pub step: String,
    pub step_number: Option<u8>,
}

impl From<painting_order_core::WizardStep> for StepResponse {
    fn from(step: painting_order_core::WizardStep) -> Self {
        Self {
            step: step_name(step),
            step_number: step.number(),
        }
    }
}

fn step_name(step: painting_order_core::WizardStep) -> String {
    serde_json::to_value(step)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

/// A partial edit of the draft; omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDraftRequest {
    /// An empty string clears the style selection.
    pub style_id: Option<String>,
    pub canvas_size: Option<String>,
    pub material: Option<String>,
    pub is_rush: Option<bool>,
    pub customer_notes: Option<String>,
    pub ai_prompt: Option<String>,
}
