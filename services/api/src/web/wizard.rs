//! services/api/src/web/wizard.rs
//!
//! Axum handlers driving an `OrderWizard`. Every route here sits behind
//! `require_auth`, which supplies the caller's `Identity` and `SessionContext`.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use painting_order_core::{
    CanvasSize, DraftUpdate, Identity, Material, OrderWizard, ReferenceImage, SessionContext,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::web::rest::{
    OrderResponse, PreviewResponse, StepResponse, StyleResponse, UpdateDraftRequest,
    WizardResponse,
};
use crate::web::state::AppState;

impl TryFrom<UpdateDraftRequest> for DraftUpdate {
    type Error = ApiError;

    fn try_from(req: UpdateDraftRequest) -> Result<Self, Self::Error> {
        Ok(DraftUpdate {
            style_id: req.style_id,
            canvas_size: req
                .canvas_size
                .as_deref()
                .map(str::parse::<CanvasSize>)
                .transpose()?,
            material: req
                .material
                .as_deref()
                .map(str::parse::<Material>)
                .transpose()?,
            is_rush: req.is_rush,
            customer_notes: req.customer_notes,
            ai_prompt: req.ai_prompt,
        })
    }
}

async fn owned_wizard(
    state: &AppState,
    id: Uuid,
    identity: &Identity,
) -> ApiResult<Arc<OrderWizard>> {
    state.wizards.get(id, identity.user_id).await
}

/// POST /wizards - Open a new order wizard
#[utoipa::path(
    post,
    path = "/wizards",
    responses(
        (status = 201, description = "Wizard opened at the first step", body = WizardResponse),
        (status = 401, description = "Not signed in"),
        (status = 429, description = "Too many open wizards")
    )
)]
pub async fn start_wizard_handler(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<SessionContext>,
) -> ApiResult<impl IntoResponse> {
    let wizard = OrderWizard::start(&context, state.ports.clone()).await?;
    let wizard = state.wizards.insert(wizard).await?;
    Ok((
        StatusCode::CREATED,
        Json(WizardResponse::from(wizard.snapshot().await)),
    ))
}

/// GET /wizards/{id} - Current state of a wizard
#[utoipa::path(
    get,
    path = "/wizards/{id}",
    params(("id" = Uuid, Path, description = "Wizard id")),
    responses(
        (status = 200, description = "Wizard state", body = WizardResponse),
        (status = 404, description = "No such wizard")
    )
)]
pub async fn get_wizard_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<WizardResponse>> {
    let wizard = owned_wizard(&state, id, &identity).await?;
    Ok(Json(wizard.snapshot().await.into()))
}

/// PATCH /wizards/{id}/draft - Edit draft fields
#[utoipa::path(
    patch,
    path = "/wizards/{id}/draft",
    params(("id" = Uuid, Path, description = "Wizard id")),
    request_body = UpdateDraftRequest,
    responses(
        (status = 200, description = "Updated wizard state", body = WizardResponse),
        (status = 422, description = "Unknown style, size or material")
    )
)]
pub async fn update_draft_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateDraftRequest>,
) -> ApiResult<Json<WizardResponse>> {
    let wizard = owned_wizard(&state, id, &identity).await?;
    wizard.update_draft(DraftUpdate::try_from(req)?).await?;
    Ok(Json(wizard.snapshot().await.into()))
}

/// PUT /wizards/{id}/reference-image - Attach a reference photo
#[utoipa::path(
    put,
    path = "/wizards/{id}/reference-image",
    params(("id" = Uuid, Path, description = "Wizard id")),
    request_body(content_type = "multipart/form-data", description = "The reference image."),
    responses(
        (status = 200, description = "Updated wizard state", body = WizardResponse),
        (status = 400, description = "Missing file")
    )
)]
pub async fn upload_reference_image_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<Json<WizardResponse>> {
    let wizard = owned_wizard(&state, id, &identity).await?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Failed to read multipart data: {}", e)))?
        .ok_or_else(|| ApiError::Validation("Multipart form must include a file".to_string()))?;

    let file_name = field.file_name().unwrap_or("reference").to_string();
    let content_type = field.content_type().map(str::to_string);
    let data = field
        .bytes()
        .await
        .map_err(|e| ApiError::Validation(format!("Failed to read file bytes: {}", e)))?;
    if data.is_empty() {
        return Err(ApiError::Validation("Uploaded file is empty".to_string()));
    }

    wizard
        .set_reference_image(Some(ReferenceImage {
            file_name,
            content_type,
            data,
        }))
        .await?;
    Ok(Json(wizard.snapshot().await.into()))
}

/// DELETE /wizards/{id}/reference-image - Remove the reference photo
#[utoipa::path(
    delete,
    path = "/wizards/{id}/reference-image",
    params(("id" = Uuid, Path, description = "Wizard id")),
    responses((status = 200, description = "Updated wizard state", body = WizardResponse))
)]
pub async fn clear_reference_image_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<WizardResponse>> {
    let wizard = owned_wizard(&state, id, &identity).await?;
    wizard.set_reference_image(None).await?;
    Ok(Json(wizard.snapshot().await.into()))
}

/// POST /wizards/{id}/next - Advance one step
#[utoipa::path(
    post,
    path = "/wizards/{id}/next",
    params(("id" = Uuid, Path, description = "Wizard id")),
    responses((status = 200, description = "New step", body = StepResponse))
)]
pub async fn next_step_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StepResponse>> {
    let wizard = owned_wizard(&state, id, &identity).await?;
    Ok(Json(wizard.next().await?.into()))
}

/// POST /wizards/{id}/previous - Go back one step
#[utoipa::path(
    post,
    path = "/wizards/{id}/previous",
    params(("id" = Uuid, Path, description = "Wizard id")),
    responses((status = 200, description = "New step", body = StepResponse))
)]
pub async fn previous_step_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StepResponse>> {
    let wizard = owned_wizard(&state, id, &identity).await?;
    Ok(Json(wizard.previous().await?.into()))
}

/// POST /wizards/{id}/styles/reload - Retry loading the style catalog
#[utoipa::path(
    post,
    path = "/wizards/{id}/styles/reload",
    params(("id" = Uuid, Path, description = "Wizard id")),
    responses(
        (status = 200, description = "Reloaded styles", body = [StyleResponse]),
        (status = 503, description = "Catalog still unavailable")
    )
)]
pub async fn reload_styles_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<StyleResponse>>> {
    let wizard = owned_wizard(&state, id, &identity).await?;
    let styles = wizard.reload_styles().await?;
    Ok(Json(styles.iter().map(StyleResponse::from).collect()))
}

/// POST /wizards/{id}/preview - Generate an AI preview
#[utoipa::path(
    post,
    path = "/wizards/{id}/preview",
    params(("id" = Uuid, Path, description = "Wizard id")),
    responses(
        (status = 200, description = "Generated preview", body = PreviewResponse),
        (status = 409, description = "A preview is already being generated"),
        (status = 422, description = "No prompt or notes to generate from"),
        (status = 502, description = "Generation service failed")
    )
)]
pub async fn generate_preview_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PreviewResponse>> {
    let wizard = owned_wizard(&state, id, &identity).await?;
    let preview = wizard.generate_preview().await?;
    Ok(Json(preview.into()))
}

/// POST /wizards/{id}/submit - Submit the order
#[utoipa::path(
    post,
    path = "/wizards/{id}/submit",
    params(("id" = Uuid, Path, description = "Wizard id")),
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 409, description = "Not on the review step, or already submitting"),
        (status = 502, description = "Order could not be saved; the draft is kept")
    )
)]
pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let wizard = owned_wizard(&state, id, &identity).await?;
    let order = wizard.submit().await?;
    state.wizards.remove(id).await;
    info!("Order {} created by user {}.", order.id, identity.user_id);
    Ok((StatusCode::CREATED, Json(OrderResponse::from(order))))
}

/// DELETE /wizards/{id} - Abandon the wizard
#[utoipa::path(
    delete,
    path = "/wizards/{id}",
    params(("id" = Uuid, Path, description = "Wizard id")),
    responses((status = 204, description = "Wizard discarded"))
)]
pub async fn abandon_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let wizard = owned_wizard(&state, id, &identity).await?;
    state.wizards.remove(id).await;
    wizard.abandon().await;
    Ok(StatusCode::NO_CONTENT)
}
