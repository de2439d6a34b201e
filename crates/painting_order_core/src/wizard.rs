//! crates/painting_order_core/src/wizard.rs
//!
//! The five-step order wizard. One `OrderWizard` owns one draft for its whole
//! lifetime; it is shared behind an `Arc` so that navigation and edits stay
//! possible while a preview request is outstanding.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::catalog::StyleCatalog;
use crate::domain::{
    DraftUpdate, Identity, NewOrder, Order, OrderDraft, OrderStatus, PaintingStyle, PreviewImage,
    PriceBreakdown, ReferenceImage,
};
use crate::error::{WizardError, WizardResult};
use crate::ports::{OrderStore, PreviewGenerationService, StyleCatalogService};
use crate::preview::{compose_prompt, InFlight};
use crate::pricing::compute_price;
use crate::session::{SessionContext, SessionGate};

/// The collaborators a wizard talks to.
#[derive(Clone)]
pub struct WizardPorts {
    pub catalog: Arc<dyn StyleCatalogService>,
    pub preview: Arc<dyn PreviewGenerationService>,
    pub orders: Arc<dyn OrderStore>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    StyleSelect,
    Details,
    Specs,
    Preview,
    ReviewSubmit,
    Submitted,
    Abandoned,
}

impl WizardStep {
    /// The 1-based position of an active step; `None` once the wizard is closed.
    pub fn number(self) -> Option<u8> {
        match self {
            WizardStep::StyleSelect => Some(1),
            WizardStep::Details => Some(2),
            WizardStep::Specs => Some(3),
            WizardStep::Preview => Some(4),
            WizardStep::ReviewSubmit => Some(5),
            WizardStep::Submitted | WizardStep::Abandoned => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.number().is_none()
    }

    fn forward(self) -> Self {
        match self {
            WizardStep::StyleSelect => WizardStep::Details,
            WizardStep::Details => WizardStep::Specs,
            WizardStep::Specs => WizardStep::Preview,
            WizardStep::Preview | WizardStep::ReviewSubmit => WizardStep::ReviewSubmit,
            terminal => terminal,
        }
    }

    fn back(self) -> Self {
        match self {
            WizardStep::StyleSelect | WizardStep::Details => WizardStep::StyleSelect,
            WizardStep::Specs => WizardStep::Details,
            WizardStep::Preview => WizardStep::Specs,
            WizardStep::ReviewSubmit => WizardStep::Preview,
            terminal => terminal,
        }
    }

    fn name(self) -> &'static str {
        match self {
            WizardStep::StyleSelect => "style_select",
            WizardStep::Details => "details",
            WizardStep::Specs => "specs",
            WizardStep::Preview => "preview",
            WizardStep::ReviewSubmit => "review_submit",
            WizardStep::Submitted => "submitted",
            WizardStep::Abandoned => "abandoned",
        }
    }
}

/// A point-in-time copy of everything a client needs to render the wizard.
#[derive(Debug, Clone)]
pub struct WizardSnapshot {
    pub id: Uuid,
    pub user_id: Uuid,
    pub step: WizardStep,
    pub draft: OrderDraft,
    pub styles: Vec<PaintingStyle>,
    pub catalog_error: Option<String>,
    pub price: PriceBreakdown,
    pub preview_pending: bool,
    pub submitting: bool,
    pub order: Option<Order>,
}

struct WizardState {
    step: WizardStep,
    draft: OrderDraft,
    catalog: StyleCatalog,
    order: Option<Order>,
}

impl WizardState {
    fn ensure_open(&self) -> WizardResult<()> {
        if self.step.is_terminal() {
            return Err(WizardError::WizardClosed(self.step.name().to_string()));
        }
        Ok(())
    }

    fn selected_style(&self) -> Option<&PaintingStyle> {
        self.draft
            .style_id
            .as_deref()
            .and_then(|id| self.catalog.find(id))
    }
}

pub struct OrderWizard {
    id: Uuid,
    identity: Identity,
    ports: WizardPorts,
    state: Mutex<WizardState>,
    preview_in_flight: AtomicBool,
    submit_in_flight: AtomicBool,
    abandoned: CancellationToken,
}

impl OrderWizard {
    /// Opens a wizard for the session's user and loads the style catalog once.
    ///
    /// An unavailable catalog does not prevent the wizard from opening; the
    /// error is reported through `WizardSnapshot::catalog_error`.
    pub async fn start(context: &SessionContext, ports: WizardPorts) -> WizardResult<Self> {
        let identity = SessionGate::admit(context).await?;
        let catalog = StyleCatalog::load(ports.catalog.as_ref()).await;
        let id = Uuid::new_v4();
        info!(
            "Wizard {} started for user {} with {} styles.",
            id,
            identity.user_id,
            catalog.styles().len()
        );

        Ok(Self {
            id,
            identity,
            ports,
            state: Mutex::new(WizardState {
                step: WizardStep::StyleSelect,
                draft: OrderDraft::default(),
                catalog,
                order: None,
            }),
            preview_in_flight: AtomicBool::new(false),
            submit_in_flight: AtomicBool::new(false),
            abandoned: CancellationToken::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub async fn snapshot(&self) -> WizardSnapshot {
        let state = self.state.lock().await;
        WizardSnapshot {
            id: self.id,
            user_id: self.identity.user_id,
            step: state.step,
            draft: state.draft.clone(),
            styles: state.catalog.styles().to_vec(),
            catalog_error: state.catalog.unavailable().map(|e| e.to_string()),
            price: compute_price(state.draft.canvas_size, state.draft.is_rush),
            preview_pending: self.preview_in_flight.load(Ordering::Acquire),
            submitting: self.submit_in_flight.load(Ordering::Acquire),
            order: state.order.clone(),
        }
    }

    pub async fn current_step(&self) -> WizardStep {
        self.state.lock().await.step
    }

    /// Moves one step forward. A no-op on the review step.
    pub async fn next(&self) -> WizardResult<WizardStep> {
        let mut state = self.state.lock().await;
        state.ensure_open()?;
        state.step = state.step.forward();
        Ok(state.step)
    }

    /// Moves one step back, keeping every field. A no-op on the first step.
    pub async fn previous(&self) -> WizardResult<WizardStep> {
        let mut state = self.state.lock().await;
        state.ensure_open()?;
        state.step = state.step.back();
        Ok(state.step)
    }

    pub async fn update_draft(&self, update: DraftUpdate) -> WizardResult<OrderDraft> {
        let mut state = self.state.lock().await;
        state.ensure_open()?;

        if let Some(style_id) = update.style_id {
            let style_id = style_id.trim();
            if style_id.is_empty() {
                state.draft.style_id = None;
            } else if state.catalog.find(style_id).is_some() {
                state.draft.style_id = Some(style_id.to_string());
            } else {
                return Err(WizardError::InvalidInput(format!(
                    "style '{}' is not available",
                    style_id
                )));
            }
        }
        if let Some(canvas_size) = update.canvas_size {
            state.draft.canvas_size = canvas_size;
        }
        if let Some(material) = update.material {
            state.draft.material = material;
        }
        if let Some(is_rush) = update.is_rush {
            state.draft.is_rush = is_rush;
        }
        if let Some(notes) = update.customer_notes {
            state.draft.customer_notes = notes;
        }
        if let Some(prompt) = update.ai_prompt {
            state.draft.ai_prompt = prompt;
        }

        Ok(state.draft.clone())
    }

    pub async fn set_reference_image(&self, image: Option<ReferenceImage>) -> WizardResult<()> {
        let mut state = self.state.lock().await;
        state.ensure_open()?;
        state.draft.reference_image = image;
        Ok(())
    }

    /// Re-reads the catalog on the user's request.
    ///
    /// A failed reload keeps the styles already offered. A selected style that
    /// a successful reload no longer offers is cleared from the draft.
    pub async fn reload_styles(&self) -> WizardResult<Vec<PaintingStyle>> {
        self.state.lock().await.ensure_open()?;
        let fresh = StyleCatalog::load(self.ports.catalog.as_ref()).await;

        let mut state = self.state.lock().await;
        state.ensure_open()?;
        if let Some(e) = fresh.unavailable() {
            let e = e.clone();
            state.catalog.mark_unavailable(e.clone());
            return Err(e);
        }

        let withdrawn = state
            .draft
            .style_id
            .as_deref()
            .is_some_and(|id| fresh.find(id).is_none());
        if withdrawn {
            info!("Wizard {} cleared a style that is no longer offered.", self.id);
            state.draft.style_id = None;
        }
        let styles = fresh.styles().to_vec();
        state.catalog = fresh;
        Ok(styles)
    }

    /// Requests a preview for the current prompt text.
    ///
    /// Only one request may be outstanding per wizard. The draft's preview is
    /// replaced only on success.
    pub async fn generate_preview(&self) -> WizardResult<PreviewImage> {
        let _guard =
            InFlight::acquire(&self.preview_in_flight).ok_or(WizardError::PreviewInFlight)?;

        let prompt = {
            let state = self.state.lock().await;
            state.ensure_open()?;
            compose_prompt(&state.draft, state.selected_style())?
        };

        info!("Wizard {} requesting preview.", self.id);
        let result = self.ports.preview.generate_image(&prompt).await;

        let mut state = self.state.lock().await;
        if self.abandoned.is_cancelled() {
            info!("Wizard {} was abandoned while a preview was pending; dropping result.", self.id);
            return Err(WizardError::WizardClosed(WizardStep::Abandoned.name().to_string()));
        }

        match result {
            Ok(url) => {
                let preview = PreviewImage { url, prompt };
                state.ensure_open()?;
                state.draft.preview = Some(preview.clone());
                info!("Wizard {} preview ready.", self.id);
                Ok(preview)
            }
            Err(e) => {
                warn!("Wizard {} preview generation failed: {}", self.id, e);
                Err(WizardError::GenerationFailed(e.to_string()))
            }
        }
    }

    /// Persists the order. Only allowed on the review step, one call at a time.
    ///
    /// On failure the wizard stays on the review step with the draft intact.
    pub async fn submit(&self) -> WizardResult<Order> {
        let _guard =
            InFlight::acquire(&self.submit_in_flight).ok_or(WizardError::SubmitInFlight)?;

        let new_order = {
            let state = self.state.lock().await;
            state.ensure_open()?;
            if state.step != WizardStep::ReviewSubmit {
                return Err(WizardError::NotAtReview(state.step.name().to_string()));
            }
            self.build_order(&state.draft)
        };

        info!(
            "Wizard {} submitting order (total {}).",
            self.id, new_order.price.total_price
        );
        let result = self.ports.orders.create_order(new_order).await;

        let mut state = self.state.lock().await;
        if self.abandoned.is_cancelled() {
            warn!("Wizard {} was abandoned while submitting; ignoring the outcome.", self.id);
            return Err(WizardError::WizardClosed(WizardStep::Abandoned.name().to_string()));
        }

        match result {
            Ok(order) => {
                state.step = WizardStep::Submitted;
                state.order = Some(order.clone());
                info!("Wizard {} submitted order {}.", self.id, order.id);
                Ok(order)
            }
            Err(e) => {
                error!("Wizard {} failed to persist order: {}", self.id, e);
                Err(WizardError::OrderPersistFailed(e.to_string()))
            }
        }
    }

    /// Discards the wizard. Calls still in flight resolve without touching it.
    pub async fn abandon(&self) {
        let mut state = self.state.lock().await;
        if state.step.is_terminal() {
            return;
        }
        self.abandoned.cancel();
        state.step = WizardStep::Abandoned;
        info!("Wizard {} abandoned.", self.id);
    }

    fn build_order(&self, draft: &OrderDraft) -> NewOrder {
        let non_empty = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };

        NewOrder {
            user_id: self.identity.user_id,
            style_id: draft.style_id.clone(),
            canvas_size: draft.canvas_size,
            material: draft.material,
            ai_prompt: non_empty(&draft.ai_prompt),
            customer_notes: non_empty(&draft.customer_notes),
            preview_image_url: draft.preview.as_ref().map(|p| p.url.clone()),
            price: compute_price(draft.canvas_size, draft.is_rush),
            is_rush: draft.is_rush,
            status: OrderStatus::Previewed,
        }
    }
}
