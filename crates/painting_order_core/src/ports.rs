//! crates/painting_order_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the ordering workflow.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the identity provider, the catalog database, the image
//! generation service and the order store.

use async_trait::async_trait;

use crate::domain::{Identity, NewOrder, Order};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// A style row exactly as the catalog returns it, before validation.
#[derive(Debug, Clone, Default)]
pub struct StyleRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub name_en: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the signed-in user, or `None` when there is no valid session.
    async fn current_user(&self) -> PortResult<Option<Identity>>;

    /// Ends the session behind this provider.
    async fn sign_out(&self) -> PortResult<()>;
}

#[async_trait]
pub trait StyleCatalogService: Send + Sync {
    /// Fetches the active style rows in catalog order.
    async fn fetch_active_styles(&self) -> PortResult<Vec<StyleRecord>>;
}

#[async_trait]
pub trait PreviewGenerationService: Send + Sync {
    /// Turns a fully composed prompt into a reference (URL) to a generated image.
    async fn generate_image(&self, prompt: &str) -> PortResult<String>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts a single order row and returns it with its assigned id.
    async fn create_order(&self, order: NewOrder) -> PortResult<Order>;
}
