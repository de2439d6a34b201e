//! crates/painting_order_core/src/session.rs
//!
//! The explicit session context and the gate that guards entry into the wizard.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::Identity;
use crate::error::{WizardError, WizardResult};
use crate::ports::{IdentityProvider, PortResult};

/// A session context, created when a session is established and consumed by sign-out.
///
/// Components receive this object instead of looking the identity up ambiently.
#[derive(Clone)]
pub struct SessionContext {
    provider: Arc<dyn IdentityProvider>,
}

impl SessionContext {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    pub async fn current_user(&self) -> PortResult<Option<Identity>> {
        self.provider.current_user().await
    }

    /// Tears the session down. The context cannot be used afterwards.
    pub async fn sign_out(self) -> PortResult<()> {
        self.provider.sign_out().await
    }
}

pub struct SessionGate;

impl SessionGate {
    /// Admits the caller if the context carries an authenticated identity.
    ///
    /// A failing identity lookup is treated the same as no identity.
    pub async fn admit(context: &SessionContext) -> WizardResult<Identity> {
        match context.current_user().await {
            Ok(Some(identity)) => {
                info!("Session gate admitted user {}", identity.user_id);
                Ok(identity)
            }
            Ok(None) => Err(WizardError::Unauthenticated),
            Err(e) => {
                warn!("Identity lookup failed: {}", e);
                Err(WizardError::Unauthenticated)
            }
        }
    }
}
