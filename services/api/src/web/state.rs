//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the registry of open wizards.

use crate::accounts::AccountStore;
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use painting_order_core::{OrderWizard, WizardPorts};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub ports: WizardPorts,
    pub config: Arc<Config>,
    pub wizards: Arc<WizardRegistry>,
}

//=========================================================================================
// WizardRegistry (In-Memory Wizard Instances)
//=========================================================================================

struct RegisteredWizard {
    wizard: Arc<OrderWizard>,
    last_touched: Instant,
}

/// Open wizards, keyed by id. Each is visible only to the user who opened it.
///
/// Wizards that nobody has touched for `idle_timeout` are abandoned and
/// dropped, and a user may hold at most `max_per_user` open wizards.
pub struct WizardRegistry {
    wizards: RwLock<HashMap<Uuid, RegisteredWizard>>,
    idle_timeout: Duration,
    max_per_user: usize,
}

impl WizardRegistry {
    pub fn new(idle_timeout: Duration, max_per_user: usize) -> Self {
        Self {
            wizards: RwLock::new(HashMap::new()),
            idle_timeout,
            max_per_user,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.wizard_idle_timeout, config.max_wizards_per_user)
    }

    /// Registers a freshly started wizard after evicting idle ones.
    pub async fn insert(&self, wizard: OrderWizard) -> ApiResult<Arc<OrderWizard>> {
        self.evict_idle().await;

        let owner = wizard.identity().user_id;
        let mut wizards = self.wizards.write().await;
        let open = wizards
            .values()
            .filter(|entry| entry.wizard.identity().user_id == owner)
            .count();
        if open >= self.max_per_user {
            warn!("User {} already has {} open wizards.", owner, open);
            return Err(ApiError::TooManyWizards(self.max_per_user));
        }

        let wizard = Arc::new(wizard);
        wizards.insert(
            wizard.id(),
            RegisteredWizard {
                wizard: wizard.clone(),
                last_touched: Instant::now(),
            },
        );
        Ok(wizard)
    }

    /// Looks a wizard up for its owner and marks it as used. Other users get `NotFound`.
    pub async fn get(&self, id: Uuid, user_id: Uuid) -> ApiResult<Arc<OrderWizard>> {
        let mut wizards = self.wizards.write().await;
        let entry = wizards
            .get_mut(&id)
            .filter(|entry| entry.wizard.identity().user_id == user_id)
            .ok_or_else(|| ApiError::NotFound(format!("wizard {}", id)))?;
        entry.last_touched = Instant::now();
        Ok(entry.wizard.clone())
    }

    pub async fn remove(&self, id: Uuid) -> Option<Arc<OrderWizard>> {
        self.wizards.write().await.remove(&id).map(|entry| entry.wizard)
    }

    pub async fn len(&self) -> usize {
        self.wizards.read().await.len()
    }

    /// Abandons and drops every wizard idle for longer than the timeout.
    /// Returns how many were evicted.
    pub async fn evict_idle(&self) -> usize {
        let expired: Vec<Arc<OrderWizard>> = {
            let mut wizards = self.wizards.write().await;
            let ids: Vec<Uuid> = wizards
                .iter()
                .filter(|(_, entry)| entry.last_touched.elapsed() >= self.idle_timeout)
                .map(|(id, _)| *id)
                .collect();
            ids.iter()
                .filter_map(|id| wizards.remove(id))
                .map(|entry| entry.wizard)
                .collect()
        };

        // Abandoning outside the map lock; late preview or submit results become no-ops.
        for wizard in &expired {
            wizard.abandon().await;
        }
        if !expired.is_empty() {
            info!("Evicted {} idle wizards.", expired.len());
        }
        expired.len()
    }

    /// Runs `evict_idle` on a fixed period for the lifetime of the process.
    pub fn spawn_idle_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                self.evict_idle().await;
            }
        })
    }
}
