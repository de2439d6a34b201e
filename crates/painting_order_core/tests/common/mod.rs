//! In-memory ports for driving the wizard in tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use painting_order_core::{
    Identity, IdentityProvider, NewOrder, Order, OrderStore, PortError, PortResult,
    PreviewGenerationService, SessionContext, StyleCatalogService, StyleRecord, WizardPorts,
};
use tokio::sync::Notify;
use uuid::Uuid;

pub struct SignedIn(pub Option<Identity>);

#[async_trait]
impl IdentityProvider for SignedIn {
    async fn current_user(&self) -> PortResult<Option<Identity>> {
        Ok(self.0.clone())
    }

    async fn sign_out(&self) -> PortResult<()> {
        Ok(())
    }
}

pub fn signed_in() -> SessionContext {
    SessionContext::new(Arc::new(SignedIn(Some(Identity {
        user_id: Uuid::new_v4(),
        email: Some("customer@example.com".to_string()),
    }))))
}

pub fn signed_out() -> SessionContext {
    SessionContext::new(Arc::new(SignedIn(None)))
}

pub struct MockCatalog {
    pub rows: Mutex<Vec<StyleRecord>>,
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
}

impl MockCatalog {
    pub fn with_styles() -> Self {
        Self {
            rows: Mutex::new(vec![
                style_row("impressionist", "امپرسیونیسم", "Impressionist"),
                style_row("miniature", "مینیاتور", "Persian Miniature"),
            ]),
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        let catalog = Self::with_styles();
        catalog.fail.store(true, Ordering::SeqCst);
        catalog
    }
}

fn style_row(id: &str, name: &str, name_en: &str) -> StyleRecord {
    StyleRecord {
        id: Some(id.to_string()),
        name: Some(name.to_string()),
        name_en: Some(name_en.to_string()),
        description: Some(format!("{} paintings", name_en)),
        is_active: Some(true),
    }
}

#[async_trait]
impl StyleCatalogService for MockCatalog {
    async fn fetch_active_styles(&self) -> PortResult<Vec<StyleRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("catalog offline".to_string()));
        }
        Ok(self.rows.lock().unwrap().clone())
    }
}

/// A preview service that records prompts and can hold calls open until released.
pub struct MockPreview {
    pub prompts: Mutex<Vec<String>>,
    pub fail: AtomicBool,
    pub gated: bool,
    pub started: Notify,
    pub release: Notify,
}

impl MockPreview {
    pub fn immediate() -> Self {
        Self::new(false)
    }

    pub fn gated() -> Self {
        Self::new(true)
    }

    fn new(gated: bool) -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
            gated,
            started: Notify::new(),
            release: Notify::new(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PreviewGenerationService for MockPreview {
    async fn generate_image(&self, prompt: &str) -> PortResult<String> {
        let n = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            prompts.len()
        };
        self.started.notify_one();
        if self.gated {
            self.release.notified().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("model overloaded".to_string()));
        }
        Ok(format!("https://previews.example.com/{}.png", n))
    }
}

/// An order store that records inserts and can hold calls open until released.
pub struct MockOrders {
    pub created: Mutex<Vec<NewOrder>>,
    pub attempts: AtomicUsize,
    pub fail: AtomicBool,
    pub gated: bool,
    pub started: Notify,
    pub release: Notify,
}

impl MockOrders {
    pub fn immediate() -> Self {
        Self::new(false)
    }

    pub fn gated() -> Self {
        Self::new(true)
    }

    fn new(gated: bool) -> Self {
        Self {
            created: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            gated,
            started: Notify::new(),
            release: Notify::new(),
        }
    }

    pub fn insert_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }
}

#[async_trait]
impl OrderStore for MockOrders {
    async fn create_order(&self, order: NewOrder) -> PortResult<Order> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        if self.gated {
            self.release.notified().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("insert failed".to_string()));
        }
        self.created.lock().unwrap().push(order.clone());
        Ok(Order {
            id: Uuid::new_v4(),
            user_id: order.user_id,
            style_id: order.style_id,
            canvas_size: order.canvas_size,
            material: order.material,
            ai_prompt: order.ai_prompt,
            customer_notes: order.customer_notes,
            preview_image_url: order.preview_image_url,
            price: order.price,
            is_rush: order.is_rush,
            status: order.status,
            created_at: Utc::now(),
        })
    }
}

pub struct Harness {
    pub catalog: Arc<MockCatalog>,
    pub preview: Arc<MockPreview>,
    pub orders: Arc<MockOrders>,
}

impl Harness {
    pub fn new(catalog: MockCatalog, preview: MockPreview) -> Self {
        Self::with_orders(catalog, preview, MockOrders::immediate())
    }

    pub fn with_orders(catalog: MockCatalog, preview: MockPreview, orders: MockOrders) -> Self {
        Self {
            catalog: Arc::new(catalog),
            preview: Arc::new(preview),
            orders: Arc::new(orders),
        }
    }

    pub fn ports(&self) -> WizardPorts {
        WizardPorts {
            catalog: self.catalog.clone(),
            preview: self.preview.clone(),
            orders: self.orders.clone(),
        }
    }
}
