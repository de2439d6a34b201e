//! End-to-end tests of the order wizard against in-memory ports.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{signed_in, signed_out, Harness, MockCatalog, MockOrders, MockPreview};
use painting_order_core::{
    CanvasSize, DraftUpdate, Material, OrderStatus, OrderWizard, WizardError, WizardStep,
};

async fn open(harness: &Harness) -> OrderWizard {
    OrderWizard::start(&signed_in(), harness.ports())
        .await
        .expect("wizard should open for a signed-in user")
}

async fn walk_to_review(wizard: &OrderWizard) {
    for _ in 0..4 {
        wizard.next().await.unwrap();
    }
    assert_eq!(wizard.current_step().await, WizardStep::ReviewSubmit);
}

#[tokio::test]
async fn unauthenticated_caller_cannot_open_wizard() {
    let harness = Harness::new(MockCatalog::with_styles(), MockPreview::immediate());

    let result = OrderWizard::start(&signed_out(), harness.ports()).await;

    assert!(matches!(result, Err(WizardError::Unauthenticated)));
    assert_eq!(harness.catalog.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unavailable_catalog_still_opens_at_first_step() {
    let harness = Harness::new(MockCatalog::failing(), MockPreview::immediate());

    let wizard = open(&harness).await;
    let snapshot = wizard.snapshot().await;

    assert_eq!(snapshot.step, WizardStep::StyleSelect);
    assert!(snapshot.styles.is_empty());
    assert!(snapshot.catalog_error.is_some());
}

#[tokio::test]
async fn manual_reload_recovers_catalog() {
    let harness = Harness::new(MockCatalog::failing(), MockPreview::immediate());
    let wizard = open(&harness).await;

    let err = wizard.reload_styles().await.unwrap_err();
    assert!(matches!(err, WizardError::CatalogUnavailable(_)));

    harness.catalog.fail.store(false, Ordering::SeqCst);
    let styles = wizard.reload_styles().await.unwrap();

    assert_eq!(styles.len(), 2);
    assert_eq!(harness.catalog.calls.load(Ordering::SeqCst), 3);
    assert!(wizard.snapshot().await.catalog_error.is_none());
}

#[tokio::test]
async fn failed_reload_keeps_offered_styles_and_selection() {
    let harness = Harness::new(MockCatalog::with_styles(), MockPreview::immediate());
    let wizard = open(&harness).await;
    wizard
        .update_draft(DraftUpdate {
            style_id: Some("impressionist".to_string()),
            customer_notes: Some("portrait in traditional dress".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    harness.catalog.fail.store(true, Ordering::SeqCst);
    let err = wizard.reload_styles().await.unwrap_err();
    assert!(matches!(err, WizardError::CatalogUnavailable(_)));

    let snapshot = wizard.snapshot().await;
    assert_eq!(snapshot.styles.len(), 2);
    assert!(snapshot.catalog_error.is_some());
    assert_eq!(snapshot.draft.style_id.as_deref(), Some("impressionist"));

    let preview = wizard.generate_preview().await.unwrap();
    assert!(preview.prompt.contains("Impressionist"));
}

#[tokio::test]
async fn reload_clears_a_style_that_was_withdrawn() {
    let harness = Harness::new(MockCatalog::with_styles(), MockPreview::immediate());
    let wizard = open(&harness).await;
    wizard
        .update_draft(DraftUpdate {
            style_id: Some("impressionist".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    harness
        .catalog
        .rows
        .lock()
        .unwrap()
        .retain(|row| row.id.as_deref() != Some("impressionist"));
    let styles = wizard.reload_styles().await.unwrap();
    assert_eq!(styles.len(), 1);

    let snapshot = wizard.snapshot().await;
    assert_eq!(snapshot.draft.style_id, None);
    assert!(snapshot.catalog_error.is_none());

    walk_to_review(&wizard).await;
    let order = wizard.submit().await.unwrap();
    assert_eq!(order.style_id, None);
}

#[tokio::test]
async fn cursor_never_leaves_the_five_steps() {
    let harness = Harness::new(MockCatalog::with_styles(), MockPreview::immediate());
    let wizard = open(&harness).await;

    for _ in 0..3 {
        assert_eq!(wizard.previous().await.unwrap(), WizardStep::StyleSelect);
    }
    for _ in 0..10 {
        wizard.next().await.unwrap();
    }
    assert_eq!(wizard.current_step().await, WizardStep::ReviewSubmit);
    assert_eq!(wizard.current_step().await.number(), Some(5));
}

#[tokio::test]
async fn backward_navigation_keeps_every_field() {
    let harness = Harness::new(MockCatalog::with_styles(), MockPreview::immediate());
    let wizard = open(&harness).await;

    wizard
        .update_draft(DraftUpdate {
            style_id: Some("miniature".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    wizard.next().await.unwrap();
    wizard
        .update_draft(DraftUpdate {
            customer_notes: Some("my grandparents' wedding photo".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    wizard.next().await.unwrap();
    wizard
        .update_draft(DraftUpdate {
            canvas_size: Some(CanvasSize::S4),
            material: Some(Material::Watercolor),
            ..Default::default()
        })
        .await
        .unwrap();

    wizard.previous().await.unwrap();
    wizard.previous().await.unwrap();

    let draft = wizard.snapshot().await.draft;
    assert_eq!(draft.style_id.as_deref(), Some("miniature"));
    assert_eq!(draft.customer_notes, "my grandparents' wedding photo");
    assert_eq!(draft.canvas_size, CanvasSize::S4);
    assert_eq!(draft.material, Material::Watercolor);
}

#[tokio::test]
async fn unknown_style_is_rejected_and_empty_id_clears_selection() {
    let harness = Harness::new(MockCatalog::with_styles(), MockPreview::immediate());
    let wizard = open(&harness).await;

    let err = wizard
        .update_draft(DraftUpdate {
            style_id: Some("cubism".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, WizardError::InvalidInput(_)));

    wizard
        .update_draft(DraftUpdate {
            style_id: Some("impressionist".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    let draft = wizard
        .update_draft(DraftUpdate {
            style_id: Some(String::new()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(draft.style_id, None);
}

#[tokio::test]
async fn empty_prompt_never_reaches_the_generator() {
    let harness = Harness::new(MockCatalog::with_styles(), MockPreview::immediate());
    let wizard = open(&harness).await;

    let err = wizard.generate_preview().await.unwrap_err();

    assert_eq!(err, WizardError::EmptyPrompt);
    assert_eq!(harness.preview.call_count(), 0);
}

#[tokio::test]
async fn notes_and_style_name_end_up_in_the_prompt() {
    let harness = Harness::new(MockCatalog::with_styles(), MockPreview::immediate());
    let wizard = open(&harness).await;

    wizard
        .update_draft(DraftUpdate {
            customer_notes: Some("portrait in traditional dress".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    wizard.generate_preview().await.unwrap();
    let unstyled = harness.preview.last_prompt().unwrap();
    assert!(unstyled.contains("portrait in traditional dress"));
    assert!(!unstyled.contains("Impressionist"));

    wizard
        .update_draft(DraftUpdate {
            style_id: Some("impressionist".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    let preview = wizard.generate_preview().await.unwrap();
    let styled = harness.preview.last_prompt().unwrap();
    assert!(styled.contains("portrait in traditional dress"));
    assert!(styled.contains("Impressionist"));
    assert_eq!(preview.prompt, styled);
}

#[tokio::test]
async fn second_preview_request_is_rejected_while_first_is_pending() {
    let harness = Harness::new(MockCatalog::with_styles(), MockPreview::gated());
    let wizard = Arc::new(open(&harness).await);
    wizard
        .update_draft(DraftUpdate {
            ai_prompt: Some("a quiet harbour at sunrise".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let pending = {
        let wizard = wizard.clone();
        tokio::spawn(async move { wizard.generate_preview().await })
    };
    harness.preview.started.notified().await;

    assert!(wizard.snapshot().await.preview_pending);
    assert_eq!(
        wizard.generate_preview().await.unwrap_err(),
        WizardError::PreviewInFlight
    );
    // Navigation is still possible while the request is outstanding.
    assert_eq!(wizard.next().await.unwrap(), WizardStep::Details);

    harness.preview.release.notify_one();
    let first = pending.await.unwrap().unwrap();
    assert_eq!(harness.preview.call_count(), 1);

    harness.preview.release.notify_one();
    let second = wizard.generate_preview().await.unwrap();
    assert_ne!(first.url, second.url);
    assert_eq!(harness.preview.call_count(), 2);
}

#[tokio::test]
async fn failed_generation_keeps_previous_preview() {
    let harness = Harness::new(MockCatalog::with_styles(), MockPreview::immediate());
    let wizard = open(&harness).await;
    wizard
        .update_draft(DraftUpdate {
            ai_prompt: Some("a cat on a rug".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    let first = wizard.generate_preview().await.unwrap();

    harness.preview.fail.store(true, Ordering::SeqCst);
    wizard
        .update_draft(DraftUpdate {
            ai_prompt: Some("a dog on a rug".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    let err = wizard.generate_preview().await.unwrap_err();

    assert!(matches!(err, WizardError::GenerationFailed(_)));
    let draft = wizard.snapshot().await.draft;
    assert_eq!(draft.preview, Some(first.clone()));
    assert!(first.prompt.contains("a cat on a rug"));

    harness.preview.fail.store(false, Ordering::SeqCst);
    let retried = wizard.generate_preview().await.unwrap();
    assert!(retried.prompt.contains("a dog on a rug"));
}

#[tokio::test]
async fn size_chosen_at_specs_step_prices_the_review() {
    let harness = Harness::new(MockCatalog::with_styles(), MockPreview::immediate());
    let wizard = open(&harness).await;

    wizard
        .update_draft(DraftUpdate {
            style_id: Some("impressionist".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    wizard.next().await.unwrap();
    wizard.next().await.unwrap();
    wizard
        .update_draft(DraftUpdate {
            canvas_size: Some(CanvasSize::S2),
            is_rush: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();
    wizard.next().await.unwrap();
    wizard.next().await.unwrap();

    let snapshot = wizard.snapshot().await;
    assert_eq!(snapshot.step, WizardStep::ReviewSubmit);
    assert_eq!(snapshot.price.base_price, 800_000);
    assert_eq!(snapshot.price.rush_fee, 300_000);
    assert_eq!(snapshot.price.total_price, 1_100_000);
}

#[tokio::test]
async fn submit_is_only_allowed_on_review_step() {
    let harness = Harness::new(MockCatalog::with_styles(), MockPreview::immediate());
    let wizard = open(&harness).await;

    let err = wizard.submit().await.unwrap_err();

    assert!(matches!(err, WizardError::NotAtReview(_)));
    assert!(harness.orders.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn successful_submit_persists_one_previewed_order() {
    let harness = Harness::new(MockCatalog::with_styles(), MockPreview::immediate());
    let wizard = open(&harness).await;
    wizard
        .update_draft(DraftUpdate {
            style_id: Some("impressionist".to_string()),
            is_rush: Some(true),
            ai_prompt: Some("sunflowers in a blue vase".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    let preview = wizard.generate_preview().await.unwrap();
    walk_to_review(&wizard).await;

    let order = wizard.submit().await.unwrap();

    assert_eq!(order.status, OrderStatus::Previewed);
    assert_eq!(order.user_id, wizard.identity().user_id);
    assert_eq!(order.price.total_price, 1_100_000);
    assert_eq!(order.preview_image_url, Some(preview.url));
    assert_eq!(order.customer_notes, None);
    assert_eq!(harness.orders.created.lock().unwrap().len(), 1);
    assert_eq!(wizard.current_step().await, WizardStep::Submitted);

    assert!(matches!(
        wizard.next().await,
        Err(WizardError::WizardClosed(_))
    ));
}

#[tokio::test]
async fn store_failure_leaves_draft_intact_on_review_step() {
    let harness = Harness::new(MockCatalog::with_styles(), MockPreview::immediate());
    let wizard = open(&harness).await;
    wizard
        .update_draft(DraftUpdate {
            style_id: Some("miniature".to_string()),
            canvas_size: Some(CanvasSize::S3),
            material: Some(Material::Acrylic),
            customer_notes: Some("two children in a garden".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    walk_to_review(&wizard).await;
    let before = wizard.snapshot().await.draft;

    harness.orders.fail.store(true, Ordering::SeqCst);
    let err = wizard.submit().await.unwrap_err();

    assert!(matches!(err, WizardError::OrderPersistFailed(_)));
    let after = wizard.snapshot().await;
    assert_eq!(after.step, WizardStep::ReviewSubmit);
    assert_eq!(after.draft, before);
    assert!(!after.submitting);

    harness.orders.fail.store(false, Ordering::SeqCst);
    let order = wizard.submit().await.unwrap();
    assert_eq!(order.canvas_size, CanvasSize::S3);
}

#[tokio::test]
async fn abandoned_wizard_ignores_late_preview() {
    let harness = Harness::new(MockCatalog::with_styles(), MockPreview::gated());
    let wizard = Arc::new(open(&harness).await);
    wizard
        .update_draft(DraftUpdate {
            ai_prompt: Some("mountains under snow".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let pending = {
        let wizard = wizard.clone();
        tokio::spawn(async move { wizard.generate_preview().await })
    };
    harness.preview.started.notified().await;

    wizard.abandon().await;
    harness.preview.release.notify_one();

    let outcome = pending.await.unwrap();
    assert!(matches!(outcome, Err(WizardError::WizardClosed(_))));
    let snapshot = wizard.snapshot().await;
    assert_eq!(snapshot.step, WizardStep::Abandoned);
    assert_eq!(snapshot.draft.preview, None);
}

#[tokio::test]
async fn second_submit_is_rejected_while_first_is_pending() {
    let harness = Harness::with_orders(
        MockCatalog::with_styles(),
        MockPreview::immediate(),
        MockOrders::gated(),
    );
    let wizard = Arc::new(open(&harness).await);
    walk_to_review(&wizard).await;
    harness.orders.fail.store(true, Ordering::SeqCst);

    let pending = {
        let wizard = wizard.clone();
        tokio::spawn(async move { wizard.submit().await })
    };
    harness.orders.started.notified().await;

    assert!(wizard.snapshot().await.submitting);
    assert_eq!(wizard.submit().await.unwrap_err(), WizardError::SubmitInFlight);
    assert_eq!(harness.orders.attempts.load(Ordering::SeqCst), 1);

    harness.orders.release.notify_one();
    let first = pending.await.unwrap();
    assert!(matches!(first, Err(WizardError::OrderPersistFailed(_))));
    assert_eq!(wizard.current_step().await, WizardStep::ReviewSubmit);
    assert!(!wizard.snapshot().await.submitting);

    // A failed submission frees the slot for a retry.
    harness.orders.fail.store(false, Ordering::SeqCst);
    harness.orders.release.notify_one();
    wizard.submit().await.unwrap();

    assert_eq!(harness.orders.attempts.load(Ordering::SeqCst), 2);
    assert_eq!(harness.orders.insert_count(), 1);
    assert_eq!(wizard.current_step().await, WizardStep::Submitted);
}

#[tokio::test]
async fn abandoned_wizard_ignores_late_submit() {
    let harness = Harness::with_orders(
        MockCatalog::with_styles(),
        MockPreview::immediate(),
        MockOrders::gated(),
    );
    let wizard = Arc::new(open(&harness).await);
    walk_to_review(&wizard).await;

    let pending = {
        let wizard = wizard.clone();
        tokio::spawn(async move { wizard.submit().await })
    };
    harness.orders.started.notified().await;

    wizard.abandon().await;
    harness.orders.release.notify_one();

    let outcome = pending.await.unwrap();
    assert!(matches!(outcome, Err(WizardError::WizardClosed(_))));
    let snapshot = wizard.snapshot().await;
    assert_eq!(snapshot.step, WizardStep::Abandoned);
    assert!(snapshot.order.is_none());
    // The store already accepted the row; only the wizard ignores it.
    assert_eq!(harness.orders.insert_count(), 1);
}
