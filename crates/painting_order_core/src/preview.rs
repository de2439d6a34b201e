//! crates/painting_order_core/src/preview.rs
//!
//! Prompt composition for preview generation and the single-flight guard
//! shared by the wizard's external calls.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::{OrderDraft, PaintingStyle};
use crate::error::{WizardError, WizardResult};

const QUALITY_SUFFIX: &str = "high quality, detailed artwork";

/// Picks the text to send: the AI prompt when it is not blank, otherwise the notes.
pub fn resolve_prompt_text(draft: &OrderDraft) -> WizardResult<&str> {
    let ai_prompt = draft.ai_prompt.trim();
    if !ai_prompt.is_empty() {
        return Ok(ai_prompt);
    }
    let notes = draft.customer_notes.trim();
    if !notes.is_empty() {
        return Ok(notes);
    }
    Err(WizardError::EmptyPrompt)
}

/// Builds the prompt sent to the generation service.
pub fn compose_prompt(draft: &OrderDraft, style: Option<&PaintingStyle>) -> WizardResult<String> {
    let text = resolve_prompt_text(draft)?;
    Ok(match style {
        Some(style) => format!(
            "{}, {} style painting, {}",
            text, style.english_name, QUALITY_SUFFIX
        ),
        None => format!("{}, {}", text, QUALITY_SUFFIX),
    })
}

/// Holds a flag for as long as one external call is outstanding.
///
/// The flag is released on drop, so a cancelled or failed call frees it too.
pub(crate) struct InFlight<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlight<'a> {
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
