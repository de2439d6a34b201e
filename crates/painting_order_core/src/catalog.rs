//! crates/painting_order_core/src/catalog.rs
//!
//! Loads the selectable painting styles once per wizard and validates each
//! catalog row into a `PaintingStyle`.

use tracing::{info, warn};

use crate::domain::PaintingStyle;
use crate::error::{WizardError, WizardResult};
use crate::ports::{StyleCatalogService, StyleRecord};

impl TryFrom<StyleRecord> for PaintingStyle {
    type Error = String;

    fn try_from(record: StyleRecord) -> Result<Self, Self::Error> {
        let id = non_blank(record.id).ok_or("missing id")?;
        let localized_name =
            non_blank(record.name).ok_or_else(|| format!("style {} has no name", id))?;
        let english_name =
            non_blank(record.name_en).ok_or_else(|| format!("style {} has no english name", id))?;
        let is_active = record
            .is_active
            .ok_or_else(|| format!("style {} has no active flag", id))?;

        Ok(PaintingStyle {
            id,
            localized_name,
            english_name,
            description: record.description.unwrap_or_default(),
            is_active,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Fetches the active styles, dropping rows that are inactive or malformed.
pub async fn load_active_styles(
    source: &dyn StyleCatalogService,
) -> WizardResult<Vec<PaintingStyle>> {
    let records = source.fetch_active_styles().await.map_err(|e| {
        warn!("Style catalog could not be loaded: {}", e);
        WizardError::CatalogUnavailable(e.to_string())
    })?;

    let total = records.len();
    let styles: Vec<PaintingStyle> = records
        .into_iter()
        .filter_map(|record| match PaintingStyle::try_from(record) {
            Ok(style) => Some(style),
            Err(reason) => {
                warn!("Skipping malformed style row: {}", reason);
                None
            }
        })
        .filter(|style| style.is_active)
        .collect();

    info!("Loaded {} of {} style rows from the catalog.", styles.len(), total);
    Ok(styles)
}

/// The styles offered by one wizard, plus the outcome of the last load.
#[derive(Debug, Clone, Default)]
pub struct StyleCatalog {
    styles: Vec<PaintingStyle>,
    unavailable: Option<WizardError>,
}

impl StyleCatalog {
    /// Loads the catalog. A failed load yields an empty catalog that remembers
    /// the `CatalogUnavailable` error so the caller can report it.
    pub async fn load(source: &dyn StyleCatalogService) -> Self {
        match load_active_styles(source).await {
            Ok(styles) => Self {
                styles,
                unavailable: None,
            },
            Err(e) => Self {
                styles: Vec::new(),
                unavailable: Some(e),
            },
        }
    }

    pub fn styles(&self) -> &[PaintingStyle] {
        &self.styles
    }

    pub fn find(&self, style_id: &str) -> Option<&PaintingStyle> {
        self.styles.iter().find(|s| s.id == style_id)
    }

    pub fn unavailable(&self) -> Option<&WizardError> {
        self.unavailable.as_ref()
    }

    /// Records a failed reload without discarding the styles already loaded.
    pub fn mark_unavailable(&mut self, error: WizardError) {
        self.unavailable = Some(error);
    }
}
