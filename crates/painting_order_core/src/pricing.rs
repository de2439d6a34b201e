//! crates/painting_order_core/src/pricing.rs
//!
//! Deterministic pricing of a painting from its canvas size and rush flag.
//! Amounts are in toman.

use crate::domain::{CanvasSize, PriceBreakdown};
use crate::error::WizardResult;

/// Flat surcharge for rush orders.
pub const RUSH_FEE: u64 = 300_000;

pub fn base_price(size: CanvasSize) -> u64 {
    match size {
        CanvasSize::S1 => 500_000,
        CanvasSize::S2 => 800_000,
        CanvasSize::S3 => 1_200_000,
        CanvasSize::S4 => 1_800_000,
    }
}

pub fn compute_price(size: CanvasSize, is_rush: bool) -> PriceBreakdown {
    let base_price = base_price(size);
    let rush_fee = if is_rush { RUSH_FEE } else { 0 };
    PriceBreakdown {
        base_price,
        rush_fee,
        total_price: base_price + rush_fee,
    }
}

/// Prices a size given by its label, e.g. `"50x70"`.
///
/// Unknown labels are rejected with `WizardError::InvalidInput`.
pub fn compute_price_for_label(size: &str, is_rush: bool) -> WizardResult<PriceBreakdown> {
    let size = size.parse::<CanvasSize>()?;
    Ok(compute_price(size, is_rush))
}
