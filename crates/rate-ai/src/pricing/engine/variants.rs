use crate::pricing::domain::ConfidenceBand;

/// Round to 2 decimal places. Applied only at output boundaries (final
/// price, grid, band), never inside the multiplicative chain, so rounding
/// error cannot compound across stages.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Derive the ordered price grid from the bounded, unrounded price.
///
/// Rounding happens per entry after all arithmetic. The running maximum over
/// the unrounded values guarantees a non-decreasing grid even if a degenerate
/// step table or tiny price magnitude would otherwise let rounding introduce
/// an inversion; because rounding is monotone, the middle entry still equals
/// the rounded recommended price.
pub(crate) fn price_grid(price: f64, steps: &[f64; 5]) -> Vec<f64> {
    let mut grid = Vec::with_capacity(steps.len());
    let mut running_max = f64::NEG_INFINITY;
    for step in steps {
        running_max = running_max.max(price * step);
        grid.push(round2(running_max));
    }
    grid
}

pub(crate) fn confidence_band(price: f64, spread: f64) -> ConfidenceBand {
    ConfidenceBand {
        lower: round2(price * (1.0 - spread)),
        upper: round2(price * (1.0 + spread)),
    }
}
