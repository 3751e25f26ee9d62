//! Percent-change indicator.
//!
//! pct_change(W) = 100 * (last - ref) / ref, where ref sits W samples before
//! the last element of the series. Undefined (None) when the series is too
//! short for the window or the reference price is zero.

use crate::domain::price::PriceSample;

pub fn pct_change(prices: &[PriceSample], window_hours: u32) -> Option<f64> {
    let window = window_hours as usize;
    if prices.len() <= window {
        return None;
    }
    let last = prices[prices.len() - 1].price;
    let reference = prices[prices.len() - 1 - window].price;
    if reference == 0.0 {
        return None;
    }
    Some(100.0 * (last - reference) / reference)
}
