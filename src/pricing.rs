//! Order pricing: items subtotal, step-function shipping and the clamped total.

/// Shipping knobs, loaded from the environment by `AppConfig`.
#[derive(Debug, Clone, Copy)]
pub struct PricingConfig {
    pub shipping_fee: i64,
    pub free_shipping_threshold: i64,
}

impl PricingConfig {
    /// Flat fee below the threshold, free at or above it.
    pub fn shipping_fee_for(&self, items_price: i64) -> i64 {
        if items_price >= self.free_shipping_threshold {
            0
        } else {
            self.shipping_fee
        }
    }
}

/// Sum of `price * quantity` over cart lines. 0 for the empty cart.
pub fn items_price<I>(lines: I) -> i64
where
    I: IntoIterator<Item = (i64, i32)>,
{
    lines
        .into_iter()
        .map(|(price, quantity)| price * quantity as i64)
        .sum()
}

/// Final order total, never negative even when the discount exceeds
/// subtotal plus shipping.
pub fn order_total(items_price: i64, shipping_fee: i64, discount: i64) -> i64 {
    (items_price + shipping_fee - discount).max(0)
}
