use axum_petmarket_api::pricing::{PricingConfig, items_price, order_total};

const PRICING: PricingConfig = PricingConfig {
    shipping_fee: 30_000,
    free_shipping_threshold: 500_000,
};

#[test]
fn items_price_sums_price_times_quantity() {
    assert_eq!(items_price(vec![]), 0);
    assert_eq!(items_price(vec![(100_000, 2)]), 200_000);
    assert_eq!(items_price(vec![(100_000, 2), (45_000, 3)]), 335_000);
}

#[test]
fn shipping_is_a_step_function() {
    assert_eq!(PRICING.shipping_fee_for(0), 30_000);
    assert_eq!(PRICING.shipping_fee_for(499_999), 30_000);
    assert_eq!(PRICING.shipping_fee_for(500_000), 0);
    assert_eq!(PRICING.shipping_fee_for(1_000_000), 0);
}

#[test]
fn total_is_clamped_at_zero() {
    // cart = [{price: 100000, qty: 2}], discount 1000000, shipping 30000 => 0
    let subtotal = items_price(vec![(100_000, 2)]);
    let shipping = PRICING.shipping_fee_for(subtotal);
    assert_eq!(shipping, 30_000);
    assert_eq!(order_total(subtotal, shipping, 1_000_000), 0);
}

#[test]
fn total_applies_discount_when_it_fits() {
    let subtotal = items_price(vec![(300_000, 2)]);
    let shipping = PRICING.shipping_fee_for(subtotal);
    assert_eq!(shipping, 0);
    assert_eq!(order_total(subtotal, shipping, 50_000), 550_000);
}
