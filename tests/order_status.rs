use axum_petmarket_api::order_status::OrderStatus::{self, *};

#[test]
fn fulfilment_chain_is_accepted() {
    assert!(Pending.can_transition(Confirmed));
    assert!(Confirmed.can_transition(Shipping));
    assert!(Shipping.can_transition(Delivered));
    assert!(Delivered.can_transition(Completed));
}

#[test]
fn cancellation_only_before_shipping() {
    assert!(Pending.can_transition(Cancelled));
    assert!(Confirmed.can_transition(Cancelled));
    assert!(!Shipping.can_transition(Cancelled));
    assert!(!Delivered.can_transition(Cancelled));
    assert!(!Completed.can_transition(Cancelled));
    assert!(!Cancelled.can_transition(Cancelled));

    assert!(Pending.is_cancellable());
    assert!(Confirmed.is_cancellable());
    assert!(!Delivered.is_cancellable());
}

#[test]
fn everything_else_is_rejected() {
    assert!(!Pending.can_transition(Shipping));
    assert!(!Pending.can_transition(Delivered));
    assert!(!Pending.can_transition(Completed));
    assert!(!Confirmed.can_transition(Delivered));
    assert!(!Shipping.can_transition(Completed));
    assert!(!Completed.can_transition(Pending));
    assert!(!Cancelled.can_transition(Confirmed));
    // No self loops.
    for status in [Pending, Confirmed, Shipping, Delivered, Completed, Cancelled] {
        assert!(!status.can_transition(status));
    }
}

#[test]
fn status_strings_round_trip() {
    for status in [Pending, Confirmed, Shipping, Delivered, Completed, Cancelled] {
        assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(OrderStatus::parse("paid"), None);
}
