use std::str::FromStr;

use better_view_api::models::OrderStatus;

#[test]
fn parses_known_statuses() {
    assert_eq!(OrderStatus::from_str("pending").unwrap(), OrderStatus::Pending);
    assert_eq!(OrderStatus::from_str("paid").unwrap(), OrderStatus::Paid);
    assert_eq!(
        OrderStatus::from_str("cancelled").unwrap(),
        OrderStatus::Cancelled
    );
}

#[test]
fn rejects_unknown_status() {
    assert!(OrderStatus::from_str("shipped").is_err());
    assert!(OrderStatus::from_str("Paid").is_err());
    assert!(OrderStatus::from_str("").is_err());
}

#[test]
fn pending_is_the_only_mutable_state() {
    assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Paid));
    assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));

    assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));
    assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Pending));
    assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Cancelled));
    assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Paid));
    assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Pending));
}

#[test]
fn serde_uses_lowercase_tokens() {
    let status: OrderStatus = serde_json::from_str("\"paid\"").unwrap();
    assert_eq!(status, OrderStatus::Paid);
    assert_eq!(serde_json::to_string(&OrderStatus::Cancelled).unwrap(), "\"cancelled\"");
    assert!(serde_json::from_str::<OrderStatus>("\"shipped\"").is_err());
}

#[test]
fn display_matches_storage_form() {
    assert_eq!(OrderStatus::Pending.to_string(), "pending");
    assert_eq!(OrderStatus::Paid.as_str(), "paid");
}
