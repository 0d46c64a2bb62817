use chrono::Utc;
use uuid::Uuid;

use better_view_api::invoice::{fmt_money, line_total, render_invoice};
use better_view_api::models::{Order, OrderItem};

fn fixture_order(total_price: i64) -> Order {
    Order {
        id: Uuid::new_v4(),
        customer_id: Uuid::new_v4(),
        customer_name: "Somchai".to_string(),
        customer_phone: Some("081-234-5678".to_string()),
        total_price,
        status: "pending".to_string(),
        payment_method: "cash".to_string(),
        created_at: Utc::now(),
    }
}

fn fixture_items(order: &Order, count: usize) -> Vec<OrderItem> {
    (0..count)
        .map(|i| OrderItem {
            id: Uuid::new_v4(),
            order_id: order.id,
            product_id: Uuid::new_v4(),
            product_name: format!("Item {i}"),
            image_url: None,
            quantity: 2,
            price: 5000,
        })
        .collect()
}

fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

#[test]
fn money_formats_as_two_decimals() {
    assert_eq!(fmt_money(5000), "50.00");
    assert_eq!(fmt_money(5), "0.05");
    assert_eq!(fmt_money(123_456), "1234.56");
    assert_eq!(fmt_money(0), "0.00");
    assert_eq!(fmt_money(-250), "-2.50");
}

#[test]
fn row_totals_multiply_snapshot_price() {
    assert_eq!(line_total(5000, 2), 10_000);
    assert_eq!(line_total(0, 10), 0);
    assert_eq!(line_total(333, 3), 999);
}

#[test]
fn renders_a_structurally_valid_pdf() {
    let order = fixture_order(10_000);
    let items = fixture_items(&order, 2);

    let bytes = render_invoice(&order, &items).expect("render");
    assert!(bytes.starts_with(b"%PDF"), "missing PDF header");
    assert!(count_occurrences(&bytes, b"%%EOF") >= 1, "missing PDF trailer");
}

// The footer prints the stored order total even when it disagrees with the
// sum of the rows; rendering must not fail or reconcile the numbers.
#[test]
fn renders_with_mismatched_stored_total() {
    let order = fixture_order(999);
    let items = fixture_items(&order, 3); // rows sum to 30000

    let bytes = render_invoice(&order, &items).expect("render");
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn renders_zero_item_invoice() {
    let order = fixture_order(0);
    let bytes = render_invoice(&order, &[]).expect("render");
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn long_item_lists_spill_onto_extra_pages() {
    let order = fixture_order(10_000);

    let small = render_invoice(&order, &fixture_items(&order, 2)).expect("render small");
    let large = render_invoice(&order, &fixture_items(&order, 150)).expect("render large");

    let small_pages = count_occurrences(&small, b"/Type /Page");
    let large_pages = count_occurrences(&large, b"/Type /Page");
    assert!(
        large_pages > small_pages,
        "expected overflow to add pages: {small_pages} vs {large_pages}"
    );
    assert!(large.len() > small.len());
}
