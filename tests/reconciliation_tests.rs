mod common;

use chrono::{Duration, Utc};
use common::*;
use donation_intake::domain::ports::InvoiceStore;
use donation_intake::error::IntakeError;
use donation_intake::infrastructure::in_memory::InMemoryBackend;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_matching_sponsorship_payment_merges_fund_and_waits_for_payment() {
    let backend = InMemoryBackend::from_seed(seed(
        1,
        vec![sponsorship_invoice(1, vec![sponsorship_line(1, dec!(42))])],
    ));
    let intake = intake(&backend);
    let now = Utc::now();

    let mut payload = sponsorship_payload(&[(1, dec!(42))]);
    payload.fund_products = vec![FUND_TEMPLATE];
    payload.fund_amounts = vec![amount(dec!(8))];
    let ack = intake.post_invoice_at(payload, now).await.unwrap();
    assert_eq!(ack.donations, vec![1]);

    let invoice = backend.ledger.get(1).await.unwrap().unwrap();
    assert_eq!(invoice.lines.len(), 2);
    assert_eq!(invoice.amount_total(), amount(dec!(50)));

    // Sponsorship invoices never trigger the donation notification.
    assert!(backend.notifier.sent().await.is_empty());
    assert_eq!(intake.confirm_payment(1).await.unwrap(), None);
    assert!(backend.notifier.sent().await.is_empty());

    intake.run_due_jobs(now + Duration::minutes(30)).await.unwrap();
    let invoice = backend.ledger.get(1).await.unwrap().unwrap();
    assert_eq!(invoice.lines.len(), 2);
}

#[tokio::test]
async fn test_fifty_for_one_sponsorship_reuses_open_invoice() {
    let backend = InMemoryBackend::from_seed(seed(
        1,
        vec![sponsorship_invoice(1, vec![sponsorship_line(1, dec!(50))])],
    ));
    let intake = intake(&backend);

    let ack = intake
        .post_invoice(sponsorship_payload(&[(1, dec!(50))]))
        .await
        .unwrap();

    assert_eq!(ack.donations, vec![1]);
    assert_eq!(backend.ledger.all_invoices().await.unwrap().len(), 1);
    assert!(backend.jobs.pending().await.is_empty());
    assert!(backend.notifier.sent().await.is_empty());
}

#[tokio::test]
async fn test_fund_only_donation_creates_new_invoice() {
    let backend = InMemoryBackend::from_seed(seed(
        1,
        vec![sponsorship_invoice(1, vec![sponsorship_line(1, dec!(50))])],
    ));
    let intake = intake(&backend);

    let payload = serde_json::from_str(
        r#"{"supporter": "100", "appealtype": [30, 30], "appealamount": ["10", 15.5]}"#,
    )
    .unwrap();
    let ack = intake.post_invoice(payload).await.unwrap();

    assert_eq!(ack.donations, vec![2]);
    let invoice = backend.ledger.get(2).await.unwrap().unwrap();
    assert_eq!(invoice.amount_total(), amount(dec!(25.5)));
    assert_eq!(invoice.payment_reference.as_deref(), Some("Mobile APP donation-iOS"));
    // The open sponsorship invoice is left alone.
    let sponsorship = backend.ledger.get(1).await.unwrap().unwrap();
    assert_eq!(sponsorship.lines.len(), 1);
}

#[tokio::test]
async fn test_paid_fund_invoice_notifies_exactly_once() {
    let backend = InMemoryBackend::from_seed(seed(1, Vec::new()));
    let intake = intake(&backend);

    let payload = serde_json::from_str(
        r#"{"supporter": 100, "appealtype": [30], "appealamount": [25]}"#,
    )
    .unwrap();
    let ack = intake.post_invoice(payload).await.unwrap();
    let invoice_id = ack.donations[0];

    assert_eq!(intake.confirm_payment(invoice_id).await.unwrap(), Some(1));
    assert_eq!(intake.confirm_payment(invoice_id).await.unwrap(), None);
    assert_eq!(intake.send_mobile_notification(invoice_id).await.unwrap(), None);

    let sent = backend.notifier.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].draft.title, "You gave CHF 25.- for Water fund");
    assert_eq!(sent[0].draft.invoice_id, invoice_id);
}

#[tokio::test]
async fn test_two_sponsorships_on_one_invoice() {
    let backend = InMemoryBackend::from_seed(seed(
        2,
        vec![sponsorship_invoice(
            1,
            vec![sponsorship_line(1, dec!(50)), sponsorship_line(2, dec!(50))],
        )],
    ));
    let intake = intake(&backend);

    let ack = intake
        .post_invoice(sponsorship_payload(&[(2, dec!(50)), (1, dec!(50))]))
        .await
        .unwrap();
    assert_eq!(ack.donations, vec![1]);

    let partial = intake
        .post_invoice(sponsorship_payload(&[(1, dec!(100))]))
        .await;
    assert!(matches!(partial, Err(IntakeError::SponsorshipMismatch)));
}

#[tokio::test]
async fn test_sponsorship_payment_generates_due_invoice() {
    let mut ledger = seed(1, Vec::new());
    ledger.contracts[0].monthly_amount = amount(dec!(42));
    let backend = InMemoryBackend::from_seed(ledger);
    let intake = intake(&backend);

    let ack = intake
        .post_invoice(sponsorship_payload(&[(1, dec!(42))]))
        .await
        .unwrap();

    assert_eq!(ack.donations, vec![1]);
    let invoice = backend.ledger.get(1).await.unwrap().unwrap();
    assert!(invoice.is_open());
    assert_eq!(invoice.contract_ids().into_iter().collect::<Vec<_>>(), vec![1]);
}

#[tokio::test]
async fn test_correspondent_can_pay_gift() {
    let mut ledger = seed(1, Vec::new());
    ledger.contracts[0].partner_id = 500;
    ledger.contracts[0].correspondent_id = Some(DONOR);
    let backend = InMemoryBackend::from_seed(ledger);
    let intake = intake(&backend);

    let payload = serde_json::from_str(
        r#"{"supporter": 100, "gifttype": [20], "giftamount": [30], "need": [70]}"#,
    )
    .unwrap();
    let ack = intake.post_invoice(payload).await.unwrap();

    let invoice = backend.ledger.get(ack.donations[0]).await.unwrap().unwrap();
    assert_eq!(invoice.partner_id, DONOR);
    assert_eq!(invoice.lines[0].contract_id, Some(1));

    intake.confirm_payment(invoice.id).await.unwrap();
    let sent = backend.notifier.sent().await;
    assert_eq!(sent[0].draft.title, "You gave CHF 30.- for Child 1");
}

#[tokio::test]
async fn test_unknown_references_fail_without_side_effects() {
    let backend = InMemoryBackend::from_seed(seed(1, Vec::new()));
    let intake = intake(&backend);

    let unknown_product = serde_json::from_str(
        r#"{"supporter": 100, "appealtype": [99], "appealamount": [25]}"#,
    )
    .unwrap();
    assert!(matches!(
        intake.post_invoice(unknown_product).await,
        Err(IntakeError::ProductNotFound(99))
    ));

    let unknown_child = serde_json::from_str(
        r#"{"supporter": 100, "gifttype": [20], "giftamount": [30], "need": [999]}"#,
    )
    .unwrap();
    assert!(matches!(
        intake.post_invoice(unknown_child).await,
        Err(IntakeError::ContractNotFound { child: 999, partner: 100 })
    ));

    assert!(backend.ledger.all_invoices().await.unwrap().is_empty());
}
