use expense_tracker::parse;
use expense_tracker::persistence::{Transaction, TransactionStore};
use tempfile::TempDir;

async fn scratch_store() -> (TransactionStore, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = TransactionStore::open(dir.path().join("expense.db"))
        .await
        .unwrap();
    (store, dir)
}

fn tx(raw: &str) -> Transaction {
    Transaction::from_entry(&parse::parse_entry(raw, Some(2024)))
}

#[tokio::test]
async fn insert_and_list_for_day() {
    let (store, _dir) = scratch_store().await;

    store
        .insert(&tx("[현대카드] 10/07 13:45 12,300원 일시불 CU당산점 승인"))
        .await
        .unwrap();
    store
        .insert(&tx("[신한카드] 10/07 08:12 5,500원 카카오T 서울택시 승인"))
        .await
        .unwrap();
    store
        .insert(&tx("[STARBUCKS] 10/05 09:10 4,800원 일시불 STARBUCKS 영등포 승인"))
        .await
        .unwrap();

    let rows = store.list_for_day("2024-10-07").await.unwrap();
    assert_eq!(rows.len(), 2);
    // Newest first
    assert_eq!(rows[0].merchant, "CU당산점");
    assert_eq!(rows[1].merchant, "카카오T 서울택시");

    assert!(store.list_for_day("2024-01-01").await.unwrap().is_empty());
}

#[tokio::test]
async fn day_total_sums_amounts_and_cancellations() {
    let (store, _dir) = scratch_store().await;

    store
        .insert(&tx("[국민카드] 10/06 19:03 18,000원 일시불 배달의민족 승인"))
        .await
        .unwrap();
    store
        .insert(&tx("[현대카드] 10/06 19:05 18,000원 취소 배달의민족"))
        .await
        .unwrap();

    // Cancellation offsets the approval exactly.
    assert_eq!(store.total_for_day("2024-10-06").await.unwrap(), 0);
    assert_eq!(store.total_for_day("2024-10-05").await.unwrap(), 0);
}

#[tokio::test]
async fn category_totals_are_grouped_and_ordered() {
    let (store, _dir) = scratch_store().await;

    store
        .insert(&tx("[현대카드] 10/07 13:45 12,300원 일시불 CU당산점 승인"))
        .await
        .unwrap();
    store
        .insert(&tx("[현대카드] 10/07 18:02 3,100원 일시불 GS25 역삼점 승인"))
        .await
        .unwrap();
    store
        .insert(&tx("[신한카드] 10/07 08:12 5,500원 카카오T 서울택시 승인"))
        .await
        .unwrap();

    let totals = store.category_totals_for_day("2024-10-07").await.unwrap();
    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0].category, "편의점");
    assert_eq!(totals[0].total, 15_400);
    assert_eq!(totals[0].count, 2);
    assert_eq!(totals[1].category, "교통");
    assert_eq!(totals[1].total, 5_500);
}

#[tokio::test]
async fn round_trip_preserves_all_fields() {
    let (store, _dir) = scratch_store().await;

    let original = tx("[현대카드] 10/07 13:45 12,300원 일시불 CU당산점 승인");
    store.insert(&original).await.unwrap();

    let rows = store.list_for_day("2024-10-07").await.unwrap();
    assert_eq!(rows.len(), 1);
    let stored = &rows[0];

    assert_eq!(stored.id, original.id);
    assert_eq!(stored.tx_datetime, "2024-10-07 13:45:00");
    assert_eq!(stored.amount, 12_300);
    assert_eq!(stored.currency, "KRW");
    assert_eq!(stored.card_or_account, "현대카드");
    assert_eq!(stored.method, "일시불");
    assert_eq!(stored.tx_type, "승인");
    assert_eq!(stored.raw_text, original.raw_text);
}
