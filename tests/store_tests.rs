//! Storage engine tests, run against the SQLite backend on a scratch
//! database. Both backends share operation semantics; the SQL dialect is
//! the only difference.

use accounts::config::{Config, DbKind};
use accounts::db::{BillStore, SqliteStore, StoreError};
use accounts::models::{BillInput, BillItemInput};
use tempfile::TempDir;

fn test_config(db_path: String) -> Config {
    Config {
        db_type: DbKind::Sqlite,
        db_host: "localhost".to_string(),
        db_port: 3306,
        db_user: "root".to_string(),
        db_password: String::new(),
        db_name: "accounts".to_string(),
        db_path,
        port: 8080,
    }
}

async fn open_store() -> (TempDir, SqliteStore) {
    let dir = TempDir::new().expect("tempdir");
    let db_path = dir.path().join("accounts.db").display().to_string();
    let store = SqliteStore::connect(&test_config(db_path))
        .await
        .expect("connect");
    store.create_tables().await.expect("create tables");
    (dir, store)
}

fn bill_input(title: &str, due_date: Option<&str>, items: Vec<BillItemInput>) -> BillInput {
    BillInput {
        title: title.to_string(),
        description: None,
        due_date: due_date.map(str::to_string),
        paid: false,
        items,
    }
}

fn item_input(name: &str, amount: f64, quantity: i32) -> BillItemInput {
    BillItemInput {
        name: name.to_string(),
        description: None,
        amount,
        quantity,
    }
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[tokio::test]
async fn create_tables_is_idempotent() {
    let (_dir, store) = open_store().await;
    store.create_tables().await.expect("second run");
}

#[tokio::test]
async fn create_and_get_round_trip() {
    let (_dir, store) = open_store().await;

    let mut input = bill_input(
        "Rent",
        Some("2024-03-01"),
        vec![item_input("Rent", 1200.0, 1)],
    );
    input.description = Some("march rent".to_string());
    input.paid = true;

    let id = store.create_bill(&input).await.unwrap();
    let bill = store.get_bill(id).await.unwrap();

    assert_eq!(bill.id, id);
    assert_eq!(bill.title, "Rent");
    assert_eq!(bill.description.as_deref(), Some("march rent"));
    assert!(bill.paid);
    assert_eq!(
        bill.due_date,
        Some(chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
    );
    assert_close(bill.total, 1200.0);
    assert_eq!(bill.items.len(), 1);
    assert_eq!(bill.items[0].name, "Rent");
    assert_eq!(bill.items[0].bill_id, id);
    assert_close(bill.items[0].amount, 1200.0);
    assert_eq!(bill.items[0].quantity, 1);
}

#[tokio::test]
async fn bill_without_items_totals_zero() {
    let (_dir, store) = open_store().await;

    let id = store
        .create_bill(&bill_input("Utilities", None, vec![]))
        .await
        .unwrap();
    let bill = store.get_bill(id).await.unwrap();

    assert_close(bill.total, 0.0);
    assert!(bill.items.is_empty());
}

#[tokio::test]
async fn empty_due_date_means_no_due_date() {
    let (_dir, store) = open_store().await;

    let id = store
        .create_bill(&bill_input("Groceries", Some(""), vec![]))
        .await
        .unwrap();
    let bill = store.get_bill(id).await.unwrap();

    assert_eq!(bill.due_date, None);
}

#[tokio::test]
async fn malformed_due_date_is_rejected_before_any_write() {
    let (_dir, store) = open_store().await;

    let err = store
        .create_bill(&bill_input("Rent", Some("2024-13-40"), vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidDueDate(_)));

    // Nothing was persisted.
    assert!(store.list_bills().await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_due_date_on_update_leaves_bill_unchanged() {
    let (_dir, store) = open_store().await;

    let id = store
        .create_bill(&bill_input("Rent", Some("2024-03-01"), vec![]))
        .await
        .unwrap();

    let err = store
        .update_bill(id, &bill_input("Rent 2", Some("not-a-date"), vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidDueDate(_)));

    let bill = store.get_bill(id).await.unwrap();
    assert_eq!(bill.title, "Rent");
}

#[tokio::test]
async fn adding_an_item_updates_the_total() {
    let (_dir, store) = open_store().await;

    let id = store
        .create_bill(&bill_input(
            "Rent",
            None,
            vec![item_input("Rent", 1200.0, 1)],
        ))
        .await
        .unwrap();

    store
        .create_bill_item(id, &item_input("Late Fee", 25.0, 1))
        .await
        .unwrap();

    let bill = store.get_bill(id).await.unwrap();
    assert_close(bill.total, 1225.0);
    assert_eq!(bill.items.len(), 2);
}

#[tokio::test]
async fn updating_an_item_recomputes_the_total() {
    let (_dir, store) = open_store().await;

    let bill_id = store
        .create_bill(&bill_input(
            "Office",
            None,
            vec![item_input("Chair", 80.0, 1)],
        ))
        .await
        .unwrap();
    let item_id = store.get_bill(bill_id).await.unwrap().items[0].id;

    store
        .update_bill_item(item_id, &item_input("Chair", 80.0, 3))
        .await
        .unwrap();

    let item = store.get_bill_item(item_id).await.unwrap();
    assert_eq!(item.quantity, 3);

    let bill = store.get_bill(bill_id).await.unwrap();
    assert_close(bill.total, 240.0);
}

#[tokio::test]
async fn deleting_the_last_item_zeroes_the_total() {
    let (_dir, store) = open_store().await;

    let bill_id = store
        .create_bill(&bill_input(
            "Internet",
            None,
            vec![item_input("Monthly", 49.99, 1)],
        ))
        .await
        .unwrap();
    let item_id = store.get_bill(bill_id).await.unwrap().items[0].id;

    store.delete_bill_item(item_id).await.unwrap();

    // The bill itself survives with an empty item set.
    let bill = store.get_bill(bill_id).await.unwrap();
    assert_close(bill.total, 0.0);
    assert!(bill.items.is_empty());
}

#[tokio::test]
async fn update_replaces_the_entire_item_set() {
    let (_dir, store) = open_store().await;

    let id = store
        .create_bill(&bill_input(
            "Groceries",
            None,
            vec![item_input("Milk", 3.50, 2), item_input("Bread", 2.25, 1)],
        ))
        .await
        .unwrap();

    store
        .update_bill(
            id,
            &bill_input("Groceries", None, vec![item_input("Eggs", 4.0, 1)]),
        )
        .await
        .unwrap();

    let bill = store.get_bill(id).await.unwrap();
    assert_eq!(bill.items.len(), 1);
    assert_eq!(bill.items[0].name, "Eggs");
    assert_close(bill.total, 4.0);
}

#[tokio::test]
async fn updating_an_absent_bill_affects_zero_rows() {
    let (_dir, store) = open_store().await;

    // No existence check at this layer; the handler performs it.
    store
        .update_bill(4242, &bill_input("Ghost", None, vec![]))
        .await
        .unwrap();

    assert!(store.list_bills().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_bill_cascades_to_its_items() {
    let (_dir, store) = open_store().await;

    let bill_id = store
        .create_bill(&bill_input(
            "Phone",
            None,
            vec![item_input("Plan", 30.0, 1)],
        ))
        .await
        .unwrap();
    let item_id = store.get_bill(bill_id).await.unwrap().items[0].id;

    store.delete_bill(bill_id).await.unwrap();

    assert!(matches!(
        store.get_bill(bill_id).await,
        Err(StoreError::NotFound)
    ));
    assert!(matches!(
        store.get_bill_item(item_id).await,
        Err(StoreError::NotFound)
    ));
    // Listing items for a gone bill is an empty sequence, not an error.
    assert!(store.list_bill_items(bill_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_records_are_not_found() {
    let (_dir, store) = open_store().await;

    assert!(matches!(
        store.get_bill(999).await,
        Err(StoreError::NotFound)
    ));
    assert!(matches!(
        store.get_bill_item(999).await,
        Err(StoreError::NotFound)
    ));
    assert!(matches!(
        store.update_bill_item(999, &item_input("x", 1.0, 1)).await,
        Err(StoreError::NotFound)
    ));
    assert!(matches!(
        store.delete_bill_item(999).await,
        Err(StoreError::NotFound)
    ));
}

#[tokio::test]
async fn summaries_order_by_due_date_with_undated_first() {
    let (_dir, store) = open_store().await;

    store
        .create_bill(&bill_input(
            "March",
            Some("2024-03-01"),
            vec![item_input("a", 1.0, 1)],
        ))
        .await
        .unwrap();
    store
        .create_bill(&bill_input("Whenever", None, vec![]))
        .await
        .unwrap();
    store
        .create_bill(&bill_input("January", Some("2024-01-01"), vec![]))
        .await
        .unwrap();

    let summaries = store.list_bills().await.unwrap();
    let titles: Vec<_> = summaries.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, ["Whenever", "January", "March"]);

    assert_eq!(summaries[0].item_count, 0);
    assert_eq!(summaries[2].item_count, 1);
}

#[tokio::test]
async fn listing_items_twice_yields_identical_sequences() {
    let (_dir, store) = open_store().await;

    let bill_id = store
        .create_bill(&bill_input(
            "Groceries",
            None,
            vec![item_input("Milk", 3.50, 2), item_input("Bread", 2.25, 1)],
        ))
        .await
        .unwrap();

    let first = store.list_bill_items(bill_id).await.unwrap();
    let second = store.list_bill_items(bill_id).await.unwrap();

    let ids = |items: &[accounts::models::BillItem]| {
        items.iter().map(|i| i.id).collect::<Vec<_>>()
    };
    assert_eq!(ids(&first), ids(&second));
}

#[tokio::test]
async fn negative_quantities_are_accepted() {
    let (_dir, store) = open_store().await;

    // Quantity and amount are unvalidated on purpose; a refund-style line
    // can push the total negative.
    let id = store
        .create_bill(&bill_input(
            "Refund",
            None,
            vec![item_input("Credit", 10.0, -2)],
        ))
        .await
        .unwrap();

    let bill = store.get_bill(id).await.unwrap();
    assert_close(bill.total, -20.0);
}
