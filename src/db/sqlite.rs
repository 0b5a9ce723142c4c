use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use async_trait::async_trait;

use super::{BillRow, BillStore, StoreError, items_total, parse_due_date};
use crate::config::Config;
use crate::models::{Bill, BillInput, BillItem, BillItemInput, BillSummary};

/// SQLite-backed store. Booleans live as 0/1 integers and dates as ISO
/// text; both translations stay behind the `BillStore` boundary.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open the database file at the configured path, creating it if
    /// missing. Foreign keys are enabled per connection so bill deletion
    /// cascades to items.
    pub async fn connect(config: &Config) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(&config.db_path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Overwrite a bill's total with a fresh aggregate over its persisted
    /// items, inside the caller's transaction.
    async fn recompute_total(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        bill_id: i64,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE bills
            SET total = (
                SELECT COALESCE(SUM(amount * quantity), 0)
                FROM bill_items
                WHERE bill_id = ?
            )
            WHERE id = ?
            "#,
        )
        .bind(bill_id)
        .bind(bill_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl BillStore for SqliteStore {
    async fn list_bills(&self) -> Result<Vec<BillSummary>, StoreError> {
        let bills = sqlx::query_as::<_, BillSummary>(
            r#"
            SELECT b.id, b.title, b.description, b.total, b.due_date, b.paid,
                   b.created_at, b.updated_at, COUNT(i.id) AS item_count
            FROM bills b
            LEFT JOIN bill_items i ON i.bill_id = b.id
            GROUP BY b.id
            ORDER BY b.due_date ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(bills)
    }

    async fn get_bill(&self, id: i64) -> Result<Bill, StoreError> {
        let row = sqlx::query_as::<_, BillRow>(
            r#"
            SELECT id, title, description, total, due_date, paid, created_at, updated_at
            FROM bills
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        let items = self.list_bill_items(id).await?;

        Ok(row.into_bill(items))
    }

    async fn create_bill(&self, input: &BillInput) -> Result<i64, StoreError> {
        // Validate and compute before anything touches the database.
        let due_date = parse_due_date(input.due_date.as_deref())?;
        let total = items_total(&input.items);

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO bills (title, description, total, due_date, paid)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(total)
        .bind(due_date)
        .bind(input.paid)
        .execute(&mut *tx)
        .await?;

        let bill_id = result.last_insert_rowid();

        for item in &input.items {
            sqlx::query(
                r#"
                INSERT INTO bill_items (bill_id, name, description, amount, quantity)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(bill_id)
            .bind(&item.name)
            .bind(&item.description)
            .bind(item.amount)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(bill_id)
    }

    async fn update_bill(&self, id: i64, input: &BillInput) -> Result<(), StoreError> {
        let due_date = parse_due_date(input.due_date.as_deref())?;
        let total = items_total(&input.items);

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE bills
            SET title = ?, description = ?, total = ?, due_date = ?, paid = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(total)
        .bind(due_date)
        .bind(input.paid)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        // Replace the whole item set rather than diffing it.
        sqlx::query("DELETE FROM bill_items WHERE bill_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for item in &input.items {
            sqlx::query(
                r#"
                INSERT INTO bill_items (bill_id, name, description, amount, quantity)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(id)
            .bind(&item.name)
            .bind(&item.description)
            .bind(item.amount)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn delete_bill(&self, id: i64) -> Result<(), StoreError> {
        // Items are removed by the ON DELETE CASCADE constraint.
        sqlx::query("DELETE FROM bills WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_bill_items(&self, bill_id: i64) -> Result<Vec<BillItem>, StoreError> {
        let items = sqlx::query_as::<_, BillItem>(
            r#"
            SELECT id, bill_id, name, description, amount, quantity, created_at, updated_at
            FROM bill_items
            WHERE bill_id = ?
            "#,
        )
        .bind(bill_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn get_bill_item(&self, id: i64) -> Result<BillItem, StoreError> {
        sqlx::query_as::<_, BillItem>(
            r#"
            SELECT id, bill_id, name, description, amount, quantity, created_at, updated_at
            FROM bill_items
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn create_bill_item(
        &self,
        bill_id: i64,
        input: &BillItemInput,
    ) -> Result<i64, StoreError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO bill_items (bill_id, name, description, amount, quantity)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(bill_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.amount)
        .bind(input.quantity)
        .execute(&mut *tx)
        .await?;

        let item_id = result.last_insert_rowid();

        Self::recompute_total(&mut tx, bill_id).await?;

        tx.commit().await?;

        Ok(item_id)
    }

    async fn update_bill_item(&self, id: i64, input: &BillItemInput) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        // Resolve the owning bill up front so the total can be recomputed
        // without a second round trip after the write.
        let bill_id: i64 = sqlx::query_scalar("SELECT bill_id FROM bill_items WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound)?;

        sqlx::query(
            r#"
            UPDATE bill_items
            SET name = ?, description = ?, amount = ?, quantity = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.amount)
        .bind(input.quantity)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        Self::recompute_total(&mut tx, bill_id).await?;

        tx.commit().await?;

        Ok(())
    }

    async fn delete_bill_item(&self, id: i64) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let bill_id: i64 = sqlx::query_scalar("SELECT bill_id FROM bill_items WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound)?;

        sqlx::query("DELETE FROM bill_items WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        Self::recompute_total(&mut tx, bill_id).await?;

        tx.commit().await?;

        Ok(())
    }

    async fn create_tables(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bills (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                total REAL NOT NULL DEFAULT 0,
                due_date DATE,
                paid INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bill_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                bill_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                description TEXT,
                amount REAL NOT NULL,
                quantity INTEGER NOT NULL DEFAULT 1,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (bill_id) REFERENCES bills(id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // SQLite has no ON UPDATE column clause; refresh updated_at with
        // triggers instead.
        sqlx::query(
            r#"
            CREATE TRIGGER IF NOT EXISTS bills_updated_at
            AFTER UPDATE ON bills
            FOR EACH ROW
            BEGIN
                UPDATE bills SET updated_at = CURRENT_TIMESTAMP WHERE id = OLD.id;
            END
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TRIGGER IF NOT EXISTS bill_items_updated_at
            AFTER UPDATE ON bill_items
            FOR EACH ROW
            BEGIN
                UPDATE bill_items SET updated_at = CURRENT_TIMESTAMP WHERE id = OLD.id;
            END
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
