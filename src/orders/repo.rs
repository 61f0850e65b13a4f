use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AppResult;
use crate::orders::repo_types::{NewOrder, Order};

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create(&self, new: NewOrder) -> AppResult<Order>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Order>>;
    async fn list(&self) -> AppResult<Vec<Order>>;
    /// Writes every mutable column; `None` when the row is gone.
    async fn update(&self, order: &Order) -> AppResult<Option<Order>>;
    async fn delete(&self, id: i64) -> AppResult<bool>;
    /// Single-statement flips, so concurrent toggles never lose an update.
    async fn toggle_done(&self, id: i64) -> AppResult<Option<Order>>;
    async fn toggle_paid(&self, id: i64) -> AppResult<Option<Order>>;
}

#[derive(Clone)]
pub struct PgOrderStore {
    db: PgPool,
}

impl PgOrderStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const ORDER_COLUMNS: &str = "id, name, email, phone_number, problem_statement, leading_channel, \
     project_type, preferred_software, description, done, paid, created_at";

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create(&self, new: NewOrder) -> AppResult<Order> {
        let sql = format!(
            r#"
            INSERT INTO orders (name, email, phone_number, problem_statement, leading_channel,
                                project_type, preferred_software, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ORDER_COLUMNS}
            "#
        );
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(&new.name)
            .bind(&new.email)
            .bind(&new.phone_number)
            .bind(&new.problem_statement)
            .bind(&new.leading_channel)
            .bind(&new.project_type)
            .bind(&new.preferred_software)
            .bind(&new.description)
            .fetch_one(&self.db)
            .await?;
        Ok(order)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(order)
    }

    async fn list(&self) -> AppResult<Vec<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY id");
        let orders = sqlx::query_as::<_, Order>(&sql).fetch_all(&self.db).await?;
        Ok(orders)
    }

    async fn update(&self, order: &Order) -> AppResult<Option<Order>> {
        let sql = format!(
            r#"
            UPDATE orders
               SET name = $2, email = $3, phone_number = $4, problem_statement = $5,
                   leading_channel = $6, project_type = $7, preferred_software = $8,
                   description = $9, done = $10, paid = $11
             WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, Order>(&sql)
            .bind(order.id)
            .bind(&order.name)
            .bind(&order.email)
            .bind(&order.phone_number)
            .bind(&order.problem_statement)
            .bind(&order.leading_channel)
            .bind(&order.project_type)
            .bind(&order.preferred_software)
            .bind(&order.description)
            .bind(order.done)
            .bind(order.paid)
            .fetch_optional(&self.db)
            .await?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let res = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn toggle_done(&self, id: i64) -> AppResult<Option<Order>> {
        let sql = format!("UPDATE orders SET done = NOT done WHERE id = $1 RETURNING {ORDER_COLUMNS}");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(order)
    }

    async fn toggle_paid(&self, id: i64) -> AppResult<Option<Order>> {
        let sql = format!("UPDATE orders SET paid = NOT paid WHERE id = $1 RETURNING {ORDER_COLUMNS}");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(order)
    }
}
