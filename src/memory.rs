//! In-process storage behind the same repository traits as Postgres.
//! Used by the test suite and by `DATABASE_URL=memory://` for local runs.

use std::collections::BTreeMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::{
    auth::{
        repo::UserDirectory,
        repo_types::{NewUser, User},
    },
    error::{AppError, AppResult},
    orders::{
        repo::OrderStore,
        repo_types::{NewOrder, Order},
    },
};

struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Table<User>>,
    orders: RwLock<Table<Order>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn create(&self, new: NewUser) -> AppResult<User> {
        // uniqueness check and insert share one write guard
        let mut users = self.users.write().await;
        if users.rows.values().any(|u| u.email == new.email) {
            return Err(AppError::Conflict("resource already exists".into()));
        }
        let user = User {
            id: users.allocate_id(),
            email: new.email,
            password_hash: new.password_hash,
            admin: new.admin,
            created_at: OffsetDateTime::now_utc(),
        };
        users.rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.users.read().await.rows.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.rows.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.users.read().await.rows.values().cloned().collect())
    }

    async fn update(&self, user: &User) -> AppResult<Option<User>> {
        let mut users = self.users.write().await;
        if users
            .rows
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(AppError::Conflict("resource already exists".into()));
        }
        let Some(row) = users.rows.get_mut(&user.id) else {
            return Ok(None);
        };
        row.email = user.email.clone();
        row.password_hash = user.password_hash.clone();
        row.admin = user.admin;
        Ok(Some(row.clone()))
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create(&self, new: NewOrder) -> AppResult<Order> {
        let mut orders = self.orders.write().await;
        let order = Order {
            id: orders.allocate_id(),
            name: new.name,
            email: new.email,
            phone_number: new.phone_number,
            problem_statement: new.problem_statement,
            leading_channel: new.leading_channel,
            project_type: new.project_type,
            preferred_software: new.preferred_software,
            description: new.description,
            done: false,
            paid: false,
            created_at: OffsetDateTime::now_utc(),
        };
        orders.rows.insert(order.id, order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Order>> {
        Ok(self.orders.read().await.rows.get(&id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<Order>> {
        Ok(self.orders.read().await.rows.values().cloned().collect())
    }

    async fn update(&self, order: &Order) -> AppResult<Option<Order>> {
        let mut orders = self.orders.write().await;
        let Some(row) = orders.rows.get_mut(&order.id) else {
            return Ok(None);
        };
        let created_at = row.created_at;
        *row = Order {
            created_at,
            ..order.clone()
        };
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        Ok(self.orders.write().await.rows.remove(&id).is_some())
    }

    async fn toggle_done(&self, id: i64) -> AppResult<Option<Order>> {
        let mut orders = self.orders.write().await;
        Ok(orders.rows.get_mut(&id).map(|o| {
            o.toggle_done();
            o.clone()
        }))
    }

    async fn toggle_paid(&self, id: i64) -> AppResult<Option<Order>> {
        let mut orders = self.orders.write().await;
        Ok(orders.rows.get_mut(&id).map(|o| {
            o.toggle_paid();
            o.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.into(),
            password_hash: "$argon2id$placeholder".into(),
            admin: false,
        }
    }

    fn new_order(name: &str) -> NewOrder {
        NewOrder {
            name: name.into(),
            email: "client@x.com".into(),
            phone_number: "555-0100".into(),
            problem_statement: "slow site".into(),
            leading_channel: "referral".into(),
            project_type: "web".into(),
            preferred_software: "rust".into(),
            description: "make it fast".into(),
        }
    }

    #[tokio::test]
    async fn users_get_sequential_ids_and_unique_emails() {
        let store = MemoryStore::new();
        let a = UserDirectory::create(&store, new_user("a@x.com")).await.unwrap();
        let b = UserDirectory::create(&store, new_user("b@x.com")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        let dup = UserDirectory::create(&store, new_user("a@x.com")).await;
        assert!(matches!(dup, Err(AppError::Conflict(_))));
        assert_eq!(UserDirectory::list(&store).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn concurrent_creates_with_one_email_admit_exactly_one() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                UserDirectory::create(store.as_ref(), new_user("race@x.com")).await
            }));
        }
        let mut ok = 0;
        let mut conflicts = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => ok += 1,
                Err(AppError::Conflict(_)) => conflicts += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!((ok, conflicts), (1, 7));
    }

    #[tokio::test]
    async fn user_update_rejects_email_collision() {
        let store = MemoryStore::new();
        UserDirectory::create(&store, new_user("a@x.com")).await.unwrap();
        let mut b = UserDirectory::create(&store, new_user("b@x.com")).await.unwrap();
        b.email = "a@x.com".into();
        assert!(matches!(
            UserDirectory::update(&store, &b).await,
            Err(AppError::Conflict(_))
        ));
        b.email = "b@x.com".into();
        b.admin = true;
        let updated = UserDirectory::update(&store, &b).await.unwrap().unwrap();
        assert!(updated.admin);
    }

    #[tokio::test]
    async fn order_lifecycle() {
        let store = MemoryStore::new();
        let order = OrderStore::create(&store, new_order("first")).await.unwrap();
        assert!(!order.done && !order.paid);

        let toggled = store.toggle_done(order.id).await.unwrap().unwrap();
        assert!(toggled.done);
        let toggled = store.toggle_paid(order.id).await.unwrap().unwrap();
        assert!(toggled.done && toggled.paid);

        let mut edited = toggled.clone();
        edited.name = "renamed".into();
        let saved = OrderStore::update(&store, &edited).await.unwrap().unwrap();
        assert_eq!(saved.name, "renamed");
        assert_eq!(saved.created_at, order.created_at);

        assert!(store.delete(order.id).await.unwrap());
        assert!(!store.delete(order.id).await.unwrap());
        assert!(OrderStore::find_by_id(&store, order.id).await.unwrap().is_none());
        assert!(store.toggle_done(order.id).await.unwrap().is_none());
    }
}
