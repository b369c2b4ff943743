use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IdenStatic,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use crate::domain::{filter_accounts, Account, AccountStore, DomainError, DomainResult};
use crate::infrastructure::database::entities::account;

/// `AccountStore` backed by a pooled SeaORM connection.
///
/// Every method runs a single statement; the pool hands out a connection for
/// that statement and takes it back when the future completes or is dropped.
pub struct SeaOrmAccountStore {
    db: DatabaseConnection,
}

impl SeaOrmAccountStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn account_model_to_domain(model: account::Model) -> Account {
    Account {
        id: model.id,
        username: model.username,
        email: model.email,
        password_hash: model.password_hash,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

/// Build a `LIKE` operand matching `term` as a literal substring.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn lower_like(column: account::Column, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\'))
}

/// True for values holding any non-ASCII character (SQLite: byte length
/// differs from character length).
fn has_non_ascii(column: account::Column) -> SimpleExpr {
    Expr::cust(format!(
        r#"length(CAST("{0}" AS BLOB)) != length("{0}")"#,
        column.as_str()
    ))
}

// ── Store implementation ────────────────────────────────────────

#[async_trait]
impl AccountStore for SeaOrmAccountStore {
    async fn count(&self) -> DomainResult<u64> {
        Ok(account::Entity::find().count(&self.db).await?)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Account>> {
        let model = account::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(account_model_to_domain))
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> DomainResult<Vec<Account>> {
        let models = account::Entity::find()
            .filter(
                Condition::any()
                    .add(account::Column::Username.eq(username))
                    .add(account::Column::Email.eq(email)),
            )
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(account_model_to_domain).collect())
    }

    async fn search_by_pattern(&self, pattern: &str) -> DomainResult<Vec<Account>> {
        let mut query = account::Entity::find()
            .order_by_asc(account::Column::CreatedAt)
            .order_by_asc(account::Column::Id);

        // SQL LOWER() only folds ASCII, so the database narrows only ASCII
        // terms, and only over all-ASCII rows. Rows with any non-ASCII
        // character (e.g. U+212A folds to `k`) always reach the shared
        // predicate below, which has the final say.
        if pattern.is_ascii() {
            let like = like_pattern(&pattern.to_ascii_lowercase());
            query = query.filter(
                Condition::any()
                    .add(lower_like(account::Column::Username, &like))
                    .add(lower_like(account::Column::Email, &like))
                    .add(has_non_ascii(account::Column::Username))
                    .add(has_non_ascii(account::Column::Email)),
            );
        } else {
            debug!(pattern, "Non-ASCII search term, filtering in memory");
        }

        let models = query.all(&self.db).await?;
        let accounts = models.into_iter().map(account_model_to_domain).collect();
        Ok(filter_accounts(accounts, pattern))
    }

    async fn list_all(&self) -> DomainResult<Vec<Account>> {
        let models = account::Entity::find()
            .order_by_asc(account::Column::CreatedAt)
            .order_by_asc(account::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(account_model_to_domain).collect())
    }

    async fn insert(&self, account: Account) -> DomainResult<()> {
        let new_account = account::ActiveModel {
            id: Set(account.id),
            username: Set(account.username),
            email: Set(account.email),
            password_hash: Set(account.password_hash),
            created_at: Set(account.created_at),
            updated_at: Set(account.updated_at),
        };

        new_account.insert(&self.db).await?;
        Ok(())
    }

    async fn update_username(&self, id: &str, new_username: &str) -> DomainResult<()> {
        let result = account::Entity::update_many()
            .col_expr(account::Column::Username, Expr::value(new_username))
            .col_expr(account::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(account::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::account_not_found(id));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let result = account::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::account_not_found(id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::memory_database;

    fn account(username: &str, email: &str) -> Account {
        let now = Utc::now();
        Account {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.into(),
            email: email.into(),
            password_hash: "$2b$04$placeholderplaceholderplaceholderplaceholderplace".into(),
            created_at: now,
            updated_at: now,
        }
    }

    async fn store() -> SeaOrmAccountStore {
        SeaOrmAccountStore::new(memory_database().await)
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ab"), "%ab%");
        assert_eq!(like_pattern("5%_x\\"), "%5\\%\\_x\\\\%");
    }

    #[tokio::test]
    async fn test_insert_find_count() {
        let store = store().await;
        let alice = account("alice", "alice@x.com");
        let id = alice.id.clone();
        store.insert(alice.clone()).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let found = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(found.username, "alice");
        assert_eq!(found.password_hash, alice.password_hash);
        assert!(store.find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unique_constraint_reports_duplicate_key() {
        let store = store().await;
        store.insert(account("alice", "alice@x.com")).await.unwrap();

        let err = store
            .insert(account("alice", "other@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateKey(_)), "got {err:?}");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_by_username_or_email() {
        let store = store().await;
        store.insert(account("alice", "alice@x.com")).await.unwrap();
        store.insert(account("bob", "bob@y.com")).await.unwrap();

        let hits = store
            .find_by_username_or_email("carol", "bob@y.com")
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].username, "bob");

        let hits = store
            .find_by_username_or_email("Alice", "nobody@x.com")
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_search_by_pattern_uses_shared_predicate() {
        let store = store().await;
        store.insert(account("alice", "alice@x.com")).await.unwrap();
        store.insert(account("bob", "bob@y.com")).await.unwrap();
        store.insert(account("Ölaf", "olaf@z.com")).await.unwrap();
        store.insert(account("abcd", "abcd@z.com")).await.unwrap();
        store.insert(account("x_y", "xy@z.com")).await.unwrap();

        let hits = store.search_by_pattern("ALI").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].username, "alice");

        let hits = store.search_by_pattern("öla").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].username, "Ölaf");

        // `_` is a literal here, not a single-character wildcard.
        assert!(store.search_by_pattern("b_d").await.unwrap().is_empty());
        let hits = store.search_by_pattern("X_Y").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].username, "x_y");
    }

    #[tokio::test]
    async fn test_search_keeps_rows_that_fold_to_ascii() {
        let store = store().await;
        // U+212A KELVIN SIGN lowercases to ASCII `k`.
        store.insert(account("\u{212A}evin", "k@z.com")).await.unwrap();
        store.insert(account("bob", "bob@y.com")).await.unwrap();

        let hits = store.search_by_pattern("kevin").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].username, "\u{212A}evin");

        let hits = store.search_by_pattern("KEV").await.unwrap();
        assert_eq!(hits.len(), 1);

        // Non-ASCII rows pass the SQL step but still face the predicate.
        let hits = store.search_by_pattern("bo").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].username, "bob");
    }

    #[tokio::test]
    async fn test_update_username() {
        let store = store().await;
        let alice = account("alice", "alice@x.com");
        let id = alice.id.clone();
        store.insert(alice).await.unwrap();

        store.update_username(&id, "alice2").await.unwrap();
        let found = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(found.username, "alice2");

        let err = store.update_username("missing", "x").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let store = store().await;
        let alice = account("alice", "alice@x.com");
        let id = alice.id.clone();
        store.insert(alice).await.unwrap();

        store.delete(&id).await.unwrap();
        assert!(store.find_by_id(&id).await.unwrap().is_none());

        let err = store.delete(&id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
