//! SQLite implementation of the [`Store`] trait

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use kakeibo_config::DatabaseConfig;
use kakeibo_utils::{generate_id, generate_token};
use log::{debug, info};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use crate::error::{StoreError, StoreResult};
use crate::types::*;
use crate::Store;

const SCHEMA: &str = include_str!("../migrations/0001_init.sql");

/// Current timestamp as stored in the `*_at` columns
fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// LIKE pattern selecting every date of a month
fn month_pattern(month: &str) -> String {
    format!("{}-%", month)
}

/// LIMIT/OFFSET bind value; anything past i64 reads as "beyond the end"
fn sql_bound(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// sqlx-backed store
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open the configured database and apply the schema
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let opts = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(config.create_if_missing)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(opts)
            .await?;

        info!("Opened database {}", config.url);

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Private in-memory database (single connection)
    pub async fn in_memory() -> StoreResult<Self> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Migration { message: e.to_string() })?;
        debug!("Schema up to date");
        Ok(())
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, created_at, updated_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, name: &str, email: &str) -> StoreResult<User> {
        let user = User {
            id: generate_id(),
            name: name.to_string(),
            email: email.to_string(),
            created_at: now(),
            updated_at: now(),
        };
        sqlx::query("INSERT INTO users (id, name, email, created_at, updated_at) VALUES (?, ?, ?, ?, ?)")
            .bind(&user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.created_at)
            .bind(&user.updated_at)
            .execute(&self.pool)
            .await?;
        info!("Registered user {}", user.id);
        Ok(user)
    }

    async fn household(&self, id: &str) -> StoreResult<Option<Household>> {
        let household = sqlx::query_as::<_, Household>("SELECT id, name FROM households WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(household)
    }

    async fn households_for_user(&self, user_id: &str) -> StoreResult<Vec<Household>> {
        let households = sqlx::query_as::<_, Household>(
            "SELECT h.id, h.name FROM household_users hu \
             INNER JOIN households h ON hu.household_id = h.id \
             WHERE hu.user_id = ? ORDER BY hu.seq",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(households)
    }

    async fn create_household(&self, name: &str, owner_id: &str, seed: &HouseholdSeed) -> StoreResult<Household> {
        let household = Household {
            id: generate_id(),
            name: name.to_string(),
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO households (id, name) VALUES (?, ?)")
            .bind(&household.id)
            .bind(&household.name)
            .execute(&mut *tx)
            .await?;

        let categories = seed
            .expense_categories
            .iter()
            .map(|n| (n, true))
            .chain(seed.income_categories.iter().map(|n| (n, false)));
        for (category, is_expense) in categories {
            sqlx::query("INSERT INTO categories (id, name, household_id, is_expense) VALUES (?, ?, ?, ?)")
                .bind(generate_id())
                .bind(category)
                .bind(&household.id)
                .bind(is_expense)
                .execute(&mut *tx)
                .await?;
        }

        for tag in &seed.tags {
            sqlx::query("INSERT INTO tags (id, name, household_id) VALUES (?, ?, ?)")
                .bind(generate_id())
                .bind(tag)
                .bind(&household.id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("INSERT INTO household_users (id, user_id, household_id, owner) VALUES (?, ?, ?, 1)")
            .bind(generate_id())
            .bind(owner_id)
            .bind(&household.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("Created household {} owned by {}", household.id, owner_id);
        Ok(household)
    }

    async fn membership(&self, household_id: &str, user_id: &str) -> StoreResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>(
            "SELECT u.id, u.name, hu.owner FROM household_users hu \
             INNER JOIN users u ON hu.user_id = u.id \
             WHERE hu.household_id = ? AND hu.user_id = ?",
        )
        .bind(household_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(member)
    }

    async fn members(&self, household_id: &str) -> StoreResult<Vec<Member>> {
        let members = sqlx::query_as::<_, Member>(
            "SELECT u.id, u.name, hu.owner FROM household_users hu \
             INNER JOIN users u ON hu.user_id = u.id \
             WHERE hu.household_id = ? ORDER BY hu.seq",
        )
        .bind(household_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    async fn categories(&self, household_id: &str) -> StoreResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, household_id, is_expense FROM categories WHERE household_id = ? ORDER BY rowid",
        )
        .bind(household_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn tags(&self, household_id: &str) -> StoreResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            "SELECT id, name, household_id FROM tags WHERE household_id = ? ORDER BY rowid",
        )
        .bind(household_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    async fn expenses_in_month(&self, household_id: &str, month: &str) -> StoreResult<Vec<DatedAmount>> {
        let records = sqlx::query_as::<_, DatedAmount>(
            "SELECT id, amount, payer AS member_id, paid_at AS date, category_id FROM expenses \
             WHERE household_id = ? AND paid_at LIKE ? ORDER BY paid_at, id",
        )
        .bind(household_id)
        .bind(month_pattern(month))
        .fetch_all(&self.pool)
        .await?;
        debug!("{} expenses in {} for {}", records.len(), month, household_id);
        Ok(records)
    }

    async fn incomes_in_month(&self, household_id: &str, month: &str) -> StoreResult<Vec<DatedAmount>> {
        let records = sqlx::query_as::<_, DatedAmount>(
            "SELECT id, amount, payee AS member_id, received_at AS date, category_id FROM incomes \
             WHERE household_id = ? AND received_at LIKE ? ORDER BY received_at, id",
        )
        .bind(household_id)
        .bind(month_pattern(month))
        .fetch_all(&self.pool)
        .await?;
        debug!("{} incomes in {} for {}", records.len(), month, household_id);
        Ok(records)
    }

    async fn expense_page(&self, household_id: &str, month: &str, limit: usize, offset: usize) -> StoreResult<(Vec<ExpenseDetail>, usize)> {
        let pattern = month_pattern(month);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM expenses WHERE household_id = ? AND paid_at LIKE ?",
        )
        .bind(household_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, ExpenseDetail>(
            "SELECT e.id, e.amount, e.category_id, COALESCE(c.name, '') AS category_name, \
                    e.tag_id, t.name AS tag_name, e.note, e.payer, COALESCE(u.name, '') AS payer_name, e.paid_at \
             FROM expenses e \
             LEFT JOIN categories c ON e.category_id = c.id \
             LEFT JOIN tags t ON e.tag_id = t.id \
             LEFT JOIN users u ON e.payer = u.id \
             WHERE e.household_id = ? AND e.paid_at LIKE ? \
             ORDER BY e.paid_at DESC, e.id DESC \
             LIMIT ? OFFSET ?",
        )
        .bind(household_id)
        .bind(&pattern)
        .bind(sql_bound(limit))
        .bind(sql_bound(offset))
        .fetch_all(&self.pool)
        .await?;

        Ok((items, total.max(0) as usize))
    }

    async fn income_page(&self, household_id: &str, month: &str, limit: usize, offset: usize) -> StoreResult<(Vec<IncomeDetail>, usize)> {
        let pattern = month_pattern(month);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM incomes WHERE household_id = ? AND received_at LIKE ?",
        )
        .bind(household_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, IncomeDetail>(
            "SELECT i.id, i.amount, i.category_id, COALESCE(c.name, '') AS category_name, \
                    i.note, i.payee, COALESCE(u.name, '') AS payee_name, i.received_at \
             FROM incomes i \
             LEFT JOIN categories c ON i.category_id = c.id \
             LEFT JOIN users u ON i.payee = u.id \
             WHERE i.household_id = ? AND i.received_at LIKE ? \
             ORDER BY i.received_at DESC, i.id DESC \
             LIMIT ? OFFSET ?",
        )
        .bind(household_id)
        .bind(&pattern)
        .bind(sql_bound(limit))
        .bind(sql_bound(offset))
        .fetch_all(&self.pool)
        .await?;

        Ok((items, total.max(0) as usize))
    }

    async fn active_months(&self, household_id: &str) -> StoreResult<Vec<String>> {
        let months: Vec<String> = sqlx::query_scalar(
            "SELECT month FROM ( \
                 SELECT substr(paid_at, 1, 7) AS month FROM expenses WHERE household_id = ? \
                 UNION \
                 SELECT substr(received_at, 1, 7) AS month FROM incomes WHERE household_id = ? \
             ) ORDER BY month DESC",
        )
        .bind(household_id)
        .bind(household_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(months)
    }

    async fn expense(&self, household_id: &str, id: &str) -> StoreResult<Option<Expense>> {
        let expense = sqlx::query_as::<_, Expense>(
            "SELECT id, household_id, amount, category_id, tag_id, note, payer, paid_at, created_at, updated_at \
             FROM expenses WHERE id = ? AND household_id = ?",
        )
        .bind(id)
        .bind(household_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(expense)
    }

    async fn insert_expense(&self, household_id: &str, expense: &NewExpense) -> StoreResult<Expense> {
        let stamp = now();
        let row = Expense {
            id: generate_id(),
            household_id: household_id.to_string(),
            amount: expense.amount,
            category_id: expense.category_id.clone(),
            tag_id: expense.tag_id.clone(),
            note: expense.note.clone(),
            payer: expense.payer.clone(),
            paid_at: expense.paid_at.clone(),
            created_at: stamp.clone(),
            updated_at: stamp,
        };
        sqlx::query(
            "INSERT INTO expenses (id, household_id, amount, category_id, tag_id, note, payer, paid_at, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&row.id)
        .bind(&row.household_id)
        .bind(row.amount)
        .bind(&row.category_id)
        .bind(&row.tag_id)
        .bind(&row.note)
        .bind(&row.payer)
        .bind(&row.paid_at)
        .bind(&row.created_at)
        .bind(&row.updated_at)
        .execute(&self.pool)
        .await?;
        debug!("Inserted expense {} into {}", row.id, household_id);
        Ok(row)
    }

    async fn update_expense(&self, household_id: &str, id: &str, expense: &NewExpense) -> StoreResult<Expense> {
        let result = sqlx::query(
            "UPDATE expenses SET amount = ?, category_id = ?, tag_id = ?, note = ?, payer = ?, paid_at = ?, updated_at = ? \
             WHERE id = ? AND household_id = ?",
        )
        .bind(expense.amount)
        .bind(&expense.category_id)
        .bind(&expense.tag_id)
        .bind(&expense.note)
        .bind(&expense.payer)
        .bind(&expense.paid_at)
        .bind(now())
        .bind(id)
        .bind(household_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("expense", id));
        }

        self.expense(household_id, id)
            .await?
            .ok_or_else(|| StoreError::not_found("expense", id))
    }

    async fn income(&self, household_id: &str, id: &str) -> StoreResult<Option<Income>> {
        let income = sqlx::query_as::<_, Income>(
            "SELECT id, household_id, amount, category_id, note, payee, received_at, created_at, updated_at \
             FROM incomes WHERE id = ? AND household_id = ?",
        )
        .bind(id)
        .bind(household_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(income)
    }

    async fn insert_income(&self, household_id: &str, income: &NewIncome) -> StoreResult<Income> {
        let stamp = now();
        let row = Income {
            id: generate_id(),
            household_id: household_id.to_string(),
            amount: income.amount,
            category_id: income.category_id.clone(),
            note: income.note.clone(),
            payee: income.payee.clone(),
            received_at: income.received_at.clone(),
            created_at: stamp.clone(),
            updated_at: stamp,
        };
        sqlx::query(
            "INSERT INTO incomes (id, household_id, amount, category_id, note, payee, received_at, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&row.id)
        .bind(&row.household_id)
        .bind(row.amount)
        .bind(&row.category_id)
        .bind(&row.note)
        .bind(&row.payee)
        .bind(&row.received_at)
        .bind(&row.created_at)
        .bind(&row.updated_at)
        .execute(&self.pool)
        .await?;
        debug!("Inserted income {} into {}", row.id, household_id);
        Ok(row)
    }

    async fn update_income(&self, household_id: &str, id: &str, income: &NewIncome) -> StoreResult<Income> {
        let result = sqlx::query(
            "UPDATE incomes SET amount = ?, category_id = ?, note = ?, payee = ?, received_at = ?, updated_at = ? \
             WHERE id = ? AND household_id = ?",
        )
        .bind(income.amount)
        .bind(&income.category_id)
        .bind(&income.note)
        .bind(&income.payee)
        .bind(&income.received_at)
        .bind(now())
        .bind(id)
        .bind(household_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("income", id));
        }

        self.income(household_id, id)
            .await?
            .ok_or_else(|| StoreError::not_found("income", id))
    }

    async fn fixed_expenses(&self, household_id: &str) -> StoreResult<Vec<FixedExpense>> {
        let fixed = sqlx::query_as::<_, FixedExpense>(
            "SELECT f.id, f.amount, f.note, f.category_id, COALESCE(c.name, '') AS category_name, \
                    f.tag_id, t.name AS tag_name, f.payer, COALESCE(u.name, '') AS payer_name \
             FROM fixed_expenses f \
             LEFT JOIN categories c ON f.category_id = c.id \
             LEFT JOIN tags t ON f.tag_id = t.id \
             LEFT JOIN users u ON f.payer = u.id \
             WHERE f.household_id = ? \
             ORDER BY f.created_at, f.id",
        )
        .bind(household_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(fixed)
    }

    async fn insert_fixed_expense(&self, household_id: &str, fixed: &NewFixedExpense) -> StoreResult<String> {
        let id = generate_id();
        let stamp = now();
        sqlx::query(
            "INSERT INTO fixed_expenses (id, household_id, amount, category_id, tag_id, note, payer, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(household_id)
        .bind(fixed.amount)
        .bind(&fixed.category_id)
        .bind(&fixed.tag_id)
        .bind(&fixed.note)
        .bind(&fixed.payer)
        .bind(&stamp)
        .bind(&stamp)
        .execute(&self.pool)
        .await?;
        debug!("Inserted fixed expense {} into {}", id, household_id);
        Ok(id)
    }

    async fn create_invitation(&self, household_id: &str, inviter_id: &str, invitee_email: &str) -> StoreResult<Invitation> {
        let invitation = Invitation {
            id: generate_id(),
            household_id: household_id.to_string(),
            inviter_id: inviter_id.to_string(),
            invitee_email: invitee_email.to_string(),
            token: generate_token(),
            status: InvitationStatus::Pending,
            created_at: now(),
            responded_at: None,
        };
        sqlx::query(
            "INSERT INTO household_invitations (id, household_id, inviter_id, invitee_email, token, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&invitation.id)
        .bind(&invitation.household_id)
        .bind(&invitation.inviter_id)
        .bind(&invitation.invitee_email)
        .bind(&invitation.token)
        .bind(invitation.status)
        .bind(&invitation.created_at)
        .execute(&self.pool)
        .await?;
        info!("Invitation {} created for household {}", invitation.id, household_id);
        Ok(invitation)
    }

    async fn pending_invitations(&self, invitee_email: &str) -> StoreResult<Vec<PendingInvitation>> {
        let invitations = sqlx::query_as::<_, PendingInvitation>(
            "SELECT i.id, i.household_id, h.name AS household_name, u.name AS inviter_name \
             FROM household_invitations i \
             INNER JOIN users u ON i.inviter_id = u.id \
             INNER JOIN households h ON i.household_id = h.id \
             WHERE i.invitee_email = ? AND i.status = ? \
             ORDER BY i.created_at, i.id",
        )
        .bind(invitee_email)
        .bind(InvitationStatus::Pending)
        .fetch_all(&self.pool)
        .await?;
        Ok(invitations)
    }

    async fn respond_invitation(&self, id: &str, invitee_email: &str, user_id: &str, accept: bool) -> StoreResult<Invitation> {
        let mut tx = self.pool.begin().await?;

        let mut invitation = sqlx::query_as::<_, Invitation>(
            "SELECT id, household_id, inviter_id, invitee_email, token, status, created_at, responded_at \
             FROM household_invitations WHERE id = ? AND invitee_email = ?",
        )
        .bind(id)
        .bind(invitee_email)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::not_found("invitation", id))?;

        if invitation.status != InvitationStatus::Pending {
            return Err(StoreError::AlreadyResponded { id: id.to_string() });
        }

        invitation.status = if accept {
            InvitationStatus::Accepted
        } else {
            InvitationStatus::Declined
        };
        invitation.responded_at = Some(now());

        sqlx::query("UPDATE household_invitations SET status = ?, responded_at = ? WHERE id = ?")
            .bind(invitation.status)
            .bind(&invitation.responded_at)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if accept {
            sqlx::query(
                "INSERT OR IGNORE INTO household_users (id, user_id, household_id, owner) VALUES (?, ?, ?, 0)",
            )
            .bind(generate_id())
            .bind(user_id)
            .bind(&invitation.household_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!("Invitation {} {}", id, invitation.status);
        Ok(invitation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> (SqliteStore, User, Household) {
        let store = SqliteStore::in_memory().await.unwrap();
        let owner = store.create_user("Alice", "alice@example.com").await.unwrap();
        let seed = HouseholdSeed {
            expense_categories: vec!["Food".to_string(), "Rent".to_string()],
            income_categories: vec!["Salary".to_string()],
            tags: vec!["Needed".to_string()],
        };
        let household = store.create_household("Home", &owner.id, &seed).await.unwrap();
        (store, owner, household)
    }

    fn expense(amount: i64, category_id: &str, payer: &str, paid_at: &str) -> NewExpense {
        NewExpense {
            amount,
            category_id: category_id.to_string(),
            tag_id: None,
            note: None,
            payer: payer.to_string(),
            paid_at: paid_at.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_household_seeds_defaults() {
        let (store, owner, household) = setup().await;

        let categories = store.categories(&household.id).await.unwrap();
        assert_eq!(categories.len(), 3);
        assert_eq!(categories.iter().filter(|c| c.kind() == CategoryKind::Expense).count(), 2);
        assert_eq!(store.tags(&household.id).await.unwrap().len(), 1);

        let member = store.membership(&household.id, &owner.id).await.unwrap().unwrap();
        assert!(member.owner);
        assert_eq!(store.households_for_user(&owner.id).await.unwrap(), vec![household]);
    }

    #[tokio::test]
    async fn test_find_user_by_email() {
        let (store, owner, _) = setup().await;
        assert_eq!(store.find_user_by_email("alice@example.com").await.unwrap(), Some(owner));
        assert_eq!(store.find_user_by_email("nobody@example.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_month_filter_uses_separator() {
        let (store, owner, household) = setup().await;
        let food = store.categories(&household.id).await.unwrap()[0].id.clone();

        store.insert_expense(&household.id, &expense(1000, &food, &owner.id, "2024-01-15")).await.unwrap();
        store.insert_expense(&household.id, &expense(700, &food, &owner.id, "2024-010-01")).await.unwrap();
        store.insert_expense(&household.id, &expense(300, &food, &owner.id, "2024-02-01")).await.unwrap();

        let records = store.expenses_in_month(&household.id, "2024-01").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, 1000);
        assert_eq!(records[0].member_id, owner.id);
    }

    #[tokio::test]
    async fn test_expense_page_order_and_count() {
        let (store, owner, household) = setup().await;
        let food = store.categories(&household.id).await.unwrap()[0].id.clone();

        for day in 1..=5 {
            let date = format!("2024-03-{:02}", day);
            store.insert_expense(&household.id, &expense(day, &food, &owner.id, &date)).await.unwrap();
        }
        store.insert_expense(&household.id, &expense(99, &food, &owner.id, "2024-03-05")).await.unwrap();

        let (first, total) = store.expense_page(&household.id, "2024-03", 4, 0).await.unwrap();
        assert_eq!(total, 6);
        assert_eq!(first.len(), 4);
        assert_eq!(first[0].paid_at, "2024-03-05");
        assert_eq!(first[1].paid_at, "2024-03-05");
        assert!(first[0].id > first[1].id);
        assert_eq!(first[0].payer_name, "Alice");
        assert_eq!(first[0].category_name, "Food");

        let (rest, _) = store.expense_page(&household.id, "2024-03", 4, 4).await.unwrap();
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[1].paid_at, "2024-03-01");

        let (beyond, total) = store.expense_page(&household.id, "2024-03", 4, 40).await.unwrap();
        assert!(beyond.is_empty());
        assert_eq!(total, 6);

        let (huge, total) = store.expense_page(&household.id, "2024-03", 4, usize::MAX).await.unwrap();
        assert!(huge.is_empty());
        assert_eq!(total, 6);

        let (huge, _) = store.income_page(&household.id, "2024-03", 4, usize::MAX).await.unwrap();
        assert!(huge.is_empty());
    }

    #[tokio::test]
    async fn test_update_expense() {
        let (store, owner, household) = setup().await;
        let categories = store.categories(&household.id).await.unwrap();
        let created = store
            .insert_expense(&household.id, &expense(500, &categories[0].id, &owner.id, "2024-03-01"))
            .await
            .unwrap();

        let updated = store
            .update_expense(&household.id, &created.id, &expense(800, &categories[1].id, &owner.id, "2024-04-02"))
            .await
            .unwrap();
        assert_eq!(updated.amount, 800);
        assert_eq!(updated.category_id, categories[1].id);
        assert_eq!(updated.created_at, created.created_at);

        let missing = store
            .update_expense(&household.id, "missing", &expense(1, &categories[0].id, &owner.id, "2024-04-02"))
            .await;
        assert!(matches!(missing, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_income_roundtrip_and_months() {
        let (store, owner, household) = setup().await;
        let categories = store.categories(&household.id).await.unwrap();
        let salary = categories.iter().find(|c| !c.is_expense).unwrap().id.clone();

        let income = store
            .insert_income(&household.id, &NewIncome {
                amount: 300000,
                category_id: salary.clone(),
                note: None,
                payee: owner.id.clone(),
                received_at: "2024-02-25".to_string(),
            })
            .await
            .unwrap();
        store.insert_expense(&household.id, &expense(10, &categories[0].id, &owner.id, "2024-03-01")).await.unwrap();

        let records = store.incomes_in_month(&household.id, "2024-02").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, income.id);

        let (page, total) = store.income_page(&household.id, "2024-02", 20, 0).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(page[0].payee_name, "Alice");

        assert_eq!(store.active_months(&household.id).await.unwrap(), vec!["2024-03", "2024-02"]);
    }

    #[tokio::test]
    async fn test_fixed_expenses_joined_names() {
        let (store, owner, household) = setup().await;
        let categories = store.categories(&household.id).await.unwrap();
        let tags = store.tags(&household.id).await.unwrap();

        store
            .insert_fixed_expense(&household.id, &NewFixedExpense {
                amount: 80000,
                category_id: categories[1].id.clone(),
                tag_id: Some(tags[0].id.clone()),
                note: Some("rent".to_string()),
                payer: owner.id.clone(),
            })
            .await
            .unwrap();

        let fixed = store.fixed_expenses(&household.id).await.unwrap();
        assert_eq!(fixed.len(), 1);
        assert_eq!(fixed[0].category_name, "Rent");
        assert_eq!(fixed[0].tag_name.as_deref(), Some("Needed"));
        assert_eq!(fixed[0].payer_name, "Alice");
    }

    #[tokio::test]
    async fn test_invitation_accept_adds_member_in_order() {
        let (store, owner, household) = setup().await;
        let bob = store.create_user("Bob", "bob@example.com").await.unwrap();

        let invitation = store.create_invitation(&household.id, &owner.id, "bob@example.com").await.unwrap();
        let pending = store.pending_invitations("bob@example.com").await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].household_name, "Home");
        assert_eq!(pending[0].inviter_name, "Alice");

        let answered = store.respond_invitation(&invitation.id, "bob@example.com", &bob.id, true).await.unwrap();
        assert_eq!(answered.status, InvitationStatus::Accepted);
        assert!(answered.responded_at.is_some());
        assert!(store.pending_invitations("bob@example.com").await.unwrap().is_empty());

        let members = store.members(&household.id).await.unwrap();
        let names: Vec<_> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
        assert!(!members[1].owner);

        let again = store.respond_invitation(&invitation.id, "bob@example.com", &bob.id, false).await;
        assert!(matches!(again, Err(StoreError::AlreadyResponded { .. })));
    }

    #[tokio::test]
    async fn test_invitation_decline_and_wrong_invitee() {
        let (store, owner, household) = setup().await;
        let carol = store.create_user("Carol", "carol@example.com").await.unwrap();
        let invitation = store.create_invitation(&household.id, &owner.id, "carol@example.com").await.unwrap();

        let wrong = store.respond_invitation(&invitation.id, "mallory@example.com", &carol.id, true).await;
        assert!(matches!(wrong, Err(StoreError::NotFound { .. })));

        let declined = store.respond_invitation(&invitation.id, "carol@example.com", &carol.id, false).await.unwrap();
        assert_eq!(declined.status, InvitationStatus::Declined);
        assert_eq!(store.members(&household.id).await.unwrap().len(), 1);
    }
}
