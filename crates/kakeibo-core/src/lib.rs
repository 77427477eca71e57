//! Household budgeting logic
//!
//! [`Kakeibo`] is the service the HTTP layer talks to. It resolves who is
//! asking, checks household membership, and runs the monthly aggregation,
//! pagination and fixed-expense derivations over data fetched from the
//! [`Store`](kakeibo_store::Store).

pub mod auth;
pub mod error;
pub mod fixed;
pub mod month;
pub mod pagination;
pub mod summary;
pub mod validation;

use kakeibo_config::Config;
use kakeibo_store::{HouseholdSeed, StoreRef};
use log::{debug, info};
use serde::{Deserialize, Serialize};

pub use auth::{AuthState, CurrentUser};
pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity};
pub use fixed::{mark_paid, FixedExpenseReport, FixedExpenseStatus};
pub use month::YearMonth;
pub use pagination::{paginate, Page, PageRequest};
pub use summary::{aggregate, HouseholdOverview, MemberAmount, MonthlySummary};
pub use validation::{FormErrors, FormValues};

pub use kakeibo_store::{
    Category, CategoryKind, Expense, ExpenseDetail, FixedExpense, Household, Income, IncomeDetail,
    Invitation, InvitationStatus, Member, PendingInvitation, Tag, User,
};

use validation::References;

/// A household the current user has been checked into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdContext {
    pub household: Household,
    /// Requesting member
    pub member: Member,
    /// All members in join order
    pub members: Vec<Member>,
}

impl HouseholdContext {
    pub fn id(&self) -> &str {
        &self.household.id
    }
}

/// Landing data for a signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeView {
    pub households: Vec<Household>,
    pub invitations: Vec<PendingInvitation>,
}

/// Choices offered by the entry forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormOptions {
    pub expense_categories: Vec<Category>,
    pub income_categories: Vec<Category>,
    pub tags: Vec<Tag>,
    pub members: Vec<Member>,
}

/// Household budgeting service
pub struct Kakeibo {
    config: Config,
    store: StoreRef,
}

impl Kakeibo {
    pub fn new(config: Config, store: StoreRef) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn page_size(&self) -> usize {
        self.config.pagination.page_size
    }

    /// Format an amount with the configured separator and symbol
    pub fn format_amount(&self, amount: i64) -> String {
        let digits = kakeibo_utils::format_number(amount, &self.config.currency.thousands_separator);
        self.config.format_amount(&digits)
    }

    // ==================== Identity ====================

    /// Derive the auth state from a forwarded email
    pub async fn resolve_auth(&self, email: Option<&str>) -> CoreResult<AuthState> {
        let email = match email.map(str::trim).filter(|e| !e.is_empty()) {
            Some(email) => email,
            None => return Ok(AuthState::Unauthorized),
        };

        Ok(match self.store.find_user_by_email(email).await? {
            Some(user) => AuthState::Authenticated {
                email: user.email,
                name: user.name,
                user_id: user.id,
            },
            None => AuthState::Registering { email: email.to_string() },
        })
    }

    /// Create the user row for a signed-in but unregistered email
    pub async fn register(&self, auth: &AuthState, values: &FormValues) -> CoreResult<User> {
        let email = match auth {
            AuthState::Unauthorized => return Err(CoreError::Unauthorized),
            AuthState::Authenticated { email, .. } => {
                return self
                    .store
                    .find_user_by_email(email)
                    .await?
                    .ok_or(CoreError::Unauthorized);
            }
            AuthState::Registering { email } => email,
        };

        let form = validation::SignUpForm::parse(values)?;
        let user = self.store.create_user(&form.name, email).await?;
        info!("Signed up {} as {}", email, user.id);
        Ok(user)
    }

    // ==================== Households ====================

    pub async fn home(&self, user: &CurrentUser) -> CoreResult<HomeView> {
        Ok(HomeView {
            households: self.store.households_for_user(&user.user_id).await?,
            invitations: self.store.pending_invitations(&user.email).await?,
        })
    }

    /// Create a household seeded with the configured categories and tags
    pub async fn create_household(&self, user: &CurrentUser, values: &FormValues) -> CoreResult<Household> {
        let form = validation::NewHouseholdForm::parse(values)?;
        let seed = HouseholdSeed::from(&self.config.household);
        let household = self.store.create_household(&form.name, &user.user_id, &seed).await?;
        Ok(household)
    }

    /// Check that `user` belongs to the household
    pub async fn authorize(&self, household_id: &str, user: &CurrentUser) -> CoreResult<HouseholdContext> {
        let household = self
            .store
            .household(household_id)
            .await?
            .ok_or_else(|| CoreError::HouseholdNotFound { id: household_id.to_string() })?;

        let member = self
            .store
            .membership(household_id, &user.user_id)
            .await?
            .ok_or_else(|| CoreError::Forbidden { household_id: household_id.to_string() })?;

        let members = self.store.members(household_id).await?;

        Ok(HouseholdContext { household, member, members })
    }

    pub async fn form_options(&self, ctx: &HouseholdContext) -> CoreResult<FormOptions> {
        let (expense_categories, income_categories): (Vec<Category>, Vec<Category>) = self
            .store
            .categories(ctx.id())
            .await?
            .into_iter()
            .partition(|c| c.kind() == CategoryKind::Expense);

        Ok(FormOptions {
            expense_categories,
            income_categories,
            tags: self.store.tags(ctx.id()).await?,
            members: ctx.members.clone(),
        })
    }

    /// Months holding any record, newest first
    pub async fn active_months(&self, ctx: &HouseholdContext) -> CoreResult<Vec<YearMonth>> {
        let months = self.store.active_months(ctx.id()).await?;
        Ok(months.iter().filter_map(|m| YearMonth::parse(m)).collect())
    }

    // ==================== Monthly views ====================

    /// Expense and income summaries of a month side by side
    pub async fn overview(&self, ctx: &HouseholdContext, ym: YearMonth) -> CoreResult<HouseholdOverview> {
        let month = ym.to_string();
        let expenses = self.store.expenses_in_month(ctx.id(), &month).await?;
        let incomes = self.store.incomes_in_month(ctx.id(), &month).await?;

        debug!(
            "Overview {} {}: {} expenses, {} incomes",
            ctx.id(),
            month,
            expenses.len(),
            incomes.len()
        );

        Ok(HouseholdOverview::new(
            aggregate(&expenses, &ctx.members, ym),
            aggregate(&incomes, &ctx.members, ym),
        ))
    }

    pub async fn expense_page(&self, ctx: &HouseholdContext, ym: YearMonth, request: PageRequest) -> CoreResult<Page<ExpenseDetail>> {
        let (items, total) = self
            .store
            .expense_page(ctx.id(), &ym.to_string(), request.limit(), request.offset())
            .await?;
        Ok(Page::from_parts(items, request, total))
    }

    pub async fn income_page(&self, ctx: &HouseholdContext, ym: YearMonth, request: PageRequest) -> CoreResult<Page<IncomeDetail>> {
        let (items, total) = self
            .store
            .income_page(ctx.id(), &ym.to_string(), request.limit(), request.offset())
            .await?;
        Ok(Page::from_parts(items, request, total))
    }

    pub async fn fixed_expenses(&self, ctx: &HouseholdContext, ym: YearMonth) -> CoreResult<FixedExpenseReport> {
        let fixed = self.store.fixed_expenses(ctx.id()).await?;
        let expenses = self.store.expenses_in_month(ctx.id(), &ym.to_string()).await?;
        Ok(mark_paid(fixed, &expenses, ym))
    }

    // ==================== Entry ====================

    async fn references_check<F>(&self, ctx: &HouseholdContext, check: F) -> CoreResult<()>
    where
        F: FnOnce(&References<'_>) -> Result<(), FormErrors>,
    {
        let categories = self.store.categories(ctx.id()).await?;
        let tags = self.store.tags(ctx.id()).await?;
        let refs = References {
            categories: &categories,
            tags: &tags,
            members: &ctx.members,
        };
        check(&refs)?;
        Ok(())
    }

    pub async fn expense(&self, ctx: &HouseholdContext, id: &str) -> CoreResult<Expense> {
        self.store
            .expense(ctx.id(), id)
            .await?
            .ok_or_else(|| CoreError::RecordNotFound { entity: "expense", id: id.to_string() })
    }

    pub async fn add_expense(&self, ctx: &HouseholdContext, values: &FormValues) -> CoreResult<Expense> {
        let expense = validation::parse_expense(values)?;
        self.references_check(ctx, |refs| refs.expense(&expense)).await?;
        Ok(self.store.insert_expense(ctx.id(), &expense).await?)
    }

    pub async fn update_expense(&self, ctx: &HouseholdContext, id: &str, values: &FormValues) -> CoreResult<Expense> {
        let expense = validation::parse_expense(values)?;
        self.references_check(ctx, |refs| refs.expense(&expense)).await?;
        let updated = self.store.update_expense(ctx.id(), id, &expense).await?;
        info!("Updated expense {} in {}", id, ctx.id());
        Ok(updated)
    }

    pub async fn income(&self, ctx: &HouseholdContext, id: &str) -> CoreResult<Income> {
        self.store
            .income(ctx.id(), id)
            .await?
            .ok_or_else(|| CoreError::RecordNotFound { entity: "income", id: id.to_string() })
    }

    pub async fn add_income(&self, ctx: &HouseholdContext, values: &FormValues) -> CoreResult<Income> {
        let income = validation::parse_income(values)?;
        self.references_check(ctx, |refs| refs.income(&income)).await?;
        Ok(self.store.insert_income(ctx.id(), &income).await?)
    }

    pub async fn update_income(&self, ctx: &HouseholdContext, id: &str, values: &FormValues) -> CoreResult<Income> {
        let income = validation::parse_income(values)?;
        self.references_check(ctx, |refs| refs.income(&income)).await?;
        let updated = self.store.update_income(ctx.id(), id, &income).await?;
        info!("Updated income {} in {}", id, ctx.id());
        Ok(updated)
    }

    pub async fn add_fixed_expense(&self, ctx: &HouseholdContext, values: &FormValues) -> CoreResult<String> {
        let fixed = validation::parse_fixed_expense(values)?;
        self.references_check(ctx, |refs| refs.fixed_expense(&fixed)).await?;
        Ok(self.store.insert_fixed_expense(ctx.id(), &fixed).await?)
    }

    // ==================== Invitations ====================

    /// Invite an email address into the household (owners only)
    pub async fn invite(&self, ctx: &HouseholdContext, values: &FormValues) -> CoreResult<Invitation> {
        if !ctx.member.owner {
            return Err(CoreError::Forbidden { household_id: ctx.id().to_string() });
        }

        let form = validation::InviteForm::parse(values)?;

        if let Some(user) = self.store.find_user_by_email(&form.invitee_email).await? {
            if ctx.members.iter().any(|m| m.id == user.id) {
                let mut errors = FormErrors::new();
                errors.add("invitee_email", validation::MSG_ALREADY_MEMBER);
                return Err(errors.into());
            }
        }

        Ok(self
            .store
            .create_invitation(ctx.id(), &ctx.member.id, &form.invitee_email)
            .await?)
    }

    pub async fn respond_invitation(&self, user: &CurrentUser, invitation_id: &str, accept: bool) -> CoreResult<Invitation> {
        Ok(self
            .store
            .respond_invitation(invitation_id, &user.email, &user.user_id, accept)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kakeibo_store::SqliteStore;
    use std::sync::Arc;

    fn values(pairs: &[(&str, &str)]) -> FormValues {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    async fn service() -> Kakeibo {
        let store = SqliteStore::in_memory().await.unwrap();
        Kakeibo::new(Config::default(), Arc::new(store))
    }

    async fn sign_up(service: &Kakeibo, email: &str, name: &str) -> CurrentUser {
        let state = service.resolve_auth(Some(email)).await.unwrap();
        service.register(&state, &values(&[("name", name)])).await.unwrap();
        service.resolve_auth(Some(email)).await.unwrap().require_user().unwrap()
    }

    async fn household_with_two(service: &Kakeibo) -> (CurrentUser, CurrentUser, HouseholdContext) {
        let alice = sign_up(service, "alice@example.com", "Alice").await;
        let bob = sign_up(service, "bob@example.com", "Bob").await;
        let household = service.create_household(&alice, &values(&[("name", "Home")])).await.unwrap();
        let ctx = service.authorize(&household.id, &alice).await.unwrap();
        let invitation = service
            .invite(&ctx, &values(&[("invitee_email", "bob@example.com")]))
            .await
            .unwrap();
        service.respond_invitation(&bob, &invitation.id, true).await.unwrap();
        let ctx = service.authorize(&household.id, &alice).await.unwrap();
        (alice, bob, ctx)
    }

    #[tokio::test]
    async fn test_auth_states() {
        let service = service().await;
        assert_eq!(service.resolve_auth(None).await.unwrap(), AuthState::Unauthorized);
        assert_eq!(service.resolve_auth(Some("  ")).await.unwrap(), AuthState::Unauthorized);
        assert!(matches!(
            service.resolve_auth(Some("new@example.com")).await.unwrap(),
            AuthState::Registering { .. }
        ));

        let user = sign_up(&service, "new@example.com", "New").await;
        assert_eq!(user.name, "New");
    }

    #[tokio::test]
    async fn test_register_rejects_empty_name() {
        let service = service().await;
        let state = service.resolve_auth(Some("x@example.com")).await.unwrap();
        let err = service.register(&state, &values(&[("name", "")])).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidForm(_)));
        assert!(matches!(
            service.register(&AuthState::Unauthorized, &values(&[("name", "x")])).await,
            Err(CoreError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_create_household_seeds_config_defaults() {
        let service = service().await;
        let alice = sign_up(&service, "alice@example.com", "Alice").await;
        let household = service.create_household(&alice, &values(&[("name", "Home")])).await.unwrap();

        let ctx = service.authorize(&household.id, &alice).await.unwrap();
        assert!(ctx.member.owner);

        let options = service.form_options(&ctx).await.unwrap();
        let defaults = &service.config().household;
        assert_eq!(options.expense_categories.len(), defaults.expense_categories.len());
        assert_eq!(options.income_categories.len(), defaults.income_categories.len());
        assert_eq!(options.tags.len(), defaults.tags.len());

        let home = service.home(&alice).await.unwrap();
        assert_eq!(home.households, vec![household]);
    }

    #[tokio::test]
    async fn test_authorize_not_found_and_forbidden() {
        let service = service().await;
        let (_, _, ctx) = household_with_two(&service).await;
        let carol = sign_up(&service, "carol@example.com", "Carol").await;

        assert!(matches!(
            service.authorize("missing", &carol).await,
            Err(CoreError::HouseholdNotFound { .. })
        ));
        assert!(matches!(
            service.authorize(ctx.id(), &carol).await,
            Err(CoreError::Forbidden { .. })
        ));
    }

    #[tokio::test]
    async fn test_overview_per_member() {
        let service = service().await;
        let (alice, bob, ctx) = household_with_two(&service).await;
        let options = service.form_options(&ctx).await.unwrap();
        let food = options.expense_categories[0].id.clone();
        let salary = options.income_categories[0].id.clone();

        for (amount, payer, date) in [("1000", &alice, "2024-03-05"), ("500", &bob, "2024-02-20")] {
            service
                .add_expense(&ctx, &values(&[
                    ("amount", amount),
                    ("category", food.as_str()),
                    ("payer", payer.user_id.as_str()),
                    ("paid_at", date),
                ]))
                .await
                .unwrap();
        }
        service
            .add_income(&ctx, &values(&[
                ("amount", "3000"),
                ("category", salary.as_str()),
                ("payee", bob.user_id.as_str()),
                ("received_at", "2024-03-25"),
            ]))
            .await
            .unwrap();

        let overview = service.overview(&ctx, YearMonth::parse("2024-03").unwrap()).await.unwrap();
        assert_eq!(overview.expenses.total, 1000);
        let expense_split: Vec<_> = overview.expenses.per_member.iter().map(|m| (m.name.as_str(), m.amount)).collect();
        assert_eq!(expense_split, vec![("Alice", 1000), ("Bob", 0)]);
        let income_split: Vec<_> = overview.incomes.per_member.iter().map(|m| m.amount).collect();
        assert_eq!(income_split, vec![0, 3000]);
        assert_eq!(overview.balance, 2000);

        let months: Vec<String> = service.active_months(&ctx).await.unwrap().iter().map(|m| m.to_string()).collect();
        assert_eq!(months, vec!["2024-03", "2024-02"]);
    }

    #[tokio::test]
    async fn test_expense_pages() {
        let service = service().await;
        let (alice, _, ctx) = household_with_two(&service).await;
        let food = service.form_options(&ctx).await.unwrap().expense_categories[0].id.clone();

        for i in 0..45 {
            let date = format!("2024-05-{:02}", (i % 28) + 1);
            service
                .add_expense(&ctx, &values(&[
                    ("amount", "1"),
                    ("category", food.as_str()),
                    ("payer", alice.user_id.as_str()),
                    ("paid_at", date.as_str()),
                ]))
                .await
                .unwrap();
        }

        let ym = YearMonth::parse("2024-05").unwrap();
        let size = service.page_size();
        let first = service.expense_page(&ctx, ym, PageRequest::new(0, size)).await.unwrap();
        assert_eq!(first.current_page, 1);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.items.len(), 20);
        assert_eq!(first.items[0].paid_at, "2024-05-28");

        let last = service.expense_page(&ctx, ym, PageRequest::new(3, size)).await.unwrap();
        assert_eq!(last.items.len(), 5);

        let beyond = service.expense_page(&ctx, ym, PageRequest::new(7, size)).await.unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.current_page, 7);
        assert_eq!(beyond.total_pages, 3);

        let far = PageRequest::from_query(Some("1000000000000000000"), size);
        let far = service.expense_page(&ctx, ym, far).await.unwrap();
        assert!(far.items.is_empty());
        assert_eq!(far.current_page, 1_000_000_000_000_000_000);
        assert_eq!(far.total_pages, 3);

        let empty = service.income_page(&ctx, ym, PageRequest::new(1, size)).await.unwrap();
        assert_eq!(empty.total_pages, 0);
        assert_eq!(empty.display_total_pages(), 1);
    }

    #[tokio::test]
    async fn test_expense_rejects_income_category() {
        let service = service().await;
        let (alice, _, ctx) = household_with_two(&service).await;
        let salary = service.form_options(&ctx).await.unwrap().income_categories[0].id.clone();

        let err = service
            .add_expense(&ctx, &values(&[
                ("amount", "100"),
                ("category", salary.as_str()),
                ("payer", alice.user_id.as_str()),
                ("paid_at", "2024-05-01"),
            ]))
            .await
            .unwrap_err();
        match err {
            CoreError::InvalidForm(errors) => assert!(errors.get("category").is_some()),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_expense_moves_month() {
        let service = service().await;
        let (alice, bob, ctx) = household_with_two(&service).await;
        let options = service.form_options(&ctx).await.unwrap();
        let food = options.expense_categories[0].id.clone();
        let tags = format!("{},{}", options.tags[1].id, options.tags[0].id);

        let created = service
            .add_expense(&ctx, &values(&[
                ("amount", "100"),
                ("category", food.as_str()),
                ("payer", alice.user_id.as_str()),
                ("paid_at", "2024-05-01"),
            ]))
            .await
            .unwrap();

        let updated = service
            .update_expense(&ctx, &created.id, &values(&[
                ("amount", "250"),
                ("category", food.as_str()),
                ("tags", tags.as_str()),
                ("payer", bob.user_id.as_str()),
                ("paid_at", "2024-06-10"),
            ]))
            .await
            .unwrap();
        assert_eq!(updated.tag_id.as_deref(), Some(options.tags[1].id.as_str()));
        assert_eq!(YearMonth::of_date_str(&updated.paid_at).unwrap().to_string(), "2024-06");

        let may = service.overview(&ctx, YearMonth::parse("2024-05").unwrap()).await.unwrap();
        assert_eq!(may.expenses.total, 0);

        assert!(matches!(
            service.expense(&ctx, "missing").await,
            Err(CoreError::RecordNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_fixed_expense_paid_by_category() {
        let service = service().await;
        let (alice, bob, ctx) = household_with_two(&service).await;
        let options = service.form_options(&ctx).await.unwrap();
        let rent = options.expense_categories[4].id.clone();
        let phone = options.expense_categories[8].id.clone();

        for category in [&rent, &phone] {
            service
                .add_fixed_expense(&ctx, &values(&[
                    ("amount", "80000"),
                    ("category_id", category.as_str()),
                    ("tag_id", options.tags[0].id.as_str()),
                    ("payer", alice.user_id.as_str()),
                ]))
                .await
                .unwrap();
        }
        service
            .add_expense(&ctx, &values(&[
                ("amount", "1"),
                ("category", rent.as_str()),
                ("payer", bob.user_id.as_str()),
                ("paid_at", "2024-07-27"),
            ]))
            .await
            .unwrap();

        let report = service.fixed_expenses(&ctx, YearMonth::parse("2024-07").unwrap()).await.unwrap();
        assert_eq!(report.paid().count(), 1);
        assert_eq!(report.unpaid().next().unwrap().fixed.category_id, phone);

        let august = service.fixed_expenses(&ctx, YearMonth::parse("2024-08").unwrap()).await.unwrap();
        assert_eq!(august.paid().count(), 0);
    }

    #[tokio::test]
    async fn test_invitation_rules() {
        let service = service().await;
        let (_, bob, ctx) = household_with_two(&service).await;

        let bob_ctx = service.authorize(ctx.id(), &bob).await.unwrap();
        assert!(!bob_ctx.member.owner);
        assert!(matches!(
            service.invite(&bob_ctx, &values(&[("invitee_email", "carol@example.com")])).await,
            Err(CoreError::Forbidden { .. })
        ));

        let err = service
            .invite(&ctx, &values(&[("invitee_email", "bob@example.com")]))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidForm(_)));

        let carol = sign_up(&service, "carol@example.com", "Carol").await;
        let invitation = service
            .invite(&ctx, &values(&[("invitee_email", "carol@example.com")]))
            .await
            .unwrap();
        assert_eq!(service.home(&carol).await.unwrap().invitations.len(), 1);

        service.respond_invitation(&carol, &invitation.id, false).await.unwrap();
        assert!(matches!(
            service.respond_invitation(&carol, &invitation.id, true).await,
            Err(CoreError::InvitationClosed { .. })
        ));
        assert!(matches!(
            service.authorize(ctx.id(), &carol).await,
            Err(CoreError::Forbidden { .. })
        ));
    }

    #[tokio::test]
    async fn test_format_amount_uses_config() {
        let service = service().await;
        assert_eq!(service.format_amount(1234567), "1,234,567 円");
    }
}
