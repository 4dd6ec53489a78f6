//! In-memory backend for tests and local demos.
//!
//! [`FakeBackend`] implements both [`AuthProvider`] and [`DataStore`] over a
//! single mutex-guarded state. It reproduces the provider behaviour the
//! storefront depends on (error messages, token validation, server-assigned
//! ids and timestamps) without row-level security.
//!
//! Any operation can be made to fail with [`FakeBackend::fail`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use shopfront_core::{Email, UserId};

use super::{AuthProvider, BackendError, DataStore, Query, SignUpResult};
use crate::models::{AccessToken, AuthUser, Session, UserMetadata, order, product};

/// Tables whose `id` column is a serial integer rather than a UUID.
const SERIAL_TABLES: &[&str] = &[product::TABLE, order::TABLE];

/// Minimum password length the fake provider enforces.
const PROVIDER_MIN_PASSWORD: usize = 6;

/// A backend operation that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FakeOp {
    GetUser,
    SignIn,
    SignUp,
    SignOut,
    Select,
    Insert,
    Update,
    Delete,
}

/// How an injected failure presents itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeFailure {
    /// The service cannot be reached.
    Unreachable,
    /// The service answers with an error status and message.
    Api { status: u16, message: String },
}

impl FakeFailure {
    fn to_error(&self) -> BackendError {
        match self {
            Self::Unreachable => BackendError::Unreachable("connection refused".to_string()),
            Self::Api { status, message } => BackendError::Api {
                status: *status,
                message: message.clone(),
            },
        }
    }
}

#[derive(Debug, Clone)]
struct Account {
    user: AuthUser,
    password: String,
    confirmed: bool,
}

#[derive(Debug)]
struct State {
    /// Keyed by lowercased email.
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, UserId>,
    tables: HashMap<String, Vec<Value>>,
    failures: HashMap<FakeOp, FakeFailure>,
    calls: HashMap<FakeOp, usize>,
    clock: DateTime<Utc>,
    next_serial: i64,
    mutations: usize,
    require_confirmation: bool,
}

impl State {
    fn enter(&mut self, op: FakeOp) -> Result<(), BackendError> {
        *self.calls.entry(op).or_default() += 1;
        self.failures.get(&op).map_or(Ok(()), |f| Err(f.to_error()))
    }

    /// Strictly increasing timestamp, one millisecond per tick.
    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += Duration::milliseconds(1);
        self.clock
    }

    fn issue_token(&mut self, user_id: UserId) -> AccessToken {
        let token = format!("fake-token-{}", Uuid::new_v4());
        self.tokens.insert(token.clone(), user_id);
        AccessToken::new(token)
    }

    /// Reject stale tokens the way the data API rejects expired JWTs.
    fn check_token(&self, token: Option<&AccessToken>) -> Result<(), BackendError> {
        match token {
            Some(token) if !self.tokens.contains_key(token.expose()) => Err(BackendError::Api {
                status: 401,
                message: "JWT expired".to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Fill in `id` and `created_at` when the caller left them to the server.
    fn complete_row(&mut self, table: &str, row: Value) -> Result<Value, BackendError> {
        let Value::Object(mut fields) = row else {
            return Err(BackendError::Api {
                status: 400,
                message: "All object keys must match".to_string(),
            });
        };

        if !fields.contains_key("id") {
            let id = if SERIAL_TABLES.contains(&table) {
                self.next_serial += 1;
                json!(self.next_serial)
            } else {
                json!(Uuid::new_v4())
            };
            fields.insert("id".to_string(), id);
        }
        if !fields.contains_key("created_at") {
            let now = self.tick();
            fields.insert(
                "created_at".to_string(),
                json!(now.to_rfc3339_opts(SecondsFormat::Micros, true)),
            );
        }

        Ok(Value::Object(fields))
    }
}

/// In-memory auth provider and data store.
#[derive(Debug)]
pub struct FakeBackend {
    state: Mutex<State>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBackend {
    /// An empty backend that signs users in immediately after sign-up.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                accounts: HashMap::new(),
                tokens: HashMap::new(),
                tables: HashMap::new(),
                failures: HashMap::new(),
                calls: HashMap::new(),
                clock: Utc
                    .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                    .single()
                    .unwrap_or_else(Utc::now),
                next_serial: 0,
                mutations: 0,
                require_confirmation: false,
            }),
        }
    }

    /// Require email confirmation: sign-up returns no session and the
    /// account cannot sign in until [`FakeBackend::confirm`] is called.
    #[must_use]
    pub fn with_email_confirmation(self) -> Self {
        self.lock().require_confirmation = true;
        self
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a confirmed account directly, bypassing sign-up.
    pub fn add_user(&self, email: &Email, password: &str, full_name: Option<&str>) -> AuthUser {
        let user = AuthUser {
            id: UserId::random(),
            email: email.clone(),
            full_name: full_name.map(str::to_string),
        };
        self.lock().accounts.insert(
            email.as_str().to_lowercase(),
            Account {
                user: user.clone(),
                password: password.to_string(),
                confirmed: true,
            },
        );
        user
    }

    /// Issue a valid session for an existing user without a sign-in call.
    #[must_use]
    pub fn session_for(&self, user: &AuthUser) -> Session {
        Session {
            access_token: self.lock().issue_token(user.id),
            user: user.clone(),
        }
    }

    /// Invalidate a token, as if it expired.
    pub fn revoke(&self, token: &AccessToken) {
        self.lock().tokens.remove(token.expose());
    }

    /// Insert rows directly, filling in server defaults. Not counted as a mutation.
    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = Value>) {
        let mut state = self.lock();
        for row in rows {
            if let Ok(row) = state.complete_row(table, row) {
                state.tables.entry(table.to_string()).or_default().push(row);
            }
        }
    }

    /// Current contents of `table`, in insertion order.
    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    /// Make every future `op` fail until [`FakeBackend::recover`].
    pub fn fail(&self, op: FakeOp, failure: FakeFailure) {
        self.lock().failures.insert(op, failure);
    }

    pub fn recover(&self, op: FakeOp) {
        self.lock().failures.remove(&op);
    }

    /// Number of successful inserts, updates and deletes.
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.lock().mutations
    }

    /// Number of times `op` was attempted, including injected failures.
    #[must_use]
    pub fn call_count(&self, op: FakeOp) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or_default()
    }
}

#[async_trait]
impl AuthProvider for FakeBackend {
    async fn get_user(&self, token: &AccessToken) -> Result<Option<AuthUser>, BackendError> {
        let mut state = self.lock();
        state.enter(FakeOp::GetUser)?;

        let Some(user_id) = state.tokens.get(token.expose()).copied() else {
            return Ok(None);
        };
        Ok(state
            .accounts
            .values()
            .find(|account| account.user.id == user_id)
            .map(|account| account.user.clone()))
    }

    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Session, BackendError> {
        let mut state = self.lock();
        state.enter(FakeOp::SignIn)?;

        let account = state
            .accounts
            .get(&email.as_str().to_lowercase())
            .filter(|account| account.password == password.expose_secret())
            .cloned()
            .ok_or_else(|| BackendError::Api {
                status: 400,
                message: "Invalid login credentials".to_string(),
            })?;
        if !account.confirmed {
            return Err(BackendError::Api {
                status: 400,
                message: "Email not confirmed".to_string(),
            });
        }

        Ok(Session {
            access_token: state.issue_token(account.user.id),
            user: account.user,
        })
    }

    async fn sign_up(
        &self,
        email: &Email,
        password: &SecretString,
        metadata: &UserMetadata,
    ) -> Result<SignUpResult, BackendError> {
        let mut state = self.lock();
        state.enter(FakeOp::SignUp)?;

        let key = email.as_str().to_lowercase();
        if state.accounts.contains_key(&key) {
            return Err(BackendError::Api {
                status: 422,
                message: "User already registered".to_string(),
            });
        }
        if password.expose_secret().chars().count() < PROVIDER_MIN_PASSWORD {
            return Err(BackendError::Api {
                status: 422,
                message: format!("Password should be at least {PROVIDER_MIN_PASSWORD} characters"),
            });
        }

        let user = AuthUser {
            id: UserId::random(),
            email: email.clone(),
            full_name: metadata.full_name.clone(),
        };
        let confirmed = !state.require_confirmation;
        state.accounts.insert(
            key,
            Account {
                user: user.clone(),
                password: password.expose_secret().to_string(),
                confirmed,
            },
        );

        let session = confirmed.then(|| Session {
            access_token: state.issue_token(user.id),
            user: user.clone(),
        });
        Ok(SignUpResult {
            user: Some(user),
            session,
        })
    }

    async fn sign_out(&self, token: &AccessToken) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.enter(FakeOp::SignOut)?;
        state.tokens.remove(token.expose());
        Ok(())
    }
}

#[async_trait]
impl DataStore for FakeBackend {
    async fn select(
        &self,
        token: Option<&AccessToken>,
        query: &Query,
    ) -> Result<Vec<Value>, BackendError> {
        let mut state = self.lock();
        state.enter(FakeOp::Select)?;
        state.check_token(token)?;

        let mut rows: Vec<Value> = state
            .tables
            .get(query.table_name())
            .map(|rows| rows.iter().filter(|row| query.matches(row)).cloned().collect())
            .unwrap_or_default();
        query.sort(&mut rows);
        Ok(rows)
    }

    async fn insert(
        &self,
        token: Option<&AccessToken>,
        table: &str,
        rows: Vec<Value>,
    ) -> Result<Vec<Value>, BackendError> {
        let mut state = self.lock();
        state.enter(FakeOp::Insert)?;
        state.check_token(token)?;

        let rows = rows
            .into_iter()
            .map(|row| state.complete_row(table, row))
            .collect::<Result<Vec<_>, _>>()?;
        let stored = state.tables.entry(table.to_string()).or_default();
        if let Some(duplicate) = rows.iter().find(|row| {
            stored
                .iter()
                .any(|existing| existing.get("id") == row.get("id"))
        }) {
            return Err(BackendError::Api {
                status: 409,
                message: format!(
                    "duplicate key value violates unique constraint \"{table}_pkey\" ({})",
                    duplicate.get("id").unwrap_or(&Value::Null)
                ),
            });
        }
        stored.extend(rows.iter().cloned());
        state.mutations += 1;
        Ok(rows)
    }

    async fn update(
        &self,
        token: Option<&AccessToken>,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, BackendError> {
        let mut state = self.lock();
        state.enter(FakeOp::Update)?;
        state.check_token(token)?;

        let patch: Map<String, Value> = match patch {
            Value::Object(fields) => fields,
            _ => {
                return Err(BackendError::Api {
                    status: 400,
                    message: "Update body must be an object".to_string(),
                });
            }
        };

        let mut updated = Vec::new();
        if let Some(rows) = state.tables.get_mut(query.table_name()) {
            for row in rows.iter_mut().filter(|row| query.matches(row)) {
                if let Value::Object(fields) = row {
                    fields.extend(patch.clone());
                }
                updated.push(row.clone());
            }
        }
        state.mutations += 1;
        Ok(updated)
    }

    async fn delete(
        &self,
        token: Option<&AccessToken>,
        query: &Query,
    ) -> Result<Vec<Value>, BackendError> {
        let mut state = self.lock();
        state.enter(FakeOp::Delete)?;
        state.check_token(token)?;

        let mut removed = Vec::new();
        if let Some(rows) = state.tables.get_mut(query.table_name()) {
            let (gone, kept): (Vec<Value>, Vec<Value>) =
                rows.drain(..).partition(|row| query.matches(row));
            *rows = kept;
            removed = gone;
        }
        state.mutations += 1;
        Ok(removed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_sign_up_rejects_duplicate_email() {
        let fake = FakeBackend::new();
        fake.add_user(&email("a@b.co"), "secret1", None);

        let err = fake
            .sign_up(
                &email("A@B.co"),
                &SecretString::from("secret1"),
                &UserMetadata::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.message(), "User already registered");
    }

    #[tokio::test]
    async fn test_sign_in_checks_password() {
        let fake = FakeBackend::new();
        fake.add_user(&email("a@b.co"), "secret1", None);

        let err = fake
            .sign_in_with_password(&email("a@b.co"), &SecretString::from("wrong!"))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Invalid login credentials");

        let session = fake
            .sign_in_with_password(&email("a@b.co"), &SecretString::from("secret1"))
            .await
            .unwrap();
        assert_eq!(
            fake.get_user(&session.access_token).await.unwrap(),
            Some(session.user)
        );
    }

    #[tokio::test]
    async fn test_confirmation_withholds_session() {
        let fake = FakeBackend::new().with_email_confirmation();
        let result = fake
            .sign_up(
                &email("new@b.co"),
                &SecretString::from("secret1"),
                &UserMetadata::default(),
            )
            .await
            .unwrap();
        assert!(result.user.is_some());
        assert!(result.session.is_none());
    }

    #[tokio::test]
    async fn test_revoked_token_resolves_to_no_user() {
        let fake = FakeBackend::new();
        let user = fake.add_user(&email("a@b.co"), "secret1", None);
        let session = fake.session_for(&user);
        fake.revoke(&session.access_token);

        assert_eq!(fake.get_user(&session.access_token).await.unwrap(), None);
        let err = fake
            .select(Some(&session.access_token), &Query::table("cart_items"))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Api { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_increasing_timestamps() {
        let fake = FakeBackend::new();
        let rows = fake
            .insert(None, "cart_items", vec![json!({"n": 1}), json!({"n": 2})])
            .await
            .unwrap();
        assert!(rows[0]["id"].as_str().is_some());
        assert!(rows[0]["created_at"].as_str() < rows[1]["created_at"].as_str());

        let products = fake
            .insert(None, "products", vec![json!({"name": "Cap"})])
            .await
            .unwrap();
        assert_eq!(products[0]["id"], 1);
        assert_eq!(fake.mutation_count(), 2);
    }

    #[tokio::test]
    async fn test_delete_returns_removed_rows() {
        let fake = FakeBackend::new();
        fake.seed("t", [json!({"id": "a"}), json!({"id": "b"})]);

        let removed = fake
            .delete(None, &Query::table("t").eq("id", "a"))
            .await
            .unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(fake.rows("t").len(), 1);

        let removed = fake
            .delete(None, &Query::table("t").eq("id", "a"))
            .await
            .unwrap();
        assert!(removed.is_empty());
    }

    #[tokio::test]
    async fn test_injected_failure_is_counted() {
        let fake = FakeBackend::new();
        fake.fail(FakeOp::Select, FakeFailure::Unreachable);

        let err = fake.select(None, &Query::table("t")).await.unwrap_err();
        assert!(err.is_connection());
        assert_eq!(fake.call_count(FakeOp::Select), 1);

        fake.recover(FakeOp::Select);
        assert!(fake.select(None, &Query::table("t")).await.is_ok());
    }
}
