//! Backend REST client
//!
//! `ApiClient` is the single place requests leave the process: it attaches
//! the stored bearer token, applies the request timeout and routes 401s to
//! the injected `AuthFailurePolicy`. `HttpBackend` is the typed façade on
//! top of it, one method per endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::domain::{
    AuthResponse, Credentials, Expense, ExpenseCategory, ExpenseDetail, ExpenseSummary, Goal,
    GoalFields, NewExpense,
};
use crate::ports::{AuthFailureAction, AuthFailurePolicy, BackendApi, SessionStore};

/// Error payload shape the backend uses
#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    message: Option<String>,
}

/// Authenticated HTTP client with the global 401 interceptor
pub struct ApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    store: Arc<dyn SessionStore>,
    on_auth_failure: Arc<dyn AuthFailurePolicy>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        store: Arc<dyn SessionStore>,
        on_auth_failure: Arc<dyn AuthFailurePolicy>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            store,
            on_auth_failure,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, url);
        match self.stored_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Token as currently persisted; read per request so a logout or
    /// expiry elsewhere takes effect immediately
    fn stored_token(&self) -> Option<String> {
        self.store
            .load()
            .ok()
            .flatten()
            .map(|s| s.token)
            .filter(|t| !t.trim().is_empty())
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(|e| self.map_request_error(e))?;
        self.check_response(response).await
    }

    /// Inspect the status; 401 goes to the policy, other failures carry
    /// the backend's message when it sent one
    async fn check_response(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorPayload>(&body)
            .ok()
            .and_then(|p| p.message);

        if status == StatusCode::UNAUTHORIZED {
            if let AuthFailureAction::Abort = self.on_auth_failure.on_auth_failure() {
                return Err(Error::SessionExpired);
            }
        }

        Err(Error::backend(status.as_u16(), message))
    }

    async fn decode<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| Error::transport(format!("Malformed {} response: {}", what, e)))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Self::decode(response, what).await
    }

    pub async fn get_json_with_query<T, Q>(&self, path: &str, query: &Q, what: &str) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self.send(self.request(Method::GET, path).query(query)).await?;
        Self::decode(response, what).await
    }

    pub async fn send_json<B, T>(&self, method: Method, path: &str, body: &B, what: &str) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.request(method, path).json(body)).await?;
        Self::decode(response, what).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::transport(format!(
                "Request timed out after {} seconds",
                self.timeout.as_secs()
            ))
        } else if error.is_connect() {
            Error::transport(format!("Unable to connect to {}", self.base_url))
        } else {
            Error::transport(format!("Request failed: {}", error))
        }
    }
}

/// Typed façade over the backend's REST endpoints
pub struct HttpBackend {
    api: ApiClient,
}

impl HttpBackend {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn base_url(&self) -> &str {
        self.api.base_url()
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn register(&self, credentials: &Credentials) -> Result<AuthResponse> {
        self.api
            .send_json(Method::POST, "/authentication/register", credentials, "registration")
            .await
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        self.api
            .send_json(Method::POST, "/authentication/login", credentials, "login")
            .await
    }

    async fn list_categories(&self) -> Result<Vec<ExpenseCategory>> {
        self.api.get_json("/expenses_category", "category").await
    }

    async fn get_summary(
        &self,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Result<Vec<ExpenseSummary>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(year) = year {
            query.push(("year", year.to_string()));
        }
        if let Some(month) = month {
            query.push(("month", month.to_string()));
        }
        self.api
            .get_json_with_query("/expenses_summary", &query, "summary")
            .await
    }

    async fn get_details(
        &self,
        year: i32,
        month: u32,
        category_id: i64,
    ) -> Result<Vec<ExpenseDetail>> {
        let query = [
            ("year", year.to_string()),
            ("month", month.to_string()),
            ("categoryId", category_id.to_string()),
        ];
        self.api
            .get_json_with_query("/expenses/detail", &query, "detail")
            .await
    }

    async fn create_expense(&self, expense: &NewExpense) -> Result<Expense> {
        let response = self
            .api
            .send(self.api.request(Method::POST, "/expenses").json(expense))
            .await?;
        // Some deployments answer 201 with an empty body
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Malformed expense response: {}", e)))?;
        if body.trim().is_empty() {
            return Ok(Expense::default());
        }
        serde_json::from_str(&body)
            .map_err(|e| Error::transport(format!("Malformed expense response: {}", e)))
    }

    async fn delete_expense(&self, id: i64) -> Result<()> {
        self.api.delete(&format!("/expenses/{}", id)).await
    }

    async fn list_goals(&self) -> Result<Vec<Goal>> {
        self.api.get_json("/goals", "goal").await
    }

    async fn create_goal(&self, goal: &GoalFields) -> Result<Goal> {
        self.api.send_json(Method::POST, "/goals", goal, "goal").await
    }

    async fn update_goal(&self, id: i64, changes: &GoalFields) -> Result<Goal> {
        self.api
            .send_json(Method::PATCH, &format!("/goals/{}", id), changes, "goal")
            .await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rust_decimal::Decimal;

    use super::*;
    use crate::adapters::backend_mock::{MockBackend, MockConfig};
    use crate::adapters::MemorySessionStore;
    use crate::domain::Session;

    struct CountingPolicy {
        calls: AtomicUsize,
        action: AuthFailureAction,
    }

    impl CountingPolicy {
        fn new(action: AuthFailureAction) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                action,
            })
        }
    }

    impl AuthFailurePolicy for CountingPolicy {
        fn on_auth_failure(&self) -> AuthFailureAction {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.action
        }
    }

    fn backend(
        server: &MockBackend,
        store: Arc<MemorySessionStore>,
        policy: Arc<CountingPolicy>,
    ) -> HttpBackend {
        let api = ApiClient::new(&server.base_url(), Duration::from_secs(5), store, policy).unwrap();
        HttpBackend::new(api)
    }

    fn logged_in_store() -> Arc<MemorySessionStore> {
        Arc::new(MemorySessionStore::with_session(Session::new(
            "ana@example.com",
            MockConfig::VALID_TOKEN,
        )))
    }

    #[tokio::test]
    async fn test_bearer_attached_when_token_stored() {
        let server = MockBackend::start(MockConfig::default()).unwrap();
        let policy = CountingPolicy::new(AuthFailureAction::Abort);
        let api = backend(&server, logged_in_store(), policy.clone());

        let categories = api.list_categories().await.unwrap();
        assert_eq!(categories.len(), 2);

        let request = server.last_request().unwrap();
        assert_eq!(request.path, "/expenses_category");
        assert_eq!(
            request.authorization.as_deref(),
            Some(format!("Bearer {}", MockConfig::VALID_TOKEN).as_str())
        );
        assert_eq!(policy.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_bearer_without_token() {
        let server = MockBackend::start(MockConfig::default()).unwrap();
        let policy = CountingPolicy::new(AuthFailureAction::Propagate);
        let api = backend(&server, Arc::new(MemorySessionStore::new()), policy);

        let response = api
            .login(&Credentials::new("ana@example.com", MockConfig::VALID_PASSWORD))
            .await
            .unwrap();
        assert_eq!(response.token, MockConfig::VALID_TOKEN);

        let request = server.last_request().unwrap();
        assert!(request.authorization.is_none());
        assert!(request.body.contains("\"passwd\""));
    }

    #[tokio::test]
    async fn test_401_aborts_through_policy() {
        let server = MockBackend::start(MockConfig::default()).unwrap();
        let policy = CountingPolicy::new(AuthFailureAction::Abort);
        let store = Arc::new(MemorySessionStore::with_session(Session::new("a@b.c", "stale")));
        let api = backend(&server, store, policy.clone());

        let err = api.list_categories().await.unwrap_err();
        assert!(err.is_session_expired());
        assert_eq!(policy.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_401_on_login_view_propagates_message() {
        let server = MockBackend::start(MockConfig::default()).unwrap();
        let policy = CountingPolicy::new(AuthFailureAction::Propagate);
        let api = backend(&server, Arc::new(MemorySessionStore::new()), policy.clone());

        let err = api
            .login(&Credentials::new("ana@example.com", "wrong"))
            .await
            .unwrap_err();
        match err {
            Error::Backend { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Credenciales inválidas");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(policy.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_summary_normalizes_category_alias() {
        let server = MockBackend::start(MockConfig::default()).unwrap();
        let api = backend(
            &server,
            logged_in_store(),
            CountingPolicy::new(AuthFailureAction::Abort),
        );

        let summary = api.get_summary(None, None).await.unwrap();
        assert_eq!(summary.len(), 3);
        assert!(summary.iter().all(|s| s.category.is_some()));
        assert_eq!(server.last_request().unwrap().path, "/expenses_summary");

        api.get_summary(Some(2025), Some(6)).await.unwrap();
        assert_eq!(
            server.last_request().unwrap().path,
            "/expenses_summary?year=2025&month=6"
        );
    }

    #[tokio::test]
    async fn test_details_query_parameters() {
        let server = MockBackend::start(MockConfig::default()).unwrap();
        let api = backend(
            &server,
            logged_in_store(),
            CountingPolicy::new(AuthFailureAction::Abort),
        );

        let details = api.get_details(2025, 6, 1).await.unwrap();
        assert!(!details.is_empty());
        assert_eq!(
            server.last_request().unwrap().path,
            "/expenses/detail?year=2025&month=6&categoryId=1"
        );
    }

    #[tokio::test]
    async fn test_create_and_delete_expense() {
        let server = MockBackend::start(MockConfig::default()).unwrap();
        let api = backend(
            &server,
            logged_in_store(),
            CountingPolicy::new(AuthFailureAction::Abort),
        );

        let created = api
            .create_expense(&NewExpense {
                category: ExpenseCategory::new(1, "Comida"),
                year: 2025,
                month: 6,
                amount: Decimal::new(1250, 2),
            })
            .await
            .unwrap();
        assert_eq!(created.id, Some(99));
        let request = server.last_request().unwrap();
        assert_eq!(request.method, "POST");
        assert!(request.body.contains("\"category\""));

        api.delete_expense(7).await.unwrap();
        let request = server.last_request().unwrap();
        assert_eq!(request.method, "DELETE");
        assert_eq!(request.path, "/expenses/7");
    }

    #[tokio::test]
    async fn test_backend_message_surfaced_verbatim() {
        let server = MockBackend::start(MockConfig::default()).unwrap();
        let api = backend(
            &server,
            logged_in_store(),
            CountingPolicy::new(AuthFailureAction::Abort),
        );

        let err = api.delete_expense(MockConfig::MISSING_EXPENSE_ID).await.unwrap_err();
        assert_eq!(err.user_message(), "Gasto no encontrado");
    }

    #[tokio::test]
    async fn test_goal_crud() {
        let server = MockBackend::start(MockConfig::default()).unwrap();
        let api = backend(
            &server,
            logged_in_store(),
            CountingPolicy::new(AuthFailureAction::Abort),
        );

        let goals = api.list_goals().await.unwrap();
        assert_eq!(goals.len(), 1);

        let mut fields = GoalFields::new();
        fields.insert("targetAmount".to_string(), serde_json::json!(800));
        let created = api.create_goal(&fields).await.unwrap();
        assert_eq!(created.get("targetAmount"), Some(&serde_json::json!(800)));

        let updated = api.update_goal(1, &fields).await.unwrap();
        assert_eq!(updated.id, 1);
        let request = server.last_request().unwrap();
        assert_eq!(request.method, "PATCH");
        assert_eq!(request.path, "/goals/1");
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockBackend::start(MockConfig {
            delay_ms: 1500,
            ..Default::default()
        })
        .unwrap();
        let api = ApiClient::new(
            &server.base_url(),
            Duration::from_secs(1),
            logged_in_store(),
            CountingPolicy::new(AuthFailureAction::Abort),
        )
        .unwrap();
        let backend = HttpBackend::new(api);

        let err = backend.list_categories().await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert!(err.user_message().contains("timed out"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let api = ApiClient::new(
            "http://127.0.0.1:1",
            Duration::from_secs(2),
            logged_in_store(),
            CountingPolicy::new(AuthFailureAction::Abort),
        )
        .unwrap();
        let err = HttpBackend::new(api).list_categories().await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let api = ApiClient::new(
            "http://localhost/api/",
            Duration::from_secs(1),
            Arc::new(MemorySessionStore::new()),
            CountingPolicy::new(AuthFailureAction::Abort),
        )
        .unwrap();
        assert_eq!(api.base_url(), "http://localhost/api");
    }
}
