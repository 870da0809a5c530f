use api_types::{
    auth::{ClearData, Credentials, PasswordChange, User, UsernameChange},
    budget::{BudgetCategory, BudgetUpdate, CategoryInput, MonthlyBudget},
    export::UserExport,
    fixed_expense::{FixedExpense, FixedExpenseInput},
    income::{IncomeEntry, IncomeInput},
    item::{Item, ItemInput},
    month::{Month, MonthSummary},
    savings::{RetirementSavings, Savings, SavingsGoalUpdate, SavingsUpdate},
    stats::StatsResponse,
};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::{Deserialize, de::DeserializeOwned};

use crate::error::{AppError, Result};

#[derive(Debug)]
pub enum ClientError {
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict(String),
    Validation(String),
    Server(String),
    Transport(reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

type ClientResult<T> = std::result::Result<T, ClientError>;

/// REST client for the budgeting API.
///
/// The session lives in the cookie store set up at construction, so clones
/// share the login and can be moved into background tasks.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        // `Url::join` drops the last path segment unless it ends with `/`.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|err| AppError::Terminal(format!("invalid base_url: {err}")))?;
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self { base_url, http })
    }

    pub async fn register(&self, username: &str, password: &str) -> ClientResult<User> {
        let body = credentials(username, password);
        self.send_json(Method::POST, "auth/register", &body).await
    }

    pub async fn login(&self, username: &str, password: &str) -> ClientResult<User> {
        let body = credentials(username, password);
        self.send_json(Method::POST, "auth/login", &body).await
    }

    pub async fn logout(&self) -> ClientResult<()> {
        let req = self.request(Method::POST, "auth/logout")?;
        execute(req).await.map(drop)
    }

    pub async fn me(&self) -> ClientResult<User> {
        self.get("auth/me").await
    }

    pub async fn change_username(&self, new_username: &str) -> ClientResult<User> {
        let body = UsernameChange {
            new_username: new_username.to_string(),
        };
        self.send_json(Method::PUT, "auth/change-username", &body)
            .await
    }

    /// A wrong `current_password` is reported as [`ClientError::Unauthorized`].
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> ClientResult<()> {
        let body = PasswordChange {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        self.send_empty(Method::PUT, "auth/change-password", &body)
            .await
    }

    /// Deletes the account and everything in it.
    pub async fn clear_all_data(&self, password: &str) -> ClientResult<()> {
        let body = ClearData {
            password: password.to_string(),
        };
        self.send_empty(Method::DELETE, "auth/clear-data", &body)
            .await
    }

    /// Months of the user, newest first.
    pub async fn months(&self) -> ClientResult<Vec<Month>> {
        self.get("months").await
    }

    pub async fn current_month(&self) -> ClientResult<MonthSummary> {
        self.get("months/current").await
    }

    pub async fn month(&self, id: i64) -> ClientResult<MonthSummary> {
        self.get(&format!("months/{id}")).await
    }

    pub async fn close_month(&self, id: i64) -> ClientResult<Month> {
        let req = self.request(Method::POST, &format!("months/{id}/close"))?;
        decode(execute(req).await?).await
    }

    pub async fn month_pdf(&self, id: i64) -> ClientResult<Vec<u8>> {
        let req = self.request(Method::GET, &format!("months/{id}/pdf"))?;
        let res = execute(req).await?;
        let bytes = res.bytes().await.map_err(ClientError::Transport)?;
        Ok(bytes.to_vec())
    }

    pub async fn fixed_expenses(&self) -> ClientResult<Vec<FixedExpense>> {
        self.get("fixed-expenses").await
    }

    pub async fn create_fixed_expense(
        &self,
        expense: &FixedExpenseInput,
    ) -> ClientResult<FixedExpense> {
        self.send_json(Method::POST, "fixed-expenses", expense).await
    }

    pub async fn update_fixed_expense(
        &self,
        id: i64,
        expense: &FixedExpenseInput,
    ) -> ClientResult<FixedExpense> {
        self.send_json(Method::PUT, &format!("fixed-expenses/{id}"), expense)
            .await
    }

    pub async fn delete_fixed_expense(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("fixed-expenses/{id}")).await
    }

    pub async fn categories(&self) -> ClientResult<Vec<BudgetCategory>> {
        self.get("categories").await
    }

    pub async fn create_category(&self, category: &CategoryInput) -> ClientResult<BudgetCategory> {
        self.send_json(Method::POST, "categories", category).await
    }

    pub async fn update_category(
        &self,
        id: i64,
        category: &CategoryInput,
    ) -> ClientResult<BudgetCategory> {
        self.send_json(Method::PUT, &format!("categories/{id}"), category)
            .await
    }

    pub async fn delete_category(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("categories/{id}")).await
    }

    pub async fn create_income(
        &self,
        month_id: i64,
        income: &IncomeInput,
    ) -> ClientResult<IncomeEntry> {
        self.send_json(Method::POST, &format!("months/{month_id}/income"), income)
            .await
    }

    pub async fn update_income(
        &self,
        month_id: i64,
        id: i64,
        income: &IncomeInput,
    ) -> ClientResult<IncomeEntry> {
        self.send_json(
            Method::PUT,
            &format!("months/{month_id}/income/{id}"),
            income,
        )
        .await
    }

    pub async fn delete_income(&self, month_id: i64, id: i64) -> ClientResult<()> {
        self.delete(&format!("months/{month_id}/income/{id}")).await
    }

    pub async fn update_budget(
        &self,
        month_id: i64,
        budget_id: i64,
        allocated_amount: f64,
    ) -> ClientResult<MonthlyBudget> {
        let body = BudgetUpdate { allocated_amount };
        self.send_json(
            Method::PUT,
            &format!("months/{month_id}/budgets/{budget_id}"),
            &body,
        )
        .await
    }

    pub async fn create_item(&self, month_id: i64, item: &ItemInput) -> ClientResult<Item> {
        self.send_json(Method::POST, &format!("months/{month_id}/items"), item)
            .await
    }

    pub async fn update_item(
        &self,
        month_id: i64,
        id: i64,
        item: &ItemInput,
    ) -> ClientResult<Item> {
        self.send_json(Method::PUT, &format!("months/{month_id}/items/{id}"), item)
            .await
    }

    pub async fn delete_item(&self, month_id: i64, id: i64) -> ClientResult<()> {
        self.delete(&format!("months/{month_id}/items/{id}")).await
    }

    pub async fn stats(&self) -> ClientResult<StatsResponse> {
        self.get("stats").await
    }

    pub async fn savings(&self) -> ClientResult<Savings> {
        self.get("savings").await
    }

    pub async fn update_savings(&self, savings: f64) -> ClientResult<Savings> {
        self.send_json(Method::PUT, "savings", &SavingsUpdate { savings })
            .await
    }

    pub async fn update_savings_goal(&self, savings_goal: f64) -> ClientResult<Savings> {
        self.send_json(Method::PUT, "savings/goal", &SavingsGoalUpdate { savings_goal })
            .await
    }

    pub async fn retirement_savings(&self) -> ClientResult<RetirementSavings> {
        self.get("retirement-savings").await
    }

    pub async fn update_retirement_savings(
        &self,
        retirement_savings: f64,
    ) -> ClientResult<RetirementSavings> {
        let body = RetirementSavings { retirement_savings };
        self.send_json(Method::PUT, "retirement-savings", &body)
            .await
    }

    pub async fn export_json(&self) -> ClientResult<UserExport> {
        self.get("export/json").await
    }

    pub async fn import_json(&self, export: &UserExport) -> ClientResult<()> {
        let req = self.request(Method::POST, "import/json")?.json(export);
        execute(req).await.map(drop)
    }

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let endpoint = self
            .base_url
            .join(path)
            .map_err(|err| ClientError::Server(format!("invalid base_url: {err}")))?;
        Ok(self.http.request(method, endpoint))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let req = self.request(Method::GET, path)?;
        decode(execute(req).await?).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> ClientResult<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.request(method, path)?.json(body);
        decode(execute(req).await?).await
    }

    /// Sends `body` and ignores whatever comes back on success.
    async fn send_empty<B>(&self, method: Method, path: &str, body: &B) -> ClientResult<()>
    where
        B: serde::Serialize + ?Sized,
    {
        let req = self.request(method, path)?.json(body);
        execute(req).await.map(drop)
    }

    async fn delete(&self, path: &str) -> ClientResult<()> {
        let req = self.request(Method::DELETE, path)?;
        execute(req).await.map(drop)
    }
}

fn credentials(username: &str, password: &str) -> Credentials {
    Credentials {
        username: username.to_string(),
        password: password.to_string(),
    }
}

async fn execute(req: RequestBuilder) -> ClientResult<Response> {
    let res = req.send().await.map_err(ClientError::Transport)?;
    if res.status().is_success() {
        return Ok(res);
    }

    let status = res.status();
    let body = res
        .json::<ErrorResponse>()
        .await
        .map(|err| err.error)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });

    let err = match status.as_u16() {
        401 => ClientError::Unauthorized,
        403 => ClientError::Forbidden,
        404 => ClientError::NotFound,
        409 => ClientError::Conflict(body),
        422 => ClientError::Validation(body),
        _ => ClientError::Server(body),
    };
    Err(err)
}

async fn decode<T: DeserializeOwned>(res: Response) -> ClientResult<T> {
    res.json::<T>().await.map_err(ClientError::Transport)
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use axum::{
        Json, Router,
        body::Bytes,
        extract::{Path, State},
        http::{HeaderMap, Method, StatusCode, Uri, header},
        response::{IntoResponse, Response},
        routing::{get, post, put},
    };
    use chrono::NaiveDate;
    use serde_json::{Value, json};

    use super::*;

    const SESSION: &str = "token=abc123";

    fn logged_in(headers: &HeaderMap) -> bool {
        headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains(SESSION))
    }

    async fn login(Json(body): Json<Value>) -> impl IntoResponse {
        if body["password"] == "secret" {
            (
                StatusCode::OK,
                [(header::SET_COOKIE, format!("{SESSION}; Path=/"))],
                Json(json!({"id": 1, "username": body["username"]})),
            )
                .into_response()
        } else {
            StatusCode::UNAUTHORIZED.into_response()
        }
    }

    async fn register(Json(body): Json<Value>) -> impl IntoResponse {
        if body["username"] == "taken" {
            return (StatusCode::CONFLICT, Json(json!({"error": "username taken"})))
                .into_response();
        }
        Json(json!({"id": 2, "username": body["username"]})).into_response()
    }

    async fn me(headers: HeaderMap) -> impl IntoResponse {
        if logged_in(&headers) {
            Json(json!({"id": 1, "username": "ada"})).into_response()
        } else {
            StatusCode::UNAUTHORIZED.into_response()
        }
    }

    async fn month(Path(id): Path<i64>) -> impl IntoResponse {
        if id != 7 {
            return StatusCode::NOT_FOUND.into_response();
        }
        Json(json!({
            "month": {"id": 7, "user_id": 1, "year": 2026, "month": 3, "is_closed": false, "closed_at": null},
            "income_entries": [],
            "fixed_expenses": [],
            "budgets": [{"id": 3, "month_id": 7, "category_id": 4, "category_label": "Food", "allocated_amount": 300.0, "spent_amount": 320.0}],
            "items": [],
            "total_income": 2000.0,
            "total_fixed": 900.0,
            "total_budgeted": 300.0,
            "total_spent": 320.0,
            "remaining": 780.0
        }))
        .into_response()
    }

    async fn update_goal(
        State(calls): State<Arc<AtomicUsize>>,
        Json(body): Json<Value>,
    ) -> impl IntoResponse {
        calls.fetch_add(1, Ordering::SeqCst);
        let goal = body["savings_goal"].as_f64().unwrap_or_default();
        if goal > 1_000_000.0 {
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({"error": "goal too large"})))
                .into_response();
        }
        Json(json!({"savings": 150.0, "savings_goal": goal})).into_response()
    }

    async fn spawn_stub() -> (String, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route("/api/auth/me", get(me))
            .route("/api/months/{id}", get(month))
            .route("/api/months/{id}/pdf", get(|| async { b"%PDF-1.7".to_vec() }))
            .route("/api/savings/goal", put(update_goal))
            .route(
                "/api/stats",
                get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
            )
            .with_state(calls.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (format!("http://{addr}/api"), calls)
    }

    #[tokio::test]
    async fn login_keeps_session_cookie() {
        let (base_url, _) = spawn_stub().await;
        let client = Client::new(&base_url).unwrap();

        assert!(matches!(client.me().await, Err(ClientError::Unauthorized)));

        let user = client.login("ada", "secret").await.unwrap();
        assert_eq!(user.username, "ada");

        // The clone shares the cookie store.
        let me = client.clone().me().await.unwrap();
        assert_eq!(me.id, 1);
    }

    #[tokio::test]
    async fn status_codes_map_to_errors() {
        let (base_url, _) = spawn_stub().await;
        let client = Client::new(&base_url).unwrap();

        assert!(matches!(
            client.login("ada", "wrong").await,
            Err(ClientError::Unauthorized)
        ));
        match client.register("taken", "pass").await {
            Err(ClientError::Conflict(message)) => assert_eq!(message, "username taken"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(client.month(99).await, Err(ClientError::NotFound)));
        match client.update_savings_goal(5_000_000.0).await {
            Err(ClientError::Validation(message)) => assert_eq!(message, "goal too large"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(client.stats().await, Err(ClientError::Server(_))));
    }

    #[tokio::test]
    async fn month_and_pdf_are_decoded() {
        let (base_url, _) = spawn_stub().await;
        let client = Client::new(&base_url).unwrap();

        let summary = client.month(7).await.unwrap();
        assert_eq!(summary.budgets[0].spent_amount, 320.0);

        let pdf = client.month_pdf(7).await.unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn savings_goal_is_sent() {
        let (base_url, calls) = spawn_stub().await;
        let client = Client::new(&base_url).unwrap();

        let savings = client.update_savings_goal(1200.0).await.unwrap();
        assert_eq!(savings.savings_goal, 1200.0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    type Requests = Arc<Mutex<Vec<(Method, String, Value)>>>;

    /// Logs every request and answers the write routes the way the API does.
    async fn record(
        State(requests): State<Requests>,
        method: Method,
        uri: Uri,
        body: Bytes,
    ) -> Response {
        let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        let path = uri.path().to_string();
        requests
            .lock()
            .unwrap()
            .push((method.clone(), path.clone(), body.clone()));

        match (method, path.as_str()) {
            (Method::POST, "/api/months/8/income") => StatusCode::BAD_REQUEST.into_response(),
            (Method::POST, "/api/months/7/income") | (Method::PUT, "/api/months/7/income/11") => {
                Json(json!({"id": 11, "month_id": 7, "label": body["label"], "amount": body["amount"]}))
                    .into_response()
            }
            (Method::POST, "/api/fixed-expenses") | (Method::PUT, "/api/fixed-expenses/3") => {
                Json(json!({"id": 3, "user_id": 1, "label": body["label"], "amount": body["amount"]}))
                    .into_response()
            }
            (Method::POST, "/api/categories") | (Method::PUT, "/api/categories/4") => Json(json!({
                "id": 4, "user_id": 1, "label": body["label"], "default_amount": body["default_amount"]
            }))
            .into_response(),
            (Method::PUT, "/api/months/7/items/5") => Json(json!({
                "id": 5,
                "month_id": 7,
                "category_id": body["category_id"],
                "description": body["description"],
                "amount": body["amount"],
                "spent_on": body["spent_on"]
            }))
            .into_response(),
            (Method::PUT, "/api/retirement-savings") => {
                Json(json!({"retirement_savings": body["retirement_savings"]})).into_response()
            }
            (Method::PUT, "/api/auth/change-username") if body["new_username"] == "taken" => {
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            (Method::PUT, "/api/auth/change-username") => {
                Json(json!({"id": 1, "username": body["new_username"]})).into_response()
            }
            (Method::PUT, "/api/auth/change-password") | (Method::DELETE, "/api/auth/clear-data")
                if body["current_password"] != "old-secret" && body["password"] != "old-secret" =>
            {
                StatusCode::UNAUTHORIZED.into_response()
            }
            (Method::PUT, "/api/auth/change-password") | (Method::DELETE, "/api/auth/clear-data") => {
                StatusCode::OK.into_response()
            }
            (Method::DELETE, _) => StatusCode::NO_CONTENT.into_response(),
            _ => StatusCode::NOT_FOUND.into_response(),
        }
    }

    async fn spawn_recorder() -> (Client, Requests) {
        let requests = Requests::default();
        let router = Router::new()
            .fallback(record)
            .with_state(requests.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        let client = Client::new(&format!("http://{addr}/api")).unwrap();
        (client, requests)
    }

    fn sent(requests: &Requests) -> Vec<(Method, String, Value)> {
        requests.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn income_entries_live_under_their_month() {
        let (client, requests) = spawn_recorder().await;
        let input = IncomeInput {
            label: "Salary".to_string(),
            amount: 2500.0,
        };

        let created = client.create_income(7, &input).await.unwrap();
        assert_eq!((created.id, created.month_id), (11, 7));
        assert_eq!(created.label, "Salary");

        let bonus = IncomeInput {
            label: "Bonus".to_string(),
            amount: 300.5,
        };
        let updated = client.update_income(7, 11, &bonus).await.unwrap();
        assert_eq!(updated.amount, 300.5);

        client.delete_income(7, 11).await.unwrap();

        let sent = sent(&requests);
        assert_eq!(sent[0].1, "/api/months/7/income");
        assert_eq!(sent[0].2, json!({"label": "Salary", "amount": 2500.0}));
        assert_eq!((sent[1].0.clone(), sent[1].1.as_str()), (Method::PUT, "/api/months/7/income/11"));
        assert_eq!((sent[2].0.clone(), sent[2].1.as_str()), (Method::DELETE, "/api/months/7/income/11"));
    }

    #[tokio::test]
    async fn closed_month_write_is_a_server_error() {
        let (client, _) = spawn_recorder().await;
        let input = IncomeInput {
            label: "Late".to_string(),
            amount: 10.0,
        };
        match client.create_income(8, &input).await {
            Err(ClientError::Server(message)) => assert_eq!(message, "Bad Request"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn fixed_expenses_and_categories_are_managed() {
        let (client, requests) = spawn_recorder().await;

        let rent = FixedExpenseInput {
            label: "Rent".to_string(),
            amount: 900.0,
        };
        assert_eq!(client.create_fixed_expense(&rent).await.unwrap().id, 3);
        let rent = FixedExpenseInput {
            amount: 950.0,
            ..rent
        };
        assert_eq!(client.update_fixed_expense(3, &rent).await.unwrap().amount, 950.0);
        client.delete_fixed_expense(3).await.unwrap();

        let food = CategoryInput {
            label: "Food".to_string(),
            default_amount: 300.0,
        };
        assert_eq!(client.create_category(&food).await.unwrap().label, "Food");
        let renamed = CategoryInput {
            label: "Groceries".to_string(),
            ..food
        };
        assert_eq!(client.update_category(4, &renamed).await.unwrap().label, "Groceries");
        client.delete_category(4).await.unwrap();

        let paths: Vec<(Method, String)> = sent(&requests)
            .into_iter()
            .map(|(method, path, _)| (method, path))
            .collect();
        assert_eq!(
            paths,
            [
                (Method::POST, "/api/fixed-expenses".to_string()),
                (Method::PUT, "/api/fixed-expenses/3".to_string()),
                (Method::DELETE, "/api/fixed-expenses/3".to_string()),
                (Method::POST, "/api/categories".to_string()),
                (Method::PUT, "/api/categories/4".to_string()),
                (Method::DELETE, "/api/categories/4".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn items_and_retirement_savings_are_updated() {
        let (client, requests) = spawn_recorder().await;
        let spent_on = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let item = ItemInput {
            category_id: 4,
            description: "Market".to_string(),
            amount: 42.1,
            spent_on,
        };

        let updated = client.update_item(7, 5, &item).await.unwrap();
        assert_eq!(updated.spent_on, spent_on);
        assert_eq!(updated.description, "Market");
        client.delete_item(7, 5).await.unwrap();

        let retirement = client.update_retirement_savings(25_000.0).await.unwrap();
        assert_eq!(retirement.retirement_savings, 25_000.0);

        let sent = sent(&requests);
        assert_eq!(sent[0].2["spent_on"], "2026-03-09");
        assert_eq!(sent[1].1, "/api/months/7/items/5");
        assert_eq!(sent[2].2, json!({"retirement_savings": 25000.0}));
    }

    #[tokio::test]
    async fn account_changes_check_the_password() {
        let (client, requests) = spawn_recorder().await;

        assert_eq!(client.change_username("grace").await.unwrap().username, "grace");
        assert!(matches!(
            client.change_username("taken").await,
            Err(ClientError::Server(_))
        ));

        assert!(matches!(
            client.change_password("wrong", "new-secret").await,
            Err(ClientError::Unauthorized)
        ));
        client.change_password("old-secret", "new-secret").await.unwrap();

        assert!(matches!(
            client.clear_all_data("wrong").await,
            Err(ClientError::Unauthorized)
        ));
        client.clear_all_data("old-secret").await.unwrap();

        let sent = sent(&requests);
        assert_eq!(sent[0].2, json!({"new_username": "grace"}));
        assert_eq!(
            sent[3].2,
            json!({"current_password": "old-secret", "new_password": "new-secret"})
        );
        let (method, path, body) = &sent[5];
        assert_eq!((method, path.as_str()), (&Method::DELETE, "/api/auth/clear-data"));
        assert_eq!(body, &json!({"password": "old-secret"}));
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::new(&format!("http://{addr}/api/")).unwrap();
        assert!(matches!(client.me().await, Err(ClientError::Transport(_))));
    }
}
