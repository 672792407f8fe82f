// Expense Tracker - REST API with Axum
// Thin pass-through from HTTP to the repository

use crate::db::{CategoryTotal, Expense, MonthlyTotal};
use crate::error::ExpenseError;
use crate::repository::ExpenseRepository;
use crate::schema::{parse_expense_id, ExpensePayload, ValidationErrors};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    repo: ExpenseRepository,
}

/// Error body returned for every failed request
#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a ValidationErrors>,
}

impl IntoResponse for ExpenseError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ExpenseError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            ExpenseError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ExpenseError::Store(_) | ExpenseError::StoreUnavailable(_) => {
                error!(error = %self, "store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal store error".to_string(),
                )
            }
        };

        let fields = match &self {
            ExpenseError::Validation(errors) => Some(errors),
            _ => None,
        };

        let body = ErrorResponse {
            error: self.kind(),
            message,
            fields,
        };

        (status, Json(body)).into_response()
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET / - Health and endpoint listing
async fn home() -> Json<Value> {
    Json(json!({
        "message": "Expense Tracker API running",
        "version": crate::VERSION,
        "status": "healthy",
        "endpoints": {
            "expenses": "/expenses",
            "category_summary": "/summary/category",
            "monthly_summary": "/summary/monthly",
        }
    }))
}

/// POST /expenses - Record a new expense
async fn add_expense(
    State(state): State<AppState>,
    payload: Result<Json<ExpensePayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Expense>), ExpenseError> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!(reason = %rejection.body_text(), "rejected malformed request body");
        ValidationErrors::single("body", rejection.body_text())
    })?;

    let input = payload.validate().map_err(|errors| {
        warn!(%errors, "rejected expense payload");
        errors
    })?;

    let expense = state.repo.create(input)?;
    Ok((StatusCode::CREATED, Json(expense)))
}

/// GET /expenses - All expenses in creation order
async fn list_expenses(State(state): State<AppState>) -> Result<Json<Vec<Expense>>, ExpenseError> {
    Ok(Json(state.repo.list()?))
}

/// DELETE /expenses/:expense_id - Remove an expense, 404 if it does not exist
async fn remove_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<String>,
) -> Result<Json<Expense>, ExpenseError> {
    let id = parse_expense_id(&expense_id).map_err(|errors| {
        warn!(%errors, "rejected expense id");
        errors
    })?;

    Ok(Json(state.repo.delete(id)?))
}

/// GET /summary/category - Pie chart data
async fn category_summary(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryTotal>>, ExpenseError> {
    Ok(Json(state.repo.category_summary()?))
}

/// GET /summary/monthly - Bar chart data
async fn monthly_summary(
    State(state): State<AppState>,
) -> Result<Json<Vec<MonthlyTotal>>, ExpenseError> {
    Ok(Json(state.repo.monthly_summary()?))
}

/// Build the application router with permissive CORS and request tracing
pub fn router(repo: ExpenseRepository) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/expenses", get(list_expenses).post(add_expense))
        .route("/expenses/:expense_id", delete(remove_expense))
        .route("/summary/category", get(category_summary))
        .route("/summary/monthly", get(monthly_summary))
        .with_state(AppState { repo })
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use tower::ServiceExt;

    fn create_test_app() -> Router {
        router(ExpenseRepository::new(Store::open_in_memory().unwrap()))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn delete_request(uri: &str) -> Request<Body> {
        Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn add(app: &Router, title: &str, amount: f64, category: &str, date: &str) -> Value {
        let (status, body) = send(
            app,
            post_json(
                "/expenses",
                json!({"title": title, "amount": amount, "category": category, "date": date}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "body: {body}");
        body
    }

    #[tokio::test]
    async fn test_home_lists_endpoints() {
        let app = create_test_app();

        let (status, body) = send(&app, get_request("/")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["endpoints"]["expenses"], "/expenses");
        assert_eq!(body["endpoints"]["monthly_summary"], "/summary/monthly");
    }

    #[tokio::test]
    async fn test_create_and_list_expenses() {
        let app = create_test_app();

        let created = add(&app, "Groceries", 42.5, "food", "2024-01-05").await;
        assert!(created["id"].as_i64().unwrap() > 0);
        assert_eq!(created["title"], "Groceries");
        assert_eq!(created["amount"], json!(42.5));
        assert_eq!(created["category"], "food");
        assert_eq!(created["date"], "2024-01-05");

        let (status, body) = send(&app, get_request("/expenses")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([created]));
    }

    #[tokio::test]
    async fn test_create_invalid_payload_names_fields() {
        let app = create_test_app();

        let (status, body) = send(
            &app,
            post_json(
                "/expenses",
                json!({"title": "", "amount": "ten", "category": "food", "date": "2024-13-01"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation_error");
        let fields: Vec<&str> = body["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["title", "amount", "date"]);

        // Nothing was stored
        let (_, list) = send(&app, get_request("/expenses")).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn test_create_malformed_body() {
        let app = create_test_app();

        let request = Request::builder()
            .method(Method::POST)
            .uri("/expenses")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["fields"][0]["field"], "body");
    }

    #[tokio::test]
    async fn test_delete_expense() {
        let app = create_test_app();
        let created = add(&app, "Taxi", 18.0, "transport", "2024-04-02").await;
        let id = created["id"].as_i64().unwrap();

        let (status, body) = send(&app, delete_request(&format!("/expenses/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, created);

        let (_, list) = send(&app, get_request("/expenses")).await;
        assert_eq!(list, json!([]));

        let (status, body) = send(&app, delete_request(&format!("/expenses/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_delete_rejects_invalid_ids() {
        let app = create_test_app();
        add(&app, "Kept", 3.0, "misc", "2024-01-01").await;

        for bad in ["abc", "0", "-1", "2.5"] {
            let (status, body) = send(&app, delete_request(&format!("/expenses/{bad}"))).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "id {bad}");
            assert_eq!(body["fields"][0]["field"], "expense_id");
        }

        let (_, list) = send(&app, get_request("/expenses")).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_summaries() {
        let app = create_test_app();
        add(&app, "Bread", 10.0, "food", "2024-01-05").await;
        add(&app, "Cheese", 20.0, "food", "2024-01-20").await;
        add(&app, "Apples", 5.0, "food", "2024-02-11").await;
        add(&app, "Bus", 15.0, "transport", "2024-02-12").await;

        let (status, body) = send(&app, get_request("/summary/category")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                {"category": "food", "total": 35.0},
                {"category": "transport", "total": 15.0},
            ])
        );

        let (status, body) = send(&app, get_request("/summary/monthly")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                {"month": "2024-01", "total": 30.0},
                {"month": "2024-02", "total": 20.0},
            ])
        );

        // Repeated reads with no writes are identical
        let (_, again) = send(&app, get_request("/summary/monthly")).await;
        assert_eq!(again, body);
    }

    #[tokio::test]
    async fn test_out_of_range_input_never_reaches_summaries() {
        let app = create_test_app();
        add(&app, "Bread", 10.0, "food", "2024-01-05").await;

        for body in [
            json!({"title": "Far", "amount": 1.0, "category": "c", "date": "+12345-01-01"}),
            json!({"title": "Past", "amount": 1.0, "category": "c", "date": "-0001-01-01"}),
            json!({"title": "Huge", "amount": 1e308, "category": "c", "date": "2024-01-01"}),
        ] {
            let (status, _) = send(&app, post_json("/expenses", body)).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        }

        let (status, body) = send(&app, get_request("/summary/monthly")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{"month": "2024-01", "total": 10.0}]));

        let (status, body) = send(&app, get_request("/summary/category")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{"category": "food", "total": 10.0}]));
    }

    #[tokio::test]
    async fn test_store_failure_is_generic_500() {
        let store = Store::open_in_memory().unwrap();
        let app = router(ExpenseRepository::new(store.clone()));
        store
            .session()
            .unwrap()
            .execute_batch("DROP TABLE expenses")
            .unwrap();

        let (status, body) = send(&app, get_request("/expenses")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "store_error");
        assert_eq!(body["message"], "internal store error");
        assert!(body.get("fields").is_none());
        assert!(!body.to_string().contains("no such table"));
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let app = create_test_app();

        let request = Request::builder()
            .uri("/expenses")
            .header(header::ORIGIN, "http://localhost:5500")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }
}
