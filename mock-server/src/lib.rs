use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

/// Body accepted by create and update. Every field is optional on the wire;
/// `validate` decides what is actually required.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EmployeeInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub position: Option<String>,
}

#[derive(Default)]
struct Db {
    next_id: u64,
    employees: BTreeMap<u64, Employee>,
}

impl Db {
    fn insert(&mut self, input: EmployeeInput) -> Employee {
        self.next_id += 1;
        let employee = Employee {
            id: self.next_id,
            name: input.name.unwrap_or_default(),
            email: input.email,
            position: input.position,
        };
        self.employees.insert(employee.id, employee.clone());
        employee
    }
}

#[derive(Clone)]
pub struct AppState {
    token: Arc<str>,
    db: Arc<RwLock<Db>>,
}

impl AppState {
    /// Requests must carry `Authorization: Bearer <token>`.
    pub fn new(token: &str) -> Self {
        Self::with_employees(token, Vec::new())
    }

    pub fn with_employees(token: &str, seed: Vec<EmployeeInput>) -> Self {
        let mut db = Db::default();
        for input in seed {
            db.insert(input);
        }
        Self {
            token: Arc::from(token),
            db: Arc::new(RwLock::new(db)),
        }
    }
}

/// Error bodies follow the `{"message": ...}` shape the client expects.
#[derive(Debug)]
pub enum ApiError {
    Unauthenticated,
    NotFound,
    Validation(Map<String, Value>),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(json!({"message": "Unauthenticated."})),
            )
                .into_response(),
            ApiError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({"message": "Not Found"}))).into_response()
            }
            ApiError::Validation(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({"message": fields})),
            )
                .into_response(),
        }
    }
}

pub fn app(token: &str) -> Router {
    app_with(AppState::new(token))
}

pub fn app_with(state: AppState) -> Router {
    let api = Router::new()
        .route("/employees", get(list_employees).post(create_employee))
        .route(
            "/employees/{id}",
            get(show_employee)
                .put(update_employee)
                .patch(update_employee)
                .delete(delete_employee),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .with_state(state);
    Router::new().nest("/api", api)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock employee API listening");
    }
    axum::serve(listener, app_with(state)).await
}

async fn require_bearer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    if presented != Some(&*state.token) {
        debug!(path = %request.uri().path(), "rejecting request without valid token");
        return ApiError::Unauthenticated.into_response();
    }
    next.run(request).await
}

/// Returns field → messages for every rule `input` breaks.
fn validate(input: &EmployeeInput, partial: bool) -> Result<(), ApiError> {
    let mut errors = Map::new();
    match input.name.as_deref().map(str::trim) {
        Some("") => {
            errors.insert("name".to_string(), json!(["The name field is required."]));
        }
        None if !partial => {
            errors.insert("name".to_string(), json!(["The name field is required."]));
        }
        _ => {}
    }
    if let Some(email) = input.email.as_deref() {
        if !email.contains('@') {
            errors.insert(
                "email".to_string(),
                json!(["The email field must be a valid email address."]),
            );
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

async fn list_employees(State(state): State<AppState>) -> Json<Value> {
    let db = state.db.read().await;
    let employees: Vec<&Employee> = db.employees.values().collect();
    Json(json!({ "data": employees }))
}

async fn create_employee(
    State(state): State<AppState>,
    Json(input): Json<EmployeeInput>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    validate(&input, false)?;
    let employee = state.db.write().await.insert(input);
    Ok((StatusCode::CREATED, Json(json!({ "data": employee }))))
}

async fn show_employee(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, ApiError> {
    let db = state.db.read().await;
    let employee = db.employees.get(&id).ok_or(ApiError::NotFound)?;
    Ok(Json(json!({ "data": employee })))
}

async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(input): Json<EmployeeInput>,
) -> Result<Json<Value>, ApiError> {
    let mut db = state.db.write().await;
    let employee = db.employees.get_mut(&id).ok_or(ApiError::NotFound)?;
    validate(&input, true)?;
    if let Some(name) = input.name {
        employee.name = name;
    }
    if let Some(email) = input.email {
        employee.email = Some(email);
    }
    if let Some(position) = input.position {
        employee.position = Some(position);
    }
    Ok(Json(json!({ "data": employee })))
}

async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    let mut db = state.db.write().await;
    db.employees
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(ApiError::NotFound)
}
