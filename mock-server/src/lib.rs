//! In-memory stand-in for the Ghar Nishchit backend.
//!
//! Serves the same `/api` routes as the production Express service over a
//! document store held in memory: records are JSON objects with a
//! server-assigned `id`, created with `201`, removed with `204`, and missing
//! ids answer `404 {"message": ...}`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub type Document = Map<String, Value>;

pub const MAINTENANCE_STATUSES: [&str; 4] = ["Pending", "In Progress", "Completed", "Cancelled"];

const LISTING_FILTERS: [&str; 3] = ["status", "priority", "propertyId"];

/// Backend state. Collections keep insertion order.
#[derive(Debug, Default)]
pub struct Store {
    properties: Vec<Document>,
    tenants: Vec<Document>,
    maintenance: Vec<Document>,
    profile: Option<Document>,
    password: String,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the signed-in user's account.
    pub fn with_profile(mut self, profile: Value, password: &str) -> Self {
        self.profile = Some(with_id(as_document(profile), new_id()));
        self.password = password.to_string();
        self
    }

    /// Seed a tenant record and return it with its assigned id.
    pub fn insert_tenant(&mut self, tenant: Value) -> Document {
        let tenant = with_id(as_document(tenant), new_id());
        self.tenants.push(tenant.clone());
        tenant
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with(Store::new())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new().nest("/api", api_routes()).with_state(db)
}

fn api_routes() -> Router<Db> {
    Router::new()
        .route("/properties", get(list_properties).post(create_property))
        .route("/properties/user/{user_id}", get(list_properties_by_owner))
        .route(
            "/properties/{id}",
            get(get_property).put(update_property).delete(delete_property),
        )
        .route("/auth/profile", get(get_profile).put(update_profile))
        .route("/auth/change-password", post(change_password))
        .route("/tenants", get(list_tenants))
        .route("/tenants/stats", get(tenant_stats))
        .route("/tenants/{id}", get(get_tenant))
        .route("/maintenance", post(create_maintenance))
        .route("/maintenance/landlord/{owner_id}", get(list_maintenance_by_landlord))
        .route("/maintenance/tenant/{owner_id}", get(list_maintenance_by_tenant))
        .route("/maintenance/property/{owner_id}", get(list_maintenance_by_property))
        .route("/maintenance/stats/{owner_id}", get(maintenance_stats))
        .route(
            "/maintenance/{id}",
            get(get_maintenance)
                .put(update_maintenance)
                .delete(delete_maintenance),
        )
        .route("/maintenance/{id}/status", patch(update_maintenance_status))
        .route("/maintenance/{id}/comment", post(add_maintenance_comment))
        .route("/maintenance/{id}/assign", patch(assign_technician))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, Store::new()).await
}

pub async fn run_with(listener: TcpListener, store: Store) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(store)).await
}

/// Failure answers, shaped like the Express backend's.
#[derive(Debug)]
pub enum Rejection {
    BadRequest(String),
    Unauthorized,
    NotFound(&'static str),
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        match self {
            Rejection::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
            }
            Rejection::Unauthorized => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" }))).into_response()
            }
            Rejection::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": format!("{resource} not found") })),
            )
                .into_response(),
        }
    }
}

type HandlerResult<T> = Result<T, Rejection>;

// --- properties ---

async fn list_properties(State(db): State<Db>) -> Json<Vec<Document>> {
    let store = db.read().await;
    Json(store.properties.clone())
}

async fn list_properties_by_owner(
    State(db): State<Db>,
    Path(user_id): Path<String>,
) -> Json<Vec<Document>> {
    let store = db.read().await;
    Json(matching(&store.properties, "owner", &user_id, &HashMap::new()))
}

async fn create_property(
    State(db): State<Db>,
    Json(input): Json<Value>,
) -> HandlerResult<(StatusCode, Json<Document>)> {
    let property = with_id(object_body(input)?, new_id());
    tracing::info!(id = %id_of(&property), "property created");
    db.write().await.properties.push(property.clone());
    Ok((StatusCode::CREATED, Json(property)))
}

async fn get_property(State(db): State<Db>, Path(id): Path<String>) -> HandlerResult<Json<Document>> {
    let store = db.read().await;
    find(&store.properties, &id).cloned().map(Json).ok_or(Rejection::NotFound("Property"))
}

async fn update_property(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<Value>,
) -> HandlerResult<Json<Document>> {
    let fields = object_body(input)?;
    let mut store = db.write().await;
    let property = find_mut(&mut store.properties, &id).ok_or(Rejection::NotFound("Property"))?;
    *property = with_id(fields, id);
    Ok(Json(property.clone()))
}

async fn delete_property(State(db): State<Db>, Path(id): Path<String>) -> HandlerResult<StatusCode> {
    let mut store = db.write().await;
    remove(&mut store.properties, &id, "Property")
}

// --- auth ---

async fn get_profile(State(db): State<Db>, headers: HeaderMap) -> HandlerResult<Json<Document>> {
    require_bearer(&headers)?;
    let store = db.read().await;
    store.profile.clone().map(Json).ok_or(Rejection::NotFound("User"))
}

async fn update_profile(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> HandlerResult<Json<Document>> {
    require_bearer(&headers)?;
    let changes = object_body(input)?;
    let mut store = db.write().await;
    let profile = store.profile.as_mut().ok_or(Rejection::NotFound("User"))?;
    for (key, value) in changes {
        if !matches!(key.as_str(), "id" | "_id" | "password") {
            profile.insert(key, value);
        }
    }
    Ok(Json(profile.clone()))
}

async fn change_password(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> HandlerResult<Json<Value>> {
    require_bearer(&headers)?;
    let body = object_body(input)?;
    let (Some(old), Some(new)) = (text(&body, "oldPassword"), text(&body, "newPassword")) else {
        return Err(Rejection::BadRequest(
            "Old and new passwords are required".to_string(),
        ));
    };

    let mut store = db.write().await;
    if store.profile.is_none() {
        return Err(Rejection::NotFound("User"));
    }
    if store.password != old {
        return Err(Rejection::BadRequest("Current password is incorrect".to_string()));
    }
    store.password = new.to_string();
    Ok(Json(json!({ "message": "Password updated successfully" })))
}

// --- tenants ---

async fn list_tenants(State(db): State<Db>) -> Json<Vec<Document>> {
    let store = db.read().await;
    Json(store.tenants.clone())
}

async fn get_tenant(State(db): State<Db>, Path(id): Path<String>) -> HandlerResult<Json<Document>> {
    let store = db.read().await;
    find(&store.tenants, &id).cloned().map(Json).ok_or(Rejection::NotFound("Tenant"))
}

async fn tenant_stats(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    let total = store.tenants.len();
    let active = store
        .tenants
        .iter()
        .filter(|tenant| text(tenant, "status").is_some_and(|s| s.eq_ignore_ascii_case("active")))
        .count();
    Json(json!({ "total": total, "active": active, "inactive": total - active }))
}

// --- maintenance ---

async fn create_maintenance(
    State(db): State<Db>,
    Json(input): Json<Value>,
) -> HandlerResult<(StatusCode, Json<Document>)> {
    let mut request = object_body(input)?;
    if text(&request, "title").map_or(true, |title| title.trim().is_empty()) {
        return Err(Rejection::BadRequest("Title is required".to_string()));
    }
    request
        .entry("status")
        .or_insert_with(|| Value::from(MAINTENANCE_STATUSES[0]));
    request.entry("comments").or_insert_with(|| json!([]));

    let request = with_id(request, new_id());
    tracing::info!(id = %id_of(&request), "maintenance request created");
    db.write().await.maintenance.push(request.clone());
    Ok((StatusCode::CREATED, Json(request)))
}

async fn list_maintenance_by_landlord(
    State(db): State<Db>,
    Path(owner_id): Path<String>,
    Query(filters): Query<HashMap<String, String>>,
) -> Json<Vec<Document>> {
    let store = db.read().await;
    Json(matching(&store.maintenance, "landlordId", &owner_id, &filters))
}

async fn list_maintenance_by_tenant(
    State(db): State<Db>,
    Path(owner_id): Path<String>,
    Query(filters): Query<HashMap<String, String>>,
) -> Json<Vec<Document>> {
    let store = db.read().await;
    Json(matching(&store.maintenance, "tenantId", &owner_id, &filters))
}

async fn list_maintenance_by_property(
    State(db): State<Db>,
    Path(owner_id): Path<String>,
) -> Json<Vec<Document>> {
    let store = db.read().await;
    Json(matching(&store.maintenance, "propertyId", &owner_id, &HashMap::new()))
}

async fn get_maintenance(State(db): State<Db>, Path(id): Path<String>) -> HandlerResult<Json<Document>> {
    let store = db.read().await;
    find(&store.maintenance, &id)
        .cloned()
        .map(Json)
        .ok_or(Rejection::NotFound("Maintenance request"))
}

async fn update_maintenance(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<Value>,
) -> HandlerResult<Json<Document>> {
    let fields = object_body(input)?;
    let mut store = db.write().await;
    let request =
        find_mut(&mut store.maintenance, &id).ok_or(Rejection::NotFound("Maintenance request"))?;
    *request = with_id(fields, id);
    Ok(Json(request.clone()))
}

async fn update_maintenance_status(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<Value>,
) -> HandlerResult<Json<Document>> {
    let body = object_body(input)?;
    let status = text(&body, "status")
        .filter(|status| MAINTENANCE_STATUSES.contains(status))
        .ok_or_else(|| Rejection::BadRequest("Invalid status".to_string()))?;

    let mut store = db.write().await;
    let request =
        find_mut(&mut store.maintenance, &id).ok_or(Rejection::NotFound("Maintenance request"))?;
    request.insert("status".to_string(), Value::from(status));
    tracing::info!(id = %id, status, "maintenance status changed");
    Ok(Json(request.clone()))
}

async fn add_maintenance_comment(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<Value>,
) -> HandlerResult<Json<Document>> {
    let comment = with_id(object_body(input)?, new_id());
    let mut store = db.write().await;
    let request =
        find_mut(&mut store.maintenance, &id).ok_or(Rejection::NotFound("Maintenance request"))?;
    match request.get_mut("comments") {
        Some(Value::Array(comments)) => comments.push(Value::Object(comment)),
        _ => {
            request.insert("comments".to_string(), json!([comment]));
        }
    }
    Ok(Json(request.clone()))
}

async fn assign_technician(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<Value>,
) -> HandlerResult<Json<Document>> {
    let assignment = object_body(input)?;
    if text(&assignment, "technician").is_none() {
        return Err(Rejection::BadRequest("Technician is required".to_string()));
    }
    let mut store = db.write().await;
    let request =
        find_mut(&mut store.maintenance, &id).ok_or(Rejection::NotFound("Maintenance request"))?;
    for (key, value) in assignment {
        if key != "id" {
            request.insert(key, value);
        }
    }
    Ok(Json(request.clone()))
}

async fn delete_maintenance(State(db): State<Db>, Path(id): Path<String>) -> HandlerResult<StatusCode> {
    let mut store = db.write().await;
    remove(&mut store.maintenance, &id, "Maintenance request")
}

async fn maintenance_stats(State(db): State<Db>, Path(owner_id): Path<String>) -> Json<Value> {
    let store = db.read().await;
    let requests = matching(&store.maintenance, "landlordId", &owner_id, &HashMap::new());
    let count = |status: &str| {
        requests
            .iter()
            .filter(|request| text(request, "status") == Some(status))
            .count()
    };
    Json(json!({
        "total": requests.len(),
        "pending": count("Pending"),
        "inProgress": count("In Progress"),
        "completed": count("Completed"),
        "cancelled": count("Cancelled"),
    }))
}

// --- helpers ---

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn id_of(document: &Document) -> &str {
    text(document, "id").unwrap_or_default()
}

fn text<'a>(document: &'a Document, key: &str) -> Option<&'a str> {
    document.get(key).and_then(Value::as_str)
}

fn as_document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}

fn object_body(value: Value) -> HandlerResult<Document> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(Rejection::BadRequest(
            "Request body must be a JSON object".to_string(),
        )),
    }
}

/// Put `id` first and drop any client-supplied identifier.
fn with_id(mut fields: Document, id: String) -> Document {
    fields.remove("id");
    fields.remove("_id");
    let mut document = Document::new();
    document.insert("id".to_string(), Value::from(id));
    document.extend(fields);
    document
}

fn find<'a>(collection: &'a [Document], id: &str) -> Option<&'a Document> {
    collection.iter().find(|document| text(document, "id") == Some(id))
}

fn find_mut<'a>(collection: &'a mut [Document], id: &str) -> Option<&'a mut Document> {
    collection
        .iter_mut()
        .find(|document| text(document, "id") == Some(id))
}

fn remove(collection: &mut Vec<Document>, id: &str, resource: &'static str) -> HandlerResult<StatusCode> {
    let before = collection.len();
    collection.retain(|document| text(document, "id") != Some(id));
    if collection.len() == before {
        return Err(Rejection::NotFound(resource));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Documents whose `owner_key` equals `owner_id` and that satisfy every
/// recognised listing filter.
fn matching(
    collection: &[Document],
    owner_key: &str,
    owner_id: &str,
    filters: &HashMap<String, String>,
) -> Vec<Document> {
    collection
        .iter()
        .filter(|document| text(document, owner_key) == Some(owner_id))
        .filter(|document| {
            LISTING_FILTERS.iter().all(|key| match filters.get(*key) {
                Some(wanted) if !wanted.is_empty() => text(document, key) == Some(wanted.as_str()),
                _ => true,
            })
        })
        .cloned()
        .collect()
}

fn require_bearer(headers: &HeaderMap) -> HandlerResult<()> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.trim().is_empty())
        .map(|_| ())
        .ok_or(Rejection::Unauthorized)
}
