use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use rust_decimal::Decimal;
use serde_json::{Map, Value, json};

use backoffice::{
    ApiClient, Batch, Category, Expense, Gateway, GatewayError, HttpGateway, ReferenceKind,
    StaticToken,
};

const TOKEN: &str = "t0ken";

#[derive(Clone, Default)]
struct Hits(Arc<AtomicUsize>);

impl Hits {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

fn check(headers: &HeaderMap, hits: &Hits) -> Result<(), Response> {
    hits.0.fetch_add(1, Ordering::SeqCst);
    let expected = format!("Bearer {TOKEN}");
    match headers.get(header::AUTHORIZATION) {
        Some(value) if value.as_bytes() == expected.as_bytes() => Ok(()),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Unauthenticated."})),
        )
            .into_response()),
    }
}

fn batch_json(id: i64) -> Value {
    json!({
        "id": id,
        "name": "Morning",
        "start_date": "2025-01-06",
        "end_date": "2025-03-28",
        "start_time": "09:00:00",
        "end_time": "11:00:00",
        "student_limit": "25",
        "course_id": 2,
        "branch_id": 5,
        "course": {"id": 2, "course_name": "Rust 101"},
        "branch": {"id": 5, "branch_name": "Downtown"}
    })
}

async fn list_batches(State(hits): State<Hits>, headers: HeaderMap) -> Response {
    if let Err(res) = check(&headers, &hits) {
        return res;
    }
    Json(json!([batch_json(1), batch_json(2)])).into_response()
}

async fn show_batch(
    State(hits): State<Hits>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(res) = check(&headers, &hits) {
        return res;
    }
    if id != 1 {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Batch not found"})),
        )
            .into_response();
    }
    Json(json!({"status": true, "data": batch_json(1)})).into_response()
}

async fn create_batch(
    State(hits): State<Hits>,
    headers: HeaderMap,
    Json(body): Json<Map<String, Value>>,
) -> Response {
    if let Err(res) = check(&headers, &hits) {
        return res;
    }
    let mut record = body;
    record.insert("id".to_string(), json!(10));
    (StatusCode::CREATED, Json(json!({"data": record}))).into_response()
}

async fn update_batch(State(hits): State<Hits>, headers: HeaderMap) -> Response {
    if let Err(res) = check(&headers, &hits) {
        return res;
    }
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "message": "The given data was invalid.",
            "errors": {"start_time": ["Batch overlaps with Evening"]}
        })),
    )
        .into_response()
}

async fn destroy_batch(State(hits): State<Hits>, headers: HeaderMap) -> Response {
    if let Err(res) = check(&headers, &hits) {
        return res;
    }
    Json(json!({"status": true, "message": "Batch deleted"})).into_response()
}

async fn list_categories(State(hits): State<Hits>, headers: HeaderMap) -> Response {
    if let Err(res) = check(&headers, &hits) {
        return res;
    }
    Json(json!({"data": [
        {"id": 1, "name": "Rent", "branch_id": 5},
        {"id": 2, "name": "Snacks", "branch_id": 6}
    ]}))
    .into_response()
}

async fn destroy_category(State(hits): State<Hits>, headers: HeaderMap) -> Response {
    if let Err(res) = check(&headers, &hits) {
        return res;
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn list_expenses(State(hits): State<Hits>, headers: HeaderMap) -> Response {
    if let Err(res) = check(&headers, &hits) {
        return res;
    }
    Json(json!({"status": true, "data": [{
        "id": 7,
        "category_id": 1,
        "branch_id": 5,
        "category": {"id": 1, "name": "Rent"},
        "branch": {"id": 5, "branch_name": "Downtown"},
        "payment_to": "Landlord",
        "amount": "1500.00",
        "payment_mode": "Bank Transfer",
        "expense_date": "2025-02-01T00:00:00.000000Z",
        "description": null
    }]}))
    .into_response()
}

async fn failing_expense_update(State(hits): State<Hits>, headers: HeaderMap) -> Response {
    if let Err(res) = check(&headers, &hits) {
        return res;
    }
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"message": "Server Error"})),
    )
        .into_response()
}

async fn list_branches(State(hits): State<Hits>, headers: HeaderMap) -> Response {
    if let Err(res) = check(&headers, &hits) {
        return res;
    }
    Json(json!([
        {"id": 5, "branch_name": "Downtown"},
        {"id": 6, "branch_name": "Uptown"}
    ]))
    .into_response()
}

async fn list_courses(State(hits): State<Hits>, headers: HeaderMap) -> Response {
    if let Err(res) = check(&headers, &hits) {
        return res;
    }
    Json(json!({"data": [{"id": 2, "course_name": "Rust 101"}]})).into_response()
}

async fn spawn_api() -> (SocketAddr, Hits) {
    let hits = Hits::default();
    let app = Router::new()
        .route("/api/batches/show", get(list_batches))
        .route("/api/batches/show/{id}", get(show_batch))
        .route("/api/batches/create", post(create_batch))
        .route("/api/batches/update/{id}", put(update_batch))
        .route("/api/batches/destroy/{id}", delete(destroy_batch))
        .route("/api/categories", get(list_categories))
        .route("/api/categories/{id}", delete(destroy_category))
        .route("/api/expenses", get(list_expenses))
        .route("/api/expenses/{id}", put(failing_expense_update))
        .route("/api/branches", get(list_branches))
        .route("/api/courses/index", get(list_courses))
        .with_state(hits.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, hits)
}

fn client(addr: SocketAddr, token: Option<&str>) -> ApiClient {
    ApiClient::new(
        &format!("http://{addr}/api"),
        Duration::from_secs(5),
        Arc::new(StaticToken(token.map(str::to_string))),
    )
    .unwrap()
}

fn gateway<R: backoffice::Resource>(addr: SocketAddr) -> HttpGateway<R> {
    HttpGateway::new(client(addr, Some(TOKEN)))
}

#[tokio::test]
async fn batch_list_accepts_bare_array() {
    let (addr, _) = spawn_api().await;
    let batches = gateway::<Batch>(addr).list().await.unwrap();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].student_limit, Some(25));
    assert_eq!(
        batches[0].course.as_ref().map(|c| c.display_name.as_str()),
        Some("Rust 101")
    );
}

#[tokio::test]
async fn batch_get_unwraps_status_envelope() {
    let (addr, _) = spawn_api().await;
    let batch = gateway::<Batch>(addr).get(1).await.unwrap();
    assert_eq!(batch.id, 1);
    assert_eq!(batch.name, "Morning");
}

#[tokio::test]
async fn batch_get_of_missing_id_is_not_found() {
    let (addr, _) = spawn_api().await;
    let err = gateway::<Batch>(addr).get(99).await.unwrap_err();
    assert_eq!(err, GatewayError::NotFound);
}

#[tokio::test]
async fn batch_create_returns_persisted_record() {
    let (addr, _) = spawn_api().await;
    let mut fields = Map::new();
    fields.insert("name".to_string(), json!("Weekend"));
    fields.insert("student_limit".to_string(), json!(12));
    fields.insert("branch_id".to_string(), json!(5));

    let batch = gateway::<Batch>(addr).create(fields).await.unwrap();
    assert_eq!(batch.id, 10);
    assert_eq!(batch.name, "Weekend");
    assert_eq!(batch.student_limit, Some(12));
}

#[tokio::test]
async fn batch_update_rejection_carries_field_message() {
    let (addr, _) = spawn_api().await;
    let err = gateway::<Batch>(addr)
        .update(1, Map::new())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        GatewayError::Validation("Batch overlaps with Evening".to_string())
    );
}

#[tokio::test]
async fn batch_delete_accepts_status_message_body() {
    let (addr, _) = spawn_api().await;
    gateway::<Batch>(addr).delete(1).await.unwrap();
}

#[tokio::test]
async fn category_list_unwraps_data_envelope() {
    let (addr, _) = spawn_api().await;
    let categories = gateway::<Category>(addr).list().await.unwrap();
    let names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Rent", "Snacks"]);
}

#[tokio::test]
async fn category_get_falls_back_to_list() {
    let (addr, _) = spawn_api().await;
    let gateway = gateway::<Category>(addr);
    assert_eq!(gateway.get(2).await.unwrap().name, "Snacks");
    assert_eq!(gateway.get(3).await.unwrap_err(), GatewayError::NotFound);
}

#[tokio::test]
async fn category_delete_accepts_empty_body() {
    let (addr, _) = spawn_api().await;
    gateway::<Category>(addr).delete(1).await.unwrap();
}

#[tokio::test]
async fn expense_list_normalizes_amount_and_references() {
    let (addr, _) = spawn_api().await;
    let expenses = gateway::<Expense>(addr).list().await.unwrap();
    let expense = &expenses[0];
    assert_eq!(expense.amount, Decimal::new(1500, 0));
    assert_eq!(
        expense.branch.as_ref().map(|b| b.display_name.as_str()),
        Some("Downtown")
    );
    assert_eq!(expense.description, None);
}

#[tokio::test]
async fn expense_server_failure_is_server_error() {
    let (addr, _) = spawn_api().await;
    let err = gateway::<Expense>(addr)
        .update(7, Map::new())
        .await
        .unwrap_err();
    assert_eq!(err, GatewayError::Server("Server Error".to_string()));
}

#[tokio::test]
async fn reference_lists_accept_both_shapes() {
    let (addr, _) = spawn_api().await;
    let gateway = gateway::<Batch>(addr);
    let branches = gateway.references(ReferenceKind::Branch).await.unwrap();
    let courses = gateway.references(ReferenceKind::Course).await.unwrap();
    assert_eq!(branches.len(), 2);
    assert_eq!(branches[1].display_name, "Uptown");
    assert_eq!(courses[0].display_name, "Rust 101");
}

#[tokio::test]
async fn missing_token_short_circuits_before_the_network() {
    let (addr, hits) = spawn_api().await;
    let gateway: HttpGateway<Batch> = HttpGateway::new(client(addr, None));
    assert_eq!(gateway.list().await.unwrap_err(), GatewayError::Auth);
    assert_eq!(gateway.delete(1).await.unwrap_err(), GatewayError::Auth);
    assert_eq!(hits.count(), 0);
}

#[tokio::test]
async fn rejected_token_is_auth_error() {
    let (addr, hits) = spawn_api().await;
    let gateway: HttpGateway<Batch> = HttpGateway::new(client(addr, Some("expired")));
    assert_eq!(gateway.list().await.unwrap_err(), GatewayError::Auth);
    assert_eq!(hits.count(), 1);
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = gateway::<Category>(addr).list().await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)), "got {err:?}");
}
