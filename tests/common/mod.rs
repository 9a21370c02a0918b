//! In-process fake of the dashboard backend REST API.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::{Value, json};

#[derive(Default)]
pub struct Backend {
    pub pages: Vec<Value>,
    pub saved_orders: Vec<Vec<i64>>,
    pub reject_reorder: bool,
}

pub type Shared = Arc<Mutex<Backend>>;

/// Three pages served out of display order; page 3 is inactive.
pub fn sample_pages() -> Vec<Value> {
    vec![
        json!({"id": 1, "title": "Produção Mensal", "type": "3x2", "order": 2, "active": true,
               "config": {"xlsx_file": "producao.xlsx"}}),
        json!({"id": 2, "title": "Previsão", "type": "2x1-graph", "order": 1, "active": true,
               "config": {"xlsx_file": "previsao.xlsx"}}),
        json!({"id": 3, "title": "Avisos", "type": "text-md", "order": 3, "active": false,
               "config": {"md_file": "avisos.md", "font_size": "20"}}),
    ]
}

pub fn shared(pages: Vec<Value>) -> Shared {
    Arc::new(Mutex::new(Backend {
        pages,
        ..Backend::default()
    }))
}

/// Serve the fake on `127.0.0.1:0` and return its base URL.
pub async fn spawn_backend(backend: Shared) -> String {
    let app = Router::new()
        .route("/api/pages", get(list_pages))
        .route("/api/pages/reorder", post(reorder))
        .route("/api/pages/{id}/toggle", post(toggle))
        .route("/api/data/{source}", get(data))
        .route("/api/version", get(version))
        .route("/pages/{id}/{file}", get(asset))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn list_pages(State(backend): State<Shared>) -> Json<Value> {
    let pages = backend.lock().unwrap().pages.clone();
    Json(json!({ "pages": pages }))
}

async fn reorder(State(backend): State<Shared>, Json(body): Json<Value>) -> impl IntoResponse {
    let mut backend = backend.lock().unwrap();
    if backend.reject_reorder {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "database is locked"})),
        );
    }
    let order: Vec<i64> = body["order"]
        .as_array()
        .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default();
    for (position, id) in order.iter().enumerate() {
        if let Some(page) = backend.pages.iter_mut().find(|p| p["id"] == *id) {
            page["order"] = json!(position + 1);
        }
    }
    backend.saved_orders.push(order);
    (StatusCode::OK, Json(json!({"success": true})))
}

async fn toggle(State(backend): State<Shared>, Path(id): Path<i64>) -> impl IntoResponse {
    let mut backend = backend.lock().unwrap();
    match backend.pages.iter_mut().find(|p| p["id"] == id) {
        Some(page) => {
            let active = page["active"].as_bool().unwrap_or(true);
            page["active"] = json!(!active);
            (StatusCode::OK, Json(json!({"success": true, "page": page.clone()})))
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "error": "Page not found"})),
        ),
    }
}

async fn data(Path(source): Path<String>) -> impl IntoResponse {
    match source.as_str() {
        "production_monthly" => (
            StatusCode::OK,
            Json(json!([
                {"familia": "Caixilharia", "produzido": 1200.0, "meta": 1000.0},
                {"familia": "Portas", "produzido": 450.0, "meta": 500.0}
            ])),
        ),
        "forecast_3months" => (
            StatusCode::OK,
            Json(json!([
                {"mes": "Janeiro", "previsao": 800.0, "real": 900.0},
                {"mes": "Fevereiro", "previsao": 850.0, "real": 700.0}
            ])),
        ),
        "empty" => (StatusCode::OK, Json(json!([]))),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": format!("spreadsheet for {} is unreadable", source)})),
        ),
    }
}

async fn version() -> Json<Value> {
    Json(json!({"version": "1.4.2"}))
}

async fn asset(Path((id, file)): Path<(i64, String)>) -> impl IntoResponse {
    if id == 3 && file == "avisos.md" {
        (StatusCode::OK, "# Avisos\n\nManutenção às **14h**.".to_string())
    } else {
        (StatusCode::NOT_FOUND, String::new())
    }
}
