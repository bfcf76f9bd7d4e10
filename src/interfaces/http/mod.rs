use std::sync::Arc;

use actix_web::{
    delete, dev::Server, get, http::StatusCode, post, put, web, App, HttpResponse, HttpServer,
    Responder,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::application::{PlaceImportUseCase, PlaceService};
use crate::domain::error::AppError;
use crate::domain::geo::LatLng;
use crate::domain::import::{ImportOutcome, ImportSummary};
use crate::domain::place::Place;

/// Upper bound for an uploaded import CSV.
const MAX_CSV_BYTES: usize = 10 * 1024 * 1024;

pub struct HttpState {
    pub import_use_case: Arc<PlaceImportUseCase>,
    pub place_service: Arc<PlaceService>,
}

#[derive(Serialize)]
struct ImportResponse {
    ok: bool,
    summary: ImportSummary,
    results: Vec<ImportOutcome>,
}

#[derive(Serialize)]
struct PlacesResponse {
    places: Vec<Place>,
}

#[derive(Debug, Deserialize)]
pub struct OriginQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl OriginQuery {
    fn origin(&self) -> Option<LatLng> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                Some(LatLng::new(lat, lng))
            }
            _ => None,
        }
    }
}

fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::ValidationError(_) | AppError::ParseError(_) => StatusCode::BAD_REQUEST,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &AppError) -> HttpResponse {
    let status = status_for(err);
    if status.is_server_error() {
        error!(error = %err, "Request failed");
    }
    HttpResponse::build(status).json(json!({ "ok": false, "error": err.message() }))
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "ok": true }))
}

#[post("/import/csv")]
async fn import_csv(data: web::Data<HttpState>, body: String) -> impl Responder {
    info!(bytes = body.len(), "CSV import requested");

    match data.import_use_case.import_csv(&body).await {
        Ok(report) => HttpResponse::Ok().json(ImportResponse {
            ok: true,
            summary: report.summary,
            results: report.results,
        }),
        Err(e) => error_response(&e),
    }
}

#[get("/places")]
async fn list_places(data: web::Data<HttpState>, query: web::Query<OriginQuery>) -> impl Responder {
    match data.place_service.list_places(query.origin()).await {
        Ok(places) => HttpResponse::Ok().json(PlacesResponse { places }),
        Err(e) => error_response(&e),
    }
}

#[post("/places")]
async fn create_place(data: web::Data<HttpState>, payload: web::Json<Value>) -> impl Responder {
    match data.place_service.create_place(&payload).await {
        Ok(place) => HttpResponse::Ok().json(place),
        Err(e) => error_response(&e),
    }
}

#[put("/places/{id}")]
async fn update_place(
    data: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<Value>,
) -> impl Responder {
    match data.place_service.update_place(path.into_inner(), &payload).await {
        Ok(place) => HttpResponse::Ok().json(place),
        Err(e) => error_response(&e),
    }
}

#[delete("/places/{id}")]
async fn delete_place(data: web::Data<HttpState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    match data.place_service.delete_place(id).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "ok": true, "id": id })),
        Err(e) => error_response(&e),
    }
}

/// Registers the `/api` routes. Shared by the server and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_CSV_BYTES)).service(
        web::scope("/api")
            .service(health)
            .service(import_csv)
            .service(list_places)
            .service(create_place)
            .service(update_place)
            .service(delete_place),
    );
}

pub fn start_server(state: HttpState, host: &str, port: u16) -> std::io::Result<Server> {
    let state = web::Data::new(state);

    let server = HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
        .bind((host, port))?
        .run();

    info!(host = %host, port = port, "HTTP API listening");
    Ok(server)
}
