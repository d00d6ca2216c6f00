use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpResponse, HttpServer, ResponseError};
use docsearch_core::{Error, QueryParams, SchemaRegistry};
use docsearch_search::SearchOrchestrator;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Error surfaced by a handler, rendered as `{"message": ...}`
#[derive(Debug)]
pub struct ApiError(pub Error);

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "message": self.0.to_string()
        }))
    }
}

type ApiResult = Result<HttpResponse, ApiError>;

pub struct RestApi;

impl RestApi {
    pub async fn start(service: Arc<SearchOrchestrator>, port: u16) -> std::io::Result<()> {
        info!("Serving document types {:?}", service.schema().doc_types());

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            let service = service.clone();
            App::new()
                .wrap(cors)
                .configure(move |cfg| configure(cfg, service))
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }
}

/// Register the `/v1` routes backed by `service`
pub fn configure(cfg: &mut web::ServiceConfig, service: Arc<SearchOrchestrator>) {
    cfg.app_data(web::Data::new(service))
        .route("/v1/{resource}", web::get().to(search))
        .route("/v1/{resource}/{ids}", web::get().to(fetch));
}

async fn search(
    service: web::Data<Arc<SearchOrchestrator>>,
    path: web::Path<String>,
    query: web::Query<Vec<(String, String)>>,
) -> ApiResult {
    let doc_type = resolve_resource(service.schema(), &path.into_inner())?;
    let params = QueryParams::from_pairs(query.into_inner());
    let callback = params.get_present("callback");
    debug!("Search on '{}' with {} parameter(s)", doc_type, params.len());

    let service = service.get_ref().clone();
    let response = web::block(move || service.search(&doc_type, &params))
        .await
        .map_err(|_| Error::BackendUnavailable)??;

    render(&response, callback.as_deref())
}

async fn fetch(
    service: web::Data<Arc<SearchOrchestrator>>,
    path: web::Path<(String, String)>,
    query: web::Query<Vec<(String, String)>>,
) -> ApiResult {
    let (resource, ids) = path.into_inner();
    let doc_type = resolve_resource(service.schema(), &resource)?;
    let callback = QueryParams::from_pairs(query.into_inner()).get_present("callback");

    let service = service.get_ref().clone();
    let response = web::block(move || service.fetch(&doc_type, ids.as_str()))
        .await
        .map_err(|_| Error::BackendUnavailable)??;

    render(&response, callback.as_deref())
}

/// Document type served under `/v1/{resource}`; `items` serves `item`
fn resolve_resource(schema: &SchemaRegistry, resource: &str) -> Result<String, Error> {
    if schema.contains(resource) {
        return Ok(resource.to_string());
    }

    match resource.strip_suffix('s') {
        Some(singular) if schema.contains(singular) => Ok(singular.to_string()),
        _ => Err(Error::UnknownResource(resource.to_string())),
    }
}

/// JSON body, or `callback(<json>)` as JavaScript when a callback is given
fn render<T: Serialize>(body: &T, callback: Option<&str>) -> ApiResult {
    let Some(callback) = callback else {
        return Ok(HttpResponse::Ok().json(body));
    };

    if !is_valid_callback(callback) {
        return Err(Error::invalid_value("callback", "not a valid JavaScript function name").into());
    }

    let json = serde_json::to_string(body)
        .map_err(|e| Error::Backend(format!("failed to encode response: {}", e)))?;
    Ok(HttpResponse::Ok()
        .content_type("application/javascript")
        .body(format!("{}({})", callback, json)))
}

fn is_valid_callback(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.'))
}
