use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse, Result};
use log::{error, warn};

use crate::error::ApiError;
use crate::models::{HealthStatus, PredictionRequest, HEALTH_STATUS};
use crate::state::AppState;

/// Registers the API routes. Shared by `main` and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .service(web::resource("/").route(web::get().to(health)))
        .service(web::resource("/cities").route(web::get().to(cities)))
        .service(web::resource("/predict").route(web::post().to(predict)));
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    warn!("rejected prediction body: {}", err);
    ApiError::BadRequest(err.to_string()).into()
}

pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthStatus {
        status: HEALTH_STATUS,
        model_loaded: state.predictions.is_model_loaded(),
    })
}

pub async fn cities(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let index = state.cities.list()?;
    Ok(HttpResponse::Ok().json(index))
}

pub async fn predict(
    state: web::Data<AppState>,
    payload: web::Json<PredictionRequest>,
) -> Result<HttpResponse, ApiError> {
    if !state.predictions.is_model_loaded() {
        return Err(ApiError::ModelUnavailable);
    }

    let request = payload.into_inner();
    let result = web::block(move || state.predictions.predict(&request))
        .await
        .map_err(|e| {
            error!("prediction worker failed: {}", e);
            ApiError::Worker(e.to_string())
        })??;

    Ok(HttpResponse::Ok().json(result))
}
