use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use fare_model::{features, FareError, FareModel, TripInput};
use std::{net::SocketAddr, sync::Arc};

use crate::types::{ErrorKind, ErrorOut, PredictionOut};

type ErrorResponse = (StatusCode, Json<ErrorOut>);

// ---------- Server state ----------

#[derive(Clone)]
pub struct AppState {
    pub model: Arc<FareModel>, // read-only after load
    pub log_pred: bool,
}

// ---------- Handler ----------

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<TripInput>, JsonRejection>,
) -> Result<Json<PredictionOut>, ErrorResponse> {
    // Missing fields and bad types come back in the same shape as other bad input
    let Json(trip) = payload.map_err(|rej| {
        tracing::warn!("rejected body: {}", rej.body_text());
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorOut {
                error: rej.body_text(),
                kind: ErrorKind::Validation,
            }),
        )
    })?;

    let row = features::reconstruct(&trip, state.model.layout()).map_err(|e| error_response(&e))?;
    if state.log_pred {
        log_features(&state.model, &trip, &row);
    }

    let est = state.model.estimate(&trip, &row).map_err(|e| error_response(&e))?;
    Ok(Json(est.into()))
}

pub fn error_response(err: &FareError) -> ErrorResponse {
    let body = ErrorOut::from(err);
    let status = match body.kind {
        ErrorKind::Validation => {
            tracing::warn!("rejected trip: {}", err);
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ErrorKind::Schema | ErrorKind::Internal => {
            tracing::error!("prediction failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(body))
}

// Summary of the reconstructed vector so an all-zero row is easy to spot.
fn log_features(model: &FareModel, trip: &TripInput, vec: &[f64]) {
    let nz = vec.iter().filter(|x| **x != 0.0).count();
    let mean = if vec.is_empty() { 0.0 } else { vec.iter().sum::<f64>() / (vec.len() as f64) };
    let std = if vec.len() < 2 {
        0.0
    } else {
        (vec.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (vec.len() as f64)).sqrt()
    };
    let mut sample = vec![];
    for (name, v) in model.layout().columns().iter().zip(vec).take(6) {
        sample.push(format!("{}={:.3}", name, v));
    }
    tracing::info!(
        "recv pickup={} dropoff={} in_dim={} nonzero={} mean={:.3} std={:.3} sample=[{}]",
        trip.pickup,
        trip.dropoff,
        vec.len(),
        nz,
        mean,
        std,
        sample.join(", ")
    );
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/predict", post(predict)).with_state(state)
}

pub async fn serve(model: Arc<FareModel>, addr: SocketAddr) -> anyhow::Result<()> {
    let state = AppState {
        model,
        log_pred: std::env::var("LOG_PRED").ok().as_deref() == Some("1"),
    };

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}
