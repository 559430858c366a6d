use std::{sync::Arc, time::Instant};

use axum::{
    body::Bytes,
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_macros::debug_handler;
use common::model::{
    frame::{FrameActionPayload, InboundRequest, RenderDescriptor, StepId, View},
    transaction::{TransactionParams, TransactionResponse, SEND_TRANSACTION},
};
use ethers::utils::to_checksum;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    error::FrameError,
    model::{
        external::{HealthzResponse, ImageQuery},
        internal::UnsignedBetCall,
    },
    service::{
        bet_transaction::BetTransactionBuilder,
        frame_flow::FrameFlowController,
        render::{frame_html, view_svg, Links},
    },
};

const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Shared, read-only handler state. Nothing in here changes per request.
pub struct FrameApiState {
    pub flow: FrameFlowController,
    pub bets: BetTransactionBuilder,
    pub links: Links,
}

impl FrameApiState {
    // JSON for API clients, a frame document for everyone else
    fn respond(&self, headers: &HeaderMap, descriptor: &RenderDescriptor) -> Response {
        let wants_json = headers
            .get(header::ACCEPT)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|accept| accept.contains("application/json"));
        if wants_json {
            Json(descriptor).into_response()
        } else {
            Html(frame_html(descriptor, &self.links)).into_response()
        }
    }
}

pub fn router(state: FrameApiState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/frame/{step}", get(initial_frame).post(respond_frame))
        .route("/api/reset", get(reset).post(reset))
        .route("/api/bet/{choice}", post(bet))
        .route("/api/image", get(image))
        .layer(middleware::from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

async fn healthz() -> Json<HealthzResponse> {
    Json(HealthzResponse { ok: true })
}

#[debug_handler]
async fn initial_frame(
    State(state): State<Arc<FrameApiState>>,
    Path(step): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Ok(step) = step.parse::<StepId>() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let descriptor = state.flow.handle(&InboundRequest::initial(step)).await;
    state.respond(&headers, &descriptor)
}

#[debug_handler]
async fn respond_frame(
    State(state): State<Arc<FrameApiState>>,
    Path(step): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Ok(step) = step.parse::<StepId>() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let payload = parse_payload(&body);
    let request = InboundRequest::response(step, &payload);
    debug!("Frame action {:?}", request);
    let descriptor = state.flow.handle(&request).await;
    state.respond(&headers, &descriptor)
}

// A body we can't read is treated like one without button or text
fn parse_payload(body: &[u8]) -> FrameActionPayload {
    if body.is_empty() {
        return FrameActionPayload::default();
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        warn!("Ignoring malformed frame action body: {}", e);
        FrameActionPayload::default()
    })
}

#[debug_handler]
async fn reset(State(state): State<Arc<FrameApiState>>, headers: HeaderMap) -> Response {
    state.respond(&headers, &FrameFlowController::reset())
}

#[debug_handler]
async fn bet(
    State(state): State<Arc<FrameApiState>>,
    Path(choice): Path<String>,
) -> Result<Json<TransactionResponse>, FrameError> {
    let call = state.bets.build(&choice).inspect_err(|e| warn!("{}", e))?;
    info!("Built {} call with args {:?}", call.function_name, call.args);
    Ok(Json(transaction_response(&call)))
}

pub fn transaction_response(call: &UnsignedBetCall) -> TransactionResponse {
    TransactionResponse {
        chain_id: call.chain_id.clone(),
        method: SEND_TRANSACTION.to_owned(),
        params: TransactionParams {
            abi: vec![place_bet_abi()],
            to: to_checksum(&call.contract_address, None),
            data: call.calldata.to_string(),
            value: call.value.to_string(),
        },
    }
}

fn place_bet_abi() -> Value {
    json!({
        "type": "function",
        "name": "placeBet",
        "stateMutability": "payable",
        "inputs": [{ "name": "choice", "type": "uint8" }],
        "outputs": []
    })
}

async fn image(Query(query): Query<ImageQuery>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "max-age=0"),
        ],
        view_svg(&View::from(query)),
    )
}

async fn request_id(req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(&REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();
    let mut response = next.run(req).await;
    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID, header_value);
    }
    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "http.request"
    );
    response
}
