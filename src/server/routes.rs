use crate::chart::ChartFrame;
use crate::server::clock::{ClockCommand, ClockState};
use crate::server::error::ApiError;
use crate::server::AppState;
use crate::telemetry::parsing::SampleBatch;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::{Html, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_dashboard))
        .route("/charts/:surface", get(get_chart_page))
        .route("/charts/:surface/frame", get(get_chart_frame))
        .route("/series/:series/samples", post(post_samples))
        .route("/clock", get(get_clock).post(post_clock))
        .route("/ws", get(get_frames_ws))
        .route("/health", get(get_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn get_dashboard(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let dashboard = state.dashboard()?;

    let panels: String = dashboard
        .charts()
        .map(|chart| format!("<section class=\"panel\">{}</section>\n", chart.to_inline_html()))
        .collect();

    Ok(Html(format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Telemetry</title>
<script src="{PLOTLY_JS}"></script>
<style>
body {{ background: #111; margin: 0; display: grid; grid-template-columns: repeat(auto-fill, minmax(420px, 1fr)); gap: 8px; padding: 8px; }}
.panel {{ height: 220px; }}
</style>
</head>
<body>
{panels}<script>
const socket = new WebSocket(`ws://${{location.host}}/ws`);
socket.onmessage = (event) => {{
  const frame = JSON.parse(event.data);
  const yaxis = frame.y_range ? {{ "yaxis.range": frame.y_range }} : {{ "yaxis.autorange": true }};
  Plotly.update(frame.surface, {{ x: [frame.labels], y: [frame.values] }}, yaxis, [0]);
}};
</script>
</body>
</html>"#
    )))
}

async fn get_chart_page(
    State(state): State<AppState>,
    Path(surface): Path<String>,
) -> Result<Html<String>, ApiError> {
    let dashboard = state.dashboard()?;
    let chart = dashboard
        .chart(&surface)
        .ok_or(ApiError::UnknownSurface(surface))?;

    Ok(Html(chart.to_html()))
}

async fn get_chart_frame(
    State(state): State<AppState>,
    Path(surface): Path<String>,
) -> Result<Json<ChartFrame>, ApiError> {
    let dashboard = state.dashboard()?;
    let chart = dashboard
        .chart(&surface)
        .ok_or(ApiError::UnknownSurface(surface))?;

    Ok(Json(chart.frame()))
}

#[derive(Debug, Serialize)]
struct Accepted {
    series: String,
    accepted: usize,
    total: usize,
}

async fn post_samples(
    State(state): State<AppState>,
    Path(series): Path<String>,
    Json(batch): Json<SampleBatch>,
) -> Result<Json<Accepted>, ApiError> {
    let samples = batch.into_samples()?;

    state.db.submit_samples(&series, &samples)?;
    let total = state.dashboard()?.append(&series, &samples);

    debug!(%series, accepted = samples.len(), total, "samples appended");

    Ok(Json(Accepted {
        series,
        accepted: samples.len(),
        total,
    }))
}

async fn get_clock(State(state): State<AppState>) -> Result<Json<ClockState>, ApiError> {
    Ok(Json(state.dashboard()?.clock()))
}

async fn post_clock(
    State(state): State<AppState>,
    Json(command): Json<ClockCommand>,
) -> Result<Json<ClockState>, ApiError> {
    let clock = state.dashboard()?.apply(command)?;
    Ok(Json(clock))
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    started_at: String,
    uptime_seconds: i64,
    charts: usize,
    sim_time: f64,
}

async fn get_health(State(state): State<AppState>) -> Result<Json<Health>, ApiError> {
    let dashboard = state.dashboard()?;

    Ok(Json(Health {
        status: "ok",
        started_at: state.db.start_time().to_rfc3339(),
        uptime_seconds: state.db.uptime().num_seconds(),
        charts: dashboard.charts().count(),
        sim_time: dashboard.clock().time,
    }))
}

async fn get_frames_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| stream_frames(socket, state))
}

async fn stream_frames(mut socket: WebSocket, state: AppState) {
    let mut frames = state.frames.subscribe();

    // Bring the new client up to date before streaming.
    let current: Vec<ChartFrame> = match state.dashboard() {
        Ok(dashboard) => dashboard.charts().map(|chart| chart.frame()).collect(),
        Err(err) => {
            warn!(error = %err, "closing frame stream");
            return;
        }
    };

    info!("frame stream opened");

    for frame in current {
        if send_frame(&mut socket, &frame).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            frame = frames.recv() => match frame {
                Ok(frame) => {
                    if send_frame(&mut socket, &frame).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "frame stream lagging"),
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    info!("frame stream closed");
}

async fn send_frame(socket: &mut WebSocket, frame: &ChartFrame) -> Result<(), axum::Error> {
    let text = serde_json::to_string(frame).map_err(axum::Error::new)?;
    socket.send(Message::Text(text)).await
}
