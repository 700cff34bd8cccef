use crate::gui_bridge::model::{FrameRequest, FrameStep, ModeRequest, StatusReply};
use aquacore::prelude::PipelineError;
use aquacore::{MonitorService, SearchInput};
use log::{error, info, warn};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::{Filter, Rejection, Reply};

#[derive(Debug)]
struct BridgeError(String);

impl warp::reject::Reject for BridgeError {}

type JsonReply = WithStatus<Json>;

fn reply<T: Serialize>(body: &T, status: StatusCode) -> JsonReply {
    warp::reply::with_status(warp::reply::json(body), status)
}

fn reject(err: PipelineError) -> Rejection {
    error!("bridge request failed: {}", err);
    warp::reject::custom(BridgeError(err.to_string()))
}

/// HTTP face of the monitor: serves the current map scene and turns POSTs
/// into user actions on the session.
pub struct GuiBridge {
    service: MonitorService,
}

impl GuiBridge {
    pub fn new(service: MonitorService) -> Self {
        Self { service }
    }

    pub fn routes(&self) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
        let service = self.service.clone();
        let service_filter = warp::any().map(move || service.clone());

        let scene_route = warp::path("scene")
            .and(warp::path::end())
            .and(warp::get())
            .and(service_filter.clone())
            .and_then(get_scene);

        let metrics_route = warp::path("metrics")
            .and(warp::path::end())
            .and(warp::get())
            .and(service_filter.clone())
            .and_then(get_metrics);

        let search_route = warp::path("search")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .and(service_filter.clone())
            .and_then(post_search);

        let monitor_route = warp::path("monitor")
            .and(warp::path::end())
            .and(warp::post())
            .and(service_filter.clone())
            .and_then(post_monitor);

        let mode_route = warp::path("mode")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .and(service_filter.clone())
            .and_then(post_mode);

        let frame_route = warp::path("frame")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .and(service_filter.clone())
            .and_then(post_frame);

        let reset_alerts_route = warp::path!("alerts" / "reset")
            .and(warp::post())
            .and(service_filter.clone())
            .and_then(post_reset_alerts);

        let reset_view_route = warp::path!("view" / "reset")
            .and(warp::post())
            .and(service_filter)
            .and_then(post_reset_view);

        scene_route
            .or(metrics_route)
            .unify()
            .or(search_route)
            .unify()
            .or(monitor_route)
            .unify()
            .or(mode_route)
            .unify()
            .or(frame_route)
            .unify()
            .or(reset_alerts_route)
            .unify()
            .or(reset_view_route)
            .unify()
            .recover(recover)
    }

    pub fn serve(&self, address: SocketAddr) -> JoinHandle<()> {
        let routes = self.routes();
        info!("bridge listening on http://{}", address);
        tokio::spawn(async move {
            warp::serve(routes).run(address).await;
        })
    }

    pub fn publish_status(&self, message: &str) {
        println!("[GUI] {}", message);
    }
}

async fn get_scene(service: MonitorService) -> Result<JsonReply, Rejection> {
    let scene = service.scene().map_err(reject)?;
    Ok(reply(&scene, StatusCode::OK))
}

async fn get_metrics(service: MonitorService) -> Result<JsonReply, Rejection> {
    Ok(reply(&service.metrics(), StatusCode::OK))
}

async fn post_search(input: SearchInput, service: MonitorService) -> Result<JsonReply, Rejection> {
    match service.search(&input).await.map_err(reject)? {
        Some(location) => Ok(reply(
            &StatusReply {
                location: Some(location),
                ..StatusReply::ok()
            },
            StatusCode::OK,
        )),
        None => Ok(reply(
            &StatusReply::with_status("no_match", "location not found"),
            StatusCode::OK,
        )),
    }
}

async fn post_monitor(service: MonitorService) -> Result<JsonReply, Rejection> {
    match service.spawn_time_series() {
        Ok(_) => Ok(reply(
            &StatusReply::with_status("started", "time series requested"),
            StatusCode::ACCEPTED,
        )),
        Err(err @ PipelineError::AlreadyMonitoring) => {
            warn!("time series refused: {}", err);
            Ok(reply(&StatusReply::with_status("busy", err.to_string()), StatusCode::CONFLICT))
        }
        Err(err @ PipelineError::NoLocation) => Ok(reply(
            &StatusReply::with_status("rejected", err.to_string()),
            StatusCode::CONFLICT,
        )),
        Err(err) => Err(reject(err)),
    }
}

async fn post_mode(request: ModeRequest, service: MonitorService) -> Result<JsonReply, Rejection> {
    let changed = service.set_mode(request.mode).map_err(reject)?;
    Ok(reply(
        &StatusReply {
            changed: Some(changed),
            ..StatusReply::ok()
        },
        StatusCode::OK,
    ))
}

async fn post_frame(request: FrameRequest, service: MonitorService) -> Result<JsonReply, Rejection> {
    let changed = match request {
        FrameRequest::Index { index } => service.select_frame(index),
        FrameRequest::Step {
            step: FrameStep::Next,
        } => service.next_frame(),
        FrameRequest::Step {
            step: FrameStep::Previous,
        } => service.previous_frame(),
    }
    .map_err(reject)?;
    Ok(reply(
        &StatusReply {
            changed: Some(changed),
            ..StatusReply::ok()
        },
        StatusCode::OK,
    ))
}

async fn post_reset_alerts(service: MonitorService) -> Result<JsonReply, Rejection> {
    service.reset_alerts().map_err(reject)?;
    Ok(reply(&StatusReply::ok(), StatusCode::OK))
}

async fn post_reset_view(service: MonitorService) -> Result<JsonReply, Rejection> {
    service.reset_view().map_err(reject)?;
    Ok(reply(&StatusReply::ok(), StatusCode::OK))
}

async fn recover(rejection: Rejection) -> Result<JsonReply, Rejection> {
    if let Some(BridgeError(message)) = rejection.find::<BridgeError>() {
        return Ok(reply(
            &StatusReply::with_status("error", message.clone()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ));
    }
    Err(rejection)
}
