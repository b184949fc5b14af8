//! Metro Transit NexTrip HTTP client.
//!
//! NexTrip lists the stops of a route and the departures at a stop (which
//! carry the stop's position and serving routes). The companion schedule
//! service answers "when does the next trip board at A and reach B", which
//! is how segment times are derived.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{NaiveTime, TimeDelta};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::{debug, trace};

use crate::domain::{Coordinate, Direction, RouteId, StopId};

use super::error::SourceError;
use super::{DataSource, DirectionInfo, StopRecord};

/// Default base URL for the NexTrip service.
const DEFAULT_NEXTRIP_URL: &str = "https://svc.metrotransit.org/nextrip";

/// Default base URL for the schedule service.
const DEFAULT_SCHEDULE_URL: &str = "https://svc.metrotransit.org/schedule";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Configuration for the NexTrip client.
#[derive(Debug, Clone)]
pub struct NexTripConfig {
    /// Base URL of the NexTrip service
    pub nextrip_url: String,
    /// Base URL of the schedule service
    pub schedule_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl NexTripConfig {
    /// Create a config pointing at the production services.
    pub fn new() -> Self {
        Self {
            nextrip_url: DEFAULT_NEXTRIP_URL.to_string(),
            schedule_url: DEFAULT_SCHEDULE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 10,
        }
    }

    /// Set a custom NexTrip base URL (for testing).
    pub fn with_nextrip_url(mut self, url: impl Into<String>) -> Self {
        self.nextrip_url = url.into();
        self
    }

    /// Set a custom schedule base URL (for testing).
    pub fn with_schedule_url(mut self, url: impl Into<String>) -> Self {
        self.schedule_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for NexTripConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// An id that the services send either as a JSON number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

impl RawId {
    fn as_u32(&self) -> Option<u32> {
        match self {
            RawId::Number(n) => u32::try_from(*n).ok(),
            RawId::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DirectionDto {
    direction_id: u8,
    direction_name: String,
}

#[derive(Debug, Deserialize)]
struct RouteStopDto {
    #[serde(default)]
    stop_id: Option<RawId>,
    #[serde(default)]
    place_code: Option<RawId>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    stop_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScheduleResponse {
    #[serde(default)]
    departures: Vec<ScheduledTrip>,
}

#[derive(Debug, Deserialize)]
struct ScheduledTrip {
    board_time: Option<String>,
    exit_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StopDeparturesResponse {
    #[serde(default)]
    stops: Vec<StopLocationDto>,
    #[serde(default)]
    departures: Vec<DepartureDto>,
}

#[derive(Debug, Deserialize)]
struct StopLocationDto {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DepartureDto {
    route_id: Option<RawId>,
}

/// NexTrip API client.
///
/// Uses a semaphore to limit concurrent requests.
#[derive(Debug, Clone)]
pub struct NexTripClient {
    http: reqwest::Client,
    nextrip_url: String,
    schedule_url: String,
    semaphore: Arc<Semaphore>,
}

impl NexTripClient {
    /// Create a new client with the given configuration.
    pub fn new(config: NexTripConfig) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            nextrip_url: config.nextrip_url.trim_end_matches('/').to_string(),
            schedule_url: config.schedule_url.trim_end_matches('/').to_string(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| SourceError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        trace!(url, "NexTrip request");

        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(url.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| SourceError::Json {
            message: e.to_string(),
        })
    }

    async fn stop_departures(&self, stop: StopId) -> Result<StopDeparturesResponse, SourceError> {
        let url = format!("{}/{}", self.nextrip_url, stop);
        self.get_json(&url).await
    }
}

impl DataSource for NexTripClient {
    async fn list_stops(
        &self,
        route: RouteId,
        direction: Direction,
    ) -> Result<Vec<StopRecord>, SourceError> {
        let url = format!("{}/stops/{}/{}", self.nextrip_url, route, direction);
        let raw: Vec<RouteStopDto> = self.get_json(&url).await?;

        let mut stops = Vec::with_capacity(raw.len());
        for dto in raw {
            let id = dto
                .stop_id
                .as_ref()
                .or(dto.place_code.as_ref())
                .and_then(RawId::as_u32);
            let name = dto.description.or(dto.stop_name);

            match (id, name) {
                (Some(id), Some(name)) => stops.push(StopRecord::new(StopId(id), name)),
                (id, name) => {
                    debug!(route = %route, ?id, ?name, "Skipping stop without numeric id or name");
                }
            }
        }

        Ok(stops)
    }

    async fn segment_time(
        &self,
        route: RouteId,
        direction: Direction,
        from: StopId,
        to: StopId,
    ) -> Result<f64, SourceError> {
        let url = format!(
            "{}/stops/{}/{}/{}/{}/",
            self.schedule_url, route, direction, from, to
        );
        let response: ScheduleResponse = self.get_json(&url).await?;

        let trip = response
            .departures
            .iter()
            .find(|t| t.board_time.is_some() && t.exit_time.is_some())
            .ok_or_else(|| {
                SourceError::Malformed(format!("no scheduled trips from {from} to {to}"))
            })?;

        match (&trip.board_time, &trip.exit_time) {
            (Some(board), Some(exit)) => scheduled_minutes(board, exit),
            _ => Err(SourceError::Malformed("trip without times".to_string())),
        }
    }

    async fn coordinate(&self, stop: StopId) -> Result<Coordinate, SourceError> {
        let response = self.stop_departures(stop).await?;

        response
            .stops
            .first()
            .and_then(|s| match (s.latitude, s.longitude) {
                (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
                _ => None,
            })
            .ok_or_else(|| SourceError::Malformed(format!("no location for stop {stop}")))
    }

    async fn routes_serving(&self, stop: StopId) -> Result<BTreeSet<RouteId>, SourceError> {
        let response = self.stop_departures(stop).await?;

        Ok(response
            .departures
            .iter()
            .filter_map(|d| d.route_id.as_ref().and_then(RawId::as_u32))
            .map(RouteId)
            .collect())
    }

    async fn directions(&self, route: RouteId) -> Result<Vec<DirectionInfo>, SourceError> {
        let url = format!("{}/directions/{}", self.nextrip_url, route);
        let raw: Vec<DirectionDto> = self.get_json(&url).await?;

        Ok(raw
            .into_iter()
            .map(|d| DirectionInfo {
                id: Direction(d.direction_id),
                name: d.direction_name,
            })
            .collect())
    }
}

/// Minutes between two "HH:MM:SS" schedule times.
///
/// A trip that exits before it boards is taken to run past midnight.
pub(crate) fn scheduled_minutes(board: &str, exit: &str) -> Result<f64, SourceError> {
    let parse = |s: &str| {
        NaiveTime::parse_from_str(s, "%H:%M:%S")
            .map_err(|e| SourceError::Malformed(format!("invalid schedule time {s:?}: {e}")))
    };

    let board = parse(board)?;
    let exit = parse(exit)?;

    let mut elapsed = exit.signed_duration_since(board);
    if elapsed < TimeDelta::zero() {
        elapsed += TimeDelta::days(1);
    }

    Ok(elapsed.num_seconds() as f64 / 60.0)
}
