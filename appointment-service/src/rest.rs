//! REST collaborators
//!
//! Endpoints, relative to `api.base_url`:
//!
//! | Operation | Request |
//! |---|---|
//! | list a doctor's appointments | `GET /appointments?doctorId={id}` |
//! | transition status | `PUT /appointments/{id}` with `{ "status": "completed" }` |
//! | create prescription | `POST /prescriptions` with [`NewPrescription`] |
//!
//! Responses are accepted bare or wrapped in `{ "success": true, "data": ... }`.

use std::time::Duration;

use async_trait::async_trait;
use config_engine::ApiConfig;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AppointmentError, Result};
use crate::models::{Appointment, AppointmentId, AppointmentStatus, DoctorId, NewPrescription, Prescription};
use crate::prescriptions::PrescriptionWriter;
use crate::store::AppointmentStore;

/// Response body, bare or in the API envelope
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Payload<T> {
    fn into_inner(self) -> T {
        match self {
            Payload::Wrapped { data } => data,
            Payload::Bare(data) => data,
        }
    }
}

#[derive(Debug, Serialize)]
struct StatusUpdate {
    status: AppointmentStatus,
}

/// Current status echoed back by the backend when it refuses a transition
#[derive(Debug, Deserialize)]
struct StatusConflict {
    status: AppointmentStatus,
}

/// Shared HTTP plumbing of the REST collaborators
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl RestClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppointmentError::Remote(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.http.request(method, self.url(path));
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, operation: &str) -> Result<Response> {
        request.send().await.map_err(|e| {
            warn!(operation, error = %e, "Backend request failed");
            AppointmentError::Remote(format!("{} failed: {}", operation, e))
        })
    }

    async fn read<T: DeserializeOwned>(response: Response, operation: &str) -> Result<T> {
        response
            .json::<Payload<T>>()
            .await
            .map(Payload::into_inner)
            .map_err(|e| AppointmentError::Remote(format!("{}: unexpected response body: {}", operation, e)))
    }
}

/// Error for a non-success status. The body is only inspected for the
/// current appointment status, never copied into the message.
fn error_for_status(
    operation: &str,
    status: StatusCode,
    body: &[u8],
    transition: Option<(&AppointmentId, AppointmentStatus)>,
) -> AppointmentError {
    match (status, transition) {
        (StatusCode::NOT_FOUND, Some((appointment_id, _))) => AppointmentError::NotFound(appointment_id.clone()),
        (StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY, Some((appointment_id, to))) => {
            match serde_json::from_slice::<Payload<StatusConflict>>(body) {
                Ok(conflict) => AppointmentError::InvalidTransition {
                    appointment_id: appointment_id.clone(),
                    from: conflict.into_inner().status,
                    to,
                },
                Err(_) => AppointmentError::Remote(format!("{} rejected with status {}", operation, status)),
            }
        }
        (StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY, None) => {
            AppointmentError::Validation(format!("{} was rejected by the server", operation))
        }
        _ => AppointmentError::Remote(format!("{} failed with status {}", operation, status)),
    }
}

async fn failure(
    response: Response,
    operation: &str,
    transition: Option<(&AppointmentId, AppointmentStatus)>,
) -> AppointmentError {
    let status = response.status();
    let body = response.bytes().await.unwrap_or_default();
    warn!(operation, status = status.as_u16(), "Backend returned an error");
    error_for_status(operation, status, &body, transition)
}

/// [`AppointmentStore`] backed by the hospital REST API
#[derive(Debug, Clone)]
pub struct RestAppointmentStore {
    client: RestClient,
}

impl RestAppointmentStore {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AppointmentStore for RestAppointmentStore {
    async fn list_for_doctor(&self, doctor_id: &DoctorId) -> Result<Vec<Appointment>> {
        const OPERATION: &str = "list appointments";

        let request = self
            .client
            .request(Method::GET, "appointments")
            .query(&[("doctorId", doctor_id.as_str())]);
        let response = self.client.send(request, OPERATION).await?;
        if !response.status().is_success() {
            return Err(failure(response, OPERATION, None).await);
        }

        let appointments: Vec<Appointment> = RestClient::read(response, OPERATION).await?;
        debug!(doctor_id = %doctor_id, count = appointments.len(), "Fetched appointments");
        Ok(appointments)
    }

    async fn set_status(&self, appointment_id: &AppointmentId, status: AppointmentStatus) -> Result<Appointment> {
        const OPERATION: &str = "update appointment status";

        let path = format!("appointments/{}", appointment_id);
        let request = self
            .client
            .request(Method::PUT, &path)
            .json(&StatusUpdate { status });
        let response = self.client.send(request, OPERATION).await?;
        if !response.status().is_success() {
            return Err(failure(response, OPERATION, Some((appointment_id, status))).await);
        }

        RestClient::read(response, OPERATION).await
    }
}

/// [`PrescriptionWriter`] backed by the hospital REST API
#[derive(Debug, Clone)]
pub struct RestPrescriptionWriter {
    client: RestClient,
}

impl RestPrescriptionWriter {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PrescriptionWriter for RestPrescriptionWriter {
    async fn create(&self, prescription: NewPrescription) -> Result<Prescription> {
        const OPERATION: &str = "create prescription";

        let request = self
            .client
            .request(Method::POST, "prescriptions")
            .json(&prescription);
        let response = self.client.send(request, OPERATION).await?;
        if !response.status().is_success() {
            return Err(failure(response, OPERATION, None).await);
        }

        RestClient::read(response, OPERATION).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> RestClient {
        RestClient::new(&ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        assert_eq!(client("https://hms.local/api/").url("/appointments"), "https://hms.local/api/appointments");
        assert_eq!(client("https://hms.local/api").url("prescriptions"), "https://hms.local/api/prescriptions");
    }

    #[test]
    fn test_payload_accepts_envelope_and_bare_body() {
        let wrapped: Payload<Vec<u32>> = serde_json::from_str(r#"{ "success": true, "data": [1, 2] }"#).unwrap();
        assert_eq!(wrapped.into_inner(), vec![1, 2]);

        let bare: Payload<Vec<u32>> = serde_json::from_str("[3]").unwrap();
        assert_eq!(bare.into_inner(), vec![3]);
    }

    #[test]
    fn test_conflict_maps_to_invalid_transition() {
        let id = AppointmentId::new("apt-9");
        let err = error_for_status(
            "update appointment status",
            StatusCode::CONFLICT,
            br#"{ "data": { "status": "cancelled" } }"#,
            Some((&id, AppointmentStatus::Completed)),
        );
        assert_eq!(
            err,
            AppointmentError::InvalidTransition {
                appointment_id: id,
                from: AppointmentStatus::Cancelled,
                to: AppointmentStatus::Completed,
            }
        );
    }

    #[test]
    fn test_status_mapping_without_transition_context() {
        let validation = error_for_status("create prescription", StatusCode::BAD_REQUEST, b"{}", None);
        assert!(matches!(validation, AppointmentError::Validation(_)));

        let remote = error_for_status("list appointments", StatusCode::UNAUTHORIZED, b"", None);
        assert_eq!(
            remote,
            AppointmentError::Remote("list appointments failed with status 401 Unauthorized".to_string())
        );
    }

    #[test]
    fn test_not_found_and_opaque_conflict() {
        let id = AppointmentId::new("apt-1");
        let not_found = error_for_status("update", StatusCode::NOT_FOUND, b"", Some((&id, AppointmentStatus::Cancelled)));
        assert_eq!(not_found, AppointmentError::NotFound(id.clone()));

        let opaque = error_for_status("update", StatusCode::CONFLICT, b"busy", Some((&id, AppointmentStatus::Cancelled)));
        assert!(matches!(opaque, AppointmentError::Remote(_)));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_remote_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let store = RestAppointmentStore::new(client("http://127.0.0.1:9"));
        let err = store.list_for_doctor(&DoctorId::new("doc-1")).await.unwrap_err();
        assert!(matches!(err, AppointmentError::Remote(_)));
    }
}
