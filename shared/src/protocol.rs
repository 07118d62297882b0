use crate::{
    MaintenanceRequest, MaintenanceRequestUpdate, NewMaintenanceRequest, REQUESTS_PATH, RequestId,
};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether requests with this method carry a JSON body.
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The JSON body type sent with this request. `()` for body-less calls.
    type Body: Serialize;
    /// The HTTP method.
    const METHOD: HttpMethod;

    /// The URL path, relative to the API base URL.
    fn path(&self) -> String;

    fn body(&self) -> Option<&Self::Body> {
        None
    }
}

fn request_path(id: &RequestId) -> String {
    format!("{}/{}", REQUESTS_PATH, id.to_path_segment())
}

// =========================================================
// Request Definitions
// =========================================================

/// List all requests of the authenticated homeowner
#[derive(Debug, Clone, Copy, Default)]
pub struct ListRequests;

impl ApiRequest for ListRequests {
    type Response = Vec<MaintenanceRequest>;
    type Body = ();
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        REQUESTS_PATH.to_string()
    }
}

/// Fetch a single request by id
#[derive(Debug, Clone)]
pub struct GetRequest {
    pub id: RequestId,
}

impl ApiRequest for GetRequest {
    type Response = MaintenanceRequest;
    type Body = ();
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        request_path(&self.id)
    }
}

/// Create a new request; the server assigns id and status
#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub data: NewMaintenanceRequest,
}

impl ApiRequest for CreateRequest {
    type Response = MaintenanceRequest;
    type Body = NewMaintenanceRequest;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        REQUESTS_PATH.to_string()
    }

    fn body(&self) -> Option<&Self::Body> {
        Some(&self.data)
    }
}

/// Create a new request when only the acknowledgement matters.
///
/// Some backends echo the record without its `id`, so the body is ignored
/// and a 2xx status confirms the write, as with [`DeleteRequest`].
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub data: NewMaintenanceRequest,
}

impl ApiRequest for SubmitRequest {
    type Response = IgnoredAny;
    type Body = NewMaintenanceRequest;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        REQUESTS_PATH.to_string()
    }

    fn body(&self) -> Option<&Self::Body> {
        Some(&self.data)
    }
}

/// Replace the mutable fields of a request
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub id: RequestId,
    pub changes: MaintenanceRequestUpdate,
}

impl ApiRequest for UpdateRequest {
    type Response = MaintenanceRequest;
    type Body = MaintenanceRequestUpdate;
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        request_path(&self.id)
    }

    fn body(&self) -> Option<&Self::Body> {
        Some(&self.changes)
    }
}

/// Delete a request.
///
/// The backend answers with an arbitrary confirmation (or an empty 204 body),
/// so the response is ignored: reaching a 2xx status is the confirmation.
#[derive(Debug, Clone)]
pub struct DeleteRequest {
    pub id: RequestId,
}

impl ApiRequest for DeleteRequest {
    type Response = IgnoredAny;
    type Body = ();
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        request_path(&self.id)
    }
}
