//! Leaderboard request model and transport seam

use crate::error::TransportError;

/// Query parameter selecting the operation
pub const ACTION_PARAM: &str = "action";
pub const ACTION_GET_RANKING: &str = "getRanking";
pub const ACTION_SAVE_RECORD: &str = "saveRecord";
/// Field carrying the player name
pub const NAME_PARAM: &str = "nome";
/// Field carrying the rally count
pub const SCORE_PARAM: &str = "rebate";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Parameters are query-encoded
    Get,
    /// Parameters travel as a multipart form body
    PostForm,
}

/// A request the transport should perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    /// Endpoint without query string
    pub url: String,
    pub params: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: &str, params: &[(&str, &str)]) -> Self {
        Self::new(Method::Get, url, params)
    }

    pub fn post_form(url: &str, params: &[(&str, &str)]) -> Self {
        Self::new(Method::PostForm, url, params)
    }

    fn new(method: Method, url: &str, params: &[(&str, &str)]) -> Self {
        Self {
            method,
            url: url.to_string(),
            params: params
                .iter()
                .map(|&(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-success status into an error
    pub fn into_success(self) -> Result<Self, TransportError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(TransportError::Status(self.status))
        }
    }
}

/// Performs leaderboard requests.
///
/// Browser builds use `fetch`; tests script responses.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Transport with no network at all (native builds)
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineTransport;

impl Transport for OfflineTransport {
    async fn send(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        Err(TransportError::Network("offline".to_string()))
    }
}
