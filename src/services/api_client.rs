// ============================================================================
// API CLIENT - pipeline de requests autenticados
// ============================================================================
// Añade el bearer token guardado, envía contra el backend fijo
// y clasifica los fallos una sola vez. Sin reintentos, sin refresh de token.
// ============================================================================

use std::rc::Rc;

use serde::de::DeserializeOwned;
use url::Url;

use super::error::{ApiError, ApiResult};
use super::http::{ApiRequest, HttpRequest, HttpResponse, HttpTransport};
use crate::state::auth_state::CredentialStore;

#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    transport: Rc<dyn HttpTransport>,
    credentials: CredentialStore,
}

impl ApiClient {
    pub fn new(base_url: Url, transport: Rc<dyn HttpTransport>, credentials: CredentialStore) -> Self {
        Self {
            base_url,
            transport,
            credentials,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Añade los segmentos del request a la URL base. Cada segmento se
    /// codifica (percent-encoding): un id nunca puede añadir segmentos, query ni fragment.
    fn url(&self, request: &ApiRequest) -> ApiResult<Url> {
        let invalid = |message: &str| ApiError::Transport {
            message: format!("invalid request URL for {}: {}", request.path(), message),
        };
        if request
            .segments
            .iter()
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(invalid("empty or dot path segment"));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| invalid("base URL cannot have a path"))?
            .pop_if_empty()
            .extend(&request.segments);
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }

    /// Resuelve la URL y añade `Authorization: Bearer <token>` si hay
    /// un token guardado.
    pub fn prepare(&self, request: &ApiRequest) -> ApiResult<HttpRequest> {
        let url = self.url(request)?;
        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];
        if let Some(token) = self.credentials.access_token() {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }
        Ok(HttpRequest {
            method: request.method,
            url,
            headers,
            body: request.body.clone(),
        })
    }

    /// Pasa un request por el pipeline. Siempre termina en datos o en un
    /// `ApiError` clasificado.
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let result = match self.prepare(&request) {
            Ok(http_request) => match self.transport.send(http_request).await {
                Ok(response) => decode_response(response),
                Err(e) => Err(ApiError::Transport { message: e.0 }),
            },
            Err(e) => Err(e),
        };

        if let Err(ref error) = result {
            report_failure(&request, error);
        }
        result
    }
}

fn decode_response<T: DeserializeOwned>(response: HttpResponse) -> ApiResult<T> {
    let status = response.status;

    if response.is_success() {
        // Body vacío (204) se decodifica como null para que `()` y `Option<T>` funcionen
        let body: &[u8] = if response.body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &response.body
        };
        return serde_json::from_slice(body).map_err(|e| ApiError::Parse {
            original_status: status,
            message: e.to_string(),
        });
    }

    let body = serde_json::from_slice::<serde_json::Value>(&response.body).ok();
    let message = body.as_ref().and_then(error_message).or_else(|| {
        let text = String::from_utf8_lossy(&response.body).trim().to_string();
        (!text.is_empty() && body.is_none()).then_some(text)
    });

    Err(ApiError::Http {
        status,
        message,
        body,
    })
}

/// `{"message": ".."}`, `{"error": ".."}` o `{"error": {"message": ".."}}`
fn error_message(body: &serde_json::Value) -> Option<String> {
    body.get("message")
        .and_then(|m| m.as_str())
        .or_else(|| body.get("error").and_then(|e| e.as_str()))
        .or_else(|| {
            body.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
        })
        .map(str::to_string)
}

fn report_failure(request: &ApiRequest, error: &ApiError) {
    if error.is_reportable() {
        log::error!("❌ {} {} falló: {}", request.method.as_str(), request.path(), error);
    }
}
