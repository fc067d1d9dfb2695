pub mod api_client;
pub mod auth_service;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod resource_client;

#[cfg(not(target_arch = "wasm32"))]
pub mod reqwest_transport;

#[cfg(target_arch = "wasm32")]
pub mod gloo_transport;

pub use api_client::ApiClient;
pub use auth_service::AuthService;
pub use error::{ApiError, ApiResult, AuthError};
pub use http::{ApiRequest, Body, FormPart, FormValue, HttpRequest, HttpResponse, HttpTransport, Method, TransportError};
pub use resource_client::{Mutation, Query, QueryHandle, QueryState, ResourceClient};

#[cfg(not(target_arch = "wasm32"))]
pub use reqwest_transport::ReqwestTransport;

#[cfg(target_arch = "wasm32")]
pub use gloo_transport::GlooTransport;
