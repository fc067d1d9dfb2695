use std::time::Duration;

use futures::future::{FutureExt, LocalBoxFuture};
use reqwest::multipart::{Form, Part};

use super::http::{Body, FormPart, FormValue, HttpRequest, HttpResponse, HttpTransport, Method, TransportError};

/// Transporte nativo sobre reqwest
#[derive(Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError(format!("Client build error: {}", e)))?;
        Ok(Self { http })
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> LocalBoxFuture<'static, Result<HttpResponse, TransportError>> {
        let http = self.http.clone();
        async move {
            let method = match request.method {
                Method::Get => reqwest::Method::GET,
                Method::Post => reqwest::Method::POST,
                Method::Put => reqwest::Method::PUT,
                Method::Patch => reqwest::Method::PATCH,
                Method::Delete => reqwest::Method::DELETE,
            };

            let mut builder = http.request(method, request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder = match request.body {
                Body::Empty => builder,
                Body::Json(value) => builder.json(&value),
                Body::Multipart(parts) => builder.multipart(build_form(parts)?),
            };

            let response = builder
                .send()
                .await
                .map_err(|e| TransportError(format!("Network error: {}", e)))?;
            let status = response.status().as_u16();
            let body = response
                .bytes()
                .await
                .map_err(|e| TransportError(format!("Body read error: {}", e)))?;

            Ok(HttpResponse {
                status,
                body: body.to_vec(),
            })
        }
        .boxed_local()
    }
}

fn build_form(parts: Vec<FormPart>) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for part in parts {
        form = match part.value {
            FormValue::Text(text) => form.text(part.name, text),
            FormValue::File {
                file_name,
                mime_type,
                bytes,
            } => {
                let file = Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(&mime_type)
                    .map_err(|e| TransportError(format!("Invalid mime type {}: {}", mime_type, e)))?;
                form.part(part.name, file)
            }
        };
    }
    Ok(form)
}
