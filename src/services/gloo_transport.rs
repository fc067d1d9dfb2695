use futures::future::{FutureExt, LocalBoxFuture};
use gloo_net::http::{Request, RequestBuilder};
use wasm_bindgen::JsValue;
use web_sys::{Blob, BlobPropertyBag, FormData};

use super::http::{Body, FormPart, FormValue, HttpRequest, HttpResponse, HttpTransport, Method, TransportError};

/// Transporte del navegador sobre gloo-net (fetch API)
#[derive(Clone, Copy, Debug, Default)]
pub struct GlooTransport;

impl HttpTransport for GlooTransport {
    fn send(&self, request: HttpRequest) -> LocalBoxFuture<'static, Result<HttpResponse, TransportError>> {
        async move {
            let url = request.url.as_str();
            let mut builder: RequestBuilder = match request.method {
                Method::Get => Request::get(url),
                Method::Post => Request::post(url),
                Method::Put => Request::put(url),
                Method::Patch => Request::patch(url),
                Method::Delete => Request::delete(url),
            };
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            let prepared = match request.body {
                Body::Empty => builder.build(),
                Body::Json(value) => builder.json(&value),
                Body::Multipart(parts) => builder.body(build_form(parts)?),
            }
            .map_err(|e| TransportError(format!("Request build error: {}", e)))?;

            let response = prepared
                .send()
                .await
                .map_err(|e| TransportError(format!("Network error: {}", e)))?;
            let status = response.status();
            let body = response
                .binary()
                .await
                .map_err(|e| TransportError(format!("Body read error: {}", e)))?;

            Ok(HttpResponse { status, body })
        }
        .boxed_local()
    }
}

fn build_form(parts: Vec<FormPart>) -> Result<FormData, TransportError> {
    let form = FormData::new().map_err(js_error)?;
    for part in parts {
        match part.value {
            FormValue::Text(text) => form.append_with_str(&part.name, &text).map_err(js_error)?,
            FormValue::File {
                file_name,
                mime_type,
                bytes,
            } => {
                let array = js_sys::Uint8Array::from(bytes.as_slice());
                let blob_parts = js_sys::Array::of1(&array);
                let options = BlobPropertyBag::new();
                options.set_type(&mime_type);
                let blob = Blob::new_with_u8_array_sequence_and_options(&blob_parts, &options)
                    .map_err(js_error)?;
                form.append_with_blob_and_filename(&part.name, &blob, &file_name)
                    .map_err(js_error)?;
            }
        }
    }
    Ok(form)
}

fn js_error(value: JsValue) -> TransportError {
    TransportError(format!("Form build error: {:?}", value))
}
