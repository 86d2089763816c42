//! Browser `fetch` transport

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{FormData, Request, RequestInit, RequestMode, RequestRedirect, Response, Url};

use super::transport::{HttpRequest, HttpResponse, Method, Transport};
use crate::error::TransportError;

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

fn js_error(value: JsValue) -> TransportError {
    TransportError::Network(
        value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value)),
    )
}

impl FetchTransport {
    fn build(&self, request: &HttpRequest) -> Result<Request, JsValue> {
        let init = RequestInit::new();
        init.set_mode(RequestMode::Cors);
        init.set_redirect(RequestRedirect::Follow);

        match request.method {
            Method::Get => {
                let url = Url::new(&request.url)?;
                let search = url.search_params();
                for (key, value) in &request.params {
                    search.append(key, value);
                }
                init.set_method("GET");
                Request::new_with_str_and_init(&url.href(), &init)
            }
            Method::PostForm => {
                let form = FormData::new()?;
                for (key, value) in &request.params {
                    form.append_with_str(key, value)?;
                }
                init.set_method("POST");
                init.set_body(&form);
                Request::new_with_str_and_init(&request.url, &init)
            }
        }
    }
}

impl Transport for FetchTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let window = web_sys::window()
            .ok_or_else(|| TransportError::Network("no window".to_string()))?;
        let js_request = self.build(request).map_err(js_error)?;

        let value = JsFuture::from(window.fetch_with_request(&js_request))
            .await
            .map_err(js_error)?;
        let response: Response = value.dyn_into().map_err(js_error)?;
        let text = JsFuture::from(response.text().map_err(js_error)?)
            .await
            .map_err(js_error)?;

        Ok(HttpResponse {
            status: response.status(),
            body: text.as_string().unwrap_or_default(),
        })
    }
}
