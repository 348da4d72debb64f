use testhub_shared::http::{HttpClient, HttpError, HttpRequest, HttpResponse};
use testhub_shared::protocol::HttpMethod;
use worker::{Fetch, Headers, Request, RequestInit, wasm_bindgen};

// =========================================================
// 实现层: Worker 出站请求客户端
// =========================================================

fn to_worker_method(m: HttpMethod) -> worker::Method {
    match m {
        HttpMethod::Get => worker::Method::Get,
        HttpMethod::Post => worker::Method::Post,
        HttpMethod::Put => worker::Method::Put,
        HttpMethod::Delete => worker::Method::Delete,
    }
}

#[derive(Clone, Copy, Default)]
pub struct WorkerHttpClient;

#[async_trait::async_trait(?Send)]
impl HttpClient for WorkerHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let build = |e: worker::Error| HttpError::RequestBuild(e.to_string());

        let headers = Headers::new();
        for (k, v) in &req.headers {
            headers.set(k, v).map_err(build)?;
        }

        let mut init = RequestInit::new();
        init.with_method(to_worker_method(req.method))
            .with_headers(headers);
        if let Some(body) = &req.body {
            init.with_body(Some(wasm_bindgen::JsValue::from_str(body)));
        }

        let worker_req = Request::new_with_init(&req.url, &init).map_err(build)?;
        let mut response = Fetch::Request(worker_req)
            .send()
            .await
            .map_err(|e| HttpError::Network(e.to_string()))?;

        Ok(HttpResponse {
            status: response.status_code(),
            body: response
                .text()
                .await
                .map_err(|e| HttpError::Decode(e.to_string()))?,
        })
    }
}
