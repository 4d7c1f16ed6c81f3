use std::time::{Duration, Instant};

use crate::Result;
use crate::http::request::{Payload, Request};
use crate::http::response::Response;

/// Fixed for every call; not user-configurable.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct Client {
    inner: reqwest::Client,
}

impl Client {
    pub fn new() -> Result<Self> {
        let inner = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { inner })
    }

    pub async fn execute(&self, request: &Request) -> Result<Response> {
        let mut req = self
            .inner
            .request(request.method.into(), request.url.as_str())
            .headers(request.header_map().clone());

        match &request.payload {
            Payload::Empty => {}
            Payload::Json(body) | Payload::Text(body) => {
                req = req.body(body.clone());
            }
        }

        let start = Instant::now();
        let response = req.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;
        let duration = start.elapsed();

        Ok(Response::new(status, headers, body, duration))
    }
}
