use crate::Result;
use crate::http::{Client, Request, RequestInput};
use crate::runner::types::Exchange;

/// Validates user input, sends it, and normalizes the response.
#[derive(Clone)]
pub struct RequestExecutor {
    client: Client,
}

impl RequestExecutor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: Client::new()?,
        })
    }

    /// 执行单个请求
    ///
    /// Validation errors are returned before any network activity; transport
    /// failures are returned as-is with no retry.
    pub async fn execute(&self, input: &RequestInput) -> Result<Exchange> {
        let request = Request::prepare(input)?;
        tracing::debug!(
            "Dispatching {} {} ({} headers, {} byte payload)",
            request.method,
            request.url,
            request.headers.len(),
            request.payload.as_str().len()
        );

        let response = self.client.execute(&request).await?;
        Ok(Exchange::new(request, response))
    }
}
