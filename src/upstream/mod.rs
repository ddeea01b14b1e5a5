use log::info;
use reqwest::Client as HttpClient;
use serde::Serialize;
use serde_json::Value;

use crate::config::WidgetConfig;
use crate::models::chat::WireMessage;

/// Request body for the hosted chat-completion endpoint.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ChatPayload<'a> {
    messages: &'a [WireMessage],
    branding_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    watermark_text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    watermark_link: Option<&'a str>,
}

/// Client for the single opaque upstream endpoint. One POST per dispatch,
/// no retries, no cancellation. No request timeout either: a dispatch stays
/// in flight until the endpoint answers.
#[derive(Clone)]
pub struct UpstreamClient {
    http: HttpClient,
    endpoint_url: String,
}

impl UpstreamClient {
    pub fn new(endpoint_url: String) -> Self {
        Self {
            http: HttpClient::new(),
            endpoint_url,
        }
    }

    /// Send the full conversation and extract a reply string. `Ok(None)`
    /// means the endpoint answered with a shape we do not recognize; the
    /// caller substitutes its fixed copy for that case. Transport failures
    /// and non-success statuses surface as `Err`.
    pub async fn send(
        &self,
        messages: &[WireMessage],
        widget: &WidgetConfig
    ) -> Result<Option<String>, reqwest::Error> {
        let payload = ChatPayload {
            messages,
            branding_id: &widget.branding_id,
            watermark_text: widget.watermark_text.as_deref(),
            watermark_link: widget.watermark_link.as_deref(),
        };

        info!("Dispatching {} messages to {}", messages.len(), self.endpoint_url);
        let body = self.http
            .post(&self.endpoint_url)
            .json(&payload)
            .send().await?
            .error_for_status()?
            .json::<Value>().await?;

        Ok(extract_reply(&body))
    }
}

/// The endpoint's response schema is loosely specified, so treat it as a
/// closed set of shapes and fail closed on anything else: a top-level
/// `response` string, a nested `result.response` string, or a bare JSON
/// string body. Empty strings count as absent, like the original widget's
/// falsy chain.
pub fn extract_reply(body: &Value) -> Option<String> {
    if let Some(reply) = body.get("response").and_then(Value::as_str) {
        if !reply.is_empty() {
            return Some(reply.to_string());
        }
    }
    if let Some(reply) = body.pointer("/result/response").and_then(Value::as_str) {
        if !reply.is_empty() {
            return Some(reply.to_string());
        }
    }
    if let Some(reply) = body.as_str() {
        if !reply.is_empty() {
            return Some(reply.to_string());
        }
    }
    None
}
