use log::warn;
use tokio::sync::Mutex;

use crate::app::{ AppEvent, Applied, ChatApp };
use crate::store::StoreError;
use crate::upstream::UpstreamClient;

/// Run one full dispatch: optimistic user append, a single upstream round
/// trip, then the finalizing append (reply, apology, or fallback error).
///
/// The lock is released for the duration of the network call; the busy flag
/// set by the reducer is what blocks concurrent sends in the meantime. The
/// returned value is the reducer's verdict on the submission; a rejected
/// submission (empty input, already busy) skips the network entirely.
pub async fn run_dispatch(
    app: &Mutex<ChatApp>,
    upstream: &UpstreamClient,
    text: String
) -> Result<Applied, StoreError> {
    let (wire_messages, config) = {
        let mut app = app.lock().await;
        match app.apply(AppEvent::UserSubmitted(text)).await? {
            Applied::DispatchStarted => (app.wire_messages(), app.config()),
            other => {
                return Ok(other);
            }
        }
    };

    let event = match upstream.send(&wire_messages, &config).await {
        Ok(Some(reply)) => AppEvent::ReplyArrived(reply),
        Ok(None) => {
            warn!("Upstream reply had no recognized shape, substituting apology");
            AppEvent::ReplyArrived(config.fallback_apology.clone())
        }
        Err(e) => {
            warn!("Upstream dispatch failed: {}", e);
            AppEvent::ReplyFailed
        }
    };

    app.lock().await.apply(event).await?;
    Ok(Applied::DispatchStarted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WidgetConfig;
    use crate::models::chat::Role;
    use crate::store::{ MemorySnapshotStore, SnapshotStore };
    use std::sync::Arc;
    use serde_json::json;
    use wiremock::matchers::{ body_partial_json, method, path };
    use wiremock::{ Mock, MockServer, ResponseTemplate };

    async fn app_with_endpoint(url: String) -> (Mutex<ChatApp>, UpstreamClient) {
        let backend: Arc<dyn SnapshotStore> = Arc::new(MemorySnapshotStore::new());
        let config = Arc::new(WidgetConfig::default());
        let app = ChatApp::new(backend, config).await.unwrap();
        (Mutex::new(app), UpstreamClient::new(url))
    }

    #[tokio::test]
    async fn reply_appends_exactly_one_assistant_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(json!({ "brandingId": "CHATLET_V1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "hi" })))
            .expect(1)
            .mount(&server).await;

        let (app, upstream) = app_with_endpoint(server.uri()).await;
        let before = app.lock().await.messages().len();

        run_dispatch(&app, &upstream, "hello".to_string()).await.unwrap();

        let app = app.lock().await;
        assert_eq!(app.messages().len(), before + 2);
        let last = app.messages().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, "hi");
        assert!(!app.busy());
    }

    #[tokio::test]
    async fn payload_carries_full_conversation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(
                body_partial_json(
                    json!({
                "messages": [
                    { "role": "system" },
                    { "role": "assistant" },
                    { "role": "user", "content": "hello" }
                ]
            })
                )
            )
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "hi" })))
            .expect(1)
            .mount(&server).await;

        let (app, upstream) = app_with_endpoint(server.uri()).await;
        run_dispatch(&app, &upstream, "hello".to_string()).await.unwrap();
    }

    #[tokio::test]
    async fn nested_and_raw_shapes_extract() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(
                    json!({ "result": { "response": "nested" } })
                )
            )
            .up_to_n_times(1)
            .mount(&server).await;

        let (app, upstream) = app_with_endpoint(server.uri()).await;
        run_dispatch(&app, &upstream, "first".to_string()).await.unwrap();
        assert_eq!(app.lock().await.messages().last().unwrap().content, "nested");

        server.reset().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("raw string")))
            .mount(&server).await;

        run_dispatch(&app, &upstream, "second".to_string()).await.unwrap();
        assert_eq!(app.lock().await.messages().last().unwrap().content, "raw string");
    }

    #[tokio::test]
    async fn unrecognized_shape_substitutes_apology() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unexpected": true })))
            .mount(&server).await;

        let (app, upstream) = app_with_endpoint(server.uri()).await;
        run_dispatch(&app, &upstream, "hello".to_string()).await.unwrap();

        let app = app.lock().await;
        assert_eq!(
            app.messages().last().unwrap().content,
            WidgetConfig::default().fallback_apology
        );
        assert!(!app.busy());
    }

    #[tokio::test]
    async fn non_success_status_substitutes_fallback_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server).await;

        let (app, upstream) = app_with_endpoint(server.uri()).await;
        run_dispatch(&app, &upstream, "hello".to_string()).await.unwrap();

        let app = app.lock().await;
        assert_eq!(
            app.messages().last().unwrap().content,
            WidgetConfig::default().fallback_error
        );
        assert!(!app.busy());
    }

    #[tokio::test]
    async fn transport_failure_substitutes_fallback_error() {
        // Nothing listens here; the connection is refused outright.
        let (app, upstream) = app_with_endpoint("http://127.0.0.1:9".to_string()).await;
        run_dispatch(&app, &upstream, "hello".to_string()).await.unwrap();

        let app = app.lock().await;
        let last = app.messages().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, WidgetConfig::default().fallback_error);
        assert!(!app.busy());
    }

    #[tokio::test]
    async fn busy_flag_blocks_second_dispatch() {
        let (app, upstream) = app_with_endpoint("http://127.0.0.1:9".to_string()).await;
        {
            let mut locked = app.lock().await;
            locked.apply(AppEvent::UserSubmitted("first".to_string())).await.unwrap();
            assert!(locked.busy());
        }

        let applied = run_dispatch(&app, &upstream, "second".to_string()).await.unwrap();
        assert_eq!(applied, Applied::Rejected);

        let app = app.lock().await;
        assert_eq!(app.messages().last().unwrap().content, "first");
    }

    #[tokio::test]
    async fn empty_input_never_reaches_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "hi" })))
            .expect(0)
            .mount(&server).await;

        let (app, upstream) = app_with_endpoint(server.uri()).await;
        let applied = run_dispatch(&app, &upstream, "   ".to_string()).await.unwrap();
        assert_eq!(applied, Applied::Rejected);
    }
}
