// Executor tests - discovery and plan execution over stub clients
//
// The stubs implement the protocol client and chat backend traits directly.

use ardf_mcp::application::client::{ClientError, LocalProtocolClient, ProtocolClient};
use ardf_mcp::config::AppConfig;
use ardf_mcp::domain::{ChatMessage, ResourceType};
use ardf_mcp::executor::{
    ExecutorOptions, IndexSource, PlanExecutor, discover, list_capabilities,
};
use ardf_mcp::model::{ChatBackend, ModelError};
use ardf_mcp::planner::GoalPlanner;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Forwards to an in-process router but fails every read of the index.
struct BrokenIndexClient {
    inner: LocalProtocolClient,
}

#[async_trait]
impl ProtocolClient for BrokenIndexClient {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        if method == "resources/read" && params["uri"] == "ardf://index" {
            return Err(ClientError::Rpc {
                method: method.to_string(),
                code: -32000,
                message: "channel closed".to_string(),
            });
        }
        self.inner.request(method, params).await
    }
}

/// Answers the index read with a body that is not an index.
struct GarbledIndexClient {
    inner: LocalProtocolClient,
}

#[async_trait]
impl ProtocolClient for GarbledIndexClient {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        if method == "resources/read" && params["uri"] == "ardf://index" {
            return Ok(serde_json::json!({
                "contents": [{"type": "text", "text": "<html>oops</html>"}]
            }));
        }
        self.inner.request(method, params).await
    }
}

#[derive(Clone, Default)]
struct RecordingBackend {
    recordings: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

#[async_trait]
impl ChatBackend for RecordingBackend {
    fn provider(&self) -> &str {
        "recording"
    }

    fn model(&self) -> &str {
        "test"
    }

    async fn send(&self, messages: &[ChatMessage]) -> Result<String, ModelError> {
        self.recordings.lock().await.push(messages.to_vec());
        Ok("Listo".to_string())
    }
}

fn sample_client() -> LocalProtocolClient {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/ardf.toml");
    let config = AppConfig::load(Some(&path)).expect("sample config loads");
    let router = ardf_mcp::build_router(&config).expect("sample router builds");
    LocalProtocolClient::new(Arc::new(router))
}

#[tokio::test]
async fn failed_index_fetch_synthesizes_descriptors_from_listings() {
    let client = BrokenIndexClient {
        inner: sample_client(),
    };
    let discovery = discover(&client, true).await;
    assert_eq!(discovery.source, IndexSource::Fallback);
    assert!(!discovery.items.is_empty());

    let kind_of = |id: &str| {
        discovery
            .items
            .iter()
            .find(|item| item.resource_id == id)
            .map(|item| item.resource_type)
    };
    assert_eq!(kind_of("patient_lookup"), Some(ResourceType::Tool));
    assert_eq!(kind_of("notification_send"), Some(ResourceType::Prompt));
    assert_eq!(kind_of("policy://privacy/v1"), Some(ResourceType::Resource));
    assert_eq!(kind_of("ardf://index"), None);
    assert!(
        discovery
            .items
            .iter()
            .all(|item| item.when_to_use.is_none() && item.content.is_none())
    );
}

#[tokio::test]
async fn unparsable_index_bodies_fall_back_too() {
    let client = GarbledIndexClient {
        inner: sample_client(),
    };
    let discovery = discover(&client, true).await;
    assert_eq!(discovery.source, IndexSource::Fallback);
    assert_eq!(discovery.items, list_capabilities(&client).await);
}

#[tokio::test]
async fn index_is_used_when_available() {
    let discovery = discover(&sample_client(), true).await;
    assert_eq!(discovery.source, IndexSource::Ardf);
    assert!(
        discovery
            .items
            .iter()
            .any(|item| item.resource_type == ResourceType::Workflow)
    );

    let skipped = discover(&sample_client(), false).await;
    assert_eq!(skipped.source, IndexSource::Fallback);
}

#[tokio::test]
async fn sample_booking_goal_runs_end_to_end() {
    let backend = RecordingBackend::default();
    let executor = PlanExecutor::new(
        Arc::new(sample_client()),
        Arc::new(backend.clone()),
        GoalPlanner::default(),
        ExecutorOptions::default(),
    );

    let report = executor
        .run("Quiero reservar una cita para el paciente 5678 el 2025-10-09T11:30")
        .await
        .expect("run completes");

    assert!(report.policy_applied);
    assert_eq!(report.entries.len(), 3);
    assert_eq!(report.failures().count(), 0);
    assert!(uuid_like(&report.run_id));

    let conversations = backend.recordings.lock().await.clone();
    assert_eq!(conversations.len(), 1);
    let messages = &conversations[0];
    assert!(messages[0].content.starts_with("POLICY:\nNo compartas datos"));
    assert_eq!(
        messages.last().map(|m| m.content.as_str()),
        Some(
            "Confirma al paciente 5678 su cita del 2025-10-09T11:30. Objetivo original: \
             Quiero reservar una cita para el paciente 5678 el 2025-10-09T11:30"
        )
    );
}

fn uuid_like(value: &str) -> bool {
    value.len() == 36 && value.chars().filter(|c| *c == '-').count() == 4
}
