// Router tests - protocol methods against configured catalogs
//
// Covers listing, filtering, prompt rendering and planning over the index
// the router serves.

use ardf_mcp::application::protocol::{ContentBlock, ReadResourceParams};
use ardf_mcp::config::AppConfig;
use ardf_mcp::domain::{Index, PlanItem, ResourceType, WorkflowStep};
use ardf_mcp::planner::GoalPlanner;
use ardf_mcp::registry::{DescriptorFilter, DescriptorRegistry};
use ardf_mcp::router::{CapabilityKind, ProtocolRouter, RouterError, RouterSettings};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

fn router_from(toml: &str) -> ProtocolRouter {
    let config = AppConfig::from_toml_str(toml).expect("config parses");
    let registry = DescriptorRegistry::from_config(&config).expect("registry builds");
    ProtocolRouter::new(Arc::new(registry), RouterSettings::from_config(&config))
}

fn sample_router() -> ProtocolRouter {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/ardf.toml");
    let config = AppConfig::load(Some(&path)).expect("sample config loads");
    ardf_mcp::build_router(&config).expect("sample router builds")
}

const MIXED_CATALOG: &str = r#"
[[tools]]
name = "patient_lookup"
domain = "healthcare"
tags = ["patient", "read"]

[[tools]]
name = "appointment_create"
domain = "healthcare"
tags = ["appointment"]

[[tools]]
name = "invoice_send"
domain = "billing"
tags = ["patient"]

[[prompts]]
name = "notification_send"
domain = "healthcare"
messages = [{ role = "user", content = "Hola {{name}}" }]

[[resources]]
name = "policy_privacy_v1"
uri = "policy://privacy"
kind = "policy"
domain = "healthcare"
content = "No compartas datos."
"#;

#[test]
fn booking_goal_plans_the_workflow_with_its_steps_in_order() {
    let router = router_from(
        r#"
[[workflows]]
id = "medical_booking_flow"
when_to_use = "Use to book an appointment"
tags = ["workflow"]
steps = [
    { step = "lookup", tool_id = "patient_lookup" },
    { step = "create", tool_id = "appointment_create" },
    { step = "notify", prompt_id = "notification_send" },
]
"#,
    );
    let index = router.ardf_list(&DescriptorFilter::default()).items;
    let plan = GoalPlanner::default().plan("Book an appointment", &index);
    assert_eq!(
        plan,
        vec![PlanItem::Workflow {
            id: "medical_booking_flow".into(),
            steps: vec![
                WorkflowStep::tool("lookup", "patient_lookup"),
                WorkflowStep::tool("create", "appointment_create"),
                WorkflowStep::prompt("notify", "notification_send"),
            ],
        }]
    );
}

#[test]
fn ardf_list_filters_by_type_and_domain() {
    let router = router_from(MIXED_CATALOG);
    let listing =
        router.ardf_list(&DescriptorFilter::by_type(ResourceType::Tool).with_domain("healthcare"));
    let ids: Vec<&str> = listing
        .items
        .iter()
        .map(|item| item.resource_id.as_str())
        .collect();
    assert_eq!(ids, vec!["patient_lookup", "appointment_create"]);
    assert_eq!(listing.total, 2);
}

#[test]
fn tag_filters_are_conjunctive() {
    let router = router_from(MIXED_CATALOG);
    let both = router.ardf_list(&DescriptorFilter::default().with_tags(["patient", "read"]));
    assert_eq!(both.total, 1);
    assert_eq!(both.items[0].resource_id, "patient_lookup");

    let one = router.ardf_list(&DescriptorFilter::default().with_tags(["patient"]));
    assert_eq!(one.total, 2);
}

#[test]
fn index_holds_every_configured_capability() {
    let router = router_from(MIXED_CATALOG);
    let listing = router.ardf_list(&DescriptorFilter::default());
    assert_eq!(listing.total, 5);
    assert_eq!(listing.total, router.registry().descriptors().len());
}

#[tokio::test]
async fn prompt_placeholders_are_substituted_once_each() {
    let router = router_from(
        r#"
[[prompts]]
name = "notification_send"
variables = ["name", "date", "time"]
messages = [
    { role = "system", content = "Recordatorio para {{name}}" },
    { role = "user", content = "Cita el {{date}} a las {{ time }}" },
]
"#,
    );
    let result = router
        .get_prompt(
            "notification_send",
            json!({"name": "Alice", "date": "2025-12-24", "time": "14:00"}),
        )
        .await
        .expect("prompt renders");
    let texts: Vec<String> = result
        .prompt
        .messages
        .iter()
        .map(|message| message.content.to_text())
        .collect();
    assert_eq!(
        texts,
        vec!["Recordatorio para Alice", "Cita el 2025-12-24 a las 14:00"]
    );
    assert!(texts.iter().all(|text| !text.contains("{{")));
}

#[tokio::test]
async fn unknown_tools_are_not_found_by_name() {
    let err = router_from(MIXED_CATALOG)
        .call_tool("does_not_exist", json!({}))
        .await
        .expect_err("tool is unknown");
    assert!(matches!(
        err,
        RouterError::NotFound { kind: CapabilityKind::Tool, ref name } if name == "does_not_exist"
    ));
    assert_eq!(err.target(), "does_not_exist");
}

#[tokio::test]
async fn unknown_tools_are_not_found_even_with_malformed_arguments() {
    let router = router_from("");
    for arguments in [json!("{oops"), json!(42), json!(["a"])] {
        let err = router
            .call_tool("ghost", arguments)
            .await
            .expect_err("tool is unknown");
        assert!(matches!(
            err,
            RouterError::NotFound { kind: CapabilityKind::Tool, ref name } if name == "ghost"
        ));
    }

    let err = router_from(MIXED_CATALOG)
        .call_tool("patient_lookup", json!("{oops"))
        .await
        .expect_err("arguments are malformed");
    assert!(matches!(err, RouterError::InvalidArgument { .. }));
}

#[tokio::test]
async fn dispatch_rejects_unknown_methods() {
    let err = router_from(MIXED_CATALOG)
        .dispatch("tools/delete", json!({}))
        .await
        .expect_err("method is unknown");
    assert!(matches!(err, RouterError::MethodNotFound { .. }));
}

#[tokio::test]
async fn sample_config_serves_a_valid_index() {
    let router = sample_router();
    let result = router
        .read_resource(ReadResourceParams::uri("ardf://index"))
        .await
        .expect("index reads");
    let index = Index::parse(result.first_text().expect("index body")).expect("index parses");
    index.validate().expect("index is valid");
    assert!(index.find("medical_booking_flow").is_some());
    assert!(index.first_of_type(ResourceType::Policy).is_some());
}

#[tokio::test]
async fn sample_json_tool_returns_structured_content() {
    let result = sample_router()
        .call_tool(
            "appointment_create",
            json!({"patientId": "5678", "slot": "2025-10-09T11:30"}),
        )
        .await
        .expect("tool runs");
    assert_eq!(
        result.content,
        vec![ContentBlock::json(json!({
            "patientId": "5678",
            "slot": "2025-10-09T11:30",
            "status": "booked"
        }))]
    );
}
