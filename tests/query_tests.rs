//! Query surface tests against the sample wiki

use analytics_specs::markdown::parse_document;
use analytics_specs::query::{
    call_tool, get_related_events, list_resources, read_resource, search_events, EventArgs, SearchEventsArgs,
};
use analytics_specs::{FieldError, FieldWarning, RecordKind, SpecError, SpecRepository};
use serde_json::{json, Map, Value};

fn fixture_repo() -> SpecRepository {
    SpecRepository::from_records(
        &parse_document(include_str!("fixtures/wiki/Properties.md"), RecordKind::Property),
        &parse_document(include_str!("fixtures/wiki/Property-Groups.md"), RecordKind::PropertyGroup),
        &parse_document(include_str!("fixtures/wiki/Events.md"), RecordKind::Event),
    )
}

fn validate(repo: &SpecRepository, event: &str, payload: Value) -> analytics_specs::ValidationReport {
    let args = analytics_specs::query::ValidatePayloadArgs {
        event_name: event.to_string(),
        payload: payload.as_object().cloned().unwrap(),
    };
    analytics_specs::query::validate_event_payload(repo, &args).unwrap()
}

const USER_ID: &str = "3f2b8c1e-9d4a-4f6b-8e2c-1a5d7b9c0e3f";
const SESSION_ID: &str = "a1b2c3d4-e5f6-4a7b-8c9d-0e1f2a3b4c5d";

#[test]
fn test_unknown_and_missing_fields() {
    let repo = SpecRepository::from_csv(
        "property_name,type,constraints,description,usage\n\
         user_id,string,-,User id,\n\
         email,string,-,Email,\n",
        "group_name,description,properties\n\
         user_context,Who,\"user_id\nemail\"\n",
        "event_name,event_description,event_table,property_groups,additional_properties,notes\n\
         signed_in,Signed in,Auth Events,user_context,-,\n",
    )
    .unwrap();

    let report = validate(&repo, "signed_in", json!({ "user_id": "abc", "extra": 1 }));

    assert!(report.valid);
    assert_eq!(report.valid_fields, vec!["user_id"]);
    assert!(report.errors.is_empty());
    assert_eq!(
        report.warnings,
        vec![
            FieldWarning::UnknownProperty { field: "extra".into() },
            FieldWarning::MissingProperty { field: "email".into() },
        ]
    );
}

#[test]
fn test_invalid_enum_value() {
    let repo = fixture_repo();
    let report = validate(
        &repo,
        "collaborator_invited",
        json!({ "permission_level": "owner" }),
    );

    assert!(!report.valid);
    assert_eq!(
        report.errors,
        vec![FieldError::InvalidEnumValue {
            field: "permission_level".into(),
            expected: vec!["viewer".into(), "editor".into(), "admin".into()],
            got: json!("owner"),
        }]
    );
}

#[test]
fn test_regex_validation_failed() {
    let repo = fixture_repo();
    let report = validate(&repo, "project_deleted", json!({ "project_id": "not-a-uuid" }));

    assert!(!report.valid);
    assert_eq!(report.errors.len(), 1);
    let error = serde_json::to_value(&report.errors[0]).unwrap();
    assert_eq!(error["issue"], "Regex validation failed");
    assert_eq!(error["field"], "project_id");
    assert_eq!(error["got"], "not-a-uuid");
}

#[test]
fn test_missing_group_is_omitted() {
    let repo = SpecRepository::from_csv(
        "property_name,type,constraints,description,usage\nuser_id,string,-,User id,\n",
        "group_name,description,properties\n",
        "event_name,event_description,event_table,property_groups,additional_properties,notes\n\
         orphaned,Uses a deleted group,Legacy Events,retired_context,-,\n",
    )
    .unwrap();

    let result = call_tool(&repo, "get_event_implementation", json!({ "event_name": "orphaned" })).unwrap();
    assert_eq!(result["property_groups"], json!([]));
    assert_eq!(result["additional_properties"], json!([]));

    let hits = search_events(&repo, &SearchEventsArgs::default());
    assert_eq!(hits[0].property_count, 0);
}

#[test]
fn test_complete_valid_payload() {
    let repo = fixture_repo();
    let report = validate(
        &repo,
        "onboarding_step_completed",
        json!({
            "user_id": USER_ID,
            "email": "ada@example.com",
            "account_created_at": "2024-03-01T12:00:00Z",
            "user_tier": "premium",
            "session_id": SESSION_ID,
            "session_start_time": "2024-03-05T09:30:00Z",
            "session_count": 12,
            "step_name": "invite_team",
            "step_number": 3,
            "completion_time": 41.5,
            "skipped": false
        }),
    );

    assert!(report.valid, "{:?}", report.errors);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(report.valid_fields.len(), 11);
}

#[test]
fn test_type_mismatch_skips_constraint() {
    let repo = fixture_repo();
    let report = validate(&repo, "onboarding_step_completed", json!({ "step_number": "3", "skipped": "no" }));

    let issues: Vec<_> = report
        .errors
        .iter()
        .map(|e| serde_json::to_value(e).unwrap())
        .collect();
    assert_eq!(issues.len(), 2);
    assert!(issues.iter().all(|i| i["issue"] == "Type mismatch"));
    let skipped = issues.iter().find(|i| i["field"] == "skipped").unwrap();
    assert_eq!(skipped["expected"], "boolean");
    assert_eq!(skipped["got"], "string");
}

#[test]
fn test_validation_is_deterministic() {
    let repo = fixture_repo();
    let payload = json!({ "project_id": "nope", "permission_level": "owner", "bonus": true });

    let first = validate(&repo, "collaborator_invited", payload.clone());
    for _ in 0..5 {
        assert_eq!(validate(&repo, "collaborator_invited", payload.clone()), first);
    }
}

#[test]
fn test_validation_ignores_key_insertion_order() {
    let repo = fixture_repo();
    let entries = [
        ("project_id", json!("nope")),
        ("permission_level", json!("owner")),
        ("bonus", json!(true)),
        ("user_id", json!(42)),
    ];

    let forward: Map<String, Value> = entries.iter().cloned().map(|(k, v)| (k.to_string(), v)).collect();
    let reversed: Map<String, Value> = entries.iter().rev().cloned().map(|(k, v)| (k.to_string(), v)).collect();

    let first = validate(&repo, "collaborator_invited", Value::Object(forward));
    let second = validate(&repo, "collaborator_invited", Value::Object(reversed));
    assert_eq!(first, second);
    assert_eq!(first.errors.len(), 3);
}

#[test]
fn test_search_by_property_across_groups() {
    let repo = fixture_repo();

    let via_group = search_events(
        &repo,
        &SearchEventsArgs {
            has_property: Some("app_version".into()),
            ..Default::default()
        },
    );
    let names: Vec<_> = via_group.iter().map(|e| e.event_name.as_str()).collect();
    assert_eq!(names, vec!["user_registration_started", "user_registration_completed"]);

    let onboarding = search_events(
        &repo,
        &SearchEventsArgs {
            table: Some("onboarding".into()),
            ..Default::default()
        },
    );
    assert_eq!(onboarding.len(), 3);
    assert_eq!(onboarding[1].property_count, 11);
}

#[test]
fn test_property_details_via_tool() {
    let repo = fixture_repo();
    let details = call_tool(&repo, "get_property_details", json!({ "property_name": "project_id" })).unwrap();

    assert_eq!(details["type"], "string");
    assert_eq!(details["used_in_groups"], json!(["project"]));
    assert_eq!(details["used_in_events_via_groups"], json!(["project_favorited"]));
    assert_eq!(
        details["used_in_events_directly"],
        json!([
            "project_created",
            "project_deleted",
            "collaborator_invited",
            "file_uploaded",
            "project_duplicated"
        ])
    );
}

#[test]
fn test_related_events_share_table() {
    let repo = fixture_repo();
    let related = get_related_events(&repo, &EventArgs { event_name: "email_verified".into() }).unwrap();
    let names: Vec<_> = related.related_events.iter().map(|e| e.event_name.as_str()).collect();
    assert_eq!(names, vec!["user_registration_started", "user_registration_completed"]);
}

#[test]
fn test_not_found_suggests_names() {
    let repo = fixture_repo();
    let err = call_tool(&repo, "get_event_implementation", json!({ "event_name": "project_create" })).unwrap_err();
    match err {
        SpecError::NotFound { kind, suggestions, .. } => {
            assert_eq!(kind, RecordKind::Event);
            assert!(suggestions.contains(&"project_created".to_string()));
            assert!(suggestions.len() <= 3);
        }
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_tool_argument_types_checked() {
    let repo = fixture_repo();
    let err = call_tool(
        &repo,
        "validate_event_payload",
        json!({ "event_name": "email_verified", "payload": "user_id=1" }),
    )
    .unwrap_err();
    assert!(matches!(err, SpecError::InvalidArguments { .. }));
}

#[test]
fn test_resources_cover_every_record() {
    let repo = fixture_repo();
    let resources = list_resources(&repo);
    assert_eq!(resources.len(), 1 + 12 + 5 + 33);
    assert!(resources.iter().all(|r| r.mime_type == "application/json"));

    let group = read_resource(&repo, "analytics://property-groups/device_info").unwrap();
    let members: Vec<_> = group["properties"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(members, vec!["device_type", "platform", "os_version", "app_version"]);
}
