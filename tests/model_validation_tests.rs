use roadmap_api::models::{
    AccountView, AddEnrolledRequest, CreateRoadmapRequest, CreateUserRequest, Poll,
    SectionInput, VoteCount,
};
use serde_json::json;
use uuid::Uuid;

#[test]
fn test_account_view_never_exposes_password_hash() {
    let view = AccountView {
        username: "alice".to_string(),
        points: 20,
        ..Default::default()
    };

    let value = serde_json::to_value(&view).unwrap();
    let object = value.as_object().unwrap();

    assert!(!object.contains_key("password_hash"));
    assert!(!object.contains_key("password"));
    assert_eq!(value["points"], 20);
}

#[test]
fn test_section_input_optional_fields_default() {
    let input: SectionInput =
        serde_json::from_value(json!({ "title": "Ownership", "description": "Moves" })).unwrap();

    assert_eq!(input.learning_objectives, None);
    assert!(input.modules.is_empty());
    assert!(input.images.is_empty());
}

#[test]
fn test_create_user_is_admin_defaults_false() {
    let req: CreateUserRequest =
        serde_json::from_value(json!({ "username": "alice", "password": "pw" })).unwrap();
    assert!(!req.is_admin);
}

#[test]
fn test_create_roadmap_draft_is_optional() {
    let req: CreateRoadmapRequest = serde_json::from_value(json!({
        "title": "Rust", "description": "d", "image": "i", "sections": []
    }))
    .unwrap();
    assert_eq!(req.draft, None);

    // Omitted text fields and sections read as empty; the catalog rejects them by name.
    let sparse: CreateRoadmapRequest = serde_json::from_value(json!({ "title": "Rust" })).unwrap();
    assert_eq!(sparse.description, "");
    assert!(sparse.sections.is_empty());
}

#[test]
fn test_missing_text_fields_read_as_empty() {
    let req: CreateUserRequest = serde_json::from_value(json!({ "password": "pw" })).unwrap();
    assert_eq!(req.username, "");

    let entry: AddEnrolledRequest = serde_json::from_value(json!({})).unwrap();
    assert_eq!(entry.name, "");
}

#[test]
fn test_poll_count_for_unvoted_option_is_zero() {
    let voted = Uuid::new_v4();
    let poll = Poll {
        id: Uuid::new_v4(),
        options: vec![voted, Uuid::new_v4()],
        votes: vec![VoteCount {
            option_id: voted,
            count: 4,
        }],
    };

    assert_eq!(poll.count_for(voted), 4);
    assert_eq!(poll.count_for(poll.options[1]), 0);
}
