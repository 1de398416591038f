use orgunits_core::{Organization, OrganizationValidationError};
use uuid::Uuid;

#[test]
fn new_sets_fields_and_generates_id() {
    let org = Organization::new("Head office", "HEAD", None);

    assert!(!org.id.is_nil());
    assert_eq!(org.name, "Head office");
    assert_eq!(org.code, "HEAD");
    assert_eq!(org.parent_id, None);
    assert!(org.is_root());
    org.validate().unwrap();
}

#[test]
fn new_with_parent_is_not_root() {
    let parent = Organization::new("Head office", "HEAD", None);
    let child = Organization::new("Branch", "BR-1", Some(parent.id));

    assert!(!child.is_root());
    assert_eq!(child.parent_id, Some(parent.id));
}

#[test]
fn with_id_rejects_nil_uuid() {
    let err = Organization::with_id(Uuid::nil(), "x", "X", None).unwrap_err();
    assert_eq!(err, OrganizationValidationError::NilId);
}

#[test]
fn with_id_rejects_self_parent() {
    let id = Uuid::new_v4();
    let err = Organization::with_id(id, "x", "X", Some(id)).unwrap_err();
    assert_eq!(err, OrganizationValidationError::SelfParent(id));
}

#[test]
fn validate_rejects_blank_name() {
    let org = Organization::new("   ", "CODE", None);
    assert_eq!(
        org.validate().unwrap_err(),
        OrganizationValidationError::BlankName
    );
}

#[test]
fn validate_rejects_overlong_name() {
    let org = Organization::new("x".repeat(1001), "CODE", None);
    assert_eq!(
        org.validate().unwrap_err(),
        OrganizationValidationError::NameTooLong(1001)
    );
}

#[test]
fn validate_rejects_blank_and_malformed_codes() {
    let blank = Organization::new("ok", "", None);
    assert_eq!(
        blank.validate().unwrap_err(),
        OrganizationValidationError::BlankCode
    );

    let spaced = Organization::new("ok", "has space", None);
    assert_eq!(
        spaced.validate().unwrap_err(),
        OrganizationValidationError::MalformedCode("has space".to_string())
    );

    let leading_dash = Organization::new("ok", "-lead", None);
    assert_eq!(
        leading_dash.validate().unwrap_err(),
        OrganizationValidationError::MalformedCode("-lead".to_string())
    );

    let dotted = Organization::new("ok", "ru.verme.hq-01", None);
    dotted.validate().unwrap();
}

#[test]
fn validate_rejects_self_parent() {
    let mut org = Organization::new("ok", "CODE", None);
    org.parent_id = Some(org.id);
    assert_eq!(
        org.validate().unwrap_err(),
        OrganizationValidationError::SelfParent(org.id)
    );
}

#[test]
fn serialization_uses_expected_wire_fields() {
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let parent_id = Uuid::parse_str("99999999-8888-4777-a666-555555555555").unwrap();
    let org = Organization::with_id(id, "Branch", "BR-1", Some(parent_id)).unwrap();

    let json = serde_json::to_value(&org).unwrap();
    assert_eq!(json["id"], id.to_string());
    assert_eq!(json["name"], "Branch");
    assert_eq!(json["code"], "BR-1");
    assert_eq!(json["parent_id"], parent_id.to_string());

    let decoded: Organization = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, org);
}

#[test]
fn serialization_keeps_null_parent_for_roots() {
    let org = Organization::new("Head office", "HEAD", None);

    let json = serde_json::to_value(&org).unwrap();
    assert!(json["parent_id"].is_null());
}
