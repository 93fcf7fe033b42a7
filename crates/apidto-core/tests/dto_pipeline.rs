//! # DTO Pipeline Tests
//!
//! End-to-end behavior of declared DTO types: building and normalization,
//! audited serialization in warn and strict modes, enum coercion on the way
//! back in, and text/request decoding failures.

use std::io;
use std::sync::{Arc, Mutex};

use apidto_audit::{LogMode, SensitiveFields, SensitiveFieldsOptions};
use apidto_core::{
    DtoClass, DtoEngine, DtoError, DtoInstance, DtoType, EnumType, FieldType, FieldValue,
};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

/// Helper: unwrap a JSON object literal.
fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

/// Helper: the `{name, token, tags}` type used across these tests.
fn credentials_type() -> Arc<DtoType> {
    DtoType::builder("Credentials")
        .field("name", FieldType::text())
        .field("token", FieldType::text())
        .field("tags", FieldType::sequence_of(FieldType::text()))
        .build()
        .unwrap()
}

fn strict_config() -> Arc<SensitiveFields> {
    let options = SensitiveFieldsOptions::default().with_log_mode(LogMode::Strict);
    Arc::new(SensitiveFields::with_options(options))
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Helper: run `f` with a capturing subscriber and return what it logged.
fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    let bytes = captured.0.lock().unwrap().clone();
    (out, String::from_utf8(bytes).unwrap())
}

// -- Serialization and audit --------------------------------------------------

#[test]
fn warn_mode_returns_mapping_and_logs_token() {
    let class = DtoClass::new(credentials_type(), DtoEngine::default());
    let creds = class
        .new_instance()
        .with("name", "a")
        .unwrap()
        .with("token", "secret")
        .unwrap();

    let (map, logs) = capture_logs(|| class.to_dict(&creds).unwrap());

    assert_eq!(
        Value::Object(map),
        json!({"name": "a", "token": "secret", "tags": []})
    );
    assert!(logs.contains("WARN"), "logs: {logs}");
    assert!(
        logs.contains("serializing sensitive field 'Credentials.token'"),
        "logs: {logs}"
    );
}

#[test]
fn warn_mode_keeps_password_in_output() {
    let ty = DtoType::builder("Login")
        .field("password", FieldType::text())
        .build()
        .unwrap();
    let engine = DtoEngine::default();
    let login = DtoInstance::new(&ty).with("password", "pw").unwrap();
    let (map, report) = engine.to_dict_audited(&login).unwrap();
    assert_eq!(map["password"], json!("pw"));
    assert!(report.contains("Login.password"));
}

#[test]
fn strict_mode_aborts_serialization() {
    let class = DtoClass::with_config(credentials_type(), strict_config());
    let creds = class.new_instance().with("token", "secret").unwrap();

    let (result, logs) = capture_logs(|| class.to_json(&creds));

    match result {
        Err(DtoError::SensitiveField(err)) => {
            assert_eq!(err.to_string(), "invalid field name for serialization: 'Credentials.token'");
        }
        other => panic!("expected SensitiveField, got {other:?}"),
    }
    assert!(logs.contains("ERROR"), "logs: {logs}");
}

#[test]
fn suffix_rule_flags_user_id_but_not_identifier() {
    let ty = DtoType::builder("Lookup")
        .field("user_id", FieldType::int())
        .field("identifier", FieldType::text())
        .build()
        .unwrap();
    let (_, report) = DtoEngine::default()
        .to_dict_audited(&DtoInstance::new(&ty))
        .unwrap();
    assert!(report.contains("Lookup.user_id"));
    assert!(!report.contains("Lookup.identifier"));
    assert_eq!(report.len(), 1);
}

#[test]
fn audit_reaches_dtos_inside_sequences() {
    let member = DtoType::builder("Member")
        .field("name", FieldType::text())
        .field("api_key", FieldType::text())
        .build()
        .unwrap();
    let team = DtoType::builder("Team")
        .field("title", FieldType::text())
        .field("members", FieldType::sequence_of(FieldType::dto(&member)))
        .build()
        .unwrap();

    let alice = DtoInstance::new(&member).with("name", "alice").unwrap();
    let bob = DtoInstance::new(&member)
        .with("name", "bob")
        .unwrap()
        .with("api_key", "k-123")
        .unwrap();
    let instance = DtoInstance::new(&team)
        .with("members", vec![alice, bob])
        .unwrap();

    let (map, report) = DtoEngine::default().to_dict_audited(&instance).unwrap();
    assert_eq!(map["members"][1]["api_key"], json!("k-123"));
    assert!(report.contains("Member.api_key"));
    assert!(!report.contains("Team.api_key"));

    let strict = DtoEngine::new(strict_config());
    match strict.to_dict(&instance) {
        Err(DtoError::SensitiveField(err)) => {
            assert_eq!(err.owner, "Member");
            assert_eq!(err.field, "api_key");
        }
        other => panic!("expected SensitiveField, got {other:?}"),
    }
}

#[test]
fn directly_nested_dto_is_audited_under_parent_label() {
    let inner = DtoType::builder("Inner")
        .field("password", FieldType::text())
        .build()
        .unwrap();
    let outer = DtoType::builder("Outer")
        .field("inner", FieldType::dto(&inner))
        .build()
        .unwrap();
    let instance = DtoInstance::new(&outer)
        .with("inner", DtoInstance::new(&inner))
        .unwrap();
    let (_, report) = DtoEngine::default().to_dict_audited(&instance).unwrap();
    assert!(report.contains("Outer.password"));
}

#[test]
fn plain_mappings_inside_sequences_are_audited() {
    let ty = DtoType::builder("Batch")
        .field("rows", FieldType::sequence_of(FieldType::any()))
        .build()
        .unwrap();
    let batch = DtoEngine::default()
        .from_json(&ty, r#"{"rows": [{"session_id": "s"}, "token", 4]}"#)
        .unwrap();
    let (_, report) = DtoEngine::default().to_dict_audited(&batch).unwrap();
    assert_eq!(report.len(), 1);
    assert!(report.contains("Batch.session_id"));
}

#[test]
fn reinitialized_config_changes_matching() {
    let mut config = SensitiveFields::new();
    config.initialize(
        SensitiveFieldsOptions::default()
            .with_names(["nickname"])
            .with_suffixes(["_secret"])
            .with_replace(true),
    );
    let ty = DtoType::builder("Profile")
        .field("nickname", FieldType::text())
        .field("token", FieldType::text())
        .field("db_secret", FieldType::text())
        .build()
        .unwrap();
    let engine = DtoEngine::new(Arc::new(config));
    let (_, report) = engine.to_dict_audited(&DtoInstance::new(&ty)).unwrap();
    assert!(report.contains("Profile.nickname"));
    assert!(report.contains("Profile.db_secret"));
    assert!(!report.contains("Profile.token"));
}

// -- Normalization and defaults -----------------------------------------------

#[test]
fn unset_sequence_serializes_as_empty_list() {
    let engine = DtoEngine::default();
    let map = engine.to_dict(&DtoInstance::new(&credentials_type())).unwrap();
    assert_eq!(map["tags"], json!([]));
    assert_eq!(map["name"], Value::Null);
}

#[test]
fn set_typed_field_never_builds() {
    let result = DtoType::builder("Roles")
        .field("roles", FieldType::set_of(FieldType::text()))
        .build();
    match result {
        Err(DtoError::UnsupportedType { dto, field, .. }) => {
            assert_eq!(dto, "Roles");
            assert_eq!(field, "roles");
        }
        other => panic!("expected UnsupportedType, got {other:?}"),
    }
}

#[test]
fn optional_false_keeps_fields_required() {
    let ty = DtoType::builder("Required")
        .field("name", FieldType::text())
        .field_with_default("count", FieldType::int(), 1)
        .optional(false)
        .build()
        .unwrap();
    let engine = DtoEngine::default();
    assert!(matches!(
        engine.from_json(&ty, "{}"),
        Err(DtoError::MissingField { .. })
    ));
    let instance = engine.from_json(&ty, r#"{"name": "x"}"#).unwrap();
    assert_eq!(instance.get("count"), Some(&FieldValue::Int(1)));
}

#[test]
fn auto_collections_off_defaults_to_null() {
    let ty = DtoType::builder("Sparse")
        .field("tags", FieldType::sequence_of(FieldType::text()))
        .auto_collections(false)
        .build()
        .unwrap();
    let map = DtoEngine::default().to_dict(&DtoInstance::new(&ty)).unwrap();
    assert_eq!(map["tags"], Value::Null);
}

// -- Enums --------------------------------------------------------------------

fn status() -> Arc<EnumType> {
    EnumType::new(
        "Status",
        [("ACTIVE", json!("active")), ("SUSPENDED", json!("suspended"))],
    )
}

fn account_type() -> Arc<DtoType> {
    DtoType::builder("Account")
        .field("status", FieldType::enumeration(&status()))
        .field("history", FieldType::sequence_of(FieldType::enumeration(&status())))
        .build()
        .unwrap()
}

#[test]
fn enum_round_trips_by_value_and_by_name() {
    let ty = account_type();
    let engine = DtoEngine::default();
    let original = DtoInstance::new(&ty)
        .with("status", status().member("SUSPENDED").unwrap())
        .unwrap();

    let map = engine.to_dict(&original).unwrap();
    assert_eq!(map["status"], json!("suspended"));
    assert_eq!(engine.from_dict(&ty, &map).unwrap(), original);

    for spelling in ["SUSPENDED", "Suspended", "suspended"] {
        let data = object(json!({ "status": spelling }));
        assert_eq!(engine.from_dict(&ty, &data).unwrap(), original);
    }
}

#[test]
fn unknown_enum_value_fails_with_context() {
    let data = object(json!({"status": "closed"}));
    match DtoEngine::default().from_dict(&account_type(), &data) {
        Err(DtoError::EnumCoercion { value, enum_name }) => {
            assert_eq!(value, "\"closed\"");
            assert_eq!(enum_name, "Status");
        }
        other => panic!("expected EnumCoercion, got {other:?}"),
    }
}

#[test]
fn enums_inside_sequences_match_by_value_only() {
    let engine = DtoEngine::default();
    let ty = account_type();
    let ok = engine
        .from_json(&ty, r#"{"history": ["active", "suspended"]}"#)
        .unwrap();
    let map = engine.to_dict(&ok).unwrap();
    assert_eq!(map["history"], json!(["active", "suspended"]));

    assert!(matches!(
        engine.from_json(&ty, r#"{"history": ["ACTIVE"]}"#),
        Err(DtoError::TypeMismatch { .. })
    ));
}

#[test]
fn numeric_enum_values_match_across_int_and_float() {
    let priority = EnumType::new("Priority", [("LOW", json!(1)), ("HIGH", json!(2))]);
    let ty = DtoType::builder("Ticket")
        .field("priority", FieldType::enumeration(&priority))
        .field("queue", FieldType::sequence_of(FieldType::enumeration(&priority)))
        .build()
        .unwrap();
    let engine = DtoEngine::default();
    let ticket = engine
        .from_json(&ty, r#"{"priority": 2.0, "queue": [1.0, 2]}"#)
        .unwrap();
    let map = engine.to_dict(&ticket).unwrap();
    assert_eq!(map["priority"], json!(2));
    assert_eq!(map["queue"], json!([1, 2]));
}

// -- Conformance --------------------------------------------------------------

#[test]
fn hand_built_instances_keep_their_declared_types() {
    let ty = account_type();
    let mut account = DtoInstance::new(&ty);
    assert!(matches!(
        account.set("status", "suspended"),
        Err(DtoError::TypeMismatch { .. })
    ));
    assert!(matches!(
        account.set("history", vec![FieldValue::Int(3)]),
        Err(DtoError::TypeMismatch { .. })
    ));
    account
        .set("history", vec![status().member("ACTIVE").unwrap()])
        .unwrap();

    let engine = DtoEngine::default();
    let map = engine.to_dict(&account).unwrap();
    assert_eq!(engine.from_dict(&ty, &map).unwrap(), account);

    let other = DtoClass::new(credentials_type(), engine);
    assert!(matches!(
        other.to_dict(&account),
        Err(DtoError::TypeMismatch { .. })
    ));
}

// -- Text and request inputs --------------------------------------------------

#[test]
fn malformed_text_is_rejected() {
    let class = DtoClass::new(credentials_type(), DtoEngine::default());
    assert!(matches!(
        class.from_json("{\"name\": \"a\""),
        Err(DtoError::MalformedInput(_))
    ));
}

#[tokio::test]
async fn malformed_request_body_is_not_an_empty_instance() {
    let class = DtoClass::new(credentials_type(), DtoEngine::default());
    let result = class
        .from_http_request(Some(b"name=a&token=b".to_vec()))
        .await;
    assert!(matches!(result, Err(DtoError::MalformedInput(_))));
}

#[tokio::test]
async fn absent_request_is_invalid() {
    let class = DtoClass::new(credentials_type(), DtoEngine::default());
    let result = class.from_http_request::<String>(None).await;
    assert!(matches!(result, Err(DtoError::InvalidRequest(_))));
}

#[tokio::test]
async fn non_object_request_body_is_a_type_mismatch() {
    let class = DtoClass::new(credentials_type(), DtoEngine::default());
    let result = class.from_http_request(Some(String::from("[1, 2]"))).await;
    assert!(matches!(result, Err(DtoError::TypeMismatch { .. })));
}

#[tokio::test]
async fn request_body_builds_instance() {
    let class = DtoClass::new(credentials_type(), DtoEngine::default());
    let creds = class
        .from_http_request(Some(String::from(r#"{"name": "a", "tags": ["x"]}"#)))
        .await
        .unwrap();
    assert_eq!(creds.get("name"), Some(&FieldValue::text("a")));
    assert_eq!(creds.get("token"), Some(&FieldValue::Null));
}

// -- Round trip ---------------------------------------------------------------

fn profile_type() -> Arc<DtoType> {
    let address = DtoType::builder("Address")
        .field("city", FieldType::text())
        .field("zip", FieldType::int())
        .build()
        .unwrap();
    DtoType::builder("Profile")
        .field("name", FieldType::text())
        .field("age", FieldType::int())
        .field("active", FieldType::bool())
        .field("tags", FieldType::sequence_of(FieldType::text()))
        .field("scores", FieldType::mapping_of(FieldType::text(), FieldType::int()))
        .field("address", FieldType::dto(&address))
        .build()
        .unwrap()
}

fn profile_instance() -> impl Strategy<Value = DtoInstance> {
    (
        proptest::option::of("[a-zA-Z ]{0,12}"),
        proptest::option::of(any::<i64>()),
        proptest::option::of(any::<bool>()),
        proptest::collection::vec("[a-z]{0,6}", 0..4),
        proptest::collection::btree_map("[a-z]{1,6}", any::<i64>(), 0..4),
        proptest::option::of(("[a-z]{0,8}", any::<i64>())),
    )
        .prop_map(|(name, age, active, tags, scores, address)| {
            let ty = profile_type();
            let address = address.map(|(city, zip)| {
                let FieldType::Nullable(inner) = &ty.field("address").unwrap().ty else {
                    unreachable!("normalized fields are nullable");
                };
                let FieldType::Dto(address_ty) = inner.as_ref() else {
                    unreachable!("address is a dto");
                };
                DtoInstance::new(address_ty)
                    .with("city", city)
                    .unwrap()
                    .with("zip", zip)
                    .unwrap()
            });
            let scores = FieldValue::Mapping(
                scores
                    .into_iter()
                    .map(|(k, v)| (k, FieldValue::Int(v)))
                    .collect(),
            );
            DtoInstance::new(&ty)
                .with("name", name)
                .unwrap()
                .with("age", age)
                .unwrap()
                .with("active", active)
                .unwrap()
                .with("tags", tags)
                .unwrap()
                .with("scores", scores)
                .unwrap()
                .with("address", address)
                .unwrap()
        })
}

proptest! {
    /// from_dict(to_dict(i)) == i for instances without enum fields.
    #[test]
    fn dict_round_trip(instance in profile_instance()) {
        let engine = DtoEngine::new(Arc::new(SensitiveFields::disabled()));
        let map = engine.to_dict(&instance).unwrap();
        let back = engine.from_dict(instance.dto_type(), &map).unwrap();
        prop_assert_eq!(back, instance);
    }

    /// The same holds through JSON text.
    #[test]
    fn json_round_trip(instance in profile_instance()) {
        let engine = DtoEngine::new(Arc::new(SensitiveFields::disabled()));
        let text = engine.to_json(&instance).unwrap();
        let back = engine.from_json(instance.dto_type(), &text).unwrap();
        prop_assert_eq!(back, instance);
    }
}
