//! Integration tests for `#[derive(Schema)]` and validation through the facade.

#![allow(dead_code)]

use jsonvet::prelude::*;
use std::collections::HashMap;

#[derive(Deserialize, Schema)]
struct AbstractRequest {
    #[vet(required)]
    result: bool,
}

#[derive(Deserialize, Schema)]
#[vet(parent = AbstractRequest)]
struct UserListResponse {
    #[vet(required(order = 1), not_null(order = 2), not_empty(order = 3))]
    users: Vec<UserDto>,
}

#[derive(Deserialize, Schema)]
struct UserDto {
    #[vet(required(order = 1), not_null(order = 2), not_empty(order = 3))]
    name: String,
}

#[derive(Deserialize, Schema)]
#[serde(rename_all = "camelCase")]
struct Account {
    #[vet(required, pattern(regex = "[a-z][a-z0-9_]*", order = 2))]
    user_name: String,

    #[vet(minimum = 18, maximum(value = 120, order = 2), label = "Age")]
    #[serde(rename = "age")]
    age_years: Option<u32>,

    #[vet(range(min = -10, max = 10.5, message = "${name} out of range: ${value}"))]
    balance: f64,

    #[vet(required)]
    #[serde(skip)]
    cache: Vec<u8>,

    #[vet(skip)]
    ignored: String,

    #[vet(custom(rule = "two_chars", rule = "upper", order = 3), display_name = "Country code")]
    country: Option<String>,

    attributes: HashMap<String, String>,
}

#[derive(Deserialize, Schema)]
struct TreeNode {
    #[vet(required, not_empty)]
    name: String,
    children: Vec<TreeNode>,
    parent: Option<Box<TreeNode>>,
}

#[derive(Deserialize, Schema)]
#[vet(parent = "AbstractRequest", name = "OrderMessage")]
struct Order {
    #[vet(element = "LineItem")]
    lines: Vec<serde_json::Value>,

    #[vet(opaque)]
    metadata: Option<UserDto>,
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum Status {
    Active,
    Suspended,
}

#[derive(Deserialize, Schema)]
struct Membership {
    #[vet(required, opaque)]
    status: Status,

    #[vet(opaque, not_empty)]
    history: Option<Vec<Status>>,
}

fn validator() -> Validator {
    Validator::builder()
        .locale("en")
        .labels(StaticResources::new().with("labels", None, "Age", "Age in years"))
        .rule(
            "two_chars",
            rule_fn(|value, ctx| match value.and_then(Value::as_str) {
                Some(s) if s.chars().count() != 2 => {
                    ValidationResult::error(format!("{} must have two characters", ctx.keywords().get("name").and_then(Value::as_str).unwrap_or_default()))
                }
                _ => ValidationResult::success(),
            }),
        )
        .rule(
            "upper",
            rule_fn(|value, ctx| match value.and_then(Value::as_str) {
                Some(s) if s.chars().any(char::is_lowercase) => ctx.fail("Upper.case"),
                _ => ValidationResult::success(),
            }),
        )
        .build()
}

#[test]
fn end_to_end_missing_name_in_list_element() {
    let report = validator()
        .validate_str_as::<UserListResponse>(r#"{"result":true,"users":[{"aaaa":"aa"}]}"#);

    assert_eq!(report.len(), 1);
    assert_eq!(report.failures()[0].path, "/users[0]/name");
    assert_eq!(report.failures()[0].rule, "required");
    assert_eq!(report.failures()[0].message, "name is required.");
    assert!(report.at("/result").is_empty());
    assert!(report.at("/users").is_empty());
}

#[test]
fn inherited_fields_fail_before_own_fields() {
    let report = validator().validate_as::<UserListResponse>(&json!({}));
    let paths: Vec<_> = report.failures().iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["/result", "/users"]);
}

#[test]
fn derived_schema_registers_referenced_types() {
    let schema = Schema::of::<UserListResponse>();
    assert!(schema.contains("UserListResponse"));
    assert!(schema.contains("AbstractRequest"));
    assert!(schema.contains("UserDto"));

    let response = schema.get("UserListResponse").unwrap();
    assert_eq!(response.parent.as_deref(), Some("AbstractRequest"));
    let users = &response.fields[0];
    assert_eq!(users.element_type.as_deref(), Some("UserDto"));
    assert_eq!(
        users.rules,
        vec![
            RuleSpec::required().order(1),
            RuleSpec::not_null().order(2),
            RuleSpec::not_empty().order(3),
        ]
    );
    assert!(schema.lint().is_empty());
}

#[test]
fn serde_names_and_field_options() {
    let descriptor = <Account as Describe>::type_descriptor();
    let keys: Vec<_> = descriptor.fields.iter().map(|f| f.key()).collect();
    assert_eq!(keys, vec!["userName", "age", "balance", "country", "attributes"]);

    let age = &descriptor.fields[1];
    assert_eq!(age.name, "age_years");
    assert_eq!(age.label.as_deref(), Some("Age"));
    assert_eq!(age.element_type, None);
    assert_eq!(
        age.rules,
        vec![RuleSpec::minimum(18.0), RuleSpec::maximum(120.0).order(2)]
    );

    let balance = &descriptor.fields[2];
    assert_eq!(
        balance.rules,
        vec![RuleSpec::range(-10.0, 10.5).message("${name} out of range: ${value}")]
    );

    let country = &descriptor.fields[3];
    assert_eq!(country.display_name.as_deref(), Some("Country code"));
    assert_eq!(
        country.rules,
        vec![RuleSpec::custom(["two_chars", "upper"]).order(3)]
    );

    assert_eq!(descriptor.fields[4].element_type, None);
}

#[test]
fn account_rules_produce_localized_messages() {
    let report = validator().validate_as::<Account>(&json!({
        "userName": "Bob",
        "age": 12,
        "balance": 11,
        "country": "usa",
        "attributes": {}
    }));

    let messages: Vec<_> = report
        .failures()
        .iter()
        .map(|f| (f.path.as_str(), f.rule.as_str(), f.message.as_str()))
        .collect();
    assert_eq!(
        messages,
        vec![
            (
                "/userName",
                "pattern",
                "userName does not match the pattern [a-z][a-z0-9_]*."
            ),
            (
                "/age",
                "minimum",
                "Age in years must be greater than or equal to 18."
            ),
            ("/balance", "range", "balance out of range: 11"),
            (
                "/country",
                "custom:two_chars",
                "Country code must have two characters"
            ),
        ]
    );
}

#[test]
fn custom_rule_without_message_uses_placeholder() {
    let report = validator().validate_as::<Account>(&json!({
        "userName": "bob",
        "balance": 0,
        "country": "us",
    }));
    assert_eq!(report.len(), 1);
    assert_eq!(report.failures()[0].rule, "custom:upper");
    assert_eq!(
        report.failures()[0].message,
        "Undefined validation error message.[Upper.case]"
    );
}

#[test]
fn recursive_types_validate_at_depth() {
    let schema = Schema::of::<TreeNode>();
    assert_eq!(schema.len(), 1);
    let node = schema.get("TreeNode").unwrap();
    assert_eq!(node.fields[1].element_type.as_deref(), Some("TreeNode"));
    assert_eq!(node.fields[2].element_type.as_deref(), Some("TreeNode"));

    let report = validator().validate_as::<TreeNode>(&json!({
        "name": "root",
        "children": [
            {"name": "a", "children": []},
            {"name": "b", "children": [{"name": ""}, {"children": []}]}
        ],
        "parent": {"name": "up"}
    }));
    let failures: Vec<_> = report
        .failures()
        .iter()
        .map(|f| (f.path.as_str(), f.rule.as_str()))
        .collect();
    assert_eq!(
        failures,
        vec![
            ("/children[1]/children[0]/name", "not_empty"),
            ("/children[1]/children[1]/name", "required"),
        ]
    );
}

#[test]
fn named_parent_and_explicit_element_type() {
    let descriptor = <Order as Describe>::type_descriptor();
    assert_eq!(descriptor.name, "OrderMessage");
    assert_eq!(<Order as Describe>::type_name(), "OrderMessage");
    assert_eq!(descriptor.parent.as_deref(), Some("AbstractRequest"));
    assert_eq!(descriptor.fields[0].element_type.as_deref(), Some("LineItem"));
    assert_eq!(descriptor.fields[1].element_type, None);

    // parents named by string are not registered automatically
    let schema = Schema::of::<Order>();
    assert!(!schema.contains("AbstractRequest"));
    let report = validator().validate(&json!({"lines": [{}]}), &schema, "OrderMessage");
    assert!(report.is_valid());
    assert_eq!(report.diagnostics().len(), 2);

    let schema = Schema::new().with::<Order>().with::<AbstractRequest>();
    let report = validator().validate(&json!({"lines": []}), &schema, "OrderMessage");
    assert_eq!(report.len(), 1);
    assert_eq!(report.failures()[0].path, "/result");
}

#[test]
fn japanese_messages() {
    let report = validator()
        .with_locale("ja_JP.UTF-8")
        .validate_str_as::<UserListResponse>(r#"{"result":true,"users":[{}]}"#);
    assert_eq!(report.failures()[0].message, "nameは必須です。");
}

#[test]
fn opaque_fields_of_foreign_types_stay_leaves() {
    let schema = Schema::of::<Membership>();
    assert_eq!(schema.len(), 1);
    let descriptor = schema.get("Membership").unwrap();
    assert!(descriptor.fields.iter().all(|f| f.element_type.is_none()));

    let report = validator().validate_as::<Membership>(&json!({"history": []}));
    let failures: Vec<_> = report
        .failures()
        .iter()
        .map(|f| (f.path.as_str(), f.rule.as_str()))
        .collect();
    assert_eq!(
        failures,
        vec![("/status", "required"), ("/history", "not_empty")]
    );
    assert!(report.diagnostics().is_empty());
}

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn node_name() -> impl Strategy<Value = Option<String>> {
        prop_oneof![Just(None), Just(Some(String::new())), "[a-z]{1,5}".prop_map(Some)]
    }

    fn node(name: Option<String>, children: Vec<Value>) -> Value {
        let mut object = serde_json::Map::new();
        if let Some(name) = name {
            object.insert("name".to_string(), Value::String(name));
        }
        object.insert("children".to_string(), Value::Array(children));
        Value::Object(object)
    }

    fn tree() -> impl Strategy<Value = Value> {
        let leaf = node_name().prop_map(|name| node(name, Vec::new()));
        leaf.prop_recursive(4, 32, 4, |inner| {
            (node_name(), prop::collection::vec(inner, 0..4))
                .prop_map(|(name, children)| node(name, children))
        })
    }

    fn nameless(tree: &Value) -> usize {
        let own = match tree.get("name").and_then(Value::as_str) {
            Some(name) if !name.is_empty() => 0,
            _ => 1,
        };
        let children = tree["children"].as_array().map_or(0, |children| {
            children.iter().map(nameless).sum()
        });
        own + children
    }

    proptest! {
        #[test]
        fn derived_tree_reports_are_deterministic(tree in tree()) {
            let validator = validator();
            let first = validator.validate_as::<TreeNode>(&tree);
            let second = validator.validate_as::<TreeNode>(&tree);
            prop_assert_eq!(first.failures(), second.failures());
        }

        #[test]
        fn every_nameless_node_fails_once(tree in tree()) {
            let report = validator().validate_as::<TreeNode>(&tree);
            prop_assert_eq!(report.len(), nameless(&tree));
            prop_assert!(report.diagnostics().is_empty());
        }
    }
}
