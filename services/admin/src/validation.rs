//! Rule-based validation of request payloads

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::OnceLock;

use crate::error::{AdminError, AdminResult};

/// A single constraint applied to one field of a data bag
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Required,
    Nullable,
    String,
    Integer,
    Email,
    Array,
    /// Every element of an array must be an integer
    Integers,
    In(&'static [&'static str]),
    /// Minimum length for strings and arrays, minimum value for numbers
    Min(usize),
    /// Maximum length for strings and arrays, maximum value for numbers
    Max(usize),
}

impl Rule {
    fn name(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::Nullable => "nullable",
            Rule::String => "string",
            Rule::Integer => "integer",
            Rule::Email => "email",
            Rule::Array => "array",
            Rule::Integers => "integers",
            Rule::In(_) => "in",
            Rule::Min(_) => "min",
            Rule::Max(_) => "max",
        }
    }
}

/// Field name paired with the rules that apply to it
pub type RuleSet = Vec<(&'static str, Vec<Rule>)>;

/// Field-level messages produced by a failed validation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.values().flatten().map(String::as_str).collect();
        write!(f, "{}", messages.join(" "))
    }
}

/// Runs a rule set against a JSON data bag
#[derive(Debug, Clone, Default)]
pub struct Validator {
    rules: RuleSet,
    messages: HashMap<String, String>,
    attribute_names: HashMap<String, String>,
}

impl Validator {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            ..Default::default()
        }
    }

    /// Override messages, keyed by `"field.rule"`
    pub fn with_messages(mut self, messages: HashMap<String, String>) -> Self {
        self.messages = messages;
        self
    }

    /// Display names substituted for field names in messages
    pub fn with_attribute_names(mut self, attribute_names: HashMap<String, String>) -> Self {
        self.attribute_names = attribute_names;
        self
    }

    /// Collect every rule violation in `data`
    pub fn errors(&self, data: &Value) -> ValidationErrors {
        let mut errors = ValidationErrors::default();

        for (field, rules) in &self.rules {
            let value = data.get(*field).unwrap_or(&Value::Null);

            if !is_present(value) {
                if rules.contains(&Rule::Required) {
                    errors.add(field, self.message(field, &Rule::Required));
                }
                continue;
            }

            for rule in rules {
                if !passes(rule, value) {
                    errors.add(field, self.message(field, rule));
                }
            }
        }

        errors
    }

    /// Fail with [`AdminError::Validation`] when any rule is violated
    pub fn validate(&self, data: &Value) -> AdminResult<()> {
        let errors = self.errors(data);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AdminError::Validation(errors))
        }
    }

    fn attribute(&self, field: &str) -> String {
        self.attribute_names
            .get(field)
            .cloned()
            .unwrap_or_else(|| field.replace('_', " "))
    }

    fn message(&self, field: &str, rule: &Rule) -> String {
        if let Some(custom) = self.messages.get(&format!("{}.{}", field, rule.name())) {
            return custom.clone();
        }

        let attribute = self.attribute(field);
        match rule {
            Rule::Required => format!("The {} field is required.", attribute),
            Rule::Nullable => String::new(),
            Rule::String => format!("The {} must be a string.", attribute),
            Rule::Integer => format!("The {} must be an integer.", attribute),
            Rule::Email => format!("The {} must be a valid email address.", attribute),
            Rule::Array => format!("The {} must be an array.", attribute),
            Rule::Integers => format!("The {} must contain only integers.", attribute),
            Rule::In(_) => format!("The selected {} is invalid.", attribute),
            Rule::Min(n) => format!("The {} must be at least {}.", attribute, n),
            Rule::Max(n) => format!("The {} may not be greater than {}.", attribute, n),
        }
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_i64() || n.is_u64(),
        Value::String(s) => s.trim().parse::<i64>().is_ok(),
        _ => false,
    }
}

fn size(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => Some(s.chars().count() as f64),
        Value::Array(items) => Some(items.len() as f64),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn passes(rule: &Rule, value: &Value) -> bool {
    match rule {
        Rule::Required | Rule::Nullable => true,
        Rule::String => value.is_string(),
        Rule::Integer => is_integer(value),
        Rule::Email => value.as_str().is_some_and(is_valid_email),
        Rule::Array => value.is_array(),
        Rule::Integers => value
            .as_array()
            .is_some_and(|items| items.iter().all(is_integer)),
        Rule::In(allowed) => {
            let candidate = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return false,
            };
            allowed.contains(&candidate.as_str())
        }
        Rule::Min(n) => size(value).is_some_and(|s| s >= *n as f64),
        Rule::Max(n) => size(value).is_some_and(|s| s <= *n as f64),
    }
}

fn is_valid_email(email: &str) -> bool {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    regex.is_match(email)
}

/// Rules applied to the admin user payload before an upsert
pub fn user_request_rules() -> RuleSet {
    vec![
        ("role", vec![Rule::Required, Rule::Integer]),
        ("name", vec![Rule::Required, Rule::String, Rule::Max(255)]),
        ("email", vec![Rule::Required, Rule::Email, Rule::Max(255)]),
        ("company_id", vec![Rule::Nullable, Rule::Integer]),
        ("department_id", vec![Rule::Nullable, Rule::Integer]),
        ("dob_or_orgid", vec![Rule::Nullable, Rule::String]),
        ("phone", vec![Rule::Nullable, Rule::String]),
        ("mobile", vec![Rule::Nullable, Rule::String]),
        ("password", vec![Rule::Nullable, Rule::String, Rule::Min(6)]),
        ("reference", vec![Rule::Nullable, Rule::String]),
        (
            "translator_ex",
            vec![Rule::Nullable, Rule::Array, Rule::Integers],
        ),
        (
            "user_language",
            vec![Rule::Nullable, Rule::Array, Rule::Integers],
        ),
        (
            "user_towns_projects",
            vec![Rule::Nullable, Rule::Array, Rule::Integers],
        ),
        ("new_towns", vec![Rule::Nullable, Rule::String, Rule::Max(255)]),
        ("status", vec![Rule::Required, Rule::In(&["0", "1"])]),
    ]
}

/// Rules applied to town payloads
pub fn town_rules() -> RuleSet {
    vec![("townname", vec![Rule::Required, Rule::String, Rule::Max(255)])]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_user() -> Value {
        json!({
            "role": 1,
            "name": "Anna Berg",
            "email": "anna@example.com",
            "status": "1",
            "translator_ex": [3, 4],
        })
    }

    #[test]
    fn test_valid_user_passes() {
        let validator = Validator::new(user_request_rules());
        assert!(validator.validate(&valid_user()).is_ok());
    }

    #[test]
    fn test_missing_required_fields_are_reported() {
        let validator = Validator::new(user_request_rules());
        let errors = validator.errors(&json!({ "name": "" }));

        assert_eq!(
            errors.get("name"),
            Some(&["The name field is required.".to_string()][..])
        );
        assert!(errors.get("role").is_some());
        assert!(errors.get("email").is_some());
        assert!(errors.get("status").is_some());
        assert!(errors.get("phone").is_none());
    }

    #[test]
    fn test_status_must_be_zero_or_one() {
        let mut data = valid_user();
        data["status"] = json!("2");

        let errors = Validator::new(user_request_rules()).errors(&data);
        assert_eq!(
            errors.get("status"),
            Some(&["The selected status is invalid.".to_string()][..])
        );
    }

    #[test]
    fn test_id_lists_must_hold_integers() {
        let mut data = valid_user();
        data["user_language"] = json!([1, "two"]);

        let errors = Validator::new(user_request_rules()).errors(&data);
        assert!(errors.get("user_language").is_some());
        assert!(errors.get("translator_ex").is_none());
    }

    #[test]
    fn test_invalid_email_and_short_password() {
        let mut data = valid_user();
        data["email"] = json!("not-an-email");
        data["password"] = json!("abc");

        let errors = Validator::new(user_request_rules()).errors(&data);
        assert_eq!(
            errors.get("email"),
            Some(&["The email must be a valid email address.".to_string()][..])
        );
        assert_eq!(
            errors.get("password"),
            Some(&["The password must be at least 6.".to_string()][..])
        );
    }

    #[test]
    fn test_custom_messages_and_attribute_names() {
        let validator = Validator::new(user_request_rules())
            .with_messages(HashMap::from([(
                "status.in".to_string(),
                "Pick enabled or disabled.".to_string(),
            )]))
            .with_attribute_names(HashMap::from([(
                "dob_or_orgid".to_string(),
                "organisation number".to_string(),
            )]));

        let mut data = valid_user();
        data["status"] = json!("x");
        data["dob_or_orgid"] = json!(19900101);

        let errors = validator.errors(&data);
        assert_eq!(
            errors.get("status"),
            Some(&["Pick enabled or disabled.".to_string()][..])
        );
        assert_eq!(
            errors.get("dob_or_orgid"),
            Some(&["The organisation number must be a string.".to_string()][..])
        );
    }

    #[test]
    fn test_validate_returns_validation_error() {
        let result = Validator::new(town_rules()).validate(&json!({}));
        assert!(matches!(result, Err(AdminError::Validation(_))));
    }
}
