//! User model and the admin upsert payload

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::lenient;
use crate::repositories::base::Record;

/// `user_type` value carried by translator accounts
pub const TRANSLATOR_ROLE: i32 = 2;

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub user_type: i32,
    pub name: String,
    pub company_id: i64,
    pub department_id: i64,
    pub email: String,
    pub dob_or_orgid: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    #[serde(skip_serializing, default)]
    pub password: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Overwrite the profile columns with freshly mapped request fields
    pub fn apply(&mut self, fields: UserFields) {
        self.user_type = fields.user_type;
        self.name = fields.name;
        self.company_id = fields.company_id;
        self.department_id = fields.department_id;
        self.email = fields.email;
        self.dob_or_orgid = fields.dob_or_orgid;
        self.phone = fields.phone;
        self.mobile = fields.mobile;
    }
}

impl Record for User {
    const ENTITY: &'static str = "User";
    const TABLE: &'static str = "users";
    const COLUMNS: &'static str = "id, user_type, name, company_id, department_id, email, \
        dob_or_orgid, phone, mobile, password, status, created_at, updated_at";
    const FILLABLE: &'static [&'static str] = &[
        "user_type",
        "name",
        "company_id",
        "department_id",
        "email",
        "dob_or_orgid",
        "phone",
        "mobile",
    ];
}

/// Account status as stored in `users.status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum UserStatus {
    #[serde(rename = "1")]
    Enabled,
    #[default]
    #[serde(rename = "0")]
    Disabled,
}

impl UserStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            UserStatus::Enabled => "1",
            UserStatus::Disabled => "0",
        }
    }
}

impl<'de> Deserialize<'de> for UserStatus {
    /// Accepts `"1"`/`"0"` as well as the numbers `1`/`0`
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) if s == "1" => Ok(UserStatus::Enabled),
            serde_json::Value::String(s) if s == "0" => Ok(UserStatus::Disabled),
            serde_json::Value::Number(n) if n.as_u64() == Some(1) => Ok(UserStatus::Enabled),
            serde_json::Value::Number(n) if n.as_u64() == Some(0) => Ok(UserStatus::Disabled),
            other => Err(de::Error::custom(format!(
                "invalid status {}, expected \"0\" or \"1\"",
                other
            ))),
        }
    }
}

/// Profile columns copied onto a user by the first upsert step
#[derive(Debug, Clone, PartialEq)]
pub struct UserFields {
    pub user_type: i32,
    pub name: String,
    pub company_id: i64,
    pub department_id: i64,
    pub email: String,
    pub dob_or_orgid: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
}

impl UserFields {
    /// Map the request onto user columns; company and department fall back to 0
    pub fn from_request(request: &UserRequest) -> Self {
        Self {
            user_type: request.role,
            name: request.name.clone(),
            company_id: request.company_id.unwrap_or(0),
            department_id: request.department_id.unwrap_or(0),
            email: request.email.clone(),
            dob_or_orgid: request.dob_or_orgid.clone(),
            phone: request.phone.clone(),
            mobile: request.mobile.clone(),
        }
    }
}

/// Payload accepted by the admin create/update user operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserRequest {
    #[serde(deserialize_with = "lenient::integer")]
    pub role: i32,
    pub name: String,
    #[serde(default, deserialize_with = "lenient::optional_integer")]
    pub company_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::optional_integer")]
    pub department_id: Option<i64>,
    pub email: String,
    pub dob_or_orgid: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub password: Option<String>,

    // user_meta columns
    pub consumer_type: Option<String>,
    pub customer_type: Option<String>,
    pub username: Option<String>,
    pub post_code: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub country: Option<String>,
    pub reference: Option<String>,
    pub additional_info: Option<String>,
    pub cost_place: Option<String>,
    pub fee: Option<String>,
    pub time_to_charge: Option<String>,
    pub time_to_pay: Option<String>,
    pub charge_ob: Option<String>,
    pub customer_id: Option<String>,
    pub charge_km: Option<String>,
    pub maximum_km: Option<String>,

    #[serde(default, deserialize_with = "lenient::integer_list")]
    pub translator_ex: Vec<i64>,
    #[serde(default, deserialize_with = "lenient::integer_list")]
    pub user_language: Vec<i64>,
    #[serde(default, deserialize_with = "lenient::integer_list")]
    pub user_towns_projects: Vec<i64>,
    pub new_towns: Option<String>,

    pub status: UserStatus,
}

impl UserRequest {
    /// Plaintext password, with empty strings treated as absent
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    /// Name of a town to create before syncing town edges
    pub fn new_town(&self) -> Option<&str> {
        self.new_towns
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fields_default_company_and_department_to_zero() {
        let request = UserRequest {
            role: 1,
            name: "Anna".to_string(),
            email: "anna@example.com".to_string(),
            ..Default::default()
        };

        let fields = UserFields::from_request(&request);
        assert_eq!(fields.company_id, 0);
        assert_eq!(fields.department_id, 0);
        assert_eq!(fields.user_type, 1);
    }

    #[test]
    fn test_request_deserializes_status_strings() {
        let request: UserRequest = serde_json::from_value(json!({
            "role": 2,
            "name": "Erik",
            "email": "erik@example.com",
            "status": "1",
            "translator_ex": [4, 5],
        }))
        .unwrap();

        assert_eq!(request.status, UserStatus::Enabled);
        assert_eq!(request.translator_ex, vec![4, 5]);
        assert!(request.user_language.is_empty());
        assert!(request.user_towns_projects.is_empty());
    }

    #[test]
    fn test_request_accepts_form_encoded_numbers() {
        let request: UserRequest = serde_json::from_value(json!({
            "role": "2",
            "name": "Erik",
            "email": "erik@example.com",
            "company_id": "",
            "department_id": "12",
            "status": 1,
            "translator_ex": ["3"],
            "user_language": null,
        }))
        .unwrap();

        assert_eq!(request.role, 2);
        assert_eq!(request.company_id, None);
        assert_eq!(request.department_id, Some(12));
        assert_eq!(request.status, UserStatus::Enabled);
        assert_eq!(request.translator_ex, vec![3]);
        assert!(request.user_language.is_empty());

        let fields = UserFields::from_request(&request);
        assert_eq!(fields.company_id, 0);
        assert_eq!(fields.department_id, 12);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result = serde_json::from_value::<UserRequest>(json!({
            "role": 1,
            "name": "Erik",
            "email": "erik@example.com",
            "status": "7",
        }));

        assert!(result.is_err());
    }

    #[test]
    fn test_empty_password_and_town_are_absent() {
        let request = UserRequest {
            password: Some(String::new()),
            new_towns: Some("   ".to_string()),
            ..Default::default()
        };

        assert_eq!(request.password(), None);
        assert_eq!(request.new_town(), None);
    }

    #[test]
    fn test_password_is_never_serialized() {
        let user = User {
            id: 1,
            user_type: 1,
            name: "Anna".to_string(),
            company_id: 0,
            department_id: 0,
            email: "anna@example.com".to_string(),
            dob_or_orgid: None,
            phone: None,
            mobile: None,
            password: Some("$argon2id$secret".to_string()),
            status: "1".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["status"], "1");
    }
}
