//! One-to-one profile extension of a user

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::UserRequest;
use crate::repositories::base::Record;

/// UserMeta entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserMeta {
    pub id: i64,
    pub user_id: i64,
    pub consumer_type: Option<String>,
    pub customer_type: Option<String>,
    pub username: Option<String>,
    pub post_code: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub country: Option<String>,
    pub reference: i32,
    pub additional_info: Option<String>,
    pub cost_place: Option<String>,
    pub fee: Option<String>,
    pub time_to_charge: Option<String>,
    pub time_to_pay: Option<String>,
    pub charge_ob: Option<String>,
    pub customer_id: Option<String>,
    pub charge_km: Option<String>,
    pub maximum_km: Option<String>,
}

impl UserMeta {
    /// Overwrite every meta column from the request.
    ///
    /// Fields missing from the request are cleared. `reference` is stored as
    /// 1 only for the literal `"yes"`.
    pub fn apply(&mut self, request: &UserRequest) {
        self.consumer_type = request.consumer_type.clone();
        self.customer_type = request.customer_type.clone();
        self.username = request.username.clone();
        self.post_code = request.post_code.clone();
        self.address = request.address.clone();
        self.city = request.city.clone();
        self.town = request.town.clone();
        self.country = request.country.clone();
        self.reference = i32::from(request.reference.as_deref() == Some("yes"));
        self.additional_info = request.additional_info.clone();
        self.cost_place = request.cost_place.clone();
        self.fee = request.fee.clone();
        self.time_to_charge = request.time_to_charge.clone();
        self.time_to_pay = request.time_to_pay.clone();
        self.charge_ob = request.charge_ob.clone();
        self.customer_id = request.customer_id.clone();
        self.charge_km = request.charge_km.clone();
        self.maximum_km = request.maximum_km.clone();
    }

    /// Named meta attributes in column order
    pub fn attributes(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("consumer_type", self.consumer_type.clone()),
            ("customer_type", self.customer_type.clone()),
            ("username", self.username.clone()),
            ("post_code", self.post_code.clone()),
            ("address", self.address.clone()),
            ("city", self.city.clone()),
            ("town", self.town.clone()),
            ("country", self.country.clone()),
            ("reference", Some(self.reference.to_string())),
            ("additional_info", self.additional_info.clone()),
            ("cost_place", self.cost_place.clone()),
            ("fee", self.fee.clone()),
            ("time_to_charge", self.time_to_charge.clone()),
            ("time_to_pay", self.time_to_pay.clone()),
            ("charge_ob", self.charge_ob.clone()),
            ("customer_id", self.customer_id.clone()),
            ("charge_km", self.charge_km.clone()),
            ("maximum_km", self.maximum_km.clone()),
        ]
    }
}

impl Record for UserMeta {
    const ENTITY: &'static str = "UserMeta";
    const TABLE: &'static str = "user_meta";
    const COLUMNS: &'static str = "id, user_id, consumer_type, customer_type, username, \
        post_code, address, city, town, country, reference, additional_info, cost_place, fee, \
        time_to_charge, time_to_pay, charge_ob, customer_id, charge_km, maximum_km";
    const FILLABLE: &'static [&'static str] = &[
        "consumer_type",
        "customer_type",
        "username",
        "post_code",
        "address",
        "city",
        "town",
        "country",
        "reference",
        "additional_info",
        "cost_place",
        "fee",
        "time_to_charge",
        "time_to_pay",
        "charge_ob",
        "customer_id",
        "charge_km",
        "maximum_km",
    ];
}
