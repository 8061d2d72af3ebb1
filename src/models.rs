use std::fmt;

use serde::{Deserialize, Serialize};

/// Role attached to a user account.
///
/// The set is open: registration accepts any string, and only
/// `"house owner"` carries meaning for the role gate. Unknown values are
/// kept verbatim in `Other` so they round-trip through storage and tokens.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum Role {
    HouseOwner,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Self::HouseOwner => "house owner",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        if value == "house owner" {
            Self::HouseOwner
        } else {
            Self::Other(value)
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered user as stored in the `users` tree.
///
/// `id` is assigned by the store on insert. The password is stored and
/// compared in plaintext (see DESIGN.md).
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub role: Role,
    pub phone_number: String,
    pub email: String,
    pub password: String,
}

/// Registration payload before the store assigns an id.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub full_name: String,
    pub role: Role,
    pub phone_number: String,
    pub email: String,
    pub password: String,
}

/// The caller-supplied fields of a listing.
///
/// Wire names match the public API: snake_case throughout. Updates replace
/// the whole set at once.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HouseFields {
    pub name: String,
    pub address: String,
    pub city: String,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub room_size: String,
    pub picture: String,
    pub availability_date: String,
    pub rent_per_month: f64,
    pub phone_number: String,
    pub description: String,
}

/// A listing as stored in the `houses` tree.
///
/// `owner_id` is populated from the authenticated caller at creation and is
/// the scope key for list/update/delete.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct House {
    pub id: String,
    #[serde(flatten)]
    pub fields: HouseFields,
    #[serde(rename = "ownerId")]
    pub owner_id: String,
}
