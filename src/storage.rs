use serde::Serialize;
use sled::Db;
use uuid::Uuid;

use crate::error::StorageError;
use crate::models::{House, HouseFields, NewUser, User};

/// Result of an update, mirroring the counts the store reports to callers.
///
/// A filter that matches nothing (unknown id, or an owner mismatch) yields
/// all-zero counts; `modified_count` stays 0 when the replacement equals
/// the stored fields.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Result of a delete, same zero-on-mismatch rule as [`UpdateOutcome`].
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub deleted_count: u64,
}

/// Credential store: `users` and `houses` collections as JSON documents in
/// Sled, one tree per collection, keyed by a store-assigned UUID.
///
/// Constructed once at startup and handed to the request layer; Sled handles
/// are internally synchronized and cheap to clone.
#[allow(dead_code)] // db handle kept alive alongside its trees
#[derive(Clone)]
pub struct Storage {
    db: Db,
    user_tree: sled::Tree,
    house_tree: sled::Tree,
}

impl Storage {
    /// Open or create the Sled database at the given path.
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        let user_tree = db.open_tree("users")?;
        let house_tree = db.open_tree("houses")?;
        Ok(Self {
            db,
            user_tree,
            house_tree,
        })
    }

    /// Insert a user and return the store-assigned identifier.
    ///
    /// Email uniqueness is intentionally not enforced here.
    pub fn insert_user(&self, new_user: NewUser) -> Result<String, StorageError> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            full_name: new_user.full_name,
            role: new_user.role,
            phone_number: new_user.phone_number,
            email: new_user.email,
            password: new_user.password,
        };
        let json_bytes = serde_json::to_vec(&user)?;
        self.user_tree.insert(user.id.as_bytes(), json_bytes)?;
        Ok(user.id)
    }

    /// Look a user up by email. First match in key order wins; duplicate
    /// emails are possible by design.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        for item in self.user_tree.iter() {
            let (_, value) = item?;
            let user: User = serde_json::from_slice(&value)?;
            if user.email == email {
                return Ok(Some(user));
            }
        }
        Ok(None)
    }

    /// Insert a listing owned by `owner_id`, returning the assigned id.
    pub fn insert_house(
        &self,
        fields: HouseFields,
        owner_id: &str,
    ) -> Result<String, StorageError> {
        let house = House {
            id: Uuid::new_v4().to_string(),
            fields,
            owner_id: owner_id.to_string(),
        };
        let json_bytes = serde_json::to_vec(&house)?;
        self.house_tree.insert(house.id.as_bytes(), json_bytes)?;
        Ok(house.id)
    }

    /// All listings whose `ownerId` matches the caller.
    pub fn houses_by_owner(&self, owner_id: &str) -> Result<Vec<House>, StorageError> {
        let mut houses = Vec::new();
        for item in self.house_tree.iter() {
            let (_, value) = item?;
            let house: House = serde_json::from_slice(&value)?;
            if house.owner_id == owner_id {
                houses.push(house);
            }
        }
        Ok(houses)
    }

    /// Replace a listing's fields, filtered by id AND owner.
    ///
    /// A non-owner's request matches zero documents and reports zero counts
    /// rather than erroring; callers must check the outcome.
    pub fn update_house(
        &self,
        id: &str,
        owner_id: &str,
        fields: &HouseFields,
    ) -> Result<UpdateOutcome, StorageError> {
        let Some(value) = self.house_tree.get(id.as_bytes())? else {
            return Ok(UpdateOutcome::default());
        };
        let mut house: House = serde_json::from_slice(&value)?;
        if house.owner_id != owner_id {
            return Ok(UpdateOutcome::default());
        }

        let modified_count = if house.fields == *fields {
            0
        } else {
            house.fields = fields.clone();
            let json_bytes = serde_json::to_vec(&house)?;
            self.house_tree.insert(id.as_bytes(), json_bytes)?;
            1
        };
        Ok(UpdateOutcome {
            matched_count: 1,
            modified_count,
        })
    }

    /// Delete a listing, filtered by id AND owner. Same zero-on-mismatch
    /// rule as [`Storage::update_house`].
    pub fn delete_house(&self, id: &str, owner_id: &str) -> Result<DeleteOutcome, StorageError> {
        let Some(value) = self.house_tree.get(id.as_bytes())? else {
            return Ok(DeleteOutcome::default());
        };
        let house: House = serde_json::from_slice(&value)?;
        if house.owner_id != owner_id {
            return Ok(DeleteOutcome::default());
        }
        self.house_tree.remove(id.as_bytes())?;
        Ok(DeleteOutcome { deleted_count: 1 })
    }
}
