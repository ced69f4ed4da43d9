use crate::timestamp;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt::Debug;
use utoipa::ToSchema;
use uuid::Uuid;

/// A record type with its own collection.
pub trait Entity: Serialize + DeserializeOwned + Debug + Clone + Send + Sync + 'static {
    /// Name of the collection holding every record of this type.
    const COLLECTION: &'static str;
    /// Field that uniquely identifies a record within its collection.
    const KEY_FIELD: &'static str = "id";
    /// Fields a storage backend should keep as native timestamps.
    const TIMESTAMP_FIELDS: &'static [&'static str] = &[];
    /// Used when reporting on this record type to clients, e.g. "Recipe added successfully".
    const LABEL: &'static str;

    fn key(&self) -> &str;
}

/// A client-supplied record, before an identifier and defaults are assigned.
pub trait NewEntity: DeserializeOwned + Debug + Send + 'static {
    type Entity: Entity;

    fn into_entity(self) -> Self::Entity;
}

pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_unit() -> String {
    "pieces".to_string()
}

fn default_category() -> String {
    "other".to_string()
}

fn default_user() -> String {
    "default".to_string()
}

fn default_difficulty() -> String {
    "medium".to_string()
}

fn default_recipe_category() -> String {
    "main".to_string()
}

fn default_status() -> String {
    "active".to_string()
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub barcode: Option<String>,
    pub quantity: i64,
    pub unit: String,
    /// Unreadable stored values come back as `None`.
    #[serde(default, deserialize_with = "timestamp::lenient")]
    pub expiry_date: Option<DateTime<Utc>>,
    pub category: String,
    #[serde(deserialize_with = "timestamp::required")]
    pub added_date: DateTime<Utc>,
    pub user_id: String,
}

impl Entity for InventoryItem {
    const COLLECTION: &'static str = "inventory";
    const TIMESTAMP_FIELDS: &'static [&'static str] = &["expiry_date", "added_date"];
    const LABEL: &'static str = "Item";

    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Deserialize, ToSchema, Clone)]
pub struct NewInventoryItem {
    pub name: String,
    pub barcode: Option<String>,
    pub quantity: i64,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub added_date: Option<DateTime<Utc>>,
    #[serde(default = "default_user")]
    pub user_id: String,
}

impl NewInventoryItem {
    /// Builds the record stored under an identifier that already exists.
    pub fn into_entity_with_id(self, id: String) -> InventoryItem {
        InventoryItem {
            id,
            name: self.name,
            barcode: self.barcode,
            quantity: self.quantity,
            unit: self.unit,
            expiry_date: self.expiry_date,
            category: self.category,
            added_date: self.added_date.unwrap_or_else(Utc::now),
            user_id: self.user_id,
        }
    }
}

impl NewEntity for NewInventoryItem {
    type Entity = InventoryItem;

    fn into_entity(self) -> InventoryItem {
        self.into_entity_with_id(generate_id())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    /// Minutes.
    pub prep_time: i64,
    pub difficulty: String,
    pub category: String,
    #[serde(default)]
    pub affiliate_links: BTreeMap<String, String>,
    #[serde(default)]
    pub expiring_ingredients: Vec<String>,
    #[serde(deserialize_with = "timestamp::required")]
    pub created_date: DateTime<Utc>,
}

impl Entity for Recipe {
    const COLLECTION: &'static str = "recipes";
    const TIMESTAMP_FIELDS: &'static [&'static str] = &["created_date"];
    const LABEL: &'static str = "Recipe";

    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Deserialize, ToSchema, Clone)]
pub struct NewRecipe {
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub prep_time: i64,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default = "default_recipe_category")]
    pub category: String,
    #[serde(default)]
    pub affiliate_links: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub expiring_ingredients: Vec<String>,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub created_date: Option<DateTime<Utc>>,
}

impl NewEntity for NewRecipe {
    type Entity = Recipe;

    fn into_entity(self) -> Recipe {
        Recipe {
            id: generate_id(),
            name: self.name,
            ingredients: self.ingredients,
            instructions: self.instructions,
            prep_time: self.prep_time,
            difficulty: self.difficulty,
            category: self.category,
            affiliate_links: self.affiliate_links.unwrap_or_default(),
            expiring_ingredients: self.expiring_ingredients,
            created_date: self.created_date.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub id: String,
    pub title: String,
    pub description: String,
    pub points: i64,
    /// daily, weekly or monthly.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "timestamp::lenient")]
    pub deadline: Option<DateTime<Utc>>,
    pub status: String,
    #[serde(deserialize_with = "timestamp::required")]
    pub created_date: DateTime<Utc>,
}

impl Challenge {
    pub const ACTIVE: &'static str = "active";
}

impl Entity for Challenge {
    const COLLECTION: &'static str = "challenges";
    const TIMESTAMP_FIELDS: &'static [&'static str] = &["deadline", "created_date"];
    const LABEL: &'static str = "Challenge";

    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Deserialize, ToSchema, Clone)]
pub struct NewChallenge {
    pub title: String,
    pub description: String,
    pub points: i64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub created_date: Option<DateTime<Utc>>,
}

impl NewEntity for NewChallenge {
    type Entity = Challenge;

    fn into_entity(self) -> Challenge {
        Challenge {
            id: generate_id(),
            title: self.title,
            description: self.description,
            points: self.points,
            kind: self.kind,
            deadline: self.deadline,
            status: self.status,
            created_date: self.created_date.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    /// Not checked for format or uniqueness.
    pub email: String,
    pub points: i64,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub preferences: Map<String, Value>,
    #[serde(deserialize_with = "timestamp::required")]
    pub created_date: DateTime<Utc>,
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    const TIMESTAMP_FIELDS: &'static [&'static str] = &["created_date"];
    const LABEL: &'static str = "User";

    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Deserialize, ToSchema, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub preferences: Map<String, Value>,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub created_date: Option<DateTime<Utc>>,
}

impl NewEntity for NewUser {
    type Entity = User;

    fn into_entity(self) -> User {
        User {
            id: generate_id(),
            name: self.name,
            email: self.email,
            points: self.points,
            preferences: self.preferences,
            created_date: self.created_date.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct WasteItem {
    pub id: String,
    /// Not checked against the inventory, and left alone when that item is deleted.
    pub original_item_id: String,
    pub item_name: String,
    pub quantity: i64,
    pub reason: String,
    #[serde(deserialize_with = "timestamp::required")]
    pub date_discarded: DateTime<Utc>,
    pub user_id: String,
}

impl Entity for WasteItem {
    const COLLECTION: &'static str = "waste";
    const TIMESTAMP_FIELDS: &'static [&'static str] = &["date_discarded"];
    const LABEL: &'static str = "Waste item";

    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Deserialize, ToSchema, Clone)]
pub struct NewWasteItem {
    pub original_item_id: String,
    pub item_name: String,
    pub quantity: i64,
    pub reason: String,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub date_discarded: Option<DateTime<Utc>>,
    #[serde(default = "default_user")]
    pub user_id: String,
}

impl NewEntity for NewWasteItem {
    type Entity = WasteItem;

    fn into_entity(self) -> WasteItem {
        WasteItem {
            id: generate_id(),
            original_item_id: self.original_item_id,
            item_name: self.item_name,
            quantity: self.quantity,
            reason: self.reason,
            date_discarded: self.date_discarded.unwrap_or_else(Utc::now),
            user_id: self.user_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct Deal {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Free text, e.g. "20% off".
    pub discount: String,
    pub store_name: String,
    #[serde(default, deserialize_with = "timestamp::lenient")]
    pub expiry_date: Option<DateTime<Utc>>,
    pub sponsored: bool,
    pub image_url: Option<String>,
    #[serde(deserialize_with = "timestamp::required")]
    pub created_date: DateTime<Utc>,
}

impl Entity for Deal {
    const COLLECTION: &'static str = "deals";
    const TIMESTAMP_FIELDS: &'static [&'static str] = &["expiry_date", "created_date"];
    const LABEL: &'static str = "Deal";

    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Deserialize, ToSchema, Clone)]
pub struct NewDeal {
    pub title: String,
    pub description: String,
    pub discount: String,
    pub store_name: String,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sponsored: bool,
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub created_date: Option<DateTime<Utc>>,
}

impl NewEntity for NewDeal {
    type Entity = Deal;

    fn into_entity(self) -> Deal {
        Deal {
            id: generate_id(),
            title: self.title,
            description: self.description,
            discount: self.discount,
            store_name: self.store_name,
            expiry_date: self.expiry_date,
            sponsored: self.sponsored,
            image_url: self.image_url,
            created_date: self.created_date.unwrap_or_else(Utc::now),
        }
    }
}

/// Product details for a barcode. Only ever written by a barcode lookup.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct BarcodeProduct {
    pub barcode: String,
    pub name: String,
    pub brand: Option<String>,
    pub category: Option<String>,
}

impl Entity for BarcodeProduct {
    const COLLECTION: &'static str = "products";
    const KEY_FIELD: &'static str = "barcode";
    const LABEL: &'static str = "Product";

    fn key(&self) -> &str {
        &self.barcode
    }
}
