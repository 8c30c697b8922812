//! Data models for FynCakes
//!
//! Typed shapes for the records the bakery stores: cakes, users, orders,
//! comments, cart items, wishlist items and class registrations. Records stay schema-less inside
//! a [`Collection`]; these types validate them where they cross into
//! application code. Fields a model does not know about are kept in its
//! `extra` map so nothing is lost on a round trip.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::collection::{Collection, InsertOneResult};
use crate::error::ModelError;
use crate::query::Query;
use crate::value::Document;

/// Unknown fields carried alongside a model
pub type Extra = serde_json::Map<String, Value>;

/// A record type stored in a named collection
pub trait Entity: Serialize + DeserializeOwned {
    /// Collection the entity lives in
    const COLLECTION: &'static str;

    /// Check values serde cannot express
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Convert into a record
    fn to_document(&self) -> Result<Document, ModelError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ModelError::NotADocument {
                collection: Self::COLLECTION,
            }),
            Err(source) => Err(ModelError::Invalid {
                collection: Self::COLLECTION,
                source,
            }),
        }
    }

    /// Parse and validate a record
    fn from_document(record: &Document) -> Result<Self, ModelError> {
        let entity: Self =
            serde_json::from_value(Value::Object(record.clone())).map_err(|source| {
                ModelError::Invalid {
                    collection: Self::COLLECTION,
                    source,
                }
            })?;
        entity.validate().map_err(|reason| ModelError::Rejected {
            collection: Self::COLLECTION,
            reason,
        })?;
        Ok(entity)
    }
}

impl Collection {
    /// Find matching records and parse them as `T`
    ///
    /// Fails on the first record that does not fit the model.
    pub fn find_as<T: Entity>(&self, query: &Query) -> Result<Vec<T>, ModelError> {
        self.find(query).iter().map(T::from_document).collect()
    }

    /// Validate and insert an entity
    pub fn insert_entity<T: Entity>(&mut self, entity: &T) -> Result<InsertOneResult, ModelError> {
        entity.validate().map_err(|reason| ModelError::Rejected {
            collection: T::COLLECTION,
            reason,
        })?;
        Ok(self.insert_one(entity.to_document()?))
    }
}

fn check_email(email: &str) -> Result<(), String> {
    let valid = email
        .split_once('@')
        .is_some_and(|(user, domain)| !user.is_empty() && domain.contains('.'));
    if valid {
        Ok(())
    } else {
        Err(format!("invalid email address '{}'", email))
    }
}

/// A product in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cake {
    /// Identifier assigned by the store
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// Price in Ugandan shillings
    pub price: u64,
    #[serde(default)]
    pub description: String,
    pub category: String,
    /// Image path under the static directory
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preparation_time: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Cake {
    /// Create a cake with the required fields
    pub fn new(name: impl Into<String>, price: u64, category: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            price,
            description: String::new(),
            category: category.into(),
            image: String::new(),
            ingredients: Vec::new(),
            allergens: Vec::new(),
            serving_size: None,
            preparation_time: None,
            extra: Extra::new(),
        }
    }
}

impl Entity for Cake {
    const COLLECTION: &'static str = "cakes";

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("cake name is empty".to_string());
        }
        Ok(())
    }
}

/// Account role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Customer,
}

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Login identity; unique across users
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role: Role,
    /// Password hash, never the plain password
    pub password: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl Entity for User {
    const COLLECTION: &'static str = "users";

    fn validate(&self) -> Result<(), String> {
        check_email(&self.email)
    }
}

/// A placed order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Human-facing order number, e.g. `FYN-1001`
    pub order_id: String,
    pub customer_email: String,
    /// Snapshot of the ordered products
    #[serde(default)]
    pub products: Vec<Document>,
    /// Integer or fractional amount, stored as given
    pub total_amount: Number,
    pub payment_status: String,
    pub order_status: String,
    pub delivery_date: NaiveDate,
    #[serde(default)]
    pub customer_phone: String,
    pub order_placed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Order {
    /// Total as a float, for display
    pub fn total(&self) -> f64 {
        self.total_amount.as_f64().unwrap_or(0.0)
    }
}

impl Entity for Order {
    const COLLECTION: &'static str = "orders";

    fn validate(&self) -> Result<(), String> {
        check_email(&self.customer_email)
    }
}

/// A customer testimonial
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub comment: String,
    /// Star rating, 1 to 5
    pub rating: u8,
    /// Only approved comments are shown publicly
    #[serde(default)]
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Entity for Comment {
    const COLLECTION: &'static str = "comments";

    fn validate(&self) -> Result<(), String> {
        if !(1..=5).contains(&self.rating) {
            return Err(format!("rating {} is outside 1..=5", self.rating));
        }
        check_email(&self.email)
    }
}

/// An item in a user's cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_email: String,
    pub name: String,
    pub price: u64,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "imageUrl", default)]
    pub image_url: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Entity for CartItem {
    const COLLECTION: &'static str = "carts";
}

/// A cake saved to a user's wishlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WishlistItem {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_email: String,
    pub cake_id: String,
    pub cake_name: String,
    pub cake_price: u64,
    #[serde(default)]
    pub cake_image: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Entity for WishlistItem {
    const COLLECTION: &'static str = "wishlist";
}

/// A registration for the baking class
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Student {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// One registration per account
    pub user_email: String,
    pub student_name: String,
    pub student_phone: String,
    pub registration_date: DateTime<Utc>,
    pub course_fee: u64,
    #[serde(default)]
    pub amount_paid: u64,
    pub payment_status: String,
    /// Set once the deposit is paid
    #[serde(default)]
    pub has_access: bool,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Entity for Student {
    const COLLECTION: &'static str = "students";

    fn validate(&self) -> Result<(), String> {
        if self.amount_paid > self.course_fee {
            return Err(format!(
                "amount paid {} exceeds course fee {}",
                self.amount_paid, self.course_fee
            ));
        }
        check_email(&self.user_email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::document;
    use serde_json::json;

    #[test]
    fn test_cake_round_trip_keeps_extra_fields() {
        let record = document(json!({
            "_id": "mock_1",
            "name": "Chocolate Delight",
            "price": 45000,
            "category": "chocolate cakes",
            "featured": true
        }));

        let cake = Cake::from_document(&record).unwrap();
        assert_eq!(cake.id.as_deref(), Some("mock_1"));
        assert_eq!(cake.price, 45000);
        assert!(cake.ingredients.is_empty());
        assert_eq!(cake.extra.get("featured"), Some(&json!(true)));

        let back = cake.to_document().unwrap();
        assert_eq!(back["featured"], json!(true));
        assert_eq!(back["_id"], json!("mock_1"));
    }

    #[test]
    fn test_new_cake_has_no_id_field() {
        let doc = Cake::new("Bread", 8000, "Bread").to_document().unwrap();
        assert!(!doc.contains_key("_id"));
        assert!(!doc.contains_key("serving_size"));
    }

    #[test]
    fn test_missing_required_field_is_invalid() {
        let err = Cake::from_document(&document(json!({"name": "No price", "category": "Bread"})))
            .unwrap_err();
        assert!(matches!(err, ModelError::Invalid { collection: "cakes", .. }));
    }

    #[test]
    fn test_user_role() {
        let user = User::from_document(&document(json!({
            "email": "admin@fyncakes.com",
            "role": "admin",
            "password": "hash"
        })))
        .unwrap();
        assert!(user.is_admin());

        let user = User::from_document(&document(json!({
            "email": "customer@example.com",
            "password": "hash"
        })))
        .unwrap();
        assert_eq!(user.role, Role::Customer);
    }

    #[test]
    fn test_user_email_rejected() {
        let err = User::from_document(&document(json!({
            "email": "not-an-email",
            "password": "hash"
        })))
        .unwrap_err();
        assert!(matches!(err, ModelError::Rejected { collection: "users", .. }));
    }

    #[test]
    fn test_comment_rating_range() {
        let mut record = document(json!({
            "name": "Sarah",
            "email": "sarah.j@email.com",
            "comment": "Lovely",
            "rating": 5,
            "approved": true,
            "created_at": "2024-01-10T12:00:00Z"
        }));
        assert!(Comment::from_document(&record).is_ok());

        record.insert("rating".into(), json!(0));
        assert!(matches!(
            Comment::from_document(&record),
            Err(ModelError::Rejected { .. })
        ));
    }

    #[test]
    fn test_order_dates() {
        let order = Order::from_document(&document(json!({
            "order_id": "FYN-1001",
            "customer_email": "customer@example.com",
            "total_amount": 45000,
            "payment_status": "completed",
            "order_status": "delivered",
            "delivery_date": "2024-01-15",
            "order_placed_at": "2024-01-10T09:30:00Z"
        })))
        .unwrap();

        assert_eq!(order.delivery_date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert!(order.products.is_empty());
        assert_eq!(order.total_amount, Number::from(45000));
    }

    #[test]
    fn test_order_fractional_total() {
        let record = document(json!({
            "order_id": "FYN-1002",
            "customer_email": "customer@example.com",
            "total_amount": 12500.5,
            "payment_status": "pending_payment",
            "order_status": "awaiting_payment",
            "delivery_date": "2024-02-01",
            "order_placed_at": "2024-01-20T09:30:00Z"
        }));
        let mut orders = Collection::new(Order::COLLECTION);
        orders.insert_one(record);

        let found: Vec<Order> = orders.find_as(&Query::all()).unwrap();
        assert_eq!(found[0].total(), 12500.5);
        assert_eq!(found[0].to_document().unwrap()["total_amount"], json!(12500.5));
    }

    #[test]
    fn test_student_validation() {
        let mut record = document(json!({
            "user_email": "customer@example.com",
            "student_name": "John Doe",
            "student_phone": "0758123456",
            "registration_date": "2024-03-01T10:00:00Z",
            "course_fee": 300000,
            "payment_status": "pending_deposit"
        }));
        let student = Student::from_document(&record).unwrap();
        assert_eq!(student.amount_paid, 0);
        assert!(!student.has_access);

        record.insert("amount_paid".into(), json!(400000));
        assert!(matches!(
            Student::from_document(&record),
            Err(ModelError::Rejected { collection: "students", .. })
        ));
    }

    #[test]
    fn test_cart_item_image_url_rename() {
        let item = CartItem {
            id: None,
            user_email: "customer@example.com".to_string(),
            name: "Bread".to_string(),
            price: 8000,
            description: String::new(),
            image_url: "/static/bread.jpg".to_string(),
            extra: Extra::new(),
        };
        let doc = item.to_document().unwrap();
        assert_eq!(doc["imageUrl"], json!("/static/bread.jpg"));
    }

    #[test]
    fn test_collection_entity_helpers() {
        let mut wishlist = Collection::new(WishlistItem::COLLECTION);
        let item = WishlistItem {
            id: None,
            user_email: "customer@example.com".to_string(),
            cake_id: "mock_3".to_string(),
            cake_name: "Red Velvet Royal".to_string(),
            cake_price: 55000,
            cake_image: String::new(),
            extra: Extra::new(),
        };

        let inserted = wishlist.insert_entity(&item).unwrap();
        let items: Vec<WishlistItem> = wishlist
            .find_as(&Query::all().eq("user_email", "customer@example.com"))
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id.as_deref(), inserted.inserted_id.as_str());
        assert_eq!(items[0].cake_name, "Red Velvet Royal");
    }

    #[test]
    fn test_insert_entity_validates() {
        let mut cakes = Collection::new(Cake::COLLECTION);
        let err = cakes.insert_entity(&Cake::new("  ", 100, "Bread")).unwrap_err();
        assert!(matches!(err, ModelError::Rejected { .. }));
        assert!(cakes.is_empty());
    }
}
