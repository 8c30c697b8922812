//! Database handle
//!
//! [`MockDatabase`] is a set of named in-memory collections, created on
//! first use the way a document database creates collections on first
//! write. [`Database::open`] is where the application decides, once and
//! explicitly, which backend it runs against; the handle is then passed to
//! whatever needs it.
//!
//! No real database driver ships with this crate. A configured `mongo_uri`
//! therefore falls back to the in-memory store, unless the configuration
//! requires a real database.

use std::collections::BTreeMap;

use serde_json::json;
use tracing::{info, warn};

use crate::collection::Collection;
use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::query::Query;
use crate::value::{document, Document};

/// Named in-memory collections
#[derive(Debug, Clone, Default)]
pub struct MockDatabase {
    collections: BTreeMap<String, Collection>,
}

impl MockDatabase {
    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a database seeded with the sample bakery data
    pub fn with_sample_data() -> Self {
        let mut db = Self::new();
        db.collection_mut("cakes").insert_many(sample_cakes());
        db.collection_mut("users").insert_many(sample_users());
        let ordered = db.collection_mut("cakes").find(&Query::all()).limit(1).to_vec();
        db.collection_mut("orders").insert_many(sample_orders(ordered));
        db.collection_mut("comments").insert_many(sample_comments());
        db
    }

    /// Get a collection without creating it
    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    /// Get a collection, creating it if needed
    pub fn collection_mut(&mut self, name: &str) -> &mut Collection {
        self.collections
            .entry(name.to_string())
            .or_insert_with(|| Collection::new(name))
    }

    /// Names of all collections, sorted
    pub fn collection_names(&self) -> Vec<&str> {
        self.collections.keys().map(String::as_str).collect()
    }

    /// Remove a collection and its records
    pub fn drop_collection(&mut self, name: &str) -> bool {
        self.collections.remove(name).is_some()
    }
}

/// Backend the application runs against
#[derive(Debug)]
pub enum Database {
    /// Process-lifetime, in-memory store
    Memory(MockDatabase),
}

impl Database {
    /// Open the backend selected by the configuration
    pub fn open(config: &Config) -> StoreResult<Self> {
        if let Some(uri) = &config.mongo_uri {
            if config.require_database {
                return Err(StoreError::Unavailable {
                    uri: uri.clone(),
                    reason: "no document database driver is bundled".to_string(),
                });
            }
            warn!(
                "No document database driver available for {}; using in-memory store",
                uri
            );
        }

        let db = if config.seed_sample_data {
            MockDatabase::with_sample_data()
        } else {
            MockDatabase::new()
        };
        info!(
            "Opened in-memory store with {} collection(s)",
            db.collection_names().len()
        );
        Ok(Database::Memory(db))
    }

    /// Whether this is the non-durable in-memory backend
    pub fn is_memory(&self) -> bool {
        matches!(self, Database::Memory(_))
    }

    /// Get a collection without creating it
    pub fn collection(&self, name: &str) -> Option<&Collection> {
        match self {
            Database::Memory(db) => db.collection(name),
        }
    }

    /// Get a collection, creating it if needed
    pub fn collection_mut(&mut self, name: &str) -> &mut Collection {
        match self {
            Database::Memory(db) => db.collection_mut(name),
        }
    }

    /// Names of all collections, sorted
    pub fn collection_names(&self) -> Vec<&str> {
        match self {
            Database::Memory(db) => db.collection_names(),
        }
    }
}

// ==================== Sample data ====================

#[allow(clippy::too_many_arguments)]
fn cake(
    name: &str,
    price: u64,
    category: &str,
    image: &str,
    description: &str,
    ingredients: &[&str],
    allergens: &[&str],
    serving_size: &str,
    preparation_time: &str,
) -> Document {
    document(json!({
        "name": name,
        "price": price,
        "description": description,
        "category": category,
        "image": format!("/static/cake_uploads/{}", image),
        "ingredients": ingredients,
        "allergens": allergens,
        "serving_size": serving_size,
        "preparation_time": preparation_time,
    }))
}

const GLUTEN_DAIRY_EGGS: &[&str] = &["Gluten", "Dairy", "Eggs"];

fn sample_cakes() -> Vec<Document> {
    vec![
        cake(
            "Chocolate Delight",
            45000,
            "chocolate cakes",
            "ChocolateCake.jpg",
            "Rich chocolate cake with creamy frosting and chocolate shavings.",
            &["Flour", "Cocoa powder", "Sugar", "Eggs", "Butter", "Chocolate chips"],
            GLUTEN_DAIRY_EGGS,
            "8-10 people",
            "24-48 hours",
        ),
        cake(
            "Vanilla Dream",
            35000,
            "Vanilla Cake",
            "VanillaCake.jpg",
            "Classic vanilla cake with buttercream frosting and fresh berries.",
            &["Flour", "Sugar", "Eggs", "Butter", "Vanilla extract", "Fresh berries"],
            GLUTEN_DAIRY_EGGS,
            "6-8 people",
            "24-48 hours",
        ),
        cake(
            "Red Velvet Royal",
            55000,
            "Wedding Cake",
            "weddingCake.jpg",
            "Red velvet cake with cream cheese frosting for special occasions.",
            &["Flour", "Cocoa powder", "Red food coloring", "Buttermilk", "Cream cheese", "Butter"],
            GLUTEN_DAIRY_EGGS,
            "12-15 people",
            "48-72 hours",
        ),
        cake(
            "Orange Zest Special",
            40000,
            "Orange Cake",
            "orangeCake.jpg",
            "Fresh orange cake with citrus glaze and candied orange peel.",
            &["Flour", "Sugar", "Eggs", "Orange juice", "Orange zest", "Butter"],
            GLUTEN_DAIRY_EGGS,
            "6-8 people",
            "24-48 hours",
        ),
        cake(
            "Mini Vanilla Cupcakes",
            15000,
            "Mini Cake",
            "Vanilla-Cupcakes-Square-2024.webp",
            "Mini vanilla cupcakes for parties and events.",
            &["Flour", "Sugar", "Eggs", "Butter", "Vanilla extract", "Frosting"],
            GLUTEN_DAIRY_EGGS,
            "12 mini cupcakes",
            "12-24 hours",
        ),
        cake(
            "Fresh Bread Loaf",
            8000,
            "Bread",
            "bread.jpg",
            "Freshly baked bread made with traditional methods.",
            &["Flour", "Water", "Yeast", "Salt", "Sugar"],
            &["Gluten"],
            "8-10 slices",
            "4-6 hours",
        ),
        cake(
            "Chocolate Chip Cookies",
            12000,
            "Cookies",
            "classic-chocolate-chip-cookies.jpg",
            "Chocolate chip cookies with crispy edges and chewy centers.",
            &["Flour", "Butter", "Brown sugar", "Chocolate chips", "Eggs", "Vanilla"],
            GLUTEN_DAIRY_EGGS,
            "24 cookies",
            "2-4 hours",
        ),
        cake(
            "Ready Chocolate Cake",
            25000,
            "Ready Cake",
            "Chocolate-Cake-8-1-scaled-354x354.webp",
            "Pre-made chocolate cake ready for immediate enjoyment.",
            &["Flour", "Cocoa powder", "Sugar", "Eggs", "Butter", "Chocolate"],
            GLUTEN_DAIRY_EGGS,
            "6-8 people",
            "Ready to serve",
        ),
    ]
}

fn sample_users() -> Vec<Document> {
    vec![
        document(json!({
            "email": "admin@fyncakes.com",
            "username": "admin",
            "first_name": "Admin",
            "last_name": "User",
            "role": "admin",
            "password": "hashed_password"
        })),
        document(json!({
            "email": "customer@example.com",
            "username": "customer1",
            "first_name": "John",
            "last_name": "Doe",
            "role": "customer",
            "password": "hashed_password"
        })),
    ]
}

/// Orders snapshot the stored cake records, `_id` included
fn sample_orders(products: Vec<Document>) -> Vec<Document> {
    vec![document(json!({
        "order_id": "FYN-1001",
        "customer_email": "customer@example.com",
        "products": products,
        "total_amount": 45000,
        "payment_status": "completed",
        "order_status": "delivered",
        "delivery_date": "2024-01-15",
        "customer_phone": "0758123456",
        "order_placed_at": "2024-01-10T00:00:00Z"
    }))]
}

fn sample_comments() -> Vec<Document> {
    let now = chrono::Utc::now();
    let comment = |name: &str, email: &str, text: &str, age: chrono::Duration| {
        document(json!({
            "name": name,
            "email": email,
            "comment": text,
            "rating": 5,
            "approved": true,
            "created_at": (now - age).to_rfc3339(),
        }))
    };

    vec![
        comment(
            "Sarah Johnson",
            "sarah.j@email.com",
            "Absolutely delicious cakes! FynCakes is our go-to for every family celebration.",
            chrono::Duration::days(5),
        ),
        comment(
            "Michael Davis",
            "michael.d@email.com",
            "FynCakes made our wedding day extra special with a beautiful cake.",
            chrono::Duration::days(3),
        ),
        comment(
            "Grace Mbabazi",
            "grace.m@email.com",
            "The best bakery in Kampala! Professional team, always on time.",
            chrono::Duration::days(1),
        ),
        comment(
            "David Kato",
            "david.k@email.com",
            "Amazing service and even better cakes! The chocolate cake was to die for.",
            chrono::Duration::hours(12),
        ),
        comment(
            "Jennifer Namukasa",
            "jennifer.n@email.com",
            "Professional, creative, and absolutely delicious!",
            chrono::Duration::hours(6),
        ),
    ]
}
