//! Shop flows
//!
//! The writes a signed-in customer makes (cart, checkout, class
//! registration) and the figures the admin dashboard reads. Request input is
//! checked here; the records themselves are validated by their [`Entity`]
//! impls on insert.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use chrono::{NaiveDate, Utc};
use serde_json::{Number, Value};
use tracing::{debug, info};

use crate::catalog;
use crate::collection::{Collection, InsertOneResult};
use crate::database::Database;
use crate::error::{ModelError, ShopError};
use crate::models::{Cake, CartItem, Entity, Extra, Order, Student, User};
use crate::query::Query;
use crate::value::{Document, FIELD_ID};

/// Prefix of customer-facing order numbers
pub const ORDER_PREFIX: &str = "FYN-";

/// Payment status of a newly placed order
pub const PAYMENT_PENDING: &str = "pending_payment";

/// Order status of a newly placed order
pub const ORDER_AWAITING_PAYMENT: &str = "awaiting_payment";

/// Payment status of a new class registration
pub const DEPOSIT_PENDING: &str = "pending_deposit";

/// Baking class fee in Ugandan shillings
pub const CLASS_COURSE_FEE: u64 = 300_000;

/// Customers shown on the admin dashboard
pub const DASHBOARD_CUSTOMERS: usize = 10;

const ORDER_NUMBERS: RangeInclusive<u32> = 1000..=9999;

fn id_string(inserted: InsertOneResult) -> Option<String> {
    inserted.inserted_id.as_str().map(str::to_string)
}

fn required<'a>(value: &'a str, name: &'static str) -> Result<&'a str, ShopError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ShopError::MissingField(name))
    } else {
        Ok(value)
    }
}

fn owned_by(user_email: &str) -> Query {
    Query::all().eq("user_email", user_email)
}

// ==================== Cart ====================

/// Items in a user's cart, in the order they were added
pub fn cart_items(carts: &Collection, user_email: &str) -> Result<Vec<CartItem>, ModelError> {
    carts.find_as(&owned_by(user_email))
}

/// Add a cake to a user's cart
pub fn add_to_cart(
    carts: &mut Collection,
    user_email: &str,
    cake: &Cake,
) -> Result<CartItem, ModelError> {
    let mut item = CartItem {
        id: None,
        user_email: user_email.to_string(),
        name: cake.name.clone(),
        price: cake.price,
        description: cake.description.clone(),
        image_url: cake.image.clone(),
        extra: Extra::new(),
    };

    item.id = id_string(carts.insert_entity(&item)?);
    debug!("Added {} to cart of {}", item.name, user_email);
    Ok(item)
}

/// Remove one item, only if it belongs to the user
pub fn remove_from_cart(carts: &mut Collection, user_email: &str, item_id: &str) -> bool {
    let query = owned_by(user_email).eq(FIELD_ID, item_id);
    carts.delete_one(&query).deleted_count > 0
}

/// Empty a user's cart, returning how many items were removed
pub fn clear_cart(carts: &mut Collection, user_email: &str) -> usize {
    carts.delete_many(&owned_by(user_email)).deleted_count
}

// ==================== Orders ====================

/// Checkout request as submitted from the cart page
#[derive(Debug, Clone, Default)]
pub struct OrderRequest {
    /// Snapshot of the cart items
    pub products: Vec<Document>,
    pub total_amount: Option<Number>,
    /// `YYYY-MM-DD`
    pub delivery_date: String,
    pub phone_number: String,
}

/// Record a new order awaiting payment
///
/// Every field is required and the total must be positive. The order
/// number is the lowest free `FYN-nnnn`.
pub fn place_order(
    orders: &mut Collection,
    customer_email: &str,
    request: OrderRequest,
) -> Result<Order, ShopError> {
    if request.products.is_empty() {
        return Err(ShopError::MissingField("products"));
    }
    let total_amount = request
        .total_amount
        .filter(|n| n.as_f64().is_some_and(|v| v > 0.0))
        .ok_or(ShopError::MissingField("total amount"))?;
    let date_text = required(&request.delivery_date, "delivery date")?;
    let phone = required(&request.phone_number, "phone number")?;

    let delivery_date = NaiveDate::parse_from_str(date_text, "%Y-%m-%d").map_err(|source| {
        ShopError::InvalidDate {
            value: date_text.to_string(),
            source,
        }
    })?;

    let mut order = Order {
        id: None,
        order_id: next_order_number(orders)?,
        customer_email: customer_email.to_string(),
        products: request.products,
        total_amount,
        payment_status: PAYMENT_PENDING.to_string(),
        order_status: ORDER_AWAITING_PAYMENT.to_string(),
        delivery_date,
        customer_phone: phone.to_string(),
        order_placed_at: Utc::now(),
        extra: Extra::new(),
    };

    order.id = id_string(orders.insert_entity(&order)?);
    info!("Order {} placed by {}", order.order_id, customer_email);
    Ok(order)
}

fn next_order_number(orders: &Collection) -> Result<String, ShopError> {
    let taken: HashSet<&str> = orders
        .documents()
        .iter()
        .filter_map(|order| order.get("order_id").and_then(Value::as_str))
        .collect();

    ORDER_NUMBERS
        .map(|n| format!("{}{}", ORDER_PREFIX, n))
        .find(|id| !taken.contains(id.as_str()))
        .ok_or(ShopError::OrderNumbersExhausted)
}

// ==================== Baking class ====================

/// Whether the user holds a class registration
pub fn is_student(students: &Collection, user_email: &str) -> bool {
    students.find_one(&owned_by(user_email)).is_some()
}

/// Reserve a class place, one per account
pub fn register_class(
    students: &mut Collection,
    user_email: &str,
    name: &str,
    phone: &str,
) -> Result<Student, ShopError> {
    let name = required(name, "name")?;
    let phone = required(phone, "phone")?;

    if is_student(students, user_email) {
        return Err(ShopError::AlreadyRegistered {
            email: user_email.to_string(),
        });
    }

    let mut student = Student {
        id: None,
        user_email: user_email.to_string(),
        student_name: name.to_string(),
        student_phone: phone.to_string(),
        registration_date: Utc::now(),
        course_fee: CLASS_COURSE_FEE,
        amount_paid: 0,
        payment_status: DEPOSIT_PENDING.to_string(),
        has_access: false,
        extra: Extra::new(),
    };

    student.id = id_string(students.insert_entity(&student)?);
    info!("Class place reserved for {}", user_email);
    Ok(student)
}

// ==================== Dashboard ====================

/// A customer account with its class status
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerSummary {
    pub user: User,
    pub is_student: bool,
}

/// Figures shown on the admin dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_sales: Value,
    pub total_orders: usize,
    pub total_customers: usize,
    /// Most recently registered customers first
    pub recent_customers: Vec<CustomerSummary>,
}

fn customer_query() -> Query {
    Query::all().eq("role", "customer")
}

/// Customer accounts, newest first, flagged when they hold a registration
pub fn customers_with_student_status(
    users: &Collection,
    students: &Collection,
    limit: Option<usize>,
) -> Result<Vec<CustomerSummary>, ModelError> {
    let mut customers: Vec<User> = users.find_as(&customer_query())?;
    customers.reverse();
    if let Some(limit) = limit {
        customers.truncate(limit);
    }

    Ok(customers
        .into_iter()
        .map(|user| CustomerSummary {
            is_student: is_student(students, &user.email),
            user,
        })
        .collect())
}

/// Gather the admin dashboard figures
///
/// Collections that do not exist yet count as empty.
pub fn dashboard_stats(db: &Database) -> Result<DashboardStats, ModelError> {
    let empty = Collection::new("");
    let orders = db.collection(Order::COLLECTION).unwrap_or(&empty);
    let users = db.collection(User::COLLECTION).unwrap_or(&empty);
    let students = db.collection(Student::COLLECTION).unwrap_or(&empty);

    Ok(DashboardStats {
        total_sales: catalog::total_sales(orders),
        total_orders: orders.count_documents(&Query::all()),
        total_customers: users.count_documents(&customer_query()),
        recent_customers: customers_with_student_status(
            users,
            students,
            Some(DASHBOARD_CUSTOMERS),
        )?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MockDatabase;
    use crate::value::document;
    use serde_json::json;

    const CUSTOMER: &str = "customer@example.com";

    fn bread() -> Cake {
        Cake::new("Fresh Bread Loaf", 8000, "Bread")
    }

    fn order_request() -> OrderRequest {
        OrderRequest {
            products: vec![document(json!({"name": "Fresh Bread Loaf", "price": 8000}))],
            total_amount: Some(Number::from(8000)),
            delivery_date: "2024-06-01".to_string(),
            phone_number: "0758123456".to_string(),
        }
    }

    #[test]
    fn test_cart_add_and_list() {
        let mut carts = Collection::new(CartItem::COLLECTION);
        let added = add_to_cart(&mut carts, CUSTOMER, &bread()).unwrap();
        add_to_cart(&mut carts, "other@example.com", &bread()).unwrap();

        assert_eq!(added.id.as_deref(), Some("mock_1"));
        let items = cart_items(&carts, CUSTOMER).unwrap();
        assert_eq!(items, vec![added]);
        assert_eq!(carts.documents()[0]["user_email"], json!(CUSTOMER));
    }

    #[test]
    fn test_remove_from_cart_checks_owner() {
        let mut carts = Collection::new(CartItem::COLLECTION);
        let item = add_to_cart(&mut carts, CUSTOMER, &bread()).unwrap();
        let id = item.id.unwrap();

        assert!(!remove_from_cart(&mut carts, "other@example.com", &id));
        assert!(remove_from_cart(&mut carts, CUSTOMER, &id));
        assert!(!remove_from_cart(&mut carts, CUSTOMER, &id));
        assert!(carts.is_empty());
    }

    #[test]
    fn test_clear_cart_only_touches_user() {
        let mut carts = Collection::new(CartItem::COLLECTION);
        for _ in 0..3 {
            add_to_cart(&mut carts, CUSTOMER, &bread()).unwrap();
        }
        add_to_cart(&mut carts, "other@example.com", &bread()).unwrap();

        assert_eq!(clear_cart(&mut carts, CUSTOMER), 3);
        assert_eq!(clear_cart(&mut carts, CUSTOMER), 0);
        assert_eq!(carts.len(), 1);
    }

    #[test]
    fn test_place_order() {
        let mut orders = Collection::new(Order::COLLECTION);
        let order = place_order(&mut orders, CUSTOMER, order_request()).unwrap();

        assert_eq!(order.order_id, "FYN-1000");
        assert_eq!(order.payment_status, PAYMENT_PENDING);
        assert_eq!(order.order_status, ORDER_AWAITING_PAYMENT);
        assert_eq!(order.delivery_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());

        let stored: Vec<Order> = orders.find_as(&Query::all()).unwrap();
        assert_eq!(stored, vec![order]);
    }

    #[test]
    fn test_order_numbers_skip_taken() {
        let mut db = MockDatabase::with_sample_data();
        let orders = db.collection_mut(Order::COLLECTION);

        let first = place_order(orders, CUSTOMER, order_request()).unwrap();
        let second = place_order(orders, CUSTOMER, order_request()).unwrap();
        assert_eq!(first.order_id, "FYN-1000");
        // FYN-1001 is the sample order
        assert_eq!(second.order_id, "FYN-1002");
    }

    #[test]
    fn test_place_order_missing_fields() {
        let mut orders = Collection::new(Order::COLLECTION);

        let cases = [
            OrderRequest {
                products: Vec::new(),
                ..order_request()
            },
            OrderRequest {
                total_amount: None,
                ..order_request()
            },
            OrderRequest {
                total_amount: Some(Number::from(0)),
                ..order_request()
            },
            OrderRequest {
                delivery_date: String::new(),
                ..order_request()
            },
            OrderRequest {
                phone_number: "  ".to_string(),
                ..order_request()
            },
        ];
        for request in cases {
            let err = place_order(&mut orders, CUSTOMER, request).unwrap_err();
            assert!(matches!(err, ShopError::MissingField(_)));
        }
        assert!(orders.is_empty());
    }

    #[test]
    fn test_place_order_bad_date() {
        let mut orders = Collection::new(Order::COLLECTION);
        let request = OrderRequest {
            delivery_date: "01/06/2024".to_string(),
            ..order_request()
        };
        let err = place_order(&mut orders, CUSTOMER, request).unwrap_err();
        assert!(matches!(err, ShopError::InvalidDate { .. }));
    }

    #[test]
    fn test_place_order_rejects_bad_email() {
        let mut orders = Collection::new(Order::COLLECTION);
        let err = place_order(&mut orders, "nobody", order_request()).unwrap_err();
        assert!(matches!(err, ShopError::Model(ModelError::Rejected { .. })));
        assert!(orders.is_empty());
    }

    #[test]
    fn test_register_class_once() {
        let mut students = Collection::new(Student::COLLECTION);
        let student = register_class(&mut students, CUSTOMER, "John Doe", "0758123456").unwrap();

        assert_eq!(student.course_fee, CLASS_COURSE_FEE);
        assert_eq!(student.payment_status, DEPOSIT_PENDING);
        assert!(!student.has_access);
        assert!(is_student(&students, CUSTOMER));

        let err = register_class(&mut students, CUSTOMER, "John Doe", "0758123456").unwrap_err();
        assert!(matches!(err, ShopError::AlreadyRegistered { .. }));
        assert_eq!(students.len(), 1);
    }

    #[test]
    fn test_register_class_missing_fields() {
        let mut students = Collection::new(Student::COLLECTION);
        let err = register_class(&mut students, CUSTOMER, " ", "0758123456").unwrap_err();
        assert!(matches!(err, ShopError::MissingField("name")));
        assert!(!is_student(&students, CUSTOMER));
    }

    #[test]
    fn test_customers_with_student_status() {
        let mut users = Collection::new(User::COLLECTION);
        for email in ["a@example.com", "b@example.com", "c@example.com"] {
            users.insert_one(document(json!({
                "email": email, "role": "customer", "password": "hash"
            })));
        }
        users.insert_one(document(json!({
            "email": "admin@fyncakes.com", "role": "admin", "password": "hash"
        })));
        let mut students = Collection::new(Student::COLLECTION);
        register_class(&mut students, "b@example.com", "Bea", "0700000000").unwrap();

        let customers = customers_with_student_status(&users, &students, Some(2)).unwrap();
        let flags: Vec<(&str, bool)> = customers
            .iter()
            .map(|c| (c.user.email.as_str(), c.is_student))
            .collect();
        assert_eq!(flags, vec![("c@example.com", false), ("b@example.com", true)]);

        let all = customers_with_student_status(&users, &students, None).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_dashboard_stats() {
        let mut db = Database::open(&crate::config::Config::default()).unwrap();
        register_class(db.collection_mut(Student::COLLECTION), CUSTOMER, "John", "0758").unwrap();

        let stats = dashboard_stats(&db).unwrap();
        assert_eq!(stats.total_sales, json!(45000));
        assert_eq!(stats.total_orders, 1);
        assert_eq!(stats.total_customers, 1);
        assert_eq!(stats.recent_customers.len(), 1);
        assert!(stats.recent_customers[0].is_student);

        let empty = Database::Memory(MockDatabase::new());
        let stats = dashboard_stats(&empty).unwrap();
        assert_eq!(stats.total_sales, json!(0));
        assert_eq!(stats.total_orders, 0);
        assert!(stats.recent_customers.is_empty());
    }
}
