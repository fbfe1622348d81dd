//! Row types for the five generated entities.
//!
//! Field order and names on each struct are the CSV header and the
//! destination table's column layout, so reordering a field changes
//! the on-disk format.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the five entity tables, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Users,
    Products,
    Orders,
    OrderItems,
    Reviews,
}

impl Table {
    /// All tables in the order they must be generated (and, by
    /// convention, loaded).
    pub const ALL: [Table; 5] = [
        Table::Users,
        Table::Products,
        Table::Orders,
        Table::OrderItems,
        Table::Reviews,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Users => User::TABLE,
            Table::Products => Product::TABLE,
            Table::Orders => Order::TABLE,
            Table::OrderItems => OrderItem::TABLE,
            Table::Reviews => Review::TABLE,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.csv", self.name())
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Table::Users => User::COLUMNS,
            Table::Products => Product::COLUMNS,
            Table::Orders => Order::COLUMNS,
            Table::OrderItems => OrderItem::COLUMNS,
            Table::Reviews => Review::COLUMNS,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Table {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Table::ALL
            .into_iter()
            .find(|t| t.name() == lower || t.file_name() == lower)
            .ok_or_else(|| {
                format!(
                    "Unknown table: {}. Valid tables: users, products, orders, order_items, reviews",
                    s
                )
            })
    }
}

/// A generated row type backed by one flat file.
pub trait Entity: Serialize + DeserializeOwned {
    /// Table name, also the file stem.
    const TABLE: &'static str;
    /// Header row, in serialization order.
    const COLUMNS: &'static [&'static str];

    /// The sequential row id.
    fn id(&self) -> u32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Clothing,
    Electronics,
    Home,
    Books,
    Toys,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Clothing,
        Category::Electronics,
        Category::Home,
        Category::Books,
        Category::Toys,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Clothing => write!(f, "clothing"),
            Category::Electronics => write!(f, "electronics"),
            Category::Home => write!(f, "home"),
            Category::Books => write!(f, "books"),
            Category::Toys => write!(f, "toys"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Completed,
    Pending,
    Cancelled,
    Shipped,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Completed,
        OrderStatus::Pending,
        OrderStatus::Cancelled,
        OrderStatus::Shipped,
    ];
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Completed => write!(f, "completed"),
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
            OrderStatus::Shipped => write!(f, "shipped"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: u32,
    pub email: String,
    pub name: String,
    pub signup_date: NaiveDate,
    pub country: String,
}

impl Entity for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] =
        &["user_id", "email", "name", "signup_date", "country"];

    fn id(&self) -> u32 {
        self.user_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: u32,
    pub name: String,
    pub category: Category,
    pub price: f64,
    pub in_stock: u32,
}

impl Entity for Product {
    const TABLE: &'static str = "products";
    const COLUMNS: &'static [&'static str] =
        &["product_id", "name", "category", "price", "in_stock"];

    fn id(&self) -> u32 {
        self.product_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: u32,
    pub user_id: u32,
    pub order_date: NaiveDate,
    pub status: OrderStatus,
    /// Derived from the order's items; 0.0 until totals are applied.
    pub total_amount: f64,
}

impl Entity for Order {
    const TABLE: &'static str = "orders";
    const COLUMNS: &'static [&'static str] =
        &["order_id", "user_id", "order_date", "status", "total_amount"];

    fn id(&self) -> u32 {
        self.order_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub item_id: u32,
    pub order_id: u32,
    pub product_id: u32,
    pub quantity: u8,
    pub unit_price: f64,
    pub line_total: f64,
}

impl Entity for OrderItem {
    const TABLE: &'static str = "order_items";
    const COLUMNS: &'static [&'static str] = &[
        "item_id",
        "order_id",
        "product_id",
        "quantity",
        "unit_price",
        "line_total",
    ];

    fn id(&self) -> u32 {
        self.item_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub review_id: u32,
    pub product_id: u32,
    pub user_id: u32,
    pub rating: u8,
    pub review_text: String,
    pub created_at: NaiveDate,
}

impl Entity for Review {
    const TABLE: &'static str = "reviews";
    const COLUMNS: &'static [&'static str] = &[
        "review_id",
        "product_id",
        "user_id",
        "rating",
        "review_text",
        "created_at",
    ];

    fn id(&self) -> u32 {
        self.review_id
    }
}

/// The full output of one generation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub users: Vec<User>,
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub order_items: Vec<OrderItem>,
    pub reviews: Vec<Review>,
}

impl Dataset {
    /// Number of rows generated for a table
    pub fn row_count(&self, table: Table) -> usize {
        match table {
            Table::Users => self.users.len(),
            Table::Products => self.products.len(),
            Table::Orders => self.orders.len(),
            Table::OrderItems => self.order_items.len(),
            Table::Reviews => self.reviews.len(),
        }
    }

    /// Total rows across all five tables
    pub fn total_rows(&self) -> usize {
        Table::ALL.iter().map(|t| self.row_count(*t)).sum()
    }
}

/// Round to two decimal places, the precision of every money field.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
