//! Dataset generator.
//!
//! Produces the five entity tables in dependency order. Ids are assigned
//! by row position starting at 1; foreign keys are sampled uniformly,
//! with replacement, from the referenced table's id range, so every
//! reference resolves and popular parents (a user with many orders)
//! occur naturally.

pub mod aggregate;
pub mod fake;

pub use aggregate::{apply_order_totals, order_totals};
pub use fake::FakeData;

use crate::config::GenerateConfig;
use crate::error::GenerateError;
use crate::model::{
    round2, Category, Dataset, Order, OrderItem, OrderStatus, Product, Review, User,
};
use ahash::AHashSet;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

/// Price range shared by products and order line items
pub const PRICE_MIN: f64 = 5.0;
pub const PRICE_MAX: f64 = 500.0;
/// Upper bound of a product's stock quantity
pub const MAX_STOCK: u32 = 500;
/// Per-line quantity range
pub const QUANTITY_MIN: u32 = 1;
pub const QUANTITY_MAX: u32 = 5;
/// Review rating range
pub const RATING_MIN: u32 = 1;
pub const RATING_MAX: u32 = 5;
/// Trailing window for signup and review dates (two years)
pub const SIGNUP_WINDOW_DAYS: u64 = 730;
/// Trailing window for order dates
pub const ORDER_WINDOW_DAYS: u64 = 365;
/// Re-draws allowed per user before giving up on a unique email
pub const MAX_EMAIL_ATTEMPTS: usize = 100;

/// Main data generator
pub struct Generator {
    config: GenerateConfig,
    seed: u64,
    today: NaiveDate,
    fake: FakeData<StdRng>,
}

impl Generator {
    /// Create a generator for the given configuration.
    ///
    /// Uses the configured seed, or draws a fresh one. The date windows
    /// are anchored on the local current date unless overridden with
    /// [`Generator::with_today`].
    pub fn new(config: GenerateConfig) -> Result<Self, GenerateError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        Ok(Self {
            config,
            seed,
            today: chrono::Local::now().date_naive(),
            fake: FakeData::new(StdRng::seed_from_u64(seed)),
        })
    }

    /// Anchor all trailing date windows on `today`
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// The seed this run draws from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn config(&self) -> &GenerateConfig {
        &self.config
    }

    /// Generate all five tables.
    ///
    /// Users and products come first, then orders, then their items, then
    /// reviews; each later table samples its foreign keys from the sizes
    /// of the earlier ones. Order totals are filled in from the items.
    pub fn generate(&mut self) -> Result<Dataset, GenerateError> {
        let users = self.make_users(self.config.user_count)?;
        let products = self.make_products(self.config.product_count);
        let orders = self.make_orders(self.config.order_count, users.len());
        let order_items = self.make_order_items(
            &orders,
            products.len(),
            self.config.min_items_per_order,
            self.config.max_items_per_order,
        );
        let orders = apply_order_totals(orders, &order_items);
        let reviews = self.make_reviews(self.config.review_count, users.len(), products.len());

        debug!(
            seed = self.seed,
            users = users.len(),
            products = products.len(),
            orders = orders.len(),
            order_items = order_items.len(),
            reviews = reviews.len(),
            "generated dataset"
        );

        Ok(Dataset {
            users,
            products,
            orders,
            order_items,
            reviews,
        })
    }

    /// Generate `n` users with pairwise distinct emails
    pub fn make_users(&mut self, n: usize) -> Result<Vec<User>, GenerateError> {
        let mut seen: AHashSet<String> = AHashSet::with_capacity(n);
        let mut rows = Vec::with_capacity(n);

        for i in 1..=n as u32 {
            let email = self.unique_email(i, &mut seen)?;
            rows.push(User {
                user_id: i,
                email,
                name: self.fake.full_name(),
                signup_date: self.fake.date_within(self.today, SIGNUP_WINDOW_DAYS),
                country: self.fake.country(),
            });
        }
        Ok(rows)
    }

    fn unique_email(
        &mut self,
        user_id: u32,
        seen: &mut AHashSet<String>,
    ) -> Result<String, GenerateError> {
        for attempt in 0..MAX_EMAIL_ATTEMPTS {
            let email = self.fake.email();
            if seen.insert(email.clone()) {
                if attempt > 0 {
                    debug!(user_id, attempt, "re-drew colliding email");
                }
                return Ok(email);
            }
        }
        Err(GenerateError::EmailsExhausted {
            user_id,
            generated: seen.len(),
            attempts: MAX_EMAIL_ATTEMPTS,
        })
    }

    /// Generate `n` products
    pub fn make_products(&mut self, n: usize) -> Vec<Product> {
        (1..=n as u32)
            .map(|i| Product {
                product_id: i,
                name: self.fake.product_name(),
                category: self.fake.pick(&Category::ALL),
                price: self.fake.price(PRICE_MIN, PRICE_MAX),
                in_stock: self.fake.int_range(0..=MAX_STOCK),
            })
            .collect()
    }

    /// Generate `n` orders owned by users in `1..=user_count`.
    ///
    /// Totals are left at 0.0; see [`apply_order_totals`].
    pub fn make_orders(&mut self, n: usize, user_count: usize) -> Vec<Order> {
        (1..=n as u32)
            .map(|i| Order {
                order_id: i,
                user_id: self.fake.id_in(user_count),
                order_date: self.fake.date_within(self.today, ORDER_WINDOW_DAYS),
                status: self.fake.pick(&OrderStatus::ALL),
                total_amount: 0.0,
            })
            .collect()
    }

    /// Generate line items for every order.
    ///
    /// Each order gets a uniform number of items in `[min_items, max_items]`;
    /// item ids run sequentially across all orders.
    pub fn make_order_items(
        &mut self,
        orders: &[Order],
        product_count: usize,
        min_items: usize,
        max_items: usize,
    ) -> Vec<OrderItem> {
        let mut rows = Vec::with_capacity(orders.len() * (min_items + max_items) / 2);
        let mut item_id = 1u32;

        for order in orders {
            let num_items = self.fake.count_in(min_items, max_items);
            for _ in 0..num_items {
                let quantity = self.fake.int_range(QUANTITY_MIN..=QUANTITY_MAX) as u8;
                let unit_price = self.fake.price(PRICE_MIN, PRICE_MAX);
                rows.push(OrderItem {
                    item_id,
                    order_id: order.order_id,
                    product_id: self.fake.id_in(product_count),
                    quantity,
                    unit_price,
                    line_total: round2(quantity as f64 * unit_price),
                });
                item_id += 1;
            }
        }
        rows
    }

    /// Generate `n` reviews referencing existing users and products
    pub fn make_reviews(
        &mut self,
        n: usize,
        user_count: usize,
        product_count: usize,
    ) -> Vec<Review> {
        (1..=n as u32)
            .map(|i| Review {
                review_id: i,
                product_id: self.fake.id_in(product_count),
                user_id: self.fake.id_in(user_count),
                rating: self.fake.int_range(RATING_MIN..=RATING_MAX) as u8,
                review_text: self.fake.sentence(8..17),
                created_at: self.fake.date_within(self.today, SIGNUP_WINDOW_DAYS),
            })
            .collect()
    }
}
