//! Consistency checks for a generated dataset.
//!
//! This module checks, from the flat files alone:
//! - Sequential ids starting at 1 in every table
//! - Email uniqueness across users
//! - Foreign keys resolving to an existing parent row
//! - Line totals (`quantity * unit_price`) and order totals (sum of lines)
//! - Value ranges for prices, stock, quantities and ratings

use crate::generator::{
    order_totals, MAX_STOCK, PRICE_MAX, PRICE_MIN, QUANTITY_MAX, QUANTITY_MIN, RATING_MAX,
    RATING_MIN,
};
use crate::model::{round2, Dataset, Entity, Table};
use ahash::AHashSet;
use serde::Serialize;
use std::fmt;

/// Maximum number of issues to collect before stopping
const MAX_ISSUES: usize = 1000;

/// Half a cent; money values closer than this are equal
const MONEY_TOLERANCE: f64 = 0.005;

/// Issue severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
        }
    }
}

/// Row an issue was found on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub table: Table,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_id: Option<u32>,
}

/// A validation issue found in the dataset
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub code: &'static str,
    pub severity: Severity,
    pub message: String,
    pub location: Location,
}

impl ValidationIssue {
    pub fn error(code: &'static str, table: Table, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: Severity::Error,
            message: message.into(),
            location: Location {
                table,
                row_id: None,
            },
        }
    }

    pub fn warning(code: &'static str, table: Table, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, table, message)
        }
    }

    pub fn at_row(mut self, row_id: u32) -> Self {
        self.location.row_id = Some(row_id);
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] table={}",
            self.severity, self.code, self.location.table
        )?;
        if let Some(id) = self.location.row_id {
            write!(f, " id={}", id)?;
        }
        write!(f, ": {}", self.message)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Failed(usize),
}

impl CheckStatus {
    fn from_count(count: usize) -> Self {
        if count == 0 {
            CheckStatus::Ok
        } else {
            CheckStatus::Failed(count)
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckStatus::Ok => write!(f, "OK"),
            CheckStatus::Failed(n) => write!(f, "{} issues", n),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckResults {
    pub sequential_ids: CheckStatus,
    pub unique_emails: CheckStatus,
    pub fk_integrity: CheckStatus,
    pub line_totals: CheckStatus,
    pub order_totals: CheckStatus,
    pub value_ranges: CheckStatus,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub errors: usize,
    pub warnings: usize,
    pub tables_scanned: usize,
    pub rows_scanned: usize,
}

#[derive(Debug, Serialize)]
pub struct ValidationSummary {
    pub issues: Vec<ValidationIssue>,
    pub summary: SummaryStats,
    pub checks: CheckResults,
    /// Set when collection stopped at the issue limit
    pub truncated: bool,
}

impl ValidationSummary {
    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.summary.warnings > 0
    }
}

/// Dataset validator
pub struct Validator<'a> {
    data: &'a Dataset,
    issues: Vec<ValidationIssue>,
    truncated: bool,
}

impl<'a> Validator<'a> {
    pub fn new(data: &'a Dataset) -> Self {
        Self {
            data,
            issues: Vec::new(),
            truncated: false,
        }
    }

    /// Run every check and summarize the findings
    pub fn validate(mut self) -> ValidationSummary {
        let data = self.data;

        let sequential_ids = self.run_check(|v| {
            v.check_sequential(Table::Users, &data.users);
            v.check_sequential(Table::Products, &data.products);
            v.check_sequential(Table::Orders, &data.orders);
            v.check_sequential(Table::OrderItems, &data.order_items);
            v.check_sequential(Table::Reviews, &data.reviews);
        });
        let unique_emails = self.run_check(Self::check_emails);
        let fk_integrity = self.run_check(Self::check_foreign_keys);
        let line_totals = self.run_check(Self::check_line_totals);
        let order_totals = self.run_check(Self::check_order_totals);
        let value_ranges = self.run_check(Self::check_ranges);

        let errors = self
            .issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count();
        let warnings = self.issues.len() - errors;

        ValidationSummary {
            summary: SummaryStats {
                errors,
                warnings,
                tables_scanned: Table::ALL.len(),
                rows_scanned: data.total_rows(),
            },
            checks: CheckResults {
                sequential_ids,
                unique_emails,
                fk_integrity,
                line_totals,
                order_totals,
                value_ranges,
            },
            issues: self.issues,
            truncated: self.truncated,
        }
    }

    /// Run one check, reporting how many issues it added
    fn run_check(&mut self, check: impl FnOnce(&mut Self)) -> CheckStatus {
        let before = self.issues.len();
        check(self);
        CheckStatus::from_count(self.issues.len() - before)
    }

    fn add_issue(&mut self, issue: ValidationIssue) {
        if self.issues.len() >= MAX_ISSUES {
            self.truncated = true;
            return;
        }
        self.issues.push(issue);
    }

    fn check_sequential<T: Entity>(&mut self, table: Table, rows: &[T]) {
        for (i, row) in rows.iter().enumerate() {
            let expected = i as u64 + 1;
            if u64::from(row.id()) != expected {
                self.add_issue(
                    ValidationIssue::error(
                        "NON_SEQUENTIAL_ID",
                        table,
                        format!("row {} has id {}, expected {}", i + 1, row.id(), expected),
                    )
                    .at_row(row.id()),
                );
            }
        }
    }

    fn check_emails(&mut self) {
        let data = self.data;
        let mut seen = AHashSet::with_capacity(data.users.len());
        for user in &data.users {
            if !seen.insert(user.email.as_str()) {
                self.add_issue(
                    ValidationIssue::error(
                        "DUPLICATE_EMAIL",
                        Table::Users,
                        format!("email {} is already used by another user", user.email),
                    )
                    .at_row(user.user_id),
                );
            }
        }
    }

    fn check_foreign_keys(&mut self) {
        let data = self.data;
        let users = ids(&data.users);
        let products = ids(&data.products);
        let orders = ids(&data.orders);

        for order in &data.orders {
            self.check_reference(
                Table::Orders,
                order.order_id,
                Table::Users,
                &users,
                order.user_id,
            );
        }
        for item in &data.order_items {
            self.check_reference(
                Table::OrderItems,
                item.item_id,
                Table::Orders,
                &orders,
                item.order_id,
            );
            self.check_reference(
                Table::OrderItems,
                item.item_id,
                Table::Products,
                &products,
                item.product_id,
            );
        }
        for review in &data.reviews {
            self.check_reference(
                Table::Reviews,
                review.review_id,
                Table::Products,
                &products,
                review.product_id,
            );
            self.check_reference(
                Table::Reviews,
                review.review_id,
                Table::Users,
                &users,
                review.user_id,
            );
        }
    }

    fn check_reference(
        &mut self,
        table: Table,
        row_id: u32,
        parent: Table,
        parent_ids: &AHashSet<u32>,
        value: u32,
    ) {
        if !parent_ids.contains(&value) {
            self.add_issue(
                ValidationIssue::error(
                    "FK_MISSING_PARENT",
                    table,
                    format!("references {} id {}, which does not exist", parent, value),
                )
                .at_row(row_id),
            );
        }
    }

    fn check_line_totals(&mut self) {
        let data = self.data;
        for item in &data.order_items {
            let expected = round2(f64::from(item.quantity) * item.unit_price);
            if !money_eq(item.line_total, expected) {
                self.add_issue(
                    ValidationIssue::error(
                        "LINE_TOTAL_MISMATCH",
                        Table::OrderItems,
                        format!(
                            "line_total {} != quantity {} * unit_price {} ({})",
                            item.line_total, item.quantity, item.unit_price, expected
                        ),
                    )
                    .at_row(item.item_id),
                );
            }
        }
    }

    fn check_order_totals(&mut self) {
        let data = self.data;
        let totals = order_totals(&data.order_items);
        for order in &data.orders {
            match totals.get(&order.order_id) {
                Some(sum) => {
                    let expected = round2(*sum);
                    if !money_eq(order.total_amount, expected) {
                        self.add_issue(
                            ValidationIssue::error(
                                "ORDER_TOTAL_MISMATCH",
                                Table::Orders,
                                format!(
                                    "total_amount {} != sum of line totals {}",
                                    order.total_amount, expected
                                ),
                            )
                            .at_row(order.order_id),
                        );
                    }
                }
                None if !money_eq(order.total_amount, 0.0) => {
                    self.add_issue(
                        ValidationIssue::error(
                            "ORDER_TOTAL_MISMATCH",
                            Table::Orders,
                            format!(
                                "order has no items but total_amount is {}",
                                order.total_amount
                            ),
                        )
                        .at_row(order.order_id),
                    );
                }
                None => {
                    self.add_issue(
                        ValidationIssue::warning(
                            "EMPTY_ORDER",
                            Table::Orders,
                            "order has no line items",
                        )
                        .at_row(order.order_id),
                    );
                }
            }
        }
    }

    fn check_ranges(&mut self) {
        let data = self.data;
        for product in &data.products {
            if !(PRICE_MIN..=PRICE_MAX).contains(&product.price) {
                self.out_of_range(Table::Products, product.product_id, "price", product.price);
            }
            if product.in_stock > MAX_STOCK {
                self.out_of_range(
                    Table::Products,
                    product.product_id,
                    "in_stock",
                    product.in_stock,
                );
            }
        }
        for item in &data.order_items {
            if !(QUANTITY_MIN..=QUANTITY_MAX).contains(&u32::from(item.quantity)) {
                self.out_of_range(Table::OrderItems, item.item_id, "quantity", item.quantity);
            }
            if !(PRICE_MIN..=PRICE_MAX).contains(&item.unit_price) {
                self.out_of_range(Table::OrderItems, item.item_id, "unit_price", item.unit_price);
            }
        }
        for review in &data.reviews {
            if !(RATING_MIN..=RATING_MAX).contains(&u32::from(review.rating)) {
                self.out_of_range(Table::Reviews, review.review_id, "rating", review.rating);
            }
        }
    }

    fn out_of_range(&mut self, table: Table, row_id: u32, column: &str, value: impl fmt::Display) {
        self.add_issue(
            ValidationIssue::error(
                "VALUE_OUT_OF_RANGE",
                table,
                format!("{} {} is out of range", column, value),
            )
            .at_row(row_id),
        );
    }
}

/// Validate a dataset with every check enabled
pub fn validate_dataset(data: &Dataset) -> ValidationSummary {
    Validator::new(data).validate()
}

fn ids<T: Entity>(rows: &[T]) -> AHashSet<u32> {
    rows.iter().map(Entity::id).collect()
}

fn money_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < MONEY_TOLERANCE
}
