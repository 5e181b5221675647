//! Fixture entities.
//!
//! - [`Product`] - coded, named, grouped by category, time-tracked, stamped
//! - [`Order`] - coded, time-tracked, with order lines as details
//! - [`Tag`] - named within a project scope, no concurrency stamp

use chrono::{DateTime, Utc};

use helios_entity_manager::types::{
    Coded, ConcurrencyStamped, Entity, Grouped, Named, Scoped, SortValue, TimeTracked,
};

// ============================================================================
// Product
// ============================================================================

/// A catalog product.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: u32,
    pub code: String,
    pub name: String,
    pub normalized_name: String,
    pub category: String,
    pub price: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub last_modified_at: Option<DateTime<Utc>>,
    pub stamp: String,
    pub supplier: Option<String>,
}

impl Product {
    pub fn new(id: u32, name: &str) -> Self {
        Self {
            id,
            code: String::new(),
            name: name.to_string(),
            normalized_name: String::new(),
            category: "general".to_string(),
            price: 0,
            created_at: None,
            last_modified_at: None,
            stamp: String::new(),
            supplier: None,
        }
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.code = code.to_string();
        self
    }

    pub fn in_category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn priced(mut self, price: i64) -> Self {
        self.price = price;
        self
    }

    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Fills the normalized fields the way the manager would, for seeding.
    pub fn normalized(mut self) -> Self {
        self.normalized_name = self.name.trim().to_lowercase();
        self.code = self.code.trim().to_lowercase();
        self
    }
}

impl Coded for Product {
    fn code(&self) -> &str {
        &self.code
    }

    fn set_code(&mut self, code: String) {
        self.code = code;
    }
}

impl Named for Product {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn normalized_name(&self) -> &str {
        &self.normalized_name
    }

    fn set_normalized_name(&mut self, normalized: String) {
        self.normalized_name = normalized;
    }
}

impl Grouped for Product {
    fn group_id(&self) -> &str {
        &self.category
    }
}

impl TimeTracked for Product {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = Some(at);
    }

    fn last_modified_at(&self) -> Option<DateTime<Utc>> {
        self.last_modified_at
    }

    fn set_last_modified_at(&mut self, at: DateTime<Utc>) {
        self.last_modified_at = Some(at);
    }
}

impl ConcurrencyStamped for Product {
    fn concurrency_stamp(&self) -> &str {
        &self.stamp
    }

    fn set_concurrency_stamp(&mut self, stamp: String) {
        self.stamp = stamp;
    }
}

impl Entity for Product {
    type Id = u32;
    type Detail = ();

    fn id(&self) -> &u32 {
        &self.id
    }

    fn as_coded(&self) -> Option<&dyn Coded> {
        Some(self)
    }

    fn as_coded_mut(&mut self) -> Option<&mut dyn Coded> {
        Some(self)
    }

    fn as_named(&self) -> Option<&dyn Named> {
        Some(self)
    }

    fn as_named_mut(&mut self) -> Option<&mut dyn Named> {
        Some(self)
    }

    fn as_grouped(&self) -> Option<&dyn Grouped> {
        Some(self)
    }

    fn as_time_tracked(&self) -> Option<&dyn TimeTracked> {
        Some(self)
    }

    fn as_time_tracked_mut(&mut self) -> Option<&mut dyn TimeTracked> {
        Some(self)
    }

    fn as_stamped(&self) -> Option<&dyn ConcurrencyStamped> {
        Some(self)
    }

    fn as_stamped_mut(&mut self) -> Option<&mut dyn ConcurrencyStamped> {
        Some(self)
    }

    fn sort_properties() -> &'static [&'static str] {
        &["name", "code", "price", "createdAt"]
    }

    fn sort_value(&self, property: &str) -> Option<SortValue> {
        match property {
            "name" => Some(self.normalized_name.as_str().into()),
            "code" => Some(self.code.as_str().into()),
            "price" => Some(self.price.into()),
            "createdAt" => self.created_at.map(SortValue::from),
            _ => None,
        }
    }
}

// ============================================================================
// Order
// ============================================================================

/// One line of an [`Order`].
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub sku: String,
    pub quantity: i64,
}

impl OrderLine {
    pub fn new(sku: &str, quantity: i64) -> Self {
        Self {
            sku: sku.to_string(),
            quantity,
        }
    }
}

/// A purchase order whose lines are stored apart from the header.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: u32,
    pub code: String,
    pub created_at: Option<DateTime<Utc>>,
    pub last_modified_at: Option<DateTime<Utc>>,
    pub lines: Vec<OrderLine>,
}

impl Order {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            code: String::new(),
            created_at: None,
            last_modified_at: None,
            lines: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.code = code.to_string();
        self
    }

    pub fn with_line(mut self, sku: &str, quantity: i64) -> Self {
        self.lines.push(OrderLine::new(sku, quantity));
        self
    }

    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }
}

impl Coded for Order {
    fn code(&self) -> &str {
        &self.code
    }

    fn set_code(&mut self, code: String) {
        self.code = code;
    }
}

impl TimeTracked for Order {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = Some(at);
    }

    fn last_modified_at(&self) -> Option<DateTime<Utc>> {
        self.last_modified_at
    }

    fn set_last_modified_at(&mut self, at: DateTime<Utc>) {
        self.last_modified_at = Some(at);
    }
}

impl Entity for Order {
    type Id = u32;
    type Detail = OrderLine;

    fn id(&self) -> &u32 {
        &self.id
    }

    fn as_coded(&self) -> Option<&dyn Coded> {
        Some(self)
    }

    fn as_coded_mut(&mut self) -> Option<&mut dyn Coded> {
        Some(self)
    }

    fn as_time_tracked(&self) -> Option<&dyn TimeTracked> {
        Some(self)
    }

    fn as_time_tracked_mut(&mut self) -> Option<&mut dyn TimeTracked> {
        Some(self)
    }

    fn details(&self) -> &[OrderLine] {
        &self.lines
    }

    fn details_mut(&mut self) -> Option<&mut Vec<OrderLine>> {
        Some(&mut self.lines)
    }

    fn sort_properties() -> &'static [&'static str] {
        &["code", "createdAt"]
    }

    fn sort_value(&self, property: &str) -> Option<SortValue> {
        match property {
            "code" => Some(self.code.as_str().into()),
            "createdAt" => self.created_at.map(SortValue::from),
            _ => None,
        }
    }
}

// ============================================================================
// Tag
// ============================================================================

/// A label whose name is unique within its project.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub id: String,
    pub project: String,
    pub name: String,
    pub normalized_name: String,
}

impl Tag {
    pub fn new(id: &str, project: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            project: project.to_string(),
            name: name.to_string(),
            normalized_name: String::new(),
        }
    }
}

impl Named for Tag {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn normalized_name(&self) -> &str {
        &self.normalized_name
    }

    fn set_normalized_name(&mut self, normalized: String) {
        self.normalized_name = normalized;
    }
}

impl Scoped for Tag {
    fn scope_id(&self) -> &str {
        &self.project
    }
}

impl Entity for Tag {
    type Id = String;
    type Detail = ();

    fn id(&self) -> &String {
        &self.id
    }

    fn as_named(&self) -> Option<&dyn Named> {
        Some(self)
    }

    fn as_named_mut(&mut self) -> Option<&mut dyn Named> {
        Some(self)
    }

    fn as_scoped(&self) -> Option<&dyn Scoped> {
        Some(self)
    }

    fn sort_properties() -> &'static [&'static str] {
        &["name"]
    }

    fn sort_value(&self, property: &str) -> Option<SortValue> {
        match property {
            "name" => Some(self.normalized_name.as_str().into()),
            _ => None,
        }
    }
}
