//! Stores, managers and a controllable clock.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use helios_entity_manager::backends::memory::MemoryStore;
use helios_entity_manager::core::{Capability, Clock};
use helios_entity_manager::types::SortDirective;
use helios_entity_manager::{EntityManager, EntityManagerBuilder, ManagerOptions};

use super::fixtures::{Order, Product, Tag};

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn starting_at(at: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(at),
        })
    }

    pub fn advance(&self, seconds: i64) {
        let mut now = self.now.lock();
        *now += Duration::seconds(seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// 2024-01-01T00:00:00Z.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// `epoch()` plus `seconds`.
pub fn at(seconds: i64) -> DateTime<Utc> {
    epoch() + Duration::seconds(seconds)
}

pub fn token() -> CancellationToken {
    CancellationToken::new()
}

pub fn cancelled_token() -> CancellationToken {
    let token = CancellationToken::new();
    token.cancel();
    token
}

/// Installs a test subscriber honoring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Stores
// ============================================================================

/// Product store: queryable, code-based, name-based, time-tracked, grouped.
pub fn product_store() -> MemoryStore<Product> {
    MemoryStore::new()
        .with_capability(Capability::CodeBased)
        .with_capability(Capability::NameBased)
        .with_capability(Capability::TimeTracked)
        .with_capability(Capability::Grouped)
        .with_default_sort(vec![SortDirective::ascending("name")])
}

/// Order store: queryable, code-based, time-tracked, with a details loader
/// that adds a single line.
pub fn order_store() -> MemoryStore<Order> {
    MemoryStore::new()
        .with_capability(Capability::CodeBased)
        .with_capability(Capability::TimeTracked)
        .with_default_sort(vec![SortDirective::descending("createdAt")])
        .with_details_loader(|_order: &Order| vec![super::fixtures::OrderLine::new("loaded", 1)])
}

/// Tag store: queryable, scoped-name-based.
pub fn tag_store() -> MemoryStore<Tag> {
    MemoryStore::new()
        .with_capability(Capability::ScopedNameBased)
        .with_default_sort(vec![SortDirective::ascending("name")])
}

// ============================================================================
// Managers
// ============================================================================

/// Builder over a clone of `store` with a manual clock and the default validators.
pub fn product_builder(
    store: &MemoryStore<Product>,
    clock: Arc<ManualClock>,
) -> EntityManagerBuilder<Product> {
    EntityManager::builder(store.clone())
        .with_clock(clock)
        .with_default_validators()
}

pub fn product_manager(store: &MemoryStore<Product>) -> EntityManager<Product> {
    product_builder(store, ManualClock::starting_at(epoch()))
        .build()
        .expect("product manager should build")
}

pub fn order_manager(store: &MemoryStore<Order>, prefix: &str) -> EntityManager<Order> {
    EntityManager::builder(store.clone())
        .with_options(ManagerOptions::new().with_code_prefix(prefix))
        .with_clock(ManualClock::starting_at(epoch()))
        .with_incremental_codes()
        .with_default_validators()
        .build()
        .expect("order manager should build")
}

pub fn tag_manager(store: &MemoryStore<Tag>) -> EntityManager<Tag> {
    EntityManager::builder(store.clone())
        .with_default_validators()
        .build()
        .expect("tag manager should build")
}
