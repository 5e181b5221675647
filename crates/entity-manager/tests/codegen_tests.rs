//! Code generation tests.

#![cfg(feature = "memory")]

mod common;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use helios_entity_manager::codegen::CodeGenerator;
use helios_entity_manager::core::{Capability, LookupNormalizer};
use helios_entity_manager::types::codes;
use helios_entity_manager::{EntityManager, ManagerError, ManagerOptions, ManagerResult};

use common::*;

// ============================================================================
// Incremental
// ============================================================================

#[tokio::test]
async fn test_incremental_codes_continue_the_sequence() {
    let store = order_store();
    let manager = order_manager(&store, "ORD-");

    let mut generated = Vec::new();
    for id in 1..=3 {
        let mut order = Order::new(id).with_line("sku", 1);
        let result = manager.create(&mut order, &token()).await.unwrap();
        assert!(result.succeeded(), "create failed: {}", result);
        generated.push(order.code);
    }

    // Stored codes are normalized.
    assert_eq!(generated, vec!["ord-1", "ord-2", "ord-3"]);
}

#[tokio::test]
async fn test_incremental_continues_from_seeded_code() {
    let store = order_store();
    store.seed([Order::new(1).with_code("ord-41").created(at(0))]);
    let manager = order_manager(&store, "ORD-");

    let mut order = Order::new(2);
    manager.create(&mut order, &token()).await.unwrap();
    assert_eq!(order.code, "ord-42");
}

#[tokio::test]
async fn test_incremental_continues_non_ascii_prefix() {
    let store = order_store();
    let manager = order_manager(&store, "Ü-");

    let mut codes = Vec::new();
    for id in 1..=2 {
        let mut order = Order::new(id);
        let result = manager.create(&mut order, &token()).await.unwrap();
        assert!(result.succeeded(), "create failed: {}", result);
        codes.push(order.code);
    }
    assert_eq!(codes, vec!["ü-1", "ü-2"]);
}

/// Upper-cases codes and writes underscores as dashes.
#[derive(Debug)]
struct DashedUpper;

impl LookupNormalizer for DashedUpper {
    fn normalize_name(&self, name: &str) -> String {
        name.trim().to_uppercase()
    }

    fn normalize_code(&self, code: &str) -> String {
        code.trim().replace('_', "-").to_uppercase()
    }
}

#[tokio::test]
async fn test_incremental_follows_custom_normalizer() {
    let store = order_store();
    let manager = EntityManager::builder(store.clone())
        .with_options(ManagerOptions::new().with_code_prefix("ord_"))
        .with_clock(ManualClock::starting_at(epoch()))
        .with_normalizer(DashedUpper)
        .with_incremental_codes()
        .with_default_validators()
        .build()
        .unwrap();

    let mut first = Order::new(1);
    assert!(manager.create(&mut first, &token()).await.unwrap().succeeded());
    let mut second = Order::new(2);
    assert!(manager.create(&mut second, &token()).await.unwrap().succeeded());

    assert_eq!(first.code, "ORD-1");
    assert_eq!(second.code, "ORD-2");
}

#[tokio::test]
async fn test_explicit_code_is_not_replaced() {
    let store = order_store();
    let manager = order_manager(&store, "ORD-");

    let mut order = Order::new(1).with_code("Special-7");
    manager.create(&mut order, &token()).await.unwrap();
    assert_eq!(order.code, "special-7");
}

#[tokio::test]
async fn test_incremental_rejects_foreign_latest_code() {
    let store = order_store();
    store.seed([Order::new(1).with_code("inv-9").created(at(0))]);
    let manager = order_manager(&store, "ORD-");

    let mut order = Order::new(2);
    let err = manager.create(&mut order, &token()).await.unwrap_err();
    assert!(matches!(err, ManagerError::InvalidCodeSequence { .. }));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_incremental_requires_time_tracking() {
    let store = order_store().without_capability(Capability::TimeTracked);
    let manager = order_manager(&store, "ORD-");

    let mut order = Order::new(1);
    let err = manager.create(&mut order, &token()).await.unwrap_err();
    assert!(matches!(
        err,
        ManagerError::CapabilityNotSupported {
            capability: Capability::TimeTracked,
            ..
        }
    ));
}

#[tokio::test]
async fn test_generator_ignored_without_code_capability() {
    let store = order_store().without_capability(Capability::CodeBased);
    let manager = order_manager(&store, "ORD-");

    let mut order = Order::new(1);
    assert!(manager.create(&mut order, &token()).await.unwrap().succeeded());
    assert_eq!(order.code, "");
}

// ============================================================================
// URL-Friendly
// ============================================================================

#[tokio::test]
async fn test_url_friendly_codes_from_name() {
    let store = product_store();
    let manager = product_builder(&store, ManualClock::starting_at(epoch()))
        .with_url_friendly_codes()
        .build()
        .unwrap();

    let mut product = Product::new(1, "  Deluxe Coffee-Maker (2L)! ");
    let result = manager.create(&mut product, &token()).await.unwrap();

    assert!(result.succeeded(), "create failed: {}", result);
    assert_eq!(product.code, "deluxe-coffee-maker-2l");
}

#[tokio::test]
async fn test_url_friendly_separator_from_options() {
    let store = product_store();
    let manager = product_builder(&store, ManualClock::starting_at(epoch()))
        .with_options(ManagerOptions::new().with_slug_separator("_"))
        .with_url_friendly_codes()
        .build()
        .unwrap();

    let mut product = Product::new(1, "Desk Lamp");
    manager.create(&mut product, &token()).await.unwrap();
    assert_eq!(product.code, "desk_lamp");
}

#[tokio::test]
async fn test_url_friendly_duplicate_is_caught_by_validation() {
    let store = product_store();
    let manager = product_builder(&store, ManualClock::starting_at(epoch()))
        .with_url_friendly_codes()
        .build()
        .unwrap();

    let mut first = Product::new(1, "Desk Lamp");
    manager.create(&mut first, &token()).await.unwrap();

    // Different name, same slug.
    let mut second = Product::new(2, "Desk-Lamp");
    let result = manager.create(&mut second, &token()).await.unwrap();
    assert!(result.has_error(codes::DUPLICATE_CODE));
    assert!(!result.has_error(codes::DUPLICATE_NAME));
}

#[tokio::test]
async fn test_url_friendly_requires_a_name_capability() {
    let store = product_store().without_capability(Capability::NameBased);
    let manager = EntityManager::builder(store)
        .with_url_friendly_codes()
        .build()
        .unwrap();

    let mut product = Product::new(1, "Anything");
    let err = manager.create(&mut product, &token()).await.unwrap_err();
    assert!(matches!(
        err,
        ManagerError::CapabilityNotSupported {
            capability: Capability::NameBased,
            ..
        }
    ));
}

// ============================================================================
// Custom Generators
// ============================================================================

/// Codes products after their category and id.
struct CategoryCodes;

#[async_trait]
impl CodeGenerator<Product> for CategoryCodes {
    async fn generate(
        &self,
        _manager: &EntityManager<Product>,
        entity: &Product,
        _cancel: &CancellationToken,
    ) -> ManagerResult<String> {
        Ok(format!("{}/{}", entity.category, entity.id))
    }
}

#[tokio::test]
async fn test_custom_generator_runs_before_validation() {
    let store = product_store();
    let manager = product_builder(&store, ManualClock::starting_at(epoch()))
        .with_code_generator(CategoryCodes)
        .build()
        .unwrap();

    let mut product = Product::new(7, "Hammer").in_category("Tools");
    assert!(manager.create(&mut product, &token()).await.unwrap().succeeded());
    assert_eq!(product.code, "tools/7");
}
