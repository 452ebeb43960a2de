//! Cart persistence across process restarts.
//!
//! Each "restart" is a fresh `CartStore` hydrated from the same cart file.

#![allow(clippy::unwrap_used)]

use std::fs;

use rust_decimal::Decimal;
use shopfront::cart::{CartStorage, CartStore, FileCartStorage};
use shopfront_core::ProductId;
use shopfront_integration_tests::{catalog, temp_cart_path};

#[test]
fn test_cart_survives_restart_in_order() {
    let path = temp_cart_path();
    let products = catalog();

    {
        let mut cart = CartStore::load(FileCartStorage::new(&path));
        cart.add(&products[2]);
        cart.add(&products[0]);
        cart.add(&products[2]);
        cart.update_quantity(ProductId::new(1), 4);
    }

    let cart = CartStore::load(FileCartStorage::new(&path));
    let lines: Vec<(i32, u32)> = cart
        .items()
        .iter()
        .map(|item| (item.id.as_i32(), item.quantity))
        .collect();
    assert_eq!(lines, vec![(3, 2), (1, 4)]);

    // 2 * 55.99 + 4 * 10.00
    assert_eq!(cart.total_price(), Decimal::new(15198, 2));
    assert_eq!(cart.total_item_count(), 6);

    fs::remove_dir_all(path.parent().unwrap()).unwrap();
}

#[test]
fn test_cleared_cart_starts_empty_after_restart() {
    let path = temp_cart_path();
    {
        let mut cart = CartStore::load(FileCartStorage::new(&path));
        cart.add(&catalog()[0]);
        cart.clear();
    }

    assert!(!path.exists());
    assert!(CartStore::load(FileCartStorage::new(&path)).is_empty());

    fs::remove_dir_all(path.parent().unwrap()).unwrap();
}

#[test]
fn test_corrupt_cart_file_starts_empty_and_is_replaced() {
    let path = temp_cart_path();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "[{\"id\": 1, \"title\": ").unwrap();

    let mut cart = CartStore::load(FileCartStorage::new(&path));
    assert!(cart.is_empty());

    cart.add(&catalog()[1]);
    let persisted = FileCartStorage::new(&path).read_cart().unwrap().unwrap();
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].id, ProductId::new(2));

    fs::remove_dir_all(path.parent().unwrap()).unwrap();
}

#[test]
fn test_cart_file_is_json_array_of_lines() {
    let path = temp_cart_path();
    let mut cart = CartStore::load(FileCartStorage::new(&path));
    cart.add(&catalog()[0]);

    let raw = fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let line = &json.as_array().unwrap()[0];
    assert_eq!(line["id"], 1);
    assert_eq!(line["title"], "Backpack");
    assert_eq!(line["quantity"], 1);

    fs::remove_dir_all(path.parent().unwrap()).unwrap();
}
