/// Unit tests for TypeKey

use ferrous_wire::{key_of_type, TypeKey};
use std::any::TypeId;
use std::collections::HashMap;

trait Logger {}

#[test]
fn test_key_display_name() {
    let key = TypeKey::of::<String>();
    assert_eq!(key.display_name(), "alloc::string::String");
    assert_eq!(key.to_string(), "alloc::string::String");
}

#[test]
fn test_key_for_trait_object() {
    let key = TypeKey::of::<dyn Logger>();
    assert!(key.display_name().starts_with("dyn "));
    assert!(key.display_name().ends_with("Logger"));
    assert_eq!(key.short_name(), "Logger");
}

#[test]
fn test_key_short_name_keeps_generics() {
    let key = TypeKey::of::<Vec<String>>();
    assert_eq!(key.short_name(), "Vec<alloc::string::String>");
    assert_eq!(TypeKey::of::<u32>().short_name(), "u32");
}

#[test]
fn test_key_type_id() {
    assert_eq!(TypeKey::of::<u32>().type_id(), TypeId::of::<u32>());
    assert_eq!(key_of_type::<u32>(), TypeKey::of::<u32>());
}

#[test]
fn test_key_equality_ignores_name() {
    assert_eq!(TypeKey::of::<u32>(), TypeKey::of::<u32>());
    assert_ne!(TypeKey::of::<u32>(), TypeKey::of::<u64>());
    assert_ne!(TypeKey::of::<dyn Logger>(), TypeKey::of::<Box<dyn Logger>>());
}

#[test]
fn test_key_debug_format() {
    let debug_str = format!("{:?}", TypeKey::of::<String>());
    assert_eq!(debug_str, "TypeKey(alloc::string::String)");
}

#[test]
fn test_key_hash() {
    let mut map = HashMap::new();
    map.insert(TypeKey::of::<String>(), "test_value");
    assert_eq!(map.get(&TypeKey::of::<String>()), Some(&"test_value"));
    assert_eq!(map.get(&TypeKey::of::<u32>()), None);
}
