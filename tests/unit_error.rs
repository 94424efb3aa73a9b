/// Unit tests for DiError and DiResult types

use ferrous_wire::{BoxError, DiError, DiResult};
use std::error::Error;

#[test]
fn test_error_display_unresolvable() {
    let error = DiError::Unresolvable("Desire(app::Database at root (Database))".to_string());
    let display_str = format!("{}", error);
    assert_eq!(
        display_str,
        "Unresolvable dependency: Desire(app::Database at root (Database))"
    );
    assert!(display_str.contains("app::Database"));
}

#[test]
fn test_error_display_ambiguous_binding() {
    let error = DiError::AmbiguousBinding {
        desire: "Desire(u32)".to_string(),
        first: "Bind(a)".to_string(),
        second: "Bind(b)".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "Ambiguous binding for Desire(u32): Bind(a) and Bind(b)"
    );
}

#[test]
fn test_error_display_cyclic() {
    let error = DiError::Cyclic(vec!["ServiceA", "ServiceB", "ServiceA"]);
    let display_str = format!("{}", error);
    assert_eq!(display_str, "Cyclic dependency: ServiceA -> ServiceB -> ServiceA");
}

#[test]
fn test_error_display_empty_cyclic_path() {
    let error = DiError::Cyclic(vec![]);
    assert_eq!(format!("{}", error), "Cyclic dependency: ");
}

#[test]
fn test_error_display_not_instantiable() {
    let error = DiError::NotInstantiable("app::Widget");
    assert_eq!(error.to_string(), "Type not instantiable: app::Widget");
}

#[test]
fn test_error_display_null_dependency() {
    let error = DiError::NullDependency("parameter 0 of Widget (Clock)".to_string());
    assert_eq!(
        error.to_string(),
        "Null dependency for required injection point parameter 0 of Widget (Clock)"
    );
}

#[test]
fn test_error_display_type_mismatch() {
    let error = DiError::TypeMismatch("std::string::String");
    assert_eq!(format!("{}", error), "Type mismatch for: std::string::String");
}

#[test]
fn test_error_display_depth_exceeded() {
    let error = DiError::DepthExceeded(100);
    assert_eq!(format!("{}", error), "Max depth 100 exceeded");
}

#[test]
fn test_construction_error_keeps_source() {
    let error = DiError::construction("member `port` of Server", BoxError::from("address in use"));
    assert_eq!(
        error.to_string(),
        "Construction failed in member `port` of Server: address in use"
    );

    let source = error.source().expect("construction errors carry their cause");
    assert_eq!(source.to_string(), "address in use");
}

#[test]
fn test_configuration_helper() {
    let error = DiError::configuration(format!("bad weight {}", 3));
    assert!(matches!(&error, DiError::Configuration(m) if m == "bad weight 3"));
    assert_eq!(error.to_string(), "Configuration error: bad weight 3");
}

#[test]
fn test_diresult_err() {
    let result: DiResult<String> = Err(DiError::NotInstantiable("TestService"));
    match result {
        Err(DiError::NotInstantiable(name)) => assert_eq!(name, "TestService"),
        _ => panic!("Expected NotInstantiable error"),
    }
}

#[test]
fn test_error_clone() {
    let error = DiError::construction("constructor of Widget", BoxError::from("boom"));
    let cloned = error.clone();
    assert_eq!(format!("{}", error), format!("{}", cloned));
}

#[test]
fn test_error_as_std_error() {
    let error = DiError::TypeMismatch("TestService");
    let _: &dyn std::error::Error = &error;
    assert!(error.source().is_none());
}
