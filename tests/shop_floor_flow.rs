// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! End-to-end flow: sign in, save records through the gates, let the admin
//! session lapse, get refused.

use std::sync::Arc;
use std::time::Duration;

use shopfloor::{
    DataChange, Department, GatedCollection, GuardConfig, InMemoryDataAccess, Machine, Part,
    ServiceError, SessionGuard, ValidationResult, ValidatorRegistry,
};

fn machine(number: &str) -> Machine {
    Machine {
        id: None,
        machine_number: number.to_string(),
        machine_set_id: "456".to_string(),
        owner: Some(Department::Gear),
        status_message: "ok".to_string(),
    }
}

#[tokio::test(start_paused = true)]
async fn test_admin_window_gates_writes() {
    let guard = Arc::new(SessionGuard::from_current(GuardConfig::new("admin", "Hob7")).unwrap());
    let registry = Arc::new(ValidatorRegistry::with_shop_floor_defaults());
    let machines: GatedCollection<Machine, _, _> = GatedCollection::new(
        Arc::new(InMemoryDataAccess::<Machine>::new()),
        Arc::clone(&guard),
        Arc::clone(&registry),
    );
    let mut feed = machines.data_changed();

    assert_eq!(machines.create(machine("123")).await, Err(ServiceError::NotAuthorized));

    assert!(guard.authenticate("ADMIN", "hob7").is_successful());
    let saved = machines.create(machine("123")).await.unwrap();
    assert_eq!(saved.id, Some(1));
    assert_eq!(feed.recv().await.unwrap(), DataChange::Created(1));

    assert_eq!(
        machines.create(machine("12")).await,
        Err(ServiceError::Rejected("Machine ID must be exactly 3 digits".to_string()))
    );

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert!(!guard.is_authorized());
    assert_eq!(machines.delete(1).await, Err(ServiceError::NotAuthorized));

    // Reads never needed the session.
    assert_eq!(machines.get_all().await.unwrap().len(), 1);

    guard.dispose().await;
}

#[tokio::test(start_paused = true)]
async fn test_second_login_extends_window() {
    let guard = SessionGuard::from_current(GuardConfig::new("admin", "Hob7")).unwrap();

    guard.authenticate("admin", "hob7");
    tokio::time::sleep(Duration::from_secs(25)).await;
    guard.authenticate("admin", "hob7");

    tokio::time::sleep(Duration::from_secs(25)).await;
    assert!(guard.is_authorized(), "still inside the second window");

    tokio::time::sleep(Duration::from_secs(6)).await;
    assert!(!guard.is_authorized(), "30s after the second login");

    guard.dispose().await;
    guard.dispose().await;
    assert!(!guard.is_authorized());
}

#[tokio::test(start_paused = true)]
async fn test_custom_window_from_config() {
    let config = shopfloor::Config {
        session_window_secs: 5,
        ..Default::default()
    };
    let guard = SessionGuard::from_current(config.guard_config()).unwrap();

    assert!(guard.authenticate("admin", "admin").is_successful());
    tokio::time::sleep(Duration::from_secs(4)).await;
    assert!(guard.is_authorized());
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!guard.is_authorized());
}

#[test]
fn test_part_scenario() {
    let registry = ValidatorRegistry::new();
    assert!(registry.validate::<Part>(None).is_err());

    registry.register_validator::<Part>(shopfloor::validation::PartValidator);

    let mut part = Part {
        id: None,
        part_number: "5120".to_string(),
        part_stamp: "3".to_string(),
        part_tooth_count: "abc".to_string(),
    };
    let result = registry.validate(Some(&part)).unwrap();
    assert_eq!(result, ValidationResult::invalid("Tooth count must be a number"));

    part.part_tooth_count = "41".to_string();
    let result = registry.validate(Some(&part)).unwrap();
    assert!(result.is_valid);
    assert_eq!(result.error_message, "");
}

#[test]
fn test_machine_examples() {
    let registry = ValidatorRegistry::with_shop_floor_defaults();

    let result = registry.validate::<Machine>(None).unwrap();
    assert_eq!(result.error_message, "A valid machine item is required");

    let result = registry.validate(Some(&machine(""))).unwrap();
    assert_eq!(result.error_message, "Machine ID is required");

    let result = registry.validate(Some(&machine("12"))).unwrap();
    assert_eq!(result.error_message, "Machine ID must be exactly 3 digits");

    assert!(registry.validate(Some(&machine("123"))).unwrap().is_valid);
}
