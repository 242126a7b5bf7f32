// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the coordinator and entity projections.

mod common;

use std::sync::Arc;
use std::time::Duration;

use ailink_lib::config::IntegrationOptions;
use ailink_lib::coordinator::Coordinator;
use ailink_lib::entity::{
    Capability, Entity, EntityCommand, EntityState, SwitchStyle, TimerStyle, build_entities,
};
use ailink_lib::error::Error;
use ailink_lib::event::CoordinatorEvent;
use ailink_lib::mapping::FieldMapping;
use ailink_lib::protocol::VendorApi;
use ailink_lib::state::OverlayField;
use ailink_lib::types::{FieldValue, OperationMode, Platform, SwitchKind};
use common::{MockApi, StatusReply, device, status};
use serde_json::json;
use tokio::sync::broadcast;

fn coordinator_with(api: MockApi, mapping: FieldMapping) -> Arc<Coordinator<MockApi>> {
    Arc::new(Coordinator::new(
        api,
        Arc::new(mapping),
        IntegrationOptions::default(),
    ))
}

/// One heater `d1` reporting 45 °C, target 48 °C, powered on.
fn single_heater() -> MockApi {
    let api = MockApi::new();
    api.set_devices(vec![device("d1", "19", "Kitchen Heater")]);
    api.set_status(
        "d1",
        StatusReply::Ok(status(json!({
            "waterTemp": "45",
            "setTemp": "48",
            "powerStatus": "1",
            "cruiseStatus": "0",
        }))),
    );
    api
}

fn entity(
    coordinator: &Arc<Coordinator<MockApi>>,
    capability: Capability,
) -> Entity<MockApi> {
    Entity::new(Arc::clone(coordinator), "d1", capability)
}

fn drain(rx: &mut broadcast::Receiver<CoordinatorEvent>) -> Vec<CoordinatorEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn target(state: &EntityState) -> Option<f64> {
    match state {
        EntityState::WaterHeater(heater) => heater.target_temperature,
        other => panic!("not a water heater state: {other:?}"),
    }
}

// ============================================================================
// Setup and refresh
// ============================================================================

mod refresh {
    use super::*;

    #[tokio::test]
    async fn setup_authenticates_and_fills_store() {
        let coordinator = coordinator_with(single_heater(), FieldMapping::new());
        coordinator.setup().await.unwrap();

        assert!(coordinator.api().is_authenticated());
        assert_eq!(coordinator.device_ids(), ["d1"]);
        let snapshot = coordinator.snapshot("d1").unwrap();
        assert!(snapshot.has_telemetry());
        assert_eq!(snapshot.field("waterTemp"), Some(FieldValue::Int(45)));
        assert_eq!(snapshot.product_name(), Some("Kitchen Heater"));
    }

    #[tokio::test]
    async fn rejected_credentials_are_not_ready() {
        let api = single_heater();
        api.reject_auth(true);
        let coordinator = coordinator_with(api, FieldMapping::new());

        let err = coordinator.setup().await.unwrap_err();
        assert!(matches!(err, Error::NotReady(_)));
        assert!(coordinator.device_ids().is_empty());
    }

    #[tokio::test]
    async fn invalid_options_are_rejected() {
        let options = IntegrationOptions {
            update_interval: 1,
            ..IntegrationOptions::default()
        };
        let coordinator = Coordinator::new(single_heater(), Arc::new(FieldMapping::new()), options);
        assert!(matches!(coordinator.setup().await, Err(Error::Value(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_status_degrades_to_identity_record() {
        let api = MockApi::new();
        api.set_devices(vec![device("a", "19", "A"), device("b", "19", "B")]);
        api.set_status("a", StatusReply::Hang);
        api.set_status("b", StatusReply::Ok(status(json!({"waterTemp": "40"}))));
        let coordinator = coordinator_with(api, FieldMapping::new());

        coordinator.setup().await.unwrap();

        assert_eq!(coordinator.device_ids(), ["a", "b"]);
        let a = coordinator.snapshot("a").unwrap();
        assert!(!a.has_telemetry());
        assert_eq!(a.product_name(), Some("A"));
        assert!(coordinator.snapshot("b").unwrap().has_telemetry());
    }

    #[tokio::test]
    async fn missing_status_keeps_identity_record() {
        let api = MockApi::new();
        api.set_devices(vec![device("a", "19", "A")]);
        api.set_status("a", StatusReply::Missing);
        let coordinator = coordinator_with(api, FieldMapping::new());

        coordinator.setup().await.unwrap();
        let heater = Entity::new(Arc::clone(&coordinator), "a", Capability::WaterHeater);
        match heater.state() {
            EntityState::WaterHeater(state) => {
                assert_eq!(state.current_temperature, None);
                assert_eq!(state.target_temperature, None);
                assert_eq!(state.operation_mode, OperationMode::Off);
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_device_list_keeps_last_store() {
        let coordinator = coordinator_with(single_heater(), FieldMapping::new());
        coordinator.setup().await.unwrap();
        let mut rx = coordinator.subscribe();

        coordinator.api().set_devices(Vec::new());
        let err = coordinator.refresh().await.unwrap_err();

        assert!(matches!(err, Error::UpdateFailed(_)));
        assert_eq!(coordinator.device_ids(), ["d1"]);
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [CoordinatorEvent::RefreshFailed { .. }]
        ));
    }

    #[tokio::test]
    async fn refresh_reauthenticates_after_unload() {
        let coordinator = coordinator_with(single_heater(), FieldMapping::new());
        coordinator.setup().await.unwrap();

        coordinator.unload().await;
        assert!(coordinator.api().is_closed());

        coordinator.refresh().await.unwrap();
        assert!(coordinator.api().is_authenticated());
    }

    #[tokio::test]
    async fn removed_device_becomes_unavailable() {
        let api = single_heater();
        api.set_devices(vec![device("d1", "19", "A"), device("d2", "19", "B")]);
        let coordinator = coordinator_with(api, FieldMapping::new());
        coordinator.setup().await.unwrap();

        let gone = Entity::new(Arc::clone(&coordinator), "d2", Capability::WaterHeater);
        assert!(gone.is_available());
        let mut rx = coordinator.subscribe();

        coordinator.api().set_devices(vec![device("d1", "19", "A")]);
        coordinator.refresh().await.unwrap();

        assert!(!gone.is_available());
        assert_eq!(gone.state(), EntityState::Unavailable);
        assert!(gone.device_info().is_none());
        let events = drain(&mut rx);
        assert!(events.contains(&CoordinatorEvent::device_removed("d2")));
        assert!(events.contains(&CoordinatorEvent::Refreshed { device_count: 1 }));
    }

    #[tokio::test(start_paused = true)]
    async fn run_refreshes_until_shutdown() {
        let coordinator = coordinator_with(single_heater(), FieldMapping::new());
        coordinator.setup().await.unwrap();
        assert_eq!(coordinator.api().status_requests(), 1);

        let (stop, shutdown) = tokio::sync::watch::channel(false);
        tokio::join!(coordinator.run(shutdown), async {
            // Ticks at 60 s and 120 s.
            tokio::time::sleep(Duration::from_secs(125)).await;
            stop.send(true).unwrap();
        });

        assert_eq!(coordinator.api().status_requests(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn run_with_zero_interval_returns_without_refreshing() {
        let options: IntegrationOptions =
            serde_json::from_value(json!({"update_interval": 0})).unwrap();
        let coordinator = Arc::new(Coordinator::new(
            single_heater(),
            Arc::new(FieldMapping::new()),
            options,
        ));

        let (_stop, shutdown) = tokio::sync::watch::channel(false);
        tokio::time::timeout(Duration::from_secs(1), coordinator.run(shutdown))
            .await
            .unwrap();

        assert_eq!(coordinator.api().status_requests(), 0);
    }
}

// ============================================================================
// Entity building
// ============================================================================

mod building {
    use super::*;

    #[tokio::test]
    async fn only_water_heater_category_gets_entities() {
        let api = MockApi::new();
        api.set_devices(vec![
            device("heater", "19", "Heater"),
            device("purifier", "7", "Purifier"),
            device("softener", "12", "Softener"),
        ]);
        let coordinator = coordinator_with(api, FieldMapping::new());
        coordinator.setup().await.unwrap();

        let entities = build_entities(&coordinator);
        assert!(!entities.is_empty());
        assert!(entities.iter().all(|e| e.device_id() == "heater"));
        assert_eq!(
            entities
                .iter()
                .filter(|e| e.platform() == Platform::WaterHeater)
                .count(),
            1
        );
        // The store still keeps every device.
        assert_eq!(coordinator.device_ids().len(), 3);
    }

    #[tokio::test]
    async fn unmapped_field_becomes_one_raw_sensor() {
        let mapping = FieldMapping::from_json_str(
            r#"{
                "entity": {"sensor": {"waterTemp": {"name": "Water Temperature", "group": "status"}}},
                "unit_of_measurement": {"waterTemp": "°C"}
            }"#,
        )
        .unwrap();
        let api = MockApi::new();
        api.set_devices(vec![device("d1", "19", "Heater")]);
        api.set_status(
            "d1",
            StatusReply::Ok(status(json!({"waterTemp": "45", "gasFlow": "3.5"}))),
        );
        let coordinator = coordinator_with(api, mapping);
        let mut rx = coordinator.subscribe();

        coordinator.setup().await.unwrap();
        coordinator.refresh().await.unwrap();

        let discovered = drain(&mut rx)
            .into_iter()
            .filter(|e| matches!(e, CoordinatorEvent::FieldDiscovered { .. }))
            .count();
        assert_eq!(discovered, 1);

        let entities = build_entities(&coordinator);
        let raw: Vec<_> = entities
            .iter()
            .filter(|e| matches!(e.capability(), Capability::RawSensor(_)))
            .collect();
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].unique_id(), "ailink_aosmith_gasFlow_d1");
        assert_eq!(raw[0].group(), "dynamic");
        assert_eq!(raw[0].icon(), Some("mdi:information-outline"));
        assert_eq!(raw[0].name(), "Heater gasFlow");
        assert_eq!(raw[0].state(), EntityState::Sensor(Some(FieldValue::Float(3.5))));

        let mapped = entities
            .iter()
            .find(|e| matches!(e.capability(), Capability::MappedSensor(_)))
            .unwrap();
        assert_eq!(mapped.name(), "Water Temperature");
        assert_eq!(mapped.unit(), Some("°C"));
        assert_eq!(mapped.group(), "status");
        assert_eq!(mapped.state(), EntityState::Sensor(Some(FieldValue::Int(45))));
    }

    #[tokio::test]
    async fn field_mapped_later_is_projected_once() {
        let api = MockApi::new();
        api.set_devices(vec![device("d1", "19", "Heater")]);
        api.set_status("d1", StatusReply::Ok(status(json!({"gasFlow": "3.5"}))));
        let coordinator = coordinator_with(api, FieldMapping::new());
        coordinator.setup().await.unwrap();
        assert_eq!(coordinator.dynamic_fields_for("d1"), ["gasFlow"]);

        let mapping =
            FieldMapping::from_json_str(r#"{"entity": {"sensor": {"gasFlow": "Gas flow"}}}"#)
                .unwrap();
        coordinator.set_mapping(Arc::new(mapping));
        coordinator.refresh().await.unwrap();

        let entities = build_entities(&coordinator);
        let gas_flow: Vec<_> = entities
            .iter()
            .filter(|e| e.unique_id() == "ailink_aosmith_gasFlow_d1")
            .collect();
        assert_eq!(gas_flow.len(), 1);
        assert_eq!(
            gas_flow[0].capability(),
            &Capability::MappedSensor("gasFlow".into())
        );
        assert_eq!(gas_flow[0].name(), "Gas flow");
        assert!(coordinator.dynamic_fields_for("d1").is_empty());

        let ids: std::collections::HashSet<_> = entities.iter().map(Entity::unique_id).collect();
        assert_eq!(ids.len(), entities.len());
    }

    #[tokio::test]
    async fn raw_sensors_can_be_disabled() {
        let api = MockApi::new();
        api.set_devices(vec![device("d1", "19", "Heater")]);
        api.set_status("d1", StatusReply::Ok(status(json!({"gasFlow": "3"}))));
        let options = IntegrationOptions {
            enable_raw_sensors: false,
            ..IntegrationOptions::default()
        };
        let coordinator = Arc::new(Coordinator::new(api, Arc::new(FieldMapping::new()), options));
        coordinator.setup().await.unwrap();

        assert!(coordinator.dynamic_fields().is_empty());
        assert!(
            build_entities(&coordinator)
                .iter()
                .all(|e| !matches!(e.capability(), Capability::RawSensor(_)))
        );
    }

    #[tokio::test]
    async fn device_info_and_names() {
        let coordinator = coordinator_with(single_heater(), FieldMapping::new());
        coordinator.setup().await.unwrap();

        let heater = entity(&coordinator, Capability::WaterHeater);
        assert_eq!(heater.name(), "Kitchen Heater");
        assert_eq!(heater.unique_id(), "ailink_aosmith_water_heater_d1");
        assert_eq!(
            heater.operation_list(),
            Some(vec!["off".to_string(), "heat".to_string()])
        );

        let info = heater.device_info().unwrap();
        assert_eq!(info.manufacturer, "Ai-Link A.O. Smith");
        assert_eq!(info.model, "JSQ31-VJS");

        let timer = entity(&coordinator, Capability::CruiseTimer(TimerStyle::Number));
        assert_eq!(timer.name(), "Cruise Timer");
        assert_eq!(timer.unit(), Some("min"));
    }
}

// ============================================================================
// Optimistic writes
// ============================================================================

mod writes {
    use super::*;

    #[tokio::test]
    async fn overlay_is_visible_before_command_resolves() {
        let coordinator = coordinator_with(single_heater(), FieldMapping::new());
        coordinator.setup().await.unwrap();
        let heater = entity(&coordinator, Capability::WaterHeater);
        let gate = coordinator.api().gate_commands();

        let (result, ()) = tokio::join!(heater.set_temperature(55.0), async {
            while coordinator.api().commands().is_empty() {
                tokio::task::yield_now().await;
            }
            assert_eq!(target(&heater.state()), Some(55.0));
            gate.notify_one();
        });

        result.unwrap();
        assert_eq!(target(&heater.state()), Some(55.0));

        let sent = coordinator.api().commands();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].device_id, "d1");
        assert_eq!(sent[0].service, "setTemp");
        assert_eq!(sent[0].input_data["setTemp"], "55");
    }

    #[tokio::test]
    async fn failed_command_rolls_back() {
        let coordinator = coordinator_with(single_heater(), FieldMapping::new());
        coordinator.setup().await.unwrap();
        coordinator.api().fail_commands(true);
        let heater = entity(&coordinator, Capability::WaterHeater);
        let mut rx = coordinator.subscribe();

        let err = heater.set_temperature(50.0).await.unwrap_err();

        match err {
            Error::CommandFailed {
                device_id, service, ..
            } => {
                assert_eq!(device_id, "d1");
                assert_eq!(service, "setTemp");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(target(&heater.state()), Some(48.0));
        assert!(coordinator.snapshot("d1").unwrap().overlay().is_empty());
        assert_eq!(
            drain(&mut rx),
            [
                CoordinatorEvent::state_written("d1", OverlayField::TargetTemperature),
                CoordinatorEvent::rolled_back("d1", OverlayField::TargetTemperature),
            ]
        );
    }

    #[tokio::test]
    async fn rollback_keeps_a_newer_write() {
        let coordinator = coordinator_with(single_heater(), FieldMapping::new());
        coordinator.setup().await.unwrap();
        let heater = entity(&coordinator, Capability::WaterHeater);
        let api = coordinator.api();
        let gate = api.gate_commands();
        let first_done = std::cell::Cell::new(false);

        let (first, second, ()) = tokio::join!(
            async {
                let result = heater.set_temperature(50.0).await;
                first_done.set(true);
                result
            },
            async {
                while api.commands().is_empty() {
                    tokio::task::yield_now().await;
                }
                heater.set_temperature(55.0).await
            },
            async {
                while api.commands().len() < 2 {
                    tokio::task::yield_now().await;
                }
                // Commands are released in the order they were sent.
                api.fail_commands(true);
                gate.notify_one();
                while !first_done.get() {
                    tokio::task::yield_now().await;
                }
                assert_eq!(target(&heater.state()), Some(55.0));
                api.fail_commands(false);
                gate.notify_one();
            }
        );

        assert!(matches!(first, Err(Error::CommandFailed { .. })));
        second.unwrap();
        assert_eq!(target(&heater.state()), Some(55.0));
    }

    #[tokio::test]
    async fn next_refresh_supersedes_overlay() {
        let coordinator = coordinator_with(single_heater(), FieldMapping::new());
        coordinator.setup().await.unwrap();
        let heater = entity(&coordinator, Capability::WaterHeater);

        heater.set_temperature(60.0).await.unwrap();
        assert_eq!(target(&heater.state()), Some(60.0));

        coordinator.refresh().await.unwrap();
        assert_eq!(target(&heater.state()), Some(48.0));
    }

    #[tokio::test]
    async fn invalid_values_are_not_sent() {
        let coordinator = coordinator_with(single_heater(), FieldMapping::new());
        coordinator.setup().await.unwrap();
        let heater = entity(&coordinator, Capability::WaterHeater);
        let timer = entity(&coordinator, Capability::CruiseTimer(TimerStyle::Select));

        assert!(matches!(
            heater.set_temperature(80.0).await,
            Err(Error::Value(_))
        ));
        assert!(matches!(
            timer.apply(EntityCommand::SelectOption("45".into())).await,
            Err(Error::Value(_))
        ));
        assert!(coordinator.api().commands().is_empty());
        assert!(coordinator.snapshot("d1").unwrap().overlay().is_empty());
    }

    #[tokio::test]
    async fn unsupported_operation() {
        let coordinator = coordinator_with(single_heater(), FieldMapping::new());
        coordinator.setup().await.unwrap();
        let sensor = entity(&coordinator, Capability::RawSensor("gasFlow".into()));

        let err = sensor.turn_on().await.unwrap_err();
        assert!(matches!(err, Error::Unsupported { operation: "turn_on", .. }));
    }

    #[tokio::test]
    async fn valve_write_is_shared_with_switch() {
        let coordinator = coordinator_with(single_heater(), FieldMapping::new());
        coordinator.setup().await.unwrap();
        let switch = entity(
            &coordinator,
            Capability::Switch {
                kind: SwitchKind::Cruise,
                style: SwitchStyle::Switch,
            },
        );
        let valve = entity(
            &coordinator,
            Capability::Switch {
                kind: SwitchKind::Cruise,
                style: SwitchStyle::Valve,
            },
        );
        let heater = entity(&coordinator, Capability::WaterHeater);
        assert_eq!(switch.state(), EntityState::Switch(Some(false)));

        valve.turn_on().await.unwrap();

        assert_eq!(switch.state(), EntityState::Switch(Some(true)));
        assert_eq!(valve.state(), EntityState::Valve(Some(true)));
        match heater.state() {
            EntityState::WaterHeater(state) => assert_eq!(state.status, "heat (cruise)"),
            other => panic!("unexpected state {other:?}"),
        }
        let sent = coordinator.api().commands();
        assert_eq!(sent[0].service, "WaterCruiseOnOff");
        assert_eq!(sent[0].input_data["cruiseStatus"], "1");
    }

    #[tokio::test]
    async fn operation_mode_by_mapped_label() {
        let mapping = FieldMapping::from_json_str(
            r#"{"entity": {"water_heater": {"operation_mode": {"0": "Standby", "1": "Heating"}}}}"#,
        )
        .unwrap();
        let coordinator = coordinator_with(single_heater(), mapping);
        coordinator.setup().await.unwrap();
        let heater = entity(&coordinator, Capability::WaterHeater);

        heater
            .apply(EntityCommand::SetOperationMode("Standby".into()))
            .await
            .unwrap();

        match heater.state() {
            EntityState::WaterHeater(state) => {
                assert_eq!(state.operation_mode, OperationMode::Off);
                assert_eq!(state.status, "Standby");
            }
            other => panic!("unexpected state {other:?}"),
        }
        assert_eq!(coordinator.api().commands()[0].input_data["powerStatus"], "0");
        assert!(matches!(
            heater
                .apply(EntityCommand::SetOperationMode("Turbo".into()))
                .await,
            Err(Error::Value(_))
        ));
    }

    #[tokio::test]
    async fn fan_percentage_sets_cruise_timer() {
        let coordinator = coordinator_with(single_heater(), FieldMapping::new());
        coordinator.setup().await.unwrap();
        let fan = entity(&coordinator, Capability::CruiseTimer(TimerStyle::Fan));
        let number = entity(&coordinator, Capability::CruiseTimer(TimerStyle::Number));

        fan.apply(EntityCommand::SetPercentage(80)).await.unwrap();

        assert_eq!(number.state(), EntityState::Number(Some(30.0)));
        let sent = coordinator.api().commands();
        assert_eq!(sent[0].service, "WaterCruiseTimer");
        assert_eq!(sent[0].input_data["WaterCruiseTimer"], "30");
    }
}
