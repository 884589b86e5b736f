//! # Integration Tests
//!
//! End-to-end runs against the mock simulator (no server required):
//! - rig assembly and teardown
//! - tick barrier, snapshots and compositing
//! - presenters and the quit signal

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_presets_pass_validation() {
        for name in config_loader::presets::names() {
            let blueprint = config_loader::ConfigLoader::load_preset(name).unwrap();
            config_loader::ConfigLoader::validate(&blueprint).unwrap();
        }
    }

    #[test]
    fn test_preset_toml_round_trip() {
        let surround = config_loader::ConfigLoader::load_preset("surround").unwrap();
        let text = config_loader::ConfigLoader::to_toml(&surround).unwrap();
        let back = config_loader::ConfigLoader::load_from_str(
            &text,
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();
        assert_eq!(back.view.mode, surround.view.mode);
        assert_eq!(back.sensors.len(), 4);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use actor_factory::{camera_tint, ActorFactoryError, MockConfig, MockSimulator, RigFactory, ShutdownCoordinator};
    use contracts::{
        CompositeFrame, PresenterConfig, PresenterType, RigBlueprint, SensorKind, ShutdownState,
        SimulatorLink, SyncMode,
    };
    use presenter::{PresenterHub, QuitSignal};
    use sync_engine::{FrameSynchronizer, SyncError};

    async fn connected(config: MockConfig) -> Arc<MockSimulator> {
        let mut sim = MockSimulator::with_config(config);
        sim.connect("localhost", 2000, Duration::from_secs(1))
            .await
            .unwrap();
        Arc::new(sim)
    }

    /// Surround preset with 8x6 cameras
    fn small_surround() -> RigBlueprint {
        let mut bp = config_loader::ConfigLoader::load_preset("surround").unwrap();
        for sensor in &mut bp.sensors {
            if let Some(camera) = sensor.camera.as_mut() {
                camera.width_px = 8;
                camera.height_px = 6;
            }
        }
        bp.presenters.clear();
        bp
    }

    fn synchronous_telemetry() -> RigBlueprint {
        let mut bp = config_loader::ConfigLoader::load_preset("telemetry").unwrap();
        bp.sync.mode = SyncMode::Synchronous;
        bp.presenters.clear();
        bp
    }

    /// MockSimulator -> RigFactory -> FrameSynchronizer -> Compositor -> teardown
    #[tokio::test]
    async fn test_e2e_surround_grid_pipeline() {
        let sim = connected(MockConfig::default()).await;
        let bp = small_surround();
        config_loader::ConfigLoader::validate(&bp).unwrap();

        let mut coordinator = ShutdownCoordinator::new(Arc::clone(&sim));
        let factory = RigFactory::new(Arc::clone(&sim));
        let rig = factory.assemble(&bp, &mut coordinator).await.unwrap();
        assert_eq!(rig.sensors, 4);
        assert!(sim.settings().synchronous_mode);
        assert!(sim.traffic_manager_sync());

        let mut synchronizer = FrameSynchronizer::from_config(
            Arc::clone(&sim),
            coordinator.registry().slot_set(),
            &bp.sync,
        );

        let mut last_tick = 0;
        for _ in 0..5 {
            let tick = synchronizer.advance().await.unwrap().unwrap();
            assert!(tick > last_tick);
            last_tick = tick;

            let snapshot = synchronizer.snapshot();
            assert!(snapshot.complete, "missing {:?}", snapshot.missing);
            assert_eq!(snapshot.tick, Some(tick));
            for name in ["front", "right", "rear", "left"] {
                assert_eq!(snapshot.get(name).unwrap().frame, tick);
            }

            let frame = compositor::compose(&bp.view.mode, &snapshot)
                .unwrap()
                .unwrap();
            let CompositeFrame::Image(image) = frame else {
                panic!("grid view must produce an image");
            };
            assert_eq!((image.width, image.height), (16, 12));
            assert!(image.is_well_formed());
            let shade = (tick % 256) as u8;
            for (name, ox, oy) in [("front", 0, 0), ("right", 8, 0), ("left", 0, 6), ("rear", 8, 6)] {
                for y in oy..oy + 6 {
                    for x in ox..ox + 8 {
                        let idx = (y * 16 + x) * 3;
                        assert_eq!(
                            image.data[idx..idx + 3],
                            [shade, camera_tint(name), shade],
                            "{name} quadrant at ({x}, {y})"
                        );
                    }
                }
            }
        }

        let state = coordinator.run().await;
        assert_eq!(state, ShutdownState::SettingsRestored);
        assert_eq!(coordinator.failures(), 0);
        assert!(sim.alive_actors().is_empty());
        assert!(!sim.settings().synchronous_mode);
        assert!(!sim.traffic_manager_sync());
    }

    #[tokio::test]
    async fn test_e2e_telemetry_dashboard() {
        let sim = connected(MockConfig::default()).await;
        let bp = synchronous_telemetry();

        let mut coordinator = ShutdownCoordinator::new(Arc::clone(&sim));
        RigFactory::new(Arc::clone(&sim))
            .assemble(&bp, &mut coordinator)
            .await
            .unwrap();
        assert!(sim.spectator().is_some());

        let mut synchronizer = FrameSynchronizer::from_config(
            Arc::clone(&sim),
            coordinator.registry().slot_set(),
            &bp.sync,
        );
        let tick = synchronizer.advance().await.unwrap().unwrap();
        let snapshot = synchronizer.snapshot();
        assert!(snapshot.complete);

        let Some(CompositeFrame::Dashboard(dashboard)) =
            compositor::compose(&bp.view.mode, &snapshot).unwrap()
        else {
            panic!("dashboard view must produce a dashboard");
        };
        assert_eq!(dashboard.tick, Some(tick));
        assert_eq!(
            (dashboard.width, dashboard.height),
            (compositor::DASHBOARD_WIDTH, compositor::DASHBOARD_HEIGHT)
        );
        let latitude = 37.421999 + tick as f64 * 1e-6;
        assert_eq!(
            dashboard.field("Latitude").unwrap().text,
            format!("Latitude  : {:.6}", latitude)
        );
        assert!(dashboard.field("Compass").is_some());

        coordinator.run().await;
        assert!(sim.alive_actors().is_empty());
    }

    #[tokio::test]
    async fn test_e2e_spawn_failure_restores_world() {
        let sim = connected(MockConfig {
            fail_vehicle_spawn: true,
            ..Default::default()
        })
        .await;
        let bp = small_surround();

        let mut coordinator = ShutdownCoordinator::new(Arc::clone(&sim));
        let err = RigFactory::new(Arc::clone(&sim))
            .assemble(&bp, &mut coordinator)
            .await
            .unwrap_err();

        assert!(matches!(err, ActorFactoryError::SpawnFailed { .. }));
        assert_eq!(coordinator.state(), ShutdownState::SettingsRestored);
        assert_eq!(sim.vehicle_count(), 0);
        assert!(!sim.settings().synchronous_mode);
    }

    #[tokio::test]
    async fn test_e2e_attach_failure_destroys_partial_rig() {
        let sim = connected(MockConfig {
            fail_sensor_kinds: vec![SensorKind::Imu],
            ..Default::default()
        })
        .await;
        let bp = synchronous_telemetry();

        let mut coordinator = ShutdownCoordinator::new(Arc::clone(&sim));
        let err = RigFactory::new(Arc::clone(&sim))
            .assemble(&bp, &mut coordinator)
            .await
            .unwrap_err();

        assert!(matches!(err, ActorFactoryError::AttachFailed { .. }));
        assert!(sim.alive_actors().is_empty());
        // vehicle + gnss
        assert_eq!(sim.destroyed_actors().len(), 2);
        assert_eq!(coordinator.state(), ShutdownState::SettingsRestored);
    }

    #[tokio::test]
    async fn test_e2e_hung_tick_times_out_and_tears_down() {
        let sim = connected(MockConfig {
            hang_tick: true,
            ..Default::default()
        })
        .await;
        let mut bp = small_surround();
        bp.sync.tick_timeout_ms = 100;

        let mut coordinator = ShutdownCoordinator::new(Arc::clone(&sim));
        RigFactory::new(Arc::clone(&sim))
            .assemble(&bp, &mut coordinator)
            .await
            .unwrap();

        let mut synchronizer = FrameSynchronizer::from_config(
            Arc::clone(&sim),
            coordinator.registry().slot_set(),
            &bp.sync,
        );
        let err = synchronizer.advance().await.unwrap_err();
        assert!(matches!(err, SyncError::TickTimeout { .. }));

        assert_eq!(coordinator.run().await, ShutdownState::SettingsRestored);
        assert!(sim.alive_actors().is_empty());
        assert!(!sim.settings().synchronous_mode);
    }

    #[tokio::test]
    async fn test_e2e_silent_sensor_fails_the_barrier() {
        let sim = connected(MockConfig {
            silent_sensors: vec!["rear".to_string()],
            ..Default::default()
        })
        .await;
        let mut bp = small_surround();
        bp.sync.tick_timeout_ms = 100;

        let mut coordinator = ShutdownCoordinator::new(Arc::clone(&sim));
        RigFactory::new(Arc::clone(&sim))
            .assemble(&bp, &mut coordinator)
            .await
            .unwrap();

        let mut synchronizer = FrameSynchronizer::from_config(
            Arc::clone(&sim),
            coordinator.registry().slot_set(),
            &bp.sync,
        );
        match synchronizer.advance().await {
            Err(SyncError::DeliveryTimeout { missing, .. }) => {
                assert_eq!(missing, vec!["rear".to_string()]);
            }
            other => panic!("expected delivery timeout, got {other:?}"),
        }

        coordinator.run().await;
    }

    #[tokio::test]
    async fn test_e2e_unsynchronized_snapshot_fills_in() {
        let sim = connected(MockConfig::default()).await;
        let mut bp = synchronous_telemetry();
        bp.sync.mode = SyncMode::Unsynchronized;
        bp.sync.cycle_interval_ms = 10;
        for sensor in &mut bp.sensors {
            sensor.sample_interval_sec = 0.01;
        }

        let mut coordinator = ShutdownCoordinator::new(Arc::clone(&sim));
        RigFactory::new(Arc::clone(&sim))
            .assemble(&bp, &mut coordinator)
            .await
            .unwrap();
        assert!(!sim.settings().synchronous_mode);

        let mut synchronizer = FrameSynchronizer::from_config(
            Arc::clone(&sim),
            coordinator.registry().slot_set(),
            &bp.sync,
        );

        let mut complete = false;
        for _ in 0..200 {
            assert_eq!(synchronizer.advance().await.unwrap(), None);
            if synchronizer.snapshot().complete {
                complete = true;
                break;
            }
        }
        assert!(complete, "free-running sensors never delivered");

        coordinator.run().await;
        assert!(sim.alive_actors().is_empty());
    }

    /// Compositor -> PresenterHub -> FilePresenter, stopped by the presenter's frame limit
    #[tokio::test]
    async fn test_e2e_file_presenter_raises_quit() {
        let dir = tempfile::tempdir().unwrap();
        let sim = connected(MockConfig::default()).await;
        let mut bp = small_surround();
        bp.presenters.push(PresenterConfig {
            name: "disk".to_string(),
            presenter_type: PresenterType::File,
            queue_capacity: 16,
            params: [
                ("base_path".to_string(), dir.path().display().to_string()),
                ("max_frames".to_string(), "3".to_string()),
            ]
            .into_iter()
            .collect(),
        });

        let quit = QuitSignal::new();
        let mut hub = PresenterHub::from_configs(&bp.presenters, &quit).unwrap();

        let mut coordinator = ShutdownCoordinator::new(Arc::clone(&sim));
        RigFactory::new(Arc::clone(&sim))
            .assemble(&bp, &mut coordinator)
            .await
            .unwrap();
        let mut synchronizer = FrameSynchronizer::from_config(
            Arc::clone(&sim),
            coordinator.registry().slot_set(),
            &bp.sync,
        );

        let mut cycles = 0;
        while !quit.is_raised() && cycles < 200 {
            synchronizer.advance().await.unwrap();
            if let Some(frame) =
                compositor::compose(&bp.view.mode, &synchronizer.snapshot()).unwrap()
            {
                hub.present(frame);
            }
            cycles += 1;
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(quit.is_raised());

        hub.shutdown().await;
        coordinator.run().await;

        let run_dir = std::fs::read_dir(dir.path())
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();
        let pngs = std::fs::read_dir(&run_dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "png"))
            .count();
        assert!(pngs >= 3, "expected at least 3 frames, found {pngs}");
    }
}
