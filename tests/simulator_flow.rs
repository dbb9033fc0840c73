use std::time::{Duration, Instant};

use nnexplorer::feedforward::DatasetKind;
use nnexplorer::{Simulator, SimulatorConfig, SimulatorEvent, TrainingState};

const TICK: Duration = Duration::from_millis(50);

fn config() -> SimulatorConfig {
    SimulatorConfig::default()
        .with_total_epochs(4)
        .with_epoch_interval_ms(50)
        .with_seed(7)
}

#[test]
fn repeated_start_keeps_one_driver() {
    let mut sim = Simulator::new(config()).unwrap();
    let t0 = Instant::now();
    assert!(sim.start(t0));
    assert!(!sim.start(t0));
    assert!(!sim.start(t0 + TICK / 2));

    // One epoch per due tick, no matter how many starts
    sim.poll(t0 + TICK).unwrap();
    assert_eq!(sim.epoch(), 1);
    sim.poll(t0 + TICK).unwrap();
    assert_eq!(sim.epoch(), 1);
    sim.poll(t0 + TICK * 2).unwrap();
    assert_eq!(sim.epoch(), 2);
}

#[test]
fn stop_freezes_progress() {
    let mut sim = Simulator::new(config()).unwrap();
    let t0 = Instant::now();
    sim.start(t0);
    sim.poll(t0 + TICK).unwrap();
    assert!(sim.stop());
    assert_eq!(sim.state(), TrainingState::Idle);

    for i in 2..10 {
        assert_eq!(sim.poll(t0 + TICK * i).unwrap(), None);
    }
    assert_eq!(sim.epoch(), 1);
    assert_eq!(sim.error_history().len(), 1);
    assert!(!sim.stop());

    // Resuming continues the same run
    let t1 = t0 + TICK * 10;
    sim.start(t1);
    sim.poll(t1 + TICK).unwrap();
    assert_eq!(sim.epoch(), 2);
}

#[test]
fn reaching_limit_completes_and_cancels_timer() {
    let mut sim = Simulator::new(config()).unwrap();
    let t0 = Instant::now();
    sim.start(t0);
    let mut now = t0;
    for _ in 0..4 {
        now += TICK;
        assert!(sim.poll(now).unwrap().is_some());
    }
    assert_eq!(sim.state(), TrainingState::Completed);
    assert!(!sim.timer().is_armed());
    assert_eq!(sim.poll(now + TICK * 10).unwrap(), None);
    assert_eq!(sim.epoch(), 4);

    let events = sim.drain_events();
    let epochs: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            SimulatorEvent::EpochCompleted(stats) => Some(stats.epoch),
            _ => None,
        })
        .collect();
    assert_eq!(epochs, vec![1, 2, 3, 4]);
    assert_eq!(
        events.last(),
        Some(&SimulatorEvent::StateChanged {
            from: TrainingState::Running,
            to: TrainingState::Completed
        })
    );
}

#[test]
fn epochs_use_every_point_once() {
    let mut sim = Simulator::new(config().with_dataset(DatasetKind::Circle, 30)).unwrap();
    sim.step().unwrap();
    sim.step().unwrap();
    assert_eq!(sim.dataset().len(), 30);
    assert_eq!(sim.error_history().len(), 2);
}

#[test]
fn huge_learning_rate_runs_to_completion() {
    let mut sim = Simulator::new(config().with_learning_rate(1e308).with_total_epochs(20)).unwrap();
    for _ in 0..20 {
        sim.step().unwrap();
    }
    assert_eq!(sim.error_history().len(), 20);
    assert_eq!(sim.state(), TrainingState::Completed);
}

#[test]
fn same_seed_same_run() {
    let run = || {
        let mut sim = Simulator::new(config().with_dataset(DatasetKind::Spiral, 40)).unwrap();
        for _ in 0..4 {
            sim.step().unwrap();
        }
        sim.error_history().to_vec()
    };
    assert_eq!(run(), run());
}

#[test]
fn config_file_drives_simulator() {
    let path = std::env::temp_dir().join(format!("nnexplorer-config-{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{ "geometry": [2, 5, 1], "training": { "total_epochs": 3, "seed": 11 } }"#,
    )
    .unwrap();
    let config = SimulatorConfig::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let mut sim = Simulator::new(config).unwrap();
    assert_eq!(sim.network().geometry(), &[2, 5, 1]);
    for _ in 0..3 {
        sim.step().unwrap();
    }
    assert_eq!(sim.state(), TrainingState::Completed);
}
