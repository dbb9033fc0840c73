//! Epoch driver of the training playground.
//!
//! `Simulator` owns the network, the dataset and the run state. It never spawns threads
//! or timers of its own: the caller passes the current `Instant` to `Simulator::start` and
//! `Simulator::poll`, and the simulator runs at most one epoch per poll once the epoch
//! interval has passed. A rendering layer polls `Simulator::drain_events` or reads
//! `Simulator::snapshot` to redraw.
//!
//! ```
//! # use std::time::{Duration, Instant};
//! # use nnexplorer::{SimulatorConfig, Simulator, TrainingState};
//! let config = SimulatorConfig::default().with_total_epochs(2).with_seed(1);
//! let mut sim = Simulator::new(config).unwrap();
//! let t0 = Instant::now();
//! sim.start(t0);
//! sim.poll(t0 + Duration::from_millis(100)).unwrap();
//! sim.poll(t0 + Duration::from_millis(200)).unwrap();
//! assert_eq!(sim.state(), TrainingState::Completed);
//! assert_eq!(sim.error_history().len(), 2);
//! ```

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::{
    collections::VecDeque,
    fmt, thread,
    time::{Duration, Instant},
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{
    check_epoch_interval, check_geometry, check_learning_rate, check_total_epochs, ConfigError,
    DatasetConfig, SimulatorConfig,
};
use crate::feedforward::{
    BuildError, Dataset, DatasetError, DatasetKind, DecisionGrid, Network, NetworkSnapshot,
    ProcessError, TrainError, Trainer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingState {
    Idle,
    Running,
    Completed,
}

impl fmt::Display for TrainingState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            TrainingState::Idle => "idle",
            TrainingState::Running => "running",
            TrainingState::Completed => "completed",
        })
    }
}

/// Statistics of one finished epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    pub total_epochs: usize,
    /// Mean squared error over the dataset. May be NaN or infinite once weights diverge.
    pub error: f64,
    /// Share of points classified right during the epoch.
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimulatorEvent {
    StateChanged {
        from: TrainingState,
        to: TrainingState,
    },
    EpochCompleted(EpochStats),
    NetworkRebuilt {
        geometry: Vec<usize>,
    },
    WeightsReset,
    DatasetChanged {
        kind: DatasetKind,
        len: usize,
    },
    HistoryCleared,
}

/// Single-slot timer for the next epoch. Being armed twice keeps the first deadline,
/// so there is never more than one pending epoch.
#[derive(Debug, Clone)]
pub struct EpochTimer {
    interval: Duration,
    next_due: Option<Instant>,
}

impl EpochTimer {
    pub fn new(interval: Duration) -> EpochTimer {
        EpochTimer {
            interval,
            next_due: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Schedules the next tick one interval after `now`, unless already armed.
    pub fn arm(&mut self, now: Instant) -> bool {
        if self.next_due.is_some() {
            return false;
        }
        self.next_due = Some(now + self.interval);
        true
    }

    pub fn cancel(&mut self) -> bool {
        self.next_due.take().is_some()
    }

    /// Returns `true` if the tick is due at `now`, and re-arms one interval later.
    /// Missed ticks are not replayed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}

/// Observable state of a simulator, ready to be serialized for a rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorSnapshot {
    pub state: TrainingState,
    pub epoch: usize,
    pub total_epochs: usize,
    pub learning_rate: f64,
    pub error_history: Vec<f64>,
    pub network: NetworkSnapshot,
    /// Activations of every neuron, in neuron id order.
    pub activations: Vec<f64>,
    pub dataset: DatasetConfig,
}

pub struct Simulator {
    config: SimulatorConfig,
    trainer: Trainer,
    dataset: Dataset,
    rng: StdRng,
    state: TrainingState,
    epoch: usize,
    error_history: Vec<f64>,
    timer: EpochTimer,
    events: VecDeque<SimulatorEvent>,
}

impl Simulator {
    /// Builds the network and the dataset described by `config`.
    pub fn new(config: SimulatorConfig) -> Result<Simulator, SimulatorError> {
        config.validate()?;

        let mut rng = match config.training.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let net = Network::new(&config.geometry, &mut rng)?;
        let dataset = Dataset::generate(config.dataset.kind, config.dataset.size, &mut rng)?;
        let timer = EpochTimer::new(config.training.epoch_interval());

        info!(
            geometry = ?config.geometry,
            dataset = %dataset.kind(),
            points = dataset.len(),
            "simulator created"
        );

        Ok(Simulator {
            config,
            trainer: net.build_trainer(),
            dataset,
            rng,
            state: TrainingState::Idle,
            epoch: 0,
            error_history: Vec::new(),
            timer,
            events: VecDeque::new(),
        })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn state(&self) -> TrainingState {
        self.state
    }

    pub fn epoch(&self) -> usize {
        self.epoch
    }

    pub fn total_epochs(&self) -> usize {
        self.config.training.total_epochs
    }

    pub fn learning_rate(&self) -> f64 {
        self.config.training.learning_rate
    }

    pub fn error_history(&self) -> &[f64] {
        &self.error_history
    }

    pub fn network(&self) -> &Network {
        self.trainer.net_ref()
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn timer(&self) -> &EpochTimer {
        &self.timer
    }

    /// Takes all events queued since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<SimulatorEvent> {
        self.events.drain(..).collect()
    }

    fn transition(&mut self, to: TrainingState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        info!(%from, %to, epoch = self.epoch, "training state changed");
        self.events.push_back(SimulatorEvent::StateChanged { from, to });
    }

    fn ensure_not_running(&self, action: &'static str) -> Result<(), SimulatorError> {
        if self.state == TrainingState::Running {
            return Err(SimulatorError::Busy(action));
        }
        Ok(())
    }

    /// Cancels the pending epoch and forgets the run: epoch counter and error history.
    fn discard_run(&mut self) {
        self.timer.cancel();
        self.epoch = 0;
        self.error_history.clear();
        self.transition(TrainingState::Idle);
    }

    /// Replaces the network with a new one of given geometry. Stops training first and
    /// discards the training history.
    pub fn rebuild(&mut self, geometry: &[usize]) -> Result<(), SimulatorError> {
        check_geometry(geometry)?;

        self.discard_run();
        let net = Network::new(geometry, &mut self.rng)?;
        self.trainer = net.build_trainer();
        self.config.geometry = geometry.to_vec();

        info!(?geometry, "network rebuilt");
        self.events.push_back(SimulatorEvent::NetworkRebuilt {
            geometry: geometry.to_vec(),
        });
        Ok(())
    }

    /// Draws new random weights for the same geometry. Stops training first and discards
    /// the training history.
    pub fn reset(&mut self) -> Result<(), SimulatorError> {
        self.discard_run();
        let net = Network::new(&self.config.geometry, &mut self.rng)?;
        self.trainer = net.build_trainer();

        info!("weights reset");
        self.events.push_back(SimulatorEvent::WeightsReset);
        Ok(())
    }

    /// Forgets the epoch counter and error history, keeping weights.
    pub fn clear_history(&mut self) -> Result<(), SimulatorError> {
        self.ensure_not_running("clear the history")?;
        self.discard_run();
        self.events.push_back(SimulatorEvent::HistoryCleared);
        Ok(())
    }

    /// Generates a new dataset. The training history is cleared, weights are kept
    /// (call `Simulator::reset` as well for a fresh network).
    pub fn set_dataset(&mut self, kind: DatasetKind, size: usize) -> Result<(), SimulatorError> {
        self.ensure_not_running("change the dataset")?;

        self.dataset = Dataset::generate(kind, size, &mut self.rng)?;
        self.config.dataset = DatasetConfig { kind, size };
        self.discard_run();

        info!(dataset = %kind, points = self.dataset.len(), "dataset changed");
        self.events.push_back(SimulatorEvent::DatasetChanged {
            kind,
            len: self.dataset.len(),
        });
        Ok(())
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) -> Result<(), SimulatorError> {
        self.ensure_not_running("change the learning rate")?;
        check_learning_rate(learning_rate)?;
        self.config.training.learning_rate = learning_rate;
        Ok(())
    }

    /// Changes the epoch limit. A completed run can be resumed with `Simulator::start`
    /// once the limit is above the current epoch.
    pub fn set_total_epochs(&mut self, total_epochs: usize) -> Result<(), SimulatorError> {
        self.ensure_not_running("change the total epochs")?;
        check_total_epochs(total_epochs)?;
        self.config.training.total_epochs = total_epochs;
        Ok(())
    }

    pub fn set_epoch_interval(&mut self, interval_ms: u64) -> Result<(), SimulatorError> {
        self.ensure_not_running("change the epoch interval")?;
        check_epoch_interval(interval_ms)?;
        self.config.training.epoch_interval_ms = interval_ms;
        self.timer = EpochTimer::new(self.config.training.epoch_interval());
        Ok(())
    }

    /// Starts training: the first epoch runs one interval after `now`.
    ///
    /// # Returns
    /// * `true` if training was started;
    /// * `false` if it is already running, or the epoch limit is reached.
    pub fn start(&mut self, now: Instant) -> bool {
        match self.state {
            TrainingState::Running => {
                warn!("start ignored, training is already running");
                false
            }
            _ if self.epoch >= self.total_epochs() => {
                warn!(
                    epoch = self.epoch,
                    total_epochs = self.total_epochs(),
                    "start ignored, epoch limit reached"
                );
                false
            }
            _ => {
                self.timer.arm(now);
                self.transition(TrainingState::Running);
                true
            }
        }
    }

    /// Stops training, keeping the progress.
    ///
    /// # Returns
    /// * `true` if training was running.
    pub fn stop(&mut self) -> bool {
        if self.state != TrainingState::Running {
            return false;
        }
        self.timer.cancel();
        self.transition(TrainingState::Idle);
        true
    }

    /// Stops a running simulation, starts any other.
    pub fn toggle(&mut self, now: Instant) -> TrainingState {
        if !self.stop() {
            self.start(now);
        }
        self.state
    }

    /// Runs an epoch if training is running and the epoch interval has passed.
    pub fn poll(&mut self, now: Instant) -> Result<Option<EpochStats>, SimulatorError> {
        if self.state != TrainingState::Running || !self.timer.fire(now) {
            return Ok(None);
        }
        self.run_epoch().map(Some)
    }

    /// Runs one epoch right away, outside of the timer.
    pub fn step(&mut self) -> Result<EpochStats, SimulatorError> {
        self.ensure_not_running("step manually")?;
        if self.epoch >= self.total_epochs() {
            return Err(SimulatorError::Completed(self.total_epochs()));
        }
        self.run_epoch()
    }

    /// Starts training and sleeps between epochs until the epoch limit is reached.
    ///
    /// # Returns
    /// * Statistics of every epoch run by this call.
    pub fn run_blocking(&mut self) -> Result<Vec<EpochStats>, SimulatorError> {
        let mut stats = Vec::new();
        self.start(Instant::now());
        while self.state == TrainingState::Running {
            if let Some(due) = self.timer.next_due() {
                let now = Instant::now();
                if due > now {
                    thread::sleep(due - now);
                }
            }
            if let Some(epoch) = self.poll(Instant::now())? {
                stats.push(epoch);
            }
        }
        Ok(stats)
    }

    fn run_epoch(&mut self) -> Result<EpochStats, SimulatorError> {
        let outcome = self
            .trainer
            .train_epoch(self.dataset.points(), self.config.training.learning_rate)?;

        self.epoch += 1;
        self.error_history.push(outcome.error);
        let stats = EpochStats {
            epoch: self.epoch,
            total_epochs: self.total_epochs(),
            error: outcome.error,
            accuracy: outcome.accuracy,
        };

        if outcome.error.is_finite() {
            debug!(
                epoch = stats.epoch,
                error = stats.error,
                accuracy = stats.accuracy,
                "epoch completed"
            );
        } else {
            warn!(
                epoch = stats.epoch,
                error = stats.error,
                "training error is no longer finite, weights diverged"
            );
        }
        self.events
            .push_back(SimulatorEvent::EpochCompleted(stats.clone()));

        if self.epoch >= self.total_epochs() {
            self.timer.cancel();
            self.transition(TrainingState::Completed);
        }
        Ok(stats)
    }

    /// Forward pass that updates neuron activations and highlights, for display.
    pub fn forward(&mut self, inputs: &[f64]) -> Result<Vec<f64>, SimulatorError> {
        Ok(self.trainer.net_mut().forward(inputs)?)
    }

    /// Output of the network for given inputs, leaving neurons untouched.
    pub fn evaluate(&self, inputs: &[f64]) -> Result<Vec<f64>, SimulatorError> {
        Ok(self.network().evaluate(inputs)?)
    }

    pub fn decision_grid(&self, resolution: usize) -> Result<DecisionGrid, SimulatorError> {
        Ok(self.network().decision_grid(resolution)?)
    }

    pub fn snapshot(&self) -> SimulatorSnapshot {
        SimulatorSnapshot {
            state: self.state,
            epoch: self.epoch,
            total_epochs: self.total_epochs(),
            learning_rate: self.learning_rate(),
            error_history: self.error_history.clone(),
            network: self.network().snapshot(),
            activations: self.network().activations(),
            dataset: self.config.dataset.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("Cannot {0} while training is running, stop it first!")]
    Busy(&'static str),
    #[error("Training already reached its limit of {0} epochs!")]
    Completed(usize),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error(transparent)]
    Train(#[from] TrainError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(100);

    fn simulator(total_epochs: usize) -> Simulator {
        Simulator::new(
            SimulatorConfig::default()
                .with_total_epochs(total_epochs)
                .with_seed(42),
        )
        .unwrap()
    }

    #[test]
    fn timer_keeps_first_deadline() {
        let t0 = Instant::now();
        let mut timer = EpochTimer::new(TICK);
        assert!(timer.arm(t0));
        assert!(!timer.arm(t0 + TICK));
        assert_eq!(timer.next_due(), Some(t0 + TICK));
        assert!(!timer.fire(t0 + TICK / 2));
        assert!(timer.fire(t0 + TICK * 5));
        assert_eq!(timer.next_due(), Some(t0 + TICK * 6));
        assert!(timer.cancel());
        assert!(!timer.fire(t0 + TICK * 10));
        assert!(!timer.cancel());
    }

    #[test]
    fn starts_idle_with_empty_history() {
        let sim = simulator(5);
        assert_eq!(sim.state(), TrainingState::Idle);
        assert_eq!(sim.epoch(), 0);
        assert!(sim.error_history().is_empty());
        assert!(!sim.timer().is_armed());
        assert_eq!(sim.dataset().len(), 4);
    }

    #[test]
    fn poll_waits_for_interval() {
        let mut sim = simulator(5);
        let t0 = Instant::now();
        assert_eq!(sim.poll(t0 + TICK).unwrap(), None);

        assert!(sim.start(t0));
        assert_eq!(sim.poll(t0 + TICK / 2).unwrap(), None);
        let stats = sim.poll(t0 + TICK).unwrap().unwrap();
        assert_eq!(stats.epoch, 1);
        assert_eq!(stats.total_epochs, 5);
        assert_eq!(sim.error_history(), &[stats.error]);
    }

    #[test]
    fn late_poll_runs_single_epoch() {
        let mut sim = simulator(50);
        let t0 = Instant::now();
        sim.start(t0);
        sim.poll(t0 + TICK * 20).unwrap();
        assert_eq!(sim.epoch(), 1);
        // Re-armed from the late poll
        assert_eq!(sim.poll(t0 + TICK * 20).unwrap(), None);
        assert_eq!(sim.timer().next_due(), Some(t0 + TICK * 21));
    }

    #[test]
    fn settings_are_locked_while_running() {
        let mut sim = simulator(5);
        sim.start(Instant::now());
        assert!(matches!(
            sim.set_learning_rate(0.5),
            Err(SimulatorError::Busy(_))
        ));
        assert!(matches!(
            sim.set_total_epochs(10),
            Err(SimulatorError::Busy(_))
        ));
        assert!(matches!(
            sim.set_epoch_interval(10),
            Err(SimulatorError::Busy(_))
        ));
        assert!(matches!(
            sim.set_dataset(DatasetKind::Circle, 10),
            Err(SimulatorError::Busy(_))
        ));
        assert!(matches!(sim.step(), Err(SimulatorError::Busy(_))));
        assert!(matches!(sim.clear_history(), Err(SimulatorError::Busy(_))));
        assert_eq!(sim.learning_rate(), 0.1);

        sim.stop();
        sim.set_learning_rate(0.5).unwrap();
        assert_eq!(sim.learning_rate(), 0.5);
        assert!(matches!(
            sim.set_learning_rate(-0.5),
            Err(SimulatorError::Config(ConfigError::BadLearningRate(_)))
        ));
    }

    #[test]
    fn rebuild_cancels_timer_and_history() {
        let mut sim = simulator(5);
        let t0 = Instant::now();
        sim.start(t0);
        sim.poll(t0 + TICK).unwrap();
        sim.rebuild(&[2, 3, 3, 1]).unwrap();

        assert_eq!(sim.state(), TrainingState::Idle);
        assert!(!sim.timer().is_armed());
        assert_eq!(sim.epoch(), 0);
        assert!(sim.error_history().is_empty());
        assert_eq!(sim.network().geometry(), &[2, 3, 3, 1]);
        assert_eq!(sim.config().geometry, vec![2, 3, 3, 1]);

        let events = sim.drain_events();
        assert!(events.contains(&SimulatorEvent::NetworkRebuilt {
            geometry: vec![2, 3, 3, 1]
        }));
        assert!(sim.drain_events().is_empty());
    }

    #[test]
    fn bad_rebuild_keeps_network() {
        let mut sim = simulator(5);
        let weights = sim.network().weights();
        assert!(sim.rebuild(&[2, 0, 1]).is_err());
        assert!(sim.rebuild(&[3, 1]).is_err());
        assert_eq!(sim.network().weights(), weights);
    }

    #[test]
    fn reset_draws_new_weights() {
        let mut sim = simulator(5);
        sim.step().unwrap();
        let weights = sim.network().weights();
        sim.reset().unwrap();
        assert_ne!(sim.network().weights(), weights);
        assert_eq!(sim.epoch(), 0);
        assert!(sim.error_history().is_empty());
    }

    #[test]
    fn dataset_change_keeps_weights() {
        let mut sim = simulator(5);
        sim.step().unwrap();
        let weights = sim.network().weights();
        sim.set_dataset(DatasetKind::Spiral, 21).unwrap();
        assert_eq!(sim.network().weights(), weights);
        assert_eq!(sim.dataset().len(), 20);
        assert_eq!(sim.epoch(), 0);
        assert!(sim.error_history().is_empty());
        assert!(sim.drain_events().contains(&SimulatorEvent::DatasetChanged {
            kind: DatasetKind::Spiral,
            len: 20
        }));
        assert!(sim.set_dataset(DatasetKind::Circle, 0).is_err());
        assert_eq!(sim.dataset().kind(), DatasetKind::Spiral);
    }

    #[test]
    fn clear_history_keeps_weights() {
        let mut sim = simulator(2);
        sim.step().unwrap();
        sim.step().unwrap();
        assert_eq!(sim.state(), TrainingState::Completed);
        let weights = sim.network().weights();
        sim.clear_history().unwrap();
        assert_eq!(sim.state(), TrainingState::Idle);
        assert_eq!(sim.epoch(), 0);
        assert_eq!(sim.network().weights(), weights);
    }

    #[test]
    fn completed_run_resumes_after_raising_limit() {
        let mut sim = simulator(1);
        let t0 = Instant::now();
        sim.step().unwrap();
        assert_eq!(sim.state(), TrainingState::Completed);
        assert!(matches!(sim.step(), Err(SimulatorError::Completed(1))));
        assert!(!sim.start(t0));

        sim.set_total_epochs(3).unwrap();
        assert!(sim.start(t0));
        assert_eq!(sim.state(), TrainingState::Running);
        sim.poll(t0 + TICK).unwrap();
        assert_eq!(sim.epoch(), 2);
    }

    #[test]
    fn toggle_flips_running() {
        let mut sim = simulator(5);
        let t0 = Instant::now();
        assert_eq!(sim.toggle(t0), TrainingState::Running);
        assert_eq!(sim.toggle(t0), TrainingState::Idle);
        assert_eq!(
            sim.drain_events(),
            vec![
                SimulatorEvent::StateChanged {
                    from: TrainingState::Idle,
                    to: TrainingState::Running
                },
                SimulatorEvent::StateChanged {
                    from: TrainingState::Running,
                    to: TrainingState::Idle
                },
            ]
        );
    }

    #[test]
    fn evaluate_does_not_touch_neurons() {
        let mut sim = simulator(5);
        let before = sim.network().activations();
        let out = sim.evaluate(&[1.0, 0.0]).unwrap();
        assert_eq!(sim.network().activations(), before);
        assert_eq!(sim.forward(&[1.0, 0.0]).unwrap(), out);
        assert_eq!(sim.network().outputs(), out);
        assert!(matches!(
            sim.evaluate(&[1.0]),
            Err(SimulatorError::Process(ProcessError::BadInputs(_)))
        ));
        assert_eq!(sim.decision_grid(8).unwrap().values.len(), 64);
    }

    #[test]
    fn snapshot_serializes() {
        let mut sim = simulator(5);
        sim.step().unwrap();
        let snapshot = sim.snapshot();
        assert_eq!(snapshot.epoch, 1);
        assert_eq!(snapshot.error_history.len(), 1);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"state\":\"idle\""));
        let back: SimulatorSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.network.geometry, snapshot.network.geometry);
        assert_eq!(back.activations.len(), snapshot.activations.len());
    }

    #[test]
    fn run_blocking_reaches_limit() {
        let mut sim = Simulator::new(
            SimulatorConfig::default()
                .with_total_epochs(3)
                .with_epoch_interval_ms(1)
                .with_seed(3),
        )
        .unwrap();
        let stats = sim.run_blocking().unwrap();
        assert_eq!(stats.len(), 3);
        assert_eq!(sim.state(), TrainingState::Completed);
        assert!(!sim.timer().is_armed());
    }

    #[test]
    fn non_finite_errors_are_recorded() {
        let mut sim = simulator(3);
        // inf * 0.0 on the (0, 0) xor point turns the first hidden neuron into NaN
        let mut weights = vec![0.1; 12];
        weights[0] = f64::INFINITY;
        sim.trainer = Network::from_weights(&[2, 4, 1], &weights)
            .unwrap()
            .build_trainer();

        let stats = sim.step().unwrap();
        assert!(stats.error.is_nan());
        sim.step().unwrap();
        assert_eq!(sim.epoch(), 2);
        assert_eq!(sim.error_history().len(), 2);
        assert!(sim.error_history().iter().all(|e| !e.is_finite()));
        assert!(sim
            .drain_events()
            .iter()
            .any(|e| matches!(e, SimulatorEvent::EpochCompleted(s) if s.error.is_nan())));
        assert_eq!(sim.state(), TrainingState::Idle);
    }
}
