use rand::{rngs::StdRng, SeedableRng};

use nnexplorer::feedforward::{Dataset, Network, Trainer};

fn trainer(geometry: &[usize], seed: u64) -> Trainer {
    Network::new(geometry, &mut StdRng::seed_from_u64(seed))
        .unwrap()
        .build_trainer()
}

fn train(trainer: &mut Trainer, epochs: usize, learning_rate: f64) -> Vec<f64> {
    let data = Dataset::xor();
    (0..epochs)
        .map(|_| trainer.train_epoch(data.points(), learning_rate).unwrap().error)
        .collect()
}

#[test]
fn error_goes_down_on_xor() {
    for seed in 0..10 {
        let mut trainer = trainer(&[2, 4, 1], seed);
        let history = train(&mut trainer, 200, 0.1);
        assert!(
            history[199] < history[0],
            "seed {}: {} -> {}",
            seed,
            history[0],
            history[199]
        );
    }
}

#[test]
fn learns_xor() {
    // No biases: the (0,0) corner can only be pushed down through the hidden layer,
    // so this needs a wider layer and a bigger step than the playground defaults.
    for seed in 0..5 {
        let mut trainer = trainer(&[2, 8, 1], seed);
        let history = train(&mut trainer, 3000, 2.0);
        let error = *history.last().unwrap();
        assert!(error < 0.05, "seed {}: final error {}", seed, error);

        let net = trainer.net_ref();
        for point in Dataset::xor().points() {
            let output = net.evaluate(&point.inputs()).unwrap()[0];
            if point.label == 1 {
                assert!(output > 0.5, "seed {}: {:?} -> {}", seed, point, output);
            } else {
                assert!(output < 0.5, "seed {}: {:?} -> {}", seed, point, output);
            }
        }
    }
}

#[test]
fn teardown_keeps_trained_weights() {
    let mut trainer = trainer(&[2, 4, 1], 1);
    train(&mut trainer, 10, 0.5);
    let weights = trainer.net_ref().weights();
    let net = trainer.teardown();
    assert_eq!(net.weights(), weights);
    assert!(net
        .connections()
        .iter()
        .any(|c| c.weight != c.previous_weight));
}
