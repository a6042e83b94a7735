use std::env;
use std::process;

use mlp_net::helpers::{decayed_learning_rate, evaluate_model};
use mlp_net::loss::SoftmaxCrossEntropyWithLogits;
use mlp_net::mnist_data::MnistData;
use mlp_net::network::{Activation, Network};

const HIDDEN_SIZES: [usize; 2] = [50, 25];
const NUM_INPUTS: usize = 28 * 28;
const NUM_CLASSES: usize = 10;
const BATCH_SIZE: usize = 64;
const LEARNING_RATE: f64 = 0.05;
const LEARNING_RATE_DECAY: f64 = 0.775;
const NUM_EPOCHS: usize = 10;
const LOG_EVERY_N_STEPS: usize = 100;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 5 {
        eprintln!("No paths to dataset given!");
        eprintln!("Usage:");
        eprintln!(
            "{} train-images.idx[.gz] train-labels.idx[.gz] test-images.idx[.gz] test-labels.idx[.gz]",
            args[0]
        );
        process::exit(1);
    }

    if let Err(e) = run(&args[1], &args[2], &args[3], &args[4]) {
        eprintln!("Training failed: {}", e);
        process::exit(1);
    }
}

fn run(
    train_images: &str,
    train_labels: &str,
    test_images: &str,
    test_labels: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading train dataset from {} / {}", train_images, train_labels);
    let train_data = MnistData::load_from_files(train_images, train_labels)?;
    println!("Loading test dataset from {} / {}", test_images, test_labels);
    let test_data = MnistData::load_from_files(test_images, test_labels)?;

    let train_batches = train_data.batches(BATCH_SIZE, NUM_CLASSES)?;
    let test_batches = test_data.batches(BATCH_SIZE, NUM_CLASSES)?;
    println!(
        "{} train batches, {} test batches of size {}",
        train_batches.len(),
        test_batches.len(),
        BATCH_SIZE
    );

    let mut network = Network::new(&HIDDEN_SIZES, NUM_INPUTS, NUM_CLASSES, Activation::LeakyRelu(0.1), 42);
    let loss = SoftmaxCrossEntropyWithLogits;

    let mut global_step = 0usize;
    for epoch in 0..NUM_EPOCHS {
        let learning_rate = decayed_learning_rate(LEARNING_RATE, LEARNING_RATE_DECAY, epoch);
        let mut running_loss = 0.0;
        let mut running_steps = 0usize;

        for (input, labels) in &train_batches {
            let batch_loss = network.train(input, labels, &loss, &learning_rate)?;
            running_loss += batch_loss;
            running_steps += 1;
            global_step += 1;

            if global_step % LOG_EVERY_N_STEPS == 0 {
                println!(
                    "Step: {:>6} - loss: {:.5}",
                    global_step,
                    running_loss / running_steps as f64
                );
                running_loss = 0.0;
                running_steps = 0;
            }
        }

        let accuracy = evaluate_model(&network, &test_batches)?;
        println!("Epoch: {:>3} - test accuracy: {:.4}", epoch + 1, accuracy);
    }

    Ok(())
}
