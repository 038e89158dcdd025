use lamina::f;
use lamina::{Activations, Network, Optimizer, TrainingExample};
use rand::{prelude::*, thread_rng};

fn gen_training_data() -> TrainingExample {
    let mut rng = thread_rng();

    let classes: Vec<(Vec<f64>, Vec<f64>)> = vec![
        (vec![0., 1.], f::onehot(0, 2)),
        (vec![1., 1.], f::onehot(1, 2)),
        (vec![1., 0.], f::onehot(0, 2)),
        (vec![0., 0.], f::onehot(1, 2)),
    ];

    let (x, y) = classes.choose(&mut rng).unwrap().clone();
    TrainingExample::new(x, y)
}

fn main() -> lamina::Result<()> {
    env_logger::init();

    let train = (0..400).map(|_| gen_training_data()).collect::<Vec<_>>();
    let test = (0..50).map(|_| gen_training_data()).collect::<Vec<_>>();

    let mut nn = Network::new();
    nn.add_layer(4, 2, Activations::Sigmoid)?
        .add_layer(2, 4, Activations::Sigmoid)?;

    let mut trainer = nn.get_trainer();
    trainer.set_learning_rate(0.5).set_epochs(200).train(&train)?;
    println!("final loss {:?}", trainer.losses.last());

    println!("Accuracy: {}%", nn.test(&test)? * 100.);
    Ok(())
}
