use std::env;
use std::error::Error;
use std::fs;

use lamina::{Activations, Hyper, Network, TrainingExample};

fn training_data() -> Vec<TrainingExample> {
    vec![
        TrainingExample::new(vec![0., 0.], vec![0.]),
        TrainingExample::new(vec![0., 1.], vec![1.]),
        TrainingExample::new(vec![1., 0.], vec![1.]),
        TrainingExample::new(vec![1., 1.], vec![1.]),
    ]
}

struct Args {
    hyper: Hyper,
    activation: Activations,
}

fn flag_value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a String, Box<dyn Error>> {
    args.get(i + 1)
        .ok_or_else(|| format!("missing value for {}", flag).into())
}

// --config <file.json> --epochs <n> --learning-rate <f> --activation <name>
//
// The config file is read first, so flags override it wherever they appear.
fn parse_args(args: &[String]) -> Result<Args, Box<dyn Error>> {
    let mut hyper = Hyper::new();
    let mut activation = Activations::Sigmoid;

    if let Some(i) = args.iter().position(|a| a == "--config") {
        hyper = Hyper::from_json(&fs::read_to_string(flag_value(args, i, "--config")?)?)?;
    }

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--config" => {}
            "--epochs" => hyper.epochs = flag_value(args, i, flag)?.parse()?,
            "--learning-rate" => hyper.learning_rate = flag_value(args, i, flag)?.parse()?,
            "--activation" => activation = flag_value(args, i, flag)?.parse()?,
            other => return Err(format!("unknown flag: {}", other).into()),
        }
        i += 2;
    }

    hyper.validate()?;
    Ok(Args { hyper, activation })
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = parse_args(&env::args().collect::<Vec<_>>())?;

    let mut nn = Network::new();
    nn.add_layer(2, 1, args.activation)?;

    let data = training_data();
    nn.train_all(&data, args.hyper.epochs, args.hyper.learning_rate)?;

    for example in data.iter() {
        let y = nn.feed_forward(example.input())?;
        println!("{},{} = {:.6}", example.input()[0], example.input()[1], y[0]);
    }

    Ok(())
}
