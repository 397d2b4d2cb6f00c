//! Offline training job.
//!
//! Loads a housing CSV (generating the synthetic dataset first if the file
//! does not exist), fits the requested estimator on an 80/20 split, reports
//! held-out error and the feature importance ranking, and writes the model
//! artifact.
//!
//! Usage:
//!   cargo run --bin train --release -- [options]
//!
//! Options:
//!   --data PATH         Dataset CSV (default: house_data.csv; generated if missing)
//!   --out PATH          Artifact output path (default: house_price_model.pfor)
//!   --model KIND        forest (default), gbdt, or linear
//!   --trees N           Number of trees / boosting rounds (default: 100)
//!   --depth N           Maximum tree depth (default: 10 forest, 3 gbdt)
//!   --rows N            Synthetic dataset size when generating (default: 1000)
//!   --seed N            Random seed (default: 42)
//!   --valid-fraction F  Held-out fraction (default: 0.2)
//!   --threads N         Thread count, 0 = auto (default: 0)

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use priceforest::dataset::{load_csv, save_csv, Dataset};
use priceforest::housing::{self, synthesize, SynthConfig};
use priceforest::model::PriceModel;
use priceforest::training::{
    evaluate, EvalReport, ForestParams, ForestTrainer, GbdtParams, GbdtTrainer, LinearParams,
    LinearTrainer,
};
use priceforest::utils::run_with_threads;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModelKind {
    Forest,
    Gbdt,
    Linear,
}

#[derive(Debug)]
struct Args {
    data: PathBuf,
    out: PathBuf,
    model: ModelKind,
    trees: u32,
    depth: Option<u32>,
    rows: usize,
    seed: u64,
    valid_fraction: f32,
    threads: usize,
}

fn parse_args() -> Args {
    let mut data = PathBuf::from("house_data.csv");
    let mut out = PathBuf::from("house_price_model.pfor");
    let mut model = ModelKind::Forest;
    let mut trees = 100u32;
    let mut depth: Option<u32> = None;
    let mut rows = 1000usize;
    let mut seed = 42u64;
    let mut valid_fraction = 0.2f32;
    let mut threads = 0usize;

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--data" => data = PathBuf::from(it.next().expect("--data path")),
            "--out" => out = PathBuf::from(it.next().expect("--out path")),
            "--model" => {
                let val = it.next().expect("--model kind");
                model = match val.as_str() {
                    "forest" => ModelKind::Forest,
                    "gbdt" => ModelKind::Gbdt,
                    "linear" => ModelKind::Linear,
                    other => panic!("invalid model kind: {other} (expected: forest, gbdt, linear)"),
                };
            }
            "--trees" => trees = it.next().expect("--trees value").parse().expect("--trees number"),
            "--depth" => {
                depth = Some(it.next().expect("--depth value").parse().expect("--depth number"))
            }
            "--rows" => rows = it.next().expect("--rows value").parse().expect("--rows number"),
            "--seed" => seed = it.next().expect("--seed value").parse().expect("--seed number"),
            "--valid-fraction" => {
                valid_fraction = it
                    .next()
                    .expect("--valid-fraction value")
                    .parse()
                    .expect("--valid-fraction number")
            }
            "--threads" => {
                threads = it.next().expect("--threads value").parse().expect("--threads number")
            }
            "--help" => {
                eprintln!(
                    "train\n\n  --data <path>           Dataset CSV (generated if missing)\n  --out <path>            Artifact output path\n  --model <kind>          forest (default), gbdt, linear\n  --trees <n>             Trees / boosting rounds\n  --depth <n>             Maximum tree depth\n  --rows <n>              Synthetic dataset size when generating\n  --seed <n>              Random seed\n  --valid-fraction <f>    Held-out fraction (default 0.2)\n  --threads <n>           Thread count, 0 = auto"
                );
                std::process::exit(0);
            }
            other => panic!("unknown arg: {other}"),
        }
    }

    Args {
        data,
        out,
        model,
        trees,
        depth,
        rows,
        seed,
        valid_fraction,
        threads,
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = parse_args();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let data = load_or_generate(args)?;
    println!(
        "Dataset: {} samples x {} features (target '{}')",
        data.n_samples(),
        data.n_features(),
        data.schema().target()
    );

    let (train, valid) = data.split(args.valid_fraction, args.seed);
    println!(
        "Split: {} train / {} valid",
        train.n_samples(),
        valid.n_samples()
    );

    let model = fit(args, &train)?;
    let report = evaluate(&model, &train, &valid);
    print_report(&model, &report);

    model.save(&args.out)?;
    let size = std::fs::metadata(&args.out)?.len();
    println!(
        "\nArtifact written to {} ({:.1} KiB)",
        args.out.display(),
        size as f64 / 1024.0
    );

    Ok(())
}

fn load_or_generate(args: &Args) -> Result<Dataset, Box<dyn std::error::Error>> {
    if Path::new(&args.data).exists() {
        log::info!("loading dataset from {}", args.data.display());
        Ok(load_csv(&args.data, &housing::schema())?)
    } else {
        log::info!(
            "{} not found, generating {} synthetic listings (seed {})",
            args.data.display(),
            args.rows,
            args.seed
        );
        let data = synthesize(&SynthConfig {
            n_samples: args.rows,
            seed: args.seed,
        });
        save_csv(&args.data, &data)?;
        println!(
            "Generated {} listings into {}",
            data.n_samples(),
            args.data.display()
        );
        Ok(data)
    }
}

fn fit(args: &Args, train: &Dataset) -> Result<PriceModel, Box<dyn std::error::Error>> {
    let model = match args.model {
        ModelKind::Forest => {
            let mut params = ForestParams {
                n_trees: args.trees,
                seed: args.seed,
                ..Default::default()
            };
            if let Some(depth) = args.depth {
                params.growth.max_depth = depth;
            }
            let forest = run_with_threads(args.threads, |parallelism| {
                ForestTrainer::new(params).train(train, parallelism)
            })
            .ok_or("forest training produced no model")?;
            PriceModel::from_forest(forest, train)
        }
        ModelKind::Gbdt => {
            let mut params = GbdtParams {
                n_rounds: args.trees,
                seed: args.seed,
                ..Default::default()
            };
            if let Some(depth) = args.depth {
                params.growth.max_depth = depth;
            }
            let forest = GbdtTrainer::new(params)
                .train(train)
                .ok_or("boosting produced no model")?;
            PriceModel::from_forest(forest, train)
        }
        ModelKind::Linear => {
            let linear = LinearTrainer::new(LinearParams::default())
                .train(train)
                .ok_or("linear training produced no model")?;
            PriceModel::from_linear(linear, train)
        }
    };

    Ok(model)
}

fn print_report(model: &PriceModel, report: &EvalReport) {
    println!("\n=== {} ===", model.model_type());
    println!("train mae: {:>12.0}", report.train_mae);
    println!("valid mae: {:>12.0}", report.valid_mae);
    println!("train r2:  {:>12.4}", report.train_r2);
    println!("valid r2:  {:>12.4}", report.valid_r2);

    println!("\nFeature importance:");
    for (name, score) in &report.importance {
        println!("  {name:<20} {score:.4}");
    }
}
