use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use rideshare_cli::evaluate::run_evaluation;
use rideshare_cli::predict::{load_bundle, predict_file, predict_single};
use rideshare_cli::train::input::TrainConfig;
use rideshare_cli::train::run_training;
use rideshare_fare::data_handling::FareQuery;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("RIDESHARE_LOG", "error,rideshare=info"))
        .init();

    let matches = Command::new("rideshare")
        .version(clap::crate_version!())
        .about("\u{1F695} Rideshare fare prediction - train and query fare models")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("train")
                .about("Train a fare model from a trip table and save the bundle")
                .arg(
                    Arg::new("config")
                        .help("Path to a JSON training configuration file")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("train_data")
                        .short('d')
                        .long("train_data")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Path to training data (*.csv or *.tsv). Overrides the training data \
                             file specified in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output_file")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("File path the trained model bundle (JSON) will be written to.")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("report_file")
                        .long("report")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("Write an HTML training report to this path.")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("hyperparameters")
                        .long("hyperparameters")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help(
                            "JSON file with gradient descent settings. Replaces the \
                             \"training\" block of the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("iterations")
                        .long("iterations")
                        .value_parser(clap::value_parser!(usize))
                        .help("Number of gradient descent iterations."),
                ),
        )
        .subcommand(
            Command::new("predict")
                .about("Predict the fare of one trip, or of every row in a table")
                .arg(
                    Arg::new("model_path")
                        .short('m')
                        .long("model")
                        .help("Path to the trained model bundle")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("distance")
                        .long("distance")
                        .help("Trip distance in miles")
                        .allow_negative_numbers(true)
                        .required_unless_present("input")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("surge_multiplier")
                        .long("surge")
                        .help("Surge multiplier (1.0 = no surge)")
                        .allow_negative_numbers(true)
                        .default_value("1.0")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("cab_type")
                        .long("cab-type")
                        .help("Service provider, e.g. Uber or Lyft")
                        .default_value("Uber"),
                )
                .arg(
                    Arg::new("ride_name")
                        .long("ride-name")
                        .help("Product tier, e.g. UberX or Lyft")
                        .default_value("UberX"),
                )
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .help("Table of trips to predict (*.csv or *.tsv)")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output")
                        .help("Where to write batch predictions. Defaults to stdout.")
                        .requires("input")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("auto_train")
                        .long("auto-train")
                        .help("Train from this trip table if the model bundle does not exist yet")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the prediction as a JSON object")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("evaluate")
                .about("Report RMSE, MAE and R² of a model on a labelled trip table")
                .arg(
                    Arg::new("model_path")
                        .short('m')
                        .long("model")
                        .help("Path to the trained model bundle")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("data")
                        .short('d')
                        .long("data")
                        .help("Labelled trip table (*.csv or *.tsv)")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("train", sub_m)) => handle_train(sub_m),
        Some(("predict", sub_m)) => handle_predict(sub_m),
        Some(("evaluate", sub_m)) => handle_evaluate(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    match config_path {
        Some(path) => log::info!("[Rideshare::Train] Training from config: {:?}", path),
        None => log::info!("[Rideshare::Train] No config provided; using defaults."),
    }

    let config = TrainConfig::from_arguments(config_path, matches)?;
    if config_path.is_none() {
        let default_json = serde_json::to_string_pretty(&config).unwrap_or_default();
        eprintln!("[Rideshare::Train] Effective config:\n{}", default_json);
    }

    match run_training(&config) {
        Ok(outcome) => {
            eprintln!(
                "[Rideshare::Train] Saved {} weights to {} (final cost {:.4})",
                outcome.bundle.weights.len(),
                config.output_file,
                outcome.final_cost().unwrap_or(f64::NAN)
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Training failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_predict(matches: &ArgMatches) -> Result<()> {
    let model_path: &PathBuf = matches
        .get_one("model_path")
        .expect("--model is required by CLI configuration");
    let bundle = load_bundle(model_path, matches.get_one::<PathBuf>("auto_train"))?;

    if let Some(input) = matches.get_one::<PathBuf>("input") {
        let count = predict_file(&bundle, input, matches.get_one::<PathBuf>("output_file"))?;
        log::info!("[Rideshare::Predict] Predicted {} trips", count);
        return Ok(());
    }

    let query = FareQuery::new(
        *matches
            .get_one::<f64>("distance")
            .expect("--distance is required without --input"),
        *matches
            .get_one::<f64>("surge_multiplier")
            .expect("--surge has a default"),
        matches
            .get_one::<String>("cab_type")
            .expect("--cab-type has a default")
            .as_str(),
        matches
            .get_one::<String>("ride_name")
            .expect("--ride-name has a default")
            .as_str(),
    );
    println!("{}", predict_single(&bundle, &query, matches.get_flag("json"))?);
    Ok(())
}

fn handle_evaluate(matches: &ArgMatches) -> Result<()> {
    let model_path: &PathBuf = matches
        .get_one("model_path")
        .expect("--model is required by CLI configuration");
    let data_path: &PathBuf = matches
        .get_one("data")
        .expect("--data is required by CLI configuration");

    let metrics = run_evaluation(model_path, data_path)?;
    println!(
        "trips\t{}\nrmse\t{:.4}\nmae\t{:.4}\nr2\t{:.4}",
        metrics.n, metrics.rmse, metrics.mae, metrics.r2
    );
    Ok(())
}
