use std::path::PathBuf;

use caption_eval::metrics::{ExactMeteor, Meteor, Spice, DEFAULT_METEOR_JAR, DEFAULT_SPICE_JAR};
use caption_eval::report::{print_scores, scores_to_json, write_scores};
use caption_eval::{all_scorers, default_scorers, Evaluator, PtbTokenizer, Scorer};
use clap::Parser;

use log::info;

#[derive(Parser)]
#[clap(about = "Evaluate the results stored in a submissions file.")]
struct Cli {
    /// Submission file with generated captions
    #[clap(short, long, default_value = "sample_submission.json")]
    submission: PathBuf,
    /// Tab-separated file with ground truth captions
    #[clap(short, long)]
    reference: Option<PathBuf>,
    /// Output file with final language metrics
    #[clap(short, long, default_value = "result.json")]
    output: PathBuf,
    /// Run every metric and print intermediate steps
    #[clap(short, long)]
    verbose: bool,
    /// Java executable for the METEOR and SPICE jars
    #[clap(long, env = "CAPTION_EVAL_JAVA", default_value = "java")]
    java: String,
    #[clap(long, env = "CAPTION_EVAL_METEOR_JAR", default_value = DEFAULT_METEOR_JAR)]
    meteor_jar: PathBuf,
    /// Score METEOR with exact word matching only, without Java
    #[clap(long)]
    exact_meteor: bool,
    #[clap(long, env = "CAPTION_EVAL_SPICE_JAR", default_value = DEFAULT_SPICE_JAR)]
    spice_jar: PathBuf,
    #[clap(long)]
    spice_cache: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_filter = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    info!("submission\t{:?}", args.submission);
    info!("reference\t{:?}", args.reference);
    info!("output\t{:?}", args.output);
    info!("verbose\t{}", args.verbose);
    info!("java\t{}", args.java);

    let meteor: Box<dyn Scorer> = if args.exact_meteor {
        info!("meteor\texact");
        Box::new(ExactMeteor::new())
    } else {
        info!("meteor jar\t{:?}", args.meteor_jar);
        Box::new(Meteor::new(args.java.as_str(), args.meteor_jar))
    };
    let scorers = if args.verbose {
        info!("spice jar\t{:?}", args.spice_jar);
        info!("spice cache\t{:?}", args.spice_cache);
        let mut spice = Spice::new(args.java, args.spice_jar);
        if let Some(cache_dir) = args.spice_cache {
            spice = spice.with_cache_dir(cache_dir);
        }
        all_scorers(meteor, spice)
    } else {
        default_scorers(meteor)
    };

    let evaluator = Evaluator::from_files(
        args.reference.as_deref(),
        Some(args.submission.as_path()),
        PtbTokenizer::new(),
        scorers,
    )?
    .verbose(args.verbose);
    let output = evaluator.evaluate()?;

    print_scores(&output);
    write_scores(&args.output, &output)?;
    println!("{}", scores_to_json(&output));
    Ok(())
}
