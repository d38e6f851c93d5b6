use clap::{Parser, Subcommand};
use quantum_timeline::chain::duration::{format_duration, parse_duration};
use quantum_timeline::types::DEFAULT_MAX_INTERVAL_MS;
use quantum_timeline::{MatchRequest, QuantumConfig, QuantumStep, SequenceMatcher, StepGenerator, TimeRange};
use serde_json::json;

#[derive(Parser, Debug)]
#[command(name = "timeline")]
struct Args {
    /// Chain origin timestamp (milliseconds since epoch).
    #[arg(long, default_value_t = 0)]
    start: i64,

    /// Upper bound on generated intervals, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_MAX_INTERVAL_MS)]
    max_interval: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the first N steps of the chain.
    Generate {
        #[arg(long, default_value_t = 10)]
        count: usize,
    },
    /// Find the chain step nearest to a target timestamp.
    Nearest {
        #[arg(long)]
        target: i64,
    },
    /// Align an interval sequence against the chain. Intervals accept either
    /// raw milliseconds or duration text like "3d 14h 23m".
    Match {
        #[arg(long, value_delimiter = ',')]
        intervals: Vec<String>,
        #[arg(long)]
        from: Option<i64>,
        #[arg(long)]
        to: Option<i64>,
        #[arg(long)]
        window: Option<usize>,
    },
}

fn render_step(step: &QuantumStep) -> serde_json::Value {
    json!({
        "index": step.index,
        "timestamp_ms": step.timestamp_ms,
        "iso": step.iso_string(),
        "interval_ms": step.interval_ms,
        "interval": format_duration(step.interval_ms),
        "hash": step.hash,
    })
}

fn parse_interval_arg(raw: &str) -> u64 {
    raw.trim()
        .parse::<u64>()
        .unwrap_or_else(|_| parse_duration(raw))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = QuantumConfig::default()
        .with_start_timestamp(args.start)
        .with_max_interval(args.max_interval);

    match args.command {
        Command::Generate { count } => {
            let generator = StepGenerator::new(config);
            let origin = generator.initial_step()?;
            let mut rendered = vec![render_step(&origin)];
            for step in generator.steps_forward(&origin, count.saturating_sub(1))? {
                rendered.push(render_step(&step));
            }
            println!("{}", serde_json::to_string_pretty(&rendered)?);
        }
        Command::Nearest { target } => {
            let generator = StepGenerator::new(config);
            let step = generator.find_nearest(target)?;
            println!("{}", serde_json::to_string_pretty(&render_step(&step))?);
        }
        Command::Match {
            intervals,
            from,
            to,
            window,
        } => {
            let matcher = SequenceMatcher::new(config);
            let request = MatchRequest {
                intervals: Some(intervals.iter().map(|s| parse_interval_arg(s)).collect()),
                timestamps: None,
                range: match (from, to) {
                    (Some(start_ms), Some(end_ms)) => Some(TimeRange { start_ms, end_ms }),
                    _ => None,
                },
                window_size: window,
            };
            let result = matcher.match_sequence(&request)?;
            let summary = json!({
                "similarity_score": result.similarity_score,
                "offset": result.alignment.offset,
                "length": result.alignment.length,
                "statistics": result.statistics,
                "matched_steps": result.matched_steps.iter().map(render_step).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
