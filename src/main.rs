use clap::{Parser, ValueEnum};
use nullsafe_doc::{coerce, EvalOptions, Evaluator, Target};
use serde_json::Value;
use tracing::Level;

/// Navigate a JSON document; missing fields evaluate to nothing instead of failing.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON document (string). You can also pipe a file using shell quoting.
    json: String,
    /// Navigation expression, e.g. `$.order.lines.Count()`
    expr: String,
    /// Fallback JSON used when the result is missing (optional)
    #[arg(long)]
    default: Option<String>,
    /// Coerce the result to a primitive type
    #[arg(long, value_enum)]
    coerce: Option<CoerceArg>,
    /// Use the nullable form of the coercion target
    #[arg(long, requires = "coerce")]
    nullable: bool,
    /// Log navigation steps to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CoerceArg {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Decimal,
    String,
    Char,
    DateTime,
    DateTimeOffset,
    TimeSpan,
    Guid,
}

impl From<CoerceArg> for Target {
    fn from(arg: CoerceArg) -> Self {
        match arg {
            CoerceArg::Bool => Target::Bool,
            CoerceArg::Byte => Target::Byte,
            CoerceArg::Short => Target::Short,
            CoerceArg::Int => Target::Int,
            CoerceArg::Long => Target::Long,
            CoerceArg::Float => Target::Float,
            CoerceArg::Double => Target::Double,
            CoerceArg::Decimal => Target::Decimal,
            CoerceArg::String => Target::String,
            CoerceArg::Char => Target::Char,
            CoerceArg::DateTime => Target::DateTime,
            CoerceArg::DateTimeOffset => Target::DateTimeOffset,
            CoerceArg::TimeSpan => Target::TimeSpan,
            CoerceArg::Guid => Target::Guid,
        }
    }
}

fn main() {
    // Parse CLI arguments.
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::TRACE } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    // Parse input JSON.
    let data: Value = match serde_json::from_str(&args.json) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Invalid JSON: {e}");
            std::process::exit(1);
        }
    };

    // Build options.
    let mut opts = EvalOptions::default();
    if let Some(def) = args.default.as_ref() {
        match serde_json::from_str::<Value>(def) {
            Ok(v) => opts.default = Some(v),
            Err(_) => opts.default = Some(Value::String(def.clone())),
        }
    }

    let evaluator = Evaluator::new().with_options(opts);
    let out = evaluator.eval(&data, &args.expr).and_then(|result| match args.coerce {
        Some(target) => coerce::coerce_to_json(&result, target.into(), args.nullable),
        None => Ok(result.to_json()),
    });

    match out {
        Ok(v) => match serde_json::to_string_pretty(&v) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("Could not render result: {e}");
                std::process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    }
}
