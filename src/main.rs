//! Command-line front end.
//!
//! Decomposes one surface form and prints the ranked solution tree. Rule
//! tables, lexicon and frequencies come from a JSON bundle (`--bundle`); without
//! one the bundled demonstration grammar is used.
//!
//! ```bash
//! padaccheda gateti
//! padaccheda --label np --debug devālayāḥ
//! padaccheda --bundle grammar.json --label word --param 0=noun --infer-layer deva
//! ```
//!
//! Logging goes to stderr. `RUST_LOG` selects the filter; setting
//! `PADACCHEDA_DEBUG_RULES=1` turns on per-descent tracing for the engine.

mod debug_report;

use anyhow::{Context as _, bail};
use clap::Parser;
use padaccheda::rules::sample;
use padaccheda::{
    Analyzer, Bundle, ChronologicalLayer, Context, EngineConfig, Options, ParameterVector, ParseRequest, TermIndex,
};
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "padaccheda", version)]
#[command(about = "Sandhi-aware morphological decomposition")]
struct Args {
    /// Surface form to decompose. Read from stdin when omitted.
    entry: Option<String>,

    /// JSON bundle with terms, rules, sandhi groups, lexicon and frequencies
    #[arg(long, env = "PADACCHEDA_BUNDLE")]
    bundle: Option<PathBuf>,

    /// Grammatical label to analyse the entry as
    #[arg(long, default_value = "phrase")]
    label: String,

    /// Constrain a parameter position, as POSITION=TERM (term id or label). Repeatable.
    #[arg(long = "param", value_name = "POS=TERM")]
    params: Vec<String>,

    /// Chronological layer used for frequency ratings
    #[arg(long, conflicts_with = "infer_layer")]
    layer: Option<u32>,

    /// Use the earliest layer in which the entry is attested
    #[arg(long)]
    infer_layer: bool,

    /// Keep failed branches in the output
    #[arg(long)]
    debug: bool,

    /// Weight of frequency ratings; 0 disables them
    #[arg(long, default_value_t = 1.0)]
    ratio: f64,

    /// Worker threads (defaults to the number of CPUs)
    #[arg(long)]
    workers: Option<usize>,

    /// Force ANSI color output
    #[arg(long, overrides_with = "no_color")]
    color: bool,

    /// Disable ANSI color output
    #[arg(long)]
    no_color: bool,
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = if std::env::var("PADACCHEDA_DEBUG_RULES").is_ok_and(|v| v == "1") {
        EnvFilter::new("padaccheda=trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn run(args: Args) -> anyhow::Result<()> {
    let entry = match &args.entry {
        Some(entry) => entry.trim().to_string(),
        None => read_stdin()?,
    };
    if entry.is_empty() {
        bail!("no entry provided");
    }

    let bundle = match &args.bundle {
        Some(path) => Bundle::load(path).with_context(|| format!("loading bundle {}", path.display()))?,
        None => sample::bundle(),
    };
    let analyzer = Analyzer::from_bundle(bundle, EngineConfig { workers: args.workers })
        .context("rule tables are inconsistent")?;

    let parameters = parse_params(&args.params, analyzer.terms())?;

    let ctx = session_context(&args, &analyzer, &entry)?;
    let opts = Options { debug_mode: args.debug, freq_rating_ratio: args.ratio };
    let request = ParseRequest::new(&entry, &args.label).with_parameters(parameters);
    let report = analyzer
        .parse_verbose(request, &ctx, &opts)
        .with_context(|| format!("parsing '{entry}' as '{}'", args.label))?;

    let color = if args.color {
        true
    } else if args.no_color {
        false
    } else {
        io::stdout().is_terminal()
    };
    debug_report::print_report(&report, &analyzer, color);
    Ok(())
}

/// Picks the rating layer. Without `--layer` or `--infer-layer` the entry's
/// earliest attested layer is used; the demonstration grammar falls back to
/// its classical layer when the entry is unattested.
fn session_context(args: &Args, analyzer: &Analyzer, entry: &str) -> anyhow::Result<Context> {
    let mut ctx = Context::default();
    if let Some(layer) = args.layer {
        ctx.layer.set_layer(ChronologicalLayer(layer));
    } else if args.infer_layer {
        let layer = ctx.layer.set_layer_by_entry(analyzer.ratings(), entry)?;
        tracing::info!(%layer, "inferred chronological layer");
    } else if args.ratio > 0.0 {
        match ctx.layer.set_layer_by_entry(analyzer.ratings(), entry) {
            Ok(layer) => tracing::info!(%layer, "inferred chronological layer"),
            Err(_) if args.bundle.is_none() => {
                ctx.layer.set_layer(sample::CLASSICAL);
                tracing::info!(layer = %sample::CLASSICAL, "entry unattested, using the classical layer");
            }
            Err(err) => bail!("{err}; pass --layer N, or --ratio 0 to disable frequency ratings"),
        }
    }
    Ok(ctx)
}

fn read_stdin() -> anyhow::Result<String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).context("failed to read stdin")?;
    Ok(buffer.trim().to_string())
}

/// `POSITION=TERM` pairs into a parameter vector. TERM is a numeric id or a term label.
fn parse_params(specs: &[String], terms: &TermIndex) -> anyhow::Result<ParameterVector> {
    let mut parameters = ParameterVector::wildcard();
    for spec in specs {
        let Some((position, term)) = spec.split_once('=') else {
            bail!("invalid --param '{spec}' (expected POS=TERM)");
        };
        let position: usize = position.trim().parse().with_context(|| format!("invalid position in '{spec}'"))?;
        let term = term.trim();
        let id = match term.parse::<u8>() {
            Ok(id) => id,
            Err(_) => terms.id_of(term).with_context(|| format!("unknown term '{term}'"))?,
        };
        parameters.set(position, id)?;
    }
    Ok(parameters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use padaccheda::ParseOutcome;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("padaccheda").chain(argv.iter().copied())).unwrap()
    }

    fn layer_for(argv: &[&str]) -> Option<ChronologicalLayer> {
        let args = args(argv);
        let analyzer = sample::analyzer().unwrap();
        let entry = args.entry.clone().unwrap();
        session_context(&args, &analyzer, &entry).unwrap().layer.layer()
    }

    #[test]
    fn bare_entry_parses_with_an_inferred_layer() {
        let args = args(&["gateti"]);
        let analyzer = sample::analyzer().unwrap();
        let ctx = session_context(&args, &analyzer, "gateti").unwrap();
        assert_eq!(ctx.layer.layer(), Some(sample::CLASSICAL));

        let opts = Options { debug_mode: args.debug, freq_rating_ratio: args.ratio };
        let outcome = analyzer.parse(ParseRequest::new("gateti", &args.label), &ctx, &opts).unwrap();
        assert!(matches!(outcome, ParseOutcome::Solved(ref tree) if !tree.is_empty()));
    }

    #[test]
    fn unattested_entry_falls_back_to_classical_for_the_sample_grammar() {
        assert_eq!(layer_for(&["--label", "np", "devālayāḥ"]), Some(sample::CLASSICAL));
    }

    #[test]
    fn explicit_layer_flags_win() {
        assert_eq!(layer_for(&["--layer", "1", "gateti"]), Some(sample::VEDIC));
        assert_eq!(layer_for(&["--infer-layer", "tat"]), Some(sample::VEDIC));
    }

    #[test]
    fn zero_ratio_needs_no_layer() {
        assert_eq!(layer_for(&["--ratio", "0", "devālayāḥ"]), None);
    }

    #[test]
    fn unattested_entry_with_a_bundle_asks_for_a_layer() {
        let args = args(&["--bundle", "grammar.json", "devālayāḥ"]);
        let analyzer = sample::analyzer().unwrap();
        let err = session_context(&args, &analyzer, "devālayāḥ").unwrap_err();
        assert!(err.to_string().contains("--layer"));
    }

    #[test]
    fn infer_layer_on_an_unattested_entry_fails() {
        let args = args(&["--infer-layer", "devālayāḥ"]);
        let analyzer = sample::analyzer().unwrap();
        assert!(session_context(&args, &analyzer, "devālayāḥ").is_err());
    }
}
