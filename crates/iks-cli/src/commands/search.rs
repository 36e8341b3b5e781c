use std::error::Error;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use clap::{Args as ClapArgs, ValueEnum};
use iks_core::{Diagnostic, DiagnosticSink, Graph, ProgressObserver};
use iks_search::{search_with, Method, SearchHooks, SearchOptions};

#[derive(ClapArgs, Debug)]
pub struct SearchArgs {
    /// JSON file holding the problem graph (mapping entries or a matrix).
    #[arg(long)]
    pub input: PathBuf,
    /// Optional YAML file with search options; flags below override it.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Number of lowest-energy states to return.
    #[arg(long)]
    pub num_states: Option<usize>,
    /// Execution backend.
    #[arg(long, value_enum)]
    pub method: Option<MethodArg>,
    /// Return energies without decoding spin assignments.
    #[arg(long)]
    pub energies_only: bool,
    /// Fixed chunk exponent, bypassing the memory-derived choice.
    #[arg(long)]
    pub chunk_exponent: Option<u32>,
    /// Fixed memory budget in bytes, bypassing the probe.
    #[arg(long)]
    pub memory_budget: Option<u64>,
    /// Print per-chunk progress to stderr.
    #[arg(long)]
    pub progress: bool,
    /// Print orchestration diagnostics to stderr as JSON lines.
    #[arg(long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum MethodArg {
    Auto,
    Cpu,
    Gpu,
}

impl From<MethodArg> for Method {
    fn from(arg: MethodArg) -> Method {
        match arg {
            MethodArg::Auto => Method::Auto,
            MethodArg::Cpu => Method::Cpu,
            MethodArg::Gpu => Method::Gpu,
        }
    }
}

pub fn run(args: &SearchArgs) -> Result<(), Box<dyn Error>> {
    let graph: Graph = serde_json::from_str(&fs::read_to_string(&args.input)?)?;
    let options = resolve_options(args)?;

    let mut progress = StderrProgress {
        enabled: args.progress,
    };
    let mut diagnostics = StderrDiagnostics {
        enabled: args.verbose,
    };
    let result = search_with(
        &graph,
        &options,
        &mut SearchHooks {
            progress: &mut progress,
            diagnostics: &mut diagnostics,
        },
    )?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn resolve_options(args: &SearchArgs) -> Result<SearchOptions, Box<dyn Error>> {
    let mut options = match &args.config {
        Some(path) => load_options(path)?,
        None => SearchOptions::default(),
    };
    if let Some(num_states) = args.num_states {
        options.num_states = num_states;
    }
    if let Some(method) = args.method {
        options.method = method.into();
    }
    if args.energies_only {
        options.energies_only = true;
    }
    if let Some(exp) = args.chunk_exponent {
        options.chunk_exponent = Some(exp);
    }
    if let Some(bytes) = args.memory_budget {
        options.memory_budget = Some(bytes);
    }
    Ok(options)
}

fn load_options(path: &Path) -> Result<SearchOptions, Box<dyn Error>> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&contents)?)
}

struct StderrProgress {
    enabled: bool,
}

impl ProgressObserver for StderrProgress {
    fn states_processed(&mut self, count: u64) {
        if self.enabled {
            let _ = writeln!(std::io::stderr(), "states processed: {count}");
        }
    }
}

struct StderrDiagnostics {
    enabled: bool,
}

impl DiagnosticSink for StderrDiagnostics {
    fn record(&mut self, diagnostic: &Diagnostic) {
        if !self.enabled {
            return;
        }
        if let Ok(line) = serde_json::to_string(diagnostic) {
            let _ = writeln!(std::io::stderr(), "{line}");
        }
    }
}
