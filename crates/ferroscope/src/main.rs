mod commands;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use ferroscope_core::image::MemoryImage;
use ferroscope_core::{Limits, TraversalOrder, Visualizer};
use ferroscope_utils::{debug, info, init_logging, init_logging_with_level, LimitOverrides, LogFormat, LogLevel, LoggingGuard};

use crate::commands::Command;

/// Render linked lists, trees, arrays and containers from a heap image as JSON payloads.
#[derive(Parser, Debug)]
#[command(name = "ferroscope")]
#[command(version)]
#[command(about = "Render pointer structures from a heap image as graph and table payloads", long_about = None)]
struct Cli
{
    /// Heap image (JSON) to inspect
    #[arg(short, long, global = true)]
    image: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace). Overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log format (pretty, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Deepest list node followed before truncating
    #[arg(long, global = true)]
    list_depth: Option<usize>,

    /// Deepest tree node followed before truncating
    #[arg(long, global = true)]
    tree_depth: Option<usize>,

    /// Most nodes shown for a standard node list
    #[arg(long, global = true)]
    list_nodes: Option<usize>,

    /// Widest table cell, in characters
    #[arg(long, global = true)]
    cell_width: Option<usize>,

    /// Most cells shown for an array or vector
    #[arg(long, global = true)]
    table_cells: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Visualize any expression, highlighting where the given pointers point
    Vis
    {
        /// Expression to visualize
        expr: String,
        /// Pointer variables to highlight
        highlights: Vec<String>,
    },
    /// Show an array or pointer as a table of `size` cells
    Arr
    {
        /// Array or pointer expression
        expr: String,
        /// Number of elements
        size: u64,
    },
    /// Show a contiguous container as a table
    Vec
    {
        /// Container expression
        expr: String,
        /// Element indices to highlight
        indices: Vec<u64>,
    },
    /// Show a standard node list as a chain
    List
    {
        /// List expression
        expr: String,
    },
    /// Highlight one step of a binary-tree traversal
    Trav
    {
        /// Tree root expression
        expr: String,
        /// Traversal order (bfs, inorder)
        #[arg(default_value = "bfs")]
        order: String,
        /// 0-based step to highlight
        #[arg(default_value_t = 0)]
        step: usize,
    },
    /// Run debugger-style commands (vis, vis_record, vis_step, load, ...) one per line
    Script
    {
        /// Script file; standard input if omitted
        file: Option<PathBuf>,
    },
}

fn main()
{
    let cli = Cli::parse();

    let _guard = match start_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Flags win over the environment; with neither, RUST_LOG decides
fn start_logging(cli: &Cli) -> Result<LoggingGuard, Box<dyn std::error::Error>>
{
    if cli.log_level.is_none() && cli.log_format.is_none() {
        return Ok(init_logging()?);
    }
    let level = match &cli.log_level {
        Some(level) => level.parse()?,
        None => LogLevel::Warn,
    };
    let format = match &cli.log_format {
        Some(format) => format.parse()?,
        None => LogFormat::default(),
    };
    Ok(init_logging_with_level(level, format)?)
}

/// Built-in bounds, then environment overrides, then flags
fn limits(cli: &Cli) -> Result<Limits, Box<dyn std::error::Error>>
{
    let flags = LimitOverrides {
        list_depth: cli.list_depth,
        tree_depth: cli.tree_depth,
        list_nodes: cli.list_nodes,
        cell_width: cli.cell_width,
        table_cells: cli.table_cells,
    };
    let overrides = flags.or(LimitOverrides::from_env()?);
    let defaults = Limits::default();
    let limits = Limits {
        list_depth: overrides.list_depth.unwrap_or(defaults.list_depth),
        tree_depth: overrides.tree_depth.unwrap_or(defaults.tree_depth),
        node_list_nodes: overrides.list_nodes.unwrap_or(defaults.node_list_nodes),
        cell_chars: overrides.cell_width.unwrap_or(defaults.cell_chars),
        table_cells: overrides.table_cells.unwrap_or(defaults.table_cells),
        ..defaults
    };
    debug!(?limits, "traversal limits");
    Ok(limits)
}

fn run_command(cli: Cli) -> Result<(), Box<dyn std::error::Error>>
{
    let limits = limits(&cli)?;
    let image = match &cli.image {
        Some(path) => MemoryImage::load(path)?,
        None => MemoryImage::new(),
    };
    let mut vis = Visualizer::new(image).with_limits(limits);
    let mut stdout = io::stdout().lock();

    let command = match cli.command {
        Commands::Script { file } => {
            let input: Box<dyn BufRead> = match file {
                Some(path) => {
                    info!(path = %path.display(), "running script");
                    Box::new(BufReader::new(File::open(path)?))
                }
                None => Box::new(io::stdin().lock()),
            };
            commands::run_script(&mut vis, input, &mut stdout)?;
            return Ok(());
        }
        Commands::Vis { expr, highlights } => Command::Visualize { expr, highlights },
        Commands::Arr { expr, size } => Command::Array { expr, size },
        Commands::Vec { expr, indices } => Command::Contiguous { expr, indices },
        Commands::List { expr } => Command::NodeList { expr },
        Commands::Trav { expr, order, step } => Command::Traverse {
            expr,
            order: TraversalOrder::from_name(&order),
            step,
        },
    };

    let result = commands::run(&mut vis, command);
    writeln!(stdout, "{}", result.present().to_json())?;
    Ok(())
}
