//! Debugger-style command lines.
//!
//! Script mode feeds one line per command, exactly as they would be typed at
//! a debugger prompt:
//!
//! ```text
//! load before.json
//! vis list.head slow fast
//! vis_record list.head after insert
//! vis_step 0
//! ```
//!
//! Every command prints exactly one JSON payload line; usage errors are
//! text payloads too, so the renderer never sees anything but JSON.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use ferroscope_core::image::MemoryImage;
use ferroscope_core::{TraversalOrder, Visualization, Visualizer};
use ferroscope_utils::{debug, info, warn};

/// One parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command
{
    /// `vis <expr> [highlight...]`
    Visualize
    {
        expr: String, highlights: Vec<String>
    },
    /// `vis_arr <expr> <size>`
    Array
    {
        expr: String, size: u64
    },
    /// `vis_vec <expr> [index...]`
    Contiguous
    {
        expr: String, indices: Vec<u64>
    },
    /// `vis_list <expr>`
    NodeList
    {
        expr: String
    },
    /// `vis_record <expr> [description]`
    Record
    {
        expr: String, description: String
    },
    /// `vis_step [n]`
    Step(Option<usize>),
    /// `vis_clear`
    Clear,
    /// `vis_trav <expr> [order] [step]`
    Traverse
    {
        expr: String,
        order: TraversalOrder,
        step: usize,
    },
    /// `load <image.json>`
    Load(PathBuf),
}

/// A line that is not a valid command
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError
{
    /// Missing or malformed arguments
    #[error("{0}")]
    Usage(&'static str),

    /// `vis_arr` without a size
    #[error("Error: Need array expression and size")]
    MissingSize,

    /// `vis_arr` with a size that is not a number
    #[error("Error: Size must be an integer")]
    InvalidSize,

    /// Not a known command word
    #[error("Unknown command: {0}")]
    Unknown(String),
}

const VIS_USAGE: &str = "Usage: vis <expression> [pointer1] [pointer2] ...";
const ARR_USAGE: &str = "Usage: vis_arr <array_expr> <size>";
const VEC_USAGE: &str = "Usage: vis_vec <vector_expr> [highlight_index1] [highlight_index2] ...";
const LIST_USAGE: &str = "Usage: vis_list <std_list_expr>";
const RECORD_USAGE: &str = "Usage: vis_record <expr> <description>";
const TRAV_USAGE: &str = "Usage: vis_trav <tree_expr> [bfs|inorder] [step_number]";
const LOAD_USAGE: &str = "Usage: load <image.json>";

/// Parse one line; `Ok(None)` for blank lines and `#` comments
///
/// ## Errors
///
/// Returns a [`CommandError`] describing the expected usage.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError>
{
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let mut args = rest.split_whitespace();

    let command = match word {
        "vis" => {
            let expr = args.next().ok_or(CommandError::Usage(VIS_USAGE))?;
            Command::Visualize {
                expr: expr.to_string(),
                highlights: args.map(str::to_string).collect(),
            }
        }
        "vis_arr" => {
            let expr = args.next().ok_or(CommandError::Usage(ARR_USAGE))?;
            let size = args.next().ok_or(CommandError::MissingSize)?;
            Command::Array {
                expr: expr.to_string(),
                size: size.parse().map_err(|_| CommandError::InvalidSize)?,
            }
        }
        "vis_vec" => {
            let expr = args.next().ok_or(CommandError::Usage(VEC_USAGE))?;
            // Indices that are not numbers are ignored
            Command::Contiguous {
                expr: expr.to_string(),
                indices: args.filter_map(|index| index.parse().ok()).collect(),
            }
        }
        "vis_list" => {
            let expr = args.next().ok_or(CommandError::Usage(LIST_USAGE))?;
            Command::NodeList { expr: expr.to_string() }
        }
        "vis_record" => {
            let (expr, description) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if expr.is_empty() {
                return Err(CommandError::Usage(RECORD_USAGE));
            }
            Command::Record {
                expr: expr.to_string(),
                description: unquote(description.trim()).to_string(),
            }
        }
        "vis_step" => Command::Step(parse_step(rest)),
        "vis_clear" => Command::Clear,
        "vis_trav" => {
            let expr = args.next().ok_or(CommandError::Usage(TRAV_USAGE))?;
            let order = args.next().map_or(TraversalOrder::Bfs, TraversalOrder::from_name);
            let step = match args.next() {
                Some(step) => step.parse().map_err(|_| CommandError::Usage(TRAV_USAGE))?,
                None => 0,
            };
            Command::Traverse {
                expr: expr.to_string(),
                order,
                step,
            }
        }
        "load" => {
            if rest.is_empty() {
                return Err(CommandError::Usage(LOAD_USAGE));
            }
            Command::Load(PathBuf::from(unquote(rest)))
        }
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

/// Step argument of `vis_step`: nothing or a non-number lists all steps
///
/// A negative number asks for a step that can never exist.
fn parse_step(arg: &str) -> Option<usize>
{
    let step: i64 = arg.parse().ok()?;
    Some(usize::try_from(step).unwrap_or(usize::MAX))
}

fn unquote(text: &str) -> &str
{
    for quote in ['\'', '"'] {
        if let Some(inner) = text.strip_prefix(quote).and_then(|t| t.strip_suffix(quote)) {
            return inner;
        }
    }
    text
}

/// Execute a command against the session
pub fn run(vis: &mut Visualizer<MemoryImage>, command: Command) -> Visualization
{
    debug!(?command, "run command");
    match command {
        Command::Visualize { expr, highlights } => vis.visualize(&expr, highlights.as_slice()),
        Command::Array { expr, size } => vis.visualize_array(&expr, size),
        Command::Contiguous { expr, indices } => vis.visualize_contiguous(&expr, indices.as_slice()),
        Command::NodeList { expr } => vis.visualize_node_list(&expr),
        Command::Record { expr, description } => vis.record_step(&expr, &description),
        Command::Step(step) => vis.show_step(step),
        Command::Clear => vis.clear_history(),
        Command::Traverse { expr, order, step } => vis.visualize_with_traversal(&expr, order, step),
        Command::Load(path) => match MemoryImage::load(&path) {
            Ok(image) => {
                vis.set_inspector(image);
                Visualization::text(format!("Loaded image: {}", path.display()))
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "image not loaded");
                Visualization::text(format!("Error: {e}"))
            }
        },
    }
}

/// Parse and execute one line; `None` for blank lines and comments
pub fn run_line(vis: &mut Visualizer<MemoryImage>, line: &str) -> Option<Visualization>
{
    match parse(line) {
        Ok(Some(command)) => Some(run(vis, command)),
        Ok(None) => None,
        Err(e) => Some(Visualization::text(e.to_string())),
    }
}

/// Run every line of `input`, writing one JSON payload per command to `output`
///
/// ## Errors
///
/// Returns an error if reading `input` or writing `output` fails.
pub fn run_script(vis: &mut Visualizer<MemoryImage>, input: impl BufRead, mut output: impl Write) -> std::io::Result<usize>
{
    let mut executed = 0;
    for line in input.lines() {
        let line = line?;
        if let Some(result) = run_line(vis, &line) {
            writeln!(output, "{}", result.present().to_json())?;
            output.flush()?;
            executed += 1;
        }
    }
    info!(executed, "script finished");
    Ok(executed)
}

#[cfg(test)]
mod tests
{
    use ferroscope_core::image::ValueSpec;
    use serde_json::Value;

    use super::*;

    fn session() -> Visualizer<MemoryImage>
    {
        let mut image = MemoryImage::new();
        let node = |data: i64, next: u64| {
            ValueSpec::structure("Node", [("data", ValueSpec::int(data)), ("next", ValueSpec::ptr(next, "Node"))])
        };
        image.insert_object(0x10u64, node(1, 0x20)).unwrap();
        image.insert_object(0x20u64, node(2, 0)).unwrap();
        image.bind("head", ValueSpec::ptr(0x10, "Node"));
        image.bind("slow", ValueSpec::ptr(0x20, "Node"));
        Visualizer::new(image)
    }

    fn lines(output: &[u8]) -> Vec<Value>
    {
        String::from_utf8_lossy(output)
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_parse_commands()
    {
        assert_eq!(
            parse("vis head slow fast").unwrap(),
            Some(Command::Visualize {
                expr: "head".to_string(),
                highlights: vec!["slow".to_string(), "fast".to_string()],
            })
        );
        assert_eq!(
            parse("vis_arr arr 10").unwrap(),
            Some(Command::Array {
                expr: "arr".to_string(),
                size: 10
            })
        );
        assert_eq!(
            parse("vis_vec v 0 x 5").unwrap(),
            Some(Command::Contiguous {
                expr: "v".to_string(),
                indices: vec![0, 5]
            })
        );
        assert_eq!(
            parse("vis_record head 'After inserting node'").unwrap(),
            Some(Command::Record {
                expr: "head".to_string(),
                description: "After inserting node".to_string()
            })
        );
        assert_eq!(
            parse("vis_trav root inorder 3").unwrap(),
            Some(Command::Traverse {
                expr: "root".to_string(),
                order: TraversalOrder::Inorder,
                step: 3
            })
        );
        assert_eq!(parse("vis_clear").unwrap(), Some(Command::Clear));
        assert_eq!(parse("load images/a.json").unwrap(), Some(Command::Load(PathBuf::from("images/a.json"))));
    }

    #[test]
    fn test_parse_step_argument()
    {
        assert_eq!(parse("vis_step").unwrap(), Some(Command::Step(None)));
        assert_eq!(parse("vis_step 2").unwrap(), Some(Command::Step(Some(2))));
        assert_eq!(parse("vis_step two").unwrap(), Some(Command::Step(None)));
        assert_eq!(parse("vis_step -1").unwrap(), Some(Command::Step(Some(usize::MAX))));
    }

    #[test]
    fn test_parse_errors()
    {
        assert_eq!(parse("vis").unwrap_err(), CommandError::Usage(VIS_USAGE));
        assert_eq!(parse("vis_arr arr").unwrap_err(), CommandError::MissingSize);
        assert_eq!(parse("vis_arr arr ten").unwrap_err(), CommandError::InvalidSize);
        assert_eq!(parse("vis_record").unwrap_err(), CommandError::Usage(RECORD_USAGE));
        assert_eq!(parse("frobnicate x").unwrap_err(), CommandError::Unknown("frobnicate".to_string()));
        assert_eq!(parse("   ").unwrap(), None);
        assert_eq!(parse("# comment").unwrap(), None);
    }

    #[test]
    fn test_script_prints_one_payload_per_command()
    {
        let mut vis = session();
        let script = "\
# two-pointer walk
vis head slow
vis_record head initial

vis_step 0
vis_step 7
vis_step
bogus
";
        let mut output = Vec::new();
        let executed = run_script(&mut vis, script.as_bytes(), &mut output).unwrap();
        assert_eq!(executed, 6);

        let payloads = lines(&output);
        assert_eq!(payloads.len(), 6);
        assert_eq!(payloads[0]["kind"]["graph"], Value::Bool(true));
        assert_eq!(payloads[0]["nodes"][1]["label"], "2\n[slow]");
        assert_eq!(payloads[1]["text"], "Step 0 recorded: initial");
        assert_eq!(payloads[2]["nodes"][0]["id"], "step_info");
        assert_eq!(payloads[3]["text"], "Invalid step. History has 1 steps (0-0)");
        assert_eq!(payloads[4]["text"], "Recorded Steps:\n  [0] initial\n");
        assert_eq!(payloads[5]["text"], "Unknown command: bogus");
    }

    #[test]
    fn test_load_failure_is_reported()
    {
        let mut vis = session();
        let result = run_line(&mut vis, "load /nonexistent/ferroscope/image.json").unwrap();
        assert!(result.as_text().unwrap().starts_with("Error: IO error"));
        // The previous image stays in place
        assert!(run_line(&mut vis, "vis head").unwrap().as_graph().is_some());
    }
}
