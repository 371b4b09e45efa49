use std::env;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::slice;

use clap::Args;
use owo_colors::OwoColorize;
use tracing::debug;

use crate::config::{self, OutputFormat, ProfileConfig};
use crate::rchain::agents::{AgentFinish, AgentOutput, ToolAgentAction};
use crate::rchain::output_parsers::MultiActionAgentOutputParser;
use crate::rchain::output_parsers::tools::ToolsAgentOutputParser;
use crate::rchain::wire;

#[derive(Debug, Args, Clone)]
pub struct ParseArgs {
    /// Chat-completions response or message JSON. Reads stdin when omitted.
    pub input: Option<PathBuf>,
    /// Shorthand for `--output json`.
    #[arg(long)]
    pub json: bool,
    #[arg(long, value_enum)]
    pub output: Option<OutputFormat>,
    /// Profile name from the config file.
    #[arg(long)]
    pub profile: Option<String>,
    /// Print the invocation log of each action.
    #[arg(long)]
    pub show_log: bool,
    #[arg(long)]
    pub no_color: bool,
    /// Log parser decisions to stderr.
    #[arg(long)]
    pub verbose: bool,
    /// Silence all logs; errors are still reported.
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy)]
struct Settings {
    output: OutputFormat,
    color: bool,
    show_log: bool,
}

pub fn run(args: ParseArgs) -> Result<(), String> {
    let settings = resolve_settings(&args)?;
    let raw = read_input(args.input.as_deref())?;

    let generation =
        wire::generation_from_str(&raw).map_err(|err| format!("Failed to decode input: {err}"))?;
    let parser = ToolsAgentOutputParser::new();
    debug!(parser = parser.parser_type(), "parsing generation");
    let output = parser
        .parse_result(slice::from_ref(&generation), false)
        .map_err(|err| format!("Failed to parse generation: {err}"))?;

    match settings.output {
        OutputFormat::Json => {
            let rendered = serde_json::to_string_pretty(&output)
                .map_err(|err| format!("Failed to serialize result: {err}"))?;
            println!("{rendered}");
        }
        OutputFormat::Text => print_text(&output, settings),
    }
    Ok(())
}

fn resolve_settings(args: &ParseArgs) -> Result<Settings, String> {
    let profile = match &args.profile {
        Some(name) => config::load_profile(name)?,
        None => ProfileConfig::default(),
    };

    let env_output = match env::var("RCA_OUTPUT") {
        Ok(value) if !value.trim().is_empty() => Some(
            OutputFormat::parse(&value).map_err(|err| format!("RCA_OUTPUT: {err}"))?,
        ),
        _ => None,
    };

    let output = if args.json {
        OutputFormat::Json
    } else if let Some(output) = args.output {
        output
    } else if let Some(output) = env_output {
        output
    } else {
        profile.output_format()?.unwrap_or(OutputFormat::Text)
    };

    let color =
        !args.no_color && profile.color.unwrap_or(true) && io::stdout().is_terminal();

    Ok(Settings {
        output,
        color,
        show_log: args.show_log || profile.show_log.unwrap_or(false),
    })
}

fn read_input(path: Option<&Path>) -> Result<String, String> {
    let raw = match path {
        Some(path) => fs::read_to_string(path)
            .map_err(|err| format!("Failed to read input file '{}': {err}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|err| format!("Failed to read stdin: {err}"))?;
            buffer
        }
    };

    if raw.trim().is_empty() {
        return Err("No input provided. Pass a FILE or pipe JSON on stdin.".to_string());
    }
    Ok(raw)
}

fn print_text(output: &AgentOutput, settings: Settings) {
    match output {
        AgentOutput::Finish(finish) => print_finish(finish, settings),
        AgentOutput::Actions(actions) => {
            for (index, action) in actions.iter().enumerate() {
                print_action(index + 1, action, settings);
            }
        }
    }
}

fn print_finish(finish: &AgentFinish, settings: Settings) {
    if settings.color {
        println!("{}", "finish".bold().green());
    } else {
        println!("finish");
    }
    println!("{}", finish.output);
}

fn print_action(position: usize, action: &ToolAgentAction, settings: Settings) {
    let header = format!("action {position}: {} ({})", action.tool, action.tool_call_id);
    if settings.color {
        println!("{}", header.bold().cyan());
    } else {
        println!("{header}");
    }
    println!("  input: {}", action.tool_input);
    if settings.show_log {
        for line in action.log.lines().filter(|line| !line.is_empty()) {
            if settings.color {
                println!("  {}", line.dimmed());
            } else {
                println!("  {line}");
            }
        }
    }
}
