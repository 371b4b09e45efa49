use std::io::{self, IsTerminal};
use std::process;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, shells};
use rchain_agents::commands::config::{self, ConfigArgs};
use rchain_agents::commands::parse::{self, ParseArgs};
use tracing_subscriber::{EnvFilter, fmt};

const ROOT_HELP_EXAMPLES: &str = "Examples:\n  rcagent parse response.json\n  curl -s ... | rcagent parse --json\n  rcagent config check --profile default\n  rcagent completion bash > ~/.local/share/bash-completion/completions/rcagent";

const PARSE_HELP_EXAMPLES: &str = "Examples:\n  rcagent parse response.json\n  rcagent parse --show-log message.json\n  cat response.json | rcagent parse --output json";

#[derive(Debug, Parser)]
#[command(
    name = "rcagent",
    about = "Turn tool-calling model replies into agent actions",
    after_help = ROOT_HELP_EXAMPLES
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(
        about = "Parse a model reply into tool actions or a final answer",
        after_help = PARSE_HELP_EXAMPLES
    )]
    Parse(ParseArgs),
    #[command(about = "Manage local config")]
    Config(ConfigArgs),
    #[command(about = "Generate shell completion script")]
    Completion {
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

fn print_completion(shell: CompletionShell) {
    let mut cmd = Cli::command();
    match shell {
        CompletionShell::Bash => generate(shells::Bash, &mut cmd, "rcagent", &mut io::stdout()),
        CompletionShell::Zsh => generate(shells::Zsh, &mut cmd, "rcagent", &mut io::stdout()),
        CompletionShell::Fish => generate(shells::Fish, &mut cmd, "rcagent", &mut io::stdout()),
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("off")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("RCA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .with_level(true)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse(args) => {
            init_tracing(args.verbose, args.quiet);
            parse::run(args)
        }
        Commands::Config(args) => config::run(args),
        Commands::Completion { shell } => {
            print_completion(shell);
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("{err}");
        process::exit(1);
    }
}
