use clap::{ArgAction, Parser, Subcommand};
use git_launcher::commands::*;
use git_launcher::core::{
    config::Config,
    error::Result,
    print_error, print_warning,
    search::GhSearch,
    TerminalChooser,
};
use std::env;

#[derive(Parser)]
#[command(name = "git-launcher")]
#[command(about = "Open a repository from a local clone cache and launch a command in it")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Repository URL, owner/repo, or search text (interactive pick when omitted)
    reference: Option<String>,

    /// Branch to check out (skips the branch prompt on first clone)
    #[arg(short = 'b', long = "branch")]
    branch: Option<String>,

    /// Provider alias from the config to launch
    #[arg(short = 'p', long = "provider", conflicts_with = "launch")]
    provider: Option<String>,

    /// Raw command to launch in the checkout
    #[arg(short = 'l', long = "launch")]
    launch: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List cached repositories
    Ls {
        /// Also list repositories that were evicted but are still in history
        #[arg(long)]
        history: bool,
    },
    /// Remove cached repositories (interactive when no names are given)
    Remove {
        /// Repositories to remove (owner/repo or a unique repo name)
        names: Vec<String>,
        /// Remove every expired repository without prompting
        #[arg(long, conflicts_with = "names")]
        expired: bool,
    },
    /// Show or change the configuration
    Config {
        /// Time-to-live for cached repositories, in days
        #[arg(long = "ttl-days")]
        ttl_days: Option<u64>,
        /// Directory holding the cached checkouts
        #[arg(long = "base-dir")]
        base_dir: Option<String>,
        /// Default provider alias
        #[arg(long = "provider")]
        provider: Option<String>,
        /// Clone with --depth 1
        #[arg(long, action = ArgAction::SetTrue, conflicts_with = "no_shallow")]
        shallow: bool,
        /// Clone full history
        #[arg(long = "no-shallow", action = ArgAction::SetTrue)]
        no_shallow: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Configure logging based on --debug flag; an explicit RUST_LOG wins
    if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", if cli.debug { "debug" } else { "info" });
    }
    env_logger::init();

    if let Err(e) = run(cli) {
        if e.is_canceled() {
            print_error("Canceled");
        } else {
            print_error(&e.to_string());
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    for warning in &config.warnings {
        print_warning(warning);
    }

    if !matches!(cli.command, Some(Commands::Config { .. })) {
        purge_stale(&config);
    }

    let chooser = TerminalChooser::default();
    let options = LaunchOptions {
        branch: cli.branch.as_deref(),
        provider: cli.provider.as_deref(),
        launch: cli.launch.as_deref(),
    };

    match cli.command {
        Some(Commands::Ls { history }) => execute_ls(&config, history),
        Some(Commands::Remove { names, expired }) => {
            let target = if expired {
                RemoveTarget::Expired
            } else if names.is_empty() {
                RemoveTarget::Interactive
            } else {
                RemoveTarget::Named(names)
            };
            execute_remove(&config, target, &chooser)
        }
        Some(Commands::Config {
            ttl_days,
            base_dir,
            provider,
            shallow,
            no_shallow,
        }) => {
            let update = ConfigUpdate {
                ttl_days,
                base_dir,
                default_provider: provider,
                shallow: match (shallow, no_shallow) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
            };
            execute_config(config, update)
        }
        None => match cli.reference.as_deref() {
            Some(reference) => {
                execute_open(&config, reference, options, &chooser, &GhSearch::default())
            }
            None => execute_pick(&config, options, &chooser),
        },
    }
}
