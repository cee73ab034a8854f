use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, WrapErr};
use gitlab_issue_tracker::{
    client::HttpConnector,
    config::{default_config_path, load_config, save_config, HarnessConfig},
    logging::{init_logging, LoggingConfig},
    registry, GitlabIssueTracker, ProblemSummary,
};
use tracing::info;

/// Files issues in a GitLab project the way an error tracker would
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Alternate path to the configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print the path to the configuration file and exit.
    #[arg(short, long)]
    print_config_path: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the registered issue trackers and their configuration fields
    Fields,
    /// Write a configuration file
    Init {
        #[arg(long)]
        endpoint: String,
        #[arg(long)]
        token: String,
        /// Project path, as namespace/project
        #[arg(long)]
        project: String,
        /// Comma separated labels for new issues
        #[arg(long)]
        labels: Option<String>,
    },
    /// Check the configuration against the GitLab server
    Validate,
    /// Create an issue and print its URL
    Create {
        /// Issue title, or the problem message when --environment is given
        #[arg(long)]
        title: String,
        /// Environment the problem occurred in; prefixes the title
        #[arg(long)]
        environment: Option<String>,
        /// Where the problem occurred, e.g. controller#action
        #[arg(long = "where", default_value = "")]
        location: String,
        #[arg(long, default_value = "")]
        body: String,
        /// Open the new issue in the browser
        #[arg(long)]
        open: bool,
    },
}

fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let args = Args::parse();
    let config_path = args.config.unwrap_or_else(default_config_path);

    if args.print_config_path {
        println!("{}", config_path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let log_guard = init_logging(LoggingConfig::from_env())
        .map_err(|e| eyre!("failed to initialize logging: {e}"))?;
    info!(version = env!("CARGO_PKG_VERSION"), "gitlab-issue starting up");

    registry::register_builtin();

    let outcome = run(args.command.unwrap_or(Command::Fields), &config_path);
    // flushes buffered file logs
    drop(log_guard);

    Ok(if outcome? { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Runs `command`; `false` when it completed but reported a failure
fn run(command: Command, config_path: &Path) -> color_eyre::Result<bool> {
    match command {
        Command::Fields => print_fields(),
        Command::Init { endpoint, token, project, labels } => {
            let config = HarnessConfig {
                endpoint,
                api_token: token,
                path_with_namespace: project,
                labels,
                ..HarnessConfig::default()
            };
            save_config(config_path, &config)?;
            println!("Wrote {}", config_path.display());
        },
        Command::Validate => {
            let tracker = tracker_from(config_path)?;
            let rt = runtime()?;

            let errors = rt.block_on(tracker.validate());
            if !errors.is_empty() {
                for error in &errors {
                    eprintln!("{error}");
                }
                return Ok(false);
            }
            println!("configuration is valid");
        },
        Command::Create { title, environment, location, body, open } => {
            let tracker = tracker_from(config_path)?;
            let rt = runtime()?;

            let title = match environment {
                Some(environment) => ProblemSummary {
                    environment: environment.into(),
                    location: location.into(),
                    message: title.into(),
                }
                .issue_title()
                .to_string(),
                None => title,
            };

            let issue = rt.block_on(tracker.create_issue(&title, &body))?;
            println!("{issue}");

            if open {
                open::that(issue.url.as_str()).wrap_err("failed to open browser")?;
            }
        },
    }

    Ok(true)
}

fn print_fields() {
    for descriptor in registry::descriptors() {
        let deprecated = if descriptor.deprecated { " (deprecated)" } else { "" };
        println!("{}{}", descriptor.label, deprecated);

        for (name, field) in descriptor.fields {
            let required = if field.required { "" } else { ", optional" };
            println!("  {name:<20} {} ({}{required})", field.label, field.placeholder);
        }
    }
}

fn tracker_from(config_path: &Path) -> color_eyre::Result<GitlabIssueTracker> {
    if !config_path.exists() {
        return Err(eyre!(
            "no configuration at {}; run `gitlab-issue init` first",
            config_path.display()
        ));
    }

    let config = load_config(config_path)?;
    let debug = std::env::var("GITLAB_ISSUE_DEBUG").is_ok();
    let connector = HttpConnector::new(config.request_config()).with_debug_logging(debug);

    Ok(GitlabIssueTracker::with_connector(config.tracker_params(), connector))
}

fn runtime() -> color_eyre::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().wrap_err("failed to create runtime")
}
