mod config;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use preferred_pictures_shared::{ChooseRequest, Client, LegacyChooseRequest};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Overrides;

#[derive(Parser, Debug)]
#[command(name = "preferred_pictures")]
#[command(about = "Prints a signed Preferred Pictures choose URL")]
#[command(version)]
struct Cli {
    /// Account identity; falls back to PREFERRED_PICTURES_IDENTITY
    #[arg(long, global = true)]
    identity: Option<String>,

    /// Signing secret; falls back to PREFERRED_PICTURES_SECRET_KEY
    #[arg(long, global = true)]
    secret_key: Option<String>,

    /// Base URL ending in `/`; falls back to PREFERRED_PICTURES_ENDPOINT
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Largest accepted choice list; falls back to PREFERRED_PICTURES_MAX_CHOICES
    #[arg(long, global = true)]
    max_choices: Option<usize>,

    #[arg(long, value_enum, default_value_t = Output::Plain, global = true)]
    output: Output,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a `choose` URL
    Choose(ChooseArgs),
    /// Build a legacy `choose-url` URL
    #[command(name = "choose-url")]
    ChooseUrl(LegacyArgs),
}

#[derive(Args, Debug)]
struct ChooseArgs {
    #[arg(long)]
    tournament: String,
    /// May be repeated; order is kept
    #[arg(long = "choice", required = true)]
    choices: Vec<String>,
    /// May be repeated; paired with choices by position
    #[arg(long = "destination")]
    destinations: Vec<String>,
    #[arg(long)]
    choices_prefix: Option<String>,
    #[arg(long)]
    choices_suffix: Option<String>,
    #[arg(long)]
    destinations_prefix: Option<String>,
    #[arg(long)]
    destinations_suffix: Option<String>,
    #[arg(long, default_value_t = 600, allow_negative_numbers = true)]
    ttl: i64,
    #[arg(long, default_value_t = 3600, allow_negative_numbers = true)]
    expiration_ttl: i64,
    /// Redirect straight to a previously recorded choice
    #[arg(long)]
    go: bool,
    /// Ask the API for JSON rather than a redirect
    #[arg(long)]
    json: bool,
    #[arg(long)]
    uid: Option<String>,
}

#[derive(Args, Debug)]
struct LegacyArgs {
    #[arg(long)]
    tournament: String,
    #[arg(long = "choice", required = true)]
    choices: Vec<String>,
    #[arg(long)]
    prefix: Option<String>,
    #[arg(long)]
    suffix: Option<String>,
    #[arg(long, default_value_t = 600, allow_negative_numbers = true)]
    ttl: i64,
    #[arg(long, default_value_t = 3600, allow_negative_numbers = true)]
    expiration_ttl: i64,
    #[arg(long)]
    uid: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Output {
    Plain,
    Json,
}

#[derive(Serialize)]
struct UrlOutput<'a> {
    url: &'a str,
}

impl From<ChooseArgs> for ChooseRequest {
    fn from(args: ChooseArgs) -> Self {
        ChooseRequest {
            destinations: Some(args.destinations).filter(|d| !d.is_empty()),
            choices_prefix: args.choices_prefix,
            choices_suffix: args.choices_suffix,
            destinations_prefix: args.destinations_prefix,
            destinations_suffix: args.destinations_suffix,
            go: args.go,
            json: args.json,
            uid: args.uid,
            ..ChooseRequest::new(args.choices, args.tournament)
                .ttl(args.ttl)
                .expiration_ttl(args.expiration_ttl)
        }
    }
}

impl From<LegacyArgs> for LegacyChooseRequest {
    fn from(args: LegacyArgs) -> Self {
        LegacyChooseRequest {
            prefix: args.prefix,
            suffix: args.suffix,
            uid: args.uid,
            ..LegacyChooseRequest::new(args.choices, args.tournament)
                .ttl(args.ttl)
                .expiration_ttl(args.expiration_ttl)
        }
    }
}

fn main() -> Result<(), anyhow::Error> {
    // stdout carries the URL only
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let output = cli.output;
    let url = run(cli)?;

    match output {
        Output::Plain => println!("{url}"),
        Output::Json => println!(
            "{}",
            serde_json::to_string(&UrlOutput { url: &url }).context("Failed to render JSON")?
        ),
    }

    Ok(())
}

fn run(cli: Cli) -> Result<String, anyhow::Error> {
    let config = config::load_env(Overrides {
        identity: cli.identity,
        secret_key: cli.secret_key,
        endpoint: cli.endpoint,
        max_choices: cli.max_choices,
    })?;
    tracing::debug!(?config, "Loaded configuration");
    let client = Client::new(config);

    let url = match cli.command {
        Command::Choose(args) => client
            .choose_url(&args.into())
            .context("Failed to build choose URL")?,
        Command::ChooseUrl(args) => client
            .legacy_choose_url(&args.into())
            .context("Failed to build choose-url URL")?,
    };
    Ok(url)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use preferred_pictures_shared::ChooseError;

    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(
            ["preferred_pictures", "--identity", "me", "--secret-key", "s"]
                .iter()
                .chain(args),
        )
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_choose_args_to_request() -> Result<(), clap::Error> {
        let cli = parse(&[
            "choose",
            "--tournament",
            "t",
            "--choice",
            "red",
            "--choice",
            "green",
            "--ttl",
            "-1",
            "--json",
        ])?;
        let Command::Choose(args) = cli.command else {
            panic!("Expected choose")
        };
        let request: ChooseRequest = args.into();
        let expected = ChooseRequest::new(["red", "green"], "t").ttl(-1).json(true);
        assert_eq!(expected, request);
        Ok(())
    }

    #[test]
    fn test_legacy_args_to_request() -> Result<(), clap::Error> {
        let cli = parse(&[
            "choose-url",
            "--tournament",
            "t",
            "--choice",
            "a",
            "--prefix",
            "p/",
            "--uid",
            "U",
        ])?;
        let Command::ChooseUrl(args) = cli.command else {
            panic!("Expected choose-url")
        };
        let request: LegacyChooseRequest = args.into();
        assert_eq!(LegacyChooseRequest::new(["a"], "t").prefix("p/").uid("U"), request);
        Ok(())
    }

    #[test]
    fn test_run_builds_url() -> Result<(), anyhow::Error> {
        let cli = parse(&[
            "--endpoint",
            "http://localhost/",
            "choose",
            "--tournament",
            "t",
            "--choice",
            "a",
            "--destination",
            "https://d.test/",
        ])?;
        let url = run(cli)?;
        assert!(url.starts_with("http://localhost/choose?choices%5B%5D=a&"));
        assert!(url.contains("&destinations%5B%5D=https%3A%2F%2Fd.test%2F&"));
        Ok(())
    }

    #[test]
    fn test_run_too_many_choices() -> Result<(), anyhow::Error> {
        let cli = parse(&[
            "--max-choices",
            "1",
            "choose",
            "--tournament",
            "t",
            "--choice",
            "a",
            "--choice",
            "b",
        ])?;
        let error = run(cli).unwrap_err();
        assert_eq!(
            Some(&ChooseError::TooManyChoices { count: 2, max: 1 }),
            error.downcast_ref::<ChooseError>()
        );
        Ok(())
    }
}
