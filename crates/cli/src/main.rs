use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use octo_api::{ConnectionSettings, OctoError, lookups};
use octo_util::{DefaultSource, REDACTED, try_join_list};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Look up environments, deployment targets and projects on an Octopus Deploy server.
#[derive(Parser, Debug)]
#[command(name = "octo", version, about)]
struct Cli {
    /// API key; defaults to OCTOPUS_API_KEY, the keychain or the defaults file
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Server address or DNS name; defaults to OCTOPUS_SERVER or the defaults file
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every environment as {id, name}
    Environments,
    /// Names of the machines in an environment
    EnvironmentMachines {
        environment_id: String,
        #[arg(long)]
        enabled_only: bool,
    },
    /// Names of the machines carrying a role, optionally within one environment
    RoleMachines {
        role: String,
        #[arg(long)]
        environment: Option<String>,
        #[arg(long)]
        enabled_only: bool,
    },
    /// Full records of the machines with a thumbprint
    Thumbprint {
        thumbprint: String,
        #[arg(long)]
        enabled_only: bool,
    },
    /// Names of the machines whose address contains `<NAME>.`
    Tentacle {
        name: String,
        #[arg(long)]
        enabled_only: bool,
    },
    /// Projects matching a name
    Project { name: String },
    /// Join stdin lines with commas
    Join,
    /// Show where the api key and server come from
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Err(error) => {
            if let Some(hint) = error.downcast_ref::<OctoError>().and_then(OctoError::hint) {
                eprintln!("{hint}");
            }
            Err(error)
        }
        ok => ok,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

async fn run(cli: Cli) -> Result<()> {
    let Cli {
        api_key,
        server,
        command,
    } = cli;
    if let Command::Join = command {
        return join_stdin();
    }

    let mut settings = ConnectionSettings::from_user_defaults();
    settings.api_key = api_key;
    settings.server = server;
    run_lookup(command, &settings).await
}

async fn run_lookup(command: Command, settings: &ConnectionSettings) -> Result<()> {
    match command {
        Command::Environments => print_json(&lookups::list_environments(settings).await?),
        Command::EnvironmentMachines {
            environment_id,
            enabled_only,
        } => print_lines(lookups::machines_in_environment(settings, &environment_id, enabled_only).await?),
        Command::RoleMachines {
            role,
            environment: Some(environment_id),
            enabled_only,
        } => print_lines(lookups::machines_in_role_and_environment(settings, &role, &environment_id, enabled_only).await?),
        Command::RoleMachines {
            role,
            environment: None,
            enabled_only,
        } => print_lines(lookups::machines_in_role(settings, &role, enabled_only).await?),
        Command::Thumbprint {
            thumbprint,
            enabled_only,
        } => print_json(&lookups::machines_by_thumbprint(settings, &thumbprint, enabled_only).await?),
        Command::Tentacle { name, enabled_only } => {
            print_lines(lookups::machines_by_tentacle_name(settings, &name, enabled_only).await?)
        }
        Command::Project { name } => match lookups::project_by_name(settings, &name).await? {
            Some(projects) => print_json(&projects),
            None => {
                eprintln!("no results");
                Ok(())
            }
        },
        Command::Config => print_json(&describe_config(settings)),
        Command::Join => join_stdin(),
    }
}

fn join_stdin() -> Result<()> {
    let stdin = io::stdin();
    let joined = try_join_list(stdin.lock().lines()).context("read stdin")?;
    if let Some(joined) = joined {
        println!("{joined}");
    }
    Ok(())
}

fn print_lines(lines: Vec<String>) -> Result<()> {
    let mut stdout = io::stdout().lock();
    for line in lines {
        writeln!(stdout, "{line}")?;
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct ConfigReport<'a> {
    api_key: Option<&'static str>,
    api_key_source: Option<&'static str>,
    server: Option<&'a str>,
    server_source: Option<&'static str>,
}

fn source_label(explicit: bool, default: Option<DefaultSource>) -> Option<&'static str> {
    if explicit {
        return Some("argument");
    }
    default.map(|source| match source {
        DefaultSource::Environment => "environment",
        DefaultSource::Keychain => "keychain",
        DefaultSource::File => "defaults file",
    })
}

fn describe_config(settings: &ConnectionSettings) -> ConfigReport<'_> {
    let explicit_key = settings.api_key.as_deref().is_some_and(|key| !key.trim().is_empty());
    let explicit_server = settings.server.as_deref().filter(|server| !server.trim().is_empty());
    let api_key_source = source_label(explicit_key, settings.defaults.api_key_source());

    ConfigReport {
        api_key: api_key_source.map(|_| REDACTED),
        api_key_source,
        server: explicit_server.or(settings.defaults.server()),
        server_source: source_label(explicit_server.is_some(), settings.defaults.server_source()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octo_util::UserDefaults;

    #[test]
    fn cli_parses_role_with_environment() {
        let cli = Cli::parse_from([
            "octo",
            "--server",
            "deploy.example",
            "role-machines",
            "web",
            "--environment",
            "Environments-1",
            "--enabled-only",
        ]);
        assert_eq!(cli.server.as_deref(), Some("deploy.example"));
        match cli.command {
            Command::RoleMachines {
                role,
                environment,
                enabled_only,
            } => {
                assert_eq!(role, "web");
                assert_eq!(environment.as_deref(), Some("Environments-1"));
                assert!(enabled_only);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn config_report_prefers_arguments_and_hides_key() {
        let settings = ConnectionSettings::new(UserDefaults::new(Some("API-DEFAULT".into()), Some("default.example".into())))
            .with_api_key("API-EXPLICIT");
        let report = serde_json::to_value(describe_config(&settings)).unwrap();
        assert_eq!(report["api_key"], REDACTED);
        assert_eq!(report["api_key_source"], "argument");
        assert_eq!(report["server"], "default.example");
        assert_eq!(report["server_source"], "defaults file");
    }

    #[test]
    fn config_report_with_nothing_configured() {
        let settings = ConnectionSettings::new(UserDefaults::empty());
        let report = serde_json::to_value(describe_config(&settings)).unwrap();
        assert!(report["api_key"].is_null());
        assert!(report["server_source"].is_null());
    }
}
