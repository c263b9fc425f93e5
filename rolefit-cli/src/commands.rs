//! CLI command definitions.
//!
//! Every command that talks to the backend names the screen it stands for,
//! so the route guard can decide whether it may run.

use clap::{Args, Parser, Subcommand};
use rolefit_client::api::database::ExportFormat;
use rolefit_client::api::devices::DeviceStatus;
use rolefit_client::api::tasks::TaskStatus;
use rolefit_client::RouteName;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;

use crate::output::wire_name;

const UNKNOWN_STATUS: &str = "unknown";

/// RoleFit fleet benchmarking client.
#[derive(Parser, Debug)]
#[command(name = "rolefit", author, version, about, long_about = None)]
pub struct Cli {
    /// Backend API root, overriding config and environment
    #[arg(long, global = true, env = "ROLEFIT_API_BASE_URL")]
    pub base_url: Option<String>,

    /// Print raw JSON instead of tables
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the session token
    Login(LoginArgs),

    /// Drop the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Inspect or create the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Fleet summary
    Dashboard,

    #[command(subcommand)]
    Devices(DeviceCommand),

    #[command(subcommand)]
    Tasks(TaskCommand),

    #[command(subcommand)]
    Results(ResultCommand),

    /// List positions
    Positions(PositionArgs),

    /// List the software catalog
    Software(SoftwareArgs),

    /// List test scripts
    Scripts(PageArgs),

    /// List script executions
    Executions(ExecutionArgs),

    #[command(subcommand)]
    Ai(AiCommand),

    /// Database export and import
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(short, long)]
    pub username: Option<String>,

    /// Read from the environment in scripts; prompted otherwise
    #[arg(long, env = "ROLEFIT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Run the interactive setup wizard
    Init,
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct PageArgs {
    #[arg(long)]
    pub page: Option<u32>,

    #[arg(long)]
    pub page_size: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum DeviceCommand {
    List {
        #[command(flatten)]
        page: PageArgs,
        /// registered, online, offline or testing
        #[arg(long, value_parser = parse_device_status)]
        status: Option<DeviceStatus>,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        position: Option<String>,
        /// Matches name, hostname or IP
        #[arg(short, long)]
        keyword: Option<String>,
    },
    Get {
        id: String,
    },
    /// Latest metric, pending alerts and recent benchmarks
    Status {
        id: String,
    },
    /// Recent telemetry samples
    Metrics {
        id: String,
        #[arg(long)]
        seconds: Option<u32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    List {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long, value_parser = parse_task_status)]
        status: Option<TaskStatus>,
        #[arg(long = "type")]
        task_type: Option<String>,
    },
    Get {
        id: String,
    },
    /// Dispatch a task to devices
    Execute {
        id: String,
        #[arg(short, long = "device", required = true, num_args = 1..)]
        devices: Vec<String>,
    },
    Cancel {
        id: String,
        #[arg(long)]
        reason: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ResultCommand {
    List {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        device: Option<String>,
        #[arg(long)]
        task: Option<String>,
        /// Only results meeting (true) or failing (false) the position standard
        #[arg(long)]
        standard_met: Option<bool>,
    },
    Get {
        id: String,
    },
    /// Compare the latest results of several devices
    Compare {
        #[arg(required = true, num_args = 2..)]
        devices: Vec<String>,
    },
}

#[derive(Args, Debug)]
pub struct PositionArgs {
    #[command(flatten)]
    pub page: PageArgs,
    #[arg(long)]
    pub department: Option<String>,
}

#[derive(Args, Debug)]
pub struct SoftwareArgs {
    #[command(flatten)]
    pub page: PageArgs,
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Args, Debug)]
pub struct ExecutionArgs {
    #[command(flatten)]
    pub page: PageArgs,
    #[arg(long)]
    pub task: Option<String>,
    #[arg(long)]
    pub device: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum AiCommand {
    /// Analyze a device's recent telemetry
    Metrics {
        device: String,
        #[arg(long)]
        seconds: Option<u32>,
    },
    /// List stored analysis reports
    Reports {
        #[arg(long)]
        device: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Ask the configured LLM; a new session is started unless one is given
    Chat {
        message: String,
        #[arg(long)]
        session: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum DbCommand {
    Export {
        #[arg(value_parser = parse_export_format)]
        format: ExportFormat,
        /// Directory the dump is written to
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// Replace the backend database with a dump
    Import {
        file: PathBuf,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl Commands {
    /// Screen the command stands for, `None` for local-only commands.
    pub fn route(&self) -> Option<RouteName> {
        let route = match self {
            Commands::Login(_) => RouteName::Login,
            Commands::Logout | Commands::Config(_) => return None,
            Commands::Whoami | Commands::Dashboard => RouteName::Dashboard,
            Commands::Devices(DeviceCommand::List { .. }) => RouteName::DeviceList,
            Commands::Devices(_) => RouteName::DeviceDetail,
            Commands::Tasks(_) => RouteName::TaskList,
            Commands::Results(ResultCommand::List { .. }) => RouteName::ResultList,
            Commands::Results(ResultCommand::Get { .. }) => RouteName::ResultDetail,
            Commands::Results(ResultCommand::Compare { .. }) => RouteName::DeviceCompare,
            Commands::Positions(_) => RouteName::PositionList,
            Commands::Software(_) => RouteName::SoftwareList,
            Commands::Scripts(_) => RouteName::ScriptList,
            Commands::Executions(_) => RouteName::ExecutionList,
            Commands::Ai(AiCommand::Chat { .. }) => RouteName::Dashboard,
            Commands::Ai(_) => RouteName::DeviceDetail,
            Commands::Db(_) => RouteName::Settings,
        };
        Some(route)
    }
}

/// Status filter accepted by its wire name only; the catch-all variant is
/// not a filter.
fn parse_wire<T: DeserializeOwned + Serialize>(raw: &str) -> Result<T, String> {
    let value: T = serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|e| e.to_string())?;
    if raw == UNKNOWN_STATUS || wire_name(&value) != raw {
        return Err(format!("unknown status '{raw}'"));
    }
    Ok(value)
}

fn parse_device_status(raw: &str) -> Result<DeviceStatus, String> {
    parse_wire(raw)
}

fn parse_task_status(raw: &str) -> Result<TaskStatus, String> {
    parse_wire(raw)
}

fn parse_export_format(raw: &str) -> Result<ExportFormat, String> {
    raw.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_routes_for_commands() {
        let cli = Cli::parse_from(["rolefit", "devices", "get", "d1"]);
        assert_eq!(cli.command.route(), Some(RouteName::DeviceDetail));

        let cli = Cli::parse_from(["rolefit", "results", "compare", "d1", "d2"]);
        assert_eq!(cli.command.route(), Some(RouteName::DeviceCompare));

        let cli = Cli::parse_from(["rolefit", "config", "show"]);
        assert_eq!(cli.command.route(), None);
    }

    #[test]
    fn test_status_filters_follow_wire_names() {
        for status in [
            DeviceStatus::Registered,
            DeviceStatus::Online,
            DeviceStatus::Offline,
            DeviceStatus::Testing,
        ] {
            assert_eq!(parse_device_status(&wire_name(&status)), Ok(status));
        }
        for status in [
            TaskStatus::Pending,
            TaskStatus::Running,
            TaskStatus::Completed,
            TaskStatus::Failed,
            TaskStatus::Cancelled,
        ] {
            assert_eq!(parse_task_status(&wire_name(&status)), Ok(status));
        }
    }

    #[test]
    fn test_status_filter_rejects_unknown_names() {
        assert!(parse_device_status("Online").is_err());
        assert!(parse_device_status("unknown").is_err());
        assert!(parse_task_status("done").is_err());
        assert!(Cli::try_parse_from(["rolefit", "devices", "list", "--status", "asleep"]).is_err());
    }

    #[test]
    fn test_execute_requires_devices() {
        assert!(Cli::try_parse_from(["rolefit", "tasks", "execute", "t1"]).is_err());
        let cli = Cli::parse_from(["rolefit", "tasks", "execute", "t1", "-d", "d1", "d2"]);
        match cli.command {
            Commands::Tasks(TaskCommand::Execute { devices, .. }) => assert_eq!(devices, ["d1", "d2"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["rolefit", "dashboard", "--json", "--base-url", "http://10.0.0.5:8000/api"]);
        assert!(cli.json);
        assert_eq!(cli.base_url.as_deref(), Some("http://10.0.0.5:8000/api"));
    }

    #[test]
    fn test_export_format_parsing() {
        let cli = Cli::parse_from(["rolefit", "db", "export", "postgresql"]);
        assert!(matches!(
            cli.command,
            Commands::Db(DbCommand::Export { format: ExportFormat::Postgresql, .. })
        ));
        assert!(Cli::try_parse_from(["rolefit", "db", "export", "oracle"]).is_err());
    }
}
