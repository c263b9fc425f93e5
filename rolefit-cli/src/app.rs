//! Command execution: guard check, API call, rendering.

use anyhow::{anyhow, bail, Result};
use rolefit_client::api::ai::ReportParams;
use rolefit_client::api::auth::Credentials;
use rolefit_client::api::database::ImportSummary;
use rolefit_client::api::devices::DeviceParams;
use rolefit_client::api::executions::ExecutionParams;
use rolefit_client::api::llm_config::OutgoingMessage;
use rolefit_client::api::positions::PositionParams;
use rolefit_client::api::results::ResultParams;
use rolefit_client::api::scripts::ScriptParams;
use rolefit_client::api::software::SoftwareParams;
use rolefit_client::api::tasks::TaskParams;
use rolefit_client::{ApiClient, AuthGuard, ClientConfig, Navigation, RouteName};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::commands::{
    AiCommand, Commands, ConfigCommand, DbCommand, DeviceCommand, ResultCommand, TaskCommand,
};
use crate::output::{opt, print_page_footer, print_table, score, when, wire_name, yes_no, Output};
use crate::wizard::{login_form, Prompt, SetupWizard};

pub const LOGIN_HINT: &str = "not logged in; run `rolefit login` first";

/// What the guard lets a command do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Run,
    /// Already logged in: show the dashboard instead.
    ShowDashboard,
    NeedsLogin,
}

pub fn admit(guard: &AuthGuard, command: &Commands) -> Admission {
    let Some(route) = command.route() else {
        return Admission::Run;
    };
    match guard.check(route) {
        Navigation::Proceed => Admission::Run,
        Navigation::Redirect(RouteName::Login) => Admission::NeedsLogin,
        Navigation::Redirect(_) => Admission::ShowDashboard,
    }
}

#[derive(Serialize)]
struct ConfigView<'a> {
    path: Option<PathBuf>,
    #[serde(flatten)]
    config: &'a ClientConfig,
    logged_in: bool,
}

pub struct App {
    config: ClientConfig,
    client: ApiClient,
    guard: AuthGuard,
    out: Output,
}

impl App {
    pub fn new(config: ClientConfig, client: ApiClient, out: Output) -> Self {
        let guard = AuthGuard::new(client.tokens().clone());
        Self {
            config,
            client,
            guard,
            out,
        }
    }

    pub async fn run(&self, command: Commands) -> Result<()> {
        match admit(&self.guard, &command) {
            Admission::Run => {}
            Admission::NeedsLogin => bail!(LOGIN_HINT),
            Admission::ShowDashboard => {
                self.out.note("✅ Already logged in.");
                return self.dashboard().await;
            }
        }

        match command {
            Commands::Login(args) => self.login(args.username, args.password).await,
            Commands::Logout => self.logout().await,
            Commands::Whoami => self.whoami().await,
            Commands::Config(ConfigCommand::Show) => self.config_show(),
            Commands::Config(ConfigCommand::Init) => SetupWizard::run(&self.config).await,
            Commands::Dashboard => self.dashboard().await,
            Commands::Devices(cmd) => self.devices(cmd).await,
            Commands::Tasks(cmd) => self.tasks(cmd).await,
            Commands::Results(cmd) => self.results(cmd).await,
            Commands::Positions(args) => {
                let params = PositionParams {
                    page: args.page.page,
                    page_size: args.page.page_size,
                    department: args.department,
                };
                let page = self.client.positions().list(&params).await?;
                self.out.emit(&page, |page| {
                    let rows: Vec<Vec<String>> = page
                        .items
                        .iter()
                        .map(|p| {
                            vec![
                                p.id.clone(),
                                p.position_code.clone(),
                                p.position_name.clone(),
                                opt(p.department.as_deref()),
                                yes_no(p.is_active).to_string(),
                            ]
                        })
                        .collect();
                    print_table(&["ID", "CODE", "NAME", "DEPARTMENT", "ACTIVE"], &rows);
                    print_page_footer(page);
                })
            }
            Commands::Software(args) => {
                let params = SoftwareParams {
                    page: args.page.page,
                    page_size: args.page.page_size,
                    category: args.category,
                };
                let page = self.client.software().list(&params).await?;
                self.out.emit(&page, |page| {
                    let rows: Vec<Vec<String>> = page
                        .items
                        .iter()
                        .map(|s| {
                            vec![
                                s.software_code.clone(),
                                s.software_name.clone(),
                                opt(s.version.as_deref()),
                                opt(s.category.as_deref()),
                                s.install.software_type.as_ref().map_or_else(|| "-".to_string(), wire_name),
                            ]
                        })
                        .collect();
                    print_table(&["CODE", "NAME", "VERSION", "CATEGORY", "TYPE"], &rows);
                    print_page_footer(page);
                })
            }
            Commands::Scripts(page) => {
                let params = ScriptParams {
                    page: page.page,
                    page_size: page.page_size,
                    ..Default::default()
                };
                let page = self.client.scripts().list(&params).await?;
                self.out.emit(&page, |page| {
                    let rows: Vec<Vec<String>> = page
                        .items
                        .iter()
                        .map(|s| {
                            vec![
                                s.script_code.clone(),
                                s.script_name.clone(),
                                opt(s.script_type.as_deref()),
                                opt(s.expected_duration.map(|d| format!("{d}s"))),
                                yes_no(s.is_active).to_string(),
                            ]
                        })
                        .collect();
                    print_table(&["CODE", "NAME", "TYPE", "DURATION", "ACTIVE"], &rows);
                    print_page_footer(page);
                })
            }
            Commands::Executions(args) => {
                let params = ExecutionParams {
                    page: args.page.page,
                    page_size: args.page.page_size,
                    task_id: args.task,
                    device_id: args.device,
                    ..Default::default()
                };
                let page = self.client.executions().list(&params).await?;
                self.out.emit(&page, |page| {
                    let rows: Vec<Vec<String>> = page
                        .items
                        .iter()
                        .map(|e| {
                            let exit = if e.is_finished() { e.exit_code.to_string() } else { "running".to_string() };
                            vec![
                                e.id.clone(),
                                opt(e.task_id.as_deref()),
                                opt(e.device_id.as_deref()),
                                when(Some(e.start_time)),
                                exit,
                            ]
                        })
                        .collect();
                    print_table(&["ID", "TASK", "DEVICE", "STARTED", "EXIT"], &rows);
                    print_page_footer(page);
                })
            }
            Commands::Ai(cmd) => self.ai(cmd).await,
            Commands::Db(cmd) => self.db(cmd).await,
        }
    }

    async fn login(&self, username: Option<String>, password: Option<String>) -> Result<()> {
        let (username, password) = match (username, password) {
            (Some(username), Some(password)) => (username, password),
            (username, password) => login_form(&mut Prompt::stdio(), username, password)?,
        };

        let session = self
            .client
            .auth()
            .login(&Credentials::new(username, password))
            .await
            .map_err(|e| {
                if e.is_unauthorized() {
                    anyhow!("invalid username or password")
                } else {
                    anyhow::Error::new(e).context("Login failed")
                }
            })?;

        self.out.emit(&session.user, |user| {
            println!("✅ Logged in as {} ({})", user.username, user.role);
        })
    }

    async fn logout(&self) -> Result<()> {
        self.client.auth().logout().await?;
        self.out.note("👋 Logged out.");
        Ok(())
    }

    async fn whoami(&self) -> Result<()> {
        let user = self.client.auth().me().await?;
        self.out.emit(&user, |user| {
            println!("{} ({})", user.username, user.role);
            if let Some(name) = &user.full_name {
                println!("Name:   {name}");
            }
            if let Some(email) = &user.email {
                println!("Email:  {email}");
            }
            println!("Active: {}", yes_no(user.is_active));
        })
    }

    fn config_show(&self) -> Result<()> {
        let view = ConfigView {
            path: ClientConfig::config_file_path().ok(),
            config: &self.config,
            logged_in: self.client.tokens().has_token(),
        };
        self.out.emit(&view, |view| {
            let path = view
                .path
                .as_ref()
                .map_or_else(|| "-".to_string(), |p| p.display().to_string());
            println!("Config file:     {path}");
            println!("API base URL:    {}", view.config.api.base_url);
            println!("Connect timeout: {}s", view.config.api.connect_timeout_secs);
            println!("Token store:     {}", wire_name(&view.config.session.store));
            println!("Logged in:       {}", yes_no(view.logged_in));
        })
    }

    async fn dashboard(&self) -> Result<()> {
        let summary = self.client.stats().dashboard().await?;
        self.out.emit(&summary, |s| {
            println!("📊 FLEET DASHBOARD");
            println!("========================================");
            println!(
                "Devices: {} total · {} online · {} offline · {} testing",
                s.total_devices, s.online_devices, s.offline_devices, s.testing_devices
            );
            println!(
                "Tasks:   {} total · {} pending · {} running · {} completed",
                s.total_tasks, s.pending_tasks, s.running_tasks, s.completed_tasks
            );
            let pass_rate = s
                .pass_rate()
                .map_or_else(|| "-".to_string(), |r| format!("{:.1}%", r * 100.0));
            println!(
                "Tests:   {} run · {} passed · {} failed · pass rate {}",
                s.total_tests, s.passed_tests, s.failed_tests, pass_rate
            );
            println!("Average score: {:.1}", s.average_score);
        })
    }

    async fn devices(&self, cmd: DeviceCommand) -> Result<()> {
        let devices = self.client.devices();
        match cmd {
            DeviceCommand::List {
                page,
                status,
                department,
                position,
                keyword,
            } => {
                let params = DeviceParams {
                    page: page.page,
                    page_size: page.page_size,
                    status,
                    department,
                    position,
                    keyword,
                };
                let page = devices.list(&params).await?;
                self.out.emit(&page, |page| {
                    let rows: Vec<Vec<String>> = page
                        .items
                        .iter()
                        .map(|d| {
                            vec![
                                d.id.clone(),
                                d.device_name.clone(),
                                wire_name(&d.status),
                                opt(d.department.as_deref()),
                                opt(d.position.as_deref()),
                                opt(d.ip_address.as_deref()),
                                when(d.last_seen_at),
                            ]
                        })
                        .collect();
                    print_table(&["ID", "NAME", "STATUS", "DEPARTMENT", "POSITION", "IP", "LAST SEEN"], &rows);
                    print_page_footer(page);
                })
            }
            DeviceCommand::Get { id } => {
                let device = devices.get(&id).await?;
                self.out.emit(&device, |d| {
                    println!("🖥️  {} ({})", d.device_name, wire_name(&d.status));
                    println!("MAC:        {}", d.mac_address);
                    println!("IP:         {}", opt(d.ip_address.as_deref()));
                    println!("Hostname:   {}", opt(d.hostname.as_deref()));
                    println!("Department: {}", opt(d.department.as_deref()));
                    println!("Position:   {}", opt(d.position.as_deref()));
                    println!("Assigned:   {}", opt(d.assigned_to.as_deref()));
                    println!("CPU:        {}", opt(d.hardware.cpu_model.as_deref()));
                    println!("GPU:        {}", opt(d.hardware.gpu_model.as_deref()));
                    println!("RAM:        {}", opt(d.hardware.ram_total_gb.map(|gb| format!("{gb} GB"))));
                    println!("OS:         {}", opt(d.hardware.os_name.as_deref()));
                    println!("Last seen:  {}", when(d.last_seen_at));
                })
            }
            DeviceCommand::Status { id } => {
                let rollup = devices.status(&id).await?;
                self.out.emit(&rollup, |r| {
                    println!("Device {}: {}", r.device_id, r.status);
                    println!("Pending alerts:    {}", r.pending_alerts_count);
                    println!("Recent benchmarks: {}", r.recent_benchmarks.len());
                    match &r.latest_metric {
                        Some(m) => println!(
                            "Latest sample ({}): cpu {} · gpu {} · mem {}",
                            when(Some(m.timestamp)),
                            score(m.cpu_percent),
                            score(m.gpu_percent),
                            score(m.memory_percent)
                        ),
                        None => println!("No telemetry yet."),
                    }
                })
            }
            DeviceCommand::Metrics { id, seconds } => {
                let window = devices.realtime_metrics(&id, seconds).await?;
                self.out.emit(&window, |w| {
                    let rows: Vec<Vec<String>> = w
                        .metrics
                        .iter()
                        .map(|m| {
                            vec![
                                when(Some(m.timestamp)),
                                score(m.cpu_percent),
                                score(m.gpu_percent),
                                score(m.memory_percent),
                                score(m.disk_read_mbps),
                                score(m.disk_write_mbps),
                            ]
                        })
                        .collect();
                    print_table(&["TIME", "CPU%", "GPU%", "MEM%", "READ MB/s", "WRITE MB/s"], &rows);
                })
            }
        }
    }

    async fn tasks(&self, cmd: TaskCommand) -> Result<()> {
        let tasks = self.client.tasks();
        match cmd {
            TaskCommand::List { page, status, task_type } => {
                let params = TaskParams {
                    page: page.page,
                    page_size: page.page_size,
                    status,
                    task_type,
                    ..Default::default()
                };
                let page = tasks.list(&params).await?;
                self.out.emit(&page, |page| {
                    let rows: Vec<Vec<String>> = page
                        .items
                        .iter()
                        .map(|t| {
                            vec![
                                t.id.clone(),
                                t.task_name.clone(),
                                t.task_type.clone(),
                                wire_name(&t.task_status),
                                t.target_device_ids.len().to_string(),
                                when(Some(t.created_at)),
                            ]
                        })
                        .collect();
                    print_table(&["ID", "NAME", "TYPE", "STATUS", "DEVICES", "CREATED"], &rows);
                    print_page_footer(page);
                })
            }
            TaskCommand::Get { id } => {
                let task = tasks.get(&id).await?;
                self.out.emit(&task, |t| {
                    println!("📋 {} ({})", t.task_name, wire_name(&t.task_status));
                    println!("Type:      {}", t.task_type);
                    println!("Devices:   {}", t.target_device_ids.join(", "));
                    println!("Script:    {}", opt(t.test_script_id.as_deref()));
                    println!("Started:   {}", when(t.started_at));
                    println!("Completed: {}", when(t.completed_at));
                })
            }
            TaskCommand::Execute { id, devices } => {
                let task = tasks.execute(&id, &devices).await?;
                self.out.emit(&task, |t| {
                    println!("🚀 Task {} dispatched to {} device(s), now {}", t.id, devices.len(), wire_name(&t.task_status));
                })
            }
            TaskCommand::Cancel { id, reason } => {
                let task = tasks.cancel(&id, reason.as_deref()).await?;
                self.out.emit(&task, |t| {
                    println!("🛑 Task {} is {}", t.id, wire_name(&t.task_status));
                })
            }
        }
    }

    async fn results(&self, cmd: ResultCommand) -> Result<()> {
        let results = self.client.results();
        match cmd {
            ResultCommand::List {
                page,
                device,
                task,
                standard_met,
            } => {
                let params = ResultParams {
                    page: page.page,
                    page_size: page.page_size,
                    device_id: device,
                    task_id: task,
                    is_standard_met: standard_met,
                    ..Default::default()
                };
                let page = results.list(&params).await?;
                self.out.emit(&page, |page| {
                    let rows: Vec<Vec<String>> = page
                        .items
                        .iter()
                        .map(|r| {
                            vec![
                                r.id.clone(),
                                r.device_id.clone(),
                                opt(r.test_type.as_deref()),
                                score(r.scores.overall_score),
                                opt(r.is_standard_met.map(yes_no)),
                                when(Some(r.start_time)),
                            ]
                        })
                        .collect();
                    print_table(&["ID", "DEVICE", "TYPE", "SCORE", "STANDARD", "STARTED"], &rows);
                    print_page_footer(page);
                })
            }
            ResultCommand::Get { id } => {
                let result = results.get(&id).await?;
                self.out.emit(&result, |r| {
                    println!("🧪 Result {} on {}", r.id, r.device_id);
                    println!("Status:   {}", opt(r.test_status.as_deref()));
                    println!("Duration: {}s", r.duration_seconds);
                    println!(
                        "Scores:   overall {} · cpu {} · gpu {} · memory {} · disk {}",
                        score(r.scores.overall_score),
                        score(r.scores.cpu_score),
                        score(r.scores.gpu_score),
                        score(r.scores.memory_score),
                        score(r.scores.disk_score)
                    );
                    println!("Standard: {}", opt(r.is_standard_met.map(yes_no)));
                    println!("Bottleneck: {}", opt(r.bottleneck_type.as_deref()));
                })
            }
            ResultCommand::Compare { devices } => {
                let comparison = results.compare(&devices).await?;
                self.out.emit(&comparison, |items| {
                    let rows: Vec<Vec<String>> = items
                        .iter()
                        .map(|c| {
                            vec![
                                c.device_name.clone(),
                                opt(c.cpu_model.as_deref()),
                                opt(c.gpu_model.as_deref()),
                                score(c.latest_result.as_ref().and_then(|r| r.scores.overall_score)),
                                score(c.statistics.average_score),
                                c.statistics.test_count.to_string(),
                            ]
                        })
                        .collect();
                    print_table(&["DEVICE", "CPU", "GPU", "LATEST", "AVERAGE", "TESTS"], &rows);
                })
            }
        }
    }

    async fn ai(&self, cmd: AiCommand) -> Result<()> {
        match cmd {
            AiCommand::Metrics { device, seconds } => {
                let analysis = self.client.ai().analyze_metrics(&device, seconds).await?;
                if analysis.is_processing() {
                    self.out
                        .note("⏳ Analysis is still running; check `rolefit ai reports` later.");
                }
                self.out.emit(&analysis, |a| {
                    println!("🤖 {}", a.title);
                    if let Some(summary) = &a.summary {
                        println!("{summary}");
                    }
                    if let Some(conclusions) = &a.conclusions {
                        println!();
                        println!("Conclusions:\n{conclusions}");
                    }
                    if let Some(recommendations) = &a.recommendations {
                        println!();
                        println!("Recommendations:\n{recommendations}");
                    }
                })
            }
            AiCommand::Reports { device, limit } => {
                let params = ReportParams {
                    device_id: device,
                    limit,
                    ..Default::default()
                };
                let listing = self.client.ai().reports(&params).await?;
                self.out.emit(&listing, |listing| {
                    let rows: Vec<Vec<String>> = listing
                        .items
                        .iter()
                        .map(|r| {
                            vec![
                                r.id.clone(),
                                opt(r.device_id.as_deref()),
                                r.analysis_type.clone(),
                                r.title.clone(),
                                opt(r.status.as_deref()),
                                when(r.created_at),
                            ]
                        })
                        .collect();
                    print_table(&["ID", "DEVICE", "TYPE", "TITLE", "STATUS", "CREATED"], &rows);
                    println!("{} total", listing.total);
                })
            }
            AiCommand::Chat { message, session } => {
                let session = session.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
                debug!(session = %session, "sending chat message");
                let reply = self
                    .client
                    .llm_config()
                    .send_chat(&session, &OutgoingMessage::user(message))
                    .await?;
                self.out.emit(&reply, |r| {
                    if let Some(error) = &r.error {
                        println!("⚠️  Provider error: {error}");
                    }
                    println!("{}", r.content);
                })?;
                self.out
                    .note(format!("💬 Continue with --session {session}"));
                Ok(())
            }
        }
    }

    async fn db(&self, cmd: DbCommand) -> Result<()> {
        let database = self.client.database();
        match cmd {
            DbCommand::Export { format, out } => {
                let path = database.export_to(format, &out).await?;
                self.out
                    .note(format!("✅ {format} export written to {}", path.display()));
                Ok(())
            }
            DbCommand::Import { file, yes } => {
                if !yes {
                    let question = format!("Replace the backend database with {}?", file.display());
                    if !Prompt::stdio().yes_no(&question, false)? {
                        println!("❌ Import cancelled.");
                        return Ok(());
                    }
                }
                let summary = database.import(&file).await?;
                info!(success = summary.success, "database import finished");
                self.out.emit(&summary, |s| {
                    let icon = if s.success { "✅" } else { "❌" };
                    println!("{icon} {}", s.message);
                    if let Some(backup) = &s.backup_file {
                        println!("Backup: {backup}");
                    }
                })?;
                import_outcome(&summary)
            }
        }
    }
}

/// A rejected import has already been reported; it still fails the command.
fn import_outcome(summary: &ImportSummary) -> Result<()> {
    if summary.success {
        Ok(())
    } else {
        bail!("database import failed: {}", summary.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rolefit_client::{MemoryTokenStore, TokenStore};
    use std::sync::Arc;

    use crate::commands::Cli;

    fn admission(store: Arc<MemoryTokenStore>, args: &[&str]) -> Admission {
        let guard = AuthGuard::new(store);
        let cli = Cli::parse_from(args);
        admit(&guard, &cli.command)
    }

    #[test]
    fn test_protected_command_needs_login() {
        let store = Arc::new(MemoryTokenStore::new());
        assert_eq!(admission(store, &["rolefit", "devices", "list"]), Admission::NeedsLogin);
    }

    #[test]
    fn test_login_when_logged_in_shows_dashboard() {
        let store = Arc::new(MemoryTokenStore::with_token("abc"));
        assert_eq!(admission(store.clone(), &["rolefit", "login"]), Admission::ShowDashboard);
        assert_eq!(admission(store, &["rolefit", "tasks", "get", "t1"]), Admission::Run);
    }

    #[test]
    fn test_local_commands_skip_guard() {
        let store = Arc::new(MemoryTokenStore::new());
        assert_eq!(admission(store.clone(), &["rolefit", "logout"]), Admission::Run);
        assert_eq!(admission(store.clone(), &["rolefit", "config", "show"]), Admission::Run);
        assert_eq!(admission(store.clone(), &["rolefit", "login"]), Admission::Run);
        assert!(!store.has_token());
    }

    #[test]
    fn test_rejected_import_fails_the_command() {
        let rejected = ImportSummary {
            success: false,
            message: "not a RoleFit dump".into(),
            backup_file: None,
        };
        let error = import_outcome(&rejected).unwrap_err();
        assert_eq!(error.to_string(), "database import failed: not a RoleFit dump");

        let accepted = ImportSummary {
            success: true,
            message: "imported".into(),
            backup_file: Some("backup_20250301.sql".into()),
        };
        assert!(import_outcome(&accepted).is_ok());
    }
}
