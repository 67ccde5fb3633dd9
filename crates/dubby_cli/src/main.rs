//! `dubby` command-line entry point.
//!
//! # Responsibility
//! - Parse arguments and dispatch each subcommand to `dubby_core::Registry`.
//! - Own operator-facing concerns: prompts, tables, exit codes.

use clap::{Args, Parser, Subcommand, ValueEnum};
use dubby_core::{
    AppConfig, AutoConfirm, BackupRequest, Confirmer, CreateProjectRequest, LinkDomains,
    Project, ProjectFilter, ProjectStatus, Registry, StepOutcome,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "dubby", version, about = "Personal project registry")]
struct Cli {
    /// Directory holding configs.json (default: <config dir>/dubby)
    #[arg(long, env = "DUBBY_CONFIG_DIR", global = true, value_name = "PATH")]
    config_dir: Option<PathBuf>,
    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a new project and set up its local directory
    Create(CreateArgs),
    /// Set up the local directory of an existing project
    Add(NameArgs),
    /// Remove a project, confirming each destructive step
    #[command(alias = "remove")]
    Delete(DeleteArgs),
    /// Archive the local directory as <name>___<date>.tar.gz
    Backup(BackupArgs),
    SetActive(NameArgs),
    SetInactive(NameArgs),
    SetArchived(NameArgs),
    SetDescription(TextArgs),
    SetTagline(TextArgs),
    AddTags(TagArgs),
    RemoveTags(TagArgs),
    List(FilterArgs),
    ListOrgs(FilterArgs),
    ListTags(FilterArgs),
    /// Regenerate the shell alias file
    SyncAliases,
    /// Re-apply status and mirror links (all projects when no name is given)
    SyncSymlinks(SyncSymlinksArgs),
    /// Re-link external note pages and prune dangling links
    SyncNotes(NameArgs),
    /// Copy the project's notes into the aggregate-notes root
    CopyNotes(NameArgs),
    /// Print the project's manifest
    Info(NameArgs),
}

#[derive(Args)]
struct NameArgs {
    name: String,
}

#[derive(Args)]
struct DeleteArgs {
    name: String,
    /// Answer yes to every confirmation
    #[arg(long)]
    yes: bool,
}

#[derive(Args)]
struct CreateArgs {
    name: String,
    #[arg(short, long, num_args = 1..)]
    tags: Vec<String>,
    #[arg(short, long, default_value = "active")]
    status: ProjectStatus,
    #[arg(long)]
    tagline: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Skip the review prompt
    #[arg(long)]
    no_interactive: bool,
}

#[derive(Args)]
struct BackupArgs {
    name: String,
    /// Additional directory or file names to exclude
    #[arg(long, num_args = 1..)]
    exclude: Vec<String>,
    /// Destination directory (default: the local-projects root)
    #[arg(long, value_name = "PATH", conflicts_with = "to_archive")]
    target_dir: Option<PathBuf>,
    /// Write into the registry's archive directory
    #[arg(long)]
    to_archive: bool,
}

#[derive(Args)]
struct TextArgs {
    name: String,
    /// New value; omit to clear
    text: Option<String>,
}

#[derive(Args)]
struct TagArgs {
    name: String,
    #[arg(short, long, num_args = 1.., required = true)]
    tags: Vec<String>,
}

#[derive(Args)]
struct FilterArgs {
    #[arg(short, long, num_args = 1..)]
    tags: Vec<String>,
    #[arg(short, long)]
    status: Option<ProjectStatus>,
    #[arg(short, long)]
    org: Option<String>,
    /// Only projects with a local directory
    #[arg(long)]
    local: bool,
}

impl From<FilterArgs> for ProjectFilter {
    fn from(args: FilterArgs) -> Self {
        Self {
            tags: args.tags,
            status: args.status,
            local: args.local,
            org: args.org,
        }
    }
}

#[derive(Args)]
struct SyncSymlinksArgs {
    name: Option<String>,
    #[arg(long, value_enum, default_value_t = LinksArg::All)]
    links: LinksArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum LinksArg {
    All,
    Status,
    Mirror,
}

impl From<LinksArg> for LinkDomains {
    fn from(value: LinksArg) -> Self {
        match value {
            LinksArg::All => Self::All,
            LinksArg::Status => Self::Status,
            LinksArg::Mirror => Self::Mirror,
        }
    }
}

/// Reads `y`/`n` answers from stdin; an empty answer takes the default.
struct StdinConfirm;

impl Confirmer for StdinConfirm {
    fn confirm(&mut self, prompt: &str, default_yes: bool) -> bool {
        let hint = if default_yes { "Y/n" } else { "y/N" };
        print!("{prompt} {hint} > ");
        let _ = std::io::stdout().flush();

        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        let answer = answer.trim().to_lowercase();
        if default_yes {
            !answer.starts_with('n')
        } else {
            answer.starts_with('y')
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_run module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult {
    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => dirs::config_dir()
            .ok_or("cannot determine a config directory; pass --config-dir")?
            .join("dubby"),
    };
    let level = cli
        .log_level
        .as_deref()
        .unwrap_or(dubby_core::default_log_level());
    let log_dir = std::path::absolute(config_dir.join("logs"))?;
    dubby_core::init_logging(level, &log_dir)?;

    let config = AppConfig::load(&config_dir)?;
    let registry = Registry::open(config);
    dispatch(&registry, cli.command)
}

fn dispatch(registry: &Registry, command: Command) -> CliResult {
    match command {
        Command::Create(args) => create(registry, args),
        Command::Add(args) => {
            let project = registry.get(&args.name)?;
            let report = registry.materialize(&project)?;
            println!("project directory: {}", project.local_path.display());
            println!(
                "notes linked: {}, links created: {}",
                report.notes.linked.len(),
                report.symlinks.created.len()
            );
            Ok(())
        }
        Command::Delete(args) => {
            if args.yes {
                delete(registry, &args.name, &mut AutoConfirm::yes())
            } else {
                delete(registry, &args.name, &mut StdinConfirm)
            }
        }
        Command::Backup(args) => {
            let project = registry.get(&args.name)?;
            let target_dir = if args.to_archive {
                Some(registry.config().archive_dir())
            } else {
                args.target_dir
            };
            let request = BackupRequest {
                exclude: args.exclude,
                target_dir,
            };
            let archive = registry.backup(&project, &request)?;
            println!("archive written: {}", archive.display());
            Ok(())
        }
        Command::SetActive(args) => set_status(registry, &args.name, ProjectStatus::Active),
        Command::SetInactive(args) => set_status(registry, &args.name, ProjectStatus::Inactive),
        Command::SetArchived(args) => set_status(registry, &args.name, ProjectStatus::Archived),
        Command::SetDescription(args) => {
            let mut project = registry.get(&args.name)?;
            registry.set_description(&mut project, args.text)?;
            Ok(())
        }
        Command::SetTagline(args) => {
            let mut project = registry.get(&args.name)?;
            registry.set_tagline(&mut project, args.text)?;
            Ok(())
        }
        Command::AddTags(args) => {
            let mut project = registry.get(&args.name)?;
            registry.add_tags(&mut project, &args.tags)?;
            print_tags(&project);
            Ok(())
        }
        Command::RemoveTags(args) => {
            let mut project = registry.get(&args.name)?;
            registry.remove_tags(&mut project, &args.tags)?;
            print_tags(&project);
            Ok(())
        }
        Command::List(args) => {
            let projects = registry.list(&args.into())?;
            let mut rows = vec![vec![
                "name".to_string(),
                "local".to_string(),
                "status".to_string(),
                "tags".to_string(),
            ]];
            for project in &projects {
                rows.push(vec![
                    project.name.clone(),
                    project.is_local().to_string(),
                    project.status.to_string(),
                    project.tags.iter().cloned().collect::<Vec<_>>().join(","),
                ]);
            }
            print_table(&rows);
            println!("---\ncount: {}", projects.len());
            Ok(())
        }
        Command::ListOrgs(args) => print_values(registry.list_orgs(&args.into())?),
        Command::ListTags(args) => print_values(registry.list_tags(&args.into())?),
        Command::SyncAliases => {
            let count = registry.sync_aliases()?;
            println!(
                "aliases updated for {count} local projects: {}",
                registry.config().aliases_file.display()
            );
            Ok(())
        }
        Command::SyncSymlinks(args) => {
            let projects = match args.name {
                Some(name) => vec![registry.get(&name)?],
                None => registry.list(&ProjectFilter::default())?,
            };
            for project in &projects {
                let report = registry.sync_symlinks(project, args.links.into())?;
                if !report.is_unchanged() {
                    println!(
                        "{}: {} created, {} removed",
                        project.name,
                        report.created.len(),
                        report.removed.len()
                    );
                }
            }
            Ok(())
        }
        Command::SyncNotes(args) => {
            let project = registry.get(&args.name)?;
            let report = registry.sync_notes(&project)?;
            for name in &report.linked {
                println!("linked: {name}");
            }
            for name in &report.pruned {
                println!("pruned: {name}");
            }
            Ok(())
        }
        Command::CopyNotes(args) => {
            let project = registry.get(&args.name)?;
            let report = registry.copy_notes_to_mirror(&project)?;
            println!(
                "copied {} pages and {} assets",
                report.pages_copied, report.assets_copied
            );
            Ok(())
        }
        Command::Info(args) => {
            let project = registry.get(&args.name)?;
            println!("{}", serde_json::to_string_pretty(&project.to_manifest())?);
            Ok(())
        }
    }
}

fn create(registry: &Registry, args: CreateArgs) -> CliResult {
    let request = CreateProjectRequest {
        name: args.name,
        status: args.status,
        tags: args.tags,
        tagline: args.tagline,
        description: args.description,
    };

    if !args.no_interactive {
        println!("registry entry:");
        println!("  name:   {}", request.name);
        println!(
            "  org:    {}",
            dubby_core::derive_org(&request.name).unwrap_or("-")
        );
        println!("  status: {}", request.status);
        println!("  tags:   {}", request.tags.join(","));
        if !StdinConfirm.confirm("Looks good?", true) {
            println!("aborted, nothing created");
            return Ok(());
        }
    }

    let (project, report) = registry.create(request)?;
    println!("project directory: {}", project.local_path.display());
    if report.notes.page_created {
        println!("new notes page created for {}", project.name);
    }
    println!("symlinks created: {}", report.symlinks.created.len());
    Ok(())
}

fn delete(registry: &Registry, name: &str, confirmer: &mut dyn Confirmer) -> CliResult {
    if !confirmer.confirm(&format!("Deleting project {name}. Continue?"), true) {
        return Ok(());
    }

    let report = registry.delete(name, confirmer)?;
    report_step("note pages", &report.notes);
    report_step("local directory", &report.local_dir);
    if let Some(outcome) = &report.symlinks.mirror_folder {
        report_step("mirror folder", outcome);
    }
    report_step("manifest", &report.manifest);
    Ok(())
}

fn set_status(registry: &Registry, name: &str, status: ProjectStatus) -> CliResult {
    let mut project = registry.get(name)?;
    registry.set_status(&mut project, status)?;
    println!("{}: {}", project.name, project.status);
    Ok(())
}

fn report_step(label: &str, outcome: &StepOutcome) {
    match outcome {
        StepOutcome::Removed => println!("{label}: removed"),
        StepOutcome::Retained => println!("{label}: retained (deal with this ASAP)"),
        StepOutcome::Failed(err) => println!("{label}: removal failed: {err}"),
        StepOutcome::Skipped => println!("{label}: skipped (not local on this machine)"),
        StepOutcome::Absent => {}
    }
}

fn print_tags(project: &Project) {
    println!(
        "tags: {}",
        project.tags.iter().cloned().collect::<Vec<_>>().join(", ")
    );
}

fn print_values(values: Vec<String>) -> CliResult {
    for value in &values {
        println!("{value}");
    }
    println!("---\ncount: {}", values.len());
    Ok(())
}

fn print_table(rows: &[Vec<String>]) {
    let columns = rows.first().map_or(0, Vec::len);
    let widths: Vec<usize> = (0..columns)
        .map(|col| rows.iter().map(|row| row[col].chars().count()).max().unwrap_or(0) + 2)
        .collect();
    for row in rows {
        let line: String = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        println!("{}", line.trim_end());
    }
}
