//! create-spark - Scaffold a new Expo project and install its dependencies

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use spark_core::template::{
    self, CopyOptions, FileKind, FileMapping, ProjectVariables, TemplateAnalysis,
    DEFAULT_COPY_CONCURRENCY,
};
use spark_core::{install_with_manager, manager, InstallOptions};

#[derive(Parser, Debug)]
#[command(name = "create-spark")]
#[command(about = "Create a new Expo project with pre-configured authentication,\n\
state management, and dark mode support")]
#[command(version)]
struct Args {
    /// Name of the project directory to create
    project_name: String,

    /// Parent directory for the new project (defaults to the current directory)
    #[arg(short, long)]
    directory: Option<PathBuf>,

    /// Local directory to use as the template source
    #[arg(long = "template-dir")]
    template_dir: Option<PathBuf>,

    /// Overwrite the destination directory if it already exists
    #[arg(short, long)]
    force: bool,

    /// Skip dependency installation
    #[arg(long = "skip-install")]
    skip_install: bool,

    /// Pass the package manager's silence flag to the install command
    #[arg(long)]
    silent: bool,

    /// Show package manager warnings and stderr output
    #[arg(short, long)]
    verbose: bool,

    /// Maximum number of concurrent file copies
    #[arg(long, default_value_t = DEFAULT_COPY_CONCURRENCY)]
    concurrency: usize,

    /// Install timeout in seconds
    #[arg(long = "install-timeout", default_value_t = 300)]
    install_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    let result = run(args).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    result
}

async fn run(args: Args) -> Result<()> {
    println!();
    println!(
        "{} {}",
        "🚀 Creating new Expo project:".cyan().bold(),
        args.project_name.bold()
    );
    println!();

    let template_root = template::resolve_template_root(args.template_dir.as_deref())?;
    let target_dir = match &args.directory {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to resolve current directory")?,
    };
    let destination = template::resolve_destination(&args.project_name, &target_dir, args.force)?;

    // Scan and summarize the template
    println!("{}", "📋 Analyzing template files...".blue());
    let files = template::scan(&template_root)?;
    let analysis = TemplateAnalysis::from_files(&files);
    print_analysis(&analysis);

    let variables = ProjectVariables::derive(&args.project_name);
    let mappings = template::build_mappings(&files, &destination.path);

    std::fs::create_dir_all(&destination.path)
        .with_context(|| format!("Failed to create {}", destination.path.display()))?;
    template::ensure_directories(&mappings).await?;

    // Copy with bounded concurrency
    let bar = copy_bar(mappings.len() as u64);
    let report = template::copy_all(
        &mappings,
        &variables,
        &CopyOptions {
            concurrency: args.concurrency,
        },
        |progress| {
            bar.set_position(progress.completed as u64);
            bar.set_message(progress.current.display().to_string());
        },
    )
    .await;
    bar.finish_and_clear();

    for failure in &report.failed {
        eprintln!(
            "{} {}: {}",
            "Copy failed:".red(),
            failure.relative_path.display(),
            failure.error
        );
    }
    if report.succeeded == 0 && report.total > 0 {
        anyhow::bail!("No files could be copied into {}", destination.path.display());
    }
    println!(
        "{} Copied {}/{} files",
        "✅".green(),
        report.succeeded,
        report.total
    );

    // Post-copy validation; substituted text files legitimately change size
    let validation = template::validate(&mappings).await;
    report_validation(&mappings, &validation);

    if args.skip_install {
        print_next_steps(&args.project_name, true);
        return Ok(());
    }

    // Detect and show available managers before handing off to the installer
    println!();
    println!("{}", "🔍 Detecting package managers...".blue());
    let detection = manager::detect(&destination.path).await;
    let Some(selected) = detection.selected else {
        anyhow::bail!("No package manager found. Please install npm, yarn, or pnpm.");
    };
    println!(
        "{}",
        format!("✅ Found {} package manager(s):", detection.available.len()).green()
    );
    for available in &detection.available {
        let selected = detection.selected == Some(*available);
        let marker = if selected { "👉" } else { "  " };
        let suffix = if selected { " (selected)" } else { "" };
        println!("{} {}{}", marker, available, suffix);
    }

    let options = InstallOptions {
        timeout: Duration::from_secs(args.install_timeout),
        env: Vec::new(),
        silent: args.silent,
        verbose: args.verbose,
    };

    println!();
    println!(
        "{}",
        format!("🚀 Starting installation with {}...", selected).blue()
    );

    let bar = install_bar();
    let install_outcome = install_with_manager(selected, &destination.path, &options, |state| {
        bar.set_position(u64::from(state.percent));
        let mut message = if state.total > 0 {
            format!("{}/{} packages", state.installed, state.total)
        } else {
            "Installing...".to_string()
        };
        if let Some(package) = &state.current_package {
            message.push_str(&format!(" ({})", package));
        }
        bar.set_message(message);
    })
    .await;

    match install_outcome {
        Ok(_result) => {
            bar.finish_and_clear();
            println!("{}", "✅ Dependencies installed successfully!".green());
            print_next_steps(&args.project_name, false);
            Ok(())
        }
        Err(error) => {
            bar.abandon();
            if let Some(result) = error.install_result() {
                eprintln!();
                eprintln!("{} {}", "Command:".dimmed(), result.command);
                for line in result.stderr.lines().rev().take(10).collect::<Vec<_>>().iter().rev() {
                    eprintln!("  {}", line.red());
                }
            }
            Err(error.into())
        }
    }
}

fn print_analysis(analysis: &TemplateAnalysis) {
    println!("{}", "✅ Template analysis complete:".green());
    println!("   Total files: {}", analysis.total_files);
    println!("   Binary files: {}", analysis.binary_files);
    println!("   Text files: {}", analysis.text_files);
    println!("   Other files: {}", analysis.other_files);
    println!(
        "   Total size: {:.2} KB",
        analysis.total_size as f64 / 1024.0
    );
    println!();
}

fn report_validation(mappings: &[FileMapping], validation: &template::ValidationReport) {
    for missing in &validation.missing_destinations {
        eprintln!(
            "{} missing after copy: {}",
            "Warning:".yellow(),
            missing.display()
        );
    }

    // Size changes are expected for substituted text files; anything else
    // points at a truncated or corrupted copy.
    let kinds: HashMap<&Path, FileKind> = mappings
        .iter()
        .map(|m| (m.descriptor.relative_path.as_path(), m.descriptor.kind))
        .collect();
    for mismatch in &validation.size_mismatches {
        if kinds.get(mismatch.relative_path.as_path()) != Some(&FileKind::Text) {
            eprintln!(
                "{} size mismatch for {} ({} -> {} bytes)",
                "Warning:".yellow(),
                mismatch.relative_path.display(),
                mismatch.source_size,
                mismatch.destination_size
            );
        }
    }
}

fn print_next_steps(project_name: &str, install_skipped: bool) {
    println!();
    println!("{}", "Next steps:".bold());
    println!("  cd {}", project_name);
    if install_skipped {
        println!("  npm install");
    }
    println!("  npx expo start");
    println!();
}

fn copy_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{prefix:.bold.blue} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid progress template")
            .progress_chars("█░░"),
    );
    bar.set_prefix("📂 Copying template");
    bar
}

fn install_bar() -> ProgressBar {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{prefix:.bold.blue} [{bar:40.cyan/blue}] {pos}% {msg}")
            .expect("valid progress template")
            .progress_chars("█░░"),
    );
    bar.set_prefix("📦 Installing dependencies");
    bar
}
