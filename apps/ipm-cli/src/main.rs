use clap::{Parser, Subcommand};
use ipm_app::{
    AppResult, DryRunFixture, NetworkWellResult, OutputCase, RunOptions, RunProgressEvent,
    RunRequest, project_service, run_service,
};
use ipm_core::CoefficientPair;
use ipm_results::{ResultStore, Table};
use ipm_solver::{Correction, select_correction};
use ipm_tuning::{PipeOutcome, PipeTuningReport, WellOutcome, WellTuningReport};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ipm-cli")]
#[command(about = "ipmtune CLI - well and pipeline correlation tuning", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax and structure
    Validate {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// List wells in a project
    Wells {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// Classify a correlation coefficient pair and show its search box
    Classify {
        /// Gravity coefficient
        cp1: f64,
        /// Friction coefficient
        cp2: f64,
    },
    /// Run the full workflow against offline fixture data
    DryRun {
        /// Path to the project YAML file
        project_path: PathBuf,
        /// Fixture with historian data, well tests and the analytic engine
        fixture_path: PathBuf,
        /// Skip the choke optimization
        #[arg(long)]
        no_optimize: bool,
    },
    /// List stored batches for a project
    Batches {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// Show the rows of a stored batch
    Show {
        /// Path to the project YAML file
        project_path: PathBuf,
        /// Batch ID or a unique prefix of it
        batch_id: String,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Wells { project_path } => cmd_wells(&project_path),
        Commands::Classify { cp1, cp2 } => cmd_classify(cp1, cp2),
        Commands::DryRun {
            project_path,
            fixture_path,
            no_optimize,
        } => cmd_dry_run(&project_path, &fixture_path, !no_optimize),
        Commands::Batches { project_path } => cmd_batches(&project_path),
        Commands::Show {
            project_path,
            batch_id,
        } => cmd_show(&project_path, &batch_id),
    }
}

fn cmd_validate(project_path: &Path) -> AppResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = project_service::load_project(project_path)?;
    project_service::validate_project(&project)?;
    println!(
        "✓ Project is valid ({} wells, {} manifold tags)",
        project.wells.len(),
        project.manifold.len()
    );
    Ok(())
}

fn cmd_wells(project_path: &Path) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let wells = project_service::list_wells(&project);

    if wells.is_empty() {
        println!("No wells found in project");
    } else {
        println!("Wells in project:");
        for w in wells {
            println!(
                "  {} (network {}, completion {}) - {} [{} tags]",
                w.name,
                w.network_name,
                w.completion,
                w.model.display(),
                w.tag_count
            );
        }
    }
    Ok(())
}

fn cmd_classify(cp1: f64, cp2: f64) -> AppResult<()> {
    let pair = CoefficientPair::new(cp1, cp2);
    match select_correction(pair)? {
        Correction::NotNeeded { region } => {
            println!("{pair}: {region}, no correction");
        }
        Correction::Required {
            region,
            initial_guess,
            search_box,
        } => {
            println!("{pair}: {region}");
            println!("  initial guess: {initial_guess}");
            println!("  search box:    {search_box}");
        }
    }
    Ok(())
}

fn cmd_dry_run(project_path: &Path, fixture_path: &Path, optimize: bool) -> AppResult<()> {
    println!("Dry run: {}", project_path.display());
    let fixture = DryRunFixture::load(fixture_path)?;
    let mut session = fixture.session()?;
    let store = ResultStore::for_project(project_path)?;

    let request = RunRequest {
        project_path,
        options: RunOptions {
            optimize,
            ..RunOptions::default()
        },
    };
    let response = run_service::run_batch(
        &request,
        &mut session,
        fixture.sources(),
        &store,
        Some(&mut |event: RunProgressEvent| render_cli_progress(&event)),
    )?;
    clear_progress_line();

    let m = &response.manifest;
    println!("✓ Batch completed: {}", m.batch_id);
    println!(
        "  Wells: {} tuned, {} accepted, {} neutral",
        m.summary.wells_tuned, m.summary.wells_accepted, m.summary.wells_neutral
    );
    println!(
        "  Flowlines: {} tuned, {} skipped",
        m.summary.groups_tuned, m.summary.groups_skipped
    );
    print_wells(&response.wells);
    print_pipes(&response.pipes);
    print_network(&response.network);
    Ok(())
}

fn cmd_batches(project_path: &Path) -> AppResult<()> {
    let store = ResultStore::for_project(project_path)?;
    let batches = store.list_batches()?;
    if batches.is_empty() {
        println!("No batches stored for project");
        return Ok(());
    }
    println!("Batches:");
    for b in batches {
        println!(
            "  {}  {}  wells={}/{}/{} groups={} optimized={}",
            &b.batch_id[..12.min(b.batch_id.len())],
            b.timestamp,
            b.summary.wells_tuned,
            b.summary.wells_accepted,
            b.summary.wells_neutral,
            b.summary.groups_tuned,
            b.summary.optimized
        );
    }
    Ok(())
}

fn cmd_show(project_path: &Path, batch_id: &str) -> AppResult<()> {
    let store = ResultStore::for_project(project_path)?;
    let manifest = store.resolve(batch_id)?;
    println!("Batch {}", manifest.batch_id);
    println!("  Project: {}", manifest.project);
    println!("  Started: {}", manifest.timestamp);
    if let Some(w) = &manifest.window {
        println!("  Window:  {} .. {}", w.start(), w.end());
    }
    println!("  Version: {}", manifest.tool_version);

    let id = &manifest.batch_id;
    let wells: Vec<WellTuningReport> = store.read_batch(Table::WellTuning, id)?;
    let pipes: Vec<PipeTuningReport> = store.read_batch(Table::PipeTuning, id)?;
    let network: Vec<NetworkWellResult> = store.read_batch(Table::NetworkResults, id)?;
    print_wells(&wells);
    print_pipes(&pipes);
    print_network(&network);
    Ok(())
}

fn print_wells(wells: &[WellTuningReport]) {
    if wells.is_empty() {
        return;
    }
    println!("Wells:");
    for w in wells {
        let outcome = match &w.outcome {
            WellOutcome::Tuned { region } => format!("tuned ({region})"),
            WellOutcome::AcceptedAsIs { region } => format!("accepted ({region})"),
            WellOutcome::Neutral { reason } => format!("neutral ({reason:?})"),
        };
        println!(
            "  {:<10} {}  cp={}  PI={:.3}  q={:.1}  bhp={:.1}",
            w.well.as_str(),
            outcome,
            w.tuned,
            w.productivity_index,
            w.solved_liquid_rate,
            w.solved_bhp
        );
    }
}

fn print_pipes(pipes: &[PipeTuningReport]) {
    if pipes.is_empty() {
        return;
    }
    println!("Flowlines:");
    for p in pipes {
        match &p.outcome {
            PipeOutcome::Tuned {
                upstream,
                downstream,
                tuned,
                pipes,
                ..
            } => println!(
                "  {:<10} tuned {}  {} pipes  up={}@{:.1}  down={}@{:.1}",
                p.flowline.as_str(),
                tuned,
                pipes.len(),
                upstream.joint,
                upstream.pressure,
                downstream.joint,
                downstream.pressure
            ),
            PipeOutcome::Skipped { reason } => {
                println!("  {:<10} skipped ({reason:?})", p.flowline.as_str())
            }
        }
    }
}

fn print_network(rows: &[NetworkWellResult]) {
    if rows.is_empty() {
        return;
    }
    println!("Network:");
    for r in rows {
        let case = match r.case {
            OutputCase::Base => "base",
            OutputCase::Optimized => "optimized",
        };
        println!(
            "  {:<10} {:<9} oil={:.1} water={:.1} gas={:.4} whp={:.1} bhp={:.1}",
            r.well.as_str(),
            case,
            r.oil_rate,
            r.water_rate,
            r.gas_rate,
            r.whp,
            r.bhp
        );
    }
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    let mut line = format!("\r{}  elapsed={:.2}s", event.stage, event.elapsed_wall_s);
    if let Some(msg) = &event.message {
        line.push_str(&format!("  {}", msg));
    }
    print!("{:<100}", line);
    let _ = io::stdout().flush();
}
