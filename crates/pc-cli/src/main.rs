mod export;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use pc_core::validate::Severity;
use pc_pipeline::{Optimizer, Project, quick_estimate};

#[derive(Parser)]
#[command(name = "profile-cutter", version, about = "Optimize cutting plans for profile stock")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the project TOML file (shorthand for `optimize <file>`)
    project_file: Option<PathBuf>,

    /// Write the full plan as JSON
    #[arg(long, global = true)]
    export_json: Option<PathBuf>,

    /// Write the cut list as CSV
    #[arg(long, global = true)]
    export_csv: Option<PathBuf>,

    /// Override the project's angle tolerance, in degrees
    #[arg(long, global = true)]
    tolerance: Option<f64>,

    /// Skip catalog validation
    #[arg(long, global = true)]
    no_validate: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize a project file into a placement plan
    Optimize {
        /// Path to the project TOML file
        project_file: PathBuf,
    },
    /// Print the shared-cut potential of a project without placing
    Estimate {
        /// Path to the project TOML file
        project_file: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Optimize { project_file }) => run_optimize(project_file, &cli)?,
        Some(Commands::Estimate { project_file }) => run_estimate(project_file, &cli)?,
        None => {
            if let Some(ref project_file) = cli.project_file {
                run_optimize(project_file, &cli)?;
            } else {
                eprintln!("Usage: profile-cutter <PROJECT_FILE> or profile-cutter optimize <PROJECT_FILE>");
                eprintln!("Run 'profile-cutter --help' for more information.");
                std::process::exit(2);
            }
        }
    }

    Ok(())
}

fn load_project(path: &Path, cli: &Cli) -> Result<Project, Box<dyn std::error::Error>> {
    let toml_str = fs::read_to_string(path)?;
    let mut project = Project::from_toml(&toml_str)?;
    if let Some(tolerance) = cli.tolerance {
        project.optimizer.angle_tolerance = tolerance;
    }

    if !cli.no_validate {
        let issues = project.ensure_valid()?;
        for issue in issues {
            if issue.severity == Severity::Warning {
                eprintln!("warning: {}: {}", issue.subject, issue.message);
            }
        }
    }
    Ok(project)
}

fn run_optimize(path: &Path, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let project = load_project(path, cli)?;
    if let Some(name) = &project.name {
        println!("Project: {name}");
    }
    println!(
        "Parts: {} specs, {} instances",
        project.parts.len(),
        project.parts.iter().map(|p| u64::from(p.quantity)).sum::<u64>(),
    );

    let optimizer = Optimizer::new(project.optimizer.clone());
    let result = optimizer.optimize(&project.parts, &project.materials);

    println!(
        "Placed {} of {} parts on {} bars ({}ms, {})",
        result.report.placed_parts,
        result.report.total_parts,
        result.used_materials.len(),
        result.report.processing_ms,
        result.report.strategy,
    );
    println!(
        "Utilization: {:.1}%   Shared cuts: {}   Savings: {:.1} mm",
        result.report.material_utilization * 100.0,
        result.report.shared_cut_pairs,
        result.total_savings,
    );

    for bar in &result.used_materials {
        println!(
            "  {} ({} mm): {:.1}% used",
            bar.instance_id,
            bar.material.length,
            bar.utilization * 100.0,
        );
    }
    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }
    for unplaced in &result.unplaced_parts {
        eprintln!(
            "unplaced: {}#{}: {}",
            unplaced.part_id, unplaced.instance_id, unplaced.reason
        );
    }

    if let Some(json_path) = &cli.export_json {
        fs::write(json_path, serde_json::to_string_pretty(&result)?)?;
        println!("Wrote plan to {}", json_path.display());
    }
    if let Some(csv_path) = &cli.export_csv {
        fs::write(csv_path, export::plan_to_csv(&result))?;
        println!("Wrote cut list to {}", csv_path.display());
    }

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}

fn run_estimate(path: &Path, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let project = load_project(path, cli)?;
    let estimate = quick_estimate(
        &project.parts,
        &project.materials,
        project.optimizer.angle_tolerance,
    );

    println!(
        "Parts: {} instances, {} mm total",
        estimate.total_parts, estimate.total_length_mm,
    );
    println!(
        "Shared-cut potential: {} matches, {:.1} mm ({:.1} mm per match)",
        estimate.match_count, estimate.potential_savings, estimate.average_savings_per_match,
    );
    println!(
        "Estimated stock: ~{} bars of {} mm",
        estimate.estimated_bars, estimate.estimated_bar_length,
    );
    Ok(())
}
