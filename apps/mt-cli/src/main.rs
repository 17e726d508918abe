use clap::{Parser, Subcommand, ValueEnum};
use mt_core::{NormFiberLength, NormTendonLength, NormVelocity};
use mt_project::{Project, ProjectError, build_model, muscle_params, sim_options};
use mt_sim::{FiberSnapshot, SimError, run_sim};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mt-cli")]
#[command(about = "Musculotendon CLI - Thelen 2003 Hill-type actuator simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax and structure
    Validate {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
    },
    /// Solve fiber/tendon equilibrium at t = 0 and print the fiber state
    Equilibrium {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
    },
    /// Sample the constitutive curves of one muscle as CSV
    Curves {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
        /// Muscle ID
        #[arg(short, long)]
        muscle: String,
        /// Samples per curve
        #[arg(short, long, default_value_t = 101)]
        points: usize,
    },
    /// Run a transient simulation
    Simulate {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
        /// Override the time step (s)
        #[arg(long)]
        dt: Option<f64>,
        /// Override the end time (s)
        #[arg(long)]
        t_end: Option<f64>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
        /// Output file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("Muscle error: {0}")]
    Muscle(#[from] mt_muscle::MuscleError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Muscle not found: {0}")]
    UnknownMuscle(String),

    #[error("Invalid argument: {0}")]
    InvalidArg(&'static str),
}

type CliResult<T> = Result<T, CliError>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Equilibrium { project_path } => cmd_equilibrium(&project_path),
        Commands::Curves {
            project_path,
            muscle,
            points,
        } => cmd_curves(&project_path, &muscle, points),
        Commands::Simulate {
            project_path,
            dt,
            t_end,
            format,
            output,
        } => cmd_simulate(&project_path, dt, t_end, format, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load(project_path: &Path) -> CliResult<Project> {
    Ok(mt_project::load(project_path)?)
}

fn cmd_validate(project_path: &Path) -> CliResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = load(project_path)?;
    // Building also checks every parameter and the t = 0 equilibrium.
    build_model(&project)?;
    println!("✓ Project is valid ({} muscles)", project.muscles.len());
    Ok(())
}

#[derive(Serialize)]
struct SnapshotRow<'a> {
    muscle: &'a str,
    activation: f64,
    fiber_length_m: f64,
    normalized_fiber_length: f64,
    pennation_angle_rad: f64,
    tendon_length_m: f64,
    active_fiber_force_n: f64,
    passive_fiber_force_n: f64,
    fiber_force_n: f64,
    tendon_force_n: f64,
    stress: f64,
}

impl<'a> SnapshotRow<'a> {
    fn new(muscle: &'a str, s: &FiberSnapshot) -> Self {
        Self {
            muscle,
            activation: s.activation,
            fiber_length_m: s.fiber_length.value,
            normalized_fiber_length: s.normalized_fiber_length.value(),
            pennation_angle_rad: s.pennation_angle.value,
            tendon_length_m: s.tendon_length.value,
            active_fiber_force_n: s.active_fiber_force.value,
            passive_fiber_force_n: s.passive_fiber_force.value,
            fiber_force_n: s.fiber_force.value,
            tendon_force_n: s.tendon_force.value,
            stress: s.stress,
        }
    }
}

fn cmd_equilibrium(project_path: &Path) -> CliResult<()> {
    let project = load(project_path)?;
    let mut model = build_model(&project)?;
    let x = model.store().values().clone();
    let snapshots = model.snapshots(0.0, &x)?;

    let rows: Vec<SnapshotRow<'_>> = model
        .units()
        .iter()
        .zip(&snapshots)
        .map(|(unit, s)| SnapshotRow::new(unit.actuator.name(), s))
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn cmd_curves(project_path: &Path, muscle_id: &str, points: usize) -> CliResult<()> {
    if points < 2 {
        return Err(CliError::InvalidArg("points must be at least 2"));
    }
    let project = load(project_path)?;
    let def = project
        .muscles
        .iter()
        .find(|m| m.id == muscle_id)
        .ok_or_else(|| CliError::UnknownMuscle(muscle_id.to_string()))?;
    let params = muscle_params(&def.params)?;
    let curves = params.curves();
    let tendon_strain_max = 2.0 * params.fmax_tendon_strain();

    let mut csv = String::from(
        "x,active_force_length,passive_force_length,tendon_strain,tendon_force,velocity,force_velocity\n",
    );
    let last = (points - 1) as f64;
    for i in 0..points {
        let frac = i as f64 / last;
        // Fiber length in [0, 2] Lopt, tendon strain in [0, 2 e0], velocity in [-1, 1] vmax.
        let lf = NormFiberLength(2.0 * frac);
        let strain = tendon_strain_max * frac;
        let v = NormVelocity(2.0 * frac - 1.0);
        csv.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            lf.value(),
            curves.active.force(lf).value(),
            curves.passive.elastic_force(lf).value(),
            strain,
            curves.tendon.force(NormTendonLength(1.0 + strain)).value(),
            v.value(),
            curves.force_velocity.multiplier(v),
        ));
    }
    print!("{}", csv);
    Ok(())
}

fn cmd_simulate(
    project_path: &Path,
    dt: Option<f64>,
    t_end: Option<f64>,
    format: OutputFormat,
    output: Option<&Path>,
) -> CliResult<()> {
    let project = load(project_path)?;
    let mut opts = sim_options(&project.simulation);
    if let Some(dt) = dt {
        opts.dt = dt;
        opts.min_dt = dt * 1e-4;
    }
    if let Some(t_end) = t_end {
        opts.t_end = t_end;
    }

    let mut model = build_model(&project)?;
    let start = Instant::now();
    let record = run_sim(&mut model, &opts)?;
    let elapsed = start.elapsed().as_secs_f64();
    tracing::info!(
        records = record.t.len(),
        elapsed_s = elapsed,
        "simulation complete"
    );

    let names: Vec<String> = model
        .units()
        .iter()
        .map(|u| u.actuator.name().to_string())
        .collect();
    let mut frames = Vec::with_capacity(record.t.len());
    for (t, x) in record.t.iter().zip(&record.x) {
        frames.push((*t, model.snapshots(*t, x)?));
    }

    let content = match format {
        OutputFormat::Csv => simulation_csv(&names, &frames),
        OutputFormat::Json => simulation_json(&names, &frames)?,
    };

    if let Some(path) = output {
        std::fs::write(path, content)?;
        println!(
            "✓ Exported {} time points to {} ({:.3}s)",
            frames.len(),
            path.display(),
            elapsed
        );
    } else {
        print!("{}", content);
    }
    Ok(())
}

fn simulation_csv(names: &[String], frames: &[(f64, Vec<FiberSnapshot>)]) -> String {
    let mut csv = String::from("time_s");
    for name in names {
        csv.push_str(&format!(
            ",{name}.activation,{name}.fiber_length_m,{name}.pennation_angle_rad,{name}.tendon_force_n"
        ));
    }
    csv.push('\n');
    for (t, snapshots) in frames {
        csv.push_str(&t.to_string());
        for s in snapshots {
            csv.push_str(&format!(
                ",{},{},{},{}",
                s.activation, s.fiber_length.value, s.pennation_angle.value, s.tendon_force.value
            ));
        }
        csv.push('\n');
    }
    csv
}

#[derive(Serialize)]
struct Frame<'a> {
    time_s: f64,
    muscles: Vec<SnapshotRow<'a>>,
}

fn simulation_json(names: &[String], frames: &[(f64, Vec<FiberSnapshot>)]) -> CliResult<String> {
    let frames: Vec<Frame<'_>> = frames
        .iter()
        .map(|(t, snapshots)| Frame {
            time_s: *t,
            muscles: names
                .iter()
                .zip(snapshots)
                .map(|(name, s)| SnapshotRow::new(name, s))
                .collect(),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&frames)?)
}
