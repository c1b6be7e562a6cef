//! fitcalc - compute ship fitting statistics from the command line

mod fitting_file;
mod report;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use fit_core::config::{load_catalog, load_constants};
use fit_core::{
    default_catalog, ActivationPolicy, Catalog, ComputeOptions, DamageProfile, DamageType, EngineConstants,
    FittingOrchestrator, TargetProfile,
};
use fitting_file::FittingFile;
use report::Report;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "fitcalc", about = "Ship fitting calculator", version)]
struct Cli {
    /// Reference data TOML; the bundled frigate catalog when omitted
    #[arg(long, global = true)]
    reference: Option<PathBuf>,

    /// Log more (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute every statistic of a fitting file
    Compute(ComputeArgs),
    /// List the hulls, modules or skills of the reference data
    List {
        #[arg(value_enum, default_value_t = Listing::Hulls)]
        what: Listing,
    },
}

#[derive(Args)]
struct ComputeArgs {
    /// Fitting file (TOML)
    fitting: PathBuf,

    /// Engine constants TOML
    #[arg(long)]
    constants: Option<PathBuf>,

    /// Incoming damage: omni, em, thermal, kinetic, explosive or four weights "em,th,ki,ex"
    #[arg(long, value_parser = parse_profile)]
    profile: Option<DamageProfile>,

    /// Target signature radius in meters; enables applied DPS
    #[arg(long)]
    target_sig: Option<f64>,

    /// Target velocity, m/s
    #[arg(long, requires = "target_sig")]
    target_velocity: Option<f64>,

    /// Target angular velocity, rad/s
    #[arg(long, requires = "target_sig")]
    target_angular: Option<f64>,

    /// Target distance, meters
    #[arg(long, requires = "target_sig")]
    target_distance: Option<f64>,

    /// Spread identical modules' first activation over their cycle
    #[arg(long)]
    staggered: bool,

    /// Print the snapshot as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Listing {
    Hulls,
    Modules,
    Skills,
}

fn parse_profile(s: &str) -> Result<DamageProfile, String> {
    match s {
        "omni" => return Ok(DamageProfile::omni()),
        "em" => return Ok(DamageProfile::pure(DamageType::Em)),
        "thermal" => return Ok(DamageProfile::pure(DamageType::Thermal)),
        "kinetic" => return Ok(DamageProfile::pure(DamageType::Kinetic)),
        "explosive" => return Ok(DamageProfile::pure(DamageType::Explosive)),
        _ => {}
    }

    let weights = s
        .split(',')
        .map(|w| w.trim().parse::<f64>().map_err(|e| format!("bad weight '{}': {}", w, e)))
        .collect::<Result<Vec<_>, _>>()?;
    match weights.as_slice() {
        [em, th, ki, ex] => DamageProfile::new(*em, *th, *ki, *ex)
            .ok_or_else(|| "weights must be non-negative and not all zero".to_string()),
        _ => Err(format!("expected four comma separated weights, got {}", weights.len())),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn load_reference(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(path) => load_catalog(path).with_context(|| format!("failed to load reference data {}", path.display())),
        None => default_catalog().context("bundled reference data is invalid"),
    }
}

async fn run_compute(reference: Catalog, args: ComputeArgs) -> Result<()> {
    let constants = match &args.constants {
        Some(path) => load_constants(path).with_context(|| format!("failed to load constants {}", path.display()))?,
        None => EngineConstants::default(),
    };
    let loaded = FittingFile::load(&args.fitting)?.resolve(&reference)?;

    // Command line choices win over the fitting file's
    let target = match args.target_sig {
        Some(signature_radius) => Some(TargetProfile {
            signature_radius,
            velocity: args.target_velocity.unwrap_or(0.0),
            angular_velocity: args.target_angular.unwrap_or(0.0),
            distance: args.target_distance.unwrap_or(0.0),
        }),
        None => loaded.target,
    };
    let options = ComputeOptions {
        damage_profile: args.profile.or(loaded.profile).unwrap_or_default(),
        target,
        activation: if args.staggered {
            ActivationPolicy::Staggered
        } else {
            ActivationPolicy::Simultaneous
        },
    };

    let (orchestrator, mut deliveries) = FittingOrchestrator::new(Arc::new(reference), constants);
    orchestrator.set_options(options);
    let revision = orchestrator.submit(loaded.fitting, loaded.skills);
    info!(%revision, hull = %loaded.name, "fitting submitted");

    let delivery = deliveries
        .recv()
        .await
        .context("orchestrator stopped before delivering")?;
    let stats = delivery.result?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&*stats)?);
    } else {
        print!("{}", Report::new(&loaded.name, &stats));
    }
    Ok(())
}

fn run_list(reference: &Catalog, what: Listing) {
    let mut names: Vec<&str> = match what {
        Listing::Hulls => reference.hulls().map(|h| h.name.as_str()).collect(),
        Listing::Modules => reference.modules().map(|m| m.name.as_str()).collect(),
        Listing::Skills => reference.skills().map(|s| s.name.as_str()).collect(),
    };
    names.sort_unstable();
    for name in names {
        println!("{}", name);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let reference = load_reference(cli.reference.as_deref())?;
    match cli.command {
        Commands::Compute(args) => run_compute(reference, args).await,
        Commands::List { what } => {
            run_list(&reference, what);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_profile() {
        assert_eq!(parse_profile("omni").unwrap(), DamageProfile::omni());
        assert_eq!(parse_profile("em").unwrap(), DamageProfile::pure(DamageType::Em));

        let mixed = parse_profile("0, 0, 3, 1").unwrap();
        assert!((mixed.weight(DamageType::Kinetic) - 0.75).abs() < 1e-12);

        assert!(parse_profile("1,2,3").is_err());
        assert!(parse_profile("0,0,0,0").is_err());
        assert!(parse_profile("a,b,c,d").is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_target_flags_require_signature() {
        assert!(Cli::try_parse_from(["fitcalc", "compute", "fit.toml", "--target-velocity", "300"]).is_err());
        let cli = Cli::try_parse_from(["fitcalc", "compute", "fit.toml", "--target-sig", "40", "--staggered"]).unwrap();
        match cli.command {
            Commands::Compute(args) => {
                assert_eq!(args.target_sig, Some(40.0));
                assert!(args.staggered);
            }
            Commands::List { .. } => panic!("expected compute"),
        }
    }
}
