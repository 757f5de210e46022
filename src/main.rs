//! ROI Toolkit CLI
//!
//! Command-line front end for the modeling engine: ROI by scenario, TCO,
//! sensitivity sweeps, Monte Carlo runs and break-even search.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use roi_toolkit::analysis::{
    run_sensitivity, SensitivityOutcome, SensitivityRequest, TornadoBar, DEFAULT_SWEEP_STEPS,
};
use roi_toolkit::assumptions::loader::DEFAULT_ASSUMPTIONS_PATH;
use roi_toolkit::inputs::{ClientInputsRaw, DEFAULT_ANALYSIS_YEARS, DEFAULT_DISCOUNT_RATE};
use roi_toolkit::{
    Assumptions, ClientInputs, Industry, MonteCarloSimulator, RoiModel, RoiOutcome, RoiResult, Scenario,
    ScenarioSelector, SensitivityAnalyzer, TargetMetric, TcoModel, Variable,
};

/// Implementation cost as a multiple of the annual license when not given
const DEFAULT_IMPLEMENTATION_MULTIPLIER: f64 = 1.2;

const DEFAULT_TCO_YEARS: u32 = 5;

/// ROI, TCO and sensitivity modeling for product adoption business cases
#[derive(Parser)]
#[command(name = "roi", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Directory with assumption CSV files
    #[arg(long, global = true)]
    assumptions: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// ROI, payback, NPV and IRR for one scenario or all of them
    Calculate {
        #[command(flatten)]
        inputs: InputArgs,

        /// conservative, moderate, aggressive or all
        #[arg(long, default_value = "all")]
        scenario: String,
    },
    /// Total cost of ownership against the status quo
    Tco {
        #[command(flatten)]
        inputs: InputArgs,

        /// TCO horizon in years
        #[arg(long, default_value_t = DEFAULT_TCO_YEARS)]
        horizon: u32,

        /// Leave out hidden costs
        #[arg(long)]
        no_hidden: bool,

        /// Write the yearly projection to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Sweep one input, or run a Monte Carlo simulation
    Sensitivity {
        #[command(flatten)]
        inputs: InputArgs,

        #[command(flatten)]
        target: TargetArgs,

        /// Input to vary
        #[arg(long, default_value = "efficiency_gain")]
        variable: String,

        /// Fraction of the base value to vary in each direction
        #[arg(long = "range", default_value_t = 0.2)]
        range_fraction: f64,

        #[arg(long, default_value_t = DEFAULT_SWEEP_STEPS)]
        steps: usize,

        /// Low/high evaluation of every input, largest impact first
        #[arg(long, conflicts_with = "monte_carlo")]
        tornado: bool,

        #[arg(long)]
        monte_carlo: bool,

        #[arg(long)]
        iterations: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,

        /// Spread Monte Carlo iterations over all cores
        #[arg(long, requires = "monte_carlo")]
        parallel: bool,

        /// Write sweep points or samples to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Input value at which the metric crosses zero
    BreakEven {
        #[command(flatten)]
        inputs: InputArgs,

        #[command(flatten)]
        target: TargetArgs,

        #[arg(long, default_value = "efficiency_gain")]
        variable: String,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Current annual cost of the process
    #[arg(long)]
    current_cost: f64,

    /// Expected efficiency gain (0-1)
    #[arg(long)]
    efficiency: f64,

    #[arg(long)]
    annual_license: f64,

    /// One-time implementation cost [default: 1.2 x annual license]
    #[arg(long)]
    implementation: Option<f64>,

    #[arg(long, default_value_t = DEFAULT_ANALYSIS_YEARS)]
    years: u32,

    #[arg(long, default_value_t = DEFAULT_DISCOUNT_RATE)]
    discount_rate: f64,

    #[arg(long, default_value = "general")]
    industry: String,
}

impl InputArgs {
    fn to_inputs(&self) -> anyhow::Result<ClientInputs> {
        let industry: Industry = self.industry.parse()?;
        let raw = ClientInputsRaw {
            current_annual_cost: self.current_cost,
            efficiency_gain: self.efficiency,
            annual_license_cost: self.annual_license,
            implementation_cost: self
                .implementation
                .unwrap_or(self.annual_license * DEFAULT_IMPLEMENTATION_MULTIPLIER),
            analysis_years: self.years,
            discount_rate: self.discount_rate,
            industry,
        };
        Ok(ClientInputs::try_from(raw)?)
    }
}

#[derive(Args)]
struct TargetArgs {
    #[arg(long, default_value = "moderate")]
    scenario: String,

    /// roi, npv or net_annual_benefit
    #[arg(long, default_value = "roi")]
    metric: String,
}

impl TargetArgs {
    fn resolve(&self) -> anyhow::Result<(Scenario, TargetMetric)> {
        Ok((self.scenario.parse()?, self.metric.parse()?))
    }
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    command: &'a str,
    generated_at: String,
    result: &'a T,
}

fn print_json<T: Serialize>(command: &str, result: &T) -> anyhow::Result<()> {
    let envelope = Envelope {
        command,
        generated_at: chrono::Utc::now().to_rfc3339(),
        result,
    };
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

fn write_csv<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

fn load_assumptions(dir: Option<&Path>) -> anyhow::Result<Assumptions> {
    let default_dir = Path::new(DEFAULT_ASSUMPTIONS_PATH);
    let dir = match dir {
        Some(dir) => dir,
        None if default_dir.is_dir() => default_dir,
        None => {
            log::debug!("No assumptions directory; using built-in defaults");
            return Ok(Assumptions::default());
        }
    };
    Assumptions::from_csv_path(dir).map_err(|e| anyhow!("loading assumptions from {}: {e}", dir.display()))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let assumptions = load_assumptions(cli.assumptions.as_deref())?;
    let model = RoiModel::try_new(assumptions)?;

    match &cli.command {
        Commands::Calculate { inputs, scenario } => {
            let inputs = inputs.to_inputs()?;
            let selector: ScenarioSelector = scenario.parse()?;
            let outcome = model.calculate(&inputs, selector)?;

            if cli.json {
                return print_json("calculate", &outcome);
            }
            match &outcome {
                RoiOutcome::Single(result) => print_roi_table([result]),
                RoiOutcome::All(results) => print_roi_table(results),
            }
        }
        Commands::Tco { inputs, horizon, no_hidden, csv } => {
            let inputs = inputs.to_inputs()?;
            let comparison = TcoModel::new(model.assumptions()).compare(&inputs, *horizon, !*no_hidden)?;

            if let Some(path) = csv {
                write_csv(path, &comparison.projection.records)?;
            }
            if cli.json {
                return print_json("tco", &comparison);
            }

            println!("TCO over {} years (hidden costs {})", horizon, if *no_hidden { "excluded" } else { "included" });
            println!("{:>4} {:>14} {:>14} {:>14} {:>14} {:>14}", "Year", "One-time", "Ongoing", "Hidden", "Cumulative", "Status quo");
            println!("{}", "-".repeat(80));
            for (record, year) in comparison.projection.records.iter().zip(&comparison.yearly) {
                println!(
                    "{:>4} {:>14.2} {:>14.2} {:>14.2} {:>14.2} {:>14.2}",
                    record.year,
                    record.one_time_cost,
                    record.ongoing_cost,
                    record.hidden_cost,
                    record.cumulative_cost,
                    year.status_quo_cumulative
                );
            }
            println!();
            println!("Status quo TCO:   ${:>14.2}", comparison.status_quo_total);
            println!("Future state TCO: ${:>14.2}", comparison.future_total);
            println!("Savings:          ${:>14.2} ({:.1}%)", comparison.savings, comparison.savings_percent);
        }
        Commands::Sensitivity {
            inputs,
            target,
            variable,
            range_fraction,
            steps,
            tornado,
            monte_carlo,
            iterations,
            seed,
            parallel,
            csv,
        } => {
            let inputs = inputs.to_inputs()?;
            let (scenario, metric) = target.resolve()?;

            if *tornado {
                let bars = SensitivityAnalyzer::new(&model)
                    .with_scenario(scenario)
                    .with_metric(metric)
                    .tornado(&inputs, &Variable::ALL, *range_fraction)?;
                if let Some(path) = csv {
                    write_csv(path, &bars)?;
                }
                if cli.json {
                    return print_json("tornado", &bars);
                }
                print_tornado(&bars, metric);
                return Ok(());
            }

            let outcome = if *parallel {
                variable.parse::<Variable>()?;
                let mut simulator = MonteCarloSimulator::new(&model).with_scenario(scenario).with_metric(metric);
                if let Some(seed) = seed {
                    simulator = simulator.with_seed(*seed);
                }
                let iterations = iterations.unwrap_or_else(|| simulator.default_iterations());
                let specs = simulator.default_specs(&inputs);
                SensitivityOutcome::MonteCarlo(simulator.simulate_parallel(&inputs, iterations, &specs)?)
            } else {
                let request = SensitivityRequest {
                    variable: variable.clone(),
                    range_fraction: *range_fraction,
                    steps: *steps,
                    scenario,
                    metric,
                    monte_carlo: *monte_carlo,
                    iterations: *iterations,
                    seed: *seed,
                };
                run_sensitivity(&model, &inputs, &request)?
            };

            if let Some(path) = csv {
                match &outcome {
                    SensitivityOutcome::Sweep(result) => write_csv(path, &result.points)?,
                    SensitivityOutcome::MonteCarlo(result) => write_csv(
                        path,
                        result.samples.iter().enumerate().map(|(i, &value)| SampleRow { iteration: i + 1, value }),
                    )?,
                }
            }
            if cli.json {
                return print_json("sensitivity", &outcome);
            }

            match &outcome {
                SensitivityOutcome::Sweep(result) => {
                    println!("Sensitivity of {} to {} ({} scenario)", result.metric, result.variable.label(), result.scenario);
                    println!("{:>16} {:>16}", "Input", result.metric.as_str());
                    println!("{}", "-".repeat(34));
                    for point in &result.points {
                        println!("{:>16.4} {:>16.4}", point.input_value, point.metric_value);
                    }
                    match result.break_even {
                        Some(value) => println!("\nBreak-even inside range at {value:.4}"),
                        None => println!("\nNo break-even inside range"),
                    }
                }
                SensitivityOutcome::MonteCarlo(result) => {
                    println!("Monte Carlo ({} iterations, {} scenario)", result.iterations, result.scenario);
                    println!("  P10:  {:>12.2}", result.p10);
                    println!("  P50:  {:>12.2}", result.p50);
                    println!("  P90:  {:>12.2}", result.p90);
                    println!("  Mean: {:>12.2}  Std: {:.2}", result.mean, result.std_dev);
                    println!("  P({} > 0):          {:.1}%", result.metric, result.probability_positive * 100.0);
                    println!("  P({} > {}): {:.1}%", result.metric, result.hurdle, result.probability_above_hurdle * 100.0);
                }
            }
        }
        Commands::BreakEven { inputs, target, variable } => {
            let inputs = inputs.to_inputs()?;
            let (scenario, metric) = target.resolve()?;
            let variable: Variable = variable.parse()?;
            let report = SensitivityAnalyzer::new(&model)
                .with_scenario(scenario)
                .with_metric(metric)
                .break_even_report(&inputs, variable)?;

            if cli.json {
                return print_json("break-even", &report);
            }

            match report.break_even {
                Some(value) => {
                    println!(
                        "{} break-even on {}: {:.4} (base {:.4})",
                        variable.label(),
                        metric,
                        value,
                        report.base_value
                    );
                    if let (Some(multiplier), Some(margin)) =
                        (report.break_even_multiplier, report.margin_of_safety_percent)
                    {
                        println!("  {multiplier:.3} x base, margin of safety {margin:.1}%");
                    }
                }
                None => println!("{} has no break-even on {} within its search range", variable.label(), metric),
            }
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct SampleRow {
    iteration: usize,
    value: f64,
}

fn print_roi_table<'a>(results: impl IntoIterator<Item = &'a RoiResult>) {
    println!(
        "{:<13} {:>14} {:>14} {:>10} {:>10} {:>14} {:>8}",
        "Scenario", "Savings", "Net Benefit", "ROI %", "Payback", "NPV", "IRR %"
    );
    println!("{}", "-".repeat(90));
    for result in results {
        let payback = result
            .payback_months
            .map(|m| format!("{m:.1} mo"))
            .unwrap_or_else(|| "never".to_string());
        let irr = result
            .irr
            .map(|r| format!("{:.1}", r * 100.0))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "{:<13} {:>14.2} {:>14.2} {:>10.1} {:>10} {:>14.2} {:>8}",
            result.scenario.as_str(),
            result.annual_savings,
            result.net_annual_benefit,
            result.final_roi_percent(),
            payback,
            result.npv,
            irr
        );
    }
}

fn print_tornado(bars: &[TornadoBar], metric: TargetMetric) {
    println!("Tornado ({metric})");
    println!("{:<22} {:>14} {:>14} {:>12}", "Variable", "Low", "High", "Impact");
    println!("{}", "-".repeat(64));
    for bar in bars {
        println!(
            "{:<22} {:>14.4} {:>14.4} {:>12.4}",
            bar.variable.label(),
            bar.low_metric,
            bar.high_metric,
            bar.impact_range
        );
    }
}
