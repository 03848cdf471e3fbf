//! Burrow rates CLI
//!
//! Command-line interface for rate conversion, rate curves and reward APY.

use anyhow::Context;
use bigdecimal::BigDecimal;
use burrow_rates::math::format_fixed;
use burrow_rates::{
    AssetPosition, BoostEngine, BoostedShares, CalculatorConfig, FarmQuery, FarmSnapshotBooster,
    FixedPointRate, InterestRateModel, LoggingConfig, RewardEstimator, RewardFarmState,
    RewardSide, StakingBoost,
};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "burrow")]
#[command(version)]
#[command(about = "Burrow lending protocol - interest rate and reward APY calculator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "burrow.toml")]
    config: PathBuf,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert an annual percentage to a fixed-point per-period rate
    AprToRate {
        /// Annual percentage, e.g. 5.23
        apr: String,
    },

    /// Convert a fixed-point per-period rate to an annual percentage
    RateToApr {
        /// Rate scaled by 10^27
        rate: String,
    },

    /// Sample a market's borrow and supply rates across utilization
    Curve {
        /// Utilization at the kink, basis points
        #[arg(long, default_value = "8000")]
        target_utilization: u32,

        /// Fixed-point rate at the kink
        #[arg(long)]
        target_rate: FixedPointRate,

        /// Fixed-point rate at full utilization
        #[arg(long)]
        max_rate: FixedPointRate,

        /// Protocol reserve share, basis points
        #[arg(long, default_value = "2000")]
        reserve_ratio: u32,

        /// Utilization step in percent
        #[arg(long, default_value = "5")]
        step: u32,
    },

    /// Market reward APY from a JSON farm snapshot
    RewardApy {
        /// JSON input file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Staking reward APY from a JSON farm snapshot
    StakingApy {
        /// JSON input file
        #[arg(short, long)]
        input: PathBuf,
    },
}

/// Farm snapshot handed over by the data-fetching layer
#[derive(Debug, Deserialize)]
struct RewardInput {
    side: RewardSide,
    position: AssetPosition,
    farm: RewardFarmState,
    #[serde(default)]
    boost: StakingBoost,
    /// Market-wide USD deposits on `side`; required by `reward-apy`
    #[serde(default)]
    total_deposits_usd: Option<BigDecimal>,
}

#[derive(Debug, Serialize)]
struct ApyReport {
    asset_id: String,
    side: RewardSide,
    apy: String,
    boost: BoostedShares,
}

fn init_logging(verbose: bool, logging: &LoggingConfig) {
    let env_filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    if logging.json {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr);
        registry.with(layer).init();
    } else {
        let layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_writer(std::io::stderr);
        registry.with(layer).init();
    }
}

fn load_config(path: &Path) -> anyhow::Result<CalculatorConfig> {
    if path.exists() {
        CalculatorConfig::load(path).with_context(|| format!("loading {}", path.display()))
    } else {
        Ok(CalculatorConfig::default())
    }
}

fn load_reward_input(path: &Path) -> anyhow::Result<RewardInput> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn reward_report<B: BoostEngine>(
    estimator: &RewardEstimator<B>,
    input: &RewardInput,
    staking: bool,
) -> anyhow::Result<ApyReport> {
    let query = FarmQuery {
        side: input.side,
        position: &input.position,
        farm: &input.farm,
        boost: &input.boost,
    };

    let deposits = match (staking, input.total_deposits_usd.as_ref()) {
        (true, _) => None,
        (false, Some(deposits)) => Some(deposits),
        (false, None) => anyhow::bail!("reward-apy needs total_deposits_usd in the input"),
    };

    // one engine run feeds both the APY and the report
    let boost = estimator.boosted_shares(&query)?;
    let apy = match deposits {
        Some(deposits) => estimator.reward_apy_for_shares(&query, &boost, deposits),
        None => estimator.staking_apy_for_shares(&query, &boost),
    };

    Ok(ApyReport {
        asset_id: input.position.asset_id.clone(),
        side: input.side,
        apy: format_fixed(&apy, 2),
        boost,
    })
}

fn run_reward(config: &CalculatorConfig, path: &Path, staking: bool) -> anyhow::Result<ApyReport> {
    let input = load_reward_input(path)?;
    let decimals = config.booster.booster_decimals;
    let precision = config.rates.working_precision;

    match config.log_booster()? {
        Some(booster) => {
            tracing::info!("Using logarithmic booster");
            let estimator = RewardEstimator::new(booster)
                .with_booster_decimals(decimals)
                .with_precision(precision)?;
            reward_report(&estimator, &input, staking)
        }
        None => {
            tracing::info!("No booster log base configured, using farm snapshot multipliers");
            let estimator = RewardEstimator::new(FarmSnapshotBooster)
                .with_booster_decimals(decimals)
                .with_precision(precision)?;
            reward_report(&estimator, &input, staking)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    init_logging(cli.verbose, &config.logging);

    let converter = config.rate_converter()?;
    tracing::debug!(
        periods_per_year = converter.periods_per_year(),
        precision = converter.precision(),
        "calculator ready"
    );

    match cli.command {
        Commands::AprToRate { apr } => {
            let rate = converter.apr_to_rate(&apr)?;
            println!("{}", rate);
        }

        Commands::RateToApr { rate } => {
            println!("{}", converter.rate_to_apr(&rate)?);
        }

        Commands::Curve { target_utilization, target_rate, max_rate, reserve_ratio, step } => {
            let model = InterestRateModel {
                target_utilization_bps: target_utilization,
                target_utilization_rate: target_rate,
                max_utilization_rate: max_rate,
                reserve_ratio_bps: reserve_ratio,
            };
            let points = model.curve(&converter, step)?;
            println!("{}", serde_json::to_string_pretty(&points)?);
        }

        Commands::RewardApy { input } => {
            let report = run_reward(&config, &input, false)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::StakingApy { input } => {
            let report = run_reward(&config, &input, true)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
