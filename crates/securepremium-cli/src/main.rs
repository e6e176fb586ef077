//! SecurePremium CLI
//!
//! Device risk assessment and insurance premium calculator. Each invocation
//! operates on fresh in-process component instances; persistence belongs to
//! the storage layer behind the API.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::collections::HashMap;

use securepremium_common::types::telemetry::{DeviceMetrics, TpmStatus};
use securepremium_common::Severity;
use securepremium_pricing::{CoverageDistribution, PremiumEngine, PremiumModel};
use securepremium_reputation::ReputationNetwork;
use securepremium_risk::RiskCalculator;
use securepremium_scoring::DeviceScorer;

/// SecurePremium - device risk assessment and insurance premium calculator
#[derive(Parser, Debug)]
#[command(name = "securepremium")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Emit component logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Device registration and trust scoring
    Device(DeviceArgs),

    /// Risk assessment from telemetry
    Risk(RiskArgs),

    /// Premium quoting and cost estimation
    Quote(QuoteArgs),

    /// Reputation network operations
    Network(NetworkArgs),

    /// Show coverage tier configurations
    Tiers {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct DeviceArgs {
    #[command(subcommand)]
    command: DeviceCommands,
}

#[derive(Subcommand, Debug)]
enum DeviceCommands {
    /// Register a device and print its trust score
    Register {
        /// Unique device identifier
        #[arg(long)]
        device_id: String,

        /// Device fingerprint hash (falls back to a local digest if omitted)
        #[arg(long)]
        fingerprint: Option<String>,

        /// CPU information
        #[arg(long, default_value = "Unknown")]
        cpu: String,

        /// RAM amount
        #[arg(long, default_value = "Unknown")]
        ram: String,

        /// Operating system
        #[arg(long, default_value = "Unknown")]
        os: String,

        /// Device hostname
        #[arg(long, default_value = "Unknown")]
        hostname: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct RiskArgs {
    #[command(subcommand)]
    command: RiskCommands,
}

#[derive(Subcommand, Debug)]
enum RiskCommands {
    /// Assess device risk from telemetry values
    Assess {
        /// Device to assess
        #[arg(long)]
        device_id: String,

        /// Number of login failures
        #[arg(long, default_value_t = 0)]
        login_failures: u32,

        /// Total login attempts
        #[arg(long, default_value_t = 100)]
        total_logins: u32,

        /// TPM status: healthy, unavailable, or compromised
        #[arg(long, default_value = "healthy")]
        tpm_status: String,

        /// CPU usage percentage
        #[arg(long, default_value_t = 25.0)]
        cpu_usage: f64,

        /// Memory usage percentage
        #[arg(long, default_value_t = 50.0)]
        memory_usage: f64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct QuoteArgs {
    #[command(subcommand)]
    command: QuoteCommands,
}

#[derive(Subcommand, Debug)]
enum QuoteCommands {
    /// Generate a premium quote for a device
    Generate {
        /// Device to quote
        #[arg(long)]
        device_id: String,

        /// Coverage tier: basic, standard, or premium
        #[arg(long, default_value = "standard")]
        coverage: String,

        /// Reputation score in [0, 1]
        #[arg(long)]
        reputation: Option<f64>,

        /// Policy duration in months
        #[arg(long, default_value_t = 12)]
        duration: u32,

        /// Organization device count for volume discount
        #[arg(long)]
        devices: Option<u32>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Estimate fleet-wide annual cost
    Estimate {
        /// Total devices in the fleet
        #[arg(long)]
        devices: u32,

        /// Average risk score in [0, 1]
        #[arg(long)]
        avg_risk: f64,

        /// Average reputation score in [0, 1]
        #[arg(long, default_value_t = 0.5)]
        avg_reputation: f64,

        /// Fraction of fleet on the basic tier
        #[arg(long, default_value_t = 0.4)]
        basic: f64,

        /// Fraction of fleet on the standard tier
        #[arg(long, default_value_t = 0.4)]
        standard: f64,

        /// Fraction of fleet on the premium tier
        #[arg(long, default_value_t = 0.2)]
        premium: f64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct NetworkArgs {
    #[command(subcommand)]
    command: NetworkCommands,
}

#[derive(Subcommand, Debug)]
enum NetworkCommands {
    /// Submit a threat report and print the device's new standing
    Report {
        /// Reporting organization
        #[arg(long)]
        reporter: String,

        /// Device being reported
        #[arg(long)]
        device_id: String,

        /// Threat type label
        #[arg(long)]
        threat_type: String,

        /// Severity: critical, high, medium, or low
        #[arg(long, default_value = "medium")]
        severity: String,

        /// Report description
        #[arg(long, default_value = "")]
        description: String,

        /// Hex digest of supporting evidence
        #[arg(long, default_value = "00")]
        evidence_hash: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Device(args) => run_device(args.command),
        Commands::Risk(args) => run_risk(args.command),
        Commands::Quote(args) => run_quote(args.command),
        Commands::Network(args) => run_network(args.command),
        Commands::Tiers { json } => run_tiers(json),
    }
}

fn run_device(command: DeviceCommands) -> Result<()> {
    match command {
        DeviceCommands::Register {
            device_id,
            fingerprint,
            cpu,
            ram,
            os,
            hostname,
            json,
        } => {
            let mut scorer = DeviceScorer::new().with_fingerprint_service(
                securepremium_common::FingerprintService::fallback_only(),
            );

            let hardware_info = HashMap::from([
                ("cpu".to_string(), cpu.clone()),
                ("ram".to_string(), ram.clone()),
            ]);
            let system_info = HashMap::from([
                ("os".to_string(), os.clone()),
                ("hostname".to_string(), hostname.clone()),
            ]);

            let profile = scorer
                .register_device(&device_id, fingerprint.as_deref(), hardware_info, system_info)
                .context("failed to register device")?
                .clone();

            let (score, _) = scorer.calculate_device_score(&device_id)?;
            let category = scorer.get_device_score_category(score);

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "device_id": profile.device_id,
                        "status": "registered",
                        "fingerprint": profile.fingerprint_hash,
                        "trust_score": score,
                        "category": category.to_string(),
                        "timestamp": profile.last_seen,
                    }))?
                );
            } else {
                println!("[OK] Device registered successfully");
                println!("  Device ID:   {}", profile.device_id);
                println!("  Fingerprint: {}", profile.fingerprint_hash);
                println!("  CPU: {}  RAM: {}  OS: {}", cpu, ram, os);
                println!("  Trust score: {:.4} ({})", score, category);
            }
            Ok(())
        }
    }
}

fn run_risk(command: RiskCommands) -> Result<()> {
    match command {
        RiskCommands::Assess {
            device_id,
            login_failures,
            total_logins,
            tpm_status,
            cpu_usage,
            memory_usage,
            json,
        } => {
            let calculator = RiskCalculator::new();

            let metrics = DeviceMetrics::new()
                .with_logins(login_failures, total_logins)
                .with_tpm_status(parse_tpm_status(&tpm_status)?)
                .with_usage(cpu_usage, memory_usage)
                .with_timestamp(chrono::Utc::now());

            let assessment = calculator.calculate_risk(&device_id, &metrics, None, None);
            let category = calculator.get_risk_category(assessment.overall_risk_score);

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "assessment": assessment,
                        "risk_category": category.to_string(),
                    }))?
                );
            } else {
                println!("Risk Assessment for {}", device_id);
                println!("{}", "-".repeat(50));
                println!(
                    "Risk score:  {:.2}% ({})",
                    assessment.overall_risk_score * 100.0,
                    category
                );
                println!("  Behavioral: {:.4}", assessment.behavioral_risk);
                println!("  Hardware:   {:.4}", assessment.hardware_risk);
                println!("  Network:    {:.4}", assessment.network_risk);
                println!("  Anomaly:    {:.4}", assessment.anomaly_score);
                println!("Confidence:  {:.4}", assessment.confidence_level);
                for indicator in &assessment.threat_indicators {
                    println!("  ! {}", indicator);
                }
            }
            Ok(())
        }
    }
}

fn run_quote(command: QuoteCommands) -> Result<()> {
    let engine = PremiumEngine::new();

    match command {
        QuoteCommands::Generate {
            device_id,
            coverage,
            reputation,
            duration,
            devices,
            json,
        } => {
            let calculator = RiskCalculator::new();

            let metrics = DeviceMetrics::new()
                .with_logins(0, 100)
                .with_tpm_status(TpmStatus::Healthy)
                .with_usage(25.0, 50.0)
                .with_timestamp(chrono::Utc::now());
            let assessment = calculator.calculate_risk(&device_id, &metrics, None, None);

            let mut quote =
                engine.generate_quote(&device_id, &assessment, reputation, &coverage, duration)?;

            if let Some(device_count) = devices {
                quote = engine.apply_volume_discount(&quote, device_count);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&quote)?);
            } else {
                println!("Premium Quote for {}", quote.device_id);
                println!("{}", "-".repeat(50));
                println!("Coverage:        {}", quote.coverage_level);
                println!("Annual premium:  ${}", quote.annual_premium_usd.round_dp(2));
                println!("Monthly premium: ${}", quote.monthly_premium_usd.round_dp(2));
                println!("Risk multiplier: {:.4}", quote.risk_adjustment);
                println!("Discount rate:   {:.4}", quote.reputation_discount);
                println!("Valid until:     {}", quote.quote_valid_until.to_rfc3339());
            }
            Ok(())
        }

        QuoteCommands::Estimate {
            devices,
            avg_risk,
            avg_reputation,
            basic,
            standard,
            premium,
            json,
        } => {
            let distribution = CoverageDistribution {
                basic,
                standard,
                premium,
            };

            let estimate =
                engine.estimate_annual_cost(devices, avg_risk, avg_reputation, &distribution)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&estimate)?);
            } else {
                println!("Annual Cost Estimate ({} devices)", estimate.total_devices);
                println!("{}", "-".repeat(50));
                for tier in &estimate.breakdown_by_coverage {
                    println!(
                        "  {:<10} {:>5} devices @ ${}",
                        tier.coverage_tier.to_string(),
                        tier.device_count,
                        tier.premium_per_device.round_dp(2)
                    );
                }
                println!("Subtotal:        ${}", estimate.subtotal.round_dp(2));
                println!(
                    "Volume discount: {:.0}% (-${})",
                    estimate.volume_discount_rate * 100.0,
                    estimate.volume_discount_amount.round_dp(2)
                );
                println!("Total annual:    ${}", estimate.total_annual_cost.round_dp(2));
                println!(
                    "Per device/mo:   ${}",
                    estimate.cost_per_device_monthly.round_dp(2)
                );
            }
            Ok(())
        }
    }
}

fn run_network(command: NetworkCommands) -> Result<()> {
    match command {
        NetworkCommands::Report {
            reporter,
            device_id,
            threat_type,
            severity,
            description,
            evidence_hash,
            json,
        } => {
            let severity: Severity = severity
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;

            let mut network = ReputationNetwork::new("default");
            network.register_participant(&reporter);

            let report = network.submit_threat_report(
                &reporter,
                &device_id,
                &threat_type,
                severity,
                &description,
                &evidence_hash,
            )?;
            let risk_level = network.get_device_risk_level(&device_id);
            let stats = network.get_network_statistics();

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "report": report,
                        "risk_level": risk_level.to_string(),
                        "statistics": stats,
                    }))?
                );
            } else {
                println!("[OK] Threat report {} submitted", report.report_id);
                println!("  Device:     {}", device_id);
                println!("  Threat:     {} ({})", threat_type, report.severity);
                println!("  Risk level: {}", risk_level);
                println!("  Network now tracks {} device(s)", stats.tracked_devices);
            }
            Ok(())
        }
    }
}

fn run_tiers(json: bool) -> Result<()> {
    let model = PremiumModel::new();
    let tiers = model.get_all_tiers();

    if json {
        println!("{}", serde_json::to_string_pretty(&tiers)?);
    } else {
        for tier in tiers {
            println!(
                "{:<10} x{:<4} max claim ${:<7} deductible ${}",
                tier.tier_name.to_string(),
                tier.base_multiplier,
                tier.max_annual_claim,
                tier.deductible
            );
            for item in &tier.coverage_items {
                println!("    - {}", item);
            }
        }
    }
    Ok(())
}

fn parse_tpm_status(value: &str) -> Result<TpmStatus> {
    match value.to_lowercase().as_str() {
        "healthy" => Ok(TpmStatus::Healthy),
        "unavailable" => Ok(TpmStatus::Unavailable),
        "compromised" => Ok(TpmStatus::Compromised),
        other => bail!("unknown TPM status: {other} (expected healthy, unavailable, compromised)"),
    }
}
