#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line reporter for the city operations analytics core.
//!
//! Loads the four stream CSVs, applies the date/zone filter, runs the
//! analytics components, and prints the results as text or JSON. This
//! binary is the presentation layer stand-in: it only ever touches the
//! core's output types, never raw records past the filter step.

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use city_pulse_analytics::filter::{FilterParams, filter_records};
use city_pulse_analytics::{anomaly, correlation, events, insights, kpi};
use city_pulse_analytics_models::{AnalyticsConfig, rule_catalog};
use city_pulse_records::DataSet;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "city_pulse_cli", about = "City operations analytics reporter")]
struct Cli {
    /// Directory containing the four stream CSV files
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// First day of the filter window (YYYY-MM-DD); defaults to the
    /// earliest record date
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day of the filter window (YYYY-MM-DD); defaults to the latest
    /// record date
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Comma-separated zones to include; defaults to every zone present
    #[arg(long)]
    zones: Option<String>,

    /// TOML file overriding the default policy thresholds
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// KPI snapshot, zone stress ranking, department stats, and
    /// recommendations
    Report,
    /// Rule-triggered operational event feed, most recent first
    Events,
    /// Cross-domain correlation matrix and key findings
    Correlate,
    /// Hourly traffic observations outside their statistical band
    Anomalies,
    /// The static processing rule catalog
    Rules,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Rules) {
        print_rules(cli.json)?;
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;
    let data = city_pulse_ingest::load_dataset(&cli.data_dir)?;
    let params = resolve_filter(&data, cli.from, cli.to, cli.zones.as_deref())?;
    log::info!(
        "Reporting window {} to {} across {} zones",
        params.start,
        params.end,
        params.zones.len()
    );
    let filtered = filter_records(&data, &params);

    match cli.command {
        Commands::Report => print_report(&filtered, &config, cli.json)?,
        Commands::Events => print_events(&filtered, &config, cli.json)?,
        Commands::Correlate => print_correlation(&filtered, &config, cli.json)?,
        Commands::Anomalies => print_anomalies(&filtered, &config, cli.json)?,
        // Handled before data loading.
        Commands::Rules => {}
    }

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<AnalyticsConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(AnalyticsConfig::default());
    };
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config = toml::from_str(&contents)
        .map_err(|e| format!("Invalid config {}: {e}", path.display()))?;
    log::info!("Loaded policy overrides from {}", path.display());
    Ok(config)
}

/// Resolves the filter window, defaulting to the full span of the loaded
/// data and every zone present in any stream.
fn resolve_filter(
    data: &DataSet,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    zones: Option<&str>,
) -> Result<FilterParams, Box<dyn std::error::Error>> {
    let bounds = date_bounds(data);
    let start = from
        .or_else(|| bounds.map(|(min, _)| min))
        .ok_or("No records loaded; supply --from/--to to define a window")?;
    let end = to
        .or_else(|| bounds.map(|(_, max)| max))
        .ok_or("No records loaded; supply --from/--to to define a window")?;
    if start > end {
        return Err(format!("--from {start} is after --to {end}").into());
    }

    let zones = zones.map_or_else(|| all_zones(data), parse_zones);
    if zones.is_empty() {
        return Err("No zones selected".into());
    }

    Ok(FilterParams { start, end, zones })
}

fn date_bounds(data: &DataSet) -> Option<(NaiveDate, NaiveDate)> {
    let dates = data
        .grievances
        .iter()
        .map(|r| r.date)
        .chain(data.energy.iter().map(|r| r.date))
        .chain(data.traffic.iter().map(|r| r.date))
        .chain(data.waste.iter().map(|r| r.date));

    dates.fold(None, |bounds, date| match bounds {
        None => Some((date, date)),
        Some((min, max)) => Some((min.min(date), max.max(date))),
    })
}

fn all_zones(data: &DataSet) -> BTreeSet<String> {
    data.grievances
        .iter()
        .map(|r| r.zone.clone())
        .chain(data.energy.iter().map(|r| r.zone.clone()))
        .chain(data.traffic.iter().map(|r| r.zone.clone()))
        .chain(data.waste.iter().map(|r| r.zone.clone()))
        .collect()
}

fn parse_zones(list: &str) -> BTreeSet<String> {
    list.split(',')
        .map(str::trim)
        .filter(|z| !z.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn print_report(
    data: &DataSet,
    config: &AnalyticsConfig,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let kpis = kpi::compute_kpis(data, config);
    let departments = insights::department_performance(&data.grievances);
    let recommendations = insights::recommendations(&kpis, config);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "kpis": kpis,
                "departments": departments,
                "recommendations": recommendations,
            }))?
        );
        return Ok(());
    }

    println!("City Operations Report");
    println!("======================");
    println!("Avg energy load:       {:.1} kWh", kpis.avg_energy);
    println!("Power cuts:            {}", kpis.power_cuts);
    println!("Voltage issues:        {}", kpis.voltage_issues);
    println!("Avg congestion:        {:.1}/100", kpis.avg_congestion);
    println!("Peak congestion:       {:.1}/100", kpis.peak_congestion);
    println!("Flow efficiency:       {:.1}%", kpis.flow_efficiency * 100.0);
    println!("Avg bin fill:          {:.1}%", kpis.avg_bin_fill);
    println!("Missed pickups:        {}", kpis.missed_pickups);
    println!("Avg segregation:       {:.1}%", kpis.avg_segregation);
    println!("Grievances:            {} total, {} open", kpis.total_grievances, kpis.open_grievances);
    println!("Critical issues:       {}", kpis.critical_issues);
    println!("Resolution rate:       {:.1}%", kpis.resolution_rate * 100.0);

    println!("\nZone stress (highest first):");
    let mut stress: Vec<_> = kpis.zone_stress.iter().collect();
    stress.sort_by(|a, b| b.1.total_cmp(a.1));
    for (zone, score) in stress {
        println!("  {zone:<20} {score:>8.1}");
    }

    if !departments.is_empty() {
        println!("\nDepartment performance:");
        for dept in &departments {
            println!(
                "  {:<16} {:>4} tickets, avg SLA {:>5.1} days, {:>5.1}% resolved",
                dept.department,
                dept.total_tickets,
                dept.avg_sla_days,
                dept.resolution_rate * 100.0
            );
        }
    }

    if recommendations.is_empty() {
        println!("\nNo recommendations triggered.");
    } else {
        println!("\nRecommendations:");
        for (i, rec) in recommendations.iter().enumerate() {
            println!("  {}. [{}] {} ({})", i + 1, rec.priority, rec.title, rec.category);
            println!("     {}", rec.description);
            println!("     Impact: {} | Cost: {} | Timeline: {}", rec.impact, rec.cost, rec.timeline);
        }
    }

    Ok(())
}

fn print_events(
    data: &DataSet,
    config: &AnalyticsConfig,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let feed = events::detect_events(data, Utc::now(), config);

    if json {
        println!("{}", serde_json::to_string_pretty(&feed)?);
        return Ok(());
    }

    if feed.is_empty() {
        println!("No events detected.");
        return Ok(());
    }
    for event in &feed {
        println!(
            "[{}] {} | {}: {} -> {}",
            event.timestamp.format("%H:%M:%S"),
            event.severity,
            event.domain,
            event.message,
            event.recommended_action
        );
    }
    Ok(())
}

fn print_correlation(
    data: &DataSet,
    config: &AnalyticsConfig,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    use city_pulse_analytics_models::CorrelationColumn;

    let matrix = correlation::correlation_matrix(data);
    let findings = insights::key_findings(&matrix, config);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "columns": CorrelationColumn::ALL,
                "matrix": matrix,
                "findings": findings,
            }))?
        );
        return Ok(());
    }

    println!("Cross-domain correlation matrix:");
    print!("{:<20}", "");
    for column in CorrelationColumn::ALL {
        print!("{column:>20}");
    }
    println!();
    for row in CorrelationColumn::ALL {
        print!("{:<20}", row.to_string());
        for column in CorrelationColumn::ALL {
            print!("{:>20.2}", matrix.get(row, column));
        }
        println!();
    }

    println!("\nKey findings:");
    for (i, finding) in findings.iter().enumerate() {
        println!("  {}. {finding}", i + 1);
    }
    Ok(())
}

fn print_anomalies(
    data: &DataSet,
    config: &AnalyticsConfig,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let flagged = anomaly::traffic_anomalies(&data.traffic, config);

    if json {
        println!("{}", serde_json::to_string_pretty(&flagged)?);
        return Ok(());
    }

    if flagged.is_empty() {
        println!("No traffic anomalies detected.");
        return Ok(());
    }
    println!("{} traffic anomalies requiring investigation:", flagged.len());
    for flag in &flagged {
        println!(
            "  hour {:>2}: congestion {:.1} outside [{:.1}, {:.1}]",
            flag.hour, flag.observed, flag.lower, flag.upper
        );
    }
    Ok(())
}

fn print_rules(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let rules = rule_catalog();

    if json {
        println!("{}", serde_json::to_string_pretty(rules)?);
        return Ok(());
    }

    println!("Active processing rules:");
    for rule in rules {
        println!(
            "  {} {:<28} {:<34} priority {}",
            rule.id, rule.name, rule.condition, rule.priority
        );
        println!("       action: {}", rule.action);
    }
    Ok(())
}
