//! dbpulse - one-shot MySQL health snapshot.
//!
//! Connects to one schema, assembles a snapshot and prints it as JSON or as
//! a short text report. Logs go to stderr so JSON on stdout stays parseable.
//!
//! Usage:
//!   dbpulse --database shop                  # JSON, connection from MYSQL_* env
//!   dbpulse --database shop --format text    # human-readable report
//!   dbpulse -h db1 -u monitor -d shop -v     # debug logging

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::{Level, error};
use tracing_subscriber::EnvFilter;

use dbpulse::collector::MysqlIntrospector;
use dbpulse::credentials::DEFAULT_PORT;
use dbpulse::fmt::{
    format_count, format_duration, format_mb, format_measure, format_percent, format_rate,
};
use dbpulse::models::Unit;
use dbpulse::{ConnectionParams, MonitorConfig, MonitorError, Section, Snapshot, SnapshotAssembler};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

/// MySQL metrics and health snapshot.
#[derive(Parser)]
#[command(name = "dbpulse", about = "MySQL metrics and health snapshot", version, disable_help_flag = true)]
struct Args {
    /// Server host name or IP address.
    #[arg(short = 'h', long, env = "MYSQL_HOST", default_value = "localhost")]
    host: String,

    /// Server TCP port.
    #[arg(short = 'P', long, env = "MYSQL_TCP_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Login name. Falls back to $USER.
    #[arg(short, long, env = "MYSQL_USER")]
    user: Option<String>,

    /// Login password.
    #[arg(short, long, env = "MYSQL_PWD", hide_env_values = true, default_value = "")]
    password: String,

    /// Schema to connect to.
    #[arg(short, long, env = "MYSQL_DATABASE")]
    database: String,

    /// Storage ceiling used for the capacity projection, in MB.
    #[arg(long, default_value_t = dbpulse::config::DEFAULT_MAX_CAPACITY_MB)]
    max_capacity_mb: f64,

    /// Maximum number of tables in the inventory listing.
    #[arg(long, default_value_t = dbpulse::config::DEFAULT_TABLE_LISTING_LIMIT)]
    table_limit: usize,

    /// Minimum server uptime in seconds before a slow-query rate is computed.
    #[arg(long, default_value_t = dbpulse::config::DEFAULT_SLOW_QUERY_MIN_UPTIME_SECS)]
    slow_query_min_uptime: i64,

    /// Issue FLUSH STATUS before sampling counters.
    #[arg(long)]
    refresh_status: bool,

    /// Per-probe time budget in seconds; also the driver read/write timeout.
    #[arg(long, default_value = "5")]
    probe_timeout_secs: u64,

    /// Output format.
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,

    /// Print help.
    #[arg(long, action = clap::ArgAction::Help)]
    help: Option<bool>,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let snapshot = match run(&args) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "snapshot failed");
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match args.format {
        OutputFormat::Json => match serde_json::to_string_pretty(snapshot.as_ref()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: cannot encode snapshot: {}", e);
                std::process::exit(1);
            }
        },
        OutputFormat::Text => println!("{}", render_text(&snapshot)),
    }
}

fn run(args: &Args) -> Result<Arc<Snapshot>, MonitorError> {
    let user = match &args.user {
        Some(u) => u.clone(),
        None => std::env::var("USER").map_err(|_| {
            MonitorError::InvalidCredentials("no user given and $USER is not set".to_string())
        })?,
    };
    let params = ConnectionParams::new(
        args.host.as_str(),
        args.port,
        user,
        args.password.as_str(),
        args.database.as_str(),
    )?;

    let config = MonitorConfig::default()
        .with_max_capacity_mb(args.max_capacity_mb)
        .with_table_listing_limit(args.table_limit)
        .with_slow_query_min_uptime(args.slow_query_min_uptime)
        .with_refresh_status(args.refresh_status)
        .with_probe_timeout(Duration::from_secs(args.probe_timeout_secs));
    config.validate()?;

    let mut conn = MysqlIntrospector::connect(&params, &config)?;
    SnapshotAssembler::new(config)
        .with_schema_hint(params.database())
        .assemble(&mut conn)
}

/// Initializes the tracing subscriber on stderr.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("dbpulse={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn render_text(s: &Snapshot) -> String {
    let mut out = String::new();
    let uptime = s.counters.get(dbpulse::collector::catalog::UPTIME);

    let _ = writeln!(out, "MySQL {} ({})", s.server_version, s.server_comment);
    let _ = writeln!(out, "uptime: {}", format_duration(uptime));
    let _ = writeln!(out, "overall: {:?}  saturation: {:?}", s.overall_status, s.saturation);
    if !s.failed_probes.is_empty() {
        let _ = writeln!(out, "failed probes: {}", s.failed_probes.join(", "));
    }

    let _ = writeln!(out, "\nHealth");
    for i in &s.health.indicators {
        let _ = writeln!(
            out,
            "  {:<24} {:<9} {:>10.2}  {}",
            i.id.name(),
            format!("{:?}", i.status).to_lowercase(),
            i.value,
            i.message
        );
    }

    let _ = writeln!(out, "\nMetrics");
    for m in s.metrics.iter() {
        let value = match m.unit {
            Unit::Percentage => format_percent(m.value),
            Unit::PerSecond => format_rate(m.value),
            Unit::Megabytes => format_mb(m.value),
            _ => format!("{:.2}", m.value),
        };
        let _ = writeln!(out, "  {:<28} {}", m.id.name(), value);
    }

    let _ = writeln!(out, "\nTables");
    match &s.inventory {
        Section::Ok(inv) => {
            let _ = writeln!(out, "  schema {} (via {})", inv.schema, inv.resolved_by);
            for t in &inv.tables {
                let _ = writeln!(
                    out,
                    "  {:<32} {:>10} rows {:>12}",
                    t.name,
                    format_count(t.rows),
                    format_mb(t.size_mb)
                );
            }
        }
        Section::Degraded { reason } => {
            let _ = writeln!(out, "  unavailable: {}", reason);
        }
    }

    let p = &s.projection;
    let _ = writeln!(out, "\nStorage");
    let _ = writeln!(out, "  size:           {}", format_measure(&s.database_size_mb, |v| format_mb(*v)));
    let _ = writeln!(out, "  remaining:      {}", format_measure(&p.remaining_space_mb, |v| format_mb(*v)));
    let _ = writeln!(out, "  daily growth:   {}", format_measure(&p.daily_growth_mb, |v| format_mb(*v)));
    let _ = writeln!(out, "  days until full: {}", format_measure(&p.days_until_full, |d| d.to_string()));
    let _ = write!(out, "  full on:        {}", format_measure(&p.estimated_full_date, |d| d.to_string()));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbpulse::collector::MockServer;

    #[test]
    fn text_report_lists_every_section() {
        let mut server = MockServer::typical_server();
        let snapshot = SnapshotAssembler::new(MonitorConfig::default())
            .assemble(&mut server)
            .unwrap();
        let text = render_text(&snapshot);

        assert!(text.starts_with("MySQL 8.0.36"));
        assert!(text.contains("uptime: 1d 0h"));
        assert!(text.contains("buffer_pool_hit_ratio"));
        assert!(text.contains("orders"));
        assert!(text.contains("days until full: 1678"));
    }

    #[test]
    fn degraded_inventory_is_reported() {
        let mut server = MockServer::typical_server();
        server.set_session_schema(None);
        server.set_current_schema(None);
        let snapshot = SnapshotAssembler::new(MonitorConfig::default())
            .assemble(&mut server)
            .unwrap();
        assert!(render_text(&snapshot).contains("unavailable: schema resolution failed"));
    }

    #[test]
    fn args_parse_with_defaults() {
        let args = Args::try_parse_from(["dbpulse", "--database", "shop", "-u", "monitor"]).unwrap();
        assert_eq!(args.port, 3306);
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.table_limit, 20);
    }
}
