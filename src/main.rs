use std::{fs, path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use shopfloor::{
    config::{self, AppConfig},
    db,
    errors::ServiceError,
    notifications::{ChannelNotificationSink, NoopNotificationSink, NotificationSink},
    reports::{
        MonthlyCompanyActualsRow, MonthlyRollupRow, ReportPeriod, RollupGroupBy, RollupQuery,
        RollupSortKey, SortDirection, WeeklyOverviewRow,
    },
    services::{
        holidays::NewHoliday, production_weeks::EntrySheet, reconciliation::DailyHoursEntry,
    },
    AppContext,
};
use tokio::task::JoinHandle;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_failure(&err),
    }
}

/// Internal failures print a generic message; details go to the log.
/// Caller mistakes exit with 2, everything else with 1.
fn report_failure(err: &anyhow::Error) -> ExitCode {
    let Some(service_err) = err.chain().find_map(|cause| cause.downcast_ref::<ServiceError>())
    else {
        eprintln!("error: {:#}", err);
        return ExitCode::FAILURE;
    };

    error!(status = %service_err.status_code(), "{:#}", err);
    eprintln!("error: {}: {}", err, service_err.response_message());
    if service_err.is_client_error() {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config().context("failed to load application config")?;
    config::init_tracing(config.log_level(), config.log_json);

    let (context, notice_drain) = initialize(config).await?;

    match cli.command {
        Commands::GenerateWeek(args) => handle_generate_week(&context, args, cli.json).await?,
        Commands::WeeklyOverview => handle_weekly_overview(&context, cli.json).await?,
        Commands::Rollup(args) => handle_rollup(&context, args, cli.json).await?,
        Commands::CompanyActuals(args) => handle_company_actuals(&context, args, cli.json).await?,
        Commands::ApplyHours(args) => handle_apply_hours(&context, args, cli.json).await?,
        Commands::EntrySheet(args) => handle_entry_sheet(&context, args, cli.json).await?,
        Commands::Holidays(command) => handle_holidays_command(&context, command, cli.json).await?,
    }

    // Dropping the services closes the notice channel so the drain can finish.
    drop(context);
    if let Some(handle) = notice_drain {
        handle.await.context("notice drain task failed")?;
    }
    Ok(())
}

async fn initialize(config: AppConfig) -> Result<(AppContext, Option<JoinHandle<()>>)> {
    let pool = db::establish_connection_from_app_config(&config)
        .await
        .context("failed to connect to database")?;
    if config.auto_migrate {
        db::run_migrations(&pool)
            .await
            .context("failed to run migrations")?;
    }

    let (notifier, drain): (Arc<dyn NotificationSink>, Option<JoinHandle<()>>) =
        if config.notifications_enabled {
            let (sink, mut rx) = ChannelNotificationSink::channel(config.notification_channel_capacity);
            let handle = tokio::spawn(async move {
                while let Some(notice) = rx.recv().await {
                    info!(target: "shopfloor_cli", production_week_id = notice.production_week_id, "{}", notice.message);
                }
            });
            (Arc::new(sink), Some(handle))
        } else {
            (Arc::new(NoopNotificationSink), None)
        };

    Ok((
        AppContext::with_pool(config, Arc::new(pool), notifier),
        drain,
    ))
}

#[derive(Parser)]
#[command(name = "shopfloor", about = "Shopfloor scheduling and production tracking CLI", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a production week and forecast its daily hours
    GenerateWeek(GenerateWeekArgs),
    /// Targets versus actuals for every week
    WeeklyOverview,
    /// Monthly hours by work area or employee
    Rollup(RollupArgs),
    /// Company actuals by month
    CompanyActuals(PeriodArgs),
    /// Apply recorded hours from a JSON file
    ApplyHours(ApplyHoursArgs),
    /// Show the hours entry sheet for a week
    EntrySheet(EntrySheetArgs),
    #[command(subcommand)]
    Holidays(HolidayCommands),
}

#[derive(Args)]
struct GenerateWeekArgs {
    #[arg(long, help = "Monday the reporting week starts on (YYYY-MM-DD)")]
    start: NaiveDate,
}

#[derive(Args)]
struct PeriodArgs {
    #[arg(long, conflicts_with = "trailing", help = "Calendar year to report on")]
    year: Option<i32>,
    #[arg(
        long,
        action = ArgAction::SetTrue,
        help = "The twelve whole months before the current one"
    )]
    trailing: bool,
}

impl PeriodArgs {
    fn period(&self) -> ReportPeriod {
        match (self.year, self.trailing) {
            (Some(year), _) => ReportPeriod::Year(year),
            (None, true) => ReportPeriod::TrailingTwelveMonths {
                as_of: Local::now().date_naive(),
            },
            (None, false) => ReportPeriod::AllTime,
        }
    }
}

#[derive(Args)]
struct RollupArgs {
    #[arg(long, default_value = "work_area", help = "work_area or employee")]
    group_by: RollupGroupBy,
    #[command(flatten)]
    period: PeriodArgs,
    #[arg(long, default_value = "display_order")]
    sort_by: RollupSortKey,
    #[arg(long, default_value = "asc")]
    direction: SortDirection,
}

#[derive(Args)]
struct ApplyHoursArgs {
    #[arg(long, help = "JSON array of daily hours entries")]
    file: PathBuf,
    #[arg(long, help = "Name recorded on the update notices")]
    actor: String,
}

#[derive(Args)]
struct EntrySheetArgs {
    #[arg(
        long,
        visible_alias = "start",
        help = "Any day of the Sunday to Saturday week to show (YYYY-MM-DD)"
    )]
    date: NaiveDate,
}

#[derive(Subcommand)]
enum HolidayCommands {
    List,
    Add(HolidayAddArgs),
    Delete(HolidayDeleteArgs),
}

#[derive(Args)]
struct HolidayAddArgs {
    #[arg(long)]
    date: NaiveDate,
    #[arg(long)]
    description: Option<String>,
}

#[derive(Args)]
struct HolidayDeleteArgs {
    #[arg(long)]
    date: NaiveDate,
}

async fn handle_generate_week(context: &AppContext, args: GenerateWeekArgs, json: bool) -> Result<()> {
    let generated = context
        .services
        .forecast
        .generate_week(args.start)
        .await
        .context("failed to generate production week")?;

    if json {
        print_json(&generated)?;
    } else {
        println!(
            "Production week {} ({} to {}) created with {} daily rows, forecast {} hours",
            generated.week.production_week_id,
            generated.week.reporting_week_start_date,
            generated.week.reporting_week_end_date,
            generated.rows_created,
            display_decimal(generated.week.forecasted_total_production_hours),
        );
        if !generated.skipped_employees.is_empty() {
            println!("Skipped employees without a work area: {:?}", generated.skipped_employees);
        }
    }
    Ok(())
}

async fn handle_weekly_overview(context: &AppContext, json: bool) -> Result<()> {
    let rows = context
        .services
        .reports
        .weekly_overview()
        .await
        .context("failed to build weekly overview")?;

    if json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No production weeks found.");
    }
    for row in &rows {
        render_weekly_row(row);
    }
    Ok(())
}

async fn handle_rollup(context: &AppContext, args: RollupArgs, json: bool) -> Result<()> {
    let query = RollupQuery::new(args.group_by, args.period.period())
        .sorted_by(args.sort_by, args.direction);
    let rows = context
        .services
        .reports
        .monthly_rollup(query)
        .await
        .context("failed to build monthly rollup")?;

    if json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No hours recorded for the selected period.");
    }
    for row in &rows {
        render_rollup_row(row);
    }
    Ok(())
}

async fn handle_company_actuals(context: &AppContext, args: PeriodArgs, json: bool) -> Result<()> {
    let rows = context
        .services
        .reports
        .monthly_company_actuals(args.period())
        .await
        .context("failed to build company actuals")?;

    if json {
        return print_json(&rows);
    }
    for row in &rows {
        render_company_row(row);
    }
    Ok(())
}

async fn handle_apply_hours(context: &AppContext, args: ApplyHoursArgs, json: bool) -> Result<()> {
    let raw = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let entries: Vec<DailyHoursEntry> =
        serde_json::from_str(&raw).context("expected a JSON array of daily hours entries")?;
    if entries.is_empty() {
        return Err(anyhow!("{} contains no entries", args.file.display()));
    }

    let outcome = context
        .services
        .reconciliation
        .apply_daily_update(&args.actor, entries)
        .await
        .context("failed to apply daily hours")?;

    if json {
        print_json(&outcome)?;
    } else {
        println!(
            "Updated {} rows, created {} rows, skipped {} missing ids",
            outcome.updated,
            outcome.created,
            outcome.skipped_ids.len()
        );
        for week in &outcome.weeks {
            println!(
                "- Week {} • actual hours {} • actual $/h {}",
                week.reporting_week_start_date,
                display_decimal(week.actual_total_production_hours),
                display_decimal(week.actual_dollars_per_hour),
            );
        }
    }
    Ok(())
}

async fn handle_entry_sheet(context: &AppContext, args: EntrySheetArgs, json: bool) -> Result<()> {
    let sheet = context
        .services
        .production_weeks
        .entry_sheet_for_date(args.date)
        .await
        .context("failed to load entry sheet")?;

    if json {
        return print_json(&sheet);
    }
    render_entry_sheet(&sheet);
    Ok(())
}

async fn handle_holidays_command(
    context: &AppContext,
    command: HolidayCommands,
    json: bool,
) -> Result<()> {
    let service = &context.services.holidays;
    match command {
        HolidayCommands::List => {
            let holidays = service.list().await.context("failed to list holidays")?;
            if json {
                return print_json(&holidays);
            }
            for holiday in &holidays {
                println!(
                    "- {} {}",
                    holiday.holiday_date,
                    holiday.description.as_deref().unwrap_or("")
                );
            }
        }
        HolidayCommands::Add(args) => {
            let created = service
                .add(NewHoliday {
                    holiday_date: args.date,
                    description: args.description,
                })
                .await
                .context("failed to add holiday")?;
            if json {
                return print_json(&created);
            }
            println!("Holiday {} added (id {})", created.holiday_date, created.holiday_id);
        }
        HolidayCommands::Delete(args) => {
            service
                .delete_by_date(args.date)
                .await
                .context("failed to delete holiday")?;
            println!("Holiday {} deleted", args.date);
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn display_decimal(value: Option<rust_decimal::Decimal>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn render_weekly_row(row: &WeeklyOverviewRow) {
    println!(
        "- Week {} • $/h {} vs {} ({}%) • boxes {} vs {} • hours {} vs {} ({}%)",
        row.reporting_week_start_date,
        row.dollars_per_hour.actual,
        row.dollars_per_hour.forecasted,
        row.dollars_per_hour.variance_pct,
        row.boxes_built.actual,
        row.boxes_built.forecasted,
        row.total_hours.actual,
        row.total_hours.forecasted,
        row.total_hours.variance_pct,
    );
}

fn render_rollup_row(row: &MonthlyRollupRow) {
    let variance = match (row.variance, row.variance_pct) {
        (Some(v), Some(pct)) => format!(" • variance {} ({}%)", v, pct),
        _ => String::new(),
    };
    println!(
        "- {}-{:02} • {} • forecast {} • actual {}{}",
        row.year, row.month, row.group_name, row.forecasted_hours, row.actual_hours, variance
    );
}

fn render_company_row(row: &MonthlyCompanyActualsRow) {
    println!(
        "- {}-{:02} • value {} • hours {} • boxes {} • $/h {}",
        row.year,
        row.month,
        row.total_actual_product_value,
        row.total_actual_hours,
        row.total_actual_boxes,
        row.actual_dollars_per_hour
    );
}

fn render_entry_sheet(sheet: &EntrySheet) {
    if let Some(message) = &sheet.message {
        println!("{}", message);
        return;
    }
    for employee in &sheet.employees {
        println!(
            "{} {} ({})",
            employee.first_name,
            employee.last_initial,
            employee.position_title.as_deref().unwrap_or("no position")
        );
        for day in &employee.days {
            println!(
                "  {} {:<9} forecast {:>6} actual {:>6} [{}]",
                day.work_date,
                day.day_of_week,
                day.forecasted_hours.to_string(),
                display_decimal(day.actual_hours),
                day.status
            );
        }
    }
}
