use crate::infra::parse_date;
use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use icu_ward::error::AppError;
use icu_ward::workflows::evaluations::EvaluationKind;
use icu_ward::workflows::procedures::ProcedureRecord;
use icu_ward::workflows::reporting::{
    group_by_day, group_by_shift, metrics, write_shift_report, MetricsWindow, RegistroGroup,
};
use icu_ward::workflows::scoring::BandKey;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct ScalesArgs {
    /// Only print one scale (severity or complexity)
    #[arg(long, value_parser = parse_kind)]
    pub(crate) kind: Option<EvaluationKind>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum GroupBy {
    #[default]
    Shift,
    Day,
}

#[derive(Args, Debug)]
pub(crate) struct ShiftReportArgs {
    /// JSON export of procedure records
    #[arg(long)]
    pub(crate) procedures: PathBuf,
    /// Group per shift or per day
    #[arg(long, value_enum, default_value_t = GroupBy::Shift)]
    pub(crate) by: GroupBy,
    /// Last day of the metrics window (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Length of the metrics window in days
    #[arg(long, default_value_t = 30)]
    pub(crate) days: u32,
    /// Emit the registro groups as CSV instead of a readable summary
    #[arg(long)]
    pub(crate) csv: bool,
}

fn parse_kind(raw: &str) -> Result<EvaluationKind, String> {
    EvaluationKind::from_label(raw).ok_or_else(|| format!("unknown evaluation kind '{raw}'"))
}

pub(crate) fn run_scales(args: ScalesArgs) -> Result<(), AppError> {
    let kinds: Vec<EvaluationKind> = match args.kind {
        Some(kind) => vec![kind],
        None => EvaluationKind::ordered().to_vec(),
    };

    for kind in kinds {
        let scale = kind.scale();
        println!("{} ({}), maximum {} points", scale.name, kind.label(), scale.max_total());
        for table in scale.tables {
            let source = if scale.is_derived(table.variable) {
                " [derived]"
            } else {
                ""
            };
            println!("  {}{}", table.name, source);
            for band in table.bands {
                let key = match band.key {
                    BandKey::Range { lower, upper } => format!(
                        "[{}, {})",
                        lower.map_or("-inf".to_string(), |value| value.to_string()),
                        upper.map_or("+inf".to_string(), |value| value.to_string())
                    ),
                    BandKey::Choice => band.id.to_string(),
                };
                println!("    {:<28} {:>2}  {}", key, band.points, band.label);
            }
        }
        println!("  Tiers:");
        let mut floor = 0;
        for tier in scale.tiers {
            match tier.max_total {
                Some(max) => {
                    println!("    {:>2}-{:<3} {}", floor, max, tier.tier);
                    floor = max + 1;
                }
                None => println!("    {:>2}+    {}", floor, tier.tier),
            }
        }
        println!();
    }

    Ok(())
}

pub(crate) fn run_shift_report(args: ShiftReportArgs) -> Result<(), AppError> {
    let ShiftReportArgs {
        procedures,
        by,
        today,
        days,
        csv,
    } = args;

    let raw = std::fs::read(&procedures)?;
    let records: Vec<ProcedureRecord> = serde_json::from_slice(&raw).map_err(|err| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{}: {err}", procedures.display()),
        )
    })?;

    let groups = match by {
        GroupBy::Shift => group_by_shift(&records),
        GroupBy::Day => group_by_day(&records),
    };

    if csv {
        write_shift_report(&groups, std::io::stdout().lock())?;
        return Ok(());
    }

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    render_summary(&groups, &records, MetricsWindow::trailing_days(today, days));
    Ok(())
}

fn render_summary(groups: &[RegistroGroup], records: &[ProcedureRecord], window: MetricsWindow) {
    println!("Registro groups ({})", groups.len());
    for group in groups {
        let shift = group.shift.map_or("-", |shift| shift.label());
        println!(
            "- {} {:<9} {:<20} {:>3} procedures  {}",
            group.date, shift, group.author_name, group.count, group.total_duration_label
        );
    }

    let summary = metrics(records, window);
    println!(
        "\nMetrics {} -> {}: {} procedures, {} total, {:.1} per active day, {:.0}% with patient",
        summary.window.from,
        summary.window.to,
        summary.total_count,
        summary.total_time_label,
        summary.per_day_average,
        summary.patient_care_ratio * 100.0
    );
    for (discipline, shifts) in &summary.per_shift_average {
        for (shift, average) in shifts {
            println!(
                "  {:<12} {:<9} {:.1} procedures per shift",
                discipline.label(),
                shift.label(),
                average
            );
        }
    }
    for tally in summary.by_procedure.iter().take(5) {
        println!(
            "  {:<24} {:>3} x  {}",
            tally.name, tally.count, tally.total_label
        );
    }
}
