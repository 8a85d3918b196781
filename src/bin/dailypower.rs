use chrono::NaiveDate;
use clap::Parser;
use firepower::{
    align, hour_ticks, join_pair, AlignMode, BreakHour, BurnDayRow, DailySeries, DataSources,
    FireId, SatFireDatabases,
};
use log::{info, warn};
use simple_logger::SimpleLogger;
use strum::IntoEnumIterator;
use std::{
    error::Error,
    fmt::{self, Display},
    path::PathBuf,
};

type BoxedResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// Width of the widest power bar in characters.
const BAR_WIDTH: f64 = 50.0;

/*-------------------------------------------------------------------------------------------------
 *                                     Command Line Options
 *-----------------------------------------------------------------------------------------------*/

/// Print the fire power of one or more fires, one burn day at a time.
///
/// A burn day starts at the break hour (UTC) instead of midnight. All the fires are lined up on
/// the same calendar and drawn against the same power scale so they can be compared.
#[derive(Debug, Parser)]
#[clap(bin_name = "dailypower")]
#[clap(author, version, about)]
struct DailyPowerOptionsInit {
    /// The fire_id of each fire to show.
    #[clap(required = true)]
    fire_ids: Vec<FireId>,

    /// The path to the database file with the clusters.
    ///
    /// If this is not specified, then the program will check for it in the "CLUSTER_DB"
    /// environment variable.
    #[clap(short, long)]
    #[clap(env = "CLUSTER_DB")]
    clusters_store_file: Option<PathBuf>,

    /// The path to the database file with the fires and associations.
    ///
    /// If this is not specified, then the program will check for it in the "FIRES_DB"
    /// environment variable.
    #[clap(short, long)]
    #[clap(env = "FIRES_DB")]
    fires_store_file: Option<PathBuf>,

    /// The hour of the day (UTC) when one burn day ends and the next starts.
    ///
    /// The default of 12Z is early morning in the western U.S., when fire activity is usually at a
    /// minimum and wildland fire fighters start their day.
    #[clap(short, long, parse(try_from_str=parse_break_hour))]
    #[clap(default_value_t=BreakHour::DEFAULT)]
    break_hour: BreakHour,

    /// The first burn day to show in the format YYYY-MM-DD.
    #[clap(short, long, parse(try_from_str=parse_date))]
    start: Option<NaiveDate>,

    /// The last burn day to show in the format YYYY-MM-DD.
    #[clap(short, long, parse(try_from_str=parse_date))]
    end: Option<NaiveDate>,

    /// Either "union" to show every day any fire burned, or "pair" to compare exactly two fires
    /// on the days both burned.
    #[clap(short, long, parse(try_from_str=parse_mode))]
    #[clap(default_value_t=AlignMode::Union)]
    mode: AlignMode,

    /// Verbose output
    #[clap(short, long)]
    verbose: bool,
}

/// Parse a break hour, the trailing 'Z' is optional.
fn parse_break_hour(hour_str: &str) -> BoxedResult<BreakHour> {
    let hour: u32 = hour_str.trim_end_matches(|c: char| c == 'Z' || c == 'z').parse()?;
    Ok(BreakHour::new(hour)?)
}

/// Parse an alignment mode, listing the valid ones if it isn't one of them.
fn parse_mode(mode_str: &str) -> BoxedResult<AlignMode> {
    mode_str.parse::<AlignMode>().map_err(|_| {
        let modes: Vec<String> = AlignMode::iter().map(|mode| mode.to_string()).collect();
        format!("unknown mode {}, expected one of: {}", mode_str, modes.join(", ")).into()
    })
}

/// Parse a command line date.
fn parse_date(date_str: &str) -> BoxedResult<NaiveDate> {
    Ok(NaiveDate::parse_from_str(date_str, "%Y-%m-%d")?)
}

#[derive(Debug)]
struct DailyPowerOptionsChecked {
    fire_ids: Vec<FireId>,
    sources: DataSources,
    break_hour: BreakHour,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    mode: AlignMode,
}

impl Display for DailyPowerOptionsChecked {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        let day_or_open = |day: Option<NaiveDate>| match day {
            Some(day) => day.to_string(),
            None => "open".to_owned(),
        };

        writeln!(f, "\n")?; // yes, two blank lines.
        writeln!(f, "           Fires: {:?}", self.fire_ids)?;
        writeln!(f, "Cluster Database: {}", self.sources.clusters.display())?;
        writeln!(f, "  Fires Database: {}", self.sources.fires.display())?;
        writeln!(f, "      Break Hour: {}", self.break_hour)?;
        writeln!(f, "           Start: {}", day_or_open(self.start))?;
        writeln!(f, "             End: {}", day_or_open(self.end))?;
        writeln!(f, "            Mode: {}", self.mode)?;
        writeln!(f, "\n")?; // yes, two blank lines.

        Ok(())
    }
}

/// Get the command line arguments and check them.
///
/// If there is missing data, try to fill it in with environment variables.
fn parse_args() -> BoxedResult<DailyPowerOptionsChecked> {
    let DailyPowerOptionsInit {
        fire_ids,
        clusters_store_file,
        fires_store_file,
        break_hour,
        start,
        end,
        mode,
        verbose,
    } = DailyPowerOptionsInit::parse();

    if mode == AlignMode::Pair && fire_ids.len() != 2 {
        return Err(format!(
            "pair mode compares exactly 2 fires, but {} were given",
            fire_ids.len()
        )
        .into());
    }

    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            warn!(target: "startup", "start {} is after end {}, nothing to show", start, end);
        }
    }

    let sources = DataSources::resolve(clusters_store_file, fires_store_file)?;

    let checked = DailyPowerOptionsChecked {
        fire_ids,
        sources,
        break_hour,
        start,
        end,
        mode,
    };

    if verbose {
        info!(target: "startup", "{}", checked);
    }

    Ok(checked)
}

/*-------------------------------------------------------------------------------------------------
 *                                            Output
 *-----------------------------------------------------------------------------------------------*/
fn print_hour_axis(break_hour: BreakHour) {
    let labels: Vec<String> = hour_ticks(break_hour)
        .into_iter()
        .map(|(_, label)| label)
        .collect();
    println!("Hour of Day (Z): {}", labels.join(" "));
}

fn print_rows(label: &str, data: &DailySeries, max_power: f64) {
    println!("  {}", label);
    for BurnDayRow {
        scan_time,
        second_of_burn_day,
        total_power,
        max_temperature,
    } in &data.rows
    {
        let bar_len = if max_power > 0.0 {
            (total_power / max_power * BAR_WIDTH).round() as usize
        } else {
            0
        };

        println!(
            "    {:>5}s {} {:>8.0} MW {:>6.0}K |{}",
            second_of_burn_day,
            scan_time.format("%H:%M"),
            total_power,
            max_temperature,
            "#".repeat(bar_len)
        );
    }
}

/*-------------------------------------------------------------------------------------------------
 *                                             Main
 *-----------------------------------------------------------------------------------------------*/
fn main() -> BoxedResult<()> {
    SimpleLogger::new().init()?;

    let opts = parse_args()?;

    let dbs = SatFireDatabases::connect(&opts.sources)?;
    let daily = dbs.daily_data(&opts.fire_ids, opts.break_hour, opts.start, opts.end)?;

    print_hour_axis(opts.break_hour);

    match opts.mode {
        AlignMode::Union => {
            let aligned = align(&daily);
            let max_power = aligned.max_power().unwrap_or(0.0);
            println!("Total Fire Power scale: 0 - {:.0} MW", max_power);

            for panel in aligned.panels() {
                println!("{}", panel.day);
                for entry in &panel.entries {
                    let key = &aligned.keys()[entry.key];
                    let label = format!("[{}] {}", key, entry.label());
                    print_rows(&label, entry.data, max_power);
                }
            }
        }
        AlignMode::Pair => {
            let paired = join_pair(&daily[0], &daily[1]);
            let max_power = paired.max_power.unwrap_or(0.0);
            println!(
                "Fire {} vs fire {}, {} shared days, scale: 0 - {:.0} MW",
                paired.left,
                paired.right,
                paired.days.len(),
                max_power
            );

            for (day, left, right) in &paired.days {
                println!("{}", day);
                print_rows(&format!("{} {}", left.satellite, paired.left), left, max_power);
                print_rows(&format!("{} {}", right.satellite, paired.right), right, max_power);
            }
        }
    }

    Ok(())
}
