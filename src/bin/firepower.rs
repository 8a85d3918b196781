use clap::Parser;
use firepower::{DataSources, FireId, SatFireDatabases};
use log::info;
use simple_logger::SimpleLogger;
use std::{
    error::Error,
    fmt::{self, Display},
    path::PathBuf,
};

/*-------------------------------------------------------------------------------------------------
 *                                     Command Line Options
 *-----------------------------------------------------------------------------------------------*/

/// Print the total power and maximum temperature of a fire at every scan time.
///
/// All the clusters of every fire that merged into the selected fire (and every fire that merged
/// into those, and so on) are included in the totals.
#[derive(Debug, Parser)]
#[clap(bin_name = "firepower")]
#[clap(author, version, about)]
struct FirePowerOptions {
    /// The fire_id of the fire to print.
    fire_id: FireId,

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

    /// Verbose output
    #[clap(short, long)]
    verbose: bool,
}

#[derive(Debug)]
struct FirePowerOptionsChecked {
    fire_id: FireId,
    sources: DataSources,
    verbose: bool,
}

impl Display for FirePowerOptionsChecked {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        writeln!(f, "\n")?; // yes, two blank lines.
        writeln!(f, "            Fire: {}", self.fire_id)?;
        writeln!(f, "Cluster Database: {}", self.sources.clusters.display())?;
        writeln!(f, "  Fires Database: {}", self.sources.fires.display())?;
        writeln!(f, "\n")?; // yes, two blank lines.

        Ok(())
    }
}

/// Get the command line arguments and check them.
///
/// If there is missing data, try to fill it in with environment variables.
fn parse_args() -> Result<FirePowerOptionsChecked, Box<dyn Error + Send + Sync>> {
    let FirePowerOptions {
        fire_id,
        clusters_store_file,
        fires_store_file,
        verbose,
    } = FirePowerOptions::parse();

    let sources = DataSources::resolve(clusters_store_file, fires_store_file)?;

    let checked = FirePowerOptionsChecked {
        fire_id,
        sources,
        verbose,
    };

    if verbose {
        info!(target: "startup", "{}", checked);
    }

    Ok(checked)
}

/*-------------------------------------------------------------------------------------------------
 *                                             Main
 *-----------------------------------------------------------------------------------------------*/
fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    SimpleLogger::new().init()?;

    let opts = parse_args()?;

    let dbs = SatFireDatabases::connect(&opts.sources)?;

    if opts.verbose {
        let closure = dbs.resolve_closure(opts.fire_id)?;
        info!(
            "Fire {} merge closure: {:?}",
            opts.fire_id,
            closure.members()
        );
    }

    let series = dbs.total_fire_power_time_series(opts.fire_id)?;
    print!("{}", series);

    if let Some(max_power) = series.max_power() {
        println!("Max Power: {:.0} MW", max_power);
    }

    Ok(())
}
