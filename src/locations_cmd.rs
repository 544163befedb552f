//! Locations command: list configured locations and their record coverage.

use anyhow::Result;

use hindcast_store::RecordStore;

use crate::cli::LocationsArgs;
use crate::config::HindcastConfig;

pub fn run(args: LocationsArgs) -> Result<()> {
    let config = HindcastConfig::load(&args.config)?;
    let data_dir = args.data_dir.as_ref().unwrap_or(&config.data_dir);
    let store = RecordStore::new(data_dir);

    println!("{:<16} {:>9} {:>10}  Records", "Location", "Latitude", "Longitude");
    for (name, loc) in &config.locations {
        let status = if store.has_location(name) {
            "yes"
        } else {
            "none"
        };
        println!(
            "{name:<16} {:>9.4} {:>10.4}  {status}",
            loc.latitude, loc.longitude
        );
    }

    let unconfigured: Vec<String> = store
        .locations()?
        .into_iter()
        .filter(|l| !config.locations.contains_key(l))
        .collect();
    if !unconfigured.is_empty() {
        println!(
            "\nRecords present but not configured: {}",
            unconfigured.join(", ")
        );
    }

    Ok(())
}
