use skyglow::{Config, LocationId, SampleId, SkyDatabase};

const USAGE: &str = "Usage: {bin} [--as <user>] <command>

Commands:
  locate <lat> <lon>           register a location
  sample <location-id> <mpas>  record a measurement
  near <lat> <lon> <miles>     darkest skies within a radius
  mine                         samples submitted by --as user
  update <sample-id> <mpas>    change a measurement
  delete <sample-id>           remove a measurement";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();
    env_logger::init_from_env(
        env_logger::Env::default().default_filter_or(config.log_filter.as_str()),
    );

    let mut args = std::env::args();
    let bin = args.next().unwrap_or_else(|| "skyglow".to_string());
    let mut args: Vec<String> = args.collect();

    let mut caller = String::new();
    if args.first().map(String::as_str) == Some("--as") {
        if args.len() < 2 {
            eprintln!("{}", USAGE.replace("{bin}", &bin));
            return Ok(());
        }
        caller = args.remove(1);
        args.remove(0);
    }

    let Some(command) = args.first().cloned() else {
        eprintln!("{}", USAGE.replace("{bin}", &bin));
        return Ok(());
    };
    let rest = &args[1..];

    let db = SkyDatabase::open(&config)?;

    match (command.as_str(), rest) {
        ("locate", [lat, lon]) => {
            let location = db.submit_location(lat.parse()?, lon.parse()?)?;
            println!("Location {}", location.id);
            println!("  Coords: {:.2}, {:.2}", location.lat, location.lon);
        }
        ("sample", [location, mpas]) => {
            let sample = db.submit_sample(LocationId(location.parse()?), mpas.parse()?, &caller)?;
            println!("Sample {}", sample.id);
            println!("  Sky Quality: {:.2} mpas", sample.mpas);
            println!("  Recorded: {}", sample.timestamp_string());
        }
        ("near", [lat, lon, miles]) => {
            let results = db.query_locations_near(lat.parse()?, lon.parse()?, miles.parse()?)?;
            if results.is_empty() {
                println!("No measurements found");
            }
            for item in results {
                println!("{:.2}, {:.2}", item.lat, item.lon);
                println!(
                    "  Sky Quality: {:.2} mpas ({} samples)",
                    item.average_mpas, item.sample_count
                );
                println!("  Limiting Magnitude: {:.1}", item.nelm);
                println!("  Distance: {:.2} mi", item.distance_miles);
            }
        }
        ("mine", []) => {
            let samples = db.list_samples_by_owner(&caller)?;
            if samples.is_empty() {
                println!("No samples found");
            }
            for sample in samples {
                println!(
                    "{}  {:.2} mpas  {}",
                    sample.id,
                    sample.mpas,
                    sample.timestamp_string()
                );
            }
        }
        ("update", [sample, mpas]) => {
            let sample = db.update_sample(SampleId(sample.parse()?), mpas.parse()?, &caller)?;
            println!("Sample {} now {:.2} mpas", sample.id, sample.mpas);
        }
        ("delete", [sample]) => {
            let report = db.delete_sample(SampleId(sample.parse()?), &caller)?;
            println!("Deleted sample {}", report.sample_id);
            for id in &report.affected_location_ids {
                println!("  Updated location {}", id);
            }
            for id in &report.failed_location_ids {
                println!("  Location {} still references it", id);
            }
        }
        _ => {
            eprintln!("{}", USAGE.replace("{bin}", &bin));
            return Ok(());
        }
    }

    db.save(&config)?;
    Ok(())
}
