use std::{path::Path, process::ExitCode, time::Instant};

use gb_postcodes::{
    DatabaseHandle, format_postcode, log_event, parse_postcode, read_database_file,
};

const DEFAULT_DATABASE_PATH: &str = "data/postcodes.bin";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let path =
        std::env::var("POSTCODES_DATABASE").unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string());
    let start = Instant::now();
    let bytes = match read_database_file(Path::new(&path)) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("Error reading database {path}: {err}");
            return ExitCode::FAILURE;
        }
    };
    let database = match DatabaseHandle::load(&bytes) {
        Ok(database) => database,
        Err(err) => {
            eprintln!("Error loading database: {err}");
            return ExitCode::FAILURE;
        }
    };
    log_event(&format!(
        "loaded {} postcodes in {} outward codes from {path} in {:.2}s",
        database.postcode_count(),
        database.outward_count(),
        start.elapsed().as_secs_f32()
    ));

    match args.as_slice() {
        [postcode] => lookup_postcode(&database, postcode),
        [e, n] => lookup_location(&database, e, n),
        _ => {
            print_usage(&database);
            ExitCode::FAILURE
        }
    }
}

fn lookup_postcode(database: &DatabaseHandle, text: &str) -> ExitCode {
    if let Some(outward) = parse_postcode(text, true) {
        println!("{}", format_postcode(&outward));

        let Some(code) = database.lookup_outward(&outward) else {
            println!("Outward postcode not found");
            return ExitCode::FAILURE;
        };
        println!(
            "E {} - {}  N {} - {}",
            code.origin_e,
            code.max_e(),
            code.origin_n,
            code.max_n()
        );
        return ExitCode::SUCCESS;
    }

    let Some(postcode) = parse_postcode(text, false) else {
        println!("Not a valid postcode (neither outward nor full)");
        return ExitCode::FAILURE;
    };
    println!("{}", format_postcode(&postcode));

    let coordinate = database.lookup_coordinate(&postcode);
    if !coordinate.is_found() {
        println!("Full postcode not found");
        return ExitCode::FAILURE;
    }

    let note = if coordinate.status == gb_postcodes::PostcodeStatus::SectorMeanOnly {
        "  (sector mean)"
    } else {
        ""
    };
    println!("E {}  N {}{note}", coordinate.e, coordinate.n);
    ExitCode::SUCCESS
}

fn lookup_location(database: &DatabaseHandle, e: &str, n: &str) -> ExitCode {
    let (Ok(e), Ok(n)) = (e.trim().parse::<u32>(), n.trim().parse::<u32>()) else {
        eprintln!("Invalid easting/northing: {e} {n}");
        return ExitCode::FAILURE;
    };

    match database.nearest_postcode(e, n) {
        Some(nearest) => {
            println!(
                "{} ({}m from centroid)",
                format_postcode(&nearest.components),
                nearest.distance.round()
            );
            ExitCode::SUCCESS
        }
        None => {
            println!("No postcode near that location");
            ExitCode::FAILURE
        }
    }
}

fn print_usage(database: &DatabaseHandle) {
    println!(
        "postcodes {}\n\
         \n\
         Parse, format and look up GB postcodes <-> grid references.\n\
         \n\
         Usage:\n  \
         postcodes POSTCODE  - look up location from full/outward postcode (quote or omit spaces)\n  \
         postcodes EASTING NORTHING  - look up postcode from location\n\
         \n\
         Database: {}\n\
         {}",
        env!("CARGO_PKG_VERSION"),
        database.version(),
        database.copyright()
    );
}
