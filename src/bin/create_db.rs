fn main() {
    if let Err(e) = gb_postcodes::create_database() {
        eprintln!("Error creating database: {}", e);
        std::process::exit(1);
    }
}
