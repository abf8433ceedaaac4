//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = itinerary_cli::run() {
        eprintln!("itinerary: {err}");
        std::process::exit(1);
    }
}
