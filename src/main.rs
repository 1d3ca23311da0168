fn main() {
    if let Err(e) = igplot::cli::run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
