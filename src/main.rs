fn main() {
    if let Err(err) = vizjoin::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
