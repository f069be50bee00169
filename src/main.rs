fn main() {
    if let Err(err) = cocoslice::run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
