fn main() {
    if let Err(error) = triage_assist::run() {
        eprintln!("triage-assist error: {error}");
        std::process::exit(1);
    }
}
