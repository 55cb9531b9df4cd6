fn main() {
    if let Err(err) = svgdim::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
