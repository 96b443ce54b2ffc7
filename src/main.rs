fn main() {
    if let Err(err) = stepflow_renderer::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
