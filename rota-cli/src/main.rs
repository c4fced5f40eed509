//! Entry point for the `rota` binary.
#![forbid(unsafe_code)]

#[expect(
    clippy::print_stderr,
    reason = "The binary reports fatal errors on stderr before exiting"
)]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = rota_cli::run() {
        eprintln!("rota: {err}");
        std::process::exit(1);
    }
}
