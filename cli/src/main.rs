//! Binary entrypoint for varmatrix

fn main() {
    match varmatrix_cli::run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}
