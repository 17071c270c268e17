use std::io;

fn main() {
    banker_cli::logging::init_logging();
    let code = banker_cli::run(std::env::args(), &mut io::stdout(), &mut io::stderr());
    std::process::exit(code);
}
