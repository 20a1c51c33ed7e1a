#![forbid(unsafe_code)]

fn main() -> std::process::ExitCode {
    cardex_cli::main_entry()
}
