use clap::Parser as CParser;
use log::debug;
use sigil_lang::runtime::Runtime;

#[derive(CParser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Path to the .sig source file to run.
    file: Option<std::path::PathBuf>,

    /// Log the token stream and parsed program before running.
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let args = Cli::parse();

    let level = if args.debug {
        log::Level::Trace
    } else {
        log::Level::Warn
    };
    simple_logger::init_with_level(level).unwrap();

    let Some(file) = args.file else {
        println!("Missing arguments. Usage: sigil <file>.");
        std::process::exit(64);
    };

    let runtime = Runtime::new();
    match runtime.exec_file(&file) {
        Ok(value) => debug!("result: {value}"),
        Err(error) => std::process::exit(error.exit_code()),
    }
}
