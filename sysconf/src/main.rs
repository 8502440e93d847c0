use std::path::PathBuf;

use structopt::clap::AppSettings::*;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;

#[derive(Debug, StructOpt)]
enum Commands {
    #[structopt(
        name = "decode",
        visible_alias = "d",
        about = "Decode a SYSCONF file into an editable JSON document"
    )]
    Decode {
        #[structopt(
            short,
            long,
            parse(from_os_str),
            help = "Output path [default: <sysconf>.json]"
        )]
        output: Option<PathBuf>,

        #[structopt(
            name = "sysconf",
            parse(from_os_str),
            help = "Path to the SYSCONF file"
        )]
        path: PathBuf,
    },

    #[structopt(
        name = "encode",
        visible_alias = "e",
        about = "Encode a JSON document back into a SYSCONF file"
    )]
    Encode {
        #[structopt(
            short,
            long,
            parse(from_os_str),
            help = "Output path [default: <document>.bin]"
        )]
        output: Option<PathBuf>,

        #[structopt(
            name = "document",
            parse(from_os_str),
            help = "Path to the JSON document"
        )]
        path: PathBuf,
    },
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "sysconf",
    about = "Decode and encode SYSCONF configuration files.",
    settings = &[SubcommandRequiredElseHelp, DisableHelpSubcommand, VersionlessSubcommands],
    usage = "sysconf (decode|encode) [FLAGS|OPTIONS] <path>"
)]
struct CliOpts {
    #[structopt(short, long, help = "Show verbose output", global = true)]
    verbose: bool,

    #[structopt(subcommand)]
    cmd: Commands,
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let opts = CliOpts::from_iter(wild::args_os());
    init_logging(opts.verbose);

    let result = match opts.cmd {
        Commands::Decode { path, output } => commands::decode(&path, output)
            .map(|out| println!("Decoded {} -> {}", path.display(), out.display())),
        Commands::Encode { path, output } => commands::encode(&path, output)
            .map(|out| println!("Encoded {} -> {}", path.display(), out.display())),
    };

    if let Err(e) = result {
        eprintln!("{:?}", anyhow::Error::new(e));
        std::process::exit(1);
    }
}
