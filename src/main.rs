use clap::Parser;
use edvault::cli::{init_logging, Cli, Commands};

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Keygen { ref path } => edvault::cli::commands::keygen::execute(&cli, path.as_deref()),
        Commands::Put { ref key, ref file } => {
            edvault::cli::commands::put::execute(&cli, key, file.as_deref())
        }
        Commands::Get { ref key } => edvault::cli::commands::get::execute(&cli, key),
        Commands::Delete { ref key, force } => {
            edvault::cli::commands::delete::execute(&cli, key, force)
        }
        Commands::List => edvault::cli::commands::list::execute(&cli),
        Commands::Token { ref key } => edvault::cli::commands::token::execute(&cli, key),
    };

    if let Err(e) = result {
        edvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
