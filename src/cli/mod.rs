// CLI module for flvio
//
// Command-line front end over the library: argument parsing, output
// formatting and one function per subcommand.

pub mod commands;
pub mod config;
pub mod output;

pub use config::{Commands, Config};
pub use output::OutputFormatter;

/// Dispatch the parsed command line
pub fn run(config: &Config) -> anyhow::Result<()> {
    let container_config = config.container_config()?;
    let formatter = OutputFormatter::new(config.format, config.quiet);

    match &config.command {
        Commands::Info { files } => commands::command_info(files, &container_config, &formatter),
        Commands::Tags { file, limit } => commands::command_tags(file, *limit, &container_config, &formatter),
        Commands::Rebase { input, output, sync } => {
            commands::command_rebase(input, output, *sync, &container_config, &formatter)
        }
        Commands::Detect { files } => commands::command_detect(files, &formatter),
    }
}
