//! Command execution implementations

use super::{Commands, batch, model};

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Inspect { path, decode } => model::inspect(path, &decode.to_options()),
            Commands::Json {
                path,
                output,
                decode,
            } => model::extract_json(path, output, &decode.to_options()),
            Commands::Scene {
                path,
                output,
                decode,
            } => model::write_scene(path, output, &decode.to_options()),
            Commands::Batch { dir, quiet, decode } => {
                batch::execute(dir, *quiet, &decode.to_options())
            }
            Commands::Locate { path, name, decode } => {
                model::locate(path, name, &decode.to_options())
            }
        }
    }
}
