fn main() -> anyhow::Result<()> {
    racedat::cli::run_cli()
}
