use aegis_core::cli::run_cli;

fn main() -> anyhow::Result<()> {
    run_cli()
}
