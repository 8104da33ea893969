fn main() -> anyhow::Result<()> {
    nekomata::cli::run_cli()
}
