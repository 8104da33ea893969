fn main() -> anyhow::Result<()> {
    nekocore::cli::run_cli()
}
