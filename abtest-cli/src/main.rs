//! abtest binary

fn main() -> anyhow::Result<()> {
    abtest_cli::run()
}
