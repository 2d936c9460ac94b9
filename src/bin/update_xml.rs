use anyhow::{Context, Result};
use sparkle_relnotes::{UpdateConfig, init_logging, parse_or_exit, update_appcast_file};

fn main() -> Result<()> {
    init_logging();

    let config: UpdateConfig = parse_or_exit();
    config.validate().context("Invalid configuration")?;

    let report = update_appcast_file(&config.appcast, &config.update())?;

    if report.changed() {
        println!("Updated {} with release notes links", config.appcast.display());
    } else {
        println!("All items already have release notes links. No changes made.");
    }

    Ok(())
}
