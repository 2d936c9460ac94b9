use anyhow::{Context, Result};
use sparkle_relnotes::{ConvertConfig, convert_markdown, init_logging, parse_or_exit};

fn main() -> Result<()> {
    init_logging();

    let config: ConvertConfig = parse_or_exit();
    config.validate().context("Invalid configuration")?;

    convert_markdown(
        &config.markdown_file,
        &config.output_html_file,
        config.title.as_deref(),
    )?;

    println!(
        "Converted {} to {}",
        config.markdown_file.display(),
        config.output_html_file.display()
    );

    Ok(())
}
