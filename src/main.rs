use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use datemark::{
    Config,
    batch::BatchDriver,
    compositor::Watermarker,
    placement::Placement,
    prompt::Prompter,
    startup_checks,
    style::{NamedColor, WatermarkStyle},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "datemark.toml")]
    config: PathBuf,

    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Font file to draw with, overriding the configured family
    #[arg(long)]
    font: Option<PathBuf>,

    /// Image directory (skips the prompt)
    #[arg(short, long)]
    input: Option<String>,

    /// Font size in pixels (skips the prompt)
    #[arg(long)]
    font_size: Option<String>,

    /// BLACK, WHITE, RED, GREEN, BLUE or YELLOW (skips the prompt)
    #[arg(long)]
    color: Option<String>,

    /// TOP_LEFT, TOP_RIGHT, BOTTOM_LEFT, BOTTOM_RIGHT or CENTER (skips the prompt)
    #[arg(long)]
    position: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Set up logging first
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = if cli.config.exists() {
        let config_content = std::fs::read_to_string(&cli.config)?;
        toml_edit::de::from_str::<Config>(&config_content)?
    } else {
        info!("Config file not found at {:?}, using defaults", cli.config);
        Config::default()
    };
    if let Some(font) = cli.font {
        config.watermark.font_path = Some(font);
    }

    let stdin = std::io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), std::io::stdout());

    let input_dir = prompter.input_directory(cli.input)?;
    let output_dir = match startup_checks::prepare_output_directory(&input_dir, &config.output.suffix)
    {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let default_color = config.watermark.color.parse::<NamedColor>().unwrap_or_else(|e| {
        eprintln!("Warning: {} in config, using {}", e, NamedColor::default());
        NamedColor::default()
    });
    let default_placement = config
        .watermark
        .placement
        .parse::<Placement>()
        .unwrap_or_else(|e| {
            eprintln!("Warning: {} in config, using {}", e, Placement::default());
            Placement::default()
        });

    let font_size = prompter.font_size(cli.font_size, config.watermark.font_size)?;
    let color = prompter.color(cli.color, default_color)?;
    let placement = prompter.placement(cli.position, default_placement)?;

    let font = match startup_checks::load_watermark_font(&config.watermark) {
        Ok(font) => font,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let style = WatermarkStyle::new(&config.watermark, font_size, color);
    info!(
        "Watermarking {:?} with {:?} at {}",
        input_dir, style, placement
    );

    let driver = BatchDriver::new(
        Watermarker::new(style, placement, font),
        config.output.jpeg_quality,
    );

    let mut stdout = std::io::stdout();
    let report = driver.run(&input_dir, &output_dir, &mut stdout)?;
    info!(
        "{} processed, {} failed, {} skipped",
        report.processed.len(),
        report.failed.len(),
        report.skipped.len()
    );

    writeln!(
        stdout,
        "All images processed. Output saved to: {}",
        output_dir.display()
    )?;

    Ok(())
}
