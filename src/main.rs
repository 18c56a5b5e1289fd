use clap::Parser;
use image_snip::template::TemplateOutcome;
use image_snip::{config, output, parse, process, template};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "image-snip")]
#[command(version)]
#[command(about = "Batch crop and decorate images from an options file")]
#[command(long_about = "\
Batch crop and decorate images from an options file

The options file lists process instructions, settings and image files, one
per line. Every image goes through every instruction, in order:

  output_folder: ~/Pictures/snips      # must exist; default is crop_<date_time>/
  new_name: harbour                    # harbour-001.jpg, harbour-002.jpg, ...
  output_format: PNG                   # JPG | PNG; default keeps the source format
  timestamp_mode: 1                    # 1 = to the second, 2 = to the microsecond

  crop_zoom(800, 800)
  border(4, 0, 0, 0)
  rounded(16, 2)
  text_footers(\"DejaVuSans.ttf\", 18, 2)
  animated_gif(1500)

  > Harbour at dawn                    # caption for the images below
  ./001-harbour.jpg
  ./002-harbour.jpg

Relative paths are resolved against the current directory.

Run 'image-snip --template <file>' to append a commented reference of every
option to <file>.")]
struct Cli {
    /// Options file
    #[arg(required_unless_present = "print_config")]
    opt_file: Option<PathBuf>,

    /// Replace output files that already exist
    #[arg(long)]
    overwrite: bool,

    /// Append the options reference to OPT_FILE instead of running
    #[arg(long)]
    template: bool,

    /// Style configuration file (colors, padding, JPEG quality)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print a stock style config with all options documented
    #[arg(long)]
    print_config: bool,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", config::stock_config_toml());
        return ExitCode::SUCCESS;
    }

    println!("\n{}\n", output::app_label());

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let opt_file = cli.opt_file.as_deref().ok_or("no options file given")?;

    if cli.template {
        println!("Writing template lines to '{}'", opt_file.display());
        if template::append_template(opt_file)? == TemplateOutcome::AlreadyPresent {
            println!("Template already present, file unchanged.");
        }
        return Ok(());
    }

    let style = config::load_config(cli.config.as_deref())?;

    println!("Reading options from '{}'.", opt_file.display());
    let text = std::fs::read_to_string(opt_file)?;
    let base_dir = std::env::current_dir()?;
    let mut options = parse::parse_options(&text, &base_dir)?;
    options.settings.overwrite = cli.overwrite;

    let summary = process::run(&options, &style, &mut output::print_event)?;
    output::print_summary(&summary);
    Ok(())
}

/// Diagnostics go to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
