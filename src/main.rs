mod cli;

use motionphoto::{
    config::{self, MetadataSourceKind},
    encode_file, extract_file, verify_file, EncodeOptions,
};
use motionphoto_av::{check_tools, ExiftoolDump, FfmpegFrameExtractor, MetadataSource};
use motionphoto_container::ValidationReport;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::time::Duration;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "motionphoto=trace,motionphoto_av=trace,motionphoto_container=trace".to_string()
        } else {
            "motionphoto=info,motionphoto_av=info,motionphoto_container=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Encode {
            video,
            output,
            timestamp_ms,
        } => encode(&video, output.as_deref(), timestamp_ms, cli.config.as_deref()),
        Commands::Verify {
            file,
            json,
            exiftool,
        } => verify(&file, json, exiftool, cli.config.as_deref()),
        Commands::Extract { file, image, video } => {
            extract(&file, image.as_deref(), video.as_deref())
        }
        Commands::CheckTools => check_tools_cmd(),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("motionphoto {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn encode(
    video: &Path,
    output: Option<&Path>,
    timestamp_ms: Option<u64>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    if !video.exists() {
        anyhow::bail!("Video file does not exist: {:?}", video);
    }

    let mut options = EncodeOptions::from_config(&config.encode);
    if let Some(ms) = timestamp_ms {
        options.frame_timestamp = Duration::from_millis(ms);
    }

    let extractor = FfmpegFrameExtractor::with_config(config.tools.ffmpeg_path.as_deref())?
        .timeout(Duration::from_secs(config.tools.timeout_secs));

    let outcome = encode_file(&extractor, video, output, &options)?;

    println!("Created {}", outcome.output.display());
    println!("  Primary image: {} bytes", outcome.primary_length);
    println!("  Video:         {} bytes", outcome.video_length);
    println!(
        "  Total:         {} bytes",
        outcome.primary_length + outcome.video_length
    );

    Ok(())
}

fn verify(file: &Path, json: bool, exiftool: bool, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let use_exiftool = exiftool || config.verify.metadata_source == MetadataSourceKind::Exiftool;
    let dump = if use_exiftool {
        Some(
            ExiftoolDump::with_config(config.tools.exiftool_path.as_deref())?
                .timeout(Duration::from_secs(config.tools.timeout_secs)),
        )
    } else {
        None
    };

    let report = verify_file(file, dump.as_ref().map(|d| d as &dyn MetadataSource))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if !report.passed() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_report(report: &ValidationReport) {
    println!("File: {} ({} bytes)\n", report.file_name, report.file_size);

    for check in &report.checks {
        let status = if check.passed { "✓" } else { "✗" };
        println!("{} {:<20} {}", status, check.name, check.detail);
    }

    for note in &report.notes {
        println!("  note: {}", note);
    }

    println!();
    let failed = report.failures().count();
    if failed == 0 {
        println!("Valid Motion Photo: all {} checks passed", report.checks.len());
    } else {
        println!(
            "Not a valid Motion Photo: {} of {} checks failed",
            failed,
            report.checks.len()
        );
    }
}

fn extract(file: &Path, image: Option<&Path>, video: Option<&Path>) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let outcome = extract_file(file, image, video)?;

    println!("Primary image: {} bytes", outcome.primary_length);
    println!("Video:         {} bytes", outcome.video_length);
    if let Some(path) = &outcome.image {
        println!("Wrote image to {}", path.display());
    }
    if let Some(path) = &outcome.video {
        println!("Wrote video to {}", path.display());
    }

    Ok(())
}

fn check_tools_cmd() -> Result<()> {
    println!("Checking external tools...\n");

    let tools = check_tools();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. ffmpeg is needed to encode, exiftool only for verify --exiftool.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("  Frame timestamp: {} ms", config.encode.frame_timestamp_ms);
    println!("  Output suffix: {}", config.encode.output_suffix);
    println!("  Max sizing attempts: {}", config.encode.max_sizing_attempts);
    println!("  Metadata source: {:?}", config.verify.metadata_source);
    println!("  Tool timeout: {} s", config.tools.timeout_secs);

    Ok(())
}
