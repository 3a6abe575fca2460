//! pdfsift CLI - batch PDF text, table and image extraction

use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfsift::{
    BatchObserver, BatchOptions, BatchReport, BatchRunner, DocumentOutcome, ErrorMode,
    NormalizationOption, NormalizationOptions,
};

/// Exit code when at least one document failed.
const EXIT_FAILURES: i32 = 1;
/// Exit code for invalid options.
const EXIT_USAGE: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "pdfsift")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract text, tables and images from a directory of PDFs into JSON", long_about = None)]
struct Cli {
    /// Directory containing the input documents
    #[arg(
        short,
        long,
        value_name = "DIR",
        required_unless_present = "list_options"
    )]
    input_dir: Option<PathBuf>,

    /// Directory receiving one numbered subdirectory per document
    #[arg(
        short,
        long,
        value_name = "DIR",
        required_unless_present = "list_options"
    )]
    output_dir: Option<PathBuf>,

    /// Comma-separated normalization options, or "none"
    #[arg(
        long,
        value_name = "LIST",
        env = "PDFSIFT_NORMALIZE",
        value_parser = parse_normalize,
        conflicts_with = "flags"
    )]
    normalize: Option<NormalizationOptions>,

    /// Normalization options as a legacy bit mask (decimal, 0b..., 0x...)
    #[arg(long, value_name = "N", value_parser = parse_flags)]
    flags: Option<NormalizationOptions>,

    /// JSON batch configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Extension of the files to process
    #[arg(long, value_name = "EXT")]
    extension: Option<String>,

    /// Skip failing page extractions instead of failing the document
    #[arg(long)]
    lenient: bool,

    /// Fail documents whose JSON record already exists
    #[arg(long)]
    no_overwrite: bool,

    /// Do not show a progress bar
    #[arg(short, long)]
    quiet: bool,

    /// List the normalization options and exit
    #[arg(long)]
    list_options: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if cli.list_options {
        cmd_list_options();
        return;
    }

    let options = match build_options(&cli) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(EXIT_USAGE);
        }
    };

    // both are required unless --list-options
    let (Some(input_dir), Some(output_dir)) = (cli.input_dir.as_deref(), cli.output_dir.as_deref())
    else {
        std::process::exit(EXIT_USAGE);
    };

    match cmd_extract(input_dir, output_dir, options, cli.quiet) {
        Ok(report) if report.failed() == 0 => {}
        Ok(_) => std::process::exit(EXIT_FAILURES),
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(EXIT_FAILURES);
        }
    }
}

/// Merge the configuration file and the command-line flags, flags winning.
///
/// The result is validated, so contradictory normalization options are
/// rejected here rather than once per document.
fn build_options(cli: &Cli) -> Result<BatchOptions, Box<dyn std::error::Error>> {
    let mut options = match &cli.config {
        Some(path) => BatchOptions::from_json_file(path)?,
        None => BatchOptions::default(),
    };

    if let Some(normalization) = cli.normalize.or(cli.flags) {
        options = options.with_normalization(normalization);
    }
    if let Some(extension) = &cli.extension {
        options = options.with_extension(extension.as_str());
    }
    if cli.lenient {
        options = options.with_error_mode(ErrorMode::Lenient);
    }
    if cli.no_overwrite {
        options = options.with_overwrite(false);
    }

    options.normalization.build()?;
    Ok(options)
}

fn cmd_extract(
    input_dir: &Path,
    output_dir: &Path,
    options: BatchOptions,
    quiet: bool,
) -> Result<BatchReport, Box<dyn std::error::Error>> {
    log::info!(
        "Normalization: {} (flags {:#012b}), error mode: {}",
        options.normalization,
        options.normalization.to_bits(),
        options.error_mode
    );

    let runner = BatchRunner::new(options);
    let mut observer = ProgressObserver::new(quiet);
    let report = runner.run(input_dir, output_dir, &mut observer)?;

    print_summary(&report);
    Ok(report)
}

fn print_summary(report: &BatchReport) {
    if report.failed() == 0 {
        println!(
            "{} {} documents extracted",
            "Done!".green().bold(),
            report.total()
        );
        return;
    }

    eprintln!(
        "{}",
        format!("{} of {} documents failed", report.failed(), report.total())
            .red()
            .bold()
    );
    for outcome in report.failures() {
        if let Err(failure) = &outcome.result {
            eprintln!(
                "  {} [{}] {} ({})",
                "✗".red(),
                outcome.index,
                outcome.input.display(),
                failure.kind.to_string().yellow()
            );
        }
    }
}

fn cmd_list_options() {
    let preset = NormalizationOptions::legacy_preset();

    println!("{}", "Normalization options".cyan().bold());
    println!("(applied in this order, after NFKC; * = default)");
    for option in NormalizationOption::ALL {
        let partner = NormalizationOption::EXCLUSIVE_PAIRS
            .iter()
            .find_map(|&(a, b)| {
                if option == a {
                    Some(b)
                } else if option == b {
                    Some(a)
                } else {
                    None
                }
            });

        let marker = if preset.is_enabled(option) { "*" } else { " " };
        let mut line = format!(
            "{} bit{:<2} {}",
            marker,
            option as u16,
            format!("{:<22}", option.name()).bold()
        );
        if let Some(partner) = partner {
            line.push_str(&format!(" exclusive with {}", partner));
        }
        if option.is_lossy() {
            line.push_str(&format!(" {}", "(lossy)".dimmed()));
        }
        println!("{}", line.trim_end());
    }
}

/// Parse `--normalize`.
fn parse_normalize(list: &str) -> Result<NormalizationOptions, String> {
    NormalizationOptions::parse_list(list).map_err(|e| e.to_string())
}

/// Parse `--flags`: decimal, `0b...` or `0x...`, underscores allowed.
fn parse_flags(value: &str) -> Result<NormalizationOptions, String> {
    let cleaned: String = value.trim().chars().filter(|c| *c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();

    let bits = if let Some(binary) = lower.strip_prefix("0b") {
        u16::from_str_radix(binary, 2)
    } else if let Some(hex) = lower.strip_prefix("0x") {
        u16::from_str_radix(hex, 16)
    } else {
        lower.parse::<u16>()
    }
    .map_err(|e| format!("invalid bit mask '{}': {}", value, e))?;

    NormalizationOptions::from_bits(bits).map_err(|e| e.to_string())
}

/// Progress bar driven by batch events.
///
/// Failures are reported by the library's error log; the bar only counts them.
struct ProgressObserver {
    quiet: bool,
    bar: Option<ProgressBar>,
    failed: usize,
}

impl ProgressObserver {
    fn new(quiet: bool) -> Self {
        Self {
            quiet,
            bar: None,
            failed: 0,
        }
    }
}

impl BatchObserver for ProgressObserver {
    fn on_batch_start(&mut self, total: usize) {
        if self.quiet {
            return;
        }
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {prefix:.red} {msg}")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        self.bar = Some(bar);
    }

    fn on_document_start(&mut self, _index: usize, input: &Path) {
        if let Some(bar) = &self.bar {
            let name = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            bar.set_message(name);
        }
    }

    fn on_document_finish(&mut self, outcome: &DocumentOutcome) {
        if !outcome.is_success() {
            self.failed += 1;
        }
        if let Some(bar) = &self.bar {
            if self.failed > 0 {
                bar.set_prefix(format!("{} failed", self.failed));
            }
            bar.inc(1);
        }
    }

    fn on_batch_finish(&mut self, _report: &BatchReport) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["pdfsift", "-i", "in", "-o", "out"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_flags() {
        assert_eq!(
            parse_flags("0b0010011101").unwrap(),
            NormalizationOptions::legacy_preset()
        );
        assert_eq!(
            parse_flags("0b00_1001_1101").unwrap(),
            NormalizationOptions::legacy_preset()
        );
        assert_eq!(parse_flags("157").unwrap(), NormalizationOptions::legacy_preset());
        assert_eq!(parse_flags("0x9D").unwrap(), NormalizationOptions::legacy_preset());
        assert!(parse_flags("0b10000000000").is_err());
        assert!(parse_flags("abc").is_err());
    }

    #[test]
    fn test_default_options_use_legacy_preset() {
        let options = build_options(&parse(&[])).unwrap();
        assert_eq!(options.normalization, NormalizationOptions::legacy_preset());
        assert_eq!(options.extension, "pdf");
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert!(options.overwrite);
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = parse(&[
            "--normalize",
            "uppercase,strip-digits",
            "--extension",
            "PDF",
            "--lenient",
            "--no-overwrite",
        ]);
        let options = build_options(&cli).unwrap();
        assert_eq!(
            options.normalization,
            NormalizationOptions::new().uppercase().strip_digits()
        );
        assert_eq!(options.extension, "PDF");
        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert!(!options.overwrite);
    }

    #[test]
    fn test_normalize_none() {
        let options = build_options(&parse(&["--normalize", "none"])).unwrap();
        assert_eq!(options.normalization, NormalizationOptions::new());
    }

    #[test]
    fn test_conflicting_options_rejected() {
        let cli = parse(&["--normalize", "lowercase,uppercase"]);
        let err = build_options(&cli).unwrap_err();
        assert!(err.to_string().contains("lowercase"));
        assert!(err.to_string().contains("uppercase"));
    }

    #[test]
    fn test_unknown_option_is_usage_error() {
        let result = Cli::try_parse_from(["pdfsift", "-i", "in", "-o", "out", "--normalize", "shout"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_normalize_and_flags_conflict() {
        let result = Cli::try_parse_from([
            "pdfsift", "-i", "in", "-o", "out", "--normalize", "lowercase", "--flags", "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("batch.json");
        std::fs::write(
            &config,
            r#"{"normalization": {"lowercase": true}, "extension": "dat", "overwrite": false}"#,
        )
        .unwrap();

        let cli = parse(&["--config", config.to_str().unwrap(), "--extension", "pdf"]);
        let options = build_options(&cli).unwrap();
        assert_eq!(options.normalization, NormalizationOptions::new().lowercase());
        assert_eq!(options.extension, "pdf");
        assert!(!options.overwrite);
    }

    #[test]
    fn test_progress_counts_failures_without_printing() {
        let failure = DocumentOutcome {
            index: 0,
            input: PathBuf::from("broken.pdf"),
            result: Err(pdfsift::DocumentFailure {
                kind: pdfsift::ErrorKind::DocumentOpen,
                message: "Failed to open document 'broken.pdf'".to_string(),
            }),
        };
        let success = DocumentOutcome {
            index: 1,
            input: PathBuf::from("fine.pdf"),
            result: Ok(PathBuf::from("out/1/fine.json")),
        };

        let mut observer = ProgressObserver::new(false);
        observer.on_batch_start(2);
        observer.on_document_finish(&failure);
        observer.on_document_finish(&success);

        assert_eq!(observer.failed, 1);
        let bar = observer.bar.as_ref().unwrap();
        assert_eq!(bar.position(), 2);
        assert_eq!(bar.prefix(), "1 failed");
    }

    #[test]
    fn test_input_required_unless_listing() {
        assert!(Cli::try_parse_from(["pdfsift"]).is_err());
        assert!(Cli::try_parse_from(["pdfsift", "--list-options"]).is_ok());
    }
}
