//! thesis-lint CLI - annotates layout mistakes in thesis PDFs

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use thesis_lint::{
    detect::has_pdf_extension, detect_format_from_path, to_json, CheckKind, CheckOptions,
    CheckReport, DocumentChecker, JsonFormat, LopdfBackend,
};

#[derive(Parser)]
#[command(name = "thesis-lint")]
#[command(version)]
#[command(
    about = "Find and annotate typesetting mistakes in thesis PDFs",
    long_about = "Find and annotate typesetting mistakes in thesis PDFs.\n\n\
                  Without any check flag every check is run. Each input is saved \
                  in the output directory (or next to the input) as \
                  <name>_annotated.pdf."
)]
struct Cli {
    /// Input PDF files
    #[arg(value_name = "FILE", required = true)]
    inputs: Vec<PathBuf>,

    /// Treat embedded PDF pages as part of the page instead of as images
    #[arg(long)]
    embedded_pdf: bool,

    /// Check content sticking out of the text column
    #[arg(short = 'o', long)]
    overflow: bool,

    /// Check images almost as wide as the text column
    #[arg(short = 'i', long)]
    image_width: bool,

    /// Check hyphens used instead of dashes
    #[arg(short = 'H', long)]
    hyphen: bool,

    /// Check deep headings in the table of contents
    #[arg(short = 't', long)]
    toc: bool,

    /// Check missing spaces before opening brackets
    #[arg(short = 's', long)]
    space_bracket: bool,

    /// Check headings without text between them
    #[arg(short = 'e', long)]
    empty_section: bool,

    /// Check unresolved references ("??")
    #[arg(short = 'b', long)]
    bad_reference: bool,

    /// Write chapter statistics to <name>_stats.json
    #[arg(long)]
    stats: bool,

    /// Directory for the annotated documents (defaults to the input's directory)
    #[arg(long, value_name = "DIR", env = "THESIS_LINT_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,
}

impl Cli {
    fn check_options(&self) -> CheckOptions {
        let selected = CheckOptions::none()
            .with_overflow(self.overflow)
            .with_image_width(self.image_width)
            .with_dash(self.hyphen)
            .with_toc(self.toc)
            .with_bracket_spacing(self.space_bracket)
            .with_empty_section(self.empty_section)
            .with_bad_reference(self.bad_reference);

        let options = if selected.any_check() {
            selected
        } else {
            CheckOptions::all()
        };
        options
            .with_embedded_pdf_as_image(!self.embedded_pdf)
            .with_statistics(self.stats)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let options = cli.check_options();

    if let Some(dir) = &cli.output_dir {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    }

    let pb = ProgressBar::new(cli.inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut failed = 0;
    for input in &cli.inputs {
        pb.set_message(input.display().to_string());

        if let Err(reason) = validate_input(input) {
            pb.suspend(|| {
                eprintln!("{} {}: {}", "Skipping".yellow(), input.display(), reason);
            });
            pb.inc(1);
            continue;
        }

        match cmd_check(input, cli.output_dir.as_deref(), &options) {
            Ok(summary) => pb.suspend(|| print_summary(input, &summary)),
            Err(e) => {
                failed += 1;
                pb.suspend(|| {
                    eprintln!("{} {}: {}", "Error".red().bold(), input.display(), e);
                });
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if failed > 0 {
        std::process::exit(1);
    }
}

struct Summary {
    report: CheckReport,
    annotated: PathBuf,
    stats: Option<PathBuf>,
}

fn validate_input(input: &Path) -> Result<(), String> {
    if !input.is_file() {
        return Err("file not found".to_string());
    }
    if !has_pdf_extension(input) {
        return Err("not a .pdf file".to_string());
    }
    detect_format_from_path(input)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

fn output_path(input: &Path, output_dir: Option<&Path>, suffix: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(format!("{}{}", stem, suffix))
}

fn cmd_check(
    input: &Path,
    output_dir: Option<&Path>,
    options: &CheckOptions,
) -> Result<Summary, Box<dyn std::error::Error>> {
    let backend = LopdfBackend::open(input)?;
    let mut checker = DocumentChecker::new(backend, options.clone());

    let annotated = output_path(input, output_dir, "_annotated.pdf");
    let report = checker.annotate(&annotated)?;

    let stats = match &report.statistics {
        Some(statistics) => {
            let path = output_path(input, output_dir, "_stats.json");
            fs::write(&path, to_json(statistics, JsonFormat::Pretty)?)?;
            Some(path)
        }
        None => None,
    };

    Ok(Summary {
        report,
        annotated,
        stats,
    })
}

fn print_summary(input: &Path, summary: &Summary) {
    let report = &summary.report;
    println!("{}", input.display().to_string().cyan().bold());

    if report.mistakes_found {
        println!("  {}", "mistakes were found".red().bold());
    } else {
        println!("  {}", "no mistakes found".green().bold());
    }
    if report.border_not_found {
        println!(
            "  {}",
            "text margin not found, overflow and image width were not checked".yellow()
        );
    }

    let kinds = [
        (CheckKind::Overflow, "overflow"),
        (CheckKind::Dash, "hyphen instead of dash"),
        (CheckKind::BadReference, "bad reference"),
        (CheckKind::ImageWidth, "image width"),
        (CheckKind::Toc, "table of contents"),
        (CheckKind::BracketSpacing, "space before bracket"),
        (CheckKind::EmptySection, "empty section"),
    ];
    for (kind, label) in kinds {
        let count = report.count(kind);
        if count > 0 {
            println!("  {} {}: {}", "├─".dimmed(), label, count);
        }
    }

    println!("  {} {}", "└─".dimmed(), summary.annotated.display());
    if let Some(stats) = &summary.stats {
        println!("     {}", stats.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flag_runs_every_check() {
        let cli = Cli::parse_from(["thesis-lint", "thesis.pdf"]);
        let options = cli.check_options();
        assert_eq!(options, CheckOptions::all());
    }

    #[test]
    fn test_selected_checks_only() {
        let cli = Cli::parse_from(["thesis-lint", "-H", "-b", "--embedded-pdf", "a.pdf", "b.pdf"]);
        assert_eq!(cli.inputs.len(), 2);
        let options = cli.check_options();
        assert!(options.dash);
        assert!(options.bad_reference);
        assert!(!options.overflow);
        assert!(!options.toc);
        assert!(!options.embedded_pdf_as_image);
    }

    #[test]
    fn test_output_paths() {
        let input = Path::new("/data/thesis.pdf");
        assert_eq!(
            output_path(input, None, "_annotated.pdf"),
            PathBuf::from("/data/thesis_annotated.pdf")
        );
        assert_eq!(
            output_path(input, Some(Path::new("/out")), "_stats.json"),
            PathBuf::from("/out/thesis_stats.json")
        );
    }

    #[test]
    fn test_help_names_output_location() {
        use clap::CommandFactory;

        let help = Cli::command()
            .get_long_about()
            .map(|s| s.to_string())
            .unwrap_or_default();
        assert!(help.contains("in the output directory (or next to the input)"));
    }

    #[test]
    fn test_missing_input_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate_input(&dir.path().join("missing.pdf")).is_err());

        let text = dir.path().join("notes.pdf");
        fs::write(&text, "plain text").unwrap();
        assert!(validate_input(&text).is_err());
    }
}
