//! Parse command - extract a contact record from one OCR text file.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use cardscan_core::models::config::StrategyKind;
use cardscan_core::{BusinessCardParser, CardParser, ExtractionResult, ParsedBusinessCard};

use super::load_config;

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input text file, or `-` for stdin
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Extraction strategy (two_pass or scored)
    #[arg(short, long)]
    strategy: Option<StrategyKind>,

    /// Show per-field confidence scores
    #[arg(long)]
    show_confidence: bool,

    /// Show the rules behind every extracted field
    #[arg(long)]
    explain: bool,

    /// Warn when overall confidence is below this value
    #[arg(long)]
    min_confidence: Option<f32>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(strategy) = args.strategy {
        config.extraction.strategy = strategy;
    }
    let parser = BusinessCardParser::from_config(config)?;

    let text = read_input(&args.input)?;
    info!("Parsing {} ({} bytes)", args.input.display(), text.len());

    let result = parser.parse(&text);
    let output = format_card(&result.card, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        println!();
        print_confidence(&result);
    }

    if args.explain {
        println!();
        print_trace(&result);
    }

    if let Some(threshold) = args.min_confidence {
        if result.card.confidence.overall < threshold {
            eprintln!(
                "{} Overall confidence {:.2} is below {:.2}; review the fields manually.",
                style("⚠").yellow(),
                result.card.confidence.overall,
                threshold
            );
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn read_input(input: &PathBuf) -> anyhow::Result<String> {
    if input.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    Ok(fs::read_to_string(input)?)
}

fn print_confidence(result: &ExtractionResult) {
    let confidence = &result.card.confidence;
    println!(
        "{} Overall confidence: {:.1}%",
        style("ℹ").blue(),
        confidence.overall * 100.0
    );
    for (field, value) in [
        ("name", confidence.name),
        ("jobTitle", confidence.job_title),
        ("company", confidence.company),
        ("phones", confidence.phones),
        ("email", confidence.email),
        ("address", confidence.address),
    ] {
        println!("   {:<9} {:.2}", field, value);
    }
    println!(
        "{} Strategy: {}, {} lines, {}ms",
        style("ℹ").blue(),
        result.strategy,
        result.line_count,
        result.processing_time_ms
    );
}

fn print_trace(result: &ExtractionResult) {
    println!("{}", style("Field sources:").bold());
    for entry in &result.trace {
        let line = entry
            .line_index
            .map(|i| format!("line {}", i))
            .unwrap_or_else(|| "merged".to_string());
        println!(
            "  {:<14} {:.2}  {:<8} {}",
            entry.field,
            entry.confidence,
            line,
            entry.source_tags.join(", ")
        );
    }
    for url in &result.urls {
        println!("  {:<14} {}", "url", url);
    }
    for warning in &result.warnings {
        println!("  {} {}", style("-").yellow(), warning);
    }
}

pub fn format_card(card: &ParsedBusinessCard, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(card)?),
        OutputFormat::Csv => format_csv(card),
        OutputFormat::Text => Ok(format_text(card)),
    }
}

fn format_csv(card: &ParsedBusinessCard) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "name",
        "job_title",
        "company",
        "mobile1",
        "mobile2",
        "office",
        "fax",
        "email",
        "address",
        "confidence",
    ])?;

    wtr.write_record([
        &card.name,
        &card.job_title,
        &card.company,
        &card.phones.mobile1,
        &card.phones.mobile2,
        &card.phones.office,
        &card.phones.fax,
        &card.email,
        &card.address,
        &format!("{:.2}", card.confidence.overall),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(card: &ParsedBusinessCard) -> String {
    let mut output = String::new();

    output.push_str(&format!("Name:    {}\n", card.name));
    output.push_str(&format!("Title:   {}\n", card.job_title));
    output.push_str(&format!("Company: {}\n", card.company));
    output.push('\n');

    output.push_str("Phones:\n");
    for (role, number) in card.phones.filled() {
        output.push_str(&format!("  {:<8} {}\n", role, number));
    }
    output.push('\n');

    output.push_str(&format!("Email:   {}\n", card.email));
    output.push_str(&format!("Address: {}\n", card.address));

    output
}
