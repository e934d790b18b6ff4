//! csv-scout CLI - dialect and column-format sniffer

use clap::Parser;
use csv_scout::{Comment, Culture, Detection, Escape, Quote, Scout};
use std::path::PathBuf;
use std::process::ExitCode;

/// Dialect and column-format sniffer for delimited text files.
///
/// Detects delimiter, quote character, escape prefix, comment marker,
/// record terminator and header presence, then infers a semantic format
/// for every column.
#[derive(Parser, Debug)]
#[command(name = "csv-scout")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file(s) to sniff
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Force a specific delimiter (single character, or 'tab')
    #[arg(short = 'd', long)]
    delimiter: Option<String>,

    /// Force a specific quote character (single character, or 'none')
    #[arg(short = 'q', long)]
    quote: Option<String>,

    /// Force a specific comment prefix (or 'none')
    #[arg(short = 'c', long)]
    comment: Option<String>,

    /// Use German number and date conventions instead of en-US
    #[arg(long)]
    de: bool,

    /// Rows scanned when sampling column values
    #[arg(short = 'n', long, default_value = "150")]
    sample_rows: usize,

    /// Allow numeric day-count values to be read as dates
    #[arg(long)]
    serial_dates: bool,

    /// Output format: text (default) or json
    #[arg(short = 'f', long, default_value = "text")]
    format: OutputFormat,

    /// Show the full change log of guesses made
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut exit_code = ExitCode::SUCCESS;
    for file in &args.files {
        if let Err(e) = sniff_file(file, &args) {
            eprintln!("Error processing {}: {}", file.display(), e);
            exit_code = ExitCode::FAILURE;
        }
    }
    exit_code
}

fn sniff_file(path: &PathBuf, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut scout = Scout::new();
    scout
        .sample_rows(args.sample_rows)
        .allow_serial_date(args.serial_dates);

    if args.de {
        scout.culture(Culture::DE_DE);
    }
    if let Some(ref delimiter) = args.delimiter {
        if delimiter.eq_ignore_ascii_case("tab") {
            scout.delimiter('\t');
        } else if let Some(c) = delimiter.chars().next() {
            scout.delimiter(c);
        }
    }
    if let Some(ref quote) = args.quote {
        if quote.eq_ignore_ascii_case("none") {
            scout.quote(Quote::None);
        } else if let Some(c) = quote.chars().next() {
            scout.quote(Quote::Some(c));
        }
    }
    if let Some(ref comment) = args.comment {
        if comment.eq_ignore_ascii_case("none") {
            scout.comment(Comment::Disabled);
        } else {
            scout.comment(Comment::Enabled(comment.clone()));
        }
    }

    let detection = scout.sniff_path(path)?;

    match args.format {
        OutputFormat::Text => print_text_output(path, &detection, args.verbose),
        OutputFormat::Json => print_json_output(path, &detection),
    }
    Ok(())
}

fn print_text_output(path: &PathBuf, detection: &Detection, verbose: bool) {
    println!("File: {}", path.display());
    println!("  Delimiter: {:?}", detection.dialect.delimiter);
    println!("  Quote: {}", detection.dialect.quote);
    println!("  Escape: {}", detection.dialect.escape);
    println!("  Comment: {}", detection.dialect.comment);
    println!("  Terminator: {}", detection.dialect.terminator);
    println!("  Has header: {}", detection.dialect.header.has_header_row);
    println!(
        "  Data starts at row: {}",
        detection.dialect.header.data_start_row
    );
    println!("  Fields: {}", detection.num_fields);
    println!("  Columns:");
    for column in &detection.columns {
        let marker = if column.confident { "" } else { " (uncertain)" };
        println!("    {}: {}{}", column.name, column.format, marker);
    }
    if verbose {
        println!("  Guesses:");
        for entry in &detection.change_log {
            println!("    - {entry}");
        }
    }
    println!();
}

fn print_json_output(path: &PathBuf, detection: &Detection) {
    let quote = match detection.dialect.quote {
        Quote::None => "null".to_string(),
        Quote::Some(q) => format!("{:?}", q.to_string()),
    };
    let escape = match detection.dialect.escape {
        Escape::Disabled => "null".to_string(),
        Escape::Enabled(c) => format!("{:?}", c.to_string()),
    };
    print!(
        r#"{{"file":{:?},"dialect":{{"delimiter":{:?},"quote":{},"escape":{},"comment":{:?},"terminator":"{}","has_header":{},"data_start_row":{}}},"num_fields":{},"columns":["#,
        path.display().to_string(),
        detection.dialect.delimiter.to_string(),
        quote,
        escape,
        detection.dialect.comment.prefix(),
        detection.dialect.terminator,
        detection.dialect.header.has_header_row,
        detection.dialect.header.data_start_row,
        detection.num_fields,
    );
    for (i, column) in detection.columns.iter().enumerate() {
        if i > 0 {
            print!(",");
        }
        print!(
            r#"{{"name":{:?},"type":"{}","confident":{}}}"#,
            column.name, column.format.data_type, column.confident
        );
    }
    println!("]}}");
}
