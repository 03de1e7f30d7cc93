//! Output formatting (JSON/text).

use std::io::{self, Write};

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text output.
    #[default]
    Text,
    /// JSON output.
    Json,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub format: OutputFormat,
    /// Pretty print (for JSON).
    pub pretty: bool,
}

/// Types that can be printed as text or JSON.
pub trait Printable {
    /// Print as plain text.
    fn print_text<W: Write>(&self, w: &mut W) -> io::Result<()>;

    /// Convert to JSON value.
    fn to_json(&self) -> serde_json::Value;
}

fn write_json<W: Write>(w: &mut W, json: &serde_json::Value, pretty: bool) -> io::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *w, json)?;
    } else {
        serde_json::to_writer(&mut *w, json)?;
    }
    writeln!(w)
}

/// Print one item to stdout.
pub fn print_one<T: Printable>(item: &T, opts: &OutputOptions) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    match opts.format {
        OutputFormat::Text => item.print_text(&mut stdout),
        OutputFormat::Json => write_json(&mut stdout, &item.to_json(), opts.pretty),
    }
}

/// Print a list of items to stdout.
pub fn print_all<T: Printable>(items: &[T], opts: &OutputOptions) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    match opts.format {
        OutputFormat::Text => {
            for item in items {
                item.print_text(&mut stdout)?;
            }
            Ok(())
        }
        OutputFormat::Json => {
            let json = serde_json::Value::Array(items.iter().map(|i| i.to_json()).collect());
            write_json(&mut stdout, &json, opts.pretty)
        }
    }
}
