use crate::config::load_config;
use crate::export;
use crate::import;
use crate::scene::Document;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "avdt",
    version,
    about = "Transcoder between scene documents and Android (animated) vector drawables"
)]
pub struct Args {
    /// Input file or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Transcode direction
    #[arg(short = 'm', long = "mode", value_enum, default_value = "import")]
    pub mode: Mode,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Mode {
    /// Drawable XML to scene document JSON
    Import,
    /// Scene document JSON to a static vector drawable
    Export,
    /// Scene document JSON to an animated vector drawable
    ExportAnimated,
    /// Drawable XML back to drawable XML through the scene document
    Roundtrip,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let input = read_input(args.input.as_deref())?;

    let output = match args.mode {
        Mode::Import => {
            // import into a fresh document so a failed import never leaves a
            // half-populated scene behind
            let mut doc = Document::new();
            import::import_str(&mut doc, &config, &input)?;
            serde_json::to_string_pretty(&doc)?
        }
        Mode::Export => {
            let mut doc: Document = serde_json::from_str(&input)?;
            export::vector_drawable_string(&mut doc, &config)?
        }
        Mode::ExportAnimated => {
            let mut doc: Document = serde_json::from_str(&input)?;
            export::animated_vector_drawable_string(&mut doc, &config)?
        }
        Mode::Roundtrip => {
            let mut doc = Document::new();
            import::import_str(&mut doc, &config, &input)?;
            if input.contains("animated-vector") {
                export::animated_vector_drawable_string(&mut doc, &config)?
            } else {
                export::vector_drawable_string(&mut doc, &config)?
            }
        }
    };

    write_output(&output, args.output.as_deref())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok(buf);
        }
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn write_output(text: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, text)?,
        None => println!("{text}"),
    }
    Ok(())
}
