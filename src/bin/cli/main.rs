use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use enex_convert::{
    CollisionPolicy, ConvertOptions, Converter, Destination, OutputFormat, ResourceFilter,
    TabularEncoding,
};

#[derive(Parser)]
#[command(
    name = "enex-convert",
    about = "Convert an Evernote .enex export to CSV, JSON, or a directory of text files",
    version
)]
struct Cli {
    /// Evernote export file (.enex)
    source: PathBuf,

    /// Output file or directory (default: standard output)
    destination: Option<PathBuf>,

    /// Output format
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Options file (default: <config dir>/enex-convert/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Which resources to keep
    #[arg(long, value_enum)]
    resources: Option<ResourcePreset>,

    /// Keep only these media types (repeatable; `type/*` matches a family)
    #[arg(long = "allow-mime", value_name = "TYPE", conflicts_with = "resources")]
    allow_mime: Vec<String>,

    /// What to do when a note file already exists in directory output
    #[arg(long)]
    on_collision: Option<CollisionPolicy>,

    /// Characters allowed in CSV content cells
    #[arg(long)]
    tabular_encoding: Option<TabularEncoding>,

    /// Write a header row in CSV output
    #[arg(long)]
    header: bool,

    /// Indent JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum ResourcePreset {
    All,
    Images,
}

impl Cli {
    /// File options, overridden by whatever was given on the command line
    fn options(&self) -> anyhow::Result<ConvertOptions> {
        let mut options = match &self.config {
            Some(path) => ConvertOptions::load(path)
                .with_context(|| format!("Failed to load options from {}", path.display()))?,
            None => ConvertOptions::load_default().context("Failed to load default options")?,
        };

        if let Some(format) = self.format {
            options.format = format;
        }
        match self.resources {
            Some(ResourcePreset::All) => options.resource_filter = ResourceFilter::All,
            Some(ResourcePreset::Images) => options.resource_filter = ResourceFilter::Images,
            None => {}
        }
        if !self.allow_mime.is_empty() {
            options.resource_filter = ResourceFilter::AllowList(self.allow_mime.clone());
        }
        if let Some(policy) = self.on_collision {
            options.on_collision = policy;
        }
        if let Some(encoding) = self.tabular_encoding {
            options.tabular_encoding = encoding;
        }
        options.tabular_header |= self.header;
        options.pretty_json |= self.pretty;

        Ok(options)
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let options = cli.options()?;
    let destination = Destination::from_option(cli.destination);
    log::debug!("Converting {:?} to {:?} as {:?}", cli.source, destination, options.format);

    Converter::new(&cli.source, destination, options).run()?;
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}
