use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use art_prompt::export::{ExportOutcome, Exporter, FileDownloader, PixmapRasterizer};
use art_prompt::rendering::Preview;
use art_prompt::state::{FieldEdit, FormState, FormStore};
use art_prompt::theme::{registry, ThemeId};
use art_prompt::{AspectRatio, GeneratorConfig, CARD_WIDTH_WIDE};

#[derive(Parser)]
#[command(name = "art-prompt", version, about = "Render art prompt cards to PNG")]
struct Cli {
    /// JSON file with generator settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export the card as a PNG
    Render {
        #[command(flatten)]
        fields: Fields,
        /// Directory the image is written to
        #[arg(long, default_value = ".")]
        out: PathBuf,
        #[arg(long)]
        pixel_ratio: Option<f32>,
    },
    /// Print the card as text
    Preview {
        #[command(flatten)]
        fields: Fields,
    },
    /// List the available themes
    Themes,
}

#[derive(Args)]
struct Fields {
    #[arg(long)]
    number: Option<String>,
    /// Hashtag without '#'; derived from the number when omitted
    #[arg(long)]
    hashtag: Option<String>,
    /// Title; use \n for line breaks
    #[arg(long)]
    title: Option<String>,
    /// Show the body and quote blocks
    #[arg(long)]
    full_page: bool,
    #[arg(long)]
    body: Option<String>,
    #[arg(long)]
    quote: Option<String>,
    #[arg(long)]
    author: Option<String>,
    #[arg(long, default_value = "classic")]
    theme: String,
    #[arg(long, default_value = "square")]
    aspect: String,
    /// Use the 600px card instead of 480px
    #[arg(long)]
    wide: bool,
}

impl Fields {
    fn edits(&self) -> anyhow::Result<Vec<FieldEdit>> {
        let mut edits = Vec::new();
        if let Some(n) = &self.number {
            edits.push(FieldEdit::Number(n.clone()));
        }
        if let Some(h) = &self.hashtag {
            edits.push(FieldEdit::Hashtag(h.clone()));
        }
        if let Some(t) = &self.title {
            edits.push(FieldEdit::Title(t.clone()));
        }
        if let Some(b) = &self.body {
            edits.push(FieldEdit::Body(b.clone()));
        }
        if let Some(q) = &self.quote {
            edits.push(FieldEdit::Quote(q.clone()));
        }
        if let Some(a) = &self.author {
            edits.push(FieldEdit::Author(a.clone()));
        }
        edits.push(FieldEdit::SimplePage(self.full_page));
        edits.push(FieldEdit::Theme(self.theme.parse::<ThemeId>()?));
        edits.push(FieldEdit::AspectRatio(self.aspect.parse::<AspectRatio>()?));
        Ok(edits)
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<GeneratorConfig> {
    match path {
        Some(p) => GeneratorConfig::from_json_file(p)
            .with_context(|| format!("loading config from {}", p.display())),
        None => Ok(GeneratorConfig::default()),
    }
}

fn build(config: &GeneratorConfig, fields: &Fields) -> anyhow::Result<(FormStore, Preview)> {
    let mut store = FormStore::new(FormState::with_config(config));
    let preview = Preview::new(config);
    preview.mount(&mut store);
    store.apply_all(fields.edits()?);
    Ok((store, preview))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Themes => {
            for theme in registry().iter() {
                println!(
                    "{:<10} {:<10} bg={} text={} border={}",
                    theme.id,
                    theme.name,
                    theme.background.to_hex(),
                    theme.text.to_hex(),
                    theme.border.to_hex()
                );
            }
        }
        Command::Preview { fields } => {
            if fields.wide {
                config.card_width = CARD_WIDTH_WIDE;
            }
            let (_store, preview) = build(&config, &fields)?;
            if let Some(root) = preview.handle().current() {
                print!("{}", root.text_snapshot());
            }
        }
        Command::Render { fields, out, pixel_ratio } => {
            if fields.wide {
                config.card_width = CARD_WIDTH_WIDE;
            }
            if let Some(ratio) = pixel_ratio {
                config.pixel_ratio = ratio;
            }
            config.validate()?;
            let (_store, preview) = build(&config, &fields)?;
            let exporter = Exporter::new(
                preview.handle(),
                PixmapRasterizer::new(),
                FileDownloader::new(&out),
                &config,
            );
            // Export failures are logged by the exporter, not reported here.
            if let ExportOutcome::Delivered { filename } = exporter.trigger().wait().await {
                let path = out.join(filename);
                if path.exists() {
                    println!("{}", path.display());
                }
            }
        }
    }
    Ok(())
}
