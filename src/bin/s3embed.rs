//! s3embed CLI — render signed-link fragments from the command line
//!
//! Usage:
//!   s3embed href <reference> [--title ...]     Print one signed anchor
//!   s3embed dir <reference> [--titles ...]     Print a signed listing
//!   s3embed audio <reference> [--title ...]    Print a signed audio player

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use s3_embed::{EmbedAttrs, Session, Settings};

#[derive(Parser)]
#[command(
    name = "s3embed",
    about = "Render signed S3 links and directory listings as HTML fragments",
    version
)]
struct Cli {
    /// Settings file (JSON); defaults to ~/.config/s3embed/settings.json
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Override the signing region for this invocation
    #[arg(long, global = true)]
    region: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Default)]
struct StyleArgs {
    /// Anchor text / caption (defaults to the filename)
    #[arg(long)]
    title: Option<String>,
    /// `id` attribute for the fragment
    #[arg(long)]
    id: Option<String>,
    /// `class` attribute for the fragment
    #[arg(long)]
    class: Option<String>,
    /// `style` attribute for the fragment
    #[arg(long)]
    style: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a single signed link
    Href {
        /// Reference, e.g. s3://bucket/path/file.pdf
        reference: String,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Render a directory listing of signed links
    Dir {
        /// Reference to list under, e.g. s3://bucket/path
        reference: String,
        /// Filename of a JSON titles object under the listed key
        #[arg(long)]
        titles: Option<String>,
        /// `class` for the wrapping <div>
        #[arg(long)]
        div_class: Option<String>,
        /// `style` for the wrapping <div>
        #[arg(long)]
        div_style: Option<String>,
        /// `class` for the <ul>
        #[arg(long)]
        ul_class: Option<String>,
        /// `class` for each <li>
        #[arg(long)]
        li_class: Option<String>,
        /// `class` for each anchor
        #[arg(long)]
        a_class: Option<String>,
    },
    /// Render an audio player backed by a signed link
    Audio {
        /// Reference, e.g. s3://bucket/path/track.mp3
        reference: String,
        #[command(flatten)]
        style: StyleArgs,
    },
}

fn settings_path(cli: &Cli) -> PathBuf {
    cli.settings.clone().unwrap_or_else(|| {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("s3embed")
            .join("settings.json")
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(&settings_path(&cli));
    let base_dir = std::env::current_dir()?;
    let session = Session::new(settings, base_dir);

    let fragment = match &cli.command {
        Commands::Href { reference, style } => {
            let attrs = EmbedAttrs {
                title: style.title.clone(),
                id: style.id.clone(),
                class: style.class.clone(),
                style: style.style.clone(),
                region: cli.region.clone(),
                ..Default::default()
            };
            session.render_href(reference, &attrs).await
        }
        Commands::Dir {
            reference,
            titles,
            div_class,
            div_style,
            ul_class,
            li_class,
            a_class,
        } => {
            let attrs = EmbedAttrs {
                titles: titles.clone(),
                div_class: div_class.clone(),
                div_style: div_style.clone(),
                ul_class: ul_class.clone(),
                li_class: li_class.clone(),
                a_class: a_class.clone(),
                region: cli.region.clone(),
                ..Default::default()
            };
            session.render_dir(reference, &attrs).await
        }
        Commands::Audio { reference, style } => {
            let attrs = EmbedAttrs {
                title: style.title.clone(),
                id: style.id.clone(),
                class: style.class.clone(),
                style: style.style.clone(),
                region: cli.region.clone(),
                ..Default::default()
            };
            session.render_audio(reference, &attrs).await
        }
    };

    println!("{}", fragment);
    Ok(())
}
