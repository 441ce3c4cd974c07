use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;

/// Serve painting ideas, guides, critiques and color palettes over HTTP.
#[derive(Parser, Debug)]
#[command(name = "artmuse", version, about)]
pub struct Args {
    /// Address to listen on
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8000)]
    pub port: u16,

    /// Directory uploaded images are stored in and served from
    #[arg(long, default_value = "static/uploads")]
    pub uploads_dir: PathBuf,

    /// Number of colors in every palette
    #[arg(short = 'k', long = "colors", default_value_t = 5, value_parser = clap::value_parser!(u8).range(1..=32))]
    pub colors: u8,

    /// JSON file with idea/guide/critique templates and preset palettes
    /// (built-in catalog if omitted)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Seed every request's random source with this value
    #[arg(long)]
    pub seed: Option<u64>,

    /// Largest accepted request body, in MiB
    #[arg(long, default_value_t = 16)]
    pub max_upload_mb: usize,
}

impl Args {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn palette_size(&self) -> usize {
        usize::from(self.colors)
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}
