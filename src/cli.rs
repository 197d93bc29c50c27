use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "prompe-backend", version)]
pub struct Args {
    /// Optional TOML config file; CLI flags override its values.
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    /// Path to the SQLite gallery database.
    #[arg(long)]
    pub db: Option<String>,

    /// Directory where shared images are stored and served from.
    #[arg(long)]
    pub uploads_dir: Option<String>,

    #[arg(long, default_value_t = false)]
    pub debug: bool,
}
