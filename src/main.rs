use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cfg = backdrop::config::Config::parse();
    backdrop::app::run(cfg)
}
