//! Loads `json/projects.json` and `json/certificates.json` from the directory
//! given as the first argument and prints the rendered page.
//!
//! cargo run --example render_static -- ./site

use portfolio_cards::output;
use portfolio_cards::page::StaticPage;
use portfolio_cards::runner::{PortfolioConfig, Runner, SourceConfig};
use portfolio_cards::source::Endpoints;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());
    let config = PortfolioConfig {
        source: SourceConfig::Static {
            base,
            endpoints: Endpoints::static_defaults(),
        },
        ..PortfolioConfig::default()
    };
    let selectors = config.selectors.clone();

    let mut page = StaticPage::portfolio(&selectors);
    let report = Runner::new(config)?.run(&mut page).await?;
    for (collection, state) in &report.states {
        eprintln!("{collection}: {}", state.label());
    }

    let html = output::render_html(&page, &selectors, "Portfolio");
    print!("{}", String::from_utf8_lossy(&html));
    Ok(())
}
