//! Renders an inline portfolio and walks through the filter bar.
//!
//! cargo run --example filter_grid

use portfolio_cards::filter::ClassFilterLayout;
use portfolio_cards::model::Collection;
use portfolio_cards::page::{Document, StaticPage};
use portfolio_cards::runner::{PortfolioConfig, Runner};
use portfolio_cards::source::InlineSource;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let source = InlineSource::new()
        .with(
            Collection::Projects,
            json!([
                {"title": "Storefront", "image": "shop.png", "category": "web"},
                {"title": "Tracker", "image": "tracker.png", "category": "mobile"},
                {"title": "Blog", "image": "blog.png", "category": "web"},
                {"title": "Notes", "image": "notes.png"}
            ]),
        )
        .with(
            Collection::Certificates,
            json!([{"title": "Cloud Practitioner", "image": "cloud.png", "issuer": "AWS"}]),
        );

    let runner = Runner::new(PortfolioConfig::default())?;
    let selectors = runner.config().selectors.clone();
    let mut page = StaticPage::portfolio(&selectors);

    let report = runner
        .load(&mut page, &source, ClassFilterLayout::from_grid::<StaticPage>)
        .await;
    let Some(mut filters) = report.filters else {
        return Ok(());
    };

    let count = page
        .filter_buttons(&selectors.filter_buttons)
        .map(|b| b.len())
        .unwrap_or(0);
    for index in 0..count {
        if let Some(predicate) = filters.activate(&mut page, index) {
            println!(
                "{:<8} -> cards {:?}",
                predicate.as_selector(),
                filters.arranger().visible()
            );
        }
    }
    Ok(())
}
