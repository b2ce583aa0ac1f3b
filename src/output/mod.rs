pub mod report;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::Collection;
use crate::page::{Document, Fragment, Selectors, StaticPage};
use crate::runner::{CollectionState, LoadReport};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Html,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "html" | "htm" => Some(Self::Html),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    None
}

#[derive(Clone, Debug, Serialize)]
pub struct CardRecord<'a> {
    pub classes: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<&'a str>,
    pub html: &'a str,
}

impl<'a> From<&'a Fragment> for CardRecord<'a> {
    fn from(fragment: &'a Fragment) -> Self {
        Self {
            classes: &fragment.classes,
            category: fragment.category.as_deref(),
            html: &fragment.html,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CollectionRecord<'a> {
    #[serde(flatten)]
    pub state: &'a CollectionState,
    pub cards: Vec<CardRecord<'a>>,
    pub html: String,
}

/// Per collection: the final state, the rendered children and their
/// concatenated markup.
pub fn build_records<'a, A>(
    page: &'a StaticPage,
    selectors: &Selectors,
    report: &'a LoadReport<A>,
) -> BTreeMap<Collection, CollectionRecord<'a>> {
    Collection::ALL
        .into_iter()
        .map(|collection| {
            let selector = match report.state(collection) {
                CollectionState::Failed { .. } => selectors.error_target(collection),
                _ => selectors.container(collection),
            };
            let children = page.children(selector).unwrap_or(&[]);
            let record = CollectionRecord {
                state: report.state(collection),
                cards: children.iter().map(CardRecord::from).collect(),
                html: page.inner_html(selector).unwrap_or_default(),
            };
            (collection, record)
        })
        .collect()
}

pub fn render_json<A>(page: &StaticPage, selectors: &Selectors, report: &LoadReport<A>) -> Vec<u8> {
    let records = build_records(page, selectors, report);
    let mut out = serde_json::to_vec_pretty(&records).unwrap_or_else(|_| b"{}".to_vec());
    out.push(b'\n');
    out
}

pub fn render_html(page: &StaticPage, selectors: &Selectors, title: &str) -> Vec<u8> {
    report::render_html(page, selectors, title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ClassFilterLayout;
    use crate::runner::ErrorKind;
    use std::time::Duration;
    use tokio::time::Instant;

    fn load_report(states: [(Collection, CollectionState); 2]) -> LoadReport<ClassFilterLayout> {
        LoadReport {
            started_at: Instant::now(),
            elapsed: Duration::from_millis(3),
            states: states.into_iter().collect(),
            filters: None,
        }
    }

    #[test]
    fn format_parsing_and_inference() {
        assert_eq!(OutputFormat::parse(" HTML "), Some(OutputFormat::Html));
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("xml"), None);
        assert_eq!(infer_format_from_path("out/site.htm"), Some(OutputFormat::Html));
        assert_eq!(infer_format_from_path("cards.JSON"), Some(OutputFormat::Json));
        assert_eq!(infer_format_from_path("cards.txt"), None);
    }

    #[test]
    fn json_lists_state_and_cards_per_collection() {
        let selectors = Selectors::default();
        let mut page = StaticPage::portfolio(&selectors);
        page.replace_children(
            "#projects-container",
            vec![Fragment::new(vec!["all".into(), "x".into()], "<div>A</div>".into()).with_category("x")],
        );
        page.replace_children(
            "#certificates-container",
            vec![Fragment::new(vec![], "<div>boom</div>".into())],
        );
        let report = load_report([
            (Collection::Projects, CollectionState::Rendered { cards: 1 }),
            (
                Collection::Certificates,
                CollectionState::Failed {
                    kind: ErrorKind::Fetch,
                    message: "boom".into(),
                },
            ),
        ]);

        let value: serde_json::Value =
            serde_json::from_slice(&render_json(&page, &selectors, &report)).unwrap();
        assert_eq!(value["projects"]["state"], "rendered");
        assert_eq!(value["projects"]["cards"][0]["category"], "x");
        assert_eq!(value["projects"]["html"], "<div>A</div>");
        assert_eq!(value["certificates"]["state"], "failed");
        assert_eq!(value["certificates"]["kind"], "fetch");
        assert_eq!(value["certificates"]["html"], "<div>boom</div>");
    }
}
