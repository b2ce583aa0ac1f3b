use serde_json::json;

use crate::filter::{Arranger, ClassFilterLayout, FilterPredicate};
use crate::model::Collection;
use crate::page::{Document, FilterButton, Selectors, StaticPage};
use crate::runner::{CollectionState, ErrorKind, PortfolioConfig, Runner, SourceConfig};
use crate::source::{Endpoints, InlineSource};

#[derive(Debug, Default)]
struct RecordingArranger {
    calls: Vec<FilterPredicate>,
}

impl Arranger for RecordingArranger {
    fn arrange(&mut self, filter: &FilterPredicate) {
        self.calls.push(filter.clone());
    }
}

fn runner() -> Runner {
    Runner::new(PortfolioConfig::default()).unwrap()
}

fn page_with_buttons() -> StaticPage {
    let selectors = Selectors::default();
    let mut all = FilterButton::new("All", "*");
    all.active = true;
    let mut page = StaticPage::portfolio(&selectors);
    page.set_filter_group(
        &selectors.filter_buttons,
        vec![all, FilterButton::new("X", ".x")],
    );
    page
}

fn projects_payload() -> serde_json::Value {
    json!({
        "projects": [
            {"title": "A", "image": "a.png", "category": "x"},
            {"title": "B", "image": "b.png"}
        ]
    })
}

fn certificates_payload() -> serde_json::Value {
    json!([{"title": "AWS", "image": "aws.png"}])
}

fn active_labels(page: &StaticPage) -> Vec<String> {
    page.filter_buttons(".portfolio-filter li")
        .unwrap()
        .iter()
        .filter(|b| b.active)
        .map(|b| b.label.clone())
        .collect()
}

#[tokio::test]
async fn clicking_a_category_shows_only_its_cards() {
    let source = InlineSource::new()
        .with(Collection::Projects, projects_payload())
        .with(Collection::Certificates, certificates_payload());
    let mut page = page_with_buttons();

    let report = runner()
        .load(&mut page, &source, ClassFilterLayout::from_grid::<StaticPage>)
        .await;
    assert_eq!(report.state(Collection::Projects), &CollectionState::Rendered { cards: 2 });
    assert_eq!(
        report.state(Collection::Certificates),
        &CollectionState::Rendered { cards: 1 }
    );

    let html = page.inner_html("#projects-container").unwrap();
    assert!(html.find("<h4>A</h4>").unwrap() < html.find("<h4>B</h4>").unwrap());
    assert!(html.contains(r#"data-category="x""#));
    assert!(html.contains(r#"data-category="all""#));

    let mut filters = report.filters.unwrap();
    assert_eq!(filters.arranger().visible(), &[0, 1]);

    filters.activate_filter(&mut page, ".x").unwrap();
    assert_eq!(filters.arranger().visible(), &[0]);
    assert_eq!(active_labels(&page), vec!["X"]);

    filters.activate(&mut page, 0).unwrap();
    assert_eq!(filters.arranger().visible(), &[0, 1]);
    assert_eq!(active_labels(&page), vec!["All"]);
}

#[tokio::test]
async fn failed_projects_do_not_block_certificates() {
    let source = InlineSource::new().with(Collection::Certificates, certificates_payload());
    let mut page = page_with_buttons();

    let report = runner()
        .load(&mut page, &source, |_: &StaticPage, _: &str| {
            Some(RecordingArranger::default())
        })
        .await;

    assert!(matches!(
        report.state(Collection::Projects),
        CollectionState::Failed {
            kind: ErrorKind::Fetch,
            ..
        }
    ));
    assert!(report.is_rendered(Collection::Certificates));
    assert!(report.filters.is_none());

    let projects = page.inner_html("#projects-container").unwrap();
    assert!(projects.contains("alert-danger"));
    assert!(projects.contains("Failed to load projects"));
    assert!(page
        .inner_html("#certificates-container")
        .unwrap()
        .contains("AWS"));
}

#[tokio::test]
async fn failed_certificates_leave_projects_and_filters_intact() {
    let source = InlineSource::new().with(Collection::Projects, projects_payload());
    let mut page = page_with_buttons();

    let report = runner()
        .load(&mut page, &source, |_: &StaticPage, _: &str| {
            Some(RecordingArranger::default())
        })
        .await;

    assert!(report.is_rendered(Collection::Projects));
    assert!(!report.is_rendered(Collection::Certificates));
    assert!(page
        .inner_html("#certificates-container")
        .unwrap()
        .contains("Failed to load certificates"));

    let mut filters = report.filters.unwrap();
    filters.activate(&mut page, 1).unwrap();
    assert_eq!(
        filters.arranger().calls,
        vec![FilterPredicate::Class("x".to_string())]
    );
}

#[tokio::test]
async fn unexpected_payload_shape_is_reported_in_place() {
    let source = InlineSource::new()
        .with(Collection::Projects, json!({"unexpected": 123}))
        .with(Collection::Certificates, certificates_payload());
    let mut page = page_with_buttons();

    let report = runner()
        .load(&mut page, &source, ClassFilterLayout::from_grid::<StaticPage>)
        .await;

    match report.state(Collection::Projects) {
        CollectionState::Failed { kind, message } => {
            assert_eq!(*kind, ErrorKind::Schema);
            assert_eq!(message, "invalid structure for projects");
        }
        other => panic!("unexpected state {other:?}"),
    }
    let children = page.children("#projects-container").unwrap();
    assert_eq!(children.len(), 1);
    assert!(children[0].html.contains("invalid structure for projects"));
    assert!(report.filters.is_none());
}

#[tokio::test]
async fn empty_collections_render_empty_containers() {
    let source = InlineSource::new()
        .with(Collection::Projects, json!([]))
        .with(Collection::Certificates, json!({"certificados": []}));
    let mut page = page_with_buttons();

    let report = runner()
        .load(&mut page, &source, ClassFilterLayout::from_grid::<StaticPage>)
        .await;

    assert_eq!(report.state(Collection::Projects), &CollectionState::Rendered { cards: 0 });
    assert_eq!(
        report.state(Collection::Certificates),
        &CollectionState::Rendered { cards: 0 }
    );
    assert_eq!(page.inner_html("#projects-container").as_deref(), Some(""));
    assert_eq!(page.inner_html("#certificates-container").as_deref(), Some(""));
}

#[tokio::test]
async fn reloading_replaces_rather_than_appends() {
    let source = InlineSource::new()
        .with(Collection::Projects, projects_payload())
        .with(Collection::Certificates, certificates_payload());
    let runner = runner();
    let mut page = page_with_buttons();

    runner
        .load(&mut page, &source, ClassFilterLayout::from_grid::<StaticPage>)
        .await;
    let first = page.clone();
    runner
        .load(&mut page, &source, ClassFilterLayout::from_grid::<StaticPage>)
        .await;

    assert_eq!(page, first);
    assert_eq!(page.children("#projects-container").unwrap().len(), 2);
}

#[tokio::test]
async fn missing_container_fails_only_that_collection() {
    let source = InlineSource::new()
        .with(Collection::Projects, projects_payload())
        .with(Collection::Certificates, certificates_payload());
    let mut page = StaticPage::new().with_element(&["#projects-container", ".portfolio-grid"]);

    let report = runner()
        .load(&mut page, &source, ClassFilterLayout::from_grid::<StaticPage>)
        .await;

    assert!(report.is_rendered(Collection::Projects));
    assert!(matches!(
        report.state(Collection::Certificates),
        CollectionState::Failed {
            kind: ErrorKind::Render,
            ..
        }
    ));
    assert!(report.filters.is_some());
}

#[tokio::test]
async fn static_backend_loads_from_base_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("json")).unwrap();
    std::fs::write(
        dir.path().join("json/projects.json"),
        r#"{"projetos":[{"titulo":"Site","imagem":"site.png","categoria":"Web Dev","links":[{"texto":"Demo","url":"https://demo"}]}]}"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("json/certificates.json"),
        r#"[{"title":"Rust","image":"rust.png","issuer":"Ferris"}]"#,
    )
    .unwrap();

    let config = PortfolioConfig {
        source: SourceConfig::Static {
            base: dir.path().to_string_lossy().to_string(),
            endpoints: Endpoints::static_defaults(),
        },
        ..PortfolioConfig::default()
    };
    let mut page = StaticPage::portfolio(&config.selectors);
    let report = Runner::new(config).unwrap().run(&mut page).await.unwrap();

    assert!(report.is_rendered(Collection::Projects));
    assert!(report.is_rendered(Collection::Certificates));
    let projects = page.inner_html("#projects-container").unwrap();
    assert!(projects.contains("<h4>Site</h4>"));
    assert!(projects.contains(r#"data-category="web-dev""#));
    assert!(projects.contains("https://demo"));
    assert!(page
        .inner_html("#certificates-container")
        .unwrap()
        .contains("Ferris"));

    let buttons = crate::filter::derive_buttons(&page, ".portfolio-grid", "all");
    let filters: Vec<_> = buttons.iter().filter_map(|b| b.filter.clone()).collect();
    assert_eq!(filters, vec!["*", ".web-dev"]);
}

#[tokio::test]
async fn empty_filter_bar_is_derived_before_attaching() {
    let source = InlineSource::new()
        .with(Collection::Projects, projects_payload())
        .with(Collection::Certificates, certificates_payload());
    let mut page = StaticPage::portfolio(&Selectors::default());

    let report = runner()
        .load(&mut page, &source, ClassFilterLayout::from_grid::<StaticPage>)
        .await;

    let filters: Vec<_> = page
        .filter_buttons(".portfolio-filter li")
        .unwrap()
        .iter()
        .filter_map(|b| b.filter.clone())
        .collect();
    assert_eq!(filters, vec!["*", ".x"]);
    assert_eq!(active_labels(&page), vec!["All"]);

    let mut controller = report.filters.unwrap();
    controller.activate_filter(&mut page, ".x").unwrap();
    assert_eq!(controller.arranger().visible(), &[0]);
    assert_eq!(active_labels(&page), vec!["X"]);
}

#[tokio::test]
async fn configured_filter_bar_is_kept() {
    let source = InlineSource::new()
        .with(Collection::Projects, projects_payload())
        .with(Collection::Certificates, certificates_payload());
    let selectors = Selectors::default();
    let mut page = StaticPage::portfolio(&selectors);
    page.set_filter_group(
        &selectors.filter_buttons,
        vec![FilterButton::new("Only X", ".x")],
    );

    runner()
        .load(&mut page, &source, ClassFilterLayout::from_grid::<StaticPage>)
        .await;

    let buttons = page.filter_buttons(&selectors.filter_buttons).unwrap();
    assert_eq!(buttons.len(), 1);
    assert_eq!(buttons[0].label, "Only X");
}
