use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Collection, Record};
use crate::page::{Document, Fragment};
use crate::utils::{class_token, escape_html, split_class_list};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("{collection} container not found: {selector}")]
    MissingContainer {
        collection: Collection,
        selector: String,
    },
}

/// Static markup settings shared by every render pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub project_item_classes: String,
    pub certificate_item_classes: String,
    pub project_image_height: String,
    pub certificate_image_height: String,
    pub default_category: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            project_item_classes: "col-lg-4 col-md-6 all".to_string(),
            certificate_item_classes: "col-lg-3 col-md-4 col-sm-6 mb-4".to_string(),
            project_image_height: "250px".to_string(),
            certificate_image_height: "200px".to_string(),
            default_category: "all".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct CardRenderer {
    options: RenderOptions,
}

impl CardRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Replaces the container's contents with one card per record and
    /// returns the number of cards written.
    pub fn render<D>(
        &self,
        doc: &mut D,
        selector: &str,
        collection: Collection,
        records: &[Record],
    ) -> Result<usize, RenderError>
    where
        D: Document + ?Sized,
    {
        let missing = || RenderError::MissingContainer {
            collection,
            selector: selector.to_string(),
        };
        if !doc.exists(selector) {
            return Err(missing());
        }
        let cards = self.cards(collection, records);
        let count = cards.len();
        if !doc.replace_children(selector, cards) {
            return Err(missing());
        }
        Ok(count)
    }

    pub fn cards(&self, collection: Collection, records: &[Record]) -> Vec<Fragment> {
        records
            .iter()
            .map(|record| match collection {
                Collection::Projects => self.project_card(record),
                Collection::Certificates => self.certificate_card(record),
            })
            .collect()
    }

    /// Class token a project card is filed under.
    pub fn category_of(&self, record: &Record) -> String {
        record
            .category
            .as_deref()
            .and_then(class_token)
            .or_else(|| class_token(&self.options.default_category))
            .unwrap_or_else(|| "all".to_string())
    }

    pub fn project_card(&self, record: &Record) -> Fragment {
        let category = self.category_of(record);
        let mut classes = split_class_list(&self.options.project_item_classes);
        if !classes.iter().any(|c| c == &category) {
            classes.push(category.clone());
        }

        let image = escape_html(&record.image);
        let title = escape_html(&record.title);
        let description = escape_html(record.description.as_deref().unwrap_or(""));
        let links: String = record
            .links
            .iter()
            .map(|link| {
                format!(
                    r#"
      <div class="link-container">
        <a href="{url}" target="_blank" rel="noopener noreferrer" class="btn-link"><i class="fa fa-external-link mr-2"></i>{text}</a>
      </div>"#,
                    url = escape_html(&link.url),
                    text = escape_html(&link.text),
                )
            })
            .collect();

        let html = format!(
            r#"<div class="{classes}" data-category="{category}">
  <div class="portfolio_box">
    <div class="single_portfolio">
      <img class="img-fluid w-100" src="{image}" alt="{title}" loading="lazy" style="height: {height}; object-fit: cover;" onerror="this.style.display='none'">
      <div class="overlay"></div>
      <a href="{image}" class="img-gal"><div class="icon"><span class="lnr lnr-cross"></span></div></a>
    </div>
    <div class="short_info">
      <h4>{title}</h4>
      <p class="text-muted">{description}</p>{links}
    </div>
  </div>
</div>
"#,
            classes = escape_html(&classes.join(" ")),
            category = escape_html(&category),
            height = escape_html(&self.options.project_image_height),
        );
        Fragment::new(classes, html).with_category(&category)
    }

    pub fn certificate_card(&self, record: &Record) -> Fragment {
        let classes = split_class_list(&self.options.certificate_item_classes);
        let issuer = record
            .issuer
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| format!("\n      <p class=\"card-text text-muted mb-0\">{}</p>", escape_html(s)))
            .unwrap_or_default();
        let credential = record
            .credential_url
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                format!(
                    "\n      <a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"btn-link\">View credential</a>",
                    escape_html(s)
                )
            })
            .unwrap_or_default();

        let html = format!(
            r#"<div class="{classes}">
  <div class="card h-100 shadow-sm border-0">
    <img src="{image}" class="card-img-top" alt="{title}" loading="lazy" style="height: {height}; object-fit: cover; border-radius: 10px 10px 0 0;" onerror="this.style.display='none'">
    <div class="card-body text-center">
      <h5 class="card-title font-weight-bold mb-0">{title}</h5>{issuer}{credential}
    </div>
  </div>
</div>
"#,
            classes = escape_html(&classes.join(" ")),
            image = escape_html(&record.image),
            title = escape_html(&record.title),
            height = escape_html(&self.options.certificate_image_height),
        );
        Fragment::new(classes, html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Link;
    use crate::page::StaticPage;

    fn project(title: &str, image: &str, category: Option<&str>) -> Record {
        Record {
            title: title.to_string(),
            image: image.to_string(),
            category: category.map(|c| c.to_string()),
            ..Record::default()
        }
    }

    #[test]
    fn project_cards_carry_category_class() {
        let renderer = CardRenderer::default();
        let records = vec![project("A", "a.png", Some("x")), project("B", "b.png", None)];
        let cards = renderer.cards(Collection::Projects, &records);
        assert_eq!(cards.len(), 2);
        assert!(cards[0].has_class("x"));
        assert_eq!(cards[0].category.as_deref(), Some("x"));
        assert_eq!(cards[1].category.as_deref(), Some("all"));
        assert!(cards[0].html.contains(r#"data-category="x""#));
        assert!(cards[0].html.contains("<h4>A</h4>"));
        assert!(!cards[1].has_class("x"));
        assert!(cards[1].has_class("all"));
        assert!(cards[1].html.contains(r#"data-category="all""#));
        assert!(cards[1].html.contains("<h4>B</h4>"));
    }

    #[test]
    fn links_render_in_given_order() {
        let record = Record {
            links: vec![
                Link {
                    text: "Demo".into(),
                    url: "https://demo".into(),
                },
                Link {
                    text: "Code".into(),
                    url: "https://code".into(),
                },
            ],
            ..project("A", "a.png", None)
        };
        let html = CardRenderer::default().project_card(&record).html;
        let demo = html.find("https://demo").unwrap();
        let code = html.find("https://code").unwrap();
        assert!(demo < code);
        assert_eq!(html.matches("link-container").count(), 2);
    }

    #[test]
    fn image_is_lazy_and_hides_on_error() {
        let html = CardRenderer::default()
            .project_card(&project("A", "a.png", None))
            .html;
        assert!(html.contains(r#"loading="lazy""#));
        assert!(html.contains("onerror=\"this.style.display='none'\""));
        assert!(html.contains("height: 250px"));
    }

    #[test]
    fn values_are_escaped() {
        let html = CardRenderer::default()
            .project_card(&project("<script>", "a\".png", Some("Web Dev")))
            .html;
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("a&quot;.png"));
        assert!(html.contains(r#"data-category="web-dev""#));
    }

    #[test]
    fn certificate_card_shows_optional_issuer_and_credential() {
        let renderer = CardRenderer::default();
        let plain = renderer.certificate_card(&project("AWS", "aws.png", None)).html;
        assert!(!plain.contains("View credential"));
        assert!(plain.contains("height: 200px"));

        let record = Record {
            issuer: Some("Amazon".into()),
            credential_url: Some("https://cred".into()),
            ..project("AWS", "aws.png", None)
        };
        let full = renderer.certificate_card(&record).html;
        assert!(full.contains("Amazon"));
        assert!(full.contains(r#"href="https://cred""#));
    }

    #[test]
    fn render_replaces_and_is_idempotent() {
        let renderer = CardRenderer::default();
        let mut page = StaticPage::new().with_element(&["#projects-container"]);
        let records = vec![project("A", "a.png", Some("x")), project("B", "b.png", None)];

        let n = renderer
            .render(&mut page, "#projects-container", Collection::Projects, &records)
            .unwrap();
        assert_eq!(n, 2);
        let first = page.inner_html("#projects-container").unwrap();
        renderer
            .render(&mut page, "#projects-container", Collection::Projects, &records)
            .unwrap();
        assert_eq!(page.inner_html("#projects-container").unwrap(), first);
        assert_eq!(page.children("#projects-container").unwrap().len(), 2);
    }

    #[test]
    fn render_empty_yields_empty_container() {
        let renderer = CardRenderer::default();
        let mut page = StaticPage::new().with_element(&["#certificates-container"]);
        let n = renderer
            .render(&mut page, "#certificates-container", Collection::Certificates, &[])
            .unwrap();
        assert_eq!(n, 0);
        assert_eq!(page.inner_html("#certificates-container").as_deref(), Some(""));
    }

    #[test]
    fn render_missing_container_is_error() {
        let renderer = CardRenderer::default();
        let mut page = StaticPage::new();
        let err = renderer
            .render(&mut page, "#projects-container", Collection::Projects, &[])
            .unwrap_err();
        assert_eq!(
            err,
            RenderError::MissingContainer {
                collection: Collection::Projects,
                selector: "#projects-container".to_string(),
            }
        );
    }
}
