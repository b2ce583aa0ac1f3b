use crate::model::Collection;
use crate::page::{Document, Element, FilterButton, Selectors, StaticPage};
use crate::utils::escape_html;

const BOOTSTRAP_CSS: &str = "https://cdn.jsdelivr.net/npm/bootstrap@4.6.2/dist/css/bootstrap.min.css";
const FONT_AWESOME_CSS: &str =
    "https://cdn.jsdelivr.net/npm/font-awesome@4.7.0/css/font-awesome.min.css";
const ISOTOPE_JS: &str = "https://unpkg.com/isotope-layout@3/dist/isotope.pkgd.min.js";

fn json_for_script_tag(value: &str) -> String {
    value.replace("</", "<\\/")
}

fn js_string(value: &str) -> String {
    let json = serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string());
    json_for_script_tag(&json)
}

/// Markup for the filter bar: `.bar li` and `#bar li` map onto
/// `<ul class|id="bar"><li>`. Anything else falls back to the stock
/// `.portfolio-filter li` and the script is pointed at that instead.
struct FilterBar {
    container_attr: String,
    item_tag: String,
    script_selector: String,
}

impl FilterBar {
    fn from_selector(selector: &str) -> Self {
        let parts: Vec<&str> = selector.split_whitespace().collect();
        if let [container, item] = parts.as_slice() {
            let is_tag = !item.is_empty() && item.chars().all(|c| c.is_ascii_alphabetic());
            let attr = if let Some(class) = container.strip_prefix('.') {
                Some(format!(r#"class="{}""#, escape_html(class)))
            } else {
                container
                    .strip_prefix('#')
                    .map(|id| format!(r#"id="{}""#, escape_html(id)))
            };
            if let (Some(container_attr), true) = (attr, is_tag) {
                return Self {
                    container_attr,
                    item_tag: item.to_lowercase(),
                    script_selector: selector.trim().to_string(),
                };
            }
        }
        Self {
            container_attr: r#"class="portfolio-filter""#.to_string(),
            item_tag: "li".to_string(),
            script_selector: ".portfolio-filter li".to_string(),
        }
    }

    fn render(&self, buttons: &[FilterButton]) -> String {
        if buttons.is_empty() {
            return String::new();
        }
        let items: String = buttons
            .iter()
            .map(|b| {
                let filter = b
                    .filter
                    .as_deref()
                    .map(|f| format!(r#" data-filter="{}""#, escape_html(f)))
                    .unwrap_or_default();
                let active = if b.active { r#" class="active""# } else { "" };
                format!(
                    "\n        <{tag}{active}{filter}>{label}</{tag}>",
                    tag = self.item_tag,
                    label = escape_html(&b.label),
                )
            })
            .collect();
        format!(
            "\n      <ul {attr}>{items}\n      </ul>",
            attr = self.container_attr,
        )
    }
}

fn element_attrs(element: &Element) -> String {
    let mut classes = vec!["row".to_string()];
    for class in &element.classes {
        if !classes.contains(class) {
            classes.push(class.clone());
        }
    }
    let id = element
        .id
        .as_deref()
        .map(|id| format!(r#"id="{}" "#, escape_html(id)))
        .unwrap_or_default();
    format!(r#"{id}class="{}""#, escape_html(&classes.join(" ")))
}

fn section_heading(element: &Element, selectors: &Selectors) -> Option<&'static str> {
    Collection::ALL
        .into_iter()
        .find(|c| element.matches(selectors.container(*c)))
        .map(|c| match c {
            Collection::Projects => "Projects",
            Collection::Certificates => "Certificates",
        })
}

pub fn render_html(page: &StaticPage, selectors: &Selectors, title: &str) -> Vec<u8> {
    let bar = FilterBar::from_selector(&selectors.filter_buttons);
    let buttons = page.filter_buttons(&selectors.filter_buttons).unwrap_or(&[]);
    let filter_bar = bar.render(buttons);

    let sections: String = page
        .elements()
        .iter()
        .map(|element| {
            let heading = section_heading(element, selectors)
                .map(|h| format!("\n    <h2 class=\"mt-5 mb-4\">{h}</h2>"))
                .unwrap_or_default();
            let filters = if element.matches(&selectors.grid) {
                filter_bar.as_str()
            } else {
                ""
            };
            format!(
                "\n  <section class=\"container\">{heading}{filters}\n    <div {attrs}>\n{inner}    </div>\n  </section>",
                attrs = element_attrs(element),
                inner = element.inner_html(),
            )
        })
        .collect();

    let grid = js_string(&selectors.grid);
    let buttons_selector = js_string(&bar.script_selector);
    let title = escape_html(title);

    let html = format!(
        r####"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>{title}</title>
  <link href="{BOOTSTRAP_CSS}" rel="stylesheet"/>
  <link href="{FONT_AWESOME_CSS}" rel="stylesheet"/>
  <style>
    .portfolio-filter {{ list-style: none; padding: 0; margin-bottom: 2rem; text-align: center; }}
    .portfolio-filter li {{ display: inline-block; margin: 0 .5rem; padding: .25rem .75rem; cursor: pointer; border-radius: 4px; }}
    .portfolio-filter li.active {{ background: #007bff; color: #fff; }}
    .portfolio_box {{ margin-bottom: 30px; }}
    .single_portfolio {{ position: relative; overflow: hidden; }}
    .single_portfolio .overlay, .single_portfolio .img-gal {{ display: none; }}
    .link-container {{ margin-top: .25rem; }}
  </style>
</head>
<body>
  <header class="container py-4">
    <h1>{title}</h1>
  </header>
{sections}

  <script src="{ISOTOPE_JS}"></script>
  <script>
    (function () {{
      var grid = document.querySelector({grid});
      if (!grid || typeof Isotope === "undefined") {{
        return;
      }}
      var iso = new Isotope(grid, {{ itemSelector: "[data-category]", layoutMode: "fitRows" }});
      var buttons = document.querySelectorAll({buttons_selector});
      buttons.forEach(function (button) {{
        button.addEventListener("click", function () {{
          buttons.forEach(function (b) {{ b.classList.remove("active"); }});
          button.classList.add("active");
          iso.arrange({{ filter: button.getAttribute("data-filter") || "*" }});
        }});
      }});
      window.addEventListener("load", function () {{ iso.layout(); }});
    }})();
  </script>
</body>
</html>
"####
    );
    html.into_bytes()
}
