use serde::{Deserialize, Serialize};

use crate::model::Collection;

/// Where each part of the portfolio lives on the page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selectors {
    pub projects: String,
    pub certificates: String,
    pub grid: String,
    pub filter_buttons: String,
    pub projects_error: Option<String>,
    pub certificates_error: Option<String>,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            projects: "#projects-container".to_string(),
            certificates: "#certificates-container".to_string(),
            grid: ".portfolio-grid".to_string(),
            filter_buttons: ".portfolio-filter li".to_string(),
            projects_error: None,
            certificates_error: None,
        }
    }
}

impl Selectors {
    pub fn container(&self, collection: Collection) -> &str {
        match collection {
            Collection::Projects => &self.projects,
            Collection::Certificates => &self.certificates,
        }
    }

    /// Error notices go to the dedicated output when one is configured,
    /// otherwise into the collection's own container.
    pub fn error_target(&self, collection: Collection) -> &str {
        let dedicated = match collection {
            Collection::Projects => self.projects_error.as_deref(),
            Collection::Certificates => self.certificates_error.as_deref(),
        };
        dedicated
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| self.container(collection))
    }
}

/// A rendered child of a container: one card or one notice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Fragment {
    pub classes: Vec<String>,
    /// Filter category of a card; notices have none.
    pub category: Option<String>,
    pub html: String,
}

impl Fragment {
    pub fn new(classes: Vec<String>, html: String) -> Self {
        Self {
            classes,
            category: None,
            html,
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FilterButton {
    pub label: String,
    /// Value of the button's `data-filter` attribute.
    pub filter: Option<String>,
    pub active: bool,
}

impl FilterButton {
    pub fn new(label: &str, filter: &str) -> Self {
        Self {
            label: label.to_string(),
            filter: Some(filter.to_string()),
            active: false,
        }
    }
}

/// The slice of the DOM the pipeline touches. Selectors are simple:
/// `#id`, `.class`, or an exact string registered on the element.
pub trait Document {
    fn exists(&self, selector: &str) -> bool;

    fn children(&self, selector: &str) -> Option<&[Fragment]>;

    /// Replaces every child of the first matching element. Returns `false`
    /// when nothing matches.
    fn replace_children(&mut self, selector: &str, children: Vec<Fragment>) -> bool;

    fn filter_buttons(&self, selector: &str) -> Option<&[FilterButton]>;

    fn filter_buttons_mut(&mut self, selector: &str) -> Option<&mut [FilterButton]>;

    /// Replaces the whole button group, creating it if needed.
    fn replace_filter_buttons(&mut self, selector: &str, buttons: Vec<FilterButton>);

    fn inner_html(&self, selector: &str) -> Option<String> {
        self.children(selector)
            .map(|children| children.iter().map(|f| f.html.as_str()).collect())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Element {
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub aliases: Vec<String>,
    pub children: Vec<Fragment>,
}

impl Element {
    /// Makes the element answer to `selector` as well.
    pub fn add_selector(&mut self, selector: &str) {
        let selector = selector.trim();
        if let Some(id) = simple_token(selector, '#') {
            if self.id.is_none() {
                self.id = Some(id.to_string());
                return;
            }
        } else if let Some(class) = simple_token(selector, '.') {
            if !self.classes.iter().any(|c| c == class) {
                self.classes.push(class.to_string());
            }
            return;
        }
        if !self.aliases.iter().any(|a| a == selector) {
            self.aliases.push(selector.to_string());
        }
    }

    pub fn matches(&self, selector: &str) -> bool {
        let selector = selector.trim();
        if let Some(id) = simple_token(selector, '#') {
            if self.id.as_deref() == Some(id) {
                return true;
            }
        }
        if let Some(class) = simple_token(selector, '.') {
            if self.classes.iter().any(|c| c == class) {
                return true;
            }
        }
        self.aliases.iter().any(|a| a == selector)
    }

    pub fn inner_html(&self) -> String {
        self.children.iter().map(|f| f.html.as_str()).collect()
    }
}

fn simple_token(selector: &str, prefix: char) -> Option<&str> {
    let rest = selector.strip_prefix(prefix)?;
    let is_simple = !rest.is_empty()
        && rest
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    is_simple.then_some(rest)
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ButtonGroup {
    pub selector: String,
    pub buttons: Vec<FilterButton>,
}

/// An in-memory page: a flat list of addressable elements plus filter
/// button groups.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StaticPage {
    elements: Vec<Element>,
    groups: Vec<ButtonGroup>,
}

impl StaticPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// The portfolio skeleton: the projects container doubling as the
    /// filter grid, the certificates container, any dedicated error
    /// outputs and an empty filter bar.
    pub fn portfolio(selectors: &Selectors) -> Self {
        let mut page = Self::new();
        page.ensure_element(&[selectors.projects.as_str(), selectors.grid.as_str()]);
        page.ensure_element(&[selectors.certificates.as_str()]);
        for collection in Collection::ALL {
            let target = selectors.error_target(collection);
            if target != selectors.container(collection) {
                page.ensure_element(&[target]);
            }
        }
        page.set_filter_group(&selectors.filter_buttons, Vec::new());
        page
    }

    /// Registers `selectors` on one element, reusing an element that
    /// already answers to any of them.
    pub fn ensure_element(&mut self, selectors: &[&str]) -> &mut Element {
        let existing = self
            .elements
            .iter()
            .position(|e| selectors.iter().any(|s| e.matches(s)));
        let idx = match existing {
            Some(idx) => idx,
            None => {
                self.elements.push(Element::default());
                self.elements.len() - 1
            }
        };
        let element = &mut self.elements[idx];
        for selector in selectors {
            if !element.matches(selector) {
                element.add_selector(selector);
            }
        }
        element
    }

    pub fn with_element(mut self, selectors: &[&str]) -> Self {
        self.ensure_element(selectors);
        self
    }

    pub fn set_filter_group(&mut self, selector: &str, buttons: Vec<FilterButton>) {
        let selector = selector.trim();
        match self.groups.iter_mut().find(|g| g.selector == selector) {
            Some(group) => group.buttons = buttons,
            None => self.groups.push(ButtonGroup {
                selector: selector.to_string(),
                buttons,
            }),
        }
    }

    pub fn with_filter_group(mut self, selector: &str, buttons: Vec<FilterButton>) -> Self {
        self.set_filter_group(selector, buttons);
        self
    }

    pub fn element(&self, selector: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.matches(selector))
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn groups(&self) -> &[ButtonGroup] {
        &self.groups
    }
}

impl Document for StaticPage {
    fn exists(&self, selector: &str) -> bool {
        self.element(selector).is_some()
    }

    fn children(&self, selector: &str) -> Option<&[Fragment]> {
        self.element(selector).map(|e| e.children.as_slice())
    }

    fn replace_children(&mut self, selector: &str, children: Vec<Fragment>) -> bool {
        match self.elements.iter_mut().find(|e| e.matches(selector)) {
            Some(element) => {
                element.children = children;
                true
            }
            None => false,
        }
    }

    fn filter_buttons(&self, selector: &str) -> Option<&[FilterButton]> {
        let selector = selector.trim();
        self.groups
            .iter()
            .find(|g| g.selector == selector)
            .map(|g| g.buttons.as_slice())
    }

    fn filter_buttons_mut(&mut self, selector: &str) -> Option<&mut [FilterButton]> {
        let selector = selector.trim();
        self.groups
            .iter_mut()
            .find(|g| g.selector == selector)
            .map(|g| g.buttons.as_mut_slice())
    }

    fn replace_filter_buttons(&mut self, selector: &str, buttons: Vec<FilterButton>) {
        self.set_filter_group(selector, buttons);
    }
}
