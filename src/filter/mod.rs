use tracing::{debug, warn};

use crate::page::{Document, FilterButton};

/// What a filter button asks the grid to show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterPredicate {
    All,
    Class(String),
}

impl FilterPredicate {
    /// Reads a `data-filter` value: `*`, empty or missing is the wildcard,
    /// `.token` selects cards carrying the class `token`.
    pub fn parse(value: Option<&str>) -> Self {
        let raw = value.map(str::trim).unwrap_or("");
        if raw.is_empty() || raw == "*" {
            return Self::All;
        }
        let class = raw.strip_prefix('.').unwrap_or(raw).trim();
        if class.is_empty() {
            Self::All
        } else {
            Self::Class(class.to_string())
        }
    }

    pub fn matches(&self, classes: &[String]) -> bool {
        match self {
            Self::All => true,
            Self::Class(class) => classes.iter().any(|c| c == class),
        }
    }

    pub fn as_selector(&self) -> String {
        match self {
            Self::All => "*".to_string(),
            Self::Class(class) => format!(".{class}"),
        }
    }
}

/// The grid-arrangement capability: lays out the grid showing only the
/// items the predicate accepts.
pub trait Arranger {
    fn arrange(&mut self, filter: &FilterPredicate);
}

/// Class-based arranger working on a snapshot of the grid's cards, taken
/// when it is created.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassFilterLayout {
    items: Vec<Vec<String>>,
    visible: Vec<usize>,
    current: Option<FilterPredicate>,
}

impl ClassFilterLayout {
    pub fn from_grid<D>(doc: &D, grid_selector: &str) -> Option<Self>
    where
        D: Document + ?Sized,
    {
        let items: Vec<Vec<String>> = doc
            .children(grid_selector)?
            .iter()
            .map(|f| f.classes.clone())
            .collect();
        let visible = (0..items.len()).collect();
        Some(Self {
            items,
            visible,
            current: None,
        })
    }

    /// Indices of the cards currently shown.
    pub fn visible(&self) -> &[usize] {
        &self.visible
    }

    pub fn current(&self) -> Option<&FilterPredicate> {
        self.current.as_ref()
    }
}

impl Arranger for ClassFilterLayout {
    fn arrange(&mut self, filter: &FilterPredicate) {
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, classes)| filter.matches(classes))
            .map(|(idx, _)| idx)
            .collect();
        self.current = Some(filter.clone());
    }
}

/// Builds a filter bar for the cards in the grid: a wildcard button, active,
/// followed by one button per category in first-appearance order. Cards in
/// the default category only show under the wildcard.
pub fn derive_buttons<D>(doc: &D, grid_selector: &str, default_category: &str) -> Vec<FilterButton>
where
    D: Document + ?Sized,
{
    let mut all = FilterButton::new("All", "*");
    all.active = true;
    let mut buttons = vec![all];
    let Some(cards) = doc.children(grid_selector) else {
        return buttons;
    };
    let mut seen: Vec<&str> = Vec::new();
    for category in cards.iter().filter_map(|c| c.category.as_deref()) {
        if category == default_category || seen.contains(&category) {
            continue;
        }
        seen.push(category);
        buttons.push(FilterButton::new(&button_label(category), &format!(".{category}")));
    }
    buttons
}

fn button_label(category: &str) -> String {
    let spaced = category.replace(['-', '_'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Click-driven filtering over a rendered grid.
#[derive(Debug)]
pub struct FilterController<A> {
    grid_selector: String,
    buttons_selector: String,
    arranger: A,
}

impl<A: Arranger> FilterController<A> {
    /// Binds the controller. Filtering is optional: a missing grid or
    /// arranger logs a warning and yields `None`.
    pub fn attach<D>(
        doc: &D,
        grid_selector: &str,
        buttons_selector: &str,
        arranger: Option<A>,
    ) -> Option<Self>
    where
        D: Document + ?Sized,
    {
        if !doc.exists(grid_selector) {
            warn!(grid = grid_selector, "filter grid not found, filtering disabled");
            return None;
        }
        let Some(arranger) = arranger else {
            warn!(grid = grid_selector, "grid arranger unavailable, filtering disabled");
            return None;
        };
        match doc.filter_buttons(buttons_selector) {
            Some(buttons) => debug!(
                buttons = buttons.len(),
                selector = buttons_selector,
                "filters attached"
            ),
            None => debug!(selector = buttons_selector, "no filter buttons on page"),
        }
        Some(Self {
            grid_selector: grid_selector.to_string(),
            buttons_selector: buttons_selector.to_string(),
            arranger,
        })
    }

    /// Handles a click on the button at `index`: it becomes the only active
    /// button of its group and the grid is rearranged with its filter.
    pub fn activate<D>(&mut self, doc: &mut D, index: usize) -> Option<FilterPredicate>
    where
        D: Document + ?Sized,
    {
        let buttons = doc.filter_buttons_mut(&self.buttons_selector)?;
        if index >= buttons.len() {
            return None;
        }
        for (idx, button) in buttons.iter_mut().enumerate() {
            button.active = idx == index;
        }
        let predicate = FilterPredicate::parse(buttons[index].filter.as_deref());
        debug!(filter = %predicate.as_selector(), grid = %self.grid_selector, "arranging grid");
        self.arranger.arrange(&predicate);
        Some(predicate)
    }

    /// Same as [`activate`](Self::activate), addressing the button by its
    /// `data-filter` value.
    pub fn activate_filter<D>(&mut self, doc: &mut D, filter: &str) -> Option<FilterPredicate>
    where
        D: Document + ?Sized,
    {
        let wanted = FilterPredicate::parse(Some(filter));
        let index = doc
            .filter_buttons(&self.buttons_selector)?
            .iter()
            .position(|b| FilterPredicate::parse(b.filter.as_deref()) == wanted)?;
        self.activate(doc, index)
    }

    pub fn arranger(&self) -> &A {
        &self.arranger
    }

    pub fn grid_selector(&self) -> &str {
        &self.grid_selector
    }

    pub fn buttons_selector(&self) -> &str {
        &self.buttons_selector
    }
}
