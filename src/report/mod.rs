use tracing::{error, warn};

use crate::model::Collection;
use crate::page::{Document, Fragment, Selectors};
use crate::runner::PipelineError;
use crate::utils::escape_html;

/// Writes failure notices in place of a collection's cards.
#[derive(Clone, Debug, Default)]
pub struct ErrorReporter {
    selectors: Selectors,
}

impl ErrorReporter {
    pub fn new(selectors: Selectors) -> Self {
        Self { selectors }
    }

    /// Replaces the collection's error output with a notice. Returns `false`
    /// when the page has no such output; the failure is then only logged.
    pub fn report<D>(&self, doc: &mut D, collection: Collection, err: &PipelineError) -> bool
    where
        D: Document + ?Sized,
    {
        error!(
            "[{}] {}",
            collection.name().to_uppercase(),
            err
        );

        let target = self.selectors.error_target(collection);
        if !doc.exists(target) {
            warn!(collection = %collection, output = target, "no error output on page, report dropped");
            return false;
        }
        doc.replace_children(target, vec![notice(collection, &err.to_string())])
    }
}

pub fn notice(collection: Collection, message: &str) -> Fragment {
    let detail = if message.trim().is_empty() {
        String::new()
    } else {
        format!("<br><small>{}</small>", escape_html(message))
    };
    let html = format!(
        r#"<div class="col-12 text-center py-5">
  <div class="alert alert-danger">
    <i class="fa fa-exclamation-triangle"></i>
    Failed to load {collection}{detail}
  </div>
</div>
"#
    );
    Fragment::new(
        vec!["col-12".to_string(), "text-center".to_string(), "py-5".to_string()],
        html,
    )
}
