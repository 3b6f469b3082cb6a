use crate::config::RenderConfig;
use crate::hierarchy::{BuildError, Hierarchy};
use crate::loader::{load, DataSource, LoadError};
use crate::model::Dataset;
use crate::render::Page;
use crate::treemap::{layout, Layout};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("data unavailable: {0}")]
    DataUnavailable(#[from] LoadError),
    #[error("invalid dataset: {0}")]
    InvalidData(#[from] BuildError),
}

/// Outcome of one render pass. On failure the page keeps its scaffold but
/// holds no tiles, and the error is recorded in `diagnostics`.
#[derive(Debug)]
pub struct Rendered {
    pub page: Page,
    pub hierarchy: Option<Hierarchy>,
    pub layout: Option<Layout>,
    pub diagnostics: Vec<String>,
}

impl Rendered {
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Load, build, lay out and draw. Never panics on bad input.
pub fn run(source: &DataSource, cfg: &RenderConfig) -> Rendered {
    let page = Page::new(cfg);
    tracing::debug!(source = %source.describe(), "loading dataset");
    match load(source) {
        Ok(data) => render_dataset(page, &data, cfg),
        Err(e) => fail(page, e.into()),
    }
}

/// Same as [`run`] for a dataset that is already in memory.
pub fn render(data: &Dataset, cfg: &RenderConfig) -> Rendered {
    render_dataset(Page::new(cfg), data, cfg)
}

fn render_dataset(mut page: Page, data: &Dataset, cfg: &RenderConfig) -> Rendered {
    let tree = match Hierarchy::build(data) {
        Ok(t) => t,
        Err(e) => return fail(page, e.into()),
    };
    let lay = layout(&tree, &cfg.layout_options());
    page.populate(&tree, &lay);
    Rendered {
        page,
        hierarchy: Some(tree),
        layout: Some(lay),
        diagnostics: Vec::new(),
    }
}

fn fail(page: Page, err: PipelineError) -> Rendered {
    tracing::error!(error = %err, "render aborted");
    Rendered {
        page,
        hierarchy: None,
        layout: None,
        diagnostics: vec![err.to_string()],
    }
}
