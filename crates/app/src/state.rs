use anyhow::Context;
use chrono::{DateTime, Local};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::HashMap;
use std::path::PathBuf;
use salesmap_core::color::Color;
use salesmap_core::config::{RenderConfig, TooltipConfig};
use salesmap_core::interaction::Tooltip;
use salesmap_core::render::assign_colors;
use salesmap_core::loader::{spawn_load, DataSource, LoadMsg};
use salesmap_core::model::{Dataset, NodeId};
use salesmap_core::treemap::{layout, Layout, LayoutOptions};
use salesmap_core::{BuildError, Hierarchy};

pub struct Loaded {
    pub dataset: Dataset,
    pub tree: Hierarchy,
    pub layout: Layout,
    pub tile_colors: HashMap<NodeId, Color>,
    pub legend: Vec<(String, Color)>,
}

impl Loaded {
    pub fn new(dataset: Dataset, cfg: &RenderConfig) -> Result<Self, BuildError> {
        let tree = Hierarchy::build(&dataset)?;
        // Same map as the written page, so the viewer and the export agree.
        let mut colors = assign_colors(&tree, cfg.palette_colors().unwrap_or_default(), cfg.color_order);
        let legend = tree
            .top_level()
            .map(|g| (g.name.clone(), colors.color_for(&g.name)))
            .collect();
        let tile_colors = tree
            .leaves()
            .map(|n| (n.node, colors.color_for(n.category.as_deref().unwrap_or(""))))
            .collect();
        // Real size is only known once the central panel is laid out.
        let layout = layout(&tree, &LayoutOptions::default());
        Ok(Self {
            dataset,
            tree,
            layout,
            tile_colors,
            legend,
        })
    }

    /// Recompute the layout when the canvas size changed.
    pub fn ensure_layout(&mut self, width: f64, height: f64, cfg: &RenderConfig) {
        if (self.layout.width - width).abs() < 0.5 && (self.layout.height - height).abs() < 0.5 {
            return;
        }
        let opts = LayoutOptions {
            width,
            height,
            padding: cfg.padding,
            ratio: cfg.ratio,
        };
        self.layout = layout(&self.tree, &opts);
    }
}

pub struct AppState {
    pub source: DataSource,
    pub cfg: RenderConfig,
    pub load_rx: Option<Receiver<LoadMsg>>,
    pub loaded: Option<Loaded>,
    pub loaded_at: Option<DateTime<Local>>,
    pub error: Option<String>,
    pub search: String,
    pub tooltip: Tooltip,
}

impl AppState {
    pub fn new(source: DataSource) -> Self {
        let cfg = RenderConfig::default();
        // Keep the tooltip next to the pointer instead of the page offsets.
        let tooltip = Tooltip::new(TooltipConfig {
            offset_x: 16.0,
            offset_y: 16.0,
            opacity: 0.9,
        });
        Self {
            source,
            cfg,
            load_rx: None,
            loaded: None,
            loaded_at: None,
            error: None,
            search: String::new(),
            tooltip,
        }
    }

    pub fn start_load(&mut self, source: DataSource) {
        self.source = source.clone();
        self.loaded = None;
        self.loaded_at = None;
        self.error = None;
        self.tooltip.pointer_leave();

        let (tx, rx): (Sender<LoadMsg>, Receiver<LoadMsg>) = unbounded();
        self.load_rx = Some(rx);
        spawn_load(source, tx);
    }

    pub fn reload(&mut self) {
        self.start_load(self.source.clone());
    }

    pub fn finish_load(&mut self, dataset: Dataset) {
        match Loaded::new(dataset, &self.cfg) {
            Ok(loaded) => {
                self.loaded = Some(loaded);
                self.loaded_at = Some(Local::now());
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    /// Render the loaded dataset as a standalone page and return its path.
    pub fn export_html(&self) -> anyhow::Result<PathBuf> {
        let loaded = self.loaded.as_ref().context("nothing loaded")?;
        let rendered = salesmap_core::render(&loaded.dataset, &self.cfg);
        if let Some(d) = rendered.diagnostics.first() {
            anyhow::bail!("{d}");
        }
        let path = std::env::temp_dir().join("salesmap-treemap.html");
        std::fs::write(&path, rendered.page.to_html())
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}
