use std::collections::BTreeMap;

use crate::color::{CategoryColorMap, Color, ColorOrder};
use crate::config::{LabelConfig, RenderConfig};
use crate::dom::{escape_xml, Document, ElementId, PointerEvent};
use crate::hierarchy::{Hierarchy, HierarchyNode};
use crate::interaction::Tooltip;
use crate::model::{NodeId, SalesRecord};
use crate::treemap::{Layout, Rect};

const STYLESHEET: &str = "\
body { font-family: sans-serif; text-align: center; }
.tooltip { position: absolute; padding: 6px 10px; background: #222; color: #fff; \
border-radius: 4px; pointer-events: none; text-align: left; font-size: 12px; }
.legend { display: block; }
.legendText { font-size: 10px; }
.tile { stroke: none; }
.tile-text { font-size: 10px; pointer-events: none; }
";

/// The rendered page: a scaffold built up front, filled with tiles and
/// legend entries once data is available.
#[derive(Debug, Clone)]
pub struct Page {
    cfg: RenderConfig,
    doc: Document,
    tooltip_el: ElementId,
    legend: ElementId,
    chart: ElementId,
    tooltip: Tooltip,
    colors: CategoryColorMap,
    records: BTreeMap<NodeId, SalesRecord>,
}

impl Page {
    pub fn new(cfg: &RenderConfig) -> Self {
        let mut doc = Document::new();
        let body = doc.body();

        let title = doc.append_new(body, "h1");
        doc.set_attr(title, "id", "title").set_text(title, &cfg.title);
        let description = doc.append_new(body, "h2");
        doc.set_attr(description, "id", "description")
            .set_text(description, &cfg.description);

        let tooltip_el = doc.append_new(body, "div");
        doc.set_attr(tooltip_el, "class", "tooltip")
            .set_attr(tooltip_el, "id", "tooltip")
            .set_style(tooltip_el, "opacity", 0);

        let legend = doc.append_new(body, "svg");
        doc.set_attr(legend, "id", "legend")
            .set_attr(legend, "class", "legend")
            .set_attr(legend, "width", cfg.legend.width)
            .set_attr(legend, "height", cfg.legend.height)
            .set_attr(legend, "transform", legend_transform(cfg));

        let svg = doc.append_new(body, "svg");
        doc.set_attr(svg, "width", cfg.width)
            .set_attr(svg, "height", cfg.height);
        let chart = doc.append_new(svg, "g");
        doc.set_attr(
            chart,
            "transform",
            format!("translate({},{})", cfg.margin.left, cfg.margin.top),
        );

        Self {
            cfg: cfg.clone(),
            doc,
            tooltip_el,
            legend,
            chart,
            tooltip: Tooltip::new(cfg.tooltip.clone()),
            colors: CategoryColorMap::new(),
            records: BTreeMap::new(),
        }
    }

    /// Draw the legend and one tile per leaf. Returns the number of tiles.
    pub fn populate(&mut self, tree: &Hierarchy, layout: &Layout) -> usize {
        let palette = self.cfg.palette_colors().unwrap_or_default();
        self.colors = assign_colors(tree, palette, self.cfg.color_order);
        self.draw_legend(tree);

        let mut tiles = 0;
        for id in layout.leaves() {
            let node = tree.get(*id);
            let Some(record) = node.record() else { continue };
            self.draw_tile(node, &record, layout.rect(*id));
            self.records.insert(*id, record);
            tiles += 1;
        }
        tracing::info!(tiles, groups = tree.top_level().count(), "page populated");
        tiles
    }

    fn draw_legend(&mut self, tree: &Hierarchy) {
        let swatch = self.cfg.legend.swatch;
        let gutter = self.cfg.legend.gutter;
        for (i, group) in tree.top_level().enumerate() {
            let color = self.colors.color_for(&group.name);
            let doc = &mut self.doc;
            let g = doc.append_new(self.legend, "g");
            doc.set_attr(g, "transform", legend_item_transform(i, swatch, gutter));
            let rect = doc.append_new(g, "rect");
            doc.set_attr(rect, "class", "legend-item")
                .set_attr(rect, "data-platform", &group.name)
                .set_style(rect, "width", swatch)
                .set_style(rect, "height", swatch)
                .set_style(rect, "fill", color);
            let text = doc.append_new(g, "text");
            doc.set_attr(text, "class", "legendText")
                .set_attr(text, "transform", format!("translate(0 , {})", swatch + gutter))
                .set_text(text, &group.name);
        }
    }

    fn draw_tile(&mut self, node: &HierarchyNode, record: &SalesRecord, rect: Rect) {
        let fill = self.colors.color_for(&record.category);
        let doc = &mut self.doc;

        let g = doc.append_new(self.chart, "g");
        doc.set_attr(g, "class", "group")
            .set_attr(g, "transform", tile_transform(&rect));

        let tile = doc.append_new(g, "rect");
        doc.set_attr(tile, "class", "tile")
            .set_attr(tile, "id", &node.id)
            .set_attr(tile, "data-name", &record.name)
            .set_attr(tile, "data-category", &record.category)
            .set_attr(tile, "data-value", node.weight)
            .set_attr(tile, "width", rect.width())
            .set_attr(tile, "height", rect.height())
            .set_style(tile, "fill", fill);
        doc.bind(tile, node.node);
        let hint = doc.append_new(tile, "title");
        doc.set_text(hint, tooltip_text(record));

        let text = doc.append_new(g, "text");
        doc.set_attr(text, "class", "tile-text");
        for (i, word) in label_lines(&record.name).into_iter().enumerate() {
            let tspan = doc.append_new(text, "tspan");
            doc.set_attr(tspan, "x", self.cfg.label.inset_x)
                .set_attr(tspan, "y", label_y(i, &self.cfg.label))
                .set_text(tspan, word);
        }
    }

    /// Feed one pointer event addressed to `target` through the tooltip.
    /// Events on elements without a bound record are ignored.
    pub fn dispatch(&mut self, target: ElementId, event: PointerEvent) {
        let Some(node) = self.doc.datum(target) else { return };
        let Some(record) = self.records.get(&node) else { return };
        match event {
            PointerEvent::Move { x, y } => {
                self.tooltip.pointer_move(node, record, x, y);
                let (left, top) = self.tooltip.position().unwrap_or((x, y));
                let el = self.tooltip_el;
                self.doc
                    .set_attr(el, "data-value", record.value)
                    .set_style(el, "opacity", self.tooltip.opacity())
                    .set_style(el, "left", format!("{left}px"))
                    .set_style(el, "top", format!("{top}px"))
                    .set_html(el, self.tooltip.content().to_string());
            }
            PointerEvent::Leave => {
                self.tooltip.pointer_leave();
                let el = self.tooltip_el;
                self.doc.set_style(el, "opacity", 0);
            }
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    pub fn tooltip_element(&self) -> ElementId {
        self.tooltip_el
    }

    pub fn tiles(&self) -> Vec<ElementId> {
        self.doc.select_class("tile")
    }

    pub fn colors(&self) -> &CategoryColorMap {
        &self.colors
    }

    /// Standalone HTML document.
    pub fn to_html(&self) -> String {
        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>\n{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
            escape_xml(&self.cfg.title),
            STYLESHEET,
            self.doc.to_html()
        )
    }
}

fn legend_transform(cfg: &RenderConfig) -> String {
    format!(
        "translate({}, 0)",
        cfg.viewport_width / 2.0 - cfg.legend.width / 2.0
    )
}

fn legend_item_transform(i: usize, swatch: f64, gutter: f64) -> String {
    format!("translate({}, 0)", i as f64 * (swatch + gutter))
}

fn tile_transform(r: &Rect) -> String {
    format!("translate({},{})", r.x0, r.y0)
}

/// One color map shared by the legend and the tiles. Platform names are
/// assigned first, so a category that shares a platform's name gets the
/// same swatch it has in the legend.
pub fn assign_colors(tree: &Hierarchy, palette: Vec<Color>, order: ColorOrder) -> CategoryColorMap {
    let mut colors = CategoryColorMap::with_palette(palette);
    if order == ColorOrder::Sorted {
        colors.seed_sorted(tree.top_level().map(|n| n.name.as_str()));
        colors.seed_sorted(tree.leaves().filter_map(|n| n.category.as_deref()));
    } else {
        for group in tree.top_level() {
            colors.color_for(&group.name);
        }
    }
    colors
}

/// One label line per whitespace-separated word.
pub fn label_lines(name: &str) -> Vec<&str> {
    name.split_whitespace().collect()
}

fn label_y(i: usize, label: &LabelConfig) -> f64 {
    label.first_line + i as f64 * label.line_height
}

pub fn tooltip_text(record: &SalesRecord) -> String {
    format!(
        "Name: {}\nCategory: {}\nValue: {}",
        record.name, record.category, record.value
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DatasetNode;
    use crate::treemap::layout;

    fn sample() -> (Hierarchy, Layout) {
        let data = DatasetNode::group(
            "Top Sales",
            vec![
                DatasetNode::group(
                    "NES",
                    vec![
                        DatasetNode::record("Super Mario Bros.", "Platform", 40.0),
                        DatasetNode::record("Duck Hunt", "Shooter", 10.0),
                    ],
                ),
                DatasetNode::group("GB", vec![DatasetNode::record("Tetris", "Puzzle", 30.0)]),
            ],
        );
        let tree = Hierarchy::build(&data).unwrap();
        let lay = layout(&tree, &RenderConfig::default().layout_options());
        (tree, lay)
    }

    #[test]
    fn scaffold_exists_before_data() {
        let page = Page::new(&RenderConfig::default());
        let doc = page.document();
        assert!(doc.by_id("title").is_some());
        assert!(doc.by_id("description").is_some());
        let tooltip = doc.by_id("tooltip").unwrap();
        assert_eq!(doc.get(tooltip).style("opacity"), Some("0"));
        let legend = doc.by_id("legend").unwrap();
        assert_eq!(doc.get(legend).attr("transform"), Some("translate(370, 0)"));
        assert!(page.tiles().is_empty());
    }

    #[test]
    fn tiles_carry_data_attributes() {
        let (tree, lay) = sample();
        let mut page = Page::new(&RenderConfig::default());
        assert_eq!(page.populate(&tree, &lay), 3);
        let doc = page.document();
        let tiles = page.tiles();
        assert_eq!(tiles.len(), 3);
        let mario = doc.get(tiles[0]);
        assert_eq!(mario.attr("id"), Some("top-sales--nes--super-mario-bros"));
        assert_eq!(mario.attr("data-name"), Some("Super Mario Bros."));
        assert_eq!(mario.attr("data-category"), Some("Platform"));
        assert_eq!(mario.attr("data-value"), Some("40"));
        // Legend entries NES and GB take the first two palette slots.
        assert_eq!(mario.style("fill"), Some("#ff7f0e"));
        assert_eq!(doc.get(tiles[1]).style("fill"), Some("#ffbb78"));
    }

    #[test]
    fn labels_stack_one_word_per_line() {
        let (tree, lay) = sample();
        let mut page = Page::new(&RenderConfig::default());
        page.populate(&tree, &lay);
        let doc = page.document();
        let text = doc.select_class("tile-text")[0];
        let spans = doc.select_tag(text, "tspan");
        let words: Vec<_> = spans.iter().map(|s| doc.get(*s).text().unwrap()).collect();
        assert_eq!(words, vec!["Super", "Mario", "Bros."]);
        let ys: Vec<_> = spans.iter().map(|s| doc.get(*s).attr("y").unwrap()).collect();
        assert_eq!(ys, vec!["12", "27", "42"]);
        assert!(spans.iter().all(|s| doc.get(*s).attr("x") == Some("5")));
    }

    #[test]
    fn legend_lists_top_level_groups_in_a_row() {
        let (tree, lay) = sample();
        let mut page = Page::new(&RenderConfig::default());
        page.populate(&tree, &lay);
        let doc = page.document();
        let items = doc.select_class("legend-item");
        assert_eq!(items.len(), 2);
        let labels: Vec<_> = doc
            .select_class("legendText")
            .iter()
            .map(|t| doc.get(*t).text().unwrap().to_string())
            .collect();
        assert_eq!(labels, vec!["NES", "GB"]);
        let second = doc.get(items[1]).parent().unwrap();
        assert_eq!(doc.get(second).attr("transform"), Some("translate(30, 0)"));
        assert_eq!(page.colors().get("NES"), Some(crate::color::PALETTE[0]));
        assert_eq!(page.colors().get("GB"), Some(crate::color::PALETTE[1]));
    }

    #[test]
    fn sorted_color_order_ignores_document_order() {
        let (tree, lay) = sample();
        let cfg = RenderConfig {
            color_order: ColorOrder::Sorted,
            ..RenderConfig::default()
        };
        let mut page = Page::new(&cfg);
        page.populate(&tree, &lay);
        let names: Vec<_> = page
            .colors()
            .assignments()
            .iter()
            .map(|(n, _)| n.as_str())
            .collect();
        assert_eq!(names, vec!["GB", "NES", "Platform", "Puzzle", "Shooter"]);
    }

    #[test]
    fn legend_and_tiles_share_one_color_map() {
        let data = DatasetNode::group(
            "root",
            vec![
                DatasetNode::group(
                    "A",
                    vec![DatasetNode::record("g1", "B", 5.0), DatasetNode::record("g2", "A", 4.0)],
                ),
                DatasetNode::group("B", vec![DatasetNode::record("g3", "B", 3.0)]),
            ],
        );
        let tree = Hierarchy::build(&data).unwrap();
        let lay = layout(&tree, &RenderConfig::default().layout_options());
        let mut page = Page::new(&RenderConfig::default());
        assert_eq!(page.populate(&tree, &lay), 3);
        let doc = page.document();

        let swatch = |platform: &str| {
            doc.select_class("legend-item")
                .into_iter()
                .find(|e| doc.get(*e).attr("data-platform") == Some(platform))
                .and_then(|e| doc.get(e).style("fill"))
                .unwrap()
                .to_string()
        };
        let fill = |name: &str| {
            page.tiles()
                .into_iter()
                .find(|e| doc.get(*e).attr("data-name") == Some(name))
                .and_then(|e| doc.get(e).style("fill"))
                .unwrap()
                .to_string()
        };
        assert_eq!(swatch("A"), fill("g2"));
        assert_eq!(swatch("B"), fill("g1"));
        assert_eq!(swatch("B"), fill("g3"));
        assert_ne!(swatch("A"), swatch("B"));
    }

    #[test]
    fn values_are_written_unrounded() {
        let data = DatasetNode::group(
            "root",
            vec![DatasetNode::group(
                "NES",
                vec![
                    DatasetNode::record("Tiny", "Puzzle", 0.004),
                    DatasetNode::record("Duck Hunt", "Shooter", 28.314),
                ],
            )],
        );
        let tree = Hierarchy::build(&data).unwrap();
        let lay = layout(&tree, &RenderConfig::default().layout_options());
        let mut page = Page::new(&RenderConfig::default());
        page.populate(&tree, &lay);
        let tiles = page.tiles();
        let values: Vec<_> = tiles
            .iter()
            .map(|t| page.document().get(*t).attr("data-value").unwrap().to_string())
            .collect();
        assert_eq!(values, vec!["0.004", "28.314"]);

        page.dispatch(tiles[1], PointerEvent::Move { x: 10.0, y: 200.0 });
        let doc = page.document();
        let tip = doc.get(page.tooltip_element());
        assert_eq!(tip.attr("data-value"), Some("28.314"));
        assert!(page.tooltip().content().contains("Value: 28.314"));
    }

    #[test]
    fn html_is_escaped_and_complete() {
        let (tree, lay) = sample();
        let cfg = RenderConfig {
            title: "Sales <Top>".into(),
            ..RenderConfig::default()
        };
        let mut page = Page::new(&cfg);
        page.populate(&tree, &lay);
        let html = page.to_html();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Sales &lt;Top&gt;</title>"));
        assert!(html.contains("class=\"tile\""));
        assert!(html.trim_end().ends_with("</html>"));
    }
}
