use crate::hierarchy::Hierarchy;
use crate::human::format_value;
use crate::treemap::Layout;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("pdf error: {0}")]
    Pdf(String),
}

pub fn to_csv(tree: &Hierarchy, layout: &Layout, mut w: impl std::io::Write) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(&mut w);
    writer.write_record([
        "id", "group", "name", "category", "value", "x0", "y0", "x1", "y1",
    ])?;
    for id in layout.leaves() {
        let n = tree.get(*id);
        let r = layout.rect(*id);
        let group = tree.group_of(*id).map(|g| g.name.clone()).unwrap_or_default();
        writer.write_record([
            n.id.clone(),
            group,
            n.name.clone(),
            n.category.clone().unwrap_or_default(),
            n.weight.to_string(),
            r.x0.to_string(),
            r.y0.to_string(),
            r.x1.to_string(),
            r.y1.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn to_json(tree: &Hierarchy, layout: &Layout) -> serde_json::Value {
    serde_json::json!({
        "width": layout.width,
        "height": layout.height,
        "total": tree.total(),
        "nodes": tree.nodes.iter().map(|n| {
            let r = layout.rect(n.node);
            serde_json::json!({
                "id": n.id,
                "name": n.name,
                "category": n.category,
                "value": n.value,
                "weight": n.weight,
                "depth": n.depth,
                "parent": n.parent.map(|p| tree.get(p).id.clone()),
                "rect": { "x0": r.x0, "y0": r.y0, "x1": r.x1, "y1": r.y1 },
            })
        }).collect::<Vec<_>>()
    })
}

const PAGE_TOP_MM: f32 = 280.0;
const PAGE_BOTTOM_MM: f32 = 15.0;
const LINE_MM: f32 = 6.0;

/// Text report: every top-level group with its total, followed by its records.
pub fn to_pdf(tree: &Hierarchy, title: &str, out: &std::path::Path) -> Result<(), ExportError> {
    use printpdf::*;

    let mut lines: Vec<(String, f32)> = vec![(title.to_string(), 14.0)];
    lines.push((format!("Total: {}", format_value(tree.total())), 11.0));
    for group in tree.top_level() {
        lines.push((format!("{}  ({})", group.name, format_value(group.weight)), 12.0));
        let mut records: Vec<_> = tree
            .leaves()
            .filter(|l| tree.group_of(l.node).map(|g| g.node) == Some(group.node))
            .collect();
        records.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        for r in records {
            lines.push((
                format!(
                    "    {} - {} - {}",
                    r.name,
                    r.category.as_deref().unwrap_or(""),
                    format_value(r.weight)
                ),
                10.0,
            ));
        }
    }

    let (doc, page1, layer1) = PdfDocument::new(title, Mm(210.0), Mm(297.0), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let mut layer = doc.get_page(page1).get_layer(layer1);
    let mut y = PAGE_TOP_MM;
    for (text, size) in lines {
        if y < PAGE_BOTTOM_MM {
            let (page, l) = doc.add_page(Mm(210.0), Mm(297.0), "Layer 1");
            layer = doc.get_page(page).get_layer(l);
            y = PAGE_TOP_MM;
        }
        layer.use_text(text, size, Mm(15.0), Mm(y), &font);
        y -= LINE_MM;
    }
    let file = std::fs::File::create(out)?;
    let mut buf = std::io::BufWriter::new(file);
    doc.save(&mut buf).map_err(|e| ExportError::Pdf(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DatasetNode;
    use crate::treemap::{layout, LayoutOptions};

    fn sample() -> (Hierarchy, Layout) {
        let data = DatasetNode::group(
            "root",
            vec![DatasetNode::group(
                "NES",
                vec![
                    DatasetNode::record("Super Mario Bros.", "Platform", 40.0),
                    DatasetNode::record("Duck Hunt", "Shooter", 10.0),
                ],
            )],
        );
        let tree = Hierarchy::build(&data).unwrap();
        let lay = layout(&tree, &LayoutOptions::default());
        (tree, lay)
    }

    #[test]
    fn csv_has_one_row_per_leaf() {
        let (tree, lay) = sample();
        let mut buf = Vec::new();
        to_csv(&tree, &lay, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let rows: Vec<_> = text.lines().collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].starts_with("id,group,name,category,value"));
        assert!(rows[1].starts_with("root--nes--super-mario-bros,NES,Super Mario Bros.,Platform,40,"));
    }

    #[test]
    fn json_lists_every_node() {
        let (tree, lay) = sample();
        let v = to_json(&tree, &lay);
        assert_eq!(v["nodes"].as_array().unwrap().len(), 4);
        assert_eq!(v["total"], 50.0);
        assert_eq!(v["nodes"][1]["parent"], "root");
        assert_eq!(v["nodes"][0]["rect"]["x1"], 1160.0);
    }

    #[test]
    fn pdf_report_is_written() {
        let (tree, _) = sample();
        let path = std::env::temp_dir().join(format!("salesmap-{}.pdf", std::process::id()));
        to_pdf(&tree, "Video Game Sales", &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        std::fs::remove_file(path).ok();
    }
}
