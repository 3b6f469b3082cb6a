use crate::config::TooltipConfig;
use crate::model::{NodeId, SalesRecord};

#[derive(Debug, Clone, PartialEq)]
pub enum TooltipState {
    Hidden,
    Shown { node: NodeId, left: f64, top: f64 },
}

/// The one shared tooltip. Every pointer move over a tile re-runs the shown
/// update; leaving a tile hides it but keeps the last content.
#[derive(Debug, Clone)]
pub struct Tooltip {
    cfg: TooltipConfig,
    state: TooltipState,
    content: String,
    value: Option<f64>,
}

impl Tooltip {
    pub fn new(cfg: TooltipConfig) -> Self {
        Self {
            cfg,
            state: TooltipState::Hidden,
            content: String::new(),
            value: None,
        }
    }

    pub fn pointer_move(&mut self, node: NodeId, record: &SalesRecord, page_x: f64, page_y: f64) {
        self.content = content_html(record);
        self.value = Some(record.value);
        self.state = TooltipState::Shown {
            node,
            left: page_x + self.cfg.offset_x,
            top: page_y + self.cfg.offset_y,
        };
    }

    pub fn pointer_leave(&mut self) {
        self.state = TooltipState::Hidden;
    }

    pub fn state(&self) -> &TooltipState {
        &self.state
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.state, TooltipState::Shown { .. })
    }

    pub fn opacity(&self) -> f64 {
        if self.is_visible() {
            self.cfg.opacity
        } else {
            0.0
        }
    }

    /// Markup of the last shown record (stale while hidden).
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn lines(&self) -> Vec<&str> {
        self.content.split("<br>").collect()
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn position(&self) -> Option<(f64, f64)> {
        match self.state {
            TooltipState::Shown { left, top, .. } => Some((left, top)),
            TooltipState::Hidden => None,
        }
    }
}

fn content_html(record: &SalesRecord) -> String {
    format!(
        "Name: {}<br>Category: {}<br>Value: {}",
        crate::dom::escape_xml(&record.name),
        crate::dom::escape_xml(&record.category),
        record.value
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn duck_hunt() -> SalesRecord {
        SalesRecord {
            name: "Duck Hunt".into(),
            category: "Shooter".into(),
            value: 28.31,
        }
    }

    #[test]
    fn move_shows_and_leave_hides() {
        let mut tip = Tooltip::new(TooltipConfig::default());
        assert!(!tip.is_visible());
        assert_eq!(tip.opacity(), 0.0);

        tip.pointer_move(NodeId(3), &duck_hunt(), 300.0, 400.0);
        assert!(tip.is_visible());
        assert_eq!(tip.opacity(), 0.8);
        assert_eq!(tip.position(), Some((320.0, 250.0)));
        assert_eq!(
            tip.lines(),
            vec!["Name: Duck Hunt", "Category: Shooter", "Value: 28.31"]
        );

        tip.pointer_leave();
        assert!(!tip.is_visible());
        assert_eq!(tip.opacity(), 0.0);
        assert!(tip.content().contains("Duck Hunt"));
    }

    #[test]
    fn every_move_repositions() {
        let mut tip = Tooltip::new(TooltipConfig::default());
        tip.pointer_move(NodeId(1), &duck_hunt(), 0.0, 0.0);
        tip.pointer_move(NodeId(1), &duck_hunt(), 10.0, 200.0);
        assert_eq!(
            tip.state(),
            &TooltipState::Shown {
                node: NodeId(1),
                left: 30.0,
                top: 50.0
            }
        );
    }

    #[test]
    fn names_are_escaped() {
        let mut tip = Tooltip::new(TooltipConfig::default());
        let rec = SalesRecord {
            name: "Tom & Jerry <3".into(),
            category: "Misc".into(),
            value: 1.0,
        };
        tip.pointer_move(NodeId(0), &rec, 0.0, 0.0);
        assert!(tip.content().starts_with("Name: Tom &amp; Jerry &lt;3<br>"));
    }
}
