//! Layout inference from element positions.
//!
//! Vertical structure comes from greedy gap clustering of y-coordinates; column
//! structure and sidebars come from how x-coordinates lean against the widest position.

use crate::element::UIElement;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SidebarPosition {
    Left,
    Right,
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnStructure {
    #[default]
    SingleColumn,
    MultiColumn,
}

/// Structural summary of a page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutDescriptor {
    pub has_header: bool,
    pub has_footer: bool,
    pub has_sidebar: bool,
    pub sidebar_position: SidebarPosition,
    pub column_structure: ColumnStructure,
    /// Section labels, top to bottom.
    pub sections: Vec<String>,
}

/// Thresholds for layout inference, in detection pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// A gap larger than this between sorted y-positions starts a new cluster.
    #[serde(default = "default_gap_threshold")]
    pub gap_threshold: f64,
    /// First cluster is a header when its mean y is below this.
    #[serde(default = "default_header_limit")]
    pub header_limit: f64,
    /// Last cluster is a footer when its mean y is above this.
    #[serde(default = "default_footer_limit")]
    pub footer_limit: f64,
}

fn default_gap_threshold() -> f64 {
    100.0
}

fn default_header_limit() -> f64 {
    200.0
}

fn default_footer_limit() -> f64 {
    800.0
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            gap_threshold: default_gap_threshold(),
            header_limit: default_header_limit(),
            footer_limit: default_footer_limit(),
        }
    }
}

const LEFT_BAND: f64 = 0.3;
const RIGHT_BAND: f64 = 0.7;
const COLUMN_SHARE: f64 = 0.2;
const SIDEBAR_SHARE: f64 = 0.3;

/// Infers page structure from classified elements.
#[derive(Debug, Clone, Default)]
pub struct LayoutAnalyzer {
    config: LayoutConfig,
}

impl LayoutAnalyzer {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn analyze(&self, elements: &[UIElement]) -> LayoutDescriptor {
        let positions: Vec<(f64, f64)> = elements
            .iter()
            .filter_map(|e| e.position.map(|p| (p.x, p.y)))
            .collect();

        let mut layout = LayoutDescriptor::default();
        if positions.is_empty() {
            return layout;
        }

        let mut ys: Vec<f64> = positions.iter().map(|(_, y)| *y).collect();
        ys.sort_by(f64::total_cmp);
        let clusters = cluster_positions(&ys, self.config.gap_threshold);
        self.label_clusters(&clusters, &mut layout);

        let xs: Vec<f64> = positions.iter().map(|(x, _)| *x).collect();
        apply_columns(&xs, elements.len(), &mut layout);

        debug!(
            elements = elements.len(),
            clusters = clusters.len(),
            sections = ?layout.sections,
            columns = ?layout.column_structure,
            "Layout analyzed"
        );
        layout
    }

    fn label_clusters(&self, clusters: &[Vec<f64>], layout: &mut LayoutDescriptor) {
        let last = clusters.len().saturating_sub(1);
        for (index, cluster) in clusters.iter().enumerate() {
            let mean = cluster.iter().sum::<f64>() / cluster.len() as f64;
            let label = if index == 0 && mean < self.config.header_limit {
                layout.has_header = true;
                "header".to_string()
            } else if index == last && mean > self.config.footer_limit {
                layout.has_footer = true;
                "footer".to_string()
            } else {
                format!("section_{}", index)
            };
            layout.sections.push(label);
        }
    }
}

/// Greedy clustering over ascending positions.
pub fn cluster_positions(sorted: &[f64], gap_threshold: f64) -> Vec<Vec<f64>> {
    let mut clusters: Vec<Vec<f64>> = Vec::new();
    for &value in sorted {
        match clusters.last_mut() {
            Some(current) if value - current[current.len() - 1] <= gap_threshold => {
                current.push(value)
            }
            _ => clusters.push(vec![value]),
        }
    }
    clusters
}

/// Shares are taken over every element, positioned or not.
fn apply_columns(xs: &[f64], total: usize, layout: &mut LayoutDescriptor) {
    let max_x = xs.iter().copied().fold(f64::MIN, f64::max);
    let total = total as f64;
    let left = xs.iter().filter(|x| **x < LEFT_BAND * max_x).count() as f64;
    let right = xs.iter().filter(|x| **x > RIGHT_BAND * max_x).count() as f64;

    if left > total * COLUMN_SHARE && right > total * COLUMN_SHARE {
        layout.column_structure = ColumnStructure::MultiColumn;
    }

    if left > total * SIDEBAR_SHARE && right < total * COLUMN_SHARE {
        layout.has_sidebar = true;
        layout.sidebar_position = SidebarPosition::Left;
    } else if right > total * SIDEBAR_SHARE && left < total * COLUMN_SHARE {
        layout.has_sidebar = true;
        layout.sidebar_position = SidebarPosition::Right;
    }
}
