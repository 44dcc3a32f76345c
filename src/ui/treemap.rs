use eframe::egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, StrokeKind, Ui, Vec2};

use crate::color::lighten;
use crate::data::aggregate::{CountTree, TreeNode};
use crate::state::AppState;

/// Inset between a branch and its children.
const PAD: f32 = 2.0;
/// Strip reserved at the top of a branch for its label.
const LABEL_HEIGHT: f32 = 16.0;
const TREEMAP_HEIGHT: f32 = 420.0;

// ---------------------------------------------------------------------------
// Slice-and-dice layout
// ---------------------------------------------------------------------------

/// One positioned node. `path` is race, gender, party down to this node.
#[derive(Debug, Clone)]
pub struct Tile<'a> {
    pub rect: Rect,
    pub node: &'a TreeNode,
    pub path: Vec<&'a str>,
}

impl Tile<'_> {
    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }
}

/// Lay out the hierarchy in `area`, alternating split direction per level.
/// Parents come before their children in the output.
pub fn layout(nodes: &[TreeNode], area: Rect) -> Vec<Tile<'_>> {
    let mut tiles = Vec::new();
    layout_level(nodes, area, true, &[], &mut tiles);
    tiles
}

fn layout_level<'a>(
    nodes: &'a [TreeNode],
    area: Rect,
    horizontal: bool,
    parent: &[&'a str],
    out: &mut Vec<Tile<'a>>,
) {
    let total: usize = nodes.iter().map(|n| n.count).sum();
    if total == 0 || area.width() <= 0.0 || area.height() <= 0.0 {
        return;
    }

    let mut offset = 0.0;
    for node in nodes {
        let frac = node.count as f32 / total as f32;
        let rect = if horizontal {
            let w = area.width() * frac;
            Rect::from_min_size(area.min + Vec2::new(offset, 0.0), Vec2::new(w, area.height()))
        } else {
            let h = area.height() * frac;
            Rect::from_min_size(area.min + Vec2::new(0.0, offset), Vec2::new(area.width(), h))
        };
        offset += if horizontal { rect.width() } else { rect.height() };

        let mut path = parent.to_vec();
        path.push(node.label.as_str());
        out.push(Tile {
            rect,
            node,
            path: path.clone(),
        });

        if !node.children.is_empty() {
            let mut inner = rect.shrink(PAD);
            if inner.height() > LABEL_HEIGHT * 2.0 {
                inner.min.y += LABEL_HEIGHT;
            }
            layout_level(&node.children, inner, !horizontal, &path, out);
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn count_treemap(ui: &mut Ui, state: &AppState, tree: &CountTree) {
    ui.heading("Voter Counts by Race, Gender, and Party");
    if tree.is_empty() {
        ui.label("No voters match the current filters.");
        return;
    }

    let size = Vec2::new(ui.available_width(), TREEMAP_HEIGHT);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let hierarchy = tree.hierarchy();
    let tiles = layout(&hierarchy, response.rect);
    let grand_total = tree.total();

    for tile in &tiles {
        let base = state
            .race_colors
            .as_ref()
            .map(|c| c.color_for(tile.path[0]))
            .unwrap_or(Color32::GRAY);
        let fill = lighten(base, 0.25 * tile.depth() as f32);
        painter.rect_filled(tile.rect, 2.0, fill);
        painter.rect_stroke(tile.rect, 2.0, Stroke::new(1.0, Color32::WHITE), StrokeKind::Inside);

        let label = if tile.node.children.is_empty() {
            format!("{}\n{}", tile.node.label, tile.node.count)
        } else {
            tile.node.label.clone()
        };
        if tile.rect.width() > 36.0 && tile.rect.height() > LABEL_HEIGHT {
            let painter = painter.with_clip_rect(tile.rect);
            painter.text(
                tile.rect.min + Vec2::new(4.0, 2.0),
                Align2::LEFT_TOP,
                label,
                FontId::proportional(12.0),
                Color32::BLACK,
            );
        }
    }

    if let Some(pos) = response.hover_pos() {
        if let Some(tile) = deepest_at(&tiles, pos) {
            let share = 100.0 * tile.node.count as f32 / grand_total as f32;
            response.on_hover_text_at_pointer(format!(
                "{}\nCount: {} ({share:.1}%)",
                tile.path.join(" / "),
                tile.node.count
            ));
        }
    }
}

fn deepest_at<'t, 'a>(tiles: &'t [Tile<'a>], pos: Pos2) -> Option<&'t Tile<'a>> {
    tiles
        .iter()
        .filter(|t| t.rect.contains(pos))
        .max_by_key(|t| t.path.len())
}
