/// Edge or corner an interactive resize is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeEdge {
    None,
    Top,
    Bottom,
    Left,
    TopLeft,
    BottomLeft,
    Right,
    TopRight,
    BottomRight,
}

impl Default for ResizeEdge {
    fn default() -> Self {
        Self::None
    }
}

impl ResizeEdge {
    /// Map a window-system sizing edge code (1..=8, left first) to an edge.
    pub fn from_sizing_edge(edge: u32) -> Self {
        match edge {
            1 => ResizeEdge::Left,
            2 => ResizeEdge::Right,
            3 => ResizeEdge::Top,
            4 => ResizeEdge::TopLeft,
            5 => ResizeEdge::TopRight,
            6 => ResizeEdge::Bottom,
            7 => ResizeEdge::BottomLeft,
            8 => ResizeEdge::BottomRight,
            _ => ResizeEdge::None,
        }
    }
}
