use serde::Serialize;

/// Bounds of an export.
///
/// `min` commits are already known to the receiver and are excluded along
/// with their history; `max` commits are included. `full` asks the remote
/// to dereference every content and node instead of sending references.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExportQuery<H> {
    #[serde(skip)]
    pub full: bool,
    #[serde(skip)]
    pub depth: Option<u32>,
    pub min: Vec<H>,
    pub max: Vec<H>,
}

impl<H> ExportQuery<H> {
    pub fn new() -> Self {
        Self {
            full: false,
            depth: None,
            min: Vec::new(),
            max: Vec::new(),
        }
    }

    pub fn full(mut self) -> Self {
        self.full = true;
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn with_min(mut self, min: Vec<H>) -> Self {
        self.min = min;
        self
    }

    pub fn with_max(mut self, max: Vec<H>) -> Self {
        self.max = max;
        self
    }
}

impl<H> Default for ExportQuery<H> {
    fn default() -> Self {
        Self::new()
    }
}
