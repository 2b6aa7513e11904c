//! Per-page inputs shared by every check.

use crate::analysis::embedded::{resolve_embedded, splice_embedded};
use crate::error::Result;
use crate::model::{Block, ImageBlock, Raster, Rect};
use crate::parser::PdfBackend;

/// Everything the checks read about one page, computed once.
#[derive(Debug, Clone)]
pub struct PageContext {
    /// 0-based page index
    pub index: usize,
    pub bounds: Rect,
    /// Blocks as extracted by the PDF engine
    pub native_blocks: Vec<Block>,
    /// Native blocks with embedded objects standing in for their content
    pub blocks: Vec<Block>,
    /// Embedded objects; empty unless they are treated as images
    pub embedded: Vec<ImageBlock>,
    pub raster: Option<Raster>,
}

impl PageContext {
    /// Build the context of page `index`.
    ///
    /// Embedded objects are resolved when `embedded_as_image` is set; a page
    /// whose objects cannot be resolved keeps its native blocks.
    pub fn load<B: PdfBackend>(
        backend: &B,
        index: usize,
        embedded_as_image: bool,
        with_raster: bool,
    ) -> Result<Self> {
        let bounds = backend.page_bounds(index)?;
        let native_blocks = backend.page_blocks(index)?;

        let embedded = if embedded_as_image {
            match embedded_objects(backend, index) {
                Ok(embedded) => embedded,
                Err(e) => {
                    log::warn!(
                        "Ignoring embedded objects on page {}: {}",
                        index + 1,
                        e
                    );
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let blocks = if embedded.is_empty() {
            native_blocks.clone()
        } else {
            log::debug!(
                "Page {}: {} embedded object(s)",
                index + 1,
                embedded.len()
            );
            splice_embedded(native_blocks.clone(), &embedded)
        };

        let raster = if with_raster {
            Some(backend.rasterize(index)?)
        } else {
            None
        };

        Ok(Self {
            index,
            bounds,
            native_blocks,
            blocks,
            embedded,
            raster,
        })
    }

    /// 1-based page number.
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

fn embedded_objects<B: PdfBackend>(backend: &B, index: usize) -> Result<Vec<ImageBlock>> {
    let xobjects = backend.page_xobjects(index)?;
    if xobjects.is_empty() {
        return Ok(Vec::new());
    }
    let ops = backend.page_operations(index)?;
    let base = backend.base_transform(index)?;
    resolve_embedded(&ops, &xobjects, &base)
}
