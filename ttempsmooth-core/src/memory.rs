//! Persistent per-pixel memory for the best-match selector.
//!
//! The memory is owned by the caller and handed to every best-match frame
//! request. It remembers, for each pixel of each enabled plane, the last
//! accepted sample and the disagreement sum it won with. Because each frame
//! depends on the previous one, the memory also tracks which frame it
//! expects next and rejects anything else.

use crate::error::{CoreError, CoreResult};

/// One remembered sample and the disagreement sum it was selected with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryCell {
    pub value: u8,
    pub min_sum: i32,
}

/// Memory cells of one plane, row-major and tightly packed.
#[derive(Debug, Clone)]
pub struct MemoryPlane {
    width: usize,
    height: usize,
    cells: Vec<MemoryCell>,
    sentinel: i32,
}

impl MemoryPlane {
    fn new(width: usize, height: usize, sentinel: i32) -> Self {
        Self {
            width,
            height,
            cells: vec![
                MemoryCell {
                    value: 0,
                    min_sum: sentinel,
                };
                width * height
            ],
            sentinel,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell(&self, x: usize, y: usize) -> MemoryCell {
        self.cells[y * self.width + x]
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [MemoryCell] {
        &mut self.cells
    }

    fn reset(&mut self) {
        for cell in &mut self.cells {
            *cell = MemoryCell {
                value: 0,
                min_sum: self.sentinel,
            };
        }
    }
}

/// Memory for all filtered planes of one filter instance.
#[derive(Debug, Clone)]
pub struct IirMemory {
    planes: [Option<MemoryPlane>; 3],
    next_frame: Option<usize>,
}

impl IirMemory {
    /// Allocates cells for every plane whose entry in `dimensions` is set.
    /// Sums start at `255 * maxr` and values at zero.
    pub(crate) fn new(dimensions: [Option<(usize, usize)>; 3], maxr: usize) -> Self {
        let sentinel = 255 * maxr as i32;
        let planes = dimensions.map(|dims| dims.map(|(w, h)| MemoryPlane::new(w, h, sentinel)));
        Self {
            planes,
            next_frame: None,
        }
    }

    /// Frame the memory expects next, or `None` before the first frame.
    pub fn next_frame(&self) -> Option<usize> {
        self.next_frame
    }

    pub fn is_enabled(&self, plane: usize) -> bool {
        self.planes.get(plane).map_or(false, Option::is_some)
    }

    pub fn plane(&self, plane: usize) -> Option<&MemoryPlane> {
        self.planes.get(plane).and_then(Option::as_ref)
    }

    pub(crate) fn plane_mut(&mut self, plane: usize) -> Option<&mut MemoryPlane> {
        self.planes.get_mut(plane).and_then(Option::as_mut)
    }

    /// Forgets everything, as if no frame had been processed.
    pub fn reset(&mut self) {
        for plane in self.planes.iter_mut().flatten() {
            plane.reset();
        }
        self.next_frame = None;
        log::debug!("Best-match memory reset");
    }

    /// Checks that `n` is the frame the memory expects, without claiming it.
    ///
    /// The first frame may be any index; after that only `previous + 1`
    /// is accepted.
    pub(crate) fn check_next(&self, n: usize) -> CoreResult<()> {
        match self.next_frame {
            Some(expected) if n != expected => Err(CoreError::OutOfOrderFrame {
                expected,
                requested: n,
            }),
            _ => Ok(()),
        }
    }

    /// Records `n` as produced. Called once the frame is complete.
    pub(crate) fn claim(&mut self, n: usize) -> CoreResult<()> {
        self.check_next(n)?;
        self.next_frame = Some(n + 1);
        Ok(())
    }
}
