use std::collections::HashSet;

use crate::error::EngineError;
use crate::pipeline::range_mask::MaskView;
use crate::vector::Vec3;

/// Neighbourhood radius of every quadrant search, in pixels.
const GRID_RADIUS: i32 = 2;

#[derive(Clone, Copy, Debug)]
pub struct ContourParams {
    /// Hard cap on the walk length; a silhouette longer than this is cut off.
    pub max_edge_pixels: usize,
    /// Row stride of the start-pixel raster scan.
    pub rows_to_skip: usize,
    /// How many prior contour pixels the walk revisits when stuck.
    pub max_backtrack: usize,
    /// Fraction of the image height skipped at the bottom before the start
    /// scan begins (keeps the scan above the wrist/arm entry region).
    pub scan_height_offset: f64,
    pub scan_from_left: bool,
    pub scan_from_right: bool,
}

impl Default for ContourParams {
    fn default() -> Self {
        Self {
            max_edge_pixels: 700,
            rows_to_skip: 5,
            max_backtrack: 25,
            scan_height_offset: 0.2,
            scan_from_left: true,
            scan_from_right: false,
        }
    }
}

impl ContourParams {
    /// The two start scans are alternatives, not phases: running both would
    /// splice two unrelated traversals into one point list.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.scan_from_left && self.scan_from_right {
            return Err(EngineError::InvalidParameter(
                "left and right start scans are mutually exclusive",
            ));
        }
        Ok(())
    }
}

/// Quadrant the walk is currently heading into. The transition table and the
/// sweep orders are tuned for finger silhouettes pointing up in image
/// coordinates (y grows downward).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SearchDirection {
    UpLeft,
    UpRight,
    DownRight,
    DownLeft,
    Undefined,
}

impl SearchDirection {
    /// The quadrant a finger contour most likely continues into when the
    /// current one runs dry: left flank to tip, tip to right flank, valley
    /// floor back up the next finger.
    fn next_probable(self) -> SearchDirection {
        match self {
            SearchDirection::UpLeft => SearchDirection::UpRight,
            SearchDirection::UpRight => SearchDirection::DownRight,
            SearchDirection::DownRight => SearchDirection::UpRight,
            SearchDirection::DownLeft => SearchDirection::DownRight,
            SearchDirection::Undefined => SearchDirection::UpLeft,
        }
    }

    fn clockwise(self) -> [SearchDirection; 4] {
        const RING: [SearchDirection; 4] = [
            SearchDirection::UpLeft,
            SearchDirection::UpRight,
            SearchDirection::DownRight,
            SearchDirection::DownLeft,
        ];
        let from = RING.iter().position(|d| *d == self).unwrap_or(0);
        std::array::from_fn(|i| RING[(from + i) % 4])
    }

    fn counter_clockwise(self) -> [SearchDirection; 4] {
        let cw = self.clockwise();
        [cw[0], cw[3], cw[2], cw[1]]
    }
}

type Pos = (i32, i32);

/// Silhouette walker. Holds large per-frame state (visited set, point list),
/// so one tracker is built per pipeline and cleared between frames instead
/// of reallocated.
pub struct ContourTracker {
    params: ContourParams,
    contour: Vec<Vec3>,
    visited: HashSet<Pos>,
    direction: SearchDirection,
}

impl ContourTracker {
    pub fn new(params: ContourParams) -> Self {
        Self {
            params,
            contour: Vec::new(),
            visited: HashSet::new(),
            direction: SearchDirection::Undefined,
        }
    }

    /// Traces the silhouette of the in-range region and returns the contour
    /// pixels in traversal order. The output never contains a position
    /// twice; consecutive points differ by at most `GRID_RADIUS` per axis
    /// except where the walk recovered through a backtrack.
    pub fn trace(&mut self, mask: &MaskView) -> &[Vec3] {
        self.contour.clear();
        self.visited.clear();
        self.direction = SearchDirection::Undefined;

        if self.params.scan_from_left {
            if let Some(start) = self.find_start_from_left(mask) {
                self.walk(mask, start);
            }
        } else if self.params.scan_from_right {
            if let Some(start) = self.find_start_from_right(mask) {
                self.walk(mask, start);
            }
        }

        &self.contour
    }

    fn find_start_from_left(&self, mask: &MaskView) -> Option<Pos> {
        let offset = (mask.height() as f64 * self.params.scan_height_offset) as i32;
        let mut y = mask.height() - 1 - offset;
        while y >= 0 {
            for x in 0..mask.width() {
                if mask.in_range(x, y) {
                    return Some((x, y));
                }
            }
            y -= self.params.rows_to_skip.max(1) as i32;
        }
        None
    }

    /// Bottom-right variant: on the first hit, slide left across the object
    /// so the walk still begins on its left boundary.
    fn find_start_from_right(&self, mask: &MaskView) -> Option<Pos> {
        let mut y = mask.height() - 1;
        while y >= 0 {
            for x in (0..mask.width()).rev() {
                if mask.in_range(x, y) {
                    let mut left = x;
                    while left > 0 && mask.in_range(left - 1, y) {
                        left -= 1;
                    }
                    return Some((left, y));
                }
            }
            y -= self.params.rows_to_skip.max(1) as i32;
        }
        None
    }

    fn walk(&mut self, mask: &MaskView, start: Pos) {
        self.direction = SearchDirection::UpLeft;
        self.record(start);
        let mut pos = start;

        loop {
            if self.contour.len() > self.params.max_edge_pixels {
                break;
            }
            let Some(next) = self.next_contour_pixel(mask, pos) else {
                break;
            };
            // A rediscovered pixel means the loop has closed; stop without
            // appending it again so the output stays duplicate-free.
            if !self.record(next) {
                break;
            }
            pos = next;
        }
    }

    /// Appends a freshly discovered pixel. Returns false on a duplicate.
    fn record(&mut self, pos: Pos) -> bool {
        if !self.visited.insert(pos) {
            return false;
        }
        self.contour
            .push(Vec3::new(pos.0 as f64, pos.1 as f64, 0.0));
        true
    }

    /// The fallback cascade: current quadrant, most-probable next quadrant,
    /// clockwise sweep, counter-clockwise sweep, stripe-end probe, backtrack.
    /// Returns an already-visited pixel only when every strategy failed to
    /// find a fresh one, which the caller treats as loop closure.
    fn next_contour_pixel(&mut self, mask: &MaskView, pos: Pos) -> Option<Pos> {
        if let Some(p) = search_quadrant(mask, pos, self.direction) {
            if !self.visited.contains(&p) {
                return Some(p);
            }
        }

        let probable = self.direction.next_probable();
        if let Some(p) = search_quadrant(mask, pos, probable) {
            if !self.visited.contains(&p) {
                self.direction = probable;
                return Some(p);
            }
        }

        let mut duplicate = None;
        for dir in self.direction.clockwise() {
            if let Some(p) = search_quadrant(mask, pos, dir) {
                if !self.visited.contains(&p) {
                    self.direction = dir;
                    return Some(p);
                }
                duplicate.get_or_insert(p);
            }
        }

        if duplicate.is_some() {
            for dir in self.direction.counter_clockwise() {
                if let Some(p) = search_quadrant(mask, pos, dir) {
                    if !self.visited.contains(&p) {
                        self.direction = dir;
                        return Some(p);
                    }
                }
            }
            if let Some(p) = self.stripe_end(mask, pos) {
                if !self.visited.contains(&p) {
                    return Some(p);
                }
            }
        }

        if let Some(p) = self.backtrack(mask) {
            return Some(p);
        }

        duplicate
    }

    /// Steps back through recent contour pixels, sweeping clockwise at each,
    /// until an undiscovered neighbour turns up.
    fn backtrack(&mut self, mask: &MaskView) -> Option<Pos> {
        let len = self.contour.len();
        let reach = self.params.max_backtrack.min(len.saturating_sub(1));
        for step in 1..=reach {
            let prior = self.contour[len - 1 - step];
            let at = (prior.x as i32, prior.y as i32);
            for dir in SearchDirection::UpLeft.clockwise() {
                if let Some(p) = search_quadrant(mask, at, dir) {
                    if !self.visited.contains(&p) {
                        self.direction = dir;
                        return Some(p);
                    }
                }
            }
        }
        None
    }

    /// When the walk sits on a one-pixel-wide stripe, jump straight to the
    /// stripe's far end in the walk's current vertical/horizontal sense.
    fn stripe_end(&self, mask: &MaskView, pos: Pos) -> Option<Pos> {
        let vertical =
            !mask.in_range(pos.0 - 1, pos.1) && !mask.in_range(pos.0 + 1, pos.1);
        let horizontal =
            !mask.in_range(pos.0, pos.1 - 1) && !mask.in_range(pos.0, pos.1 + 1);

        let step: Pos = if vertical {
            match self.direction {
                SearchDirection::UpLeft | SearchDirection::UpRight => (0, -1),
                _ => (0, 1),
            }
        } else if horizontal {
            match self.direction {
                SearchDirection::UpLeft | SearchDirection::DownLeft => (-1, 0),
                _ => (1, 0),
            }
        } else {
            return None;
        };

        let mut end = pos;
        loop {
            let next = (end.0 + step.0, end.1 + step.1);
            if !next_point_in_range(mask, end, next) {
                break;
            }
            end = next;
        }
        if end == pos { None } else { Some(end) }
    }
}

/// Single-step continuation test used by the stripe walk.
// TODO: the vertical delta is computed from `to` against itself and is
// always zero, so the vertical guard never rejects; decide whether it
// should read `to.1 - from.1` before loosening GRID_RADIUS.
fn next_point_in_range(mask: &MaskView, from: Pos, to: Pos) -> bool {
    let delta_x = (to.0 - from.0).abs();
    let delta_y = (to.1 - to.1).abs();
    delta_x <= 1 && delta_y <= 1 && mask.in_range(to.0, to.1)
}

fn search_quadrant(mask: &MaskView, pos: Pos, dir: SearchDirection) -> Option<Pos> {
    match dir {
        SearchDirection::UpLeft | SearchDirection::Undefined => search_up_left(mask, pos),
        SearchDirection::UpRight => search_up_right(mask, pos),
        SearchDirection::DownRight => search_down_right(mask, pos),
        SearchDirection::DownLeft => search_down_left(mask, pos),
    }
}

// Each quadrant routine scans its rectangle nearest-row-first and returns
// the first in-range pixel that still touches the outside on the quadrant's
// boundary sides. A row scan stops as soon as it falls off the in-range run
// it entered, so the walk cannot hop across a gap onto a different blob.

fn search_up_left(mask: &MaskView, pos: Pos) -> Option<Pos> {
    for dy in 1..=GRID_RADIUS {
        let y = pos.1 - dy;
        let mut entered_run = false;
        for dx in 0..=GRID_RADIUS {
            let x = pos.0 - dx;
            if mask.in_range(x, y) {
                entered_run = true;
                if !mask.in_range(x - 1, y) || !mask.in_range(x, y - 1) {
                    return Some((x, y));
                }
            } else if entered_run {
                break;
            }
        }
    }
    for dx in 1..=GRID_RADIUS {
        let (x, y) = (pos.0 - dx, pos.1);
        if !mask.in_range(x, y) {
            break;
        }
        if !mask.in_range(x - 1, y) || !mask.in_range(x, y - 1) {
            return Some((x, y));
        }
    }
    None
}

fn search_up_right(mask: &MaskView, pos: Pos) -> Option<Pos> {
    for dy in 1..=GRID_RADIUS {
        let y = pos.1 - dy;
        let mut entered_run = false;
        for dx in 0..=GRID_RADIUS {
            let x = pos.0 + dx;
            if mask.in_range(x, y) {
                entered_run = true;
                if !mask.in_range(x, y - 1) || !mask.in_range(x + 1, y) {
                    return Some((x, y));
                }
            } else if entered_run {
                break;
            }
        }
    }
    for dx in 1..=GRID_RADIUS {
        let (x, y) = (pos.0 + dx, pos.1);
        if !mask.in_range(x, y) {
            break;
        }
        if !mask.in_range(x, y - 1) || !mask.in_range(x + 1, y) {
            return Some((x, y));
        }
    }
    None
}

fn search_down_right(mask: &MaskView, pos: Pos) -> Option<Pos> {
    for dy in 1..=GRID_RADIUS {
        let y = pos.1 + dy;
        let mut entered_run = false;
        for dx in 0..=GRID_RADIUS {
            let x = pos.0 + dx;
            if mask.in_range(x, y) {
                entered_run = true;
                if !mask.in_range(x + 1, y) || !mask.in_range(x, y + 1) {
                    return Some((x, y));
                }
            } else if entered_run {
                break;
            }
        }
    }
    for dx in 1..=GRID_RADIUS {
        let (x, y) = (pos.0 + dx, pos.1);
        if !mask.in_range(x, y) {
            break;
        }
        if !mask.in_range(x + 1, y) || !mask.in_range(x, y + 1) {
            return Some((x, y));
        }
    }
    None
}

fn search_down_left(mask: &MaskView, pos: Pos) -> Option<Pos> {
    for dy in 1..=GRID_RADIUS {
        let y = pos.1 + dy;
        let mut entered_run = false;
        for dx in 0..=GRID_RADIUS {
            let x = pos.0 - dx;
            if mask.in_range(x, y) {
                entered_run = true;
                if !mask.in_range(x, y + 1) || !mask.in_range(x - 1, y) {
                    return Some((x, y));
                }
            } else if entered_run {
                break;
            }
        }
    }
    for dx in 1..=GRID_RADIUS {
        let (x, y) = (pos.0 - dx, pos.1);
        if !mask.in_range(x, y) {
            break;
        }
        if !mask.in_range(x, y + 1) || !mask.in_range(x - 1, y) {
            return Some((x, y));
        }
    }
    None
}
