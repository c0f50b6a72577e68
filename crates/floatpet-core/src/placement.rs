//! Bubble placement policy
//!
//! Decides where a freshly created bubble appears on screen. Three
//! strategies exist: random with optional edge snapping, offset from the
//! mouse pointer, and a remembered fixed point.
//!
//! Only random placement keeps the bubble inside the work area. Mouse-follow
//! and fixed placement return their coordinates unclamped, so a bubble near
//! a screen border may render partially off-screen.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{EDGE_SNAP_PROBABILITY, MOUSE_FOLLOW_MARGIN};

/// Screen position in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Width and height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Convert a logical size to physical pixels, rounding up
    pub fn scaled(self, factor: f64) -> Self {
        let scale = |v: u32| (f64::from(v) * factor).ceil().max(0.0) as u32;
        Self::new(scale(self.width), scale(self.height))
    }
}

/// Axis-aligned rectangle, typically a monitor work area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn right(&self) -> i32 {
        self.origin.x + self.size.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.origin.y + self.size.height as i32
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width as i32 / 2,
            self.origin.y + self.size.height as i32 / 2,
        )
    }

    /// Whether a box of `size` at `at` lies entirely inside this rectangle
    pub fn contains_box(&self, at: Point, size: Size) -> bool {
        at.x >= self.origin.x
            && at.y >= self.origin.y
            && at.x + size.width as i32 <= self.right()
            && at.y + size.height as i32 <= self.bottom()
    }
}

/// Active placement strategy, derived from settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementMode {
    Random { edge_snap: bool },
    FollowMouse,
    Fixed(Point),
}

/// Screen edge a random placement can snap to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

const EDGES: [Edge; 4] = [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom];

/// Side of the pointer a mouse-follow bubble appears on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

const DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

/// Compute the top-left position for a bubble of `size`
pub fn place<R: Rng + ?Sized>(
    mode: PlacementMode,
    size: Size,
    work_area: Rect,
    cursor: Point,
    rng: &mut R,
) -> Point {
    match mode {
        PlacementMode::Random { edge_snap } => random_position(size, work_area, edge_snap, rng),
        PlacementMode::FollowMouse => {
            let direction = *DIRECTIONS.choose(rng).unwrap_or(&Direction::Down);
            follow_mouse_position(size, cursor, direction)
        }
        PlacementMode::Fixed(point) => point,
    }
}

/// Uniform position inside `work_area`, optionally snapped to one edge
pub fn random_position<R: Rng + ?Sized>(
    size: Size,
    work_area: Rect,
    edge_snap: bool,
    rng: &mut R,
) -> Point {
    // A bubble wider or taller than the area pins to the origin on that axis
    let max_dx = work_area.size.width.saturating_sub(size.width) as i32;
    let max_dy = work_area.size.height.saturating_sub(size.height) as i32;

    let mut dx = rng.gen_range(0..=max_dx);
    let mut dy = rng.gen_range(0..=max_dy);

    if edge_snap && rng.gen_bool(EDGE_SNAP_PROBABILITY) {
        match *EDGES.choose(rng).unwrap_or(&Edge::Left) {
            Edge::Left => dx = 0,
            Edge::Right => dx = max_dx,
            Edge::Top => dy = 0,
            Edge::Bottom => dy = max_dy,
        }
    }

    work_area.origin.offset(dx, dy)
}

/// Position beside the pointer, centred on the perpendicular axis
pub fn follow_mouse_position(size: Size, cursor: Point, direction: Direction) -> Point {
    let w = size.width as i32;
    let h = size.height as i32;

    match direction {
        Direction::Up => Point::new(cursor.x - w / 2, cursor.y - h - MOUSE_FOLLOW_MARGIN),
        Direction::Down => Point::new(cursor.x - w / 2, cursor.y + MOUSE_FOLLOW_MARGIN),
        Direction::Left => Point::new(cursor.x - w - MOUSE_FOLLOW_MARGIN, cursor.y - h / 2),
        Direction::Right => Point::new(cursor.x + MOUSE_FOLLOW_MARGIN, cursor.y - h / 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SCREEN: Rect = Rect::new(0, 0, 1920, 1040);
    const BUBBLE: Size = Size::new(240, 96);

    fn create_test_rng() -> StdRng {
        StdRng::seed_from_u64(0x5eed)
    }

    #[test]
    fn test_random_placement_stays_on_screen() {
        let mut rng = create_test_rng();

        for _ in 0..5_000 {
            let at = random_position(BUBBLE, SCREEN, true, &mut rng);
            assert!(SCREEN.contains_box(at, BUBBLE), "off-screen at {:?}", at);
        }
    }

    #[test]
    fn test_random_placement_respects_work_area_origin() {
        let mut rng = create_test_rng();
        let area = Rect::new(1920, 40, 1280, 984);

        for _ in 0..1_000 {
            let at = random_position(BUBBLE, area, true, &mut rng);
            assert!(area.contains_box(at, BUBBLE));
        }
    }

    #[test]
    fn test_edge_snap_frequency_and_coordinates() {
        let mut rng = create_test_rng();
        let max_x = (SCREEN.size.width - BUBBLE.width) as i32;
        let max_y = (SCREEN.size.height - BUBBLE.height) as i32;
        let samples = 20_000;
        let mut snapped = 0;

        for _ in 0..samples {
            let at = random_position(BUBBLE, SCREEN, true, &mut rng);
            if at.x == 0 || at.x == max_x || at.y == 0 || at.y == max_y {
                snapped += 1;
            }
        }

        // Natural hits on an edge coordinate are ~0.3%, snapping adds 30%
        let ratio = snapped as f64 / samples as f64;
        assert!((0.28..0.33).contains(&ratio), "snap ratio {}", ratio);
    }

    #[test]
    fn test_no_snapping_when_disabled() {
        let mut rng = create_test_rng();
        let max_x = (SCREEN.size.width - BUBBLE.width) as i32;
        let max_y = (SCREEN.size.height - BUBBLE.height) as i32;
        let samples = 20_000;
        let mut on_edge = 0;

        for _ in 0..samples {
            let at = random_position(BUBBLE, SCREEN, false, &mut rng);
            if at.x == 0 || at.x == max_x || at.y == 0 || at.y == max_y {
                on_edge += 1;
            }
        }

        assert!((on_edge as f64 / samples as f64) < 0.02);
    }

    #[test]
    fn test_oversized_bubble_pins_to_origin() {
        let mut rng = create_test_rng();
        let area = Rect::new(10, 20, 150, 60);

        let at = random_position(BUBBLE, area, true, &mut rng);
        assert_eq!(at, Point::new(10, 20));
    }

    #[test]
    fn test_follow_mouse_offsets() {
        let cursor = Point::new(500, 400);

        assert_eq!(
            follow_mouse_position(BUBBLE, cursor, Direction::Up),
            Point::new(380, 400 - 96 - 30)
        );
        assert_eq!(
            follow_mouse_position(BUBBLE, cursor, Direction::Down),
            Point::new(380, 430)
        );
        assert_eq!(
            follow_mouse_position(BUBBLE, cursor, Direction::Left),
            Point::new(500 - 240 - 30, 352)
        );
        assert_eq!(
            follow_mouse_position(BUBBLE, cursor, Direction::Right),
            Point::new(530, 352)
        );
    }

    #[test]
    fn test_follow_mouse_is_not_clamped() {
        let mut rng = create_test_rng();
        let cursor = Point::new(0, 0);

        // At the top-left corner at least the up and left directions leave the screen
        let escaped = (0..200)
            .map(|_| place(PlacementMode::FollowMouse, BUBBLE, SCREEN, cursor, &mut rng))
            .filter(|at| !SCREEN.contains_box(*at, BUBBLE))
            .count();
        assert!(escaped > 0);
    }

    #[test]
    fn test_size_scaling_rounds_up() {
        assert_eq!(BUBBLE.scaled(1.0), BUBBLE);
        assert_eq!(BUBBLE.scaled(1.5), Size::new(360, 144));
        assert_eq!(Size::new(201, 81).scaled(1.25), Size::new(252, 102));
    }

    #[test]
    fn test_fixed_mode_returns_point_verbatim() {
        let mut rng = create_test_rng();
        let fixed = Point::new(-50, 5_000);

        let at = place(
            PlacementMode::Fixed(fixed),
            BUBBLE,
            SCREEN,
            Point::new(1, 1),
            &mut rng,
        );
        assert_eq!(at, fixed);
    }
}
