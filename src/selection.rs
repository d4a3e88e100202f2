//! Pointer-driven square selection.
//!
//! The primary button draws a new square anchored at the press point, the
//! secondary button drags the existing square around. All coordinates are in
//! display space.

use crate::transform::Point;

/// A square in display space. `x_start`/`y_start` is where the drag began, so
/// the end corner can lie on either side of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub x_start: u32,
    pub y_start: u32,
    pub x_end: u32,
    pub y_end: u32,
}

impl Selection {
    pub fn new(x_start: u32, y_start: u32, x_end: u32, y_end: u32) -> Self {
        Self {
            x_start,
            y_start,
            x_end,
            y_end,
        }
    }

    /// Top-left and bottom-right corners.
    pub fn normalized(&self) -> (Point, Point) {
        (
            Point::new(self.x_start.min(self.x_end), self.y_start.min(self.y_end)),
            Point::new(self.x_start.max(self.x_end), self.y_start.max(self.y_end)),
        )
    }

    pub fn side(&self) -> u32 {
        self.x_start
            .abs_diff(self.x_end)
            .max(self.y_start.abs_diff(self.y_end))
    }

    pub fn is_square(&self) -> bool {
        self.x_start.abs_diff(self.x_end) == self.y_start.abs_diff(self.y_end)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Button {
    Primary,
    Secondary,
}

/// Pointer input, positions in display pixels. Positions may be negative or
/// past the image edge when the pointer leaves the picture mid-drag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEvent {
    Press { button: Button, x: i32, y: i32 },
    Release { button: Button },
    Move { x: i32, y: i32 },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InteractionMode {
    #[default]
    Idle,
    Drawing {
        anchor: Point,
    },
    Moving,
}

/// The displayed image the selection lives on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    /// Smallest allowed square side, already in display pixels.
    pub min_side: u32,
}

#[derive(Clone, Debug, Default)]
pub struct SelectionStateMachine {
    mode: InteractionMode,
    selection: Option<Selection>,
}

impl SelectionStateMachine {
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// The current square, including one still being dragged.
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// The current square once no drag is in progress.
    pub fn finalized(&self) -> Option<&Selection> {
        match self.mode {
            InteractionMode::Idle => self.selection.as_ref(),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.mode = InteractionMode::Idle;
        self.selection = None;
    }

    /// Applies one pointer event. Returns true when the mode or the square
    /// changed and the overlay has to be repainted.
    pub fn handle(&mut self, event: PointerEvent, view: &Viewport) -> bool {
        let before = (self.mode, self.selection);

        match event {
            PointerEvent::Press {
                button: Button::Primary,
                x,
                y,
            } => {
                if let (Some(ax), Some(ay)) = (within(x, view.width), within(y, view.height)) {
                    let anchor = Point::new(ax, ay);
                    self.selection = None;
                    self.mode = InteractionMode::Drawing { anchor };
                    self.draw_to(anchor, x, y, view);
                }
            }
            PointerEvent::Press {
                button: Button::Secondary,
                x,
                y,
            } => {
                if self.selection.is_some() {
                    self.mode = InteractionMode::Moving;
                    self.move_to(x, y, view);
                }
            }
            PointerEvent::Move { x, y } => match self.mode {
                InteractionMode::Drawing { anchor } => self.draw_to(anchor, x, y, view),
                InteractionMode::Moving => self.move_to(x, y, view),
                InteractionMode::Idle => {}
            },
            PointerEvent::Release { button } => match (button, self.mode) {
                (Button::Primary, InteractionMode::Drawing { .. })
                | (Button::Secondary, InteractionMode::Moving) => {
                    self.mode = InteractionMode::Idle;
                }
                _ => {}
            },
        }

        debug_assert!(self.selection.as_ref().map_or(true, Selection::is_square));
        (self.mode, self.selection) != before
    }

    /// Grows the square from `anchor` toward the cursor. A square that would
    /// leave the image is dropped and the previous one kept.
    fn draw_to(&mut self, anchor: Point, x: i32, y: i32, view: &Viewport) {
        let (ax, ay) = (i64::from(anchor.x), i64::from(anchor.y));
        let (x, y) = (i64::from(x), i64::from(y));
        let x_sign = if x >= ax { 1 } else { -1 };
        let y_sign = if y >= ay { 1 } else { -1 };

        let size = (x - ax)
            .abs()
            .max((y - ay).abs())
            .max(i64::from(view.min_side));

        let end_x = within_i64(ax + x_sign * size, view.width);
        let end_y = within_i64(ay + y_sign * size, view.height);
        if let (Some(x_end), Some(y_end)) = (end_x, end_y) {
            self.selection = Some(Selection::new(anchor.x, anchor.y, x_end, y_end));
        }
    }

    /// Puts the top-left corner of the square under the cursor. Each axis
    /// only moves if the square stays inside the image on that axis.
    fn move_to(&mut self, x: i32, y: i32, view: &Viewport) {
        let Some(selection) = self.selection.as_mut() else {
            return;
        };
        let size = i64::from(selection.side());
        let (x, y) = (i64::from(x), i64::from(y));

        if let (Some(start), Some(end)) = (within_i64(x, view.width), within_i64(x + size, view.width)) {
            selection.x_start = start;
            selection.x_end = end;
        }
        if let (Some(start), Some(end)) = (within_i64(y, view.height), within_i64(y + size, view.height)) {
            selection.y_start = start;
            selection.y_end = end;
        }
    }
}

fn within(value: i32, max: u32) -> Option<u32> {
    within_i64(i64::from(value), max)
}

fn within_i64(value: i64, max: u32) -> Option<u32> {
    if (0..=i64::from(max)).contains(&value) {
        u32::try_from(value).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 3200x1600 shown at half size, 128px minimum square
    const VIEW: Viewport = Viewport {
        width: 1600,
        height: 800,
        min_side: 64,
    };

    fn press(button: Button, x: i32, y: i32) -> PointerEvent {
        PointerEvent::Press { button, x, y }
    }

    fn moved(x: i32, y: i32) -> PointerEvent {
        PointerEvent::Move { x, y }
    }

    fn release(button: Button) -> PointerEvent {
        PointerEvent::Release { button }
    }

    fn drawn(from: (i32, i32), to: (i32, i32)) -> SelectionStateMachine {
        let mut machine = SelectionStateMachine::default();
        machine.handle(press(Button::Primary, from.0, from.1), &VIEW);
        machine.handle(moved(to.0, to.1), &VIEW);
        machine.handle(release(Button::Primary), &VIEW);
        machine
    }

    #[test]
    fn press_starts_a_minimum_square() {
        let mut machine = SelectionStateMachine::default();
        assert!(machine.handle(press(Button::Primary, 100, 100), &VIEW));
        assert_eq!(
            machine.mode(),
            InteractionMode::Drawing {
                anchor: Point::new(100, 100)
            }
        );
        assert_eq!(machine.selection(), Some(&Selection::new(100, 100, 164, 164)));
        assert_eq!(machine.finalized(), None);
    }

    #[test]
    fn vertical_drag_uses_the_larger_displacement() {
        let machine = drawn((100, 100), (100, 180));
        assert_eq!(machine.mode(), InteractionMode::Idle);
        assert_eq!(machine.finalized(), Some(&Selection::new(100, 100, 180, 180)));
    }

    #[test]
    fn drag_up_left_flips_the_end_corner() {
        let machine = drawn((500, 500), (300, 450));
        assert_eq!(machine.finalized(), Some(&Selection::new(500, 500, 300, 300)));
    }

    #[test]
    fn drawing_twice_at_the_same_spot_changes_nothing() {
        let mut machine = SelectionStateMachine::default();
        machine.handle(press(Button::Primary, 10, 10), &VIEW);
        assert!(machine.handle(moved(200, 150), &VIEW));
        let after_first = machine.selection().copied();
        assert!(!machine.handle(moved(200, 150), &VIEW));
        assert_eq!(machine.selection().copied(), after_first);
    }

    #[test]
    fn growth_stops_at_the_image_edge() {
        let mut machine = SelectionStateMachine::default();
        machine.handle(press(Button::Primary, 700, 700), &VIEW);
        machine.handle(moved(780, 780), &VIEW);
        let before = machine.selection().copied();
        assert_eq!(before, Some(Selection::new(700, 700, 780, 780)));

        // 700 + 120 > 800: the candidate is discarded, not clamped
        assert!(!machine.handle(moved(820, 720), &VIEW));
        assert_eq!(machine.selection().copied(), before);

        // reaching the edge exactly is fine
        machine.handle(moved(800, 800), &VIEW);
        assert_eq!(machine.selection(), Some(&Selection::new(700, 700, 800, 800)));
    }

    #[test]
    fn minimum_square_that_does_not_fit_leaves_no_selection() {
        let mut machine = SelectionStateMachine::default();
        machine.handle(press(Button::Primary, 790, 790), &VIEW);
        assert_eq!(machine.selection(), None);
        // growing away from the edge brings it back
        machine.handle(moved(700, 700), &VIEW);
        assert_eq!(machine.selection(), Some(&Selection::new(790, 790, 700, 700)));
    }

    #[test]
    fn new_press_replaces_the_old_square() {
        let mut machine = drawn((100, 100), (300, 300));
        machine.handle(press(Button::Primary, 1000, 100), &VIEW);
        assert_eq!(machine.selection(), Some(&Selection::new(1000, 100, 1064, 164)));
    }

    #[test]
    fn press_outside_the_image_is_ignored() {
        let mut machine = drawn((100, 100), (200, 200));
        assert!(!machine.handle(press(Button::Primary, -5, 100), &VIEW));
        assert!(!machine.handle(press(Button::Primary, 100, 801), &VIEW));
        assert_eq!(machine.selection(), Some(&Selection::new(100, 100, 200, 200)));
    }

    #[test]
    fn moves_while_idle_do_nothing() {
        let mut machine = drawn((100, 100), (200, 200));
        assert!(!machine.handle(moved(400, 400), &VIEW));
        assert_eq!(machine.selection(), Some(&Selection::new(100, 100, 200, 200)));
    }

    #[test]
    fn secondary_press_without_selection_is_a_no_op() {
        let mut machine = SelectionStateMachine::default();
        assert!(!machine.handle(press(Button::Secondary, 10, 10), &VIEW));
        assert_eq!(machine.mode(), InteractionMode::Idle);
    }

    #[test]
    fn secondary_drag_relocates_and_keeps_size() {
        let mut machine = drawn((300, 300), (200, 200));
        machine.handle(press(Button::Secondary, 50, 60), &VIEW);
        assert_eq!(machine.mode(), InteractionMode::Moving);
        assert_eq!(machine.selection(), Some(&Selection::new(50, 60, 150, 160)));

        machine.handle(moved(400, 500), &VIEW);
        assert_eq!(machine.selection(), Some(&Selection::new(400, 500, 500, 600)));

        machine.handle(release(Button::Secondary), &VIEW);
        assert_eq!(machine.finalized(), Some(&Selection::new(400, 500, 500, 600)));
    }

    #[test]
    fn move_axes_are_clamped_independently() {
        let mut machine = drawn((100, 100), (200, 200));
        machine.handle(press(Button::Secondary, 100, 100), &VIEW);

        // y would overflow the bottom edge, x is fine
        machine.handle(moved(300, 750), &VIEW);
        assert_eq!(machine.selection(), Some(&Selection::new(300, 100, 400, 200)));

        // x negative, y fine
        machine.handle(moved(-1, 400), &VIEW);
        assert_eq!(machine.selection(), Some(&Selection::new(300, 400, 400, 500)));
    }

    #[test]
    fn wrong_button_release_keeps_the_mode() {
        let mut machine = SelectionStateMachine::default();
        machine.handle(press(Button::Primary, 10, 10), &VIEW);
        assert!(!machine.handle(release(Button::Secondary), &VIEW));
        assert!(matches!(machine.mode(), InteractionMode::Drawing { .. }));
    }

    #[test]
    fn square_invariant_holds_over_a_session() {
        let mut machine = SelectionStateMachine::default();
        let events = [
            press(Button::Primary, 400, 300),
            moved(410, 500),
            moved(-100, 350),
            moved(390, 0),
            moved(1700, 900),
            release(Button::Primary),
            press(Button::Secondary, 1000, 20),
            moved(1590, 790),
            moved(-20, 700),
            moved(5, -5),
            release(Button::Secondary),
            press(Button::Primary, 1599, 799),
            moved(0, 0),
            release(Button::Primary),
        ];
        for event in events {
            machine.handle(event, &VIEW);
            if let Some(selection) = machine.selection() {
                assert!(selection.is_square(), "{selection:?} after {event:?}");
                assert!(selection.x_start <= VIEW.width && selection.x_end <= VIEW.width);
                assert!(selection.y_start <= VIEW.height && selection.y_end <= VIEW.height);
            }
        }
    }

    #[test]
    fn clear_resets_everything() {
        let mut machine = drawn((10, 10), (90, 90));
        machine.clear();
        assert_eq!(machine.selection(), None);
        assert_eq!(machine.mode(), InteractionMode::Idle);
    }
}
