//! On-screen cursor following the tracked target
//!
//! Owned by the orchestrator. Reads the mapped screen point only; it has no
//! link to the game state.

use std::collections::VecDeque;

use crate::mapper::ScreenPoint;

#[derive(Debug, Clone)]
pub struct Cursor {
    position: Option<ScreenPoint>,
    /// Oldest first
    trail: VecDeque<ScreenPoint>,
    trail_length: usize,
    radius: u32,
}

impl Cursor {
    pub fn new(radius: u32, trail_length: usize) -> Self {
        Self {
            position: None,
            trail: VecDeque::with_capacity(trail_length),
            trail_length,
            radius,
        }
    }

    /// Follow the target this tick. An absent target hides the cursor but
    /// keeps the trail.
    pub fn update(&mut self, position: Option<ScreenPoint>) {
        self.position = position;
        if let Some(pos) = position {
            self.trail.push_back(pos);
            while self.trail.len() > self.trail_length {
                self.trail.pop_front();
            }
        }
    }

    pub fn clear(&mut self) {
        self.position = None;
        self.trail.clear();
    }

    pub fn position(&self) -> Option<ScreenPoint> {
        self.position
    }

    pub fn trail(&self) -> impl ExactSizeIterator<Item = &ScreenPoint> + '_ {
        self.trail.iter()
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trail_is_capped_and_evicts_oldest() {
        let mut cursor = Cursor::new(30, 3);
        for x in 0..5 {
            cursor.update(Some(ScreenPoint::new(x, 0)));
        }
        let xs: Vec<i32> = cursor.trail().map(|p| p.x).collect();
        assert_eq!(xs, vec![2, 3, 4]);
        assert_eq!(cursor.position(), Some(ScreenPoint::new(4, 0)));
    }

    #[test]
    fn test_absent_target_keeps_trail() {
        let mut cursor = Cursor::new(30, 10);
        cursor.update(Some(ScreenPoint::new(10, 10)));
        cursor.update(None);
        assert_eq!(cursor.position(), None);
        assert_eq!(cursor.trail().len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut cursor = Cursor::new(30, 10);
        cursor.update(Some(ScreenPoint::new(10, 10)));
        cursor.clear();
        assert_eq!(cursor.position(), None);
        assert_eq!(cursor.trail().len(), 0);
    }
}
