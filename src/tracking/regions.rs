//! Mask cleanup and connected-region extraction
//!
//! Morphology uses a 3x3 square kernel. Pixels outside the image are ignored,
//! so erosion does not eat into regions touching the border.

use std::collections::VecDeque;

use image::{GrayImage, Luma};

use super::hsv::MASK_ON;

const NEIGHBORS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

#[inline]
fn is_on(mask: &GrayImage, x: i32, y: i32) -> Option<bool> {
    if x < 0 || y < 0 || x >= mask.width() as i32 || y >= mask.height() as i32 {
        None
    } else {
        Some(mask.get_pixel(x as u32, y as u32)[0] == MASK_ON)
    }
}

#[derive(Clone, Copy)]
enum Morph {
    Erode,
    Dilate,
}

fn morph(mask: &GrayImage, op: Morph) -> GrayImage {
    let mut out = GrayImage::new(mask.width(), mask.height());
    for y in 0..mask.height() as i32 {
        for x in 0..mask.width() as i32 {
            let mut window = (-1..=1)
                .flat_map(|dy| (-1..=1).map(move |dx| (dx, dy)))
                .filter_map(|(dx, dy)| is_on(mask, x + dx, y + dy));
            let keep = match op {
                Morph::Erode => window.all(|on| on),
                Morph::Dilate => window.any(|on| on),
            };
            if keep {
                out.put_pixel(x as u32, y as u32, Luma([MASK_ON]));
            }
        }
    }
    out
}

/// A pixel stays set only if its whole in-bounds neighborhood is set
pub fn erode(mask: &GrayImage) -> GrayImage {
    morph(mask, Morph::Erode)
}

/// A pixel becomes set if any in-bounds neighbor is set
pub fn dilate(mask: &GrayImage) -> GrayImage {
    morph(mask, Morph::Dilate)
}

/// Speckle suppression: erode once, dilate twice
pub fn open_mask(mask: &GrayImage) -> GrayImage {
    dilate(&dilate(&erode(mask)))
}

/// One 8-connected region of set pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Pixel count
    pub area: u32,
    sum_x: u64,
    sum_y: u64,
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl Region {
    fn seed(x: u32, y: u32) -> Self {
        Self {
            area: 0,
            sum_x: 0,
            sum_y: 0,
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    fn add(&mut self, x: u32, y: u32) {
        self.area += 1;
        self.sum_x += x as u64;
        self.sum_y += y as u64;
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Center of mass from the first-order moments; `None` for a zero area
    pub fn centroid(&self) -> Option<(f32, f32)> {
        if self.area == 0 {
            return None;
        }
        let a = self.area as f64;
        Some(((self.sum_x as f64 / a) as f32, (self.sum_y as f64 / a) as f32))
    }
}

/// All 8-connected regions, in raster order of their first pixel
pub fn find_regions(mask: &GrayImage) -> Vec<Region> {
    let (w, h) = mask.dimensions();
    let mut visited = vec![false; w as usize * h as usize];
    let mut regions = Vec::new();
    let mut queue = VecDeque::new();

    for y in 0..h {
        for x in 0..w {
            let idx = (y * w + x) as usize;
            if visited[idx] || mask.get_pixel(x, y)[0] != MASK_ON {
                continue;
            }

            let mut region = Region::seed(x, y);
            visited[idx] = true;
            queue.push_back((x, y));

            while let Some((px, py)) = queue.pop_front() {
                region.add(px, py);
                for (dx, dy) in NEIGHBORS {
                    let (nx, ny) = (px as i32 + dx, py as i32 + dy);
                    if is_on(mask, nx, ny) != Some(true) {
                        continue;
                    }
                    let nidx = (ny as u32 * w + nx as u32) as usize;
                    if !visited[nidx] {
                        visited[nidx] = true;
                        queue.push_back((nx as u32, ny as u32));
                    }
                }
            }
            regions.push(region);
        }
    }
    regions
}

/// The largest region; on equal areas the one found first wins
pub fn largest_region(regions: &[Region]) -> Option<Region> {
    regions.iter().fold(None, |best: Option<Region>, r| match best {
        Some(b) if b.area >= r.area => Some(b),
        _ => Some(*r),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_with(w: u32, h: u32, on: &[(u32, u32)]) -> GrayImage {
        let mut mask = GrayImage::new(w, h);
        for &(x, y) in on {
            mask.put_pixel(x, y, Luma([MASK_ON]));
        }
        mask
    }

    fn square(x0: u32, y0: u32, size: u32) -> Vec<(u32, u32)> {
        (y0..y0 + size)
            .flat_map(|y| (x0..x0 + size).map(move |x| (x, y)))
            .collect()
    }

    #[test]
    fn test_erode_removes_single_pixels() {
        let mask = mask_with(10, 10, &[(5, 5)]);
        let eroded = erode(&mask);
        assert!(find_regions(&eroded).is_empty());
    }

    #[test]
    fn test_erode_and_dilate_ignore_out_of_bounds() {
        let mask = mask_with(6, 6, &square(0, 0, 3));
        let eroded = erode(&mask);
        // Only the pixels whose in-bounds neighborhood is fully set survive
        assert_eq!(find_regions(&eroded)[0].area, 4);
        assert_eq!(eroded.get_pixel(0, 0)[0], MASK_ON);
        assert_eq!(eroded.get_pixel(2, 2)[0], 0);

        let dilated = dilate(&mask_with(6, 6, &[(5, 5)]));
        assert_eq!(find_regions(&dilated)[0].area, 4);
    }

    #[test]
    fn test_open_keeps_solid_blocks() {
        let mask = mask_with(20, 20, &square(5, 5, 6));
        let opened = open_mask(&mask);
        let regions = find_regions(&opened);
        assert_eq!(regions.len(), 1);
        // 6x6 erodes to 4x4, dilates back out to 8x8
        assert_eq!(regions[0].area, 64);
    }

    #[test]
    fn test_regions_are_eight_connected() {
        let mask = mask_with(5, 5, &[(0, 0), (1, 1), (2, 2), (4, 0)]);
        let regions = find_regions(&mask);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].area, 3);
        assert_eq!(regions[1].area, 1);
    }

    #[test]
    fn test_centroid() {
        let mask = mask_with(10, 10, &square(2, 4, 3));
        let region = find_regions(&mask)[0];
        assert_eq!(region.centroid(), Some((3.0, 5.0)));
        assert_eq!((region.min_x, region.max_y), (2, 6));
    }

    #[test]
    fn test_zero_area_has_no_centroid() {
        assert_eq!(Region::seed(0, 0).centroid(), None);
    }

    #[test]
    fn test_largest_region_tie_prefers_first() {
        let mut on = square(0, 0, 2);
        on.extend(square(6, 6, 2));
        let regions = find_regions(&mask_with(10, 10, &on));
        let best = largest_region(&regions).unwrap();
        assert_eq!((best.min_x, best.min_y), (0, 0));
        assert_eq!(largest_region(&[]), None);
    }
}
