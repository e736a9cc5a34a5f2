use crate::coords::Vec2;

/// Calls `plot(x, y)` for every pixel whose center lies inside `polygons`
/// under the nonzero winding rule. Polygons are implicitly closed; ones with
/// fewer than three points or non-finite coordinates are ignored.
pub(crate) fn fill_nonzero(
    polygons: &[Vec<Vec2>],
    width: u32,
    height: u32,
    mut plot: impl FnMut(u32, u32),
) {
    let polygons: Vec<&[Vec2]> = polygons
        .iter()
        .map(Vec::as_slice)
        .filter(|p| p.len() >= 3 && p.iter().all(|v| v.is_finite()))
        .collect();

    let (mut min_y, mut max_y) = (f32::INFINITY, f32::NEG_INFINITY);
    for p in polygons.iter().flat_map(|poly| poly.iter()) {
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    if min_y > max_y {
        return;
    }
    let y0 = min_y.floor().clamp(0.0, height as f32) as u32;
    let y1 = max_y.ceil().clamp(0.0, height as f32) as u32;

    let mut crossings: Vec<(f32, i32)> = Vec::new();
    for y in y0..y1 {
        let yc = y as f32 + 0.5;
        crossings.clear();

        for poly in &polygons {
            for (i, &a) in poly.iter().enumerate() {
                let b = poly[(i + 1) % poly.len()];
                let (dir, lo, hi) = if a.y < b.y {
                    (1, a, b)
                } else if a.y > b.y {
                    (-1, b, a)
                } else {
                    continue;
                };
                if yc < lo.y || yc >= hi.y {
                    continue;
                }
                let t = (yc - lo.y) / (hi.y - lo.y);
                crossings.push((lo.x + t * (hi.x - lo.x), dir));
            }
        }

        crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut winding = 0;
        for span in crossings.windows(2) {
            winding += span[0].1;
            if winding == 0 {
                continue;
            }
            // Pixel x is covered when its center x + 0.5 is in [start, end).
            let x0 = (span[0].0 - 0.5).ceil().clamp(0.0, width as f32) as u32;
            let x1 = (span[1].0 - 0.5).ceil().clamp(0.0, width as f32) as u32;
            for x in x0..x1 {
                plot(x, y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn covered(polygons: &[Vec<Vec2>], w: u32, h: u32) -> Vec<(u32, u32)> {
        let mut out = Vec::new();
        fill_nonzero(polygons, w, h, |x, y| out.push((x, y)));
        out
    }

    fn square(x: f32, y: f32, s: f32, clockwise: bool) -> Vec<Vec2> {
        let mut p = vec![
            Vec2::new(x, y),
            Vec2::new(x + s, y),
            Vec2::new(x + s, y + s),
            Vec2::new(x, y + s),
        ];
        if !clockwise {
            p.reverse();
        }
        p
    }

    #[test]
    fn axis_aligned_rect_covers_pixel_centers() {
        let px = covered(&[square(1.0, 1.0, 2.0, true)], 8, 8);
        assert_eq!(px, vec![(1, 1), (2, 1), (1, 2), (2, 2)]);
    }

    #[test]
    fn clipped_to_surface() {
        let px = covered(&[square(-5.0, -5.0, 6.0, true)], 4, 4);
        assert_eq!(px, vec![(0, 0)]);
    }

    #[test]
    fn overlapping_same_orientation_is_union() {
        let px = covered(&[square(0.0, 0.0, 2.0, true), square(1.0, 0.0, 2.0, true)], 8, 1);
        assert_eq!(px, vec![(0, 0), (1, 0), (2, 0)]);
    }

    #[test]
    fn opposite_orientation_cancels() {
        let px = covered(&[square(0.0, 0.0, 4.0, true), square(1.0, 1.0, 2.0, false)], 8, 8);
        assert!(!px.contains(&(1, 1)));
        assert!(!px.contains(&(2, 2)));
        assert!(px.contains(&(0, 0)));
        assert_eq!(px.len(), 12);
    }

    #[test]
    fn degenerate_input_is_ignored() {
        let line = vec![Vec2::new(0.0, 0.0), Vec2::new(4.0, 4.0)];
        let nan = vec![Vec2::new(f32::NAN, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0)];
        assert!(covered(&[line, nan], 8, 8).is_empty());
    }
}
