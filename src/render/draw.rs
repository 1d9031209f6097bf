//! Small software-rasterizer primitives shared by the layer renderers.
//!
//! Everything here blends into an existing [`Frame`]; shapes that overhang
//! the frame edge are clipped by the blend helpers.

use crate::render::frame::Frame;

/// Fill a disc centered at (cx, cy) with alpha-over blending
pub fn disc(frame: &mut Frame, cx: f32, cy: f32, radius: f32, color: [u8; 3], alpha: f32) {
    if radius <= 0.0 {
        return;
    }
    let r_sq = radius * radius;
    let x_min = (cx - radius).floor() as i32;
    let x_max = (cx + radius).ceil() as i32;
    let y_min = (cy - radius).floor() as i32;
    let y_max = (cy + radius).ceil() as i32;

    for y in y_min..=y_max {
        for x in x_min..=x_max {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            if dx * dx + dy * dy <= r_sq {
                frame.blend_over(x, y, color, alpha);
            }
        }
    }
}

/// Additive glow disc, brightest in the middle and falling off toward
/// the rim
pub fn glow(frame: &mut Frame, cx: f32, cy: f32, radius: f32, color: [u8; 3], alpha: f32) {
    if radius <= 0.0 {
        return;
    }
    let x_min = (cx - radius).floor() as i32;
    let x_max = (cx + radius).ceil() as i32;
    let y_min = (cy - radius).floor() as i32;
    let y_max = (cy + radius).ceil() as i32;

    for y in y_min..=y_max {
        for x in x_min..=x_max {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist <= radius {
                let falloff = 1.0 - dist / radius;
                frame.blend_add(x, y, color, alpha * falloff * falloff);
            }
        }
    }
}

/// Draw a line segment of the given stroke width
///
/// Sampled as a run of small discs spaced half a pixel apart; fine for
/// the short segments the waveform and ring outlines are built from.
pub fn line(
    frame: &mut Frame,
    from: (f32, f32),
    to: (f32, f32),
    width: f32,
    color: [u8; 3],
    alpha: f32,
) {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let length = (dx * dx + dy * dy).sqrt();
    let steps = (length * 2.0).ceil().max(1.0) as usize;
    let radius = (width / 2.0).max(0.5);

    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        disc(
            frame,
            from.0 + dx * t,
            from.1 + dy * t,
            radius,
            color,
            alpha,
        );
    }
}

/// Connect a point sequence with line segments, optionally closing the
/// loop back to the first point
pub fn polyline(
    frame: &mut Frame,
    points: &[(f32, f32)],
    closed: bool,
    width: f32,
    color: [u8; 3],
    alpha: f32,
) {
    if points.len() < 2 {
        return;
    }
    for pair in points.windows(2) {
        line(frame, pair[0], pair[1], width, color, alpha);
    }
    if closed {
        line(frame, points[points.len() - 1], points[0], width, color, alpha);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disc_paints_center() {
        let mut frame = Frame::new(20, 20);
        disc(&mut frame, 10.0, 10.0, 3.0, [255, 0, 0], 1.0);
        assert_eq!(frame.pixel(10, 10), [255, 0, 0]);
        // Well outside the radius stays black
        assert_eq!(frame.pixel(0, 0), [0, 0, 0]);
    }

    #[test]
    fn test_disc_clipped_at_edge() {
        let mut frame = Frame::new(10, 10);
        disc(&mut frame, 0.0, 0.0, 5.0, [0, 255, 0], 1.0);
        assert_eq!(frame.pixel(0, 0), [0, 255, 0]);
    }

    #[test]
    fn test_line_covers_endpoints() {
        let mut frame = Frame::new(20, 20);
        line(&mut frame, (2.0, 2.0), (17.0, 17.0), 1.5, [0, 0, 255], 1.0);
        assert_eq!(frame.pixel(2, 2), [0, 0, 255]);
        assert_eq!(frame.pixel(17, 17), [0, 0, 255]);
        assert_eq!(frame.pixel(10, 10), [0, 0, 255]);
    }

    #[test]
    fn test_polyline_closed_draws_return_edge() {
        let mut frame = Frame::new(20, 20);
        let points = [(2.0, 2.0), (17.0, 2.0), (17.0, 17.0)];
        polyline(&mut frame, &points, true, 1.0, [255, 255, 255], 1.0);
        // Midpoint of the closing edge from (17,17) back to (2,2)
        assert_ne!(frame.pixel(9, 9), [0, 0, 0]);
    }

    #[test]
    fn test_glow_falls_off() {
        let mut frame = Frame::new(30, 30);
        glow(&mut frame, 15.0, 15.0, 10.0, [200, 200, 200], 1.0);
        let center = frame.pixel(15, 15)[0];
        let rim = frame.pixel(22, 15)[0];
        assert!(center > rim, "glow center {center} not brighter than rim {rim}");
    }
}
