use crate::error::{DropError, DropResult};
use crate::models::Point;

/// Records a click in the viewport it was made in. No scaling happens here;
/// the viewport size travels with the point so it can be rescaled later.
pub fn capture(pixel_x: u32, pixel_y: u32, viewport_w: u32, viewport_h: u32) -> DropResult<Point> {
    if viewport_w == 0 || viewport_h == 0 {
        return Err(DropError::InvalidInput(format!(
            "viewport must have a positive size, got {viewport_w}x{viewport_h}"
        )));
    }
    Ok(Point {
        x: pixel_x,
        y: pixel_y,
        w: viewport_w,
        h: viewport_h,
    })
}

/// Position of `point` on a map drawn at `target_w` x `target_h`, using
/// truncating integer division.
pub fn render(point: &Point, target_w: u32, target_h: u32) -> DropResult<(u32, u32)> {
    if point.w == 0 || point.h == 0 {
        return Err(DropError::InvalidInput(format!(
            "stored point has a zero reference size {}x{}",
            point.w, point.h
        )));
    }
    let x = u64::from(point.x) * u64::from(target_w) / u64::from(point.w);
    let y = u64::from(point.y) * u64::from(target_h) / u64::from(point.h);
    Ok((saturate(x), saturate(y)))
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Side of the square the map is drawn in.
pub fn fit_square(avail_w: f32, avail_h: f32) -> u32 {
    avail_w.min(avail_h).max(0.0).floor() as u32
}
