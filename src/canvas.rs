//! Drawing primitives over a row-major `u32` framebuffer.

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    // BGRA8 in little-endian memory
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
    // Alpha at 0
}

#[inline]
pub fn unpack_rgb(c: u32) -> (u8, u8, u8) {
    ((c >> 16) as u8, (c >> 8) as u8, c as u8)
}

pub struct Canvas<'a> {
    buf: &'a mut [u32],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(buf: &'a mut [u32], width: usize, height: usize) -> Self {
        debug_assert!(buf.len() >= width * height);
        Self { buf, width, height }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.buf[..self.width * self.height]
    }

    #[inline]
    pub fn put(&mut self, x: i32, y: i32, color: u32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        self.buf[y as usize * self.width + x as usize] = color;
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.buf[y * self.width + x])
    }

    pub fn clear(&mut self, color: u32) {
        self.pixels_mut().fill(color);
    }

    /// Clipped axis-aligned rectangle.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(w).min(self.width as i32);
        let y1 = y.saturating_add(h).min(self.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        for row in y0..y1 {
            let start = row as usize * self.width;
            self.buf[start + x0 as usize..start + x1 as usize].fill(color);
        }
    }

    /// Bresenham line, `thickness` pixels wide.
    pub fn line(&mut self, from: (i32, i32), to: (i32, i32), thickness: i32, color: u32) {
        let (mut x0, mut y0) = from;
        let (x1, y1) = to;
        let dx = (x1 - x0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let dy = -(y1 - y0).abs();
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut error = dx + dy;
        let r = (thickness.max(1) - 1) / 2;

        loop {
            self.fill_rect(x0 - r, y0 - r, 2 * r + 1, 2 * r + 1, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * error;
            if e2 >= dy {
                error += dy;
                x0 += sx;
            }
            if e2 <= dx {
                error += dx;
                y0 += sy;
            }
        }
    }

    pub fn fill_circle(&mut self, center: (i32, i32), radius: i32, color: u32) {
        let (cx, cy) = center;
        let r2 = radius * radius;
        for dy in -radius..=radius {
            let half = ((r2 - dy * dy) as f32).sqrt() as i32;
            self.fill_rect(cx - half, cy + dy, 2 * half + 1, 1, color);
        }
    }

    /// Ring of the given thickness, drawn inward from `radius`.
    pub fn ring(&mut self, center: (i32, i32), radius: i32, thickness: i32, color: u32) {
        let (cx, cy) = center;
        let outer = radius * radius;
        let inner_r = (radius - thickness).max(0);
        let inner = inner_r * inner_r;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let d = dx * dx + dy * dy;
                if d <= outer && d > inner {
                    self.put(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Halves every channel, used for overlays.
    pub fn darken(&mut self) {
        for px in self.pixels_mut() {
            *px = (*px >> 1) & 0x007F_7F7F;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_roundtrips_channels() {
        let c = pack_rgb(200, 100, 50);
        assert_eq!(unpack_rgb(c), (200, 100, 50));
    }

    #[test]
    fn fill_rect_clips_to_bounds() {
        let mut buf = vec![0u32; 4 * 3];
        let mut canvas = Canvas::new(&mut buf, 4, 3);
        canvas.fill_rect(-2, 1, 4, 10, 7);
        assert_eq!(canvas.get(0, 0), Some(0));
        assert_eq!(canvas.get(0, 1), Some(7));
        assert_eq!(canvas.get(1, 2), Some(7));
        assert_eq!(canvas.get(2, 2), Some(0));
        assert_eq!(canvas.get(4, 0), None);
    }

    #[test]
    fn line_hits_both_endpoints() {
        let mut buf = vec![0u32; 10 * 10];
        let mut canvas = Canvas::new(&mut buf, 10, 10);
        canvas.line((1, 1), (8, 5), 1, 9);
        assert_eq!(canvas.get(1, 1), Some(9));
        assert_eq!(canvas.get(8, 5), Some(9));
        // off-canvas segments are silently clipped
        canvas.line((-5, -5), (20, 20), 3, 4);
        assert_eq!(canvas.get(9, 9), Some(4));
    }

    #[test]
    fn darken_halves_channels() {
        let mut buf = vec![pack_rgb(200, 101, 3)];
        let mut canvas = Canvas::new(&mut buf, 1, 1);
        canvas.darken();
        assert_eq!(unpack_rgb(canvas.get(0, 0).unwrap()), (100, 50, 1));
    }

    #[test]
    fn circle_and_ring_stay_inside_radius() {
        let mut buf = vec![0u32; 21 * 21];
        let mut canvas = Canvas::new(&mut buf, 21, 21);
        canvas.fill_circle((10, 10), 5, 1);
        canvas.ring((10, 10), 8, 2, 2);
        assert_eq!(canvas.get(10, 10), Some(1));
        assert_eq!(canvas.get(10, 2), Some(2));
        assert_eq!(canvas.get(0, 0), Some(0));
    }
}
