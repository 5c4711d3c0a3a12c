//! Integer line interpolation.

/// Steps an integer value from `y1` to `y2` over `count` steps, spreading
/// the remainder evenly (Bresenham style) so no error accumulates.
#[derive(Debug, Clone, Copy)]
pub struct Dda2LineInterpolator {
    cnt: i32,
    lft: i32,
    rem: i32,
    modulo: i32,
    y: i32,
}

impl Dda2LineInterpolator {
    /// Forward-adjusted interpolation; `count <= 0` is treated as one step.
    pub fn new(y1: i32, y2: i32, count: i32) -> Self {
        let cnt = count.max(1);
        let dy = y2.wrapping_sub(y1);
        let mut lft = dy / cnt;
        let mut rem = dy % cnt;
        let mut modulo = rem;
        if modulo <= 0 {
            modulo += cnt;
            rem += cnt;
            lft -= 1;
        }
        modulo -= cnt;
        Self {
            cnt,
            lft,
            rem,
            modulo,
            y: y1,
        }
    }

    #[inline]
    pub fn inc(&mut self) {
        self.modulo += self.rem;
        self.y += self.lft;
        if self.modulo > 0 {
            self.modulo -= self.cnt;
            self.y += 1;
        }
    }

    #[inline]
    pub fn y(&self) -> i32 {
        self.y
    }
}

impl Default for Dda2LineInterpolator {
    fn default() -> Self {
        Self::new(0, 0, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(y1: i32, y2: i32, count: i32) -> Vec<i32> {
        let mut dda = Dda2LineInterpolator::new(y1, y2, count);
        let mut out = vec![dda.y()];
        for _ in 0..count {
            dda.inc();
            out.push(dda.y());
        }
        out
    }

    #[test]
    fn test_reaches_endpoint_exactly() {
        for (y1, y2, n) in [(0, 100, 7), (50, -13, 9), (0, 0, 5), (-1000, 1000, 3)] {
            assert_eq!(*walk(y1, y2, n).last().unwrap(), y2, "{} -> {} in {}", y1, y2, n);
        }
    }

    #[test]
    fn test_steps_are_even() {
        let ys = walk(0, 10, 4);
        assert_eq!(ys, vec![0, 2, 5, 7, 10]);
        for w in ys.windows(2) {
            let step = w[1] - w[0];
            assert!(step == 2 || step == 3);
        }
    }

    #[test]
    fn test_zero_count_is_one_step() {
        let mut dda = Dda2LineInterpolator::new(3, 9, 0);
        dda.inc();
        assert_eq!(dda.y(), 9);
    }
}
