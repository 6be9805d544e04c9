/// Spatial, central and normalized central moments of a closed polygon, up to order 3.
///
/// The moments are integrated over the polygon's interior with Green's theorem, so
/// they only depend on the vertex sequence. The vertex order may be either
/// clockwise or counter-clockwise: `m00` is always the unsigned area. Polygons with
/// (numerically) zero area have all moments equal to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
    pub m20: f64,
    pub m11: f64,
    pub m02: f64,
    pub m30: f64,
    pub m21: f64,
    pub m12: f64,
    pub m03: f64,

    pub mu20: f64,
    pub mu11: f64,
    pub mu02: f64,
    pub mu30: f64,
    pub mu21: f64,
    pub mu12: f64,
    pub mu03: f64,

    pub nu20: f64,
    pub nu11: f64,
    pub nu02: f64,
    pub nu30: f64,
    pub nu21: f64,
    pub nu12: f64,
    pub nu03: f64,
}

impl Moments {
    /// Computes the moments of the closed polygon through `vertices`.
    pub fn of_polygon<I>(vertices: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
        I::IntoIter: Clone,
    {
        let vertices = vertices.into_iter();
        let Some(last) = vertices.clone().last() else {
            return Self::default();
        };

        let (mut a00, mut a10, mut a01) = (0.0, 0.0, 0.0);
        let (mut a20, mut a11, mut a02) = (0.0, 0.0, 0.0);
        let (mut a30, mut a21, mut a12, mut a03) = (0.0, 0.0, 0.0, 0.0);

        let (mut xp, mut yp) = last;
        for (x, y) in vertices {
            let cross = xp * y - x * yp;
            let (xs, ys) = (xp + x, yp + y);
            let (xp2, yp2, x2, y2) = (xp * xp, yp * yp, x * x, y * y);

            a00 += cross;
            a10 += cross * xs;
            a01 += cross * ys;
            a20 += cross * (xp * xs + x2);
            a11 += cross * (xp * (ys + yp) + x * (ys + y));
            a02 += cross * (yp * ys + y2);
            a30 += cross * xs * (xp2 + x2);
            a03 += cross * ys * (yp2 + y2);
            a21 += cross * (xp2 * (3.0 * yp + y) + 2.0 * x * xp * ys + x2 * (yp + 3.0 * y));
            a12 += cross * (yp2 * (3.0 * xp + x) + 2.0 * y * yp * xs + y2 * (xp + 3.0 * x));

            (xp, yp) = (x, y);
        }

        if a00.abs() <= f64::EPSILON {
            return Self::default();
        }

        // Fold the winding direction into the integration constants.
        let sign = a00.signum();
        let mut moments = Moments {
            m00: a00 * sign / 2.0,
            m10: a10 * sign / 6.0,
            m01: a01 * sign / 6.0,
            m20: a20 * sign / 12.0,
            m11: a11 * sign / 24.0,
            m02: a02 * sign / 12.0,
            m30: a30 * sign / 20.0,
            m21: a21 * sign / 60.0,
            m12: a12 * sign / 60.0,
            m03: a03 * sign / 20.0,
            ..Self::default()
        };
        moments.complete();
        moments
    }

    /// Derives central and normalized moments from the spatial ones.
    fn complete(&mut self) {
        let cx = self.m10 / self.m00;
        let cy = self.m01 / self.m00;

        self.mu20 = self.m20 - self.m10 * cx;
        self.mu11 = self.m11 - self.m10 * cy;
        self.mu02 = self.m02 - self.m01 * cy;
        self.mu30 = self.m30 - cx * (3.0 * self.mu20 + cx * self.m10);
        self.mu21 = self.m21 - cx * (2.0 * self.mu11 + cx * self.m01) - cy * self.mu20;
        self.mu12 = self.m12 - cy * (2.0 * self.mu11 + cy * self.m10) - cx * self.mu02;
        self.mu03 = self.m03 - cy * (3.0 * self.mu02 + cy * self.m01);

        let inv_m00 = 1.0 / self.m00;
        let s2 = inv_m00 * inv_m00;
        let s3 = s2 * inv_m00.sqrt();

        self.nu20 = self.mu20 * s2;
        self.nu11 = self.mu11 * s2;
        self.nu02 = self.mu02 * s2;
        self.nu30 = self.mu30 * s3;
        self.nu21 = self.mu21 * s3;
        self.nu12 = self.mu12 * s3;
        self.nu03 = self.mu03 * s3;
    }

    /// Center of mass of the polygon's interior, `None` for zero area.
    pub fn center_of_mass(&self) -> Option<(f64, f64)> {
        (self.m00 > 0.0).then(|| (self.m10 / self.m00, self.m01 / self.m00))
    }

    /// The seven Hu invariants, which are unchanged by translation, scale and rotation.
    pub fn hu(&self) -> [f64; 7] {
        let (nu20, nu11, nu02) = (self.nu20, self.nu11, self.nu02);
        let (nu30, nu21, nu12, nu03) = (self.nu30, self.nu21, self.nu12, self.nu03);

        let mut t0 = nu30 + nu12;
        let mut t1 = nu21 + nu03;
        let q0 = t0 * t0;
        let q1 = t1 * t1;
        let n4 = 4.0 * nu11;
        let s = nu20 + nu02;
        let d = nu20 - nu02;

        let hu0 = s;
        let hu1 = d * d + n4 * nu11;
        let hu3 = q0 + q1;
        let hu5 = d * (q0 - q1) + n4 * t0 * t1;

        t0 *= q0 - 3.0 * q1;
        t1 *= 3.0 * q0 - q1;

        let p0 = nu30 - 3.0 * nu12;
        let p1 = 3.0 * nu21 - nu03;
        let hu2 = p0 * p0 + p1 * p1;
        let hu4 = p0 * t0 + p1 * t1;
        let hu6 = p1 * t0 - p0 * t1;

        [hu0, hu1, hu2, hu3, hu4, hu5, hu6]
    }
}

/// Maps every value to `sign(v) * log10(|v|)`, which brings Hu invariants of very
/// different magnitudes onto a comparable scale. Zero stays zero.
pub fn log_scale<const N: usize>(values: [f64; N]) -> [f64; N] {
    values.map(|v| if v == 0.0 { 0.0 } else { v.signum() * v.abs().log10() })
}
