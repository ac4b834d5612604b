//! Reference ellipsoids and seven-parameter datum shifts

const ARCSEC_TO_RAD: f64 = std::f64::consts::PI / (180.0 * 3600.0);

/// A reference ellipsoid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis in metres
    pub a: f64,
    /// Flattening
    pub f: f64,
}

impl Ellipsoid {
    /// GRS80, used by the Israel 1993 datum
    pub const GRS80: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        f: 1.0 / 298.257_222_101,
    };

    /// WGS84
    pub const WGS84: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        f: 1.0 / 298.257_223_563,
    };

    /// First eccentricity squared
    pub fn e2(&self) -> f64 {
        self.f * (2.0 - self.f)
    }

    /// Third flattening
    pub fn n(&self) -> f64 {
        self.f / (2.0 - self.f)
    }

    /// Geodetic (radians, metres) to earth-centred earth-fixed metres
    pub fn to_geocentric(&self, lat: f64, lon: f64, h: f64) -> [f64; 3] {
        let e2 = self.e2();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let nu = self.a / (1.0 - e2 * sin_lat * sin_lat).sqrt();

        [
            (nu + h) * cos_lat * lon.cos(),
            (nu + h) * cos_lat * lon.sin(),
            (nu * (1.0 - e2) + h) * sin_lat,
        ]
    }

    /// Earth-centred earth-fixed metres to geodetic (radians, metres)
    pub fn from_geocentric(&self, xyz: [f64; 3]) -> (f64, f64, f64) {
        let [x, y, z] = xyz;
        let e2 = self.e2();
        let p = x.hypot(y);
        let lon = y.atan2(x);

        let mut lat = z.atan2(p * (1.0 - e2));
        let mut h = 0.0;
        for _ in 0..10 {
            let sin_lat = lat.sin();
            let nu = self.a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
            h = p / lat.cos() - nu;
            let next = z.atan2(p * (1.0 - e2 * nu / (nu + h)));
            let delta = (next - lat).abs();
            lat = next;
            if delta < 1e-14 {
                break;
            }
        }

        (lat, lon, h)
    }
}

/// Seven-parameter Helmert shift in the position-vector convention
/// (the convention of PROJ's `+towgs84`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Helmert {
    /// Translations in metres
    pub translation: [f64; 3],
    /// Rotations in arc-seconds
    pub rotation_arcsec: [f64; 3],
    /// Scale difference in parts per million
    pub scale_ppm: f64,
}

impl Helmert {
    /// Israel 1993 to WGS84 (EPSG:1073 parameters, as published with EPSG:2039)
    pub const ISRAEL_1993_TO_WGS84: Helmert = Helmert {
        translation: [-24.0024, -17.1032, -17.8444],
        rotation_arcsec: [-0.33009, -1.85269, 1.66969],
        scale_ppm: 5.4248,
    };

    fn matrix(&self) -> [[f64; 3]; 3] {
        let [rx, ry, rz] = self.rotation_arcsec.map(|r| r * ARCSEC_TO_RAD);
        let m = 1.0 + self.scale_ppm * 1e-6;

        [
            [m, -m * rz, m * ry],
            [m * rz, m, -m * rx],
            [-m * ry, m * rx, m],
        ]
    }

    /// Shifts geocentric coordinates from the source datum to the target
    pub fn forward(&self, xyz: [f64; 3]) -> [f64; 3] {
        let r = self.matrix();
        let t = self.translation;

        [
            t[0] + r[0][0] * xyz[0] + r[0][1] * xyz[1] + r[0][2] * xyz[2],
            t[1] + r[1][0] * xyz[0] + r[1][1] * xyz[1] + r[1][2] * xyz[2],
            t[2] + r[2][0] * xyz[0] + r[2][1] * xyz[1] + r[2][2] * xyz[2],
        ]
    }

    /// Exact inverse of [`Helmert::forward`]
    pub fn inverse(&self, xyz: [f64; 3]) -> [f64; 3] {
        let r = self.matrix();
        let t = self.translation;
        let d = [xyz[0] - t[0], xyz[1] - t[1], xyz[2] - t[2]];

        let det = r[0][0] * (r[1][1] * r[2][2] - r[1][2] * r[2][1])
            - r[0][1] * (r[1][0] * r[2][2] - r[1][2] * r[2][0])
            + r[0][2] * (r[1][0] * r[2][1] - r[1][1] * r[2][0]);

        // Adjugate (transposed cofactors) divided by the determinant
        let inv = [
            [
                (r[1][1] * r[2][2] - r[1][2] * r[2][1]) / det,
                (r[0][2] * r[2][1] - r[0][1] * r[2][2]) / det,
                (r[0][1] * r[1][2] - r[0][2] * r[1][1]) / det,
            ],
            [
                (r[1][2] * r[2][0] - r[1][0] * r[2][2]) / det,
                (r[0][0] * r[2][2] - r[0][2] * r[2][0]) / det,
                (r[0][2] * r[1][0] - r[0][0] * r[1][2]) / det,
            ],
            [
                (r[1][0] * r[2][1] - r[1][1] * r[2][0]) / det,
                (r[0][1] * r[2][0] - r[0][0] * r[2][1]) / det,
                (r[0][0] * r[1][1] - r[0][1] * r[1][0]) / det,
            ],
        ];

        [
            inv[0][0] * d[0] + inv[0][1] * d[1] + inv[0][2] * d[2],
            inv[1][0] * d[0] + inv[1][1] * d[1] + inv[1][2] * d[2],
            inv[2][0] * d[0] + inv[2][1] * d[1] + inv[2][2] * d[2],
        ]
    }
}
