//! Transverse Mercator on an ellipsoid
//!
//! Forward and inverse use the Krüger series in the third flattening `n`,
//! carried to sixth order (Karney, "Transverse Mercator with an accuracy of a
//! few nanometers", J. Geodesy 85, 2011). Within a few hundred kilometres of
//! the central meridian the series error is far below a millimetre.

use super::datum::Ellipsoid;

/// Defining parameters of a Transverse Mercator grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TmParams {
    /// Latitude of origin, degrees
    pub lat_0: f64,
    /// Central meridian, degrees
    pub lon_0: f64,
    /// Scale factor on the central meridian
    pub k_0: f64,
    /// False easting, metres
    pub x_0: f64,
    /// False northing, metres
    pub y_0: f64,
}

/// A Transverse Mercator projection with its series coefficients precomputed
#[derive(Debug, Clone)]
pub struct TransverseMercator {
    ellipsoid: Ellipsoid,
    params: TmParams,
    e: f64,
    /// Rectifying radius scaled by k_0
    k0_a: f64,
    alpha: [f64; 6],
    beta: [f64; 6],
    /// Northing of the latitude of origin on the central meridian, unshifted
    origin_northing: f64,
}

impl TransverseMercator {
    pub fn new(ellipsoid: Ellipsoid, params: TmParams) -> Self {
        let n = ellipsoid.n();
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;
        let n5 = n4 * n;
        let n6 = n5 * n;

        let rectifying = ellipsoid.a / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0 + n6 / 256.0);

        let alpha = [
            n / 2.0 - 2.0 / 3.0 * n2 + 5.0 / 16.0 * n3 + 41.0 / 180.0 * n4 - 127.0 / 288.0 * n5
                + 7891.0 / 37800.0 * n6,
            13.0 / 48.0 * n2 - 3.0 / 5.0 * n3 + 557.0 / 1440.0 * n4 + 281.0 / 630.0 * n5
                - 1_983_433.0 / 1_935_360.0 * n6,
            61.0 / 240.0 * n3 - 103.0 / 140.0 * n4 + 15061.0 / 26880.0 * n5
                + 167_603.0 / 181_440.0 * n6,
            49561.0 / 161_280.0 * n4 - 179.0 / 168.0 * n5 + 6_601_661.0 / 7_257_600.0 * n6,
            34729.0 / 80640.0 * n5 - 3_418_889.0 / 1_995_840.0 * n6,
            212_378_941.0 / 319_334_400.0 * n6,
        ];

        let beta = [
            n / 2.0 - 2.0 / 3.0 * n2 + 37.0 / 96.0 * n3 - 1.0 / 360.0 * n4 - 81.0 / 512.0 * n5
                + 96199.0 / 604_800.0 * n6,
            1.0 / 48.0 * n2 + 1.0 / 15.0 * n3 - 437.0 / 1440.0 * n4 + 46.0 / 105.0 * n5
                - 1_118_711.0 / 3_870_720.0 * n6,
            17.0 / 480.0 * n3 - 37.0 / 840.0 * n4 - 209.0 / 4480.0 * n5 + 5569.0 / 90720.0 * n6,
            4397.0 / 161_280.0 * n4 - 11.0 / 504.0 * n5 - 830_251.0 / 7_257_600.0 * n6,
            4583.0 / 161_280.0 * n5 - 108_847.0 / 3_991_680.0 * n6,
            20_648_693.0 / 638_668_800.0 * n6,
        ];

        let mut projection = Self {
            ellipsoid,
            params,
            e: ellipsoid.e2().sqrt(),
            k0_a: params.k_0 * rectifying,
            alpha,
            beta,
            origin_northing: 0.0,
        };

        let (_, origin_northing) = projection.project_unshifted(params.lat_0.to_radians(), 0.0);
        projection.origin_northing = origin_northing;
        projection
    }

    /// Ellipsoid the grid is defined on
    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    /// Geodetic latitude/longitude (degrees) to grid easting/northing (metres)
    pub fn forward(&self, lat: f64, lon: f64) -> (f64, f64) {
        let d_lon = (lon - self.params.lon_0).to_radians();
        let (easting, northing) = self.project_unshifted(lat.to_radians(), d_lon);

        (
            self.params.x_0 + easting,
            self.params.y_0 + northing - self.origin_northing,
        )
    }

    /// Grid easting/northing (metres) to geodetic latitude/longitude (degrees)
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let xi = (y - self.params.y_0 + self.origin_northing) / self.k0_a;
        let eta = (x - self.params.x_0) / self.k0_a;

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, b) in self.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_p -= b * (k * xi).sin() * (k * eta).cosh();
            eta_p -= b * (k * xi).cos() * (k * eta).sinh();
        }

        let tau_p = xi_p.sin() / (eta_p.sinh().powi(2) + xi_p.cos().powi(2)).sqrt();
        let d_lon = eta_p.sinh().atan2(xi_p.cos());
        let lat = self.tau_from_conformal(tau_p).atan();

        (lat.to_degrees(), self.params.lon_0 + d_lon.to_degrees())
    }

    fn project_unshifted(&self, lat: f64, d_lon: f64) -> (f64, f64) {
        let tau_p = self.conformal_tau(lat.tan());
        let xi_p = tau_p.atan2(d_lon.cos());
        let eta_p = (d_lon.sin() / (1.0 + tau_p * tau_p).sqrt()).atanh();

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, a) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += a * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += a * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        (self.k0_a * eta, self.k0_a * xi)
    }

    /// tan of the conformal latitude, given tan of the geodetic latitude
    fn conformal_tau(&self, tau: f64) -> f64 {
        let sigma = (self.e * (self.e * tau / (1.0 + tau * tau).sqrt()).atanh()).sinh();
        tau * (1.0 + sigma * sigma).sqrt() - sigma * (1.0 + tau * tau).sqrt()
    }

    /// Newton iteration inverting [`Self::conformal_tau`]
    fn tau_from_conformal(&self, tau_p: f64) -> f64 {
        let e2m = 1.0 - self.e * self.e;
        let mut tau = tau_p / e2m;

        for _ in 0..8 {
            let tau_i = self.conformal_tau(tau);
            let dtau = (tau_p - tau_i) * (1.0 + e2m * tau * tau)
                / (e2m * (1.0 + tau_i * tau_i).sqrt() * (1.0 + tau * tau).sqrt());
            tau += dtau;
            if dtau.abs() < 1e-14 * tau.abs().max(1.0) {
                break;
            }
        }

        tau
    }
}
