//! Litchi waypoint CSV export
//!
//! One row per waypoint, in flight order. Columns that the planner has no
//! opinion about carry Litchi's neutral defaults: no heading, no curve, no
//! gimbal control, no actions (`-1`), no point of interest and no interval
//! photography (`-1`).

use std::fs::File;
use std::path::Path;

use crate::error::{Error, Result};
use crate::geometry::MissionPath;
use crate::projection::{GeoPoint, Itm, ProjectedPoint};

/// Litchi supports fifteen action slots per waypoint
const ACTION_SLOTS: usize = 15;

pub const DEFAULT_SPEED_MPS: f64 = 8.0;
pub const DEFAULT_ALTITUDE_M: f64 = 6.0;

/// Speed and altitude applied to every waypoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightParameters {
    speed_mps: f64,
    altitude_m: f64,
}

impl FlightParameters {
    pub fn new(speed_mps: f64, altitude_m: f64) -> Result<Self> {
        if !speed_mps.is_finite() || speed_mps <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "speed must be positive, got {}",
                speed_mps
            )));
        }
        if !altitude_m.is_finite() || altitude_m <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "altitude must be positive, got {}",
                altitude_m
            )));
        }
        Ok(Self {
            speed_mps,
            altitude_m,
        })
    }

    pub fn speed_mps(&self) -> f64 {
        self.speed_mps
    }

    pub fn altitude_m(&self) -> f64 {
        self.altitude_m
    }
}

impl Default for FlightParameters {
    fn default() -> Self {
        Self {
            speed_mps: DEFAULT_SPEED_MPS,
            altitude_m: DEFAULT_ALTITUDE_M,
        }
    }
}

fn header() -> Vec<String> {
    let mut columns: Vec<String> = [
        "latitude",
        "longitude",
        "altitude(m)",
        "heading(deg)",
        "curvesize(m)",
        "rotationdir",
        "gimbalmode",
        "gimbalpitchangle",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    for slot in 1..=ACTION_SLOTS {
        columns.push(format!("actiontype{}", slot));
        columns.push(format!("actionparam{}", slot));
    }

    columns.extend(
        [
            "altitudemode",
            "speed(m/s)",
            "poi_latitude",
            "poi_longitude",
            "poi_altitude(m)",
            "poi_altitudemode",
            "photo_timeinterval",
            "photo_distinterval",
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    columns
}

fn record(point: &GeoPoint, params: &FlightParameters) -> Vec<String> {
    let mut row = vec![
        format!("{:.8}", point.lat),
        format!("{:.8}", point.lon),
        params.altitude_m.to_string(),
        "0".to_string(), // heading
        "0".to_string(), // curve size
        "0".to_string(), // rotation dir
        "0".to_string(), // gimbal mode
        "0".to_string(), // gimbal pitch
    ];
    for _ in 0..ACTION_SLOTS {
        row.push("-1".to_string());
        row.push("0".to_string());
    }
    row.extend([
        "0".to_string(), // altitude mode
        params.speed_mps.to_string(),
        "0".to_string(),
        "0".to_string(),
        "0".to_string(),
        "0".to_string(),
        "-1".to_string(),
        "-1".to_string(),
    ]);
    row
}

fn write_rows<W: std::io::Write>(
    writer: W,
    path: &[GeoPoint],
    params: &FlightParameters,
) -> Result<W> {
    if path.is_empty() {
        return Err(Error::EmptyPath);
    }

    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(header())?;
    for point in path {
        csv.write_record(record(point, params))?;
    }

    csv.into_inner()
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))
}

/// Serializes a WGS84 path as Litchi CSV text
pub fn to_waypoint_file(path: &[GeoPoint], params: &FlightParameters) -> Result<String> {
    let bytes = write_rows(Vec::new(), path, params)?;
    String::from_utf8(bytes).map_err(|e| Error::Io(std::io::Error::other(e)))
}

/// Writes the Litchi CSV to `dest`
pub fn write_waypoint_file<P: AsRef<Path>>(
    dest: P,
    path: &[GeoPoint],
    params: &FlightParameters,
) -> Result<()> {
    // validate before touching the filesystem
    if path.is_empty() {
        return Err(Error::EmptyPath);
    }
    let file = File::create(dest.as_ref())?;
    write_rows(file, path, params)?;
    tracing::info!(
        waypoints = path.len(),
        dest = %dest.as_ref().display(),
        "waypoint file written"
    );
    Ok(())
}

/// Converts an ITM path to WGS84 and serializes it
pub fn export_itm_path(
    path: &MissionPath<ProjectedPoint>,
    params: &FlightParameters,
) -> Result<String> {
    if path.is_empty() {
        return Err(Error::EmptyPath);
    }
    let geo = Itm::new().to_geo_many(path.points())?;
    to_waypoint_file(&geo, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_path() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(32.0853, 34.7818),
            GeoPoint::new(32.08601234, 34.78255),
            GeoPoint::new(32.0871, 34.7831),
        ]
    }

    #[test]
    fn test_header_layout() {
        let text = to_waypoint_file(&sample_path(), &FlightParameters::default()).unwrap();
        let header = text.lines().next().unwrap();
        let columns: Vec<&str> = header.split(',').collect();

        assert_eq!(columns.len(), 46);
        assert_eq!(&columns[..3], &["latitude", "longitude", "altitude(m)"]);
        assert_eq!(columns[8], "actiontype1");
        assert_eq!(columns[37], "actionparam15");
        assert_eq!(columns[39], "speed(m/s)");
        assert_eq!(columns[45], "photo_distinterval");
    }

    #[test]
    fn test_row_defaults() {
        let text = to_waypoint_file(&sample_path(), &FlightParameters::default()).unwrap();
        let row: Vec<&str> = text.lines().nth(1).unwrap().split(',').collect();

        assert_eq!(row[0], "32.08530000");
        assert_eq!(row[1], "34.78180000");
        assert_eq!(row[2], "6");
        assert_eq!(row[8], "-1");
        assert_eq!(row[9], "0");
        assert_eq!(row[39], "8");
        assert_eq!(&row[44..], &["-1", "-1"]);
        assert_eq!(row.len(), 46);
    }

    #[test]
    fn test_one_row_per_waypoint_in_order() {
        let params = FlightParameters::new(5.5, 30.0).unwrap();
        let text = to_waypoint_file(&sample_path(), &params).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("32.08601234,34.78255000,30,"));
        assert!(lines[3].starts_with("32.08710000,"));
        assert!(text.ends_with('\n'));
        assert!(!text.contains('\r'));
    }

    #[test]
    fn test_export_is_deterministic() {
        let params = FlightParameters::default();
        let a = to_waypoint_file(&sample_path(), &params).unwrap();
        let b = to_waypoint_file(&sample_path(), &params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_path() {
        let params = FlightParameters::new(8.0, 6.0).unwrap();
        assert!(matches!(to_waypoint_file(&[], &params), Err(Error::EmptyPath)));
        assert!(matches!(
            export_itm_path(&MissionPath::new(vec![]), &params),
            Err(Error::EmptyPath)
        ));
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(matches!(FlightParameters::new(0.0, 6.0), Err(Error::InvalidParameter(_))));
        assert!(matches!(FlightParameters::new(8.0, -1.0), Err(Error::InvalidParameter(_))));
        assert!(matches!(FlightParameters::new(f64::NAN, 6.0), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_export_itm_path() {
        let path = MissionPath::new(vec![
            ProjectedPoint::new(179_600.0, 665_800.0),
            ProjectedPoint::new(179_650.0, 665_850.0),
        ]);
        let text = export_itm_path(&path, &FlightParameters::default()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);

        let lat: f64 = lines[1].split(',').next().unwrap().parse().unwrap();
        assert!((lat - 32.08).abs() < 0.05, "lat {}", lat);
    }

    #[test]
    fn test_write_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("mission.csv");
        write_waypoint_file(&dest, &sample_path(), &FlightParameters::default()).unwrap();

        let written = std::fs::read_to_string(&dest).unwrap();
        let expected = to_waypoint_file(&sample_path(), &FlightParameters::default()).unwrap();
        assert_eq!(written, expected);
    }

    #[test]
    fn test_empty_path_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("mission.csv");
        assert!(write_waypoint_file(&dest, &[], &FlightParameters::default()).is_err());
        assert!(!dest.exists());
    }
}
