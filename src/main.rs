//! Command line front end for the mission pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skyops_mission::backend::{HttpBackend, PathFile};
use skyops_mission::config::Config;
use skyops_mission::export::{export_itm_path, FlightParameters};
use skyops_mission::overlay::{OverlayRequest, RasterImage};
use skyops_mission::planner::{MissionPlanner, SurveyImagery};
use skyops_mission::projection::{
    geo_to_projected, projected_to_geo, GeoPoint, PixelPoint, ProjectedPoint,
};
use skyops_mission::session::Event;
use skyops_mission::BoundingBox;

/// Drone survey mission tools for the Israeli Transverse Mercator grid
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert an ITM coordinate to WGS84
    ToWgs84 { x: f64, y: f64 },

    /// Convert a WGS84 coordinate to ITM
    ToItm { lat: f64, lon: f64 },

    /// Turn a backend path file into a Litchi mission CSV
    Export {
        /// Path file (`{"path": [...]}`, ITM)
        path_file: PathBuf,

        /// Output CSV
        #[arg(short, long, default_value = "mission.csv")]
        output: PathBuf,

        #[command(flatten)]
        flight: FlightArgs,
    },

    /// Draw markers and no-fly zones onto a PNG
    Overlay {
        /// Base image
        image: PathBuf,

        /// Overlay description (JSON)
        geometry: PathBuf,

        #[arg(short, long, default_value = "overlay.png")]
        output: PathBuf,
    },

    /// Submit a mission to the planning backend and export the result
    Plan {
        /// Satellite image of the area (PNG)
        #[arg(long)]
        satellite: PathBuf,

        /// Streets image of the area (PNG, same size)
        #[arg(long)]
        streets: PathBuf,

        /// Survey area corners in ITM: x1,y1,x2,y2
        #[arg(long, value_parser = parse_area)]
        area: BoundingBox,

        /// Takeoff pixel: x,y
        #[arg(long, value_parser = parse_pixel)]
        takeoff: PixelPoint,

        /// Landing pixel: x,y
        #[arg(long, value_parser = parse_pixel)]
        landing: PixelPoint,

        /// No-fly zone as pixel vertices x,y;x,y;x,y (repeatable)
        #[arg(long = "zone", value_parser = parse_zone)]
        zones: Vec<ZoneArg>,

        /// Backend URL (defaults to SKYOPS_BACKEND_URL)
        #[arg(long)]
        backend: Option<String>,

        #[arg(short, long, default_value = "mission.csv")]
        output: PathBuf,

        /// Also save the annotated result image here
        #[arg(long)]
        result_image: Option<PathBuf>,

        #[command(flatten)]
        flight: FlightArgs,
    },
}

#[derive(clap::Args, Debug)]
struct FlightArgs {
    /// Speed in m/s (defaults to SKYOPS_DEFAULT_SPEED)
    #[arg(long)]
    speed: Option<f64>,

    /// Altitude in metres (defaults to SKYOPS_DEFAULT_ALTITUDE)
    #[arg(long)]
    altitude: Option<f64>,
}

impl FlightArgs {
    fn resolve(&self, config: &Config) -> Result<FlightParameters> {
        Ok(FlightParameters::new(
            self.speed.unwrap_or(config.default_speed),
            self.altitude.unwrap_or(config.default_altitude),
        )?)
    }
}

fn parse_numbers(s: &str, sep: char, count: usize) -> std::result::Result<Vec<f64>, String> {
    let values: Vec<f64> = s
        .split(sep)
        .map(|part| part.trim().parse::<f64>().map_err(|e| format!("'{}': {}", part, e)))
        .collect::<std::result::Result<_, _>>()?;
    if values.len() != count {
        return Err(format!("expected {} numbers, got {}", count, values.len()));
    }
    Ok(values)
}

fn parse_pixel(s: &str) -> std::result::Result<PixelPoint, String> {
    let v = parse_numbers(s, ',', 2)?;
    Ok(PixelPoint::new(v[0], v[1]))
}

fn parse_area(s: &str) -> std::result::Result<BoundingBox, String> {
    let v = parse_numbers(s, ',', 4)?;
    Ok(BoundingBox::from_corners(v[0], v[1], v[2], v[3]))
}

/// Pixel vertices of one `--zone`
#[derive(Debug, Clone)]
struct ZoneArg(Vec<PixelPoint>);

fn parse_zone(s: &str) -> std::result::Result<ZoneArg, String> {
    s.split(';').map(parse_pixel).collect::<std::result::Result<_, _>>().map(ZoneArg)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("skyops_mission=info".parse()?),
        )
        .init();

    let config = Config::from_env();

    match Args::parse().command {
        Command::ToWgs84 { x, y } => {
            let geo = projected_to_geo(ProjectedPoint::new(x, y))?;
            println!("{:.8}, {:.8}", geo.lat, geo.lon);
        }
        Command::ToItm { lat, lon } => {
            let itm = geo_to_projected(GeoPoint::new(lat, lon))?;
            println!("{:.3}, {:.3}", itm.x, itm.y);
        }
        Command::Export {
            path_file,
            output,
            flight,
        } => {
            let params = flight.resolve(&config)?;
            let text = fs::read_to_string(&path_file)
                .with_context(|| format!("Failed to read {}", path_file.display()))?;
            let path = PathFile::parse(&text)?.into_mission_path();
            let csv = export_itm_path(&path, &params)?;
            fs::write(&output, csv)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("{} waypoints written to {}", path.len(), output.display());
        }
        Command::Overlay {
            image,
            geometry,
            output,
        } => {
            let base = RasterImage::decode(
                &fs::read(&image).with_context(|| format!("Failed to read {}", image.display()))?,
            )?;
            let request: OverlayRequest = serde_json::from_str(
                &fs::read_to_string(&geometry)
                    .with_context(|| format!("Failed to read {}", geometry.display()))?,
            )
            .context("Invalid overlay description")?;
            fs::write(&output, request.render(&base)?)
                .with_context(|| format!("Failed to write {}", output.display()))?;
        }
        Command::Plan {
            satellite,
            streets,
            area,
            takeoff,
            landing,
            zones,
            backend,
            output,
            result_image,
            flight,
        } => {
            let params = flight.resolve(&config)?;
            let imagery = SurveyImagery::new(load_png(&satellite)?, load_png(&streets)?)?;
            let backend = HttpBackend::new(
                backend.unwrap_or_else(|| config.backend_url.clone()),
                config.request_timeout,
            )?;
            tracing::info!(backend = backend.base_url(), "planning mission");

            let mut planner = MissionPlanner::new(backend);
            planner.dispatch(Event::DrawArea(area))?;
            planner.dispatch(Event::ConfirmArea)?;
            planner.load_imagery(imagery)?;
            for point in [takeoff, landing] {
                planner.dispatch(Event::Click(point))?;
                planner.dispatch(Event::Approve)?;
            }
            for zone in zones {
                planner.dispatch(Event::StartNoFlyZone)?;
                for vertex in zone.0 {
                    planner.dispatch(Event::Click(vertex))?;
                }
                planner.dispatch(Event::FinishNoFlyZone)?;
            }

            planner
                .dispatch(Event::Submit)
                .context("Backend did not produce a mission")?;

            if let Some(dest) = result_image {
                fs::write(&dest, planner.annotate_result()?)
                    .with_context(|| format!("Failed to write {}", dest.display()))?;
            }

            let csv = planner.export(&params)?;
            fs::write(&output, csv)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Mission written to {}", output.display());
        }
    }

    Ok(())
}

fn load_png(path: &Path) -> Result<RasterImage> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    RasterImage::decode(&bytes).with_context(|| format!("{} is not a PNG", path.display()))
}
