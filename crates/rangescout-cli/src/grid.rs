use rangescout_core::Coordinates;
use rangescout_discovery::{DiscoverySettings, Grid};

/// Prints the sweep lattice around `(lat, lng)` as a JSON array, centre first.
///
/// The radius is capped at the default discovery maximum so an oversized
/// request fails instead of scanning an unbounded lattice.
pub(crate) fn run_grid(lat: f64, lng: f64, radius_meters: u32, step_meters: u32) -> anyhow::Result<()> {
    let max_radius_meters = DiscoverySettings::default().max_radius_meters;
    if radius_meters > max_radius_meters {
        anyhow::bail!("radius {radius_meters} m exceeds the maximum of {max_radius_meters} m");
    }

    let center = Coordinates::new(lat, lng)?;
    let points: Vec<Coordinates> = Grid::new(center, radius_meters, step_meters)?.collect();
    tracing::info!(grid_points = points.len(), radius_meters, step_meters, "grid built");
    println!("{}", serde_json::to_string_pretty(&points)?);
    Ok(())
}
