use crate::models::simulation::PoaIrradiance;

/// Angle between the sun vector and the panel normal (deg).
/// Azimuths clockwise from north, tilt from horizontal.
pub fn angle_of_incidence(solar_zenith: f64, solar_azimuth: f64, tilt: f64, surface_azimuth: f64) -> f64 {
    let z = solar_zenith.to_radians();
    let beta = tilt.to_radians();
    let az_diff = (solar_azimuth - surface_azimuth).to_radians();
    let cos_aoi = z.cos() * beta.cos() + z.sin() * beta.sin() * az_diff.cos();
    cos_aoi.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Transposes horizontal DNI/DHI/GHI onto the tilted array.
///
/// Sky diffuse uses the isotropic model; the ground-reflected term is only
/// present for a non-zero `albedo`.
#[allow(clippy::too_many_arguments)]
pub fn poa(
    dni: f64,
    dhi: f64,
    ghi: f64,
    solar_zenith: f64,
    solar_azimuth: f64,
    tilt: f64,
    surface_azimuth: f64,
    albedo: f64,
) -> PoaIrradiance {
    let aoi = angle_of_incidence(solar_zenith, solar_azimuth, tilt, surface_azimuth);
    let cos_tilt = tilt.to_radians().cos();

    // sun behind the panel plane or below the horizon contributes no beam
    let direct = if solar_zenith < 90.0 {
        (dni * aoi.to_radians().cos()).max(0.0)
    } else {
        0.0
    };
    let sky_diffuse = (dhi * (1.0 + cos_tilt) / 2.0).max(0.0);
    let ground_reflected = (ghi * albedo * (1.0 - cos_tilt) / 2.0).max(0.0);

    PoaIrradiance {
        direct,
        sky_diffuse,
        ground_reflected,
    }
}
