pub mod display;
pub mod runner;

pub use display::{DisplayRegistry, DisplayState};
pub use runner::OrreryRunner;

use std::cell::RefCell;

use js_sys::{Float32Array, Float64Array};
use orrery_core::{
    BodyCatalog, BodyId, CalendarDate, ElementsDescriptor, OrbitError, OrbitResult, OrbitalElements,
    OrreryConfig, TimeStep,
};
use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<OrreryRunner>> = const { RefCell::new(None) };
}

fn with_runner<R>(f: impl FnOnce(&mut OrreryRunner) -> R) -> Result<R, JsValue> {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let runner = borrow
            .as_mut()
            .ok_or_else(|| JsValue::from_str("orrery not initialized. Call orrery_init() first."))?;
        Ok(f(runner))
    })
}

fn to_js(err: OrbitError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Install logging and create the runner. An empty string uses the default config.
#[wasm_bindgen]
pub fn orrery_init(config_json: &str) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let config = if config_json.trim().is_empty() {
        OrreryConfig::default()
    } else {
        OrreryConfig::from_json(config_json).map_err(to_js)?
    };
    let now = orrery_core::julian_day_from_unix_millis(js_sys::Date::now());
    let runner = OrreryRunner::new(config, now).map_err(to_js)?;

    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(runner);
    });
    log::info!("orrery: initialized at JD {now:.5}");
    Ok(())
}

/// Replace the catalog. Returns the body count.
#[wasm_bindgen]
pub fn orrery_load_catalog(json: &str) -> Result<u32, JsValue> {
    with_runner(|r| -> OrbitResult<u32> {
        r.load_catalog(json)?;
        Ok(r.body_count())
    })?
    .map_err(to_js)
}

/// Replace the catalog with the eight built-in planets.
#[wasm_bindgen]
pub fn orrery_load_planets() -> Result<u32, JsValue> {
    with_runner(|r| -> OrbitResult<u32> {
        r.set_catalog(BodyCatalog::planets())?;
        Ok(r.body_count())
    })?
    .map_err(to_js)
}

#[wasm_bindgen]
pub fn orrery_tick(dt: f32) -> Result<(), JsValue> {
    with_runner(|r| r.tick(dt))
}

// ---- Clock control ----

#[wasm_bindgen]
pub fn orrery_set_month_step(months: i32) -> Result<(), JsValue> {
    with_runner(|r| r.set_time_step(TimeStep::Months(months)))?.map_err(to_js)
}

#[wasm_bindgen]
pub fn orrery_set_day_step(days: f64) -> Result<(), JsValue> {
    with_runner(|r| r.set_time_step(TimeStep::Days(days)))?.map_err(to_js)
}

/// Returns `true` when the clock is now paused.
#[wasm_bindgen]
pub fn orrery_toggle_pause() -> Result<bool, JsValue> {
    with_runner(|r| r.toggle_pause())
}

#[wasm_bindgen]
pub fn orrery_set_julian_day(jd: f64) -> Result<(), JsValue> {
    with_runner(|r| r.set_julian_day(jd))
}

#[wasm_bindgen]
pub fn orrery_julian_day() -> Result<f64, JsValue> {
    with_runner(|r| r.julian_day())
}

// ---- Data accessors ----

/// xyz per body, `get_body_count() * 3` floats. Null before init.
#[wasm_bindgen]
pub fn get_positions_ptr() -> *const f32 {
    with_runner(|r| r.positions_ptr()).unwrap_or(std::ptr::null())
}

/// One byte per body: bit 0 body visible, bit 1 label visible. Null before init.
#[wasm_bindgen]
pub fn get_visibility_ptr() -> *const u8 {
    with_runner(|r| r.visibility_ptr()).unwrap_or(std::ptr::null())
}

/// `[r, g, b, size]` per body, `get_body_count() * 4` floats. Null before init.
#[wasm_bindgen]
pub fn get_display_ptr() -> *const f32 {
    with_runner(|r| r.display_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_body_count() -> u32 {
    with_runner(|r| r.body_count()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_body_label(index: u32) -> Option<String> {
    with_runner(|r| r.catalog().bodies().get(index as usize).map(|b| b.label.clone()))
        .ok()
        .flatten()
}

/// Orbit ring of the body at `index` as flat xyz floats.
#[wasm_bindgen]
pub fn get_orbit_path(index: u32) -> Option<Float32Array> {
    with_runner(|r| {
        r.orbit_path(index as usize)
            .map(|path| Float32Array::from(path.to_f32_vec().as_slice()))
    })
    .ok()
    .flatten()
}

// ---- Display control ----

#[wasm_bindgen]
pub fn orrery_set_pha_only(pha_only: bool) -> Result<(), JsValue> {
    with_runner(|r| r.set_pha_only(pha_only))
}

#[wasm_bindgen]
pub fn orrery_set_labels_visible(visible: bool) -> Result<(), JsValue> {
    with_runner(|r| r.set_labels_visible(visible))
}

#[wasm_bindgen]
pub fn orrery_set_body_visible(id: u32, visible: bool) -> Result<(), JsValue> {
    with_runner(|r| r.set_body_visible(BodyId(id), visible))
}

#[wasm_bindgen]
pub fn orrery_set_body_color(id: u32, color: u32) -> Result<(), JsValue> {
    with_runner(|r| r.set_body_color(BodyId(id), color))
}

#[wasm_bindgen]
pub fn orrery_set_body_size(id: u32, size: f32) -> Result<(), JsValue> {
    with_runner(|r| r.set_body_size(BodyId(id), size))
}

// ---- Stateless helpers ----

#[wasm_bindgen]
pub fn to_julian_day(year: i32, month: i32, day: u32, hour: u32, minute: u32, second: f64) -> f64 {
    orrery_core::julian_day(&CalendarDate::ymd_hms(year, month, day, hour, minute, second))
}

#[wasm_bindgen]
pub fn julian_day_from_unix_millis(millis: f64) -> f64 {
    orrery_core::julian_day_from_unix_millis(millis)
}

/// Position `[x, y, z]` of one body at `jd`. Angles in degrees, mean motion
/// in degrees per day.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn compute_position(
    semi_major_axis: f64,
    eccentricity: f64,
    inclination: f64,
    longitude_of_ascending_node: f64,
    longitude_of_periapsis: f64,
    mean_motion: f64,
    mean_longitude_at_epoch: f64,
    reference_epoch: f64,
    jd: f64,
    unit_scale: f64,
) -> Result<Float64Array, JsValue> {
    let elements = ElementsDescriptor {
        semi_major_axis,
        eccentricity,
        inclination,
        longitude_of_ascending_node,
        longitude_of_periapsis,
        mean_motion,
        mean_longitude_at_epoch,
        reference_epoch,
    }
    .build()
    .map_err(to_js)?;
    let position = orrery_core::position_at_julian_day(&elements, jd, unit_scale);
    Ok(Float64Array::from(position.to_array().as_slice()))
}

/// Orbit ring for one body given as an elements JSON object, flat xyz.
#[wasm_bindgen]
pub fn generate_orbit_path(elements_json: &str, segments: u32, unit_scale: f64) -> Result<Float64Array, JsValue> {
    let elements = OrbitalElements::from_json(elements_json).map_err(to_js)?;
    let path = orrery_core::generate_orbit_path(&elements, segments, unit_scale).map_err(to_js)?;
    Ok(Float64Array::from(path.to_f64_vec().as_slice()))
}

