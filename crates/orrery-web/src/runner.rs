use orrery_core::{
    BodyCatalog, BodyId, FixedTimestep, OrbitPath, OrbitResult, OrreryConfig, SimulationClock,
    TimeStep,
};

use crate::display::DisplayRegistry;

/// Owns the animated orrery state behind the wasm exports.
///
/// `lib.rs` keeps one in a `thread_local!` and exports free functions via
/// `#[wasm_bindgen]` that forward to it.
pub struct OrreryRunner {
    config: OrreryConfig,
    catalog: BodyCatalog,
    clock: SimulationClock,
    timestep: FixedTimestep,
    display: DisplayRegistry,
    /// One ring per body, catalog order. Rebuilt when the catalog changes.
    orbit_paths: Vec<OrbitPath>,
    /// Flat xyz per body for direct buffer reads.
    positions: Vec<f32>,
    visibility: Vec<u8>,
    /// `[r, g, b, size]` per body. Rebuilt when display state changes.
    display_floats: Vec<f32>,
}

impl OrreryRunner {
    /// `wall_clock_jd` seeds the clock when the config has no start day.
    /// Fails when `config` does not validate.
    pub fn new(config: OrreryConfig, wall_clock_jd: f64) -> OrbitResult<Self> {
        config.validate()?;
        let mut clock = SimulationClock::new(config.start_julian_day.unwrap_or(wall_clock_jd));
        clock.set_step(config.time_step);

        Ok(Self {
            timestep: FixedTimestep::new(config.fixed_dt),
            config,
            catalog: BodyCatalog::new(),
            clock,
            display: DisplayRegistry::new(),
            orbit_paths: Vec::new(),
            positions: Vec::new(),
            visibility: Vec::new(),
            display_floats: Vec::new(),
        })
    }

    /// Replace the catalog and rebuild every ring.
    pub fn set_catalog(&mut self, catalog: BodyCatalog) -> OrbitResult<()> {
        let paths = catalog.orbit_paths(
            self.config.orbit_segments,
            self.config.unit_scale,
            self.config.path_solver,
        )?;
        log::info!(
            "orrery: {} bodies, {} points per ring",
            catalog.len(),
            self.config.orbit_segments + 1
        );
        self.catalog = catalog;
        self.orbit_paths = paths;
        self.display.retain_catalog(&self.catalog);
        self.refresh();
        self.refresh_display();
        Ok(())
    }

    pub fn load_catalog(&mut self, json: &str) -> OrbitResult<()> {
        let catalog = BodyCatalog::from_json(json)?;
        self.set_catalog(catalog)
    }

    /// Run one frame: advance the clock by however many fixed ticks fit in
    /// `dt` seconds, then refresh the buffers.
    pub fn tick(&mut self, dt: f32) {
        let steps = self.timestep.accumulate(dt);
        for _ in 0..steps {
            self.clock.tick();
        }
        self.refresh();
    }

    /// Recompute positions and visibility for the current clock reading.
    pub fn refresh(&mut self) {
        let positions = self.catalog.positions_at_with(
            self.clock.now(),
            self.config.unit_scale,
            self.config.position_solver,
        );
        self.positions.clear();
        self.positions
            .extend(positions.iter().flat_map(|p| p.as_vec3().to_array()));
        self.display.write_visibility_flags(&self.catalog, &mut self.visibility);
    }

    fn refresh_display(&mut self) {
        self.display.write_visibility_flags(&self.catalog, &mut self.visibility);
        self.display
            .write_display_floats(&self.catalog, &mut self.display_floats);
    }

    // ---- Clock control ----

    pub fn set_time_step(&mut self, step: TimeStep) -> OrbitResult<()> {
        step.validate()?;
        self.clock.set_step(step);
        Ok(())
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.clock.toggle_pause()
    }

    pub fn set_julian_day(&mut self, jd: f64) {
        self.clock.set_julian_day(jd);
        self.refresh();
    }

    pub fn julian_day(&self) -> f64 {
        self.clock.now()
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    // ---- Display control ----

    pub fn display(&self) -> &DisplayRegistry {
        &self.display
    }

    pub fn set_pha_only(&mut self, pha_only: bool) {
        self.display.set_pha_only(pha_only);
        self.refresh_display();
    }

    pub fn set_body_visible(&mut self, id: BodyId, visible: bool) {
        self.display.set_visible(id, visible);
        self.refresh_display();
    }

    pub fn set_labels_visible(&mut self, visible: bool) {
        self.display.set_all_labels_visible(&self.catalog, visible);
        self.refresh_display();
    }

    /// `color` is 0xRRGGBB.
    pub fn set_body_color(&mut self, id: BodyId, color: u32) {
        self.display.set_color(id, color);
        self.refresh_display();
    }

    pub fn set_body_size(&mut self, id: BodyId, size: f32) {
        self.display.set_size(id, size);
        self.refresh_display();
    }

    // ---- Buffer accessors ----

    pub fn catalog(&self) -> &BodyCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &OrreryConfig {
        &self.config
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn positions_ptr(&self) -> *const f32 {
        self.positions.as_ptr()
    }

    pub fn visibility_ptr(&self) -> *const u8 {
        self.visibility.as_ptr()
    }

    /// `[r, g, b, size]` per body, catalog order.
    pub fn display_floats(&self) -> &[f32] {
        &self.display_floats
    }

    pub fn display_ptr(&self) -> *const f32 {
        self.display_floats.as_ptr()
    }

    pub fn body_count(&self) -> u32 {
        self.catalog.len() as u32
    }

    pub fn orbit_path(&self, index: usize) -> Option<&OrbitPath> {
        self.orbit_paths.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayState;
    use orrery_core::{position_at_julian_day, OrbitError, JD_J2000};

    fn planets_runner(config: OrreryConfig) -> OrreryRunner {
        let mut runner = OrreryRunner::new(config, JD_J2000).unwrap();
        runner.set_catalog(BodyCatalog::planets()).unwrap();
        runner
    }

    #[test]
    fn start_day_prefers_config() {
        let runner = OrreryRunner::new(OrreryConfig::default(), 2460000.5).unwrap();
        assert_eq!(runner.julian_day(), 2460000.5);

        let config = OrreryConfig {
            start_julian_day: Some(JD_J2000),
            ..OrreryConfig::default()
        };
        assert_eq!(OrreryRunner::new(config, 2460000.5).unwrap().julian_day(), JD_J2000);
    }

    #[test]
    fn catalog_builds_rings_and_positions() {
        let runner = planets_runner(OrreryConfig::default());
        assert_eq!(runner.body_count(), 8);
        assert_eq!(runner.positions().len(), 8 * 3);
        assert_eq!(runner.orbit_path(0).unwrap().len(), 129);
        assert!(runner.orbit_path(8).is_none());

        let earth = runner.catalog().find("earth").unwrap();
        let expected = position_at_julian_day(&earth.elements, JD_J2000, 1000.0);
        let i = 3 * 2;
        assert_eq!(&runner.positions()[i..i + 3], &expected.as_vec3().to_array());
    }

    #[test]
    fn tick_advances_fixed_steps() {
        let mut runner = planets_runner(OrreryConfig::default());
        runner.tick(1.0 / 60.0);
        assert_eq!(runner.julian_day(), JD_J2000 + 1.0);

        runner.toggle_pause();
        runner.tick(1.0 / 60.0);
        assert_eq!(runner.julian_day(), JD_J2000 + 1.0);
    }

    #[test]
    fn month_step_moves_calendar() {
        let mut runner = planets_runner(OrreryConfig::default());
        runner.set_time_step(TimeStep::Months(1)).unwrap();
        runner.tick(1.0 / 60.0);
        let date = runner.clock().calendar_date();
        assert_eq!((date.year, date.month, date.day, date.hour), (2000, 2, 1, 12));
    }

    #[test]
    fn bad_catalog_keeps_previous_state() {
        let mut runner = planets_runner(OrreryConfig::default());
        assert!(runner.load_catalog(r#"[{ "label": "x", "a": -1.0, "e": 0.1, "n": 1.0 }]"#).is_err());
        assert_eq!(runner.body_count(), 8);
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let zero_segments = OrreryConfig {
            orbit_segments: 0,
            ..OrreryConfig::default()
        };
        assert!(OrreryRunner::new(zero_segments, JD_J2000).is_err());

        for fixed_dt in [-0.5, 0.0, f32::NAN] {
            let config = OrreryConfig {
                fixed_dt,
                ..OrreryConfig::default()
            };
            assert!(
                matches!(
                    OrreryRunner::new(config, JD_J2000),
                    Err(OrbitError::InvalidConfig { field: "fixedDt", .. })
                ),
                "fixed_dt {fixed_dt} accepted"
            );
        }
    }

    #[test]
    fn non_finite_day_step_keeps_previous_step() {
        let mut runner = planets_runner(OrreryConfig::default());
        assert!(runner.set_time_step(TimeStep::Days(f64::NAN)).is_err());
        runner.tick(1.0 / 60.0);
        assert_eq!(runner.julian_day(), JD_J2000 + 1.0);
    }

    #[test]
    fn pha_filter_updates_visibility_buffer() {
        let mut runner = planets_runner(OrreryConfig::default());
        runner.set_pha_only(true);
        // planets are never hazardous
        assert!(runner.visibility.iter().all(|&flags| flags == 0));
        runner.set_pha_only(false);
        runner.set_labels_visible(false);
        assert!(runner.visibility.iter().all(|&flags| flags == 0b01));
    }

    #[test]
    fn color_and_size_reach_display_buffer() {
        let mut runner = planets_runner(OrreryConfig::default());
        assert_eq!(runner.display_floats().len(), 8 * DisplayState::FLOATS);

        let mars = runner.catalog().find("mars").unwrap().id;
        runner.set_body_color(mars, 0xff0000);
        runner.set_body_size(mars, 6.0);

        let i = 3 * DisplayState::FLOATS;
        assert_eq!(&runner.display_floats()[i..i + 4], &[1.0, 0.0, 0.0, 6.0]);
        // other bodies keep the defaults
        assert_eq!(&runner.display_floats()[..4], &[1.0, 1.0, 1.0, 1.0]);
        assert_eq!(runner.display().get(mars).size, 6.0);
    }

    #[test]
    fn buffers_are_reused_across_frames() {
        let mut runner = planets_runner(OrreryConfig::default());
        let positions = runner.positions_ptr();
        let visibility = runner.visibility_ptr();
        let display = runner.display_ptr();

        for _ in 0..5 {
            runner.tick(1.0 / 60.0);
        }
        runner.set_pha_only(true);
        runner.set_body_color(BodyId(0), 0x00ff00);

        assert_eq!(runner.positions_ptr(), positions);
        assert_eq!(runner.visibility_ptr(), visibility);
        assert_eq!(runner.display_ptr(), display);
    }
}
