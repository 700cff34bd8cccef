use crate::model::{AlertRecord, Overlay};
use crate::render::scene::{MapMarker, MapScene};

/// Imperative operations understood by a map widget.
#[derive(Debug, Clone, PartialEq)]
pub enum MapCommand {
    SetView { lat: f64, lon: f64, zoom: u8 },
    AddMarker { lat: f64, lon: f64, label: String },
    AddMarkersToAlerts(Vec<AlertRecord>),
    ClearAlerts,
    SetImageOverlays(Vec<Overlay>),
    ToggleOverlays(bool),
    ClearOverlays,
    ClearVessels,
    ClearDebris,
    ClearMarkers,
}

/// A live map widget. Implemented by whatever draws the map.
pub trait MapRenderer {
    fn set_view(&mut self, lat: f64, lon: f64, zoom: u8);
    fn add_marker(&mut self, lat: f64, lon: f64, label: &str);
    /// Replaces the alert marker layer.
    fn add_markers_to_alerts(&mut self, records: &[AlertRecord]);
    fn clear_alerts(&mut self);
    /// Replaces every image overlay.
    fn set_image_overlays(&mut self, overlays: &[Overlay]);
    fn toggle_overlays(&mut self, visible: bool);
    fn clear_overlays(&mut self);
    fn clear_vessels(&mut self);
    fn clear_debris(&mut self);
    fn clear_markers(&mut self);
}

/// Commands that take a renderer showing `previous` to showing `next`.
pub fn reconcile(previous: &MapScene, next: &MapScene) -> Vec<MapCommand> {
    let mut commands = Vec::new();

    if previous.view != next.view {
        commands.push(MapCommand::SetView {
            lat: next.view.lat,
            lon: next.view.lon,
            zoom: next.view.zoom,
        });
    }

    reconcile_markers(&previous.markers, &next.markers, &mut commands);

    if previous.alerts != next.alerts {
        if next.alerts.is_empty() {
            commands.push(MapCommand::ClearAlerts);
        } else {
            commands.push(MapCommand::AddMarkersToAlerts(next.alerts.clone()));
        }
    }

    if previous.mode != next.mode && next.mode.shows_overlays() {
        commands.push(MapCommand::ClearVessels);
        commands.push(MapCommand::ClearDebris);
    }

    // Hidden overlays keep whatever the renderer last received, so showing
    // them again always replaces that set.
    let revealed = next.overlays_visible && !previous.overlays_visible;
    if next.overlays_visible && (revealed || previous.overlays != next.overlays) {
        if next.overlays.is_empty() {
            commands.push(MapCommand::ClearOverlays);
        } else {
            commands.push(MapCommand::SetImageOverlays(next.overlays.clone()));
        }
    }
    if previous.overlays_visible != next.overlays_visible {
        commands.push(MapCommand::ToggleOverlays(next.overlays_visible));
    }

    commands
}

fn reconcile_markers(previous: &[MapMarker], next: &[MapMarker], commands: &mut Vec<MapCommand>) {
    if previous == next {
        return;
    }
    let appended = next.len() >= previous.len() && next[..previous.len()] == *previous;
    let fresh = if appended {
        &next[previous.len()..]
    } else {
        commands.push(MapCommand::ClearMarkers);
        next
    };
    commands.extend(fresh.iter().map(|marker| MapCommand::AddMarker {
        lat: marker.lat,
        lon: marker.lon,
        label: marker.label.clone(),
    }));
}

pub fn apply(renderer: &mut dyn MapRenderer, commands: &[MapCommand]) {
    for command in commands {
        match command {
            MapCommand::SetView { lat, lon, zoom } => renderer.set_view(*lat, *lon, *zoom),
            MapCommand::AddMarker { lat, lon, label } => renderer.add_marker(*lat, *lon, label),
            MapCommand::AddMarkersToAlerts(records) => renderer.add_markers_to_alerts(records),
            MapCommand::ClearAlerts => renderer.clear_alerts(),
            MapCommand::SetImageOverlays(overlays) => renderer.set_image_overlays(overlays),
            MapCommand::ToggleOverlays(visible) => renderer.toggle_overlays(*visible),
            MapCommand::ClearOverlays => renderer.clear_overlays(),
            MapCommand::ClearVessels => renderer.clear_vessels(),
            MapCommand::ClearDebris => renderer.clear_debris(),
            MapCommand::ClearMarkers => renderer.clear_markers(),
        }
    }
}

/// Remembers the last scene handed to a renderer and sends only the diff.
#[derive(Debug, Default)]
pub struct SceneReconciler {
    last: MapScene,
}

impl SceneReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, next: &MapScene) -> Vec<MapCommand> {
        let commands = reconcile(&self.last, next);
        self.last = next.clone();
        commands
    }

    pub fn render(&mut self, next: &MapScene, renderer: &mut dyn MapRenderer) -> usize {
        let commands = self.update(next);
        apply(renderer, &commands);
        commands.len()
    }
}
