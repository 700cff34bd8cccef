use aquacore::model::{AlertRecord, DetectionMode, Overlay, SearchInput};
use aquacore::render::{MapMarker, MapRenderer, MapScene, MapView, SceneReconciler};
use iced::{
    mouse, time,
    widget::{
        button,
        canvas::{self, Canvas, Frame, Geometry, Path, Stroke},
        column, row, scrollable, text, text_input, Column, Container,
    },
    Alignment, Color, Element, Length, Point, Rectangle, Renderer, Size, Subscription, Task,
    Theme,
};
use serde::Serialize;
use std::time::Duration;

const BRIDGE_URL: &str = "http://127.0.0.1:9000";

fn main() -> iced::Result {
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Visualizer) -> String {
    "AquaSentinel Map".into()
}

fn application_subscription(_: &Visualizer) -> Subscription<Message> {
    time::every(Duration::from_secs(1)).map(|_| Message::Tick)
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

struct Visualizer {
    scene: Option<MapScene>,
    reconciler: SceneReconciler,
    layers: MapLayers,
    search: String,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
    SceneFetched(Result<MapScene, String>),
    SearchChanged(String),
    SubmitSearch,
    ModeSelected(DetectionMode),
    StartMonitoring,
    StepFrame(&'static str),
    ResetView,
    ResetAlerts,
    ActionDone(Result<String, String>),
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        (
            Visualizer {
                scene: None,
                reconciler: SceneReconciler::new(),
                layers: MapLayers::default(),
                search: String::new(),
                status: "Waiting for monitor bridge...".into(),
                history: Vec::new(),
            },
            Task::perform(fetch_scene(), Message::SceneFetched),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => Task::perform(fetch_scene(), Message::SceneFetched),
            Message::SceneFetched(Ok(scene)) => {
                let revision_changed = state
                    .scene
                    .as_ref()
                    .map_or(true, |current| current.revision != scene.revision);
                if revision_changed {
                    let applied = state.reconciler.render(&scene, &mut state.layers);
                    if applied > 0 {
                        state.push_history(format!(
                            "Scene r{}: {} map updates",
                            scene.revision, applied
                        ));
                    }
                }
                state.status = scene_status(&scene);
                state.scene = Some(scene);
                Task::none()
            }
            Message::SceneFetched(Err(err)) => {
                state.status = format!("Bridge error: {err}");
                Task::none()
            }
            Message::SearchChanged(value) => {
                state.search = value;
                Task::none()
            }
            Message::SubmitSearch => {
                let query = state.search.trim().to_string();
                if query.is_empty() {
                    return Task::none();
                }
                state.push_history(format!("Search: {query}"));
                Task::perform(
                    post_action("search", SearchInput::text(query)),
                    Message::ActionDone,
                )
            }
            Message::ModeSelected(mode) => Task::perform(
                post_action("mode", serde_json::json!({ "mode": mode })),
                Message::ActionDone,
            ),
            Message::StartMonitoring => {
                state.push_history("Time series requested".into());
                Task::perform(post_action("monitor", ()), Message::ActionDone)
            }
            Message::StepFrame(step) => Task::perform(
                post_action("frame", serde_json::json!({ "step": step })),
                Message::ActionDone,
            ),
            Message::ResetView => Task::perform(post_action("view/reset", ()), Message::ActionDone),
            Message::ResetAlerts => {
                state.push_history("Alerts reset".into());
                Task::perform(post_action("alerts/reset", ()), Message::ActionDone)
            }
            Message::ActionDone(Ok(_)) => Task::perform(fetch_scene(), Message::SceneFetched),
            Message::ActionDone(Err(err)) => {
                state.status = format!("Action failed: {err}");
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let scene = state.scene.clone().unwrap_or_default();

        let selected = match &scene.selected_location {
            Some(location) => text(format!("Selected: {}", location.name)).size(14),
            None => text("No location selected").size(14),
        };

        let monitor_label = if scene.monitoring {
            "Loading Time Series..."
        } else {
            "Time Series"
        };

        let controls_column = column![
            text("AquaSentinel Map").size(26),
            selected,
            row![
                text_input("City name or lat,lon (e.g. 15.0,-85.0)", &state.search)
                    .on_input(Message::SearchChanged)
                    .on_submit(Message::SubmitSearch)
                    .padding(6),
                button("Go").on_press(Message::SubmitSearch).padding(6),
            ]
            .spacing(6),
            text("Detection mode").size(16),
            mode_button("Map view only", DetectionMode::None, scene.mode),
            mode_button("Ship overlay", DetectionMode::Ships, scene.mode),
            mode_button("Debris overlay", DetectionMode::Debris, scene.mode),
            mode_button("Distance overlay", DetectionMode::Distance, scene.mode),
            row![
                button(monitor_label)
                    .on_press_maybe(scene.can_monitor().then_some(Message::StartMonitoring))
                    .padding(8),
                button("Reset").on_press(Message::ResetView).padding(8),
            ]
            .spacing(8),
            button("Clear alerts")
                .on_press_maybe((!scene.alerts.is_empty()).then_some(Message::ResetAlerts))
                .padding(8),
            text(&state.status).size(14),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(360.0));

        let timeline_header = match &scene.frame {
            Some(frame) => text(format!(
                "T{}/{}  {}  ({} patches)",
                frame.index + 1,
                frame.count,
                frame.timestamp,
                frame.patch_count
            ))
            .size(16),
            None => text("No time series yet").size(16),
        };
        let (has_previous, has_next) = scene
            .frame
            .as_ref()
            .map(|frame| (frame.index > 0, frame.index + 1 < frame.count))
            .unwrap_or((false, false));

        let map_canvas = Canvas::new(MapCanvas {
            layers: state.layers.clone(),
            mode: scene.mode,
        })
        .width(Length::Fill)
        .height(Length::Fixed(420.0));

        let timeline_grid = scene.timeline.chunks(4).fold(
            Column::new().spacing(2),
            |grid, cells| {
                let line = cells
                    .iter()
                    .map(|cell| match cell {
                        Some(tile) if tile.is_alert => format!("[{}!]", tile.patch_id),
                        Some(tile) => format!("[{}]", tile.patch_id),
                        None => "[ -- ]".to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(" ");
                grid.push(text(line).size(12))
            },
        );

        let alert_entries = if scene.alerts.is_empty() {
            Column::new().push(text("No alerts yet").size(12))
        } else {
            scene.alerts.iter().rev().take(12).fold(
                Column::new().spacing(4),
                |col, alert| {
                    col.push(
                        text(format!(
                            "{} | {:.4}, {:.4} | from {:.4}, {:.4}",
                            alert.timestamp,
                            alert.lat,
                            alert.lng,
                            alert.base_location_lat,
                            alert.base_location_lon
                        ))
                        .size(12),
                    )
                },
            )
        };

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let map_column = column![
            row![
                timeline_header,
                button("<")
                    .on_press_maybe(has_previous.then_some(Message::StepFrame("previous")))
                    .padding(4),
                button(">")
                    .on_press_maybe(has_next.then_some(Message::StepFrame("next")))
                    .padding(4),
            ]
            .spacing(8)
            .align_y(Alignment::Center),
            map_canvas,
            text("Timeline patches").size(16),
            Container::new(timeline_grid).padding(6),
            text(format!("Alerts ({})", scene.alerts.len())).size(16),
            Container::new(scrollable(alert_entries).height(Length::Fixed(120.0))).padding(6),
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(90.0))).padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fill);

        let layout = row![controls_column, map_column]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

fn mode_button(label: &str, mode: DetectionMode, current: DetectionMode) -> Element<'_, Message> {
    let marker = if mode == current { "(x)" } else { "( )" };
    button(text(format!("{marker} {label}")).size(14))
        .on_press(Message::ModeSelected(mode))
        .padding(4)
        .into()
}

fn scene_status(scene: &MapScene) -> String {
    if scene.monitoring {
        format!(
            "Monitoring... {} frames received",
            scene.frame.as_ref().map_or(0, |frame| frame.count)
        )
    } else {
        format!(
            "Scene r{}: {} alerts, {} overlays",
            scene.revision,
            scene.alerts.len(),
            scene.overlays.len()
        )
    }
}

async fn fetch_scene() -> Result<MapScene, String> {
    let response = reqwest::get(format!("{BRIDGE_URL}/scene"))
        .await
        .map_err(|e| e.to_string())?;
    response.json::<MapScene>().await.map_err(|e| e.to_string())
}

async fn post_action<T: Serialize>(path: &str, body: T) -> Result<String, String> {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{BRIDGE_URL}/{path}"))
        .json(&body)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    let status = response.status();
    let text = response.text().await.unwrap_or_else(|_| "".into());
    if status.is_success() {
        Ok(text)
    } else {
        Err(format!("{}: {}", status, text))
    }
}

/// What this window has drawn so far, kept in sync through [`SceneReconciler`].
#[derive(Debug, Clone, Default)]
struct MapLayers {
    view: MapView,
    markers: Vec<MapMarker>,
    alerts: Vec<AlertRecord>,
    overlays: Vec<Overlay>,
    overlays_visible: bool,
}

impl MapRenderer for MapLayers {
    fn set_view(&mut self, lat: f64, lon: f64, zoom: u8) {
        self.view = MapView { lat, lon, zoom };
    }

    fn add_marker(&mut self, lat: f64, lon: f64, label: &str) {
        self.markers.push(MapMarker {
            lat,
            lon,
            label: label.to_string(),
        });
    }

    fn add_markers_to_alerts(&mut self, records: &[AlertRecord]) {
        self.alerts = records.to_vec();
    }

    fn clear_alerts(&mut self) {
        self.alerts.clear();
    }

    fn set_image_overlays(&mut self, overlays: &[Overlay]) {
        self.overlays = overlays.to_vec();
    }

    fn toggle_overlays(&mut self, visible: bool) {
        self.overlays_visible = visible;
    }

    fn clear_overlays(&mut self) {
        self.overlays.clear();
    }

    // This window has no live vessel or debris marker layers.
    fn clear_vessels(&mut self) {}

    fn clear_debris(&mut self) {}

    fn clear_markers(&mut self) {
        self.markers.clear();
    }
}

#[derive(Clone)]
struct MapCanvas {
    layers: MapLayers,
    mode: DetectionMode,
}

impl MapCanvas {
    /// Degrees of longitude across the canvas at the current zoom.
    fn span_deg(&self) -> f64 {
        (360.0 / 2f64.powi(self.layers.view.zoom as i32)).max(0.01)
    }

    fn project(&self, lat: f64, lon: f64, bounds: Size) -> Point {
        let span_lon = self.span_deg();
        let span_lat = span_lon * (bounds.height as f64 / bounds.width.max(1.0) as f64);
        let x = (lon - self.layers.view.lon) / span_lon * bounds.width as f64
            + bounds.width as f64 / 2.0;
        let y = bounds.height as f64 / 2.0
            - (lat - self.layers.view.lat) / span_lat * bounds.height as f64;
        Point::new(x as f32, y as f32)
    }

    fn overlay_color(&self) -> Color {
        match self.mode {
            DetectionMode::Ships => Color::from_rgb(0.18, 0.72, 0.89),
            DetectionMode::Debris => Color::from_rgb(0.55, 0.85, 0.3),
            _ => Color::from_rgb(0.75, 0.6, 0.95),
        }
    }
}

impl canvas::Program<Message> for MapCanvas {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let size = bounds.size();
        let mut frame = Frame::new(renderer, size);
        frame.fill_rectangle(Point::ORIGIN, size, Color::from_rgb(0.02, 0.05, 0.1));

        let center = Point::new(size.width / 2.0, size.height / 2.0);
        let axes = Path::new(|builder| {
            builder.move_to(Point::new(0.0, center.y));
            builder.line_to(Point::new(size.width, center.y));
            builder.move_to(Point::new(center.x, 0.0));
            builder.line_to(Point::new(center.x, size.height));
        });
        frame.stroke(
            &axes,
            Stroke::default()
                .with_color(Color::from_rgb(0.2, 0.25, 0.35))
                .with_width(1.0),
        );

        if self.layers.overlays_visible {
            let color = self.overlay_color();
            for overlay in &self.layers.overlays {
                let [south, west] = overlay.bounds.south_west();
                let [north, east] = overlay.bounds.north_east();
                let top_left = self.project(north, west, size);
                let bottom_right = self.project(south, east, size);
                let tile_size = Size::new(
                    (bottom_right.x - top_left.x).max(1.0),
                    (bottom_right.y - top_left.y).max(1.0),
                );
                frame.fill_rectangle(
                    top_left,
                    tile_size,
                    Color {
                        a: overlay.opacity * 0.35,
                        ..color
                    },
                );
                frame.stroke(
                    &Path::rectangle(top_left, tile_size),
                    Stroke::default().with_color(color).with_width(1.0),
                );
            }
        }

        for marker in &self.layers.markers {
            let point = self.project(marker.lat, marker.lon, size);
            let pin = Path::new(|builder| builder.circle(point, 5.0));
            frame.fill(&pin, Color::from_rgb(0.3, 0.55, 1.0));
        }

        for alert in &self.layers.alerts {
            let point = self.project(alert.lat, alert.lng, size);
            let dot = Path::new(|builder| builder.circle(point, 4.0));
            frame.fill(&dot, Color::from_rgb(0.95, 0.35, 0.2));
        }

        vec![frame.into_geometry()]
    }
}
