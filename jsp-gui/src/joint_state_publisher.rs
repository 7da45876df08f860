use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use eframe::egui;
use jsp::{
    Container, Element, ElementId, JointStatePublisher, JointStatePublisherConfig, PanelEvent,
    ParamClient, TopicPublisher,
};
use tracing::{debug, error};

use crate::Error;

const TEXT_INPUT_WIDTH: f32 = 80.0;
const MODEL_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Launches a window with one slider per joint of the robot description
/// served by `connection`, publishing joint states through it.
pub fn joint_state_publisher<C>(
    config: JointStatePublisherConfig,
    connection: C,
) -> Result<(), Error>
where
    C: ParamClient + TopicPublisher + 'static,
{
    let container = Arc::new(Mutex::new(Container::new(config.div_id.clone())));
    let publisher = JointStatePublisher::new(config, connection, &container);
    let app = JointStatePublisherApp {
        publisher,
        container,
        status: None,
    };

    // Should we expose some of the settings to the user?
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([400.0, 550.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Joint State Publisher",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )?;
    Ok(())
}

struct JointStatePublisherApp {
    publisher: JointStatePublisher,
    // Owned here so the publisher's weak reference stays valid while the window is open.
    container: Arc<Mutex<Container>>,
    status: Option<String>,
}

impl JointStatePublisherApp {
    fn report(&mut self, e: jsp::Error) {
        error!("{e}");
        self.status = Some(e.to_string());
    }
}

impl eframe::App for JointStatePublisherApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.publisher.is_ready() {
            match self.publisher.poll_model() {
                Ok(true) => self.status = None,
                Ok(false) => {}
                Err(e) => self.report(e),
            }
            ctx.request_repaint_after(MODEL_POLL_INTERVAL);
        }

        let ready = self.publisher.is_ready();
        let mut events = vec![];
        egui::TopBottomPanel::top("buttons").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.add_enabled(ready, egui::Button::new("Center")).clicked() {
                    events.push(PanelEvent::Center);
                }
                if ui.add_enabled(ready, egui::Button::new("Randomize")).clicked() {
                    events.push(PanelEvent::Randomize);
                }
                if !ready {
                    ui.label("Waiting for robot description...");
                }
            });
            if let Some(status) = &self.status {
                ui.colored_label(egui::Color32::RED, status);
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| match self.container.lock() {
                Ok(mut container) => draw_container(ui, &mut container, &mut events),
                Err(e) => error!("Failed to lock container: {e}"),
            });
        });

        for event in events {
            debug!(?event, "dispatch");
            match self.publisher.handle(event) {
                Ok(()) => self.status = None,
                Err(e) => self.report(e),
            }
        }
    }
}

/// Splits elements into the rows separated by line breaks.
fn rows(elements: &[Element]) -> Vec<Vec<(ElementId, &Element)>> {
    let mut rows = vec![];
    let mut row = vec![];
    for (id, element) in elements.iter().enumerate() {
        if *element == Element::LineBreak {
            rows.push(std::mem::take(&mut row));
        } else {
            row.push((id, element));
        }
    }
    if !row.is_empty() {
        rows.push(row);
    }
    rows
}

/// Like a range input's `change`: fires once when the pointer is released,
/// or on a keyboard change.
fn slider_committed(changed: bool, drag_stopped: bool, pointer_down: bool) -> bool {
    drag_stopped || (changed && !pointer_down)
}

fn draw_container(ui: &mut egui::Ui, container: &mut Container, events: &mut Vec<PanelEvent>) {
    let elements = container.elements().to_vec();
    for row in rows(&elements) {
        ui.horizontal(|ui| {
            for (id, element) in row {
                draw_element(ui, container, id, element, events);
            }
        });
    }
}

fn draw_element(
    ui: &mut egui::Ui,
    container: &mut Container,
    id: ElementId,
    element: &Element,
    events: &mut Vec<PanelEvent>,
) {
    match element {
        Element::Text(label) => {
            ui.label(label);
        }
        Element::TextInput { value, .. } => {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let mut text = value.clone();
                let response =
                    ui.add(egui::TextEdit::singleline(&mut text).desired_width(TEXT_INPUT_WIDTH));
                if response.changed() {
                    container.set_text(id, text);
                }
                if response.lost_focus() {
                    events.push(PanelEvent::TextCommitted(id));
                }
            });
        }
        Element::RangeInput {
            min,
            max,
            step,
            value,
            ..
        } => {
            let width = ui.available_width();
            ui.spacing_mut().slider_width = width;
            let mut position = *value;
            let response = ui.add(
                egui::Slider::new(&mut position, *min..=*max)
                    .step_by(*step)
                    .show_value(false),
            );
            if response.changed() {
                container.set_range_value(id, position);
            }
            let pointer_down = ui.input(|i| i.pointer.any_down());
            if slider_committed(response.changed(), response.drag_stopped(), pointer_down) {
                events.push(PanelEvent::SliderChanged(id));
            }
        }
        Element::LineBreak => {}
    }
}
