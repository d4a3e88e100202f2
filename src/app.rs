use eframe::egui;

use crate::config::Config;
use crate::error::AnnotateError;
use crate::export::FileWriter;
use crate::selection::{Button, InteractionMode, PointerEvent};
use crate::session::{Command, Outcome, Session};

const OVERLAY_COLOR: egui::Color32 = egui::Color32::from_rgb(0, 255, 0);
const OVERLAY_THICKNESS: f32 = 2.0;

// ── Input mapping ──────────────────────────────────────────────────────────

/// `.` advances, class keys export, space zooms, backspace resets, escape quits.
pub fn command_for(key: egui::Key, config: &Config) -> Option<Command> {
    match key {
        egui::Key::Period => Some(Command::Advance),
        egui::Key::Space => Some(Command::Zoom),
        egui::Key::Backspace => Some(Command::Reset),
        egui::Key::Escape => Some(Command::Quit),
        other => {
            let mut chars = other.name().chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => config.class_for(c).map(Command::Export),
                _ => None,
            }
        }
    }
}

/// Screen position (points) to display-image pixels.
fn to_pixels(pos: egui::Pos2, origin: egui::Pos2, pixels_per_point: f32) -> (i32, i32) {
    let rel = (pos - origin) * pixels_per_point;
    (rel.x.floor() as i32, rel.y.floor() as i32)
}

fn pointer_event(event: &egui::Event, origin: egui::Pos2, ppp: f32) -> Option<PointerEvent> {
    match event {
        egui::Event::PointerMoved(pos) => {
            let (x, y) = to_pixels(*pos, origin, ppp);
            Some(PointerEvent::Move { x, y })
        }
        egui::Event::PointerButton {
            pos,
            button,
            pressed,
            ..
        } => {
            let button = match button {
                egui::PointerButton::Primary => Button::Primary,
                egui::PointerButton::Secondary => Button::Secondary,
                _ => return None,
            };
            if *pressed {
                let (x, y) = to_pixels(*pos, origin, ppp);
                Some(PointerEvent::Press { button, x, y })
            } else {
                Some(PointerEvent::Release { button })
            }
        }
        _ => None,
    }
}

// ── App ─────────────────────────────────────────────────────────────────────

pub struct AnnotatorApp {
    session: Session,
    writer: FileWriter,
    texture: Option<egui::TextureHandle>,
    texture_revision: u64,
    status: String,
    title: String,
    closing: bool,
}

impl AnnotatorApp {
    pub fn new(session: Session) -> Self {
        let title = Self::title_for(&session);
        Self {
            session,
            writer: FileWriter,
            texture: None,
            texture_revision: 0,
            status: String::from("Ready"),
            title,
            closing: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    fn title_for(session: &Session) -> String {
        let (position, total) = session.progress();
        format!("{} ({position}/{total})", session.view().file_name())
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        let view = self.session.view();
        if self.texture.is_some() && self.texture_revision == view.revision() {
            return;
        }
        let rgba = view.display().to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let pixels = rgba.as_flat_samples();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
        match self.texture.as_mut() {
            Some(texture) => texture.set(color_image, egui::TextureOptions::LINEAR),
            None => {
                self.texture = Some(ctx.load_texture(
                    "crop-annotate-display",
                    color_image,
                    egui::TextureOptions::LINEAR,
                ))
            }
        }
        self.texture_revision = view.revision();
    }

    fn close(&mut self, ctx: &egui::Context) {
        self.closing = true;
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    fn run_command(&mut self, ctx: &egui::Context, command: Command) {
        match self.session.apply(command, &mut self.writer) {
            Ok(Outcome::Redraw) => {}
            Ok(Outcome::Exported(path)) => {
                self.status = format!("Saved {}", path.display());
            }
            Ok(Outcome::Loaded) => {
                self.texture = None;
                self.title = Self::title_for(&self.session);
                ctx.send_viewport_cmd(egui::ViewportCommand::Title(self.title.clone()));
                self.status = String::from("Ready");
            }
            Ok(Outcome::Finished) => {
                log::info!("All images have been processed.");
                self.close(ctx);
            }
            Ok(Outcome::Quit) => self.close(ctx),
            Err(err @ (AnnotateError::NoSelection | AnnotateError::AlreadyZoomed)) => {
                log::debug!("Ignoring {command:?}: {err}");
            }
            Err(err) => {
                log::warn!("{command:?} failed: {err}");
                self.status = err.to_string();
            }
        }
    }

    fn draw_selection(&self, painter: &egui::Painter, origin: egui::Pos2, ppp: f32) {
        let Some(selection) = self.session.view().selection() else {
            return;
        };
        let (min, max) = selection.normalized();
        let to_screen = |x: u32, y: u32| origin + egui::vec2(x as f32, y as f32) / ppp;
        let rect = egui::Rect::from_min_max(to_screen(min.x, min.y), to_screen(max.x, max.y));
        painter.rect_stroke(
            rect,
            0.0,
            egui::Stroke::new(OVERLAY_THICKNESS, OVERLAY_COLOR),
            egui::StrokeKind::Middle,
        );
    }
}

// ── eframe App impl ────────────────────────────────────────────────────────

impl eframe::App for AnnotatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.closing {
            return;
        }

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            let view = self.session.view();
            ui.horizontal(|ui| {
                ui.label(&self.status);
                ui.separator();
                ui.label(format!("Scale: {:.0}%", view.transform().scale.factor() * 100.0));
                if let Some(selection) = view.selection() {
                    let region = view.transform().to_original_rect(selection);
                    ui.separator();
                    ui.label(format!("Square: {}px at ({}, {})", region.width, region.x, region.y));
                }
                match view.selection_mode() {
                    InteractionMode::Drawing { .. } => {
                        ui.separator();
                        ui.label("Drawing");
                    }
                    InteractionMode::Moving => {
                        ui.separator();
                        ui.label("Moving");
                    }
                    InteractionMode::Idle => {}
                }
                if view.is_zoomed() {
                    ui.separator();
                    ui.label("Zoomed");
                }
            });
        });

        let ppp = ctx.pixels_per_point();
        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(egui::Color32::from_gray(40)))
            .show(ctx, |ui| {
                let origin = ui.available_rect_before_wrap().min;

                // Events are applied in arrival order, one at a time.
                let events = ctx.input(|i| i.events.clone());
                for event in &events {
                    if self.closing {
                        break;
                    }
                    if let egui::Event::Key {
                        key,
                        pressed: true,
                        repeat: false,
                        ..
                    } = event
                    {
                        if let Some(command) = command_for(*key, self.session.config()) {
                            self.run_command(ctx, command);
                        }
                    } else if let Some(pointer) = pointer_event(event, origin, ppp) {
                        self.session.pointer(pointer);
                    }
                }
                if self.closing {
                    return;
                }

                // Laid out after the events so a zoom shows up in this frame.
                let display = self.session.view().display();
                let size = egui::vec2(display.width() as f32, display.height() as f32) / ppp;
                let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());

                self.ensure_texture(ctx);
                if let Some(ref texture) = self.texture {
                    painter.image(
                        texture.id(),
                        response.rect,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );
                }
                self.draw_selection(&painter, response.rect.min, ppp);
            });
    }
}
