//! Heads-up display: the fragment card, the help window and the status line.
//!
//! The engine reports through [`HudChannel`] and [`RouteLog`]; both write into
//! a shared [`HudModel`] that the ImGui pass reads back each frame.

use std::cell::RefCell;
use std::rc::Rc;

use imgui::Condition;

use crate::collaborators::{Navigator, OverlayAnchor, OverlaySink};

/// Characters per line on the fragment card.
const CARD_WRAP: usize = 32;
const CARD_ALPHA: f32 = 0.82;

const HELP_LINES: [(&str, &str); 6] = [
    ("Up / W", "move forward"),
    ("Down / S", "move back"),
    ("Drag", "rotate the vault"),
    ("Click", "shatter, then pick a shard"),
    ("G", "toggle distortion"),
    ("H", "toggle this help"),
];

#[derive(Debug, Clone, Default)]
pub struct HudModel {
    pub anchor: Option<OverlayAnchor>,
    pub help_visible: bool,
    pub distortion_enabled: bool,
    pub last_route: Option<String>,
}

pub type SharedHud = Rc<RefCell<HudModel>>;

pub fn shared_hud() -> SharedHud {
    Rc::new(RefCell::new(HudModel::default()))
}

/// Overlay sink that stores the latest anchor for the next ImGui frame.
pub struct HudChannel {
    model: SharedHud,
}

impl HudChannel {
    pub fn new(model: SharedHud) -> Self {
        Self { model }
    }
}

impl OverlaySink for HudChannel {
    fn update(&mut self, anchor: Option<&OverlayAnchor>) {
        self.model.borrow_mut().anchor = anchor.cloned();
    }
}

/// Navigator for the standalone viewer: there is no router, so the route is
/// logged and shown on the status line.
pub struct RouteLog {
    model: SharedHud,
}

impl RouteLog {
    pub fn new(model: SharedHud) -> Self {
        Self { model }
    }
}

impl Navigator for RouteLog {
    fn navigate(&mut self, path: &str) {
        log::info!("Navigate to {}", path);
        self.model.borrow_mut().last_route = Some(path.to_string());
    }
}

/// Draws every HUD element for one frame.
pub fn draw_hud(ui: &imgui::Ui, model: &HudModel) {
    if let Some(anchor) = &model.anchor {
        draw_card(ui, anchor);
    }
    if model.help_visible {
        draw_help(ui, model);
    }
    draw_status(ui, model);
}

fn draw_card(ui: &imgui::Ui, anchor: &OverlayAnchor) {
    let department = anchor.department;
    ui.window("##fragment_card")
        .position([anchor.x, anchor.y], Condition::Always)
        .position_pivot([0.5, 1.0])
        .bg_alpha(CARD_ALPHA)
        .no_decoration()
        .no_inputs()
        .always_auto_resize(true)
        .focus_on_appearing(false)
        .build(|| {
            ui.text_colored(department_color(department.color), department.code);
            ui.same_line();
            ui.text(department.title);
            ui.separator();
            for line in wrap_blurb(department.blurb, CARD_WRAP) {
                ui.text(line);
            }
            ui.text_disabled(department.path);
        });
}

pub fn draw_help(ui: &imgui::Ui, model: &HudModel) {
    ui.window("Controls")
        .position([16.0, 16.0], Condition::FirstUseEver)
        .always_auto_resize(true)
        .collapsible(false)
        .build(|| {
            for (keys, action) in HELP_LINES {
                ui.text(format!("{:<10}{}", keys, action));
            }
            ui.separator();
            ui.text(format!(
                "Distortion: {}",
                if model.distortion_enabled { "on" } else { "off" }
            ));
            ui.text_disabled("Esc quits");
        });
}

fn draw_status(ui: &imgui::Ui, model: &HudModel) {
    let [width, height] = ui.io().display_size;
    ui.window("##status")
        .position([width - 16.0, height - 16.0], Condition::Always)
        .position_pivot([1.0, 1.0])
        .bg_alpha(0.0)
        .no_decoration()
        .no_inputs()
        .always_auto_resize(true)
        .build(|| match &model.last_route {
            Some(route) => ui.text_disabled(format!("{}  |  H for help", route)),
            None => ui.text_disabled("H for help"),
        });
}

/// `0xRRGGBB` to an opaque ImGui color.
pub fn department_color(rgb: u32) -> [f32; 4] {
    let channel = |shift: u32| ((rgb >> shift) & 0xff) as f32 / 255.0;
    [channel(16), channel(8), channel(0), 1.0]
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
pub fn wrap_blurb(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::department_for_index;

    #[test]
    fn wrap_respects_width() {
        let lines = wrap_blurb("Threat intel, incident logs, counter-ops.", 16);
        assert_eq!(lines, vec!["Threat intel,", "incident logs,", "counter-ops."]);
        assert!(lines.iter().all(|l| l.len() <= 16));
    }

    #[test]
    fn wrap_keeps_long_words_whole() {
        let lines = wrap_blurb("a supercalifragilistic b", 5);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn wrap_of_blank_text_is_empty() {
        assert!(wrap_blurb("   ", 10).is_empty());
    }

    #[test]
    fn department_colors_unpack() {
        assert_eq!(department_color(0xff0000), [1.0, 0.0, 0.0, 1.0]);
        let cyan = department_color(0x00ffff);
        assert_eq!(cyan, [0.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn channels_write_into_the_shared_model() {
        let model = shared_hud();
        let mut sink = HudChannel::new(model.clone());
        let mut nav = RouteLog::new(model.clone());

        let anchor = OverlayAnchor {
            x: 10.0,
            y: 20.0,
            fragment: 1,
            department: department_for_index(1),
        };
        sink.update(Some(&anchor));
        nav.navigate("/security");
        assert_eq!(model.borrow().anchor.as_ref(), Some(&anchor));
        assert_eq!(model.borrow().last_route.as_deref(), Some("/security"));

        sink.update(None);
        assert!(model.borrow().anchor.is_none());
    }
}
