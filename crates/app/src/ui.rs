use eframe::egui::{self, Align2, Color32, FontId, Sense, Ui};
use egui_plot::{Bar, BarChart, Plot};
use std::collections::HashSet;
use salesmap_core::color::Color;
use salesmap_core::human::format_value;
use salesmap_core::interaction::TooltipState;
use salesmap_core::loader::{DataSource, LoadMsg};
use salesmap_core::model::NodeId;
use salesmap_core::render::{label_lines, tooltip_text};

use crate::state::AppState;

pub fn draw(app: &mut AppState, ctx: &egui::Context) {
    poll_load(app, ctx);

    // Keep polling the worker while a load is in flight
    if app.load_rx.is_some() {
        ctx.request_repaint();
    }

    egui::TopBottomPanel::top("top").show(ctx, |ui| {
        top_bar(ui, app);
    });

    egui::TopBottomPanel::top("legend").show(ctx, |ui| {
        legend(ui, app);
    });

    egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
        status_line(ui, app);
    });

    egui::SidePanel::right("totals").resizable(true).default_width(280.0).show(ctx, |ui| {
        ui.heading("Sales by platform");
        ui.separator();
        totals_chart(ui, app);
    });

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.heading(&app.cfg.title);
            ui.label(&app.cfg.description);
        });
        ui.separator();
        treemap(ui, app);
    });

    tooltip(ctx, app);
}

fn to_color32(c: Color) -> Color32 {
    Color32::from_rgb(c.r, c.g, c.b)
}

fn top_bar(ui: &mut Ui, app: &mut AppState) {
    ui.horizontal(|ui| {
        if ui.button("Reload").clicked() {
            app.reload();
        }
        if ui.button("Open JSON…").clicked() {
            if let Some(path) = rfd::FileDialog::new().add_filter("JSON", &["json"]).pick_file() {
                app.start_load(DataSource::File(path));
            }
        }
        let can_export = app.loaded.is_some();
        if ui.add_enabled(can_export, egui::Button::new("Export HTML")).clicked() {
            match app.export_html() {
                Ok(path) => {
                    if let Err(e) = open::that(&path) {
                        app.error = Some(format!("cannot open {}: {e}", path.display()));
                    }
                }
                Err(e) => app.error = Some(format!("{e:#}")),
            }
        }
        ui.separator();
        ui.label("Search:");
        ui.text_edit_singleline(&mut app.search);
    });
}

fn legend(ui: &mut Ui, app: &AppState) {
    let Some(loaded) = &app.loaded else { return };
    let swatch = app.cfg.legend.swatch as f32;
    ui.horizontal_wrapped(|ui| {
        for (name, color) in &loaded.legend {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(swatch, swatch), Sense::hover());
            ui.painter().rect_filled(rect, 2.0, to_color32(*color));
            ui.label(name);
            ui.add_space(app.cfg.legend.gutter as f32);
        }
    });
}

fn status_line(ui: &mut Ui, app: &AppState) {
    ui.horizontal(|ui| {
        ui.label(app.source.describe());
        ui.separator();
        if app.load_rx.is_some() {
            ui.spinner();
            ui.label("Loading…");
        } else if let Some(err) = &app.error {
            ui.colored_label(Color32::RED, err);
        } else if let (Some(loaded), Some(at)) = (&app.loaded, &app.loaded_at) {
            ui.label(format!(
                "{} games, total {} (loaded {})",
                loaded.layout.leaves().len(),
                format_value(loaded.tree.total()),
                at.format("%H:%M:%S")
            ));
        }
    });
}

fn totals_chart(ui: &mut Ui, app: &AppState) {
    let Some(loaded) = &app.loaded else { return };
    let bars: Vec<Bar> = loaded
        .tree
        .top_level()
        .zip(&loaded.legend)
        .enumerate()
        .map(|(i, (group, (_, color)))| {
            Bar::new(i as f64, group.weight)
                .name(&group.name)
                .fill(to_color32(*color))
        })
        .collect();
    Plot::new("platform_totals")
        .allow_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(BarChart::new(bars).horizontal()));
}

fn treemap(ui: &mut Ui, app: &mut AppState) {
    let Some(loaded) = app.loaded.as_mut() else {
        ui.centered_and_justified(|ui| {
            ui.label(if app.load_rx.is_some() { "Loading…" } else { "No data" });
        });
        return;
    };

    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::hover());
    let area = response.rect;
    loaded.ensure_layout(area.width() as f64, area.height() as f64, &app.cfg);

    let highlights: HashSet<NodeId> = loaded.tree.search(&app.search).iter().map(|n| n.node).collect();
    let label = &app.cfg.label;
    for id in loaded.layout.leaves() {
        let r = loaded.layout.rect(*id);
        let screen = egui::Rect::from_min_max(
            area.min + egui::vec2(r.x0 as f32, r.y0 as f32),
            area.min + egui::vec2(r.x1 as f32, r.y1 as f32),
        );
        let color = loaded.tile_colors.get(id).copied().unwrap_or(Color::rgb(0x7f, 0x7f, 0x7f));
        let mut fill = to_color32(color);
        if !highlights.is_empty() && !highlights.contains(id) {
            fill = fill.gamma_multiply(0.25);
        }
        painter.rect_filled(screen, 0.0, fill);

        let text_color = if color.luminance() > 0.55 { Color32::BLACK } else { Color32::WHITE };
        let clipped = painter.with_clip_rect(screen);
        for (i, word) in label_lines(&loaded.tree.get(*id).name).into_iter().enumerate() {
            let baseline = label.first_line + i as f64 * label.line_height;
            clipped.text(
                screen.min + egui::vec2(label.inset_x as f32, baseline as f32),
                Align2::LEFT_BOTTOM,
                word,
                FontId::proportional(10.0),
                text_color,
            );
        }
    }

    let hit = response.hover_pos().and_then(|pos| {
        let local = pos - area.min;
        loaded
            .layout
            .hit_test(local.x as f64, local.y as f64)
            .map(|id| (id, pos))
    });
    match hit.and_then(|(id, pos)| loaded.tree.get(id).record().map(|rec| (id, rec, pos))) {
        Some((id, record, pos)) => app.tooltip.pointer_move(id, &record, pos.x as f64, pos.y as f64),
        None => app.tooltip.pointer_leave(),
    }
}

fn tooltip(ctx: &egui::Context, app: &AppState) {
    let &TooltipState::Shown { node, left, top } = app.tooltip.state() else { return };
    let Some(record) = app.loaded.as_ref().and_then(|l| l.tree.get(node).record()) else { return };
    let alpha = (app.tooltip.opacity() * 255.0) as u8;
    egui::Area::new(egui::Id::new("sales_tooltip"))
        .fixed_pos(egui::pos2(left as f32, top as f32))
        .order(egui::Order::Tooltip)
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style())
                .fill(Color32::from_black_alpha(alpha))
                .show(ui, |ui| {
                    for line in tooltip_text(&record).lines() {
                        ui.colored_label(Color32::WHITE, line);
                    }
                });
        });
}

fn poll_load(app: &mut AppState, ctx: &egui::Context) {
    // Take ownership of the receiver to avoid borrowing while we might assign to it.
    let Some(rx) = app.load_rx.take() else { return; };
    match rx.try_recv() {
        Ok(LoadMsg::Done(dataset)) => {
            app.finish_load(dataset);
            ctx.request_repaint();
        }
        Ok(LoadMsg::Failed(e)) => {
            app.error = Some(e);
            ctx.request_repaint();
        }
        // Put the receiver back to keep polling next frame
        Err(crossbeam_channel::TryRecvError::Empty) => app.load_rx = Some(rx),
        Err(crossbeam_channel::TryRecvError::Disconnected) => {
            app.error = Some("loader stopped without a result".to_string());
        }
    }
}
