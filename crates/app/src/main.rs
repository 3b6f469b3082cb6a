mod state;
mod ui;

use eframe::egui;
use salesmap_core::loader::DataSource;
use state::AppState;

struct MyApp {
    state: AppState,
}

impl MyApp {
    fn new(_cc: &eframe::CreationContext<'_>, source: DataSource) -> Self {
        let mut state = AppState::new(source.clone());
        state.start_load(source);
        Self { state }
    }
}

impl eframe::App for MyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::draw(&mut self.state, ctx);
    }
}

fn main() -> eframe::Result<()> {
    let source = std::env::args()
        .nth(1)
        .map(|s| DataSource::parse(&s))
        .unwrap_or_default();
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Video Game Sales",
        options,
        Box::new(|cc| Ok(Box::new(MyApp::new(cc, source)))),
    )
}
