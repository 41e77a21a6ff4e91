mod app;
mod ui;
mod viewport;

use app::StockWalkApp;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockwalk=info,stockwalk_lib=info".into()),
        )
        .init();

    // Parse --data <path-or-url> argument
    let data_override = parse_data_arg(std::env::args().skip(1));

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("StockWalk")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 400.0]),
        depth_buffer: 24,
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "stockwalk",
        native_options,
        Box::new(move |cc| Ok(Box::new(StockWalkApp::new(cc, data_override)))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }
}

fn parse_data_arg(mut args: impl Iterator<Item = String>) -> Option<String> {
    while let Some(arg) = args.next() {
        if let Some(value) = arg.strip_prefix("--data=") {
            return Some(value.to_string());
        }
        if arg == "--data" {
            match args.next() {
                Some(value) => return Some(value),
                None => {
                    tracing::error!("--data needs a file path or URL");
                    return None;
                }
            }
        }
    }
    None
}
