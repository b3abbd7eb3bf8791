mod api;
mod app;
mod application;
mod config;
mod domain;
mod tools;
mod ui;
mod utils;

use iced::{window, Size};

fn main() -> iced::Result {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("simple_yt_downloader=info"),
    )
    .init();

    iced::application(app::DownloadApp::new, app::update, app::view)
        .title("YT Downloader")
        .window(window::Settings {
            size: Size::new(900.0, 700.0),
            ..Default::default()
        })
        .run()
}
