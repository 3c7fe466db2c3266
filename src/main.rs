mod config;
mod data;
mod error;
mod explorer;
mod history;
mod location;
mod lookup;
mod map;
mod search_panel;
mod shell;
mod suggestions;

use gtk::prelude::*;
use gtk::{gio, glib};
use libadwaita::{prelude::*, Application, ApplicationWindow, ColorScheme, StyleManager};
use std::rc::Rc;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::AppConfig;
use data::{APP_ID, PRODUCT_NAME};
use explorer::Explorer;
use history::JsonFileStore;
use location::AppLocation;
use lookup::GeminiClient;
use shell::Shell;

const STYLESHEET: &str = "
.search-box {
    padding: 2px;
}
.search-button {
    min-width: 84px;
}
.suggestion-popover > contents {
    background-color: alpha(@card_bg_color, 0.97);
    border-radius: 12px;
    box-shadow: 0 4px 16px alpha(black, 0.25);
    padding: 0;
    min-width: 320px;
}
.suggestion-heading {
    font-size: 10px;
    font-weight: 800;
    letter-spacing: 1px;
    color: alpha(@window_fg_color, 0.45);
}
.suggestion-row {
    border-radius: 8px;
    padding: 6px 10px;
}
.logo-button {
    padding: 4px 8px;
}
.badge {
    font-size: 10px;
    font-weight: 800;
    letter-spacing: 1px;
    padding: 4px 12px;
    border-radius: 12px;
    background-color: alpha(@accent_bg_color, 0.12);
    color: @accent_color;
}
.hero-title {
    font-size: 34px;
    font-weight: 900;
}
.category-card {
    padding: 18px;
    border-radius: 16px;
}
.category-icon {
    padding: 10px;
    border-radius: 12px;
    -gtk-icon-size: 24px;
}
.category-antibiotics .category-icon {
    background-color: alpha(#10b981, 0.15);
    color: #059669;
}
.category-hormones .category-icon {
    background-color: alpha(#8b5cf6, 0.15);
    color: #7c3aed;
}
.category-analgesics .category-icon {
    background-color: alpha(#f97316, 0.15);
    color: #ea580c;
}
.category-biologics .category-icon {
    background-color: alpha(#3b82f6, 0.15);
    color: #2563eb;
}
.category-item {
    font-size: 12px;
    font-weight: 600;
}
.recent-chip {
    font-size: 12px;
    font-weight: 600;
    padding: 4px 12px;
}
.map-card {
    border-radius: 24px;
    background-color: #f8fafc;
}
.map-hint {
    font-size: 10px;
    font-weight: 700;
    padding: 4px 10px;
    border-radius: 8px;
    background-color: alpha(white, 0.85);
    color: alpha(black, 0.55);
}
.loading-overlay {
    background-color: alpha(white, 0.6);
    border-radius: 24px;
}
.loading-pill {
    padding: 10px 18px;
    border-radius: 999px;
    background-color: @card_bg_color;
    box-shadow: 0 4px 16px alpha(black, 0.2);
    font-weight: 700;
}
.info-card {
    padding: 20px;
    border-radius: 16px;
}
.detail-card {
    border-radius: 20px;
}
.detail-banner {
    padding: 24px;
    border-radius: 20px 20px 0 0;
    background-color: @accent_bg_color;
    color: @accent_fg_color;
}
.detail-icon {
    padding: 8px;
    border-radius: 10px;
    background-color: alpha(@accent_bg_color, 0.1);
    color: @accent_color;
}
.detail-value {
    font-size: 15px;
    font-weight: 700;
}
.context-box {
    padding: 14px;
    border-radius: 12px;
    background-color: alpha(@window_fg_color, 0.04);
}
.context-text {
    font-style: italic;
}
.skeleton-card {
    padding: 24px;
    border-radius: 20px;
}
.skeleton-bar {
    min-height: 14px;
    border-radius: 7px;
    background-color: alpha(@window_fg_color, 0.08);
}";

fn main() -> glib::ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("startup failed: {e:#}");
            glib::ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<glib::ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pharm_origin=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Lookups and the world fetch run on tokio; GTK owns the main thread
    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    let config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("ignoring config file: {e}");
        AppConfig::from_env()
    });
    if config.api_key.is_none() {
        tracing::warn!("no API key configured; lookups will fail");
    }

    let service = Arc::new(GeminiClient::new(&config)?);
    let config = Rc::new(config);

    let app = Application::builder()
        .application_id(APP_ID)
        .flags(gio::ApplicationFlags::HANDLES_OPEN)
        .build();

    {
        let config = config.clone();
        let service = service.clone();
        app.connect_activate(move |app| build_window(app, None, &config, &service));
    }

    // `pharm-origin https://host/?drug=Aspirin` opens straight into that lookup
    app.connect_open(move |app, files, _hint| {
        let launch_uri = files.first().map(|file| file.uri().to_string());
        build_window(app, launch_uri.as_deref(), &config, &service);
    });

    Ok(app.run())
}

fn build_window(
    app: &Application,
    launch_uri: Option<&str>,
    config: &AppConfig,
    service: &Arc<GeminiClient>,
) {
    let style_manager = StyleManager::default();
    style_manager.set_color_scheme(ColorScheme::PreferLight);

    let location = AppLocation::new(launch_uri, config.share_base_url.as_deref());
    let store = JsonFileStore::new(config.storage_file());
    let explorer = Explorer::new(Shell::new(store, location), service.clone());

    // Create the main window
    let window = ApplicationWindow::builder()
        .application(app)
        .title(PRODUCT_NAME)
        .default_width(1100)
        .default_height(800)
        .build();

    let content = explorer.attach(&window);

    let css_provider = gtk::CssProvider::new();
    css_provider.load_from_data(STYLESHEET);
    gtk::style_context_add_provider_for_display(
        &gtk::prelude::WidgetExt::display(&window),
        &css_provider,
        gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );

    // Country outlines arrive in the background; the map stays blank until then
    let url = config.world_geojson_url.clone();
    let fetch = tokio::spawn(async move { map::load_world(&url).await });
    let map_widget = explorer.map().clone();
    glib::spawn_future_local(async move {
        match fetch.await {
            Ok(features) => map_widget.set_features(features),
            Err(e) => tracing::warn!("world map task failed: {e}"),
        }
    });

    window.set_content(Some(&content));
    window.present();
}
