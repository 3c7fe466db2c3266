use gtk::prelude::*;
use gtk::{glib, Align, Orientation};
use libadwaita::prelude::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use crate::data::{MedicineOrigin, CATEGORIES};
use crate::error::{LookupError, ShareError};
use crate::history::JsonFileStore;
use crate::location::AppLocation;
use crate::lookup::{spawn_lookup, OriginLookup};
use crate::map::MapWidget;
use crate::search_panel::SearchPanel;
use crate::shell::{ClipboardSink, SearchTicket, Shell};

pub type AppShell = Shell<JsonFileStore, AppLocation>;

const COPIED_ACK: Duration = Duration::from_secs(2);

/// Clipboard of the default display.
struct DisplayClipboard;

impl ClipboardSink for DisplayClipboard {
    fn write_text(&self, text: &str) -> Result<(), ShareError> {
        let display = gdk::Display::default().ok_or(ShareError::NoDisplay)?;
        display.clipboard().set_text(text);
        Ok(())
    }
}

struct DetailCard {
    card: gtk::Box,
    share_button: gtk::Button,
    classification: gtk::Label,
    name: gtk::Label,
    birthplace: gtk::Label,
    epoch: gtk::Label,
    architect: gtk::Label,
    context: gtk::Label,
}

struct Widgets {
    title: libadwaita::WindowTitle,
    search: SearchPanel,
    home: gtk::Box,
    recent_box: gtk::Box,
    recent_chips: gtk::FlowBox,
    error_page: libadwaita::StatusPage,
    results: gtk::Box,
    map: MapWidget,
    loading_overlay: gtk::Box,
    chronicle: gtk::Box,
    chronicle_text: gtk::Label,
    detail: DetailCard,
    skeleton: gtk::Box,
}

/// Main window content wired to the application shell.
pub struct Explorer<L: OriginLookup> {
    shell: Rc<RefCell<AppShell>>,
    service: Arc<L>,
    widgets: Rc<Widgets>,
    /// Set while widgets are being updated from the shell, so change
    /// signals raised by those updates are not fed back in.
    syncing: Rc<Cell<bool>>,
    shown_history: Rc<RefCell<Vec<String>>>,
}

impl<L: OriginLookup> Clone for Explorer<L> {
    fn clone(&self) -> Self {
        Self {
            shell: self.shell.clone(),
            service: self.service.clone(),
            widgets: self.widgets.clone(),
            syncing: self.syncing.clone(),
            shown_history: self.shown_history.clone(),
        }
    }
}

impl<L: OriginLookup> Explorer<L> {
    pub fn new(shell: AppShell, service: Arc<L>) -> Self {
        let widgets = Rc::new(build_widgets());
        Self {
            shell: Rc::new(RefCell::new(shell)),
            service,
            widgets,
            syncing: Rc::new(Cell::new(false)),
            shown_history: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn map(&self) -> &MapWidget {
        &self.widgets.map
    }

    /// Build the window content and start the session.
    pub fn attach(&self, window: &libadwaita::ApplicationWindow) -> gtk::Widget {
        let w = &self.widgets;

        // Create header bar
        let header_bar = libadwaita::HeaderBar::builder()
            .title_widget(&w.title)
            .build();

        let logo_button = gtk::Button::builder()
            .icon_name("applications-science-symbolic")
            .tooltip_text("Back to start")
            .build();
        logo_button.add_css_class("logo-button");
        let explorer = self.clone();
        logo_button.connect_clicked(move |_| {
            explorer.shell.borrow_mut().reset();
            explorer.refresh();
        });

        let about_button = gtk::Button::builder()
            .icon_name("help-about-symbolic")
            .tooltip_text("About")
            .build();
        let window_for_about = window.clone();
        about_button.connect_clicked(move |_| show_about(&window_for_about));

        header_bar.pack_start(&logo_button);
        header_bar.pack_end(&about_button);
        header_bar.pack_end(&w.search.container);

        self.connect_search(window);
        self.connect_home();
        self.connect_error_page();
        self.connect_share();

        // Scrollable page holding home, error panel and results
        let page = gtk::Box::builder()
            .orientation(Orientation::Vertical)
            .spacing(24)
            .margin_top(24)
            .margin_bottom(24)
            .margin_start(24)
            .margin_end(24)
            .build();
        page.append(&w.home);
        page.append(&w.error_page);
        page.append(&w.results);

        let clamp = libadwaita::Clamp::builder()
            .maximum_size(1200)
            .child(&page)
            .build();

        let scrolled_window = gtk::ScrolledWindow::builder()
            .hscrollbar_policy(gtk::PolicyType::Never)
            .vexpand(true)
            .child(&clamp)
            .build();

        let toolbar_view = libadwaita::ToolbarView::builder().build();
        toolbar_view.add_top_bar(&header_bar);
        toolbar_view.set_content(Some(&scrolled_window));

        let ticket = self.shell.borrow_mut().start();
        self.refresh();
        if let Some(ticket) = ticket {
            self.run(ticket);
        }

        toolbar_view.upcast()
    }

    fn connect_search(&self, window: &libadwaita::ApplicationWindow) {
        let search = &self.widgets.search;

        let explorer = self.clone();
        search.entry.connect_changed(move |entry| {
            if explorer.syncing.get() {
                return;
            }
            explorer.shell.borrow_mut().set_query(&entry.text());
            explorer.refresh();
        });

        let explorer = self.clone();
        search.entry.connect_activate(move |_| explorer.submit());

        let explorer = self.clone();
        search.button.connect_clicked(move |_| explorer.submit());

        let focus = gtk::EventControllerFocus::new();
        let explorer = self.clone();
        focus.connect_enter(move |_| {
            if explorer.syncing.get() {
                return;
            }
            explorer.shell.borrow_mut().focus_search();
            explorer.refresh();
        });
        let explorer = self.clone();
        focus.connect_leave(move |_| {
            if explorer.syncing.get() || !explorer.shell.borrow().suggestions().is_shown() {
                return;
            }
            explorer.shell.borrow_mut().dismiss_suggestions();
            explorer.refresh();
        });
        search.entry.add_controller(focus);

        // Presses outside the search box close the dropdown
        let outside = gtk::GestureClick::new();
        outside.set_propagation_phase(gtk::PropagationPhase::Capture);
        let explorer = self.clone();
        let window_for_bounds = window.clone();
        outside.connect_pressed(move |_, _, x, y| {
            let inside = explorer
                .widgets
                .search
                .bounds_in(&window_for_bounds)
                .is_some_and(|bounds| bounds.contains(x, y));
            if !inside && explorer.shell.borrow().suggestions().is_shown() {
                explorer.shell.borrow_mut().dismiss_suggestions();
                explorer.refresh();
            }
        });
        window.add_controller(outside);
    }

    fn connect_home(&self) {
        let w = &self.widgets;
        let categories = gtk::FlowBox::builder()
            .selection_mode(gtk::SelectionMode::None)
            .homogeneous(true)
            .min_children_per_line(1)
            .max_children_per_line(4)
            .column_spacing(12)
            .row_spacing(12)
            .build();

        for category in CATEGORIES {
            let card = gtk::Box::builder()
                .orientation(Orientation::Vertical)
                .spacing(8)
                .build();
            card.add_css_class("card");
            card.add_css_class("category-card");
            card.add_css_class(category.css_class);

            let header = gtk::Box::new(Orientation::Horizontal, 8);
            let icon = gtk::Image::from_icon_name(category.icon_name);
            icon.add_css_class("category-icon");
            let title = gtk::Label::builder()
                .label(category.title)
                .halign(Align::Start)
                .build();
            title.add_css_class("heading");
            header.append(&icon);
            header.append(&title);
            card.append(&header);

            for &item in category.items {
                let button = gtk::Button::builder().label(item).build();
                button.add_css_class("flat");
                button.add_css_class("category-item");
                let explorer = self.clone();
                button.connect_clicked(move |_| explorer.choose(item));
                card.append(&button);
            }

            categories.insert(&card, -1);
        }

        w.home.append(&categories);

        let credit = gtk::Label::builder()
            .label("A Pharmaceutics Project by Himanshu")
            .margin_top(12)
            .build();
        credit.add_css_class("dim-label");
        credit.add_css_class("caption");
        w.home.append(&credit);
    }

    fn connect_error_page(&self) {
        let retry = gtk::Button::builder()
            .label("Try Another Term")
            .halign(Align::Center)
            .build();
        retry.add_css_class("pill");
        let explorer = self.clone();
        retry.connect_clicked(move |_| {
            explorer.shell.borrow_mut().dismiss_error();
            explorer.refresh();
        });
        self.widgets.error_page.set_child(Some(&retry));
    }

    fn connect_share(&self) {
        let explorer = self.clone();
        self.widgets.detail.share_button.connect_clicked(move |_| {
            let shared = explorer.shell.borrow_mut().share(&DisplayClipboard);
            match shared {
                Ok(token) => {
                    tracing::info!("share link copied");
                    let explorer_for_timer = explorer.clone();
                    glib::timeout_add_local_once(COPIED_ACK, move || {
                        explorer_for_timer.shell.borrow_mut().clear_copied(token);
                        explorer_for_timer.refresh();
                    });
                }
                Err(e) => tracing::error!("could not copy share link: {}", e),
            }
            explorer.refresh();
        });
    }

    fn submit(&self) {
        let ticket = self.shell.borrow_mut().submit_query();
        self.refresh();
        if let Some(ticket) = ticket {
            self.run(ticket);
        }
    }

    fn choose(&self, name: &str) {
        let ticket = self.shell.borrow_mut().choose(name);
        self.refresh();
        if let Some(ticket) = ticket {
            self.run(ticket);
        }
    }

    /// Run a lookup on the runtime and apply the outcome on the main loop.
    fn run(&self, ticket: SearchTicket) {
        let explorer = self.clone();
        glib::spawn_future_local(async move {
            let SearchTicket { seq, term } = ticket;
            let outcome = match spawn_lookup(explorer.service.clone(), term).await {
                Ok(outcome) => outcome,
                Err(e) => Err(LookupError::Task(e.to_string())),
            };
            let phase = {
                let mut shell = explorer.shell.borrow_mut();
                shell.complete(seq, outcome);
                shell.phase()
            };
            tracing::debug!(seq, ?phase, "lookup settled");
            explorer.refresh();
        });
    }

    /// Bring every widget in line with the shell.
    pub fn refresh(&self) {
        let shell = self.shell.borrow();
        let w = &self.widgets;
        self.syncing.set(true);

        let loading = shell.is_loading();
        let result = shell.result();
        let error = shell.error();

        if w.search.entry.text().as_str() != shell.query() {
            w.search.entry.set_text(shell.query());
        }
        w.search.set_loading(loading);
        let explorer = self.clone();
        w.search.set_suggestions(
            shell.suggestions().items(),
            shell.suggestions().is_shown(),
            move |name| explorer.choose(name),
        );

        w.title.set_subtitle(shell.location().current().unwrap_or_default());

        w.home.set_visible(result.is_none() && !loading && error.is_none());
        self.sync_history(shell.history().entries());
        w.recent_box.set_visible(!shell.history().is_empty());

        w.error_page.set_visible(error.is_some());
        if let Some(message) = error {
            w.error_page.set_description(Some(message));
        }

        w.results.set_visible(loading || result.is_some());
        w.loading_overlay.set_visible(loading);
        w.map.set_origin(result, shell.result_generation());
        w.skeleton.set_visible(loading && result.is_none());
        w.chronicle.set_visible(result.is_some());
        w.detail.card.set_visible(result.is_some());
        if let Some(origin) = result {
            w.chronicle_text.set_label(&origin.brief_history);
            fill_detail(&w.detail, origin);
        }

        w.detail.share_button.set_icon_name(if shell.is_copied() {
            "object-select-symbolic"
        } else {
            "send-to-symbolic"
        });

        self.syncing.set(false);
    }

    fn sync_history(&self, entries: &[String]) {
        if self.shown_history.borrow().as_slice() == entries {
            return;
        }
        let w = &self.widgets;
        while let Some(child) = w.recent_chips.first_child() {
            w.recent_chips.remove(&child);
        }
        for term in entries {
            let button = gtk::Button::builder().label(term.as_str()).build();
            button.add_css_class("recent-chip");
            let explorer = self.clone();
            let term = term.clone();
            button.connect_clicked(move |_| explorer.choose(&term));
            w.recent_chips.insert(&button, -1);
        }
        *self.shown_history.borrow_mut() = entries.to_vec();
    }
}

fn fill_detail(detail: &DetailCard, origin: &MedicineOrigin) {
    detail.classification.set_label(&origin.classification);
    detail.name.set_label(&origin.name);
    detail.birthplace.set_label(&origin.birthplace());
    detail.epoch.set_label(&origin.discovery_year);
    detail.architect.set_label(&origin.discoverer);
    detail.context.set_label(&origin.fun_fact);
}

fn build_widgets() -> Widgets {
    let title = libadwaita::WindowTitle::new(crate::data::PRODUCT_NAME, "");
    let search = SearchPanel::new();

    // Home page
    let home = gtk::Box::builder()
        .orientation(Orientation::Vertical)
        .spacing(24)
        .build();
    home.append(&build_hero());

    let recent_box = gtk::Box::builder()
        .orientation(Orientation::Vertical)
        .spacing(8)
        .visible(false)
        .build();
    let recent_header = gtk::Box::new(Orientation::Horizontal, 6);
    recent_header.append(&gtk::Image::from_icon_name("document-open-recent-symbolic"));
    let recent_label = gtk::Label::new(Some("Recently Viewed"));
    recent_label.add_css_class("heading");
    recent_header.append(&recent_label);
    let recent_chips = gtk::FlowBox::builder()
        .selection_mode(gtk::SelectionMode::None)
        .column_spacing(8)
        .row_spacing(8)
        .build();
    recent_box.append(&recent_header);
    recent_box.append(&recent_chips);
    home.append(&recent_box);

    // Error panel
    let error_page = libadwaita::StatusPage::builder()
        .icon_name("dialog-error-symbolic")
        .title("Search Error")
        .visible(false)
        .build();
    error_page.add_css_class("compact");

    // Results: map card, chronicle, detail card
    let results = gtk::Box::builder()
        .orientation(Orientation::Vertical)
        .spacing(24)
        .visible(false)
        .build();

    let map = MapWidget::new();
    let map_overlay = gtk::Overlay::new();
    map_overlay.set_child(Some(map.widget()));
    map_overlay.add_css_class("card");
    map_overlay.add_css_class("map-card");
    map_overlay.set_overflow(gtk::Overflow::Hidden);

    let loading_overlay = build_loading_overlay();
    map_overlay.add_overlay(&loading_overlay);

    let hint = gtk::Label::builder()
        .label("Scroll to zoom • Drag to pan")
        .halign(Align::End)
        .valign(Align::End)
        .margin_end(12)
        .margin_bottom(12)
        .can_target(false)
        .build();
    hint.add_css_class("map-hint");
    map_overlay.add_overlay(&hint);

    let (chronicle, chronicle_text) = build_chronicle();
    let detail = build_detail_card();
    let skeleton = build_skeleton();

    results.append(&map_overlay);
    results.append(&detail.card);
    results.append(&skeleton);
    results.append(&chronicle);

    Widgets {
        title,
        search,
        home,
        recent_box,
        recent_chips,
        error_page,
        results,
        map,
        loading_overlay,
        chronicle,
        chronicle_text,
        detail,
        skeleton,
    }
}

fn build_hero() -> gtk::Box {
    let hero = gtk::Box::builder()
        .orientation(Orientation::Vertical)
        .spacing(12)
        .halign(Align::Center)
        .margin_top(24)
        .build();

    let badge = gtk::Label::new(Some("Clinical History Visualization"));
    badge.add_css_class("badge");
    badge.set_halign(Align::Center);

    let headline = gtk::Label::builder()
        .label("Every Breakthrough Has a Hometown.")
        .wrap(true)
        .justify(gtk::Justification::Center)
        .build();
    headline.add_css_class("hero-title");

    let blurb = gtk::Label::builder()
        .label(
            "The global map of pharmaceutical evolution. Discover the labs, researchers, \
             and natural sources that shaped modern medicine.",
        )
        .wrap(true)
        .max_width_chars(60)
        .justify(gtk::Justification::Center)
        .build();
    blurb.add_css_class("dim-label");

    hero.append(&badge);
    hero.append(&headline);
    hero.append(&blurb);
    hero
}

fn build_loading_overlay() -> gtk::Box {
    let overlay = gtk::Box::builder()
        .orientation(Orientation::Vertical)
        .spacing(8)
        .halign(Align::Fill)
        .valign(Align::Fill)
        .visible(false)
        .build();
    overlay.add_css_class("loading-overlay");

    let inner = gtk::Box::builder()
        .orientation(Orientation::Horizontal)
        .spacing(12)
        .halign(Align::Center)
        .valign(Align::Center)
        .vexpand(true)
        .build();
    inner.add_css_class("loading-pill");

    let spinner = gtk::Spinner::builder().spinning(true).build();
    let labels = gtk::Box::new(Orientation::Vertical, 2);
    let title = gtk::Label::builder()
        .label("Synthesizing Data")
        .halign(Align::Start)
        .build();
    title.add_css_class("heading");
    let subtitle = gtk::Label::builder()
        .label("Analyzing Geographical Origins...")
        .halign(Align::Start)
        .build();
    subtitle.add_css_class("caption");
    subtitle.add_css_class("dim-label");
    labels.append(&title);
    labels.append(&subtitle);

    inner.append(&spinner);
    inner.append(&labels);
    overlay.append(&inner);
    overlay
}

fn build_chronicle() -> (gtk::Box, gtk::Label) {
    let card = gtk::Box::builder()
        .orientation(Orientation::Vertical)
        .spacing(12)
        .visible(false)
        .build();
    card.add_css_class("card");
    card.add_css_class("info-card");

    let header = gtk::Box::new(Orientation::Horizontal, 8);
    header.append(&gtk::Image::from_icon_name("document-open-recent-symbolic"));
    let title = gtk::Label::new(Some("Chronicle of Discovery"));
    title.add_css_class("title-4");
    header.append(&title);

    let text = gtk::Label::builder()
        .wrap(true)
        .xalign(0.0)
        .selectable(true)
        .build();
    text.add_css_class("body");

    card.append(&header);
    card.append(&text);
    (card, text)
}

fn detail_row(icon_name: &str, caption: &str) -> (gtk::Box, gtk::Label) {
    let row = gtk::Box::new(Orientation::Horizontal, 12);
    let icon = gtk::Image::from_icon_name(icon_name);
    icon.add_css_class("detail-icon");

    let column = gtk::Box::new(Orientation::Vertical, 2);
    let caption = gtk::Label::builder().label(caption).xalign(0.0).build();
    caption.add_css_class("caption-heading");
    caption.add_css_class("dim-label");
    let value = gtk::Label::builder().xalign(0.0).wrap(true).build();
    value.add_css_class("detail-value");
    column.append(&caption);
    column.append(&value);

    row.append(&icon);
    row.append(&column);
    (row, value)
}

fn build_detail_card() -> DetailCard {
    let card = gtk::Box::builder()
        .orientation(Orientation::Vertical)
        .spacing(16)
        .visible(false)
        .build();
    card.add_css_class("card");
    card.add_css_class("detail-card");

    // Banner with classification, name and share button
    let banner = gtk::Box::new(Orientation::Horizontal, 12);
    banner.add_css_class("detail-banner");
    let heading = gtk::Box::builder()
        .orientation(Orientation::Vertical)
        .spacing(4)
        .hexpand(true)
        .build();
    let classification = gtk::Label::builder().halign(Align::Start).build();
    classification.add_css_class("badge");
    let name = gtk::Label::builder().halign(Align::Start).wrap(true).build();
    name.add_css_class("title-1");
    heading.append(&classification);
    heading.append(&name);

    let share_button = gtk::Button::builder()
        .icon_name("send-to-symbolic")
        .tooltip_text("Copy share link")
        .valign(Align::Start)
        .build();
    share_button.add_css_class("circular");

    banner.append(&heading);
    banner.append(&share_button);
    card.append(&banner);

    let (birthplace_row, birthplace) = detail_row("mark-location-symbolic", "Birthplace");
    let (epoch_row, epoch) = detail_row("x-office-calendar-symbolic", "Epoch");
    let (architect_row, architect) = detail_row("avatar-default-symbolic", "Architect");
    card.append(&birthplace_row);
    card.append(&epoch_row);
    card.append(&architect_row);

    let context_box = gtk::Box::new(Orientation::Vertical, 4);
    context_box.add_css_class("context-box");
    let context_caption = gtk::Label::builder()
        .label("Historical Context")
        .xalign(0.0)
        .build();
    context_caption.add_css_class("caption-heading");
    let context = gtk::Label::builder().xalign(0.0).wrap(true).build();
    context.add_css_class("context-text");
    context_box.append(&context_caption);
    context_box.append(&context);
    card.append(&context_box);

    DetailCard {
        card,
        share_button,
        classification,
        name,
        birthplace,
        epoch,
        architect,
        context,
    }
}

/// Placeholder card shown while the first result loads.
fn build_skeleton() -> gtk::Box {
    let skeleton = gtk::Box::builder()
        .orientation(Orientation::Vertical)
        .spacing(12)
        .visible(false)
        .build();
    skeleton.add_css_class("card");
    skeleton.add_css_class("skeleton-card");
    for width in [160, 320, 240] {
        let bar = gtk::Box::builder().width_request(width).height_request(14).halign(Align::Start).build();
        bar.add_css_class("skeleton-bar");
        skeleton.append(&bar);
    }
    skeleton
}

fn show_about(window: &libadwaita::ApplicationWindow) {
    use chrono::Datelike;

    let year = chrono::Local::now().year();
    let about = libadwaita::AboutWindow::builder()
        .transient_for(window)
        .application_name(crate::data::PRODUCT_NAME)
        .application_icon("applications-science-symbolic")
        .developer_name("Himanshu")
        .version(env!("CARGO_PKG_VERSION"))
        .comments(
            "An interactive atlas of pharmacological evolution. Tracing the scientific \
             and natural heritage of life-saving medicines.",
        )
        .copyright(format!("© {} Himanshu, DITU • Bpharm Scholar", year))
        .license_type(gtk::License::MitX11)
        .build();
    about.present();
}
