use gtk::prelude::*;
use gtk::{Align, Orientation};

use crate::suggestions::Bounds;

/// Search entry, submit button and the suggestion dropdown.
#[derive(Clone)]
pub struct SearchPanel {
    pub container: gtk::Box,
    pub entry: gtk::SearchEntry,
    pub button: gtk::Button,
    button_label: gtk::Label,
    spinner: gtk::Spinner,
    popover: gtk::Popover,
    list: gtk::Box,
}

impl SearchPanel {
    pub fn new() -> Self {
        // Create search container
        let container = gtk::Box::builder()
            .orientation(Orientation::Horizontal)
            .spacing(6)
            .valign(Align::Center)
            .build();
        container.add_css_class("search-box");

        let entry = gtk::SearchEntry::builder()
            .placeholder_text("Search drug origin...")
            .width_chars(28)
            .hexpand(true)
            .build();

        // Button shows a spinner while a lookup is outstanding
        let button_label = gtk::Label::new(Some("Search"));
        let spinner = gtk::Spinner::builder().visible(false).build();
        let button_content = gtk::Box::new(Orientation::Horizontal, 0);
        button_content.append(&button_label);
        button_content.append(&spinner);

        let button = gtk::Button::builder()
            .child(&button_content)
            .tooltip_text("Look up origin")
            .build();
        button.add_css_class("suggested-action");
        button.add_css_class("search-button");

        container.append(&entry);
        container.append(&button);

        // Suggestions dropdown. Autohide is off so typing keeps focus in the entry;
        // outside clicks are handled by the window.
        let list = gtk::Box::builder()
            .orientation(Orientation::Vertical)
            .spacing(2)
            .margin_top(6)
            .margin_bottom(6)
            .margin_start(6)
            .margin_end(6)
            .build();

        let heading = gtk::Label::builder()
            .label("Suggestions")
            .halign(Align::Start)
            .margin_start(6)
            .margin_bottom(4)
            .build();
        heading.add_css_class("suggestion-heading");

        let popover_box = gtk::Box::new(Orientation::Vertical, 0);
        popover_box.append(&heading);
        popover_box.append(&list);

        let popover = gtk::Popover::builder()
            .autohide(false)
            .has_arrow(false)
            .position(gtk::PositionType::Bottom)
            .child(&popover_box)
            .build();
        popover.add_css_class("suggestion-popover");
        popover.set_parent(&container);

        Self {
            container,
            entry,
            button,
            button_label,
            spinner,
            popover,
            list,
        }
    }

    pub fn set_loading(&self, loading: bool) {
        self.button.set_sensitive(!loading);
        self.button_label.set_visible(!loading);
        self.spinner.set_visible(loading);
        self.spinner.set_spinning(loading);
    }

    /// Replace the dropdown rows and show or hide it.
    pub fn set_suggestions<F>(&self, items: &[&'static str], shown: bool, on_pick: F)
    where
        F: Fn(&'static str) + Clone + 'static,
    {
        while let Some(child) = self.list.first_child() {
            self.list.remove(&child);
        }

        for &name in items {
            let row = gtk::Box::new(Orientation::Horizontal, 8);
            let icon = gtk::Image::from_icon_name("applications-science-symbolic");
            let label = gtk::Label::builder()
                .label(name)
                .halign(Align::Start)
                .hexpand(true)
                .build();
            let chevron = gtk::Image::from_icon_name("go-next-symbolic");
            chevron.add_css_class("dim-label");
            row.append(&icon);
            row.append(&label);
            row.append(&chevron);

            let button = gtk::Button::builder()
                .child(&row)
                .focus_on_click(false)
                .build();
            button.add_css_class("flat");
            button.add_css_class("suggestion-row");

            let on_pick = on_pick.clone();
            button.connect_clicked(move |_| on_pick(name));
            self.list.append(&button);
        }

        if shown && !items.is_empty() {
            self.popover.popup();
        } else {
            self.popover.popdown();
        }
    }

    /// Bounds of the search container in `window` coordinates.
    pub fn bounds_in(&self, window: &impl IsA<gtk::Widget>) -> Option<Bounds> {
        let rect = self.container.compute_bounds(window)?;
        Some(Bounds {
            x: rect.x() as f64,
            y: rect.y() as f64,
            width: rect.width() as f64,
            height: rect.height() as f64,
        })
    }
}

impl Default for SearchPanel {
    fn default() -> Self {
        Self::new()
    }
}
