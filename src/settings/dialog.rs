//! GTK4 settings dialog implementation.
//!
//! One notebook tab per settings group. Save collects the widget states
//! into a [`SettingsForm`], merges it into the loaded document, and
//! overwrites `fd_preferences.json`; Cancel closes without writing.

use crate::preferences::Document;
use crate::settings::form::SettingsForm;
use crate::AppEvent;
use crossbeam_channel::Sender;
use gtk4::prelude::*;
use gtk4::{
    Application, ApplicationWindow, Box as GtkBox, Button, CheckButton, Entry, Grid, Label,
    Notebook, Orientation, Separator,
};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{error, info};

/// Show the settings dialog for the preferences document at `prefs_path`.
///
/// The document is read in full when the window opens; a missing or
/// malformed file means the dialog never appears.
pub fn show_settings_dialog(prefs_path: PathBuf, event_tx: Sender<AppEvent>) {
    std::thread::spawn(move || {
        if let Err(e) = gtk4::init() {
            error!("Failed to initialize GTK: {}", e);
            let _ = event_tx.send(AppEvent::Quit);
            return;
        }

        let app = Application::builder()
            .application_id(format!("org.fdprefs.settings.{}", std::process::id()))
            .build();

        let path_clone = prefs_path.clone();
        let event_tx_clone = event_tx.clone();
        app.connect_activate(move |app| {
            match Document::load(&path_clone) {
                Ok(document) => build_settings_window(
                    app,
                    document,
                    path_clone.clone(),
                    event_tx_clone.clone(),
                ),
                Err(e) => {
                    error!("Failed to open preferences: {:#}", e);
                    app.quit();
                }
            }
        });

        app.run_with_args::<String>(&[]);
        let _ = event_tx.send(AppEvent::Quit);
    });
}

fn build_settings_window(
    app: &Application,
    document: Document,
    prefs_path: PathBuf,
    event_tx: Sender<AppEvent>,
) {
    let window = ApplicationWindow::builder()
        .application(app)
        .title("Field Day Logger Settings")
        .default_width(520)
        .default_height(420)
        .build();

    let form = SettingsForm::from_document(&document);
    let widgets = FieldWidgets::new(&form);

    let notebook = Notebook::new();
    notebook.set_vexpand(true);
    notebook.append_page(&widgets.lookup_tab(), Some(&Label::new(Some("Callsign Lookup"))));
    notebook.append_page(&widgets.cloudlog_tab(), Some(&Label::new(Some("Cloudlog"))));
    notebook.append_page(&widgets.rig_control_tab(), Some(&Label::new(Some("Rig Control"))));
    notebook.append_page(&widgets.cw_keyer_tab(), Some(&Label::new(Some("CW Keyer"))));
    notebook.append_page(&widgets.group_tab(), Some(&Label::new(Some("Group Operation"))));
    notebook.append_page(&widgets.n1mm_tab(), Some(&Label::new(Some("N1MM Packets"))));

    let vbox = GtkBox::new(Orientation::Vertical, 8);
    vbox.append(&notebook);
    vbox.append(&button_row(&window, widgets, document, prefs_path, event_tx));

    window.set_child(Some(&vbox));
    window.present();
}

/// Save/Cancel row along the bottom of the window.
fn button_row(
    window: &ApplicationWindow,
    widgets: FieldWidgets,
    document: Document,
    prefs_path: PathBuf,
    event_tx: Sender<AppEvent>,
) -> GtkBox {
    let row = GtkBox::new(Orientation::Horizontal, 8);
    row.set_margin_start(12);
    row.set_margin_end(12);
    row.set_margin_bottom(12);
    row.set_halign(gtk4::Align::End);

    let cancel_btn = Button::with_label("Cancel");
    let window_for_cancel = window.clone();
    cancel_btn.connect_clicked(move |_| {
        window_for_cancel.close();
    });
    row.append(&cancel_btn);

    let save_btn = Button::with_label("Save");
    save_btn.add_css_class("suggested-action");

    let document = Rc::new(RefCell::new(document));
    let window_for_save = window.clone();
    save_btn.connect_clicked(move |_| {
        let form = widgets.collect();
        let mut document = document.borrow_mut();
        if let Err(e) = form.apply_to(&mut document) {
            // A non-numeric port aborts the save; the file keeps its
            // previous contents and the window still closes.
            error!("save_changes: {:#}", e);
        } else if let Err(e) = document.save(&prefs_path) {
            error!("save_changes: {:#}", e);
        } else {
            info!(
                "Preferences saved to {} (lookup {:?}, CW {:?})",
                prefs_path.display(),
                form.lookup_source(),
                form.cw_backend()
            );
            let _ = event_tx.send(AppEvent::ReloadPreferences);
        }
        window_for_save.close();
    });
    row.append(&save_btn);

    row
}

/// Every editable widget on the dialog, created once from the loaded form
/// state and read back on save. GTK widgets are reference counted, so the
/// clone captured by the save closure aliases the on-screen ones.
#[derive(Clone)]
struct FieldWidgets {
    use_qrz: CheckButton,
    use_hamdb: CheckButton,
    use_hamqth: CheckButton,
    lookup_username: Entry,
    lookup_password: Entry,
    use_cloudlog: CheckButton,
    cloudlog_api: Entry,
    cloudlog_url: Entry,
    use_rigctld: CheckButton,
    use_flrig: CheckButton,
    cat_ip: Entry,
    cat_port: Entry,
    marker_file: Entry,
    use_marker: CheckButton,
    cw_ip: Entry,
    cw_port: Entry,
    use_cwdaemon: CheckButton,
    use_pywinkeyer: CheckButton,
    connect_to_server: CheckButton,
    multicast_group: Entry,
    multicast_port: Entry,
    interface_ip: Entry,
    send_n1mm_packets: CheckButton,
    n1mm_station_name: Entry,
    n1mm_operator: Entry,
    n1mm_ip: Entry,
    n1mm_radioport: Entry,
    n1mm_contactport: Entry,
    n1mm_lookupport: Entry,
    n1mm_scoreport: Entry,
}

impl FieldWidgets {
    fn new(form: &SettingsForm) -> Self {
        let use_qrz = CheckButton::with_label("QRZ");
        let use_hamdb = CheckButton::with_label("HamDB");
        let use_hamqth = CheckButton::with_label("HamQTH");
        // Widget grouping is what makes these radios exclusive; the
        // document itself stores three independent flags.
        use_hamdb.set_group(Some(&use_qrz));
        use_hamqth.set_group(Some(&use_qrz));
        use_qrz.set_active(form.use_qrz);
        use_hamdb.set_active(form.use_hamdb);
        use_hamqth.set_active(form.use_hamqth);

        let use_rigctld = CheckButton::with_label("rigctld");
        let use_flrig = CheckButton::with_label("flrig");
        use_flrig.set_group(Some(&use_rigctld));
        use_rigctld.set_active(form.use_rigctld);
        use_flrig.set_active(form.use_flrig);

        let use_cwdaemon = CheckButton::with_label("cwdaemon");
        let use_pywinkeyer = CheckButton::with_label("PyWinKeyer");
        use_pywinkeyer.set_group(Some(&use_cwdaemon));
        use_cwdaemon.set_active(form.use_cwdaemon);
        use_pywinkeyer.set_active(form.use_pywinkeyer);

        let use_cloudlog = CheckButton::with_label("Send contacts to Cloudlog");
        use_cloudlog.set_active(form.use_cloudlog);
        let use_marker = CheckButton::with_label("Generate band marker file");
        use_marker.set_active(form.use_marker);
        let connect_to_server = CheckButton::with_label("Connect to group server");
        connect_to_server.set_active(form.connect_to_server);
        let send_n1mm_packets = CheckButton::with_label("Send N1MM packets");
        send_n1mm_packets.set_active(form.send_n1mm_packets);

        let lookup_password = entry_with_text(&form.lookup_password);
        lookup_password.set_visibility(false);

        Self {
            use_qrz,
            use_hamdb,
            use_hamqth,
            lookup_username: entry_with_text(&form.lookup_username),
            lookup_password,
            use_cloudlog,
            cloudlog_api: entry_with_text(&form.cloudlog_api),
            cloudlog_url: entry_with_text(&form.cloudlog_url),
            use_rigctld,
            use_flrig,
            cat_ip: entry_with_text(&form.cat_ip),
            cat_port: entry_with_text(&form.cat_port),
            marker_file: entry_with_text(&form.marker_file),
            use_marker,
            cw_ip: entry_with_text(&form.cw_ip),
            cw_port: entry_with_text(&form.cw_port),
            use_cwdaemon,
            use_pywinkeyer,
            connect_to_server,
            multicast_group: entry_with_text(&form.multicast_group),
            multicast_port: entry_with_text(&form.multicast_port),
            interface_ip: entry_with_text(&form.interface_ip),
            send_n1mm_packets,
            n1mm_station_name: entry_with_text(&form.n1mm_station_name),
            n1mm_operator: entry_with_text(&form.n1mm_operator),
            n1mm_ip: entry_with_text(&form.n1mm_ip),
            n1mm_radioport: entry_with_text(&form.n1mm_radioport),
            n1mm_contactport: entry_with_text(&form.n1mm_contactport),
            n1mm_lookupport: entry_with_text(&form.n1mm_lookupport),
            n1mm_scoreport: entry_with_text(&form.n1mm_scoreport),
        }
    }

    /// Read every widget back into plain form state.
    fn collect(&self) -> SettingsForm {
        SettingsForm {
            use_qrz: self.use_qrz.is_active(),
            use_hamdb: self.use_hamdb.is_active(),
            use_hamqth: self.use_hamqth.is_active(),
            lookup_username: self.lookup_username.text().to_string(),
            lookup_password: self.lookup_password.text().to_string(),
            use_cloudlog: self.use_cloudlog.is_active(),
            cloudlog_api: self.cloudlog_api.text().to_string(),
            cloudlog_url: self.cloudlog_url.text().to_string(),
            cat_ip: self.cat_ip.text().to_string(),
            cat_port: self.cat_port.text().to_string(),
            use_rigctld: self.use_rigctld.is_active(),
            use_flrig: self.use_flrig.is_active(),
            marker_file: self.marker_file.text().to_string(),
            use_marker: self.use_marker.is_active(),
            cw_ip: self.cw_ip.text().to_string(),
            cw_port: self.cw_port.text().to_string(),
            use_cwdaemon: self.use_cwdaemon.is_active(),
            use_pywinkeyer: self.use_pywinkeyer.is_active(),
            connect_to_server: self.connect_to_server.is_active(),
            multicast_group: self.multicast_group.text().to_string(),
            multicast_port: self.multicast_port.text().to_string(),
            interface_ip: self.interface_ip.text().to_string(),
            send_n1mm_packets: self.send_n1mm_packets.is_active(),
            n1mm_station_name: self.n1mm_station_name.text().to_string(),
            n1mm_operator: self.n1mm_operator.text().to_string(),
            n1mm_ip: self.n1mm_ip.text().to_string(),
            n1mm_radioport: self.n1mm_radioport.text().to_string(),
            n1mm_contactport: self.n1mm_contactport.text().to_string(),
            n1mm_lookupport: self.n1mm_lookupport.text().to_string(),
            n1mm_scoreport: self.n1mm_scoreport.text().to_string(),
        }
    }

    fn lookup_tab(&self) -> GtkBox {
        let vbox = tab_box("Callsign Lookup Service");

        let radios = GtkBox::new(Orientation::Horizontal, 16);
        radios.append(&self.use_qrz);
        radios.append(&self.use_hamdb);
        radios.append(&self.use_hamqth);
        vbox.append(&radios);

        vbox.append(&Separator::new(Orientation::Horizontal));

        let grid = field_grid();
        labeled_row(&grid, 0, "Username:", &self.lookup_username);
        labeled_row(&grid, 1, "Password:", &self.lookup_password);
        vbox.append(&grid);

        vbox
    }

    fn cloudlog_tab(&self) -> GtkBox {
        let vbox = tab_box("Cloudlog");
        vbox.append(&self.use_cloudlog);

        let grid = field_grid();
        labeled_row(&grid, 0, "API key:", &self.cloudlog_api);
        labeled_row(&grid, 1, "URL:", &self.cloudlog_url);
        vbox.append(&grid);

        vbox
    }

    fn rig_control_tab(&self) -> GtkBox {
        let vbox = tab_box("Rig Control");

        let radios = GtkBox::new(Orientation::Horizontal, 16);
        radios.append(&self.use_rigctld);
        radios.append(&self.use_flrig);
        vbox.append(&radios);

        let grid = field_grid();
        labeled_row(&grid, 0, "CAT address:", &self.cat_ip);
        labeled_row(&grid, 1, "CAT port:", &self.cat_port);
        vbox.append(&grid);

        vbox.append(&Separator::new(Orientation::Horizontal));

        let marker_grid = field_grid();
        labeled_row(&marker_grid, 0, "Marker file:", &self.marker_file);
        vbox.append(&marker_grid);
        vbox.append(&self.use_marker);

        vbox
    }

    fn cw_keyer_tab(&self) -> GtkBox {
        let vbox = tab_box("CW Keyer");

        let radios = GtkBox::new(Orientation::Horizontal, 16);
        radios.append(&self.use_cwdaemon);
        radios.append(&self.use_pywinkeyer);
        vbox.append(&radios);

        let grid = field_grid();
        labeled_row(&grid, 0, "Keyer address:", &self.cw_ip);
        labeled_row(&grid, 1, "Keyer port:", &self.cw_port);
        vbox.append(&grid);

        vbox
    }

    fn group_tab(&self) -> GtkBox {
        let vbox = tab_box("Group Operation");
        vbox.append(&self.connect_to_server);

        let grid = field_grid();
        labeled_row(&grid, 0, "Multicast group:", &self.multicast_group);
        labeled_row(&grid, 1, "Multicast port:", &self.multicast_port);
        labeled_row(&grid, 2, "Interface IP:", &self.interface_ip);
        vbox.append(&grid);

        vbox
    }

    fn n1mm_tab(&self) -> GtkBox {
        let vbox = tab_box("N1MM Packets");
        vbox.append(&self.send_n1mm_packets);

        let grid = field_grid();
        labeled_row(&grid, 0, "Station name:", &self.n1mm_station_name);
        labeled_row(&grid, 1, "Operator:", &self.n1mm_operator);
        labeled_row(&grid, 2, "IP:", &self.n1mm_ip);
        labeled_row(&grid, 3, "Radio port:", &self.n1mm_radioport);
        labeled_row(&grid, 4, "Contact port:", &self.n1mm_contactport);
        labeled_row(&grid, 5, "Lookup port:", &self.n1mm_lookupport);
        labeled_row(&grid, 6, "Score port:", &self.n1mm_scoreport);
        vbox.append(&grid);

        vbox
    }
}

fn entry_with_text(text: &str) -> Entry {
    let entry = Entry::new();
    entry.set_text(text);
    entry.set_hexpand(true);
    entry
}

fn tab_box(title: &str) -> GtkBox {
    let vbox = GtkBox::new(Orientation::Vertical, 12);
    vbox.set_margin_top(20);
    vbox.set_margin_bottom(20);
    vbox.set_margin_start(20);
    vbox.set_margin_end(20);

    let label = Label::new(Some(title));
    label.add_css_class("title-2");
    vbox.append(&label);
    vbox.append(&Separator::new(Orientation::Horizontal));

    vbox
}

fn field_grid() -> Grid {
    let grid = Grid::new();
    grid.set_row_spacing(8);
    grid.set_column_spacing(16);
    grid.set_margin_top(12);
    grid
}

fn labeled_row(grid: &Grid, row: i32, label: &str, entry: &Entry) {
    let label = Label::new(Some(label));
    label.set_halign(gtk4::Align::Start);
    grid.attach(&label, 0, row, 1, 1);
    grid.attach(entry, 1, row, 1, 1);
}
