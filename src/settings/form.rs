//! Form state for the settings dialog.
//!
//! One field per widget: checked state as `bool`, field text as `String`
//! (ports included, since they are edited as text). The dialog binds these
//! to real widgets; everything that can be tested without a window lives
//! here.

use crate::preferences::{CwBackend, Document, LookupSource};
use anyhow::{Context, Result};

#[derive(Debug, Clone, Default)]
pub struct SettingsForm {
    pub use_qrz: bool,
    pub use_hamdb: bool,
    pub use_hamqth: bool,
    pub lookup_username: String,
    pub lookup_password: String,
    pub use_cloudlog: bool,
    pub cloudlog_api: String,
    pub cloudlog_url: String,
    pub cat_ip: String,
    pub cat_port: String,
    pub use_rigctld: bool,
    pub use_flrig: bool,
    pub marker_file: String,
    pub use_marker: bool,
    pub cw_ip: String,
    pub cw_port: String,
    pub use_cwdaemon: bool,
    pub use_pywinkeyer: bool,
    pub connect_to_server: bool,
    pub multicast_group: String,
    pub multicast_port: String,
    pub interface_ip: String,
    pub send_n1mm_packets: bool,
    pub n1mm_station_name: String,
    pub n1mm_operator: String,
    pub n1mm_ip: String,
    pub n1mm_radioport: String,
    pub n1mm_contactport: String,
    pub n1mm_lookupport: String,
    pub n1mm_scoreport: String,
}

impl SettingsForm {
    /// Populate every field from the loaded document. Missing or falsy
    /// values show as unchecked boxes and empty fields.
    pub fn from_document(document: &Document) -> Self {
        let cw = document.cw_backend();
        Self {
            use_qrz: document.flag("useqrz"),
            use_hamdb: document.flag("usehamdb"),
            use_hamqth: document.flag("usehamqth"),
            lookup_username: document.text("lookupusername"),
            lookup_password: document.text("lookuppassword"),
            use_cloudlog: document.flag("cloudlog"),
            cloudlog_api: document.text("cloudlogapi"),
            cloudlog_url: document.text("cloudlogurl"),
            cat_ip: document.text("CAT_ip"),
            cat_port: document.numeric_text("CAT_port"),
            use_rigctld: document.flag("userigctld"),
            use_flrig: document.flag("useflrig"),
            marker_file: document.text("markerfile"),
            use_marker: document.flag("usemarker"),
            cw_ip: document.text("cwip"),
            cw_port: document.numeric_text("cwport"),
            use_cwdaemon: cw == CwBackend::CwDaemon,
            use_pywinkeyer: cw == CwBackend::PyWinKeyer,
            connect_to_server: document.flag("useserver"),
            multicast_group: document.text("multicast_group"),
            multicast_port: document.numeric_text("multicast_port"),
            interface_ip: document.text("interface_ip"),
            send_n1mm_packets: document.flag("send_n1mm_packets"),
            n1mm_station_name: document.text("n1mm_station_name"),
            n1mm_operator: document.text("n1mm_operator"),
            n1mm_ip: document.text("n1mm_ip"),
            n1mm_radioport: document.numeric_text("n1mm_radioport"),
            n1mm_contactport: document.numeric_text("n1mm_contactport"),
            n1mm_lookupport: document.numeric_text("n1mm_lookupport"),
            n1mm_scoreport: document.numeric_text("n1mm_scoreport"),
        }
    }

    /// Lookup service currently selected on the form, if any. The three
    /// radio states stay independent in storage; this is the normalized
    /// view collaborators want.
    pub fn lookup_source(&self) -> Option<LookupSource> {
        if self.use_qrz {
            Some(LookupSource::Qrz)
        } else if self.use_hamdb {
            Some(LookupSource::HamDb)
        } else if self.use_hamqth {
            Some(LookupSource::HamQth)
        } else {
            None
        }
    }

    pub fn cw_backend(&self) -> CwBackend {
        CwBackend::from_radios(self.use_cwdaemon, self.use_pywinkeyer)
    }

    /// Merge the form into `document`. Keys without a field keep their
    /// loaded values. The two integer ports are parsed before any key is
    /// written, so a bad port aborts the save with the document untouched.
    pub fn apply_to(&self, document: &mut Document) -> Result<()> {
        let cat_port = parse_port(&self.cat_port, "rig control port")?;
        let cw_port = parse_port(&self.cw_port, "CW keyer port")?;

        document.set_flag("useqrz", self.use_qrz);
        document.set_flag("usehamdb", self.use_hamdb);
        document.set_flag("usehamqth", self.use_hamqth);
        document.set_text("lookupusername", &self.lookup_username);
        document.set_text("lookuppassword", &self.lookup_password);
        document.set_flag("cloudlog", self.use_cloudlog);
        document.set_text("cloudlogapi", &self.cloudlog_api);
        document.set_text("cloudlogurl", &self.cloudlog_url);
        document.set_text("CAT_ip", &self.cat_ip);
        document.set_integer("CAT_port", cat_port);
        document.set_flag("userigctld", self.use_rigctld);
        document.set_flag("useflrig", self.use_flrig);
        document.set_text("markerfile", &self.marker_file);
        document.set_flag("usemarker", self.use_marker);
        document.set_text("cwip", &self.cw_ip);
        document.set_integer("cwport", cw_port);
        document.set_cw_backend(self.cw_backend());
        document.set_flag("useserver", self.connect_to_server);
        // The multicast and N1MM ports stay strings; the logger reads them
        // back through the same string conversion either way.
        document.set_text("multicast_group", &self.multicast_group);
        document.set_text("multicast_port", &self.multicast_port);
        document.set_text("interface_ip", &self.interface_ip);
        document.set_flag("send_n1mm_packets", self.send_n1mm_packets);
        document.set_text("n1mm_station_name", &self.n1mm_station_name);
        document.set_text("n1mm_operator", &self.n1mm_operator);
        document.set_text("n1mm_ip", &self.n1mm_ip);
        document.set_text("n1mm_radioport", &self.n1mm_radioport);
        document.set_text("n1mm_contactport", &self.n1mm_contactport);
        document.set_text("n1mm_lookupport", &self.n1mm_lookupport);
        document.set_text("n1mm_scoreport", &self.n1mm_scoreport);
        Ok(())
    }
}

/// An empty port field stores the falsy 0, which reads back as an empty
/// field on the next open. Anything else must parse as an integer.
fn parse_port(text: &str, label: &str) -> Result<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse()
        .with_context(|| format!("invalid {label} {text:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("fdprefs_form_{}_{}.json", std::process::id(), name))
    }

    fn write_doc(path: &PathBuf, value: Value) {
        std::fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    }

    #[test]
    fn test_unedited_confirm_round_trips_stored_keys() {
        let path = temp_path("round_trip");
        let original = json!({
            "useqrz": true,
            "usehamdb": false,
            "usehamqth": false,
            "lookupusername": "K6GTE",
            "lookuppassword": "secret",
            "cloudlog": true,
            "cloudlogapi": "deadbeef",
            "cloudlogurl": "https://cloudlog.example/index.php",
            "CAT_ip": "127.0.0.1",
            "CAT_port": 4532,
            "userigctld": true,
            "useflrig": false,
            "markerfile": "markers.adif",
            "usemarker": true,
            "cwip": "127.0.0.1",
            "cwport": 6789,
            "cwtype": 1,
            "useserver": true,
            "multicast_group": "239.1.1.1",
            "multicast_port": "2239",
            "interface_ip": "0.0.0.0",
            "send_n1mm_packets": false,
            "n1mm_station_name": "20M CW Tent",
            "n1mm_operator": "Bernie",
            "n1mm_ip": "127.0.0.1",
            "n1mm_radioport": "12060",
            "n1mm_contactport": "12061",
            "n1mm_lookupport": "12060",
            "n1mm_scoreport": "12062",
        });
        write_doc(&path, original.clone());

        let mut document = Document::load(&path).unwrap();
        let form = SettingsForm::from_document(&document);
        form.apply_to(&mut document).unwrap();
        document.save(&path).unwrap();

        let reloaded = Document::load(&path).unwrap();
        for (key, value) in original.as_object().unwrap() {
            assert_eq!(
                reloaded.value(key),
                Some(value),
                "key {key} changed across an unedited confirm"
            );
        }
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_absent_booleans_load_unchecked_and_save_false() {
        let path = temp_path("absent_bools");
        write_doc(&path, json!({"lookupusername": "K6GTE"}));

        let mut document = Document::load(&path).unwrap();
        let form = SettingsForm::from_document(&document);
        assert!(!form.use_qrz);
        assert!(!form.use_cloudlog);
        assert!(!form.use_marker);
        assert!(!form.connect_to_server);
        assert!(!form.send_n1mm_packets);

        form.apply_to(&mut document).unwrap();
        for key in [
            "useqrz",
            "usehamdb",
            "usehamqth",
            "cloudlog",
            "userigctld",
            "useflrig",
            "usemarker",
            "useserver",
            "send_n1mm_packets",
        ] {
            assert_eq!(document.value(key), Some(&json!(false)), "key {key}");
        }
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_cwtype_selects_exactly_one_radio() {
        let one = SettingsForm::from_document(&Document::from_value(json!({"cwtype": 1})));
        assert!(one.use_cwdaemon && !one.use_pywinkeyer);

        let two = SettingsForm::from_document(&Document::from_value(json!({"cwtype": 2})));
        assert!(!two.use_cwdaemon && two.use_pywinkeyer);

        let zero = SettingsForm::from_document(&Document::from_value(json!({"cwtype": 0})));
        assert!(!zero.use_cwdaemon && !zero.use_pywinkeyer);

        let missing = SettingsForm::from_document(&Document::from_value(json!({})));
        assert!(!missing.use_cwdaemon && !missing.use_pywinkeyer);
    }

    #[test]
    fn test_pywinkeyer_wins_when_both_radios_are_checked() {
        let mut document = Document::from_value(json!({}));
        let form = SettingsForm {
            use_cwdaemon: true,
            use_pywinkeyer: true,
            ..SettingsForm::default()
        };
        form.apply_to(&mut document).unwrap();
        assert_eq!(document.value("cwtype"), Some(&json!(2)));
    }

    #[test]
    fn test_rig_control_port_parses_as_integer() {
        let mut document = Document::from_value(json!({}));
        let form = SettingsForm {
            cat_port: "4532".to_string(),
            ..SettingsForm::default()
        };
        form.apply_to(&mut document).unwrap();
        assert_eq!(document.value("CAT_port"), Some(&json!(4532)));
    }

    #[test]
    fn test_bad_port_aborts_without_touching_document_or_disk() {
        let path = temp_path("bad_port");
        write_doc(&path, json!({"CAT_port": 4532, "useqrz": true}));
        let on_disk_before = std::fs::read(&path).unwrap();

        let mut document = Document::load(&path).unwrap();
        let before = document.clone();
        let mut form = SettingsForm::from_document(&document);
        form.cat_port = "abc".to_string();

        assert!(form.apply_to(&mut document).is_err());
        assert_eq!(document, before, "in-memory document must stay untouched");
        assert_eq!(std::fs::read(&path).unwrap(), on_disk_before);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_bad_cw_port_also_aborts() {
        let mut document = Document::from_value(json!({}));
        let form = SettingsForm {
            cw_port: "morse".to_string(),
            ..SettingsForm::default()
        };
        assert!(form.apply_to(&mut document).is_err());
        assert_eq!(document.value("cwport"), None);
    }

    #[test]
    fn test_multicast_port_stays_a_string() {
        // Loads from integer storage, saves back as text.
        let mut document = Document::from_value(json!({"multicast_port": 2239}));
        let form = SettingsForm::from_document(&document);
        assert_eq!(form.multicast_port, "2239");
        form.apply_to(&mut document).unwrap();
        assert_eq!(document.value("multicast_port"), Some(&json!("2239")));
    }

    #[test]
    fn test_n1mm_ports_stay_strings() {
        let mut document = Document::from_value(json!({"n1mm_radioport": 12060}));
        let form = SettingsForm::from_document(&document);
        form.apply_to(&mut document).unwrap();
        assert_eq!(document.value("n1mm_radioport"), Some(&json!("12060")));
        assert_eq!(document.value("n1mm_scoreport"), Some(&json!("")));
    }

    #[test]
    fn test_confirm_fills_every_known_key_with_defaults() {
        let path = temp_path("defaults");
        write_doc(&path, json!({"markerfile": "", "useqrz": true}));

        let mut document = Document::load(&path).unwrap();
        let form = SettingsForm::from_document(&document);
        form.apply_to(&mut document).unwrap();
        document.save(&path).unwrap();

        let reloaded = Document::load(&path).unwrap();
        assert_eq!(reloaded.value("useqrz"), Some(&json!(true)));
        assert_eq!(reloaded.value("markerfile"), Some(&json!("")));
        assert_eq!(reloaded.value("lookupusername"), Some(&json!("")));
        assert_eq!(reloaded.value("cloudlog"), Some(&json!(false)));
        assert_eq!(reloaded.value("CAT_port"), Some(&json!(0)));
        assert_eq!(reloaded.value("cwport"), Some(&json!(0)));
        assert_eq!(reloaded.value("cwtype"), Some(&json!(0)));
        assert_eq!(reloaded.value("multicast_port"), Some(&json!("")));
        assert_eq!(reloaded.value("n1mm_scoreport"), Some(&json!("")));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_two_lookup_flags_pass_through_independently() {
        // A hand-edited document can carry two set flags; storage keeps the
        // radio states independent and the normalized view picks the first.
        let mut document = Document::from_value(json!({"useqrz": true, "usehamdb": true}));
        let form = SettingsForm::from_document(&document);
        assert!(form.use_qrz && form.use_hamdb);
        assert_eq!(form.lookup_source(), Some(LookupSource::Qrz));

        form.apply_to(&mut document).unwrap();
        assert_eq!(document.value("useqrz"), Some(&json!(true)));
        assert_eq!(document.value("usehamdb"), Some(&json!(true)));
    }

    #[test]
    fn test_merge_keeps_keys_without_fields() {
        let mut document = Document::from_value(json!({"mycall": "W1AW", "useqrz": true}));
        let form = SettingsForm::from_document(&document);
        form.apply_to(&mut document).unwrap();
        assert_eq!(document.value("mycall"), Some(&json!("W1AW")));
    }
}
