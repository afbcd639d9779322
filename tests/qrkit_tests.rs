use std::cell::Cell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use qrkit::{
    ContactCard, ContentPayload, ExportFormat, FileBackend, LinkRecord, NetworkCredential,
    PresetStore, QRKitResult, RenderCapability, RenderProvider, RenderRequest, Security, Session,
    StyleConfig, StyledRenderer, PRESET_CAP,
};

fn temp_store_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("qrkit-test-{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn link(url: &str) -> ContentPayload {
    ContentPayload::Link(LinkRecord { url: url.into() })
}

mod encoder_tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn test_empty_contact_card_has_markers_and_formatted_name_only() {
        let encoded = ContentPayload::Vcard(ContactCard::default()).encode();
        let lines: Vec<&str> = encoded.lines().collect();
        assert_eq!(lines, ["BEGIN:VCARD", "VERSION:3.0", "N:;;;;", "FN:", "END:VCARD"]);
    }

    #[test]
    fn test_wifi_record_encodes_exactly() {
        let payload = ContentPayload::Wifi(NetworkCredential {
            ssid: "Home".into(),
            password: Some("secret".into()),
            security: "wpa".parse().unwrap(),
            hidden: true,
        });
        assert_eq!(payload.encode(), "WIFI:T:WPA;S:Home;P:secret;H:true;;");
    }

    #[test]
    fn test_wifi_without_password_keeps_empty_field() {
        let payload = ContentPayload::Wifi(NetworkCredential {
            ssid: "Cafe".into(),
            security: Security::Nopass,
            ..NetworkCredential::default()
        });
        assert_eq!(payload.encode(), "WIFI:T:NOPASS;S:Cafe;P:;H:false;;");
    }

    #[test_case("org", "ORG:"; "organization")]
    #[test_case("title", "TITLE:"; "title")]
    #[test_case("phone", "TEL;TYPE=CELL:"; "phone typed as mobile")]
    #[test_case("email", "EMAIL:"; "email")]
    #[test_case("url", "URL:"; "url")]
    fn test_optional_vcard_line_present_only_when_set(field: &str, prefix: &str) {
        let mut card = ContactCard::default();
        assert!(!ContentPayload::Vcard(card.clone()).encode().contains(prefix));
        match field {
            "org" => card.org = "ACME".into(),
            "title" => card.title = "CTO".into(),
            "phone" => card.phone = "+1 555".into(),
            "email" => card.email = "x@example.com".into(),
            "url" => card.url = "https://example.com".into(),
            _ => unreachable!(),
        }
        assert!(ContentPayload::Vcard(card).encode().contains(prefix));
    }
}

mod encoder_proptests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn proptest_wifi_envelope(ssid in "[a-zA-Z0-9 ]{0,32}", password in proptest::option::of("[a-zA-Z0-9]{0,32}"), hidden in any::<bool>()) {
            let payload = ContentPayload::Wifi(NetworkCredential {
                ssid,
                password,
                security: Security::Wep,
                hidden,
            });
            let encoded = payload.encode();
            let hidden_field = if hidden { ";H:true;" } else { ";H:false;" };
            prop_assert!(encoded.starts_with("WIFI:T:WEP;S:"));
            prop_assert!(encoded.ends_with(";;"));
            prop_assert!(encoded.contains(hidden_field));
        }

        #[test]
        fn proptest_vcard_envelope_and_order(first in "[a-zA-Z]{0,12}", last in "[a-zA-Z]{0,12}", org in "[a-zA-Z ]{0,12}") {
            let payload = ContentPayload::Vcard(ContactCard {
                first_name: first,
                last_name: last,
                org: org.clone(),
                ..ContactCard::default()
            });
            let encoded = payload.encode();
            let lines: Vec<&str> = encoded.lines().collect();
            prop_assert_eq!(lines[0], "BEGIN:VCARD");
            prop_assert_eq!(lines[1], "VERSION:3.0");
            prop_assert!(lines[2].starts_with("N:"));
            prop_assert!(lines[3].starts_with("FN:"));
            prop_assert_eq!(*lines.last().unwrap(), "END:VCARD");
            prop_assert_eq!(encoded.contains("ORG:"), !org.is_empty());
            prop_assert!(!lines.contains(&""));
        }
    }
}

mod preset_persistence_tests {
    use super::*;

    #[test]
    fn test_presets_survive_reopen_with_order_and_cap() {
        let dir = temp_store_dir();
        let mut store = PresetStore::open(Box::new(FileBackend::new(&dir)));
        for i in 0..=PRESET_CAP {
            store.save(&link(&format!("https://example.com/{i}")), &StyleConfig::default());
        }
        drop(store);

        let reopened = PresetStore::open(Box::new(FileBackend::new(&dir)));
        assert_eq!(reopened.len(), PRESET_CAP);
        assert_eq!(reopened.presets()[0].name, format!("https://example.com/{PRESET_CAP}"));
        assert_eq!(
            reopened.presets()[PRESET_CAP - 1].name,
            "https://example.com/1",
            "oldest saved preset should have been evicted"
        );
    }

    #[test]
    fn test_missing_slot_reads_as_empty() {
        let store = PresetStore::open(Box::new(FileBackend::new(temp_store_dir())));
        assert!(store.is_empty());
    }

    #[test]
    fn test_contact_card_roundtrips_through_preset() {
        let dir = temp_store_dir();
        let card = ContactCard {
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            org: "Navy".into(),
            phone: "+1 555 0100".into(),
            ..ContactCard::default()
        };
        let payload = ContentPayload::Vcard(card);
        let before = payload.encode();

        let mut session = Session::new(PresetStore::open(Box::new(FileBackend::new(&dir))));
        session.set_payload(payload);
        let id = session.save_preset().unwrap().id.clone();

        let mut restored = Session::new(PresetStore::open(Box::new(FileBackend::new(&dir))));
        assert!(restored.load_preset(&id));
        assert_eq!(restored.content(), before);
    }
}

mod session_render_tests {
    use super::*;

    struct FailingProvider;

    impl RenderProvider for FailingProvider {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn acquire(&self) -> QRKitResult<Box<dyn RenderCapability>> {
            Err(qrkit::QRKitError::RenderUnavailable)
        }
    }

    struct CountingRenderer(Rc<Cell<usize>>);

    impl RenderCapability for CountingRenderer {
        fn supports_styling(&self) -> bool {
            true
        }

        fn render(&self, request: &RenderRequest) -> QRKitResult<qrkit::Artifact> {
            self.0.set(self.0.get() + 1);
            StyledRenderer.render(request)
        }
    }

    struct CountingProvider(Rc<Cell<usize>>);

    impl RenderProvider for CountingProvider {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn acquire(&self) -> QRKitResult<Box<dyn RenderCapability>> {
            Ok(Box::new(CountingRenderer(self.0.clone())))
        }
    }

    #[test]
    fn test_png_export_writes_png_bytes() {
        let mut session = Session::new(PresetStore::in_memory());
        session.set_payload(link("https://example.com"));
        let bundle = session.export(ExportFormat::Png).unwrap();
        assert!(bundle.filename.starts_with("qrkit-"));
        assert!(bundle.filename.ends_with(".png"));
        assert_eq!(&bundle.bytes[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }

    #[test]
    fn test_svg_export_writes_markup() {
        let mut session = Session::new(PresetStore::in_memory());
        session.set_payload(link("https://example.com"));
        let bundle = session.export(ExportFormat::Svg).unwrap();
        let svg = String::from_utf8(bundle.bytes).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_unchanged_state_reuses_cached_artifact() {
        let calls = Rc::new(Cell::new(0));
        let providers: Vec<Box<dyn RenderProvider>> =
            vec![Box::new(CountingProvider(calls.clone()))];
        let mut session = Session::start(&providers, PresetStore::in_memory());
        session.set_payload(link("https://example.com"));

        session.render().unwrap();
        session.render().unwrap();
        assert_eq!(calls.get(), 1, "identical input should not re-render");

        let mut style = session.style().clone();
        style.margin = 0;
        session.set_style(style);
        session.render().unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_fallback_disables_styling_and_ignores_colors() {
        let providers: Vec<Box<dyn RenderProvider>> =
            vec![Box::new(FailingProvider), Box::new(qrkit::render::BasicProvider)];
        let mut session = Session::start(&providers, PresetStore::in_memory());
        assert!(session.fallback_active());
        assert!(!session.styling_enabled());
        assert_eq!(session.render_mode(), "fallback");

        session.set_payload(link("https://example.com"));
        session.set_style(StyleConfig { dark_a: "#ff0000".into(), ..StyleConfig::default() });
        let svg = session.render().unwrap().svg.clone().unwrap();
        assert!(svg.contains("#000000"));
        assert!(!svg.contains("#ff0000"));
    }

    #[test]
    fn test_total_acquisition_failure_is_terminal_and_quiet() {
        let providers: Vec<Box<dyn RenderProvider>> =
            vec![Box::new(FailingProvider), Box::new(FailingProvider)];
        let mut session = Session::start(&providers, PresetStore::in_memory());
        assert_eq!(session.render_mode(), "unavailable");
        session.set_payload(link("https://example.com"));
        assert!(session.render().is_none());
        assert!(session.export(ExportFormat::Png).is_none());
        // presets still work without a renderer
        assert!(session.save_preset().is_some());
    }
}
