use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{QRKitError, QRKitResult};

// Mode
//------------------------------------------------------------------------------

/// Tag selecting which payload variant the editor is working on.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Link,
    Vcard,
    Wifi,
}

// Security
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Security {
    #[serde(alias = "WPA")]
    Wpa,
    #[serde(alias = "WEP")]
    Wep,
    #[serde(alias = "none", alias = "NOPASS")]
    Nopass,
}

impl Security {
    /// Wire form, always uppercase regardless of how the value was entered.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wpa => "WPA",
            Self::Wep => "WEP",
            Self::Nopass => "NOPASS",
        }
    }
}

impl Default for Security {
    fn default() -> Self {
        Self::Wpa
    }
}

impl FromStr for Security {
    type Err = QRKitError;

    fn from_str(s: &str) -> QRKitResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "wpa" => Ok(Self::Wpa),
            "wep" => Ok(Self::Wep),
            "nopass" | "none" | "" => Ok(Self::Nopass),
            _ => Err(QRKitError::InvalidSecurity),
        }
    }
}

// Payload records
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkRecord {
    pub url: String,
}

#[derive(Debug, PartialEq, Eq, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactCard {
    pub first_name: String,
    pub last_name: String,
    pub org: String,
    pub title: String,
    pub phone: String,
    pub email: String,
    pub url: String,
}

impl ContactCard {
    fn full_name(&self) -> String {
        [self.first_name.as_str(), self.last_name.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkCredential {
    pub ssid: String,
    pub password: Option<String>,
    pub security: Security,
    pub hidden: bool,
}

// Content payload
//------------------------------------------------------------------------------

/// The structured content behind the code. Exactly one variant is active at a
/// time; switching mode starts over from a blank record of the new variant.
///
/// The serialized form is adjacently tagged as `{"mode": ..., "payload": ...}`
/// so stored presets keep the layout the original data blob used.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", content = "payload", rename_all = "lowercase")]
pub enum ContentPayload {
    Link(LinkRecord),
    Vcard(ContactCard),
    Wifi(NetworkCredential),
}

impl ContentPayload {
    /// Blank record for `mode`, discarding whatever was entered before.
    pub fn blank(mode: Mode) -> Self {
        match mode {
            Mode::Link => Self::Link(LinkRecord::default()),
            Mode::Vcard => Self::Vcard(ContactCard::default()),
            Mode::Wifi => Self::Wifi(NetworkCredential::default()),
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Self::Link(_) => Mode::Link,
            Self::Vcard(_) => Mode::Vcard,
            Self::Wifi(_) => Mode::Wifi,
        }
    }

    /// Text payload handed to the renderer. Empty output means there is
    /// nothing to render.
    pub fn encode(&self) -> String {
        match self {
            Self::Link(link) => encode_link(link),
            Self::Vcard(card) => encode_contact_card(card),
            Self::Wifi(cred) => encode_network_credential(cred),
        }
    }

    /// Short human-readable label used when the payload is saved as a preset.
    pub fn display_name(&self) -> String {
        match self {
            Self::Link(link) => {
                let url = if link.url.is_empty() { "Link" } else { link.url.as_str() };
                url.chars().take(50).collect()
            }
            Self::Wifi(cred) => {
                let ssid = if cred.ssid.is_empty() { "SSID" } else { cred.ssid.as_str() };
                format!("Wi-Fi: {ssid}")
            }
            Self::Vcard(card) => {
                let name = card.full_name();
                let name = if name.is_empty() { "Contact".to_string() } else { name };
                format!("vCard: {name}")
            }
        }
    }
}

impl Default for ContentPayload {
    fn default() -> Self {
        Self::blank(Mode::Link)
    }
}

// Encoders
//------------------------------------------------------------------------------

pub fn encode_link(link: &LinkRecord) -> String {
    link.url.trim().to_string()
}

/// vCard 3.0 text block. The field order is fixed for compatibility with
/// contact-card readers; optional lines are dropped entirely when their
/// source field is empty, never emitted blank.
pub fn encode_contact_card(card: &ContactCard) -> String {
    let optional = [
        ("ORG:", card.org.as_str()),
        ("TITLE:", card.title.as_str()),
        ("TEL;TYPE=CELL:", card.phone.as_str()),
        ("EMAIL:", card.email.as_str()),
        ("URL:", card.url.as_str()),
    ];

    let mut lines = vec![
        "BEGIN:VCARD".to_string(),
        "VERSION:3.0".to_string(),
        format!("N:{};{};;;", card.last_name, card.first_name),
        format!("FN:{}", card.full_name()),
    ];
    lines.extend(
        optional.iter().filter(|(_, value)| !value.is_empty()).map(|(key, value)| format!("{key}{value}")),
    );
    lines.push("END:VCARD".to_string());
    lines.join("\n")
}

/// Single-line `WIFI:` record. A missing password encodes as an empty `P:`
/// field, not an omitted one.
pub fn encode_network_credential(cred: &NetworkCredential) -> String {
    format!(
        "WIFI:T:{};S:{};P:{};H:{};;",
        cred.security.as_str(),
        cred.ssid,
        cred.password.as_deref().unwrap_or(""),
        cred.hidden
    )
}

#[cfg(test)]
mod payload_tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn test_vcard_all_fields() {
        let card = ContactCard {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            org: "Analytical Engines".into(),
            title: "Engineer".into(),
            phone: "+44 1234".into(),
            email: "ada@example.com".into(),
            url: "https://example.com/ada".into(),
        };
        let encoded = encode_contact_card(&card);
        let expected = "BEGIN:VCARD\nVERSION:3.0\nN:Lovelace;Ada;;;\nFN:Ada Lovelace\n\
                        ORG:Analytical Engines\nTITLE:Engineer\nTEL;TYPE=CELL:+44 1234\n\
                        EMAIL:ada@example.com\nURL:https://example.com/ada\nEND:VCARD";
        assert_eq!(encoded, expected);
    }

    #[test]
    fn test_vcard_empty_fields_emit_no_optional_lines() {
        let encoded = encode_contact_card(&ContactCard::default());
        assert_eq!(encoded, "BEGIN:VCARD\nVERSION:3.0\nN:;;;;\nFN:\nEND:VCARD");
    }

    #[test]
    fn test_vcard_single_name_has_no_stray_space() {
        let card = ContactCard { first_name: "Ada".into(), ..ContactCard::default() };
        assert!(encode_contact_card(&card).contains("\nFN:Ada\n"));
    }

    #[test]
    fn test_wifi_full_record() {
        let cred = NetworkCredential {
            ssid: "Home".into(),
            password: Some("secret".into()),
            security: Security::Wpa,
            hidden: true,
        };
        assert_eq!(encode_network_credential(&cred), "WIFI:T:WPA;S:Home;P:secret;H:true;;");
    }

    #[test]
    fn test_wifi_missing_password_encodes_empty_field() {
        let cred = NetworkCredential { ssid: "Home".into(), ..NetworkCredential::default() };
        assert_eq!(encode_network_credential(&cred), "WIFI:T:WPA;S:Home;P:;H:false;;");
    }

    #[test_case("wpa", Security::Wpa; "lowercase wpa")]
    #[test_case("WPA", Security::Wpa; "uppercase wpa")]
    #[test_case("Wep", Security::Wep; "mixed case wep")]
    #[test_case("nopass", Security::Nopass; "nopass")]
    #[test_case("none", Security::Nopass; "none alias")]
    fn test_security_parses_case_insensitively(input: &str, expected: Security) {
        assert_eq!(input.parse::<Security>().unwrap(), expected);
    }

    #[test]
    fn test_security_rejects_unknown_type() {
        assert_eq!("wpa3-magic".parse::<Security>(), Err(QRKitError::InvalidSecurity));
    }

    #[test]
    fn test_link_is_trimmed() {
        let link = LinkRecord { url: "  https://example.com  ".into() };
        assert_eq!(encode_link(&link), "https://example.com");
    }

    #[test]
    fn test_display_name_truncates_long_urls() {
        let link = LinkRecord { url: "x".repeat(80) };
        assert_eq!(ContentPayload::Link(link).display_name().chars().count(), 50);
    }

    #[test]
    fn test_blank_discards_previous_fields() {
        let payload = ContentPayload::Wifi(NetworkCredential {
            ssid: "Home".into(),
            ..NetworkCredential::default()
        });
        assert_eq!(payload.mode(), Mode::Wifi);
        assert_eq!(ContentPayload::blank(Mode::Link), ContentPayload::Link(LinkRecord::default()));
    }
}
