//! # qrkit
//!
//! Client-side QR generation: structured payloads (links, vCards, Wi-Fi
//! credentials) encoded into standard text formats, rendered with
//! configurable styling, exportable as PNG or SVG, with named presets
//! persisted to a single local JSON slot.
//!
//! ## Features
//!
//! - **Payload encoding**: vCard 3.0 contact cards, `WIFI:` network
//!   credentials and plain links, with fixed field order for reader
//!   compatibility
//! - **Styled rendering**: module and eye shapes, linear gradients,
//!   background color and an embedded logo, emitted as both raster and SVG
//! - **Fallback strategy**: an ordered capability list resolved once at
//!   startup; when the styled renderer cannot be acquired a plain
//!   black-on-white renderer takes over with styling controls disabled
//! - **Presets**: named payload + style snapshots, capped at 200 most
//!   recent, mirrored wholesale to one storage slot on every mutation
//!
//! ## Quick start
//!
//! ```rust
//! use qrkit::{ContentPayload, NetworkCredential, Security};
//!
//! let payload = ContentPayload::Wifi(NetworkCredential {
//!     ssid: "Home".to_string(),
//!     password: Some("secret".to_string()),
//!     security: Security::Wpa,
//!     hidden: true,
//! });
//! assert_eq!(payload.encode(), "WIFI:T:WPA;S:Home;P:secret;H:true;;");
//! ```
//!
//! ### Rendering and exporting
//!
//! ```rust
//! use qrkit::{ContentPayload, ExportFormat, LinkRecord, PresetStore, Session};
//!
//! let mut session = Session::new(PresetStore::in_memory());
//! session.set_payload(ContentPayload::Link(LinkRecord {
//!     url: "https://example.com".to_string(),
//! }));
//!
//! let artifact = session.render().expect("renderer available");
//! assert!(artifact.svg.is_some());
//!
//! let bundle = session.export(ExportFormat::Png).expect("png export");
//! assert!(bundle.filename.ends_with(".png"));
//! ```
//!
//! ### Presets
//!
//! ```rust
//! use qrkit::{ContentPayload, LinkRecord, PresetStore, Session};
//!
//! let mut session = Session::new(PresetStore::in_memory());
//! session.set_payload(ContentPayload::Link(LinkRecord {
//!     url: "https://example.com".to_string(),
//! }));
//!
//! let id = session.save_preset().expect("non-empty content").id.clone();
//! assert!(session.load_preset(&id));
//! ```

pub mod error;
pub mod payload;
pub mod preset;
pub mod render;
pub mod session;
pub mod style;

pub use error::{QRKitError, QRKitResult};
pub use payload::{ContactCard, ContentPayload, LinkRecord, Mode, NetworkCredential, Security};
pub use preset::{FileBackend, MemoryBackend, Preset, PresetStore, StorageBackend, PRESET_CAP};
pub use render::{
    default_providers, Artifact, BasicProvider, BasicRenderer, ExportFormat, RenderCapability,
    RenderProvider, RenderRequest, RenderState, StyledProvider, StyledRenderer,
};
pub use session::{ExportBundle, Session};
pub use style::{FrameShape, ModuleShape, PipShape, StyleConfig};
