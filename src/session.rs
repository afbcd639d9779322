use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;

use crate::payload::{ContentPayload, Mode};
use crate::preset::{Preset, PresetStore};
use crate::render::{
    default_providers, Artifact, ExportFormat, RenderProvider, RenderRequest, RenderState,
};
use crate::style::StyleConfig;

// Export bundle
//------------------------------------------------------------------------------

/// Bytes ready to hand to a file-download collaborator.
#[derive(Debug, PartialEq, Clone)]
pub struct ExportBundle {
    pub filename: String,
    pub bytes: Vec<u8>,
}

// Session
//------------------------------------------------------------------------------

/// Single-threaded editor session. Owns every piece of mutable state: the
/// active payload, the style, the resolved rendering capability and the
/// preset store. Capability acquisition happens once here at startup and is
/// never re-attempted.
pub struct Session {
    state: RenderState,
    payload: ContentPayload,
    style: StyleConfig,
    store: PresetStore,
    last: Option<(RenderRequest, Artifact)>,
}

impl Session {
    /// Start with an explicit candidate list, tried in priority order.
    pub fn start(providers: &[Box<dyn RenderProvider>], store: PresetStore) -> Self {
        Self {
            state: RenderState::resolve(providers),
            payload: ContentPayload::default(),
            style: StyleConfig::default(),
            store,
            last: None,
        }
    }

    /// Start with the default candidates: styled renderer, then the plain
    /// black-on-white fallback.
    pub fn new(store: PresetStore) -> Self {
        Self::start(&default_providers(), store)
    }

    pub fn payload(&self) -> &ContentPayload {
        &self.payload
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn presets(&self) -> &[Preset] {
        self.store.presets()
    }

    /// Switch the content variant, discarding whatever was entered before.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.payload.mode() != mode {
            self.payload = ContentPayload::blank(mode);
        }
    }

    pub fn set_payload(&mut self, payload: ContentPayload) {
        self.payload = payload;
    }

    pub fn set_style(&mut self, mut style: StyleConfig) {
        style.normalize();
        self.style = style;
    }

    /// Encoded text payload for the current editor state.
    pub fn content(&self) -> String {
        self.payload.encode()
    }

    /// Persistent mode indicator for a front end: advanced, fallback or
    /// unavailable.
    pub fn render_mode(&self) -> &'static str {
        self.state.label()
    }

    pub fn fallback_active(&self) -> bool {
        self.state.fallback_active()
    }

    /// When false, styling controls beyond size and margin should be shown
    /// disabled; their values have no effect on the output.
    pub fn styling_enabled(&self) -> bool {
        self.state.styling_enabled()
    }

    /// Render the current state. Returns the cached artifact when neither the
    /// content nor the style changed since the last render; empty content or
    /// an unavailable capability renders nothing.
    pub fn render(&mut self) -> Option<&Artifact> {
        let content = self.content();
        if content.is_empty() {
            return None;
        }
        // the fallback renderer only ever sees size and margin
        let style =
            if self.state.fallback_active() { self.style.reduced() } else { self.style.clone() };
        let request = RenderRequest::new(content, style);

        let cached = matches!(&self.last, Some((prev, _)) if *prev == request);
        if !cached {
            let capability = self.state.capability()?;
            match capability.render(&request) {
                Ok(artifact) => self.last = Some((request, artifact)),
                Err(e) => {
                    warn!("render failed: {e}");
                    return None;
                }
            }
        }
        self.last.as_ref().map(|(_, artifact)| artifact)
    }

    /// Export the current artifact. A no-op (`None`) when there is nothing
    /// rendered, with no error surfaced.
    pub fn export(&mut self, format: ExportFormat) -> Option<ExportBundle> {
        self.render()?;
        let (_, artifact) = self.last.as_ref()?;
        match artifact.export(format) {
            Ok(bytes) => Some(ExportBundle { filename: export_filename(format), bytes }),
            Err(e) => {
                warn!("export failed: {e}");
                None
            }
        }
    }

    /// Save the current (payload, style) pair as a preset. A silent no-op
    /// when the content is empty.
    pub fn save_preset(&mut self) -> Option<&Preset> {
        self.store.save(&self.payload, &self.style)
    }

    /// Restore editor state from a stored preset. Returns false when the id
    /// is unknown.
    pub fn load_preset(&mut self, id: &str) -> bool {
        let Some(preset) = self.store.get(id) else {
            return false;
        };
        self.payload = preset.payload.clone();
        let mut style = preset.style.clone();
        style.normalize();
        self.style = style;
        true
    }

    pub fn remove_preset(&mut self, id: &str) {
        self.store.remove(id);
    }
}

fn export_filename(format: ExportFormat) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("qrkit-{millis}.{}", format.extension())
}
