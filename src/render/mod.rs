use std::fmt::{Debug, Formatter};
use std::io::Cursor;

use image::{ImageFormat, RgbaImage};
use tracing::{error, warn};

use crate::error::{QRKitError, QRKitResult};
use crate::style::StyleConfig;

pub mod basic;
pub mod styled;

pub use basic::BasicRenderer;
pub use styled::StyledRenderer;

// Render request & artifact
//------------------------------------------------------------------------------

/// Everything a capability needs to draw: the encoded content string plus the
/// visual configuration. Rendering is a pure function of this descriptor, so
/// equal requests always produce equal artifacts.
#[derive(Debug, PartialEq, Clone)]
pub struct RenderRequest {
    pub content: String,
    pub style: StyleConfig,
}

impl RenderRequest {
    pub fn new(content: impl Into<String>, mut style: StyleConfig) -> Self {
        style.normalize();
        Self { content: content.into(), style }
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ExportFormat {
    Png,
    Svg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }
}

/// A rendered code: a raster image, vector markup, or both depending on which
/// capability produced it.
#[derive(Debug, PartialEq, Clone)]
pub struct Artifact {
    pub raster: Option<RgbaImage>,
    pub svg: Option<String>,
}

impl Artifact {
    pub fn export(&self, format: ExportFormat) -> QRKitResult<Vec<u8>> {
        match format {
            ExportFormat::Png => {
                let raster = self.raster.as_ref().ok_or(QRKitError::ExportFailed)?;
                let mut bytes = Cursor::new(Vec::new());
                raster.write_to(&mut bytes, ImageFormat::Png).map_err(|e| {
                    error!("png encode failed: {e}");
                    QRKitError::ExportFailed
                })?;
                Ok(bytes.into_inner())
            }
            ExportFormat::Svg => {
                let svg = self.svg.as_ref().ok_or(QRKitError::ExportFailed)?;
                Ok(svg.clone().into_bytes())
            }
        }
    }
}

// Capabilities & providers
//------------------------------------------------------------------------------

/// A rendering backend. Implementations must be idempotent: rendering the
/// same request twice yields identical artifacts.
pub trait RenderCapability {
    /// Whether styling fields beyond size and margin have any effect.
    fn supports_styling(&self) -> bool;

    fn render(&self, request: &RenderRequest) -> QRKitResult<Artifact>;
}

/// One candidate in the ordered acquisition list. Acquisition runs once at
/// startup; a failed candidate is skipped in favor of the next one.
pub trait RenderProvider {
    fn name(&self) -> &'static str;

    fn acquire(&self) -> QRKitResult<Box<dyn RenderCapability>>;
}

pub struct StyledProvider;

impl RenderProvider for StyledProvider {
    fn name(&self) -> &'static str {
        "styled"
    }

    fn acquire(&self) -> QRKitResult<Box<dyn RenderCapability>> {
        Ok(Box::new(StyledRenderer))
    }
}

pub struct BasicProvider;

impl RenderProvider for BasicProvider {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn acquire(&self) -> QRKitResult<Box<dyn RenderCapability>> {
        Ok(Box::new(BasicRenderer))
    }
}

/// Candidates in priority order: styled first, plain black-on-white second.
pub fn default_providers() -> Vec<Box<dyn RenderProvider>> {
    vec![Box::new(StyledProvider), Box::new(BasicProvider)]
}

// Strategy state
//------------------------------------------------------------------------------

/// Outcome of capability acquisition. Settled once per session at startup and
/// never re-attempted; `Unavailable` means no visual output is possible and is
/// surfaced as a persistent mode indicator rather than a transient error.
pub enum RenderState {
    Unresolved,
    AdvancedReady(Box<dyn RenderCapability>),
    FallbackReady(Box<dyn RenderCapability>),
    Unavailable,
}

impl RenderState {
    /// Walk the candidate list in priority order and stop at the first one
    /// that acquires. The first candidate is the advanced capability; any
    /// later one is a fallback with reduced styling.
    pub fn resolve(providers: &[Box<dyn RenderProvider>]) -> Self {
        for (rank, provider) in providers.iter().enumerate() {
            match provider.acquire() {
                Ok(capability) if rank == 0 => return Self::AdvancedReady(capability),
                Ok(capability) => {
                    warn!("renderer {:?} active as fallback", provider.name());
                    return Self::FallbackReady(capability);
                }
                Err(e) => warn!("renderer {:?} unavailable: {e}", provider.name()),
            }
        }
        error!("no rendering capability could be acquired");
        Self::Unavailable
    }

    pub fn capability(&self) -> Option<&dyn RenderCapability> {
        match self {
            Self::AdvancedReady(c) | Self::FallbackReady(c) => Some(c.as_ref()),
            Self::Unresolved | Self::Unavailable => None,
        }
    }

    pub fn fallback_active(&self) -> bool {
        matches!(self, Self::FallbackReady(_))
    }

    /// False whenever styling controls should be disabled in a front end,
    /// either because the fallback renderer ignores them or because nothing
    /// renders at all.
    pub fn styling_enabled(&self) -> bool {
        match self {
            Self::AdvancedReady(c) => c.supports_styling(),
            _ => false,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Unresolved => "unresolved",
            Self::AdvancedReady(_) => "advanced",
            Self::FallbackReady(_) => "fallback",
            Self::Unavailable => "unavailable",
        }
    }
}

impl Debug for RenderState {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_tuple("RenderState").field(&self.label()).finish()
    }
}
