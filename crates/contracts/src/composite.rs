//! CompositeFrame - what the compositor hands to presenters

use serde::{Deserialize, Serialize};

use crate::{ImageData, TickId};

/// Composite artifact produced once per cycle
#[derive(Debug, Clone)]
pub enum CompositeFrame {
    /// Stitched grid or single camera, RGB8
    Image(ImageData),

    /// Telemetry text dashboard
    Dashboard(Dashboard),
}

impl CompositeFrame {
    /// Pixel dimensions of the artifact
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            CompositeFrame::Image(image) => (image.width, image.height),
            CompositeFrame::Dashboard(dashboard) => (dashboard.width, dashboard.height),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            CompositeFrame::Image(_) => "image",
            CompositeFrame::Dashboard(_) => "dashboard",
        }
    }
}

/// Fixed-size black canvas with text fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub width: u32,
    pub height: u32,

    /// Tick the underlying samples were read after, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick: Option<TickId>,

    pub fields: Vec<TextField>,
}

impl Dashboard {
    pub fn field(&self, text_prefix: &str) -> Option<&TextField> {
        self.fields.iter().find(|f| f.text.starts_with(text_prefix))
    }
}

/// One line of dashboard text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextField {
    pub text: String,

    /// Baseline-left anchor, pixels
    pub x: u32,
    pub y: u32,

    /// Font scale
    pub scale: f32,

    /// RGB
    pub color: [u8; 3],

    /// Stroke thickness, pixels
    pub thickness: u32,
}
