use serde::{Deserialize, Serialize};

use crate::utils::paths::{DOCUMENTS_PREFIX, VEHICLE_IMAGES_PREFIX, WHEEL_IMAGES_PREFIX};

/// The three file tables owned directly by a vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, utoipa::ToSchema)]
pub enum VehicleFileKind {
    #[serde(rename = "images")]
    Image,
    #[serde(rename = "wheels")]
    Wheel,
    #[serde(rename = "documents")]
    Document,
}

impl VehicleFileKind {
    pub const ALL: [VehicleFileKind; 3] = [
        VehicleFileKind::Image,
        VehicleFileKind::Wheel,
        VehicleFileKind::Document,
    ];

    /// Leading storage path segment.
    pub fn prefix(&self) -> &'static str {
        match self {
            VehicleFileKind::Image => VEHICLE_IMAGES_PREFIX,
            VehicleFileKind::Wheel => WHEEL_IMAGES_PREFIX,
            VehicleFileKind::Document => DOCUMENTS_PREFIX,
        }
    }

    /// Multipart field carrying files of this kind.
    pub fn form_field(&self) -> &'static str {
        match self {
            VehicleFileKind::Image => "vehicle_images",
            VehicleFileKind::Wheel => "wheel_images",
            VehicleFileKind::Document => "documents",
        }
    }

    pub fn from_form_field(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.form_field() == name)
    }
}
