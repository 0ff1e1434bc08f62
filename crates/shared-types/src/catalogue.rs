//! # HMI Catalogue
//!
//! The HMI interfaces the middleware talks to and the functions they expose.
//!
//! Function ids render as `Interface.Method`, the same naming the HMI uses on
//! the wire.

use crate::errors::CatalogueError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A vehicle-side HMI module that independently reports readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HmiInterface {
    #[serde(rename = "BasicCommunication")]
    BasicCommunication,
    #[serde(rename = "Buttons")]
    Buttons,
    #[serde(rename = "Navigation")]
    Navigation,
    #[serde(rename = "VR")]
    Vr,
    #[serde(rename = "TTS")]
    Tts,
    #[serde(rename = "UI")]
    Ui,
    #[serde(rename = "VehicleInfo")]
    VehicleInfo,
    #[serde(rename = "RC")]
    Rc,
}

impl HmiInterface {
    /// Every interface, in catalogue order.
    pub const ALL: [HmiInterface; 8] = [
        HmiInterface::BasicCommunication,
        HmiInterface::Buttons,
        HmiInterface::Navigation,
        HmiInterface::Vr,
        HmiInterface::Tts,
        HmiInterface::Ui,
        HmiInterface::VehicleInfo,
        HmiInterface::Rc,
    ];

    /// Wire name of the interface.
    pub const fn as_str(&self) -> &'static str {
        match self {
            HmiInterface::BasicCommunication => "BasicCommunication",
            HmiInterface::Buttons => "Buttons",
            HmiInterface::Navigation => "Navigation",
            HmiInterface::Vr => "VR",
            HmiInterface::Tts => "TTS",
            HmiInterface::Ui => "UI",
            HmiInterface::VehicleInfo => "VehicleInfo",
            HmiInterface::Rc => "RC",
        }
    }

    /// The is-ready call for this interface, if it takes part in the
    /// readiness handshake.
    pub const fn is_ready_function(&self) -> Option<FunctionId> {
        match self {
            HmiInterface::Navigation => Some(FunctionId::NavigationIsReady),
            HmiInterface::Vr => Some(FunctionId::VrIsReady),
            HmiInterface::Tts => Some(FunctionId::TtsIsReady),
            HmiInterface::Ui => Some(FunctionId::UiIsReady),
            HmiInterface::VehicleInfo => Some(FunctionId::VehicleInfoIsReady),
            HmiInterface::Rc => Some(FunctionId::RcIsReady),
            HmiInterface::BasicCommunication | HmiInterface::Buttons => None,
        }
    }

    /// Capability requests issued after a handshake that did not rule the
    /// interface out.
    pub const fn capability_requests(&self) -> &'static [FunctionId] {
        match self {
            HmiInterface::Ui => &[
                FunctionId::UiGetLanguage,
                FunctionId::UiGetSupportedLanguages,
                FunctionId::UiGetCapabilities,
            ],
            HmiInterface::Vr => &[
                FunctionId::VrGetLanguage,
                FunctionId::VrGetSupportedLanguages,
                FunctionId::VrGetCapabilities,
            ],
            HmiInterface::Tts => &[
                FunctionId::TtsGetLanguage,
                FunctionId::TtsGetSupportedLanguages,
                FunctionId::TtsGetCapabilities,
            ],
            HmiInterface::VehicleInfo => &[FunctionId::VehicleInfoGetVehicleType],
            HmiInterface::Rc => &[FunctionId::RcGetCapabilities],
            HmiInterface::Navigation
            | HmiInterface::BasicCommunication
            | HmiInterface::Buttons => &[],
        }
    }

    /// Interfaces that take part in the readiness handshake.
    pub fn with_readiness_handshake() -> impl Iterator<Item = HmiInterface> {
        Self::ALL
            .into_iter()
            .filter(|interface| interface.is_ready_function().is_some())
    }
}

impl fmt::Display for HmiInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HmiInterface {
    type Err = CatalogueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|interface| interface.as_str() == s)
            .ok_or_else(|| CatalogueError::UnknownInterface(s.to_string()))
    }
}

/// Identifies the HMI RPC a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FunctionId {
    // =========================================================================
    // BASIC COMMUNICATION / BUTTONS
    // =========================================================================
    #[serde(rename = "BasicCommunication.OnReady")]
    BasicCommunicationOnReady,
    #[serde(rename = "Buttons.GetCapabilities")]
    ButtonsGetCapabilities,

    // =========================================================================
    // UI
    // =========================================================================
    #[serde(rename = "UI.IsReady")]
    UiIsReady,
    #[serde(rename = "UI.GetLanguage")]
    UiGetLanguage,
    #[serde(rename = "UI.GetSupportedLanguages")]
    UiGetSupportedLanguages,
    #[serde(rename = "UI.GetCapabilities")]
    UiGetCapabilities,

    // =========================================================================
    // VR
    // =========================================================================
    #[serde(rename = "VR.IsReady")]
    VrIsReady,
    #[serde(rename = "VR.GetLanguage")]
    VrGetLanguage,
    #[serde(rename = "VR.GetSupportedLanguages")]
    VrGetSupportedLanguages,
    #[serde(rename = "VR.GetCapabilities")]
    VrGetCapabilities,

    // =========================================================================
    // TTS
    // =========================================================================
    #[serde(rename = "TTS.IsReady")]
    TtsIsReady,
    #[serde(rename = "TTS.GetLanguage")]
    TtsGetLanguage,
    #[serde(rename = "TTS.GetSupportedLanguages")]
    TtsGetSupportedLanguages,
    #[serde(rename = "TTS.GetCapabilities")]
    TtsGetCapabilities,

    // =========================================================================
    // NAVIGATION / VEHICLE INFO
    // =========================================================================
    #[serde(rename = "Navigation.IsReady")]
    NavigationIsReady,
    #[serde(rename = "VehicleInfo.IsReady")]
    VehicleInfoIsReady,
    #[serde(rename = "VehicleInfo.GetVehicleType")]
    VehicleInfoGetVehicleType,

    // =========================================================================
    // RC (remote control)
    // =========================================================================
    #[serde(rename = "RC.IsReady")]
    RcIsReady,
    #[serde(rename = "RC.GetCapabilities")]
    RcGetCapabilities,
    #[serde(rename = "RC.ButtonPress")]
    RcButtonPress,
    #[serde(rename = "RC.OnInteriorVehicleData")]
    RcOnInteriorVehicleData,
    #[serde(rename = "RC.OnRemoteControlSettings")]
    RcOnRemoteControlSettings,
}

impl FunctionId {
    /// Every function, in catalogue order.
    pub const ALL: [FunctionId; 22] = [
        FunctionId::BasicCommunicationOnReady,
        FunctionId::ButtonsGetCapabilities,
        FunctionId::UiIsReady,
        FunctionId::UiGetLanguage,
        FunctionId::UiGetSupportedLanguages,
        FunctionId::UiGetCapabilities,
        FunctionId::VrIsReady,
        FunctionId::VrGetLanguage,
        FunctionId::VrGetSupportedLanguages,
        FunctionId::VrGetCapabilities,
        FunctionId::TtsIsReady,
        FunctionId::TtsGetLanguage,
        FunctionId::TtsGetSupportedLanguages,
        FunctionId::TtsGetCapabilities,
        FunctionId::NavigationIsReady,
        FunctionId::VehicleInfoIsReady,
        FunctionId::VehicleInfoGetVehicleType,
        FunctionId::RcIsReady,
        FunctionId::RcGetCapabilities,
        FunctionId::RcButtonPress,
        FunctionId::RcOnInteriorVehicleData,
        FunctionId::RcOnRemoteControlSettings,
    ];

    /// Wire name, `Interface.Method`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            FunctionId::BasicCommunicationOnReady => "BasicCommunication.OnReady",
            FunctionId::ButtonsGetCapabilities => "Buttons.GetCapabilities",
            FunctionId::UiIsReady => "UI.IsReady",
            FunctionId::UiGetLanguage => "UI.GetLanguage",
            FunctionId::UiGetSupportedLanguages => "UI.GetSupportedLanguages",
            FunctionId::UiGetCapabilities => "UI.GetCapabilities",
            FunctionId::VrIsReady => "VR.IsReady",
            FunctionId::VrGetLanguage => "VR.GetLanguage",
            FunctionId::VrGetSupportedLanguages => "VR.GetSupportedLanguages",
            FunctionId::VrGetCapabilities => "VR.GetCapabilities",
            FunctionId::TtsIsReady => "TTS.IsReady",
            FunctionId::TtsGetLanguage => "TTS.GetLanguage",
            FunctionId::TtsGetSupportedLanguages => "TTS.GetSupportedLanguages",
            FunctionId::TtsGetCapabilities => "TTS.GetCapabilities",
            FunctionId::NavigationIsReady => "Navigation.IsReady",
            FunctionId::VehicleInfoIsReady => "VehicleInfo.IsReady",
            FunctionId::VehicleInfoGetVehicleType => "VehicleInfo.GetVehicleType",
            FunctionId::RcIsReady => "RC.IsReady",
            FunctionId::RcGetCapabilities => "RC.GetCapabilities",
            FunctionId::RcButtonPress => "RC.ButtonPress",
            FunctionId::RcOnInteriorVehicleData => "RC.OnInteriorVehicleData",
            FunctionId::RcOnRemoteControlSettings => "RC.OnRemoteControlSettings",
        }
    }

    /// The interface that owns this function.
    pub const fn interface(&self) -> HmiInterface {
        match self {
            FunctionId::BasicCommunicationOnReady => HmiInterface::BasicCommunication,
            FunctionId::ButtonsGetCapabilities => HmiInterface::Buttons,
            FunctionId::UiIsReady
            | FunctionId::UiGetLanguage
            | FunctionId::UiGetSupportedLanguages
            | FunctionId::UiGetCapabilities => HmiInterface::Ui,
            FunctionId::VrIsReady
            | FunctionId::VrGetLanguage
            | FunctionId::VrGetSupportedLanguages
            | FunctionId::VrGetCapabilities => HmiInterface::Vr,
            FunctionId::TtsIsReady
            | FunctionId::TtsGetLanguage
            | FunctionId::TtsGetSupportedLanguages
            | FunctionId::TtsGetCapabilities => HmiInterface::Tts,
            FunctionId::NavigationIsReady => HmiInterface::Navigation,
            FunctionId::VehicleInfoIsReady | FunctionId::VehicleInfoGetVehicleType => {
                HmiInterface::VehicleInfo
            }
            FunctionId::RcIsReady
            | FunctionId::RcGetCapabilities
            | FunctionId::RcButtonPress
            | FunctionId::RcOnInteriorVehicleData
            | FunctionId::RcOnRemoteControlSettings => HmiInterface::Rc,
        }
    }

    /// Whether this is one of the per-interface is-ready calls.
    pub fn is_readiness_probe(&self) -> bool {
        self.interface().is_ready_function() == Some(*self)
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FunctionId {
    type Err = CatalogueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|function| function.as_str() == s)
            .ok_or_else(|| CatalogueError::UnknownFunction(s.to_string()))
    }
}
