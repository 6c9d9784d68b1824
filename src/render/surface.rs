//! Named render targets and the surface that holds their content.

/// Elements of the dashboard page a view can replace wholesale.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, strum::AsRefStr, strum::EnumString)]
pub enum Target {
    #[strum(serialize = "dataModeLabel")]
    ModeLabel,
    #[strum(serialize = "userSection")]
    UserBadge,
    #[strum(serialize = "alertArea")]
    AlertArea,
    #[strum(serialize = "quickStats")]
    QuickStats,
    #[strum(serialize = "tipsTableHead")]
    TipsTableHead,
    #[strum(serialize = "tipsTableBody")]
    TipsTableBody,
    #[strum(serialize = "publicQuickStats")]
    PublicQuickStats,
}

impl Target {
    /// Target whose element has the given id.
    pub fn from_element_id(id: &str) -> Option<Self> {
        id.parse().ok()
    }
}


/// Where views put their HTML. Setting a target replaces its previous content.
pub trait Surface: Send + Sync {
    fn set_content(&self, target: Target, html: String);

    fn content(&self, target: Target) -> Option<String>;

    fn clear(&self, target: Target);
}
