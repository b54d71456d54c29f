//! Admin configuration store — toggles components per wizard page and saves
//! the document through the remote API.

use tracing::info;

use crate::api::RemoteApi;
use crate::error::{ApiError, ConfigError, Error};
use crate::onboarding::model::PageConfiguration;
use crate::registry::ComponentId;

/// The two configurable wizard pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPage {
    Page2,
    Page3,
}

impl ConfigPage {
    pub fn number(&self) -> u8 {
        match self {
            Self::Page2 => 2,
            Self::Page3 => 3,
        }
    }

    pub fn from_number(page: u8) -> Option<Self> {
        match page {
            2 => Some(Self::Page2),
            3 => Some(Self::Page3),
            _ => None,
        }
    }
}

/// Operator-facing editor over the page configuration document.
///
/// Edits are local until `save`; a failed save leaves the remote document
/// untouched and is surfaced to the operator — this path has no local
/// fallback.
pub struct ConfigEditor {
    config: PageConfiguration,
}

impl ConfigEditor {
    pub fn new(config: PageConfiguration) -> Self {
        Self { config }
    }

    /// Load the current document from the remote API.
    pub async fn load(api: &dyn RemoteApi) -> Result<Self, ApiError> {
        Ok(Self::new(api.get_configuration().await?))
    }

    pub fn configuration(&self) -> &PageConfiguration {
        &self.config
    }

    /// Flip a component's membership in a page's active set. A presence
    /// test, not a counter: toggling twice restores the original set.
    pub fn toggle(&mut self, page: ConfigPage, component: ComponentId) {
        let components = match page {
            ConfigPage::Page2 => &mut self.config.page2_components,
            ConfigPage::Page3 => &mut self.config.page3_components,
        };
        let id = component.as_str();
        if let Some(position) = components.iter().position(|c| c == id) {
            components.remove(position);
        } else {
            components.push(id.to_string());
        }
    }

    pub fn is_active(&self, page: ConfigPage, component: ComponentId) -> bool {
        self.config
            .components_for(page.number())
            .iter()
            .any(|c| c == component.as_str())
    }

    /// Persist both page sets as a single document.
    ///
    /// Rejected before any write when either page's set is empty.
    pub async fn save(&self, api: &dyn RemoteApi) -> Result<(), Error> {
        if self.config.page2_components.is_empty() {
            return Err(ConfigError::EmptyPage { page: 2 }.into());
        }
        if self.config.page3_components.is_empty() {
            return Err(ConfigError::EmptyPage { page: 3 }.into());
        }
        api.put_configuration(&self.config).await?;
        info!(
            page2 = ?self.config.page2_components,
            page3 = ?self.config.page3_components,
            "Page configuration saved"
        );
        Ok(())
    }
}
