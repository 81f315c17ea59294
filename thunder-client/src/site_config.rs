//! Site configuration load/save
//!
//! The document is a singleton. Loading is public; saving replaces the
//! whole document, so the form is always merged onto the last loaded copy
//! and keys the form does not show survive the round trip.

use std::sync::Arc;

use shared::{Carrier, SiteConfig};
use tokio::sync::RwLock;

use crate::error::ClientResult;
use crate::http::AdminApi;
use crate::session::Session;

/// Split a textarea into plan strings, one per non-blank line
pub fn parse_plan_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Inverse of [`parse_plan_lines`]
pub fn join_plan_lines(plans: &[String]) -> String {
    plans.join("\n")
}

/// Editable view of the configuration document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteConfigForm {
    pub header_title: String,
    pub header_subtitle: String,
    pub footer_warning: String,
    pub pix_key: String,
    pub pix_name: String,
    /// Newline-separated plan lists
    pub tim_plans: String,
    pub vivo_plans: String,
    pub claro_plans: String,
}

impl SiteConfigForm {
    pub fn from_config(config: &SiteConfig) -> Self {
        let options = &config.recharge_options;
        Self {
            header_title: config.header_title.clone().unwrap_or_default(),
            header_subtitle: config.header_subtitle.clone().unwrap_or_default(),
            footer_warning: config.footer_warning.clone().unwrap_or_default(),
            pix_key: config.pix_key.clone().unwrap_or_default(),
            pix_name: config.pix_name.clone().unwrap_or_default(),
            tim_plans: join_plan_lines(options.plans(&Carrier::Tim)),
            vivo_plans: join_plan_lines(options.plans(&Carrier::Vivo)),
            claro_plans: join_plan_lines(options.plans(&Carrier::Claro)),
        }
    }

    /// Merge the form over `baseline`, keeping every key the form lacks
    pub fn apply_to(&self, baseline: &SiteConfig) -> SiteConfig {
        let mut config = baseline.clone();
        merge_text(&mut config.header_title, &self.header_title);
        merge_text(&mut config.header_subtitle, &self.header_subtitle);
        merge_text(&mut config.footer_warning, &self.footer_warning);
        merge_text(&mut config.pix_key, &self.pix_key);
        merge_text(&mut config.pix_name, &self.pix_name);

        let options = &mut config.recharge_options;
        options.set_plans(&Carrier::Tim, parse_plan_lines(&self.tim_plans));
        options.set_plans(&Carrier::Vivo, parse_plan_lines(&self.vivo_plans));
        options.set_plans(&Carrier::Claro, parse_plan_lines(&self.claro_plans));
        config
    }
}

/// A blank form field leaves an absent key absent
fn merge_text(slot: &mut Option<String>, value: &str) {
    if slot.is_some() || !value.is_empty() {
        *slot = Some(value.to_string());
    }
}

/// Loads, caches and saves the configuration document
#[derive(Clone)]
pub struct ConfigStore {
    api: Arc<dyn AdminApi>,
    session: Arc<Session>,
    baseline: Arc<RwLock<Option<SiteConfig>>>,
}

impl ConfigStore {
    pub fn new(api: Arc<dyn AdminApi>, session: Arc<Session>) -> Self {
        Self {
            api,
            session,
            baseline: Arc::new(RwLock::new(None)),
        }
    }

    /// Fetch the public document and remember it as the save baseline
    pub async fn load_config(&self) -> ClientResult<SiteConfig> {
        let result = self.api.load_config().await;
        let config = self.session.observe(result).await?;
        *self.baseline.write().await = Some(config.clone());
        tracing::debug!("Site configuration loaded");
        Ok(config)
    }

    /// Last loaded (or saved) document
    pub async fn baseline(&self) -> Option<SiteConfig> {
        self.baseline.read().await.clone()
    }

    /// Replace the remote document with `config`
    pub async fn save_config(&self, config: &SiteConfig) -> ClientResult<()> {
        let credential = self.session.authorize().await?;
        let result = self.api.save_config(&credential, config).await;
        self.session.observe(result).await?;
        *self.baseline.write().await = Some(config.clone());
        tracing::info!("Site configuration saved");
        Ok(())
    }

    /// Merge a form over the baseline (loading it first if needed) and save
    pub async fn save_form(&self, form: &SiteConfigForm) -> ClientResult<SiteConfig> {
        let baseline = match self.baseline().await {
            Some(config) => config,
            None => self.load_config().await?,
        };
        let config = form.apply_to(&baseline);
        self.save_config(&config).await?;
        Ok(config)
    }
}
