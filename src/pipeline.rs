use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::filter::AllowlistFilter;
use crate::keywords::extract_keywords;
use crate::search::SearchGateway;

pub const RESOURCES_HEADING: &str = "Here are some relevant resources:";
pub const NO_RESOURCES_MARKER: &str = "(No relevant resources found.)";

/// Prompt → keywords → searches → allowlist → prompt with a resources section.
pub struct AugmentationPipeline {
    gateway: SearchGateway,
    filter: AllowlistFilter,
    fan_out: usize,
}

impl AugmentationPipeline {
    pub fn new(gateway: SearchGateway, filter: AllowlistFilter, fan_out: usize) -> Self {
        Self {
            gateway,
            filter,
            fan_out: fan_out.max(1),
        }
    }

    pub fn gateway(&self) -> &SearchGateway {
        &self.gateway
    }

    pub async fn augment(&self, prompt: &str) -> String {
        let keywords = extract_keywords(prompt);
        info!("Extracted keywords: {:?}", keywords);

        let collected = if keywords.is_empty() {
            Vec::new()
        } else {
            self.collect_urls(&keywords).await
        };

        let urls = self.filter.filter(&collected);
        info!("Returning augmented prompt with {} URLs.", urls.len());
        format_augmented(prompt, &urls)
    }

    /// Search keywords concurrently but consume results in keyword order, stopping once
    /// twice the output cap has been gathered. Searches still in flight are dropped.
    async fn collect_urls(&self, keywords: &[String]) -> Vec<String> {
        let soft_cap = self.filter.max_urls().saturating_mul(2);
        let gateway = &self.gateway;
        let mut results = stream::iter(keywords.iter().cloned())
            .map(move |keyword| async move { gateway.search(&keyword).await })
            .buffered(self.fan_out);

        let mut collected = Vec::new();
        while let Some(urls) = results.next().await {
            collected.extend(urls);
            if collected.len() >= soft_cap {
                debug!("collected {} urls, skipping remaining keywords", collected.len());
                break;
            }
        }
        collected
    }
}

pub fn format_augmented(prompt: &str, urls: &[String]) -> String {
    let section = if urls.is_empty() {
        format!("\n\n{}", NO_RESOURCES_MARKER)
    } else {
        let bullets = urls
            .iter()
            .map(|u| format!("- {}", u))
            .collect::<Vec<_>>()
            .join("\n");
        format!("\n\n{}\n{}", RESOURCES_HEADING, bullets)
    };
    format!("{}{}", prompt, section)
}
