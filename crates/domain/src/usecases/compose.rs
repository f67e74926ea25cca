//! Compose use case - turns ranked news items into a blog post
//!
//! Content comes from the text generator when one is configured. Any
//! generator failure falls back to a deterministic template; the fallback is
//! logged and never surfaced to the caller.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

use crate::{
    model::{BlogPost, GenerationPath, NewsItem, SourceRef},
    ports::{GenerationRequest, PhotoSearch, TextGenerator},
    usecases::images::ImageResolver,
};

const ID_LEN: usize = 8;
const MISSING_DESCRIPTION: &str = "Click the source link for full details.";

/// Fixed text used to build posts
#[derive(Debug, Clone)]
pub struct ComposeConfig {
    /// Post title prefix, the display date is appended
    pub title_prefix: String,
    /// Author shown on every post
    pub author: String,
    /// Organisation named in the prompt
    pub organisation: String,
    /// System role for the generator
    pub system_prompt: String,
    /// First paragraph of template posts
    pub intro: String,
    /// Closing paragraphs of template posts
    pub closing: String,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            title_prefix: "Canadian Immigration Weekly Update".to_string(),
            author: "The Culye Team".to_string(),
            organisation: "Culye Immigration Services".to_string(),
            system_prompt:
                "You are a professional immigration consultant writing weekly updates for clients."
                    .to_string(),
            intro: "This week brings several important updates in Canadian immigration that could affect your journey to Canada.".to_string(),
            closing: "These updates highlight the dynamic nature of Canadian immigration policies. Whether you're planning to study, work, or permanently settle in Canada, staying informed about these changes is crucial for your application success.\n\nIf you're considering immigration to Canada or need guidance on how these updates affect your case, our team at Culye Immigration Services is here to help. Contact us for a personalized assessment of your immigration options.".to_string(),
        }
    }
}

/// Build the generator prompt for a set of ranked items
pub fn build_prompt(items: &[NewsItem], organisation: &str) -> String {
    let mut summary = String::new();
    for (i, item) in items.iter().enumerate() {
        summary.push_str(&format!("{}. {}\n", i + 1, item.title));
        summary.push_str(&format!("   Source: {}\n", item.source));
        summary.push_str(&format!("   Summary: {}\n", item.description));
        summary.push_str(&format!("   URL: {}\n\n", item.url));
    }

    format!(
        r#"You are writing a weekly immigration news update for {organisation}.

Here are this week's top {count} Canadian immigration news stories:

{summary}
Write a brief, informative blog post (300-400 words) that:
1. Introduces the week's immigration updates naturally
2. Discusses each news item with key takeaways for potential immigrants
3. Provides practical insights on what these changes mean
4. Maintains a professional yet approachable tone
5. Ends with a brief call-to-action for consultation

Important writing style:
- Sound natural and human, avoid phrases that sound robotic
- Use varied sentence structures
- Include specific details from the news
- Write in a conversational but professional tone
- Do NOT use em dashes or excessive punctuation
- Keep paragraphs flowing naturally
- Make it sound like it was written by immigration consultants who care

Remember to cite each source naturally within the text."#,
        organisation = organisation,
        count = items.len(),
        summary = summary,
    )
}

/// Deterministic post body used when no generated content is available
pub fn template_content(items: &[NewsItem], config: &ComposeConfig) -> String {
    let mut content = format!("{}\n\n", config.intro);

    for (i, item) in items.iter().enumerate() {
        let description = if item.description.trim().is_empty() {
            MISSING_DESCRIPTION
        } else {
            item.description.as_str()
        };

        content.push_str(&format!("**Update {}: {}**\n\n", i + 1, item.title));
        content.push_str(&format!(
            "{} (Source: [{}]({}))\n\n",
            description, item.source, item.url
        ));
    }

    content.push_str(&config.closing);
    content
}

/// Short opaque post ID derived from the run timestamp
pub fn post_id(now: OffsetDateTime) -> String {
    let stamp = now
        .format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp_nanos().to_string());
    let digest = format!("{:x}", Sha256::digest(stamp.as_bytes()));
    digest[..ID_LEN].to_string()
}

/// Display date, e.g. "October 16, 2026"
pub fn display_date(now: OffsetDateTime) -> String {
    now.format(format_description!(
        "[month repr:long] [day padding:zero], [year]"
    ))
    .unwrap_or_else(|_| now.date().to_string())
}

/// Use case for composing a blog post from ranked items
pub struct ComposeUseCase<G: TextGenerator + ?Sized, P: PhotoSearch + ?Sized> {
    generator: Option<Arc<G>>,
    images: ImageResolver<P>,
    config: ComposeConfig,
}

impl<G: TextGenerator + ?Sized, P: PhotoSearch + ?Sized> ComposeUseCase<G, P> {
    pub fn new(
        generator: Option<Arc<G>>,
        images: ImageResolver<P>,
        config: ComposeConfig,
    ) -> Self {
        Self {
            generator,
            images,
            config,
        }
    }

    /// Compose a post for `items` at time `now`
    pub async fn compose(
        &self,
        items: &[NewsItem],
        now: OffsetDateTime,
    ) -> (BlogPost, GenerationPath) {
        let (content, path) = match self.generate(items).await {
            Some(content) => (content, GenerationPath::Ai),
            None => (
                template_content(items, &self.config),
                GenerationPath::Template,
            ),
        };

        let mut images = Vec::with_capacity(items.len());
        for item in items {
            images.push(self.images.resolve(item).await);
        }

        let date = display_date(now);
        let post = BlogPost {
            id: post_id(now),
            title: format!("{} - {}", self.config.title_prefix, date),
            date,
            content,
            sources: items.iter().map(SourceRef::from).collect(),
            author: self.config.author.clone(),
            images,
        };

        tracing::info!(
            post_id = %post.id,
            generation = ?path,
            sources = post.sources.len(),
            "Composed post"
        );

        (post, path)
    }

    /// Try the AI path; `None` means use the template
    async fn generate(&self, items: &[NewsItem]) -> Option<String> {
        let Some(generator) = &self.generator else {
            tracing::info!("No text generator configured, using template");
            return None;
        };

        let request = GenerationRequest {
            system: self.config.system_prompt.clone(),
            prompt: build_prompt(items, &self.config.organisation),
        };

        match generator.generate(&request).await {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => {
                tracing::warn!("Text generator returned empty content, using template");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Text generation failed, using template");
                None
            }
        }
    }
}
