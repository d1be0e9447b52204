//! Page object generation from URLs.
//!
//! One completion per URL, in order; every URL yields exactly one
//! [`PageObjectModel`]. After the whole batch is generated, each model's
//! source is written under the configured pages directory as a side effect.
//! Write failures are logged and do not disturb the returned models.

use std::sync::Arc;

use tokio::fs;

use crate::config::AgentConfig;
use crate::llm::{extract_text, CompletionRequest, LlmProvider, Message};
use crate::model::PageObjectModel;
use crate::parse::{extract_class_name, extract_code_blocks, extract_method_names};

/// Class name used when a reply contains no class declaration, and for
/// fallback stubs.
const DEFAULT_CLASS_NAME: &str = "GeneratedPage";

/// System prompt for page object generation.
const PAGE_OBJECT_SYSTEM_PROMPT: &str = r#"You are an expert at the Page Object Model pattern for Playwright with TypeScript.

Generate a complete page object class with:
- A descriptive class name derived from the page URL
- Locators declared as readonly properties
- A constructor taking a Playwright Page
- Navigation and interaction methods with explicit return types
- A verification method confirming the page loaded

Respond with a single TypeScript code block containing the full class."#;

/// User prompt template for one URL.
const PAGE_OBJECT_USER_TEMPLATE: &str = r#"Generate a Playwright page object class for this page:

URL: {url}

Include navigation, the main interactions a user would perform on such a
page, and a load verification method."#;

/// Generates and persists Playwright page objects.
pub struct PageObjectGenerator {
    llm: Arc<dyn LlmProvider>,
    config: AgentConfig,
}

impl PageObjectGenerator {
    /// Creates a new page object generator.
    pub fn new(llm: Arc<dyn LlmProvider>, config: AgentConfig) -> Self {
        Self { llm, config }
    }

    /// Generates one page object per URL, in order, then writes each one
    /// under the configured pages directory. Call failures produce a usable
    /// stub for that URL; write failures are logged only.
    pub async fn generate_page_objects(&self, urls: &[String]) -> Vec<PageObjectModel> {
        let mut models = Vec::with_capacity(urls.len());

        for url in urls {
            let model = match self.request_page_object(url).await {
                Ok(model) => model,
                Err(e) => {
                    tracing::warn!("Page object call failed for {}: {}", url, e);
                    fallback_page_object(url, &e.to_string())
                }
            };
            models.push(model);
        }

        self.persist(&models).await;
        models
    }

    /// Issues one completion for one URL and parses the reply into a model.
    async fn request_page_object(
        &self,
        url: &str,
    ) -> Result<PageObjectModel, crate::error::LlmError> {
        let prompt = PAGE_OBJECT_USER_TEMPLATE.replace("{url}", url);

        let request = CompletionRequest::new(
            &self.config.model,
            self.config.max_tokens,
            vec![Message::user(prompt)],
        )
        .with_system(PAGE_OBJECT_SYSTEM_PROMPT);

        let envelope = self.llm.complete(request).await?;
        let text = extract_text(&envelope);

        // The first block is the class; later blocks are usually usage
        // examples and are dropped.
        let code = extract_code_blocks(&text, "typescript")
            .into_iter()
            .next()
            .unwrap_or_else(|| text.trim().to_string());

        let class_name =
            extract_class_name(&code).unwrap_or_else(|| DEFAULT_CLASS_NAME.to_string());
        let methods = extract_method_names(&code);

        Ok(PageObjectModel {
            file_name: format!("{}.ts", class_name.to_lowercase()),
            class_name,
            url: url.to_string(),
            code,
            methods,
        })
    }

    /// Writes each model's source to the pages directory, creating it first.
    async fn persist(&self, models: &[PageObjectModel]) {
        if models.is_empty() {
            return;
        }

        let dir = &self.config.pages_dir;
        if let Err(e) = fs::create_dir_all(dir).await {
            tracing::warn!("Could not create {}: {}", dir.display(), e);
            return;
        }

        for model in models {
            let path = dir.join(&model.file_name);
            match fs::write(&path, &model.code).await {
                Ok(()) => tracing::info!("Wrote page object {}", path.display()),
                Err(e) => tracing::warn!("Could not write {}: {}", path.display(), e),
            }
        }
    }
}

/// Builds the stub returned when the completion call fails. The stub is
/// complete TypeScript so the caller still gets something compilable.
fn fallback_page_object(url: &str, error: &str) -> PageObjectModel {
    let code = format!(
        r#"import {{ Page }} from '@playwright/test';

/**
 * Page object for {url}.
 * Automatic generation failed ({error}); fill in locators and
 * interactions by hand.
 */
export class {class} {{
  constructor(private page: Page) {{}}

  async navigateToPage(): Promise<void> {{
    await this.page.goto('{url}');
  }}

  async verifyPageLoaded(): Promise<void> {{
    await this.page.waitForLoadState('networkidle');
  }}
}}
"#,
        url = url,
        error = error,
        class = DEFAULT_CLASS_NAME,
    );

    PageObjectModel {
        file_name: fallback_file_name(url),
        class_name: DEFAULT_CLASS_NAME.to_string(),
        url: url.to_string(),
        code,
        methods: vec!["navigateToPage".to_string(), "verifyPageLoaded".to_string()],
    }
}

/// File name for a fallback stub. The class name is fixed, so the name
/// carries a slug of the URL to keep stubs from different URLs in one batch
/// from overwriting each other.
fn fallback_file_name(url: &str) -> String {
    let stripped = url
        .trim_start_matches("https://")
        .trim_start_matches("http://");

    let mut slug = String::new();
    for c in stripped.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');

    if slug.is_empty() {
        format!("{}.ts", DEFAULT_CLASS_NAME.to_lowercase())
    } else {
        format!("{}-{}.ts", DEFAULT_CLASS_NAME.to_lowercase(), slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::MockLlmProvider;
    use std::path::Path;
    use tempfile::TempDir;

    const LOGIN_PAGE_REPLY: &str = r#"Here is the page object:

```typescript
import { Page, Locator } from '@playwright/test';

export class LoginPage {
  readonly usernameInput: Locator;

  constructor(private page: Page) {
    this.usernameInput = page.locator('#username');
  }

  async navigateToLogin(): Promise<void> {
    await this.page.goto('/login');
  }

  async login(user: string, pass: string): Promise<void> {
    await this.usernameInput.fill(user);
  }
}
```

Use it from your specs."#;

    fn generator(llm: MockLlmProvider, pages_dir: &Path) -> PageObjectGenerator {
        PageObjectGenerator::new(
            Arc::new(llm),
            AgentConfig::with_api_key("sk-test").with_pages_dir(pages_dir),
        )
    }

    #[tokio::test]
    async fn test_reply_is_parsed_and_persisted() {
        let dir = TempDir::new().expect("temp dir");
        let generator = generator(MockLlmProvider::replying(LOGIN_PAGE_REPLY), dir.path());

        let models = generator
            .generate_page_objects(&["https://example.com/login".to_string()])
            .await;

        assert_eq!(models.len(), 1);
        assert_eq!(models[0].class_name, "LoginPage");
        assert_eq!(models[0].file_name, "loginpage.ts");
        assert_eq!(models[0].methods, vec!["navigateToLogin", "login"]);
        assert!(!models[0].code.contains("```"));

        let written = std::fs::read_to_string(dir.path().join("loginpage.ts"))
            .expect("page object file should exist");
        assert_eq!(written, models[0].code);
    }

    #[tokio::test]
    async fn test_call_failure_yields_stub() {
        let dir = TempDir::new().expect("temp dir");
        let generator = generator(MockLlmProvider::failing("overloaded"), dir.path());

        let models = generator
            .generate_page_objects(&["https://example.com/cart".to_string()])
            .await;

        assert_eq!(models.len(), 1);
        assert_eq!(models[0].class_name, "GeneratedPage");
        assert_eq!(
            models[0].methods,
            vec!["navigateToPage", "verifyPageLoaded"]
        );
        assert!(models[0].code.contains("https://example.com/cart"));
        assert!(models[0].code.contains("overloaded"));
    }

    #[tokio::test]
    async fn test_one_model_per_url_in_order() {
        let dir = TempDir::new().expect("temp dir");
        let generator = generator(
            MockLlmProvider::scripted(vec![
                Ok(LOGIN_PAGE_REPLY.to_string()),
                Err("timeout".to_string()),
            ]),
            dir.path(),
        );

        let urls = vec![
            "https://example.com/login".to_string(),
            "https://example.com/admin".to_string(),
        ];
        let models = generator.generate_page_objects(&urls).await;

        assert_eq!(models.len(), 2);
        assert_eq!(models[0].url, urls[0]);
        assert_eq!(models[1].url, urls[1]);
        assert_eq!(models[1].class_name, "GeneratedPage");
    }

    #[tokio::test]
    async fn test_unfenced_reply_defaults_class_name() {
        let dir = TempDir::new().expect("temp dir");
        let generator = generator(
            MockLlmProvider::replying("const page = 'not a class';"),
            dir.path(),
        );

        let models = generator
            .generate_page_objects(&["https://example.com".to_string()])
            .await;

        assert_eq!(models[0].class_name, "GeneratedPage");
        assert_eq!(models[0].file_name, "generatedpage.ts");
    }

    #[tokio::test]
    async fn test_fallback_stubs_for_distinct_urls_do_not_collide() {
        let dir = TempDir::new().expect("temp dir");
        let generator = generator(MockLlmProvider::failing("overloaded"), dir.path());

        let urls = vec![
            "https://example.com/cart".to_string(),
            "https://example.com/admin".to_string(),
        ];
        let models = generator.generate_page_objects(&urls).await;

        assert_eq!(models.len(), 2);
        assert_ne!(models[0].file_name, models[1].file_name);
        for model in &models {
            assert!(
                dir.path().join(&model.file_name).is_file(),
                "stub for {} should be written",
                model.url
            );
        }
    }

    #[tokio::test]
    async fn test_write_failure_leaves_returned_models_intact() {
        let dir = TempDir::new().expect("temp dir");
        // A file where the output directory should go blocks creation.
        let blocked = dir.path().join("pages");
        std::fs::write(&blocked, "not a directory").expect("block path");
        let generator = generator(MockLlmProvider::replying(LOGIN_PAGE_REPLY), &blocked);

        let models = generator
            .generate_page_objects(&["https://example.com/login".to_string()])
            .await;

        assert_eq!(models.len(), 1);
        assert_eq!(models[0].class_name, "LoginPage");
        assert_eq!(models[0].methods, vec!["navigateToLogin", "login"]);
        assert!(models[0].code.contains("export class LoginPage"));
    }

    #[test]
    fn test_fallback_file_names_are_slugged() {
        assert_eq!(
            fallback_file_name("https://example.com/cart"),
            "generatedpage-example-com-cart.ts"
        );
        assert_eq!(fallback_file_name(""), "generatedpage.ts");
        assert_eq!(fallback_file_name("https://"), "generatedpage.ts");
    }

    #[tokio::test]
    async fn test_empty_input_writes_nothing() {
        let dir = TempDir::new().expect("temp dir");
        let generator = generator(MockLlmProvider::failing("never called"), dir.path());

        let models = generator.generate_page_objects(&[]).await;

        assert!(models.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).expect("read dir").count(), 0);
    }
}
