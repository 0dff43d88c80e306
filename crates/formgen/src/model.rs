//! The model-invocation seam and the end-to-end form generator.
//!
//! [`FormModel`] is the only thing that talks to a language model: prompt
//! text in, reply text out. [`GeminiClient`](crate::gemini::GeminiClient) is
//! the production implementation; [`FnModel`] wraps a closure for tests and
//! offline use. [`FormGenerator`] wires a model between the prompt builder
//! and the normalizer.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use crate::error::UpstreamError;
use crate::form::{FormSchema, Normalizer};
use crate::prompt::build_form_prompt;

/// Boxed future returned by [`FormModel::invoke`].
pub type ModelFuture<'a> = Pin<Box<dyn Future<Output = Result<String, UpstreamError>> + Send + 'a>>;

/// A text-in, text-out language model.
pub trait FormModel: Send + Sync {
    /// Send the fully built prompt and return the raw reply text.
    fn invoke(&self, prompt: &str) -> ModelFuture<'_>;
}

impl<T: FormModel + ?Sized> FormModel for Arc<T> {
    fn invoke(&self, prompt: &str) -> ModelFuture<'_> {
        (**self).invoke(prompt)
    }
}

type Handler = dyn Fn(String) -> Result<String, UpstreamError> + Send + Sync;

/// A [`FormModel`] backed by a synchronous closure.
///
/// ```
/// use formgen::{FnModel, FormGenerator};
///
/// # tokio_test_block_on(async {
/// let model = FnModel::new(|_prompt| Ok(r#"[{"name":"email"}]"#.to_string()));
/// let form = FormGenerator::new(model).generate("newsletter").await.unwrap();
/// assert_eq!(form.display_title(), "Generated Form");
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
pub struct FnModel {
    handler: Box<Handler>,
}

impl FnModel {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(String) -> Result<String, UpstreamError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
        }
    }

    /// A model that always replies with `reply`.
    pub fn constant(reply: impl Into<String>) -> Self {
        let reply = reply.into();
        Self::new(move |_| Ok(reply.clone()))
    }
}

impl FormModel for FnModel {
    fn invoke(&self, prompt: &str) -> ModelFuture<'_> {
        let result = (self.handler)(prompt.to_string());
        Box::pin(async move { result })
    }
}

impl fmt::Debug for FnModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnModel").finish_non_exhaustive()
    }
}

/// Prompt builder → model → normalizer.
///
/// Cheap to clone; clones share the model.
#[derive(Clone)]
pub struct FormGenerator {
    model: Arc<dyn FormModel>,
    normalizer: Normalizer,
}

impl FormGenerator {
    pub fn new(model: impl FormModel + 'static) -> Self {
        Self::from_shared(Arc::new(model))
    }

    pub fn from_shared(model: Arc<dyn FormModel>) -> Self {
        Self {
            model,
            normalizer: Normalizer::default(),
        }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Generate a form for `user_prompt`.
    ///
    /// Only model invocation can fail; whatever text comes back is normalized
    /// into a [`FormSchema`].
    pub async fn generate(&self, user_prompt: &str) -> Result<FormSchema, UpstreamError> {
        let prompt = build_form_prompt(user_prompt);
        debug!(
            user_prompt_len = user_prompt.len(),
            prompt_len = prompt.len(),
            "invoking model"
        );
        let raw = self.model.invoke(&prompt).await?;
        Ok(self.normalizer.normalize(&raw))
    }
}

impl fmt::Debug for FormGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormGenerator")
            .field("normalizer", &self.normalizer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::USER_REQUEST_MARKER;
    use serde_json::json;
    use std::sync::Mutex;

    #[tokio::test]
    async fn generator_sends_built_prompt() {
        let seen = Arc::new(Mutex::new(String::new()));
        let sink = seen.clone();
        let model = FnModel::new(move |prompt| {
            *sink.lock().unwrap() = prompt;
            Ok("{}".to_string())
        });

        FormGenerator::new(model)
            .generate("job application")
            .await
            .unwrap();

        let prompt = seen.lock().unwrap().clone();
        assert!(prompt.contains(USER_REQUEST_MARKER));
        assert!(prompt.contains("job application"));
    }

    #[tokio::test]
    async fn generator_normalizes_reply() {
        let generator = FormGenerator::new(FnModel::constant(r#"[{"name":"a"}]"#));
        let form = generator.generate("x").await.unwrap();
        assert_eq!(
            form.into_value(),
            json!({"title": "Generated Form", "fields": [{"name": "a"}]})
        );
    }

    #[tokio::test]
    async fn generator_respects_normalizer_settings() {
        let fenced = "```json\n{\"title\":\"Fenced\",\"fields\":[]}\n```";

        let plain = FormGenerator::new(FnModel::constant(fenced));
        assert!(plain.generate("x").await.unwrap().is_fallback());

        let stripping = plain.with_normalizer(Normalizer::new().with_fence_stripping(true));
        let form = stripping.generate("x").await.unwrap();
        assert_eq!(form.title(), Some("Fenced"));
    }

    #[tokio::test]
    async fn upstream_errors_propagate() {
        let generator = FormGenerator::new(FnModel::new(|_| {
            Err(UpstreamError::RateLimited {
                message: "quota".into(),
            })
        }));
        let err = generator.generate("x").await.unwrap_err();
        assert_eq!(err.kind(), "rate_limited");
    }

    #[tokio::test]
    async fn shared_model_via_arc() {
        let shared: Arc<dyn FormModel> = Arc::new(FnModel::constant("42"));
        let a = FormGenerator::from_shared(shared.clone());
        let b = FormGenerator::new(shared);
        assert!(a.generate("x").await.unwrap().is_fallback());
        assert!(b.generate("y").await.unwrap().is_fallback());
    }
}
