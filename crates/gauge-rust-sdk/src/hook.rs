//! Hook and step handles
//!
//! A handle pairs a name with the callable body the runner invokes. Handles are
//! cheap to clone and immutable once built, so a registry can hand out copies
//! freely.
//!
//! # Example
//!
//! ```ignore
//! use gauge_rust_sdk::prelude::*;
//!
//! let hook = HookHandle::new("open_browser", |info: &ExecutionInfo| {
//!     println!("starting {:?}", info.spec_name());
//!     Ok(())
//! });
//!
//! let step = StepHandle::new("Vowels in {} are {}", |args: &[String]| {
//!     let count = args[0].chars().filter(|c| "aeiou".contains(*c)).count();
//!     if count.to_string() == args[1] {
//!         Ok(())
//!     } else {
//!         Err(HookError::Assertion(format!("expected {} vowels, got {}", args[1], count)))
//!     }
//! });
//! ```

use std::fmt;
use std::sync::Arc;

use crate::context::ExecutionInfo;
use crate::error::HookError;

/// Signature of a hook body
pub type HookFn = Arc<dyn Fn(&ExecutionInfo) -> Result<(), HookError> + Send + Sync>;

/// Signature of a step body, called with the step's argument values
pub type StepFn = Arc<dyn Fn(&[String]) -> Result<(), HookError> + Send + Sync>;

/// Placeholder marking a parameter in parameterised step text
pub const STEP_PARAMETER: &str = "{}";

/// A named hook body
#[derive(Clone)]
pub struct HookHandle {
    name: String,
    func: HookFn,
}

impl HookHandle {
    /// Create a hook.
    ///
    /// The name is the hook's identity within its category: registering a
    /// second hook under a name already taken keeps the first body and drops
    /// the new one. Give distinct hooks distinct names.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&ExecutionInfo) -> Result<(), HookError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Wrap an async hook body.
    ///
    /// The future is driven to completion on a current-thread Tokio runtime
    /// owned by the handle, so the caller still sees a blocking call.
    ///
    /// # Example
    /// ```ignore
    /// HookHandle::from_async("seed_db", |info| async move {
    ///     seed(info.spec_name()).await.map_err(|e| HookError::failed(e.to_string()))
    /// })
    /// ```
    #[cfg(feature = "async")]
    pub fn from_async<F, Fut>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(ExecutionInfo) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), HookError>>,
    {
        let runtime: Arc<once_cell::sync::OnceCell<tokio::runtime::Runtime>> =
            Arc::new(once_cell::sync::OnceCell::new());

        Self::new(name, move |info: &ExecutionInfo| {
            let rt = runtime.get_or_try_init(|| {
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
            })?;
            rt.block_on(func(info.clone()))
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the hook body against an execution context.
    pub fn invoke(&self, info: &ExecutionInfo) -> Result<(), HookError> {
        (self.func)(info)
    }
}

impl fmt::Debug for HookHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookHandle")
            .field("name", &self.name)
            .finish()
    }
}

/// A step implementation bound to its parameterised text
#[derive(Clone)]
pub struct StepHandle {
    text: String,
    arity: usize,
    func: StepFn,
}

impl StepHandle {
    /// Bind a body to step text.
    ///
    /// Parameters may be written as `{}` or with Gauge's named form
    /// `<name>`; both are stored as `{}`, which is how Gauge sends the
    /// parsed text it validates and executes.
    pub fn new<F>(text: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[String]) -> Result<(), HookError> + Send + Sync + 'static,
    {
        let text = parameterise(&text.into());
        let arity = text.matches(STEP_PARAMETER).count();
        Self {
            text,
            arity,
            func: Arc::new(func),
        }
    }

    /// Parameterised step text, e.g. `Vowels in {} are {}`
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of parameters the step text declares
    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn invoke(&self, args: &[String]) -> Result<(), HookError> {
        (self.func)(args)
    }
}

/// Replace every `<name>` placeholder with `{}`. An unclosed `<` is literal.
fn parameterise(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('<') {
        match rest[open..].find('>') {
            Some(close) => {
                out.push_str(&rest[..open]);
                out.push_str(STEP_PARAMETER);
                rest = &rest[open + close + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

impl fmt::Debug for StepHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepHandle")
            .field("text", &self.text)
            .field("arity", &self.arity)
            .finish()
    }
}
