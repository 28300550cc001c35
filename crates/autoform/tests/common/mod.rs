//! Minimal toolkit stand-ins shared by the integration tests
#![allow(dead_code)]

use autoform::{
    async_trait, downcast_layout, Form, FormItemEntity, FormItemValidator, FormView, HintProvider,
    LayoutProvider, PassValidator, ProviderMismatch, ResultWatcher, ViewContainer, ViewHandle,
};
use serde_json::Value;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing_subscriber::fmt::MakeWriter;

/// Collects formatted log output in memory
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Route this thread's logs into the capture until the guard drops
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

pub struct Screen;

impl ViewContainer for Screen {}

/// Single-line text input
#[derive(Default)]
pub struct TextView {
    pub label: String,
    pub hint: String,
    pub text: Option<Value>,
    pub error: Option<String>,
    watcher: Option<ResultWatcher>,
}

impl TextView {
    /// Simulate the user typing into the control
    pub fn type_text(&mut self, text: &str) {
        self.text = Some(Value::from(text));
        if let Some(watcher) = &self.watcher {
            watcher.update_result(text);
        }
    }
}

impl FormView for TextView {
    fn set_error(&mut self, message: Option<&str>) {
        self.error = message.map(str::to_owned);
    }
}

#[derive(Default)]
pub struct TextLayout;

impl LayoutProvider for TextLayout {
    fn create_view(&self, _container: &dyn ViewContainer) -> Box<dyn FormView> {
        Box::new(TextView::default())
    }

    fn bind_data(&self, view: &mut dyn FormView, entity: &FormItemEntity) {
        if let Some(text) = view.downcast_mut::<TextView>() {
            text.label = entity.label.clone();
            text.hint = entity.hint.clone();
            text.text = entity.result();
        }
    }

    fn result_watcher(&self, view: &mut dyn FormView, watcher: ResultWatcher) {
        if let Some(text) = view.downcast_mut::<TextView>() {
            text.watcher = Some(watcher);
        }
    }
}

/// On/off toggle
#[derive(Default)]
pub struct SwitchView {
    pub on: bool,
    watcher: Option<ResultWatcher>,
}

impl SwitchView {
    pub fn toggle(&mut self) {
        self.on = !self.on;
        if let Some(watcher) = &self.watcher {
            watcher.update_result(self.on);
        }
    }
}

impl FormView for SwitchView {}

#[derive(Default)]
pub struct SwitchLayout;

impl LayoutProvider for SwitchLayout {
    fn create_view(&self, _container: &dyn ViewContainer) -> Box<dyn FormView> {
        Box::new(SwitchView::default())
    }

    fn bind_data(&self, view: &mut dyn FormView, entity: &FormItemEntity) {
        if let Some(switch) = view.downcast_mut::<SwitchView>() {
            switch.on = entity.result().and_then(|v| v.as_bool()).unwrap_or(false);
        }
    }

    fn result_watcher(&self, view: &mut dyn FormView, watcher: ResultWatcher) {
        if let Some(switch) = view.downcast_mut::<SwitchView>() {
            switch.watcher = Some(watcher);
        }
    }
}

/// Requires an `@`; only knows how to report errors on text inputs
#[derive(Default)]
pub struct EmailValidator;

#[async_trait(?Send)]
impl FormItemValidator for EmailValidator {
    async fn validate(&self, result: Option<Value>) -> bool {
        result
            .as_ref()
            .and_then(Value::as_str)
            .is_some_and(|s| s.contains('@'))
    }

    fn on_validate_failed(
        &self,
        entity: &FormItemEntity,
        layout: &dyn LayoutProvider,
    ) -> Result<(), ProviderMismatch> {
        downcast_layout::<TextLayout>(layout)?;
        if let Some(view) = entity.view() {
            view.borrow_mut().set_error(Some("Invalid email"));
        }
        Ok(())
    }
}

/// Fixed verdict, counting how often it was asked
pub struct Recording {
    pub passes: bool,
    pub calls: Arc<AtomicUsize>,
}

impl Recording {
    pub fn new(passes: bool) -> (Arc<Self>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let validator = Arc::new(Self {
            passes,
            calls: Arc::clone(&calls),
        });
        (validator, calls)
    }
}

#[async_trait(?Send)]
impl FormItemValidator for Recording {
    async fn validate(&self, _result: Option<Value>) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.passes
    }
}

/// Completes on a later turn of the runtime
#[derive(Default)]
pub struct DeferredValidator;

#[async_trait(?Send)]
impl FormItemValidator for DeferredValidator {
    async fn validate(&self, result: Option<Value>) -> bool {
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        result.is_some()
    }
}

/// Never completes
#[derive(Default)]
pub struct StalledValidator;

#[async_trait(?Send)]
impl FormItemValidator for StalledValidator {
    async fn validate(&self, _result: Option<Value>) -> bool {
        std::future::pending::<bool>().await
    }
}

#[derive(Default)]
pub struct PlaceholderHints;

impl HintProvider for PlaceholderHints {
    fn hint(&self, _key: &str, label: &str) -> Option<String> {
        Some(format!("Enter {}", label.to_lowercase()))
    }
}

/// Run `f` against the text input behind `view`
pub fn with_text<R>(view: &ViewHandle, f: impl FnOnce(&mut TextView) -> R) -> R {
    let mut view = view.borrow_mut();
    f(view.downcast_mut::<TextView>().expect("not a text view"))
}

#[derive(Debug, Default, Clone, PartialEq, Form)]
#[form(layout = TextLayout)]
pub struct Profile {
    #[form_field(label = "Name", hint = "Full name", order = 2)]
    pub name: String,

    #[form_field(key = "mail", label = "Email", order = 1, validator = EmailValidator)]
    pub email: String,

    #[form_field(label = "Age", order = 3.5, validator = PassValidator)]
    pub age: Option<u32>,

    #[form_field(label = "Nickname", order = 2)]
    pub nickname: String,

    #[form_field(label = "Newsletter", order = 4, layout = SwitchLayout, validator = PassValidator)]
    pub newsletter: bool,

    pub session: u64,
}

impl Profile {
    pub fn sample() -> Self {
        Self {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            age: Some(36),
            nickname: "Ada".to_string(),
            newsletter: true,
            session: 99,
        }
    }
}

/// Form with no declared fields; tests fill it with `append`
#[derive(Debug, Default, Form)]
#[form]
pub struct Blank {}
